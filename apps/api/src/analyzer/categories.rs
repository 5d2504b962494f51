//! Repository categorization against seven fixed category definitions.
//! A repository accrues +2 per keyword match in name/description/topics,
//! +3 when its primary language is in the category's language list, and +3
//! per matching topic tag; categories scoring at least the threshold are
//! assigned, so one repository may belong to several. Repositories matching
//! nothing fall into "Other".

use crate::analyzer::models::RepositoryCategory;
use crate::platforms::github::RepositoryRecord;

const KEYWORD_POINTS: u32 = 2;
const LANGUAGE_POINTS: u32 = 3;
const TOPIC_POINTS: u32 = 3;
const ASSIGN_THRESHOLD: u32 = 2;

struct CategoryDef {
    name: &'static str,
    keywords: &'static [&'static str],
    languages: &'static [&'static str],
    topics: &'static [&'static str],
}

const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "Web Development",
        keywords: &["web", "website", "frontend", "backend", "fullstack", "http", "rest", "server"],
        languages: &["JavaScript", "TypeScript", "HTML", "CSS", "PHP", "Ruby"],
        topics: &["react", "vue", "angular", "nextjs", "django", "rails", "express", "webapp"],
    },
    CategoryDef {
        name: "Mobile Development",
        keywords: &["mobile", "android", "ios", "app"],
        languages: &["Swift", "Kotlin", "Dart", "Objective-C", "Java"],
        topics: &["flutter", "react-native", "android", "ios", "mobile-app"],
    },
    CategoryDef {
        name: "Data Science",
        keywords: &["data", "machine-learning", "ml", "analysis", "model", "dataset", "neural"],
        languages: &["Python", "R", "Julia"],
        topics: &["machine-learning", "deep-learning", "data-science", "pandas", "tensorflow", "pytorch", "nlp"],
    },
    CategoryDef {
        name: "DevOps",
        keywords: &["deploy", "docker", "kubernetes", "infrastructure", "pipeline", "ci", "cd", "terraform"],
        languages: &["Shell", "HCL", "Dockerfile", "Go"],
        topics: &["devops", "docker", "kubernetes", "ci-cd", "terraform", "ansible", "infrastructure"],
    },
    CategoryDef {
        name: "Game Development",
        keywords: &["game", "engine", "unity", "unreal", "gameplay"],
        languages: &["C#", "C++", "GDScript", "Lua"],
        topics: &["game", "gamedev", "unity", "godot", "game-engine"],
    },
    CategoryDef {
        name: "Systems Programming",
        keywords: &["kernel", "compiler", "parser", "embedded", "driver", "runtime", "allocator", "cli"],
        languages: &["Rust", "C", "C++", "Zig", "Assembly"],
        topics: &["systems", "embedded", "compiler", "os", "low-level", "cli"],
    },
    CategoryDef {
        name: "Blockchain",
        keywords: &["blockchain", "crypto", "smart-contract", "web3", "defi", "nft"],
        languages: &["Solidity", "Move", "Cairo"],
        topics: &["blockchain", "ethereum", "solana", "web3", "smart-contracts"],
    },
];

fn category_score(repo: &RepositoryRecord, def: &CategoryDef) -> u32 {
    let haystack = format!(
        "{} {} {}",
        repo.name.to_lowercase(),
        repo.description.as_deref().unwrap_or("").to_lowercase(),
        repo.topics.join(" ").to_lowercase()
    );

    let mut score = 0;
    for keyword in def.keywords {
        if haystack.contains(keyword) {
            score += KEYWORD_POINTS;
        }
    }
    if let Some(language) = &repo.language {
        if def.languages.iter().any(|l| l.eq_ignore_ascii_case(language)) {
            score += LANGUAGE_POINTS;
        }
    }
    for topic in &repo.topics {
        if def.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
            score += TOPIC_POINTS;
        }
    }
    score
}

/// Deterministic and idempotent: the same repository list always yields the
/// same assignments and percentages.
pub fn categorize(repos: &[RepositoryRecord]) -> Vec<RepositoryCategory> {
    let active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();
    if active.is_empty() {
        return Vec::new();
    }

    let mut result: Vec<RepositoryCategory> = Vec::new();
    let mut uncategorized: Vec<String> = Vec::new();

    for def in CATEGORIES {
        let members: Vec<String> = active
            .iter()
            .filter(|r| category_score(r, def) >= ASSIGN_THRESHOLD)
            .map(|r| r.name.clone())
            .collect();
        if !members.is_empty() {
            result.push(RepositoryCategory {
                name: def.name.to_string(),
                count: members.len(),
                percentage: (members.len() as f64 / active.len() as f64 * 1000.0).round() / 10.0,
                repositories: members,
            });
        }
    }

    for repo in &active {
        let matched = CATEGORIES
            .iter()
            .any(|def| category_score(repo, def) >= ASSIGN_THRESHOLD);
        if !matched {
            uncategorized.push(repo.name.clone());
        }
    }
    if !uncategorized.is_empty() {
        result.push(RepositoryCategory {
            name: "Other".to_string(),
            count: uncategorized.len(),
            percentage: (uncategorized.len() as f64 / active.len() as f64 * 1000.0).round() / 10.0,
            repositories: uncategorized,
        });
    }

    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repo(
        name: &str,
        description: &str,
        language: Option<&str>,
        topics: &[&str],
    ) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            full_name: format!("dev/{name}"),
            description: Some(description.to_string()).filter(|d| !d.is_empty()),
            language: language.map(String::from),
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            size_kb: 0,
            is_fork: false,
            is_archived: false,
            is_private: false,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            license: None,
            html_url: String::new(),
            created_at: None,
            updated_at: None,
            pushed_at: None,
        }
    }

    #[test]
    fn test_rust_cli_lands_in_systems() {
        let repos = vec![repo("fast-cli", "a command line parser", Some("Rust"), &["cli"])];
        let categories = categorize(&repos);
        assert!(categories.iter().any(|c| c.name == "Systems Programming"));
    }

    #[test]
    fn test_repository_may_belong_to_multiple_categories() {
        let repos = vec![repo(
            "ml-dashboard",
            "web dashboard for machine-learning models",
            Some("Python"),
            &["machine-learning", "webapp"],
        )];
        let categories = categorize(&repos);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Data Science"), "{names:?}");
        assert!(names.contains(&"Web Development"), "{names:?}");
    }

    #[test]
    fn test_unmatched_repo_falls_into_other() {
        let repos = vec![repo("dotfiles", "", None, &[])];
        let categories = categorize(&repos);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Other");
        assert_eq!(categories[0].percentage, 100.0);
    }

    #[test]
    fn test_categorization_is_idempotent() {
        let repos = vec![
            repo("web-shop", "backend server", Some("TypeScript"), &["express"]),
            repo("trainer", "neural model training", Some("Python"), &["pytorch"]),
            repo("dotfiles", "", None, &[]),
        ];
        let first = categorize(&repos);
        let second = categorize(&repos);
        assert_eq!(first, second);
    }

    #[test]
    fn test_forked_repos_are_ignored() {
        let mut forked = repo("web-shop", "backend server", Some("TypeScript"), &["express"]);
        forked.is_fork = true;
        assert!(categorize(&[forked]).is_empty());
    }

    #[test]
    fn test_percentages_over_active_count() {
        let repos = vec![
            repo("web-a", "frontend website", Some("JavaScript"), &["react"]),
            repo("web-b", "backend server", Some("TypeScript"), &["express"]),
            repo("dotfiles", "", None, &[]),
        ];
        let categories = categorize(&repos);
        let web = categories.iter().find(|c| c.name == "Web Development").unwrap();
        assert_eq!(web.count, 2);
        assert!((web.percentage - 66.7).abs() < 0.11, "{}", web.percentage);
    }
}
