//! Collaboration, complexity, and impact metrics: weighted sums of capped
//! sub-terms over the active repository set. Forked and archived repositories
//! never contribute.

use std::collections::HashSet;

use chrono::Utc;

use crate::analyzer::models::{CollaborationMetrics, ImpactMetrics, ProjectComplexity};
use crate::platforms::github::RepositoryRecord;

/// Star score capped at 30, fork score at 25, follower score at 25, repo
/// count score at 25; the sum is clamped to 100.
pub fn collaboration(repos: &[RepositoryRecord], followers: u32) -> CollaborationMetrics {
    let active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();
    let total_stars: u32 = active.iter().map(|r| r.stars).sum();
    let total_forks: u32 = active.iter().map(|r| r.forks).sum();

    let star_score = (total_stars as f64 * 0.5).min(30.0);
    let fork_score = (total_forks as f64).min(25.0);
    let follower_score = (followers as f64 * 0.25).min(25.0);
    let repo_score = (active.len() as f64 * 1.5).min(25.0);

    CollaborationMetrics {
        total_stars,
        total_forks,
        followers,
        active_repos: active.len(),
        score: (star_score + fork_score + follower_score + repo_score).clamp(0.0, 100.0),
    }
}

/// Size (≤30) + language diversity (≤25) + topic coverage (≤20) + maturity
/// (≤25), clamped to 100.
pub fn complexity(repos: &[RepositoryRecord]) -> ProjectComplexity {
    let active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();
    if active.is_empty() {
        return ProjectComplexity {
            avg_repo_size_kb: 0.0,
            language_diversity: 0,
            topic_coverage: 0,
            mature_repos: 0,
            score: 0.0,
        };
    }

    let avg_size =
        active.iter().map(|r| r.size_kb as f64).sum::<f64>() / active.len() as f64;
    let languages: HashSet<&str> = active
        .iter()
        .filter_map(|r| r.language.as_deref())
        .collect();
    let topic_count: usize = active.iter().map(|r| r.topics.len()).sum();
    let now = Utc::now();
    let mature = active
        .iter()
        .filter(|r| {
            r.created_at
                .map(|c| (now - c).num_days() > 365)
                .unwrap_or(false)
        })
        .count();

    let size_score = (avg_size / 100.0).min(30.0);
    let diversity_score = (languages.len() as f64 * 5.0).min(25.0);
    let topic_score = (topic_count as f64 * 2.0).min(20.0);
    let maturity_score = (mature as f64 * 2.5).min(25.0);

    ProjectComplexity {
        avg_repo_size_kb: avg_size,
        language_diversity: languages.len(),
        topic_coverage: topic_count,
        mature_repos: mature,
        score: (size_score + diversity_score + topic_score + maturity_score).clamp(0.0, 100.0),
    }
}

/// Stars (≤40) + forks (≤30) + follower reach (≤20) + repo reach (≤10),
/// clamped to 100.
pub fn impact(repos: &[RepositoryRecord], followers: u32) -> ImpactMetrics {
    let active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();
    let total_stars: u32 = active.iter().map(|r| r.stars).sum();
    let total_forks: u32 = active.iter().map(|r| r.forks).sum();
    let total_watchers: u32 = active.iter().map(|r| r.watchers).sum();

    let star_score = (total_stars as f64 * 0.4).min(40.0);
    let fork_score = (total_forks as f64).min(30.0);
    let follower_score = (followers as f64 * 0.2).min(20.0);
    let reach_score = (active.len() as f64).min(10.0);

    ImpactMetrics {
        total_stars,
        total_forks,
        total_watchers,
        followers,
        score: (star_score + fork_score + follower_score + reach_score).clamp(0.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(stars: u32, forks: u32, is_fork: bool) -> RepositoryRecord {
        RepositoryRecord {
            name: "r".to_string(),
            full_name: "dev/r".to_string(),
            description: None,
            language: Some("Python".to_string()),
            stars,
            forks,
            watchers: stars,
            open_issues: 0,
            size_kb: 500,
            is_fork,
            is_archived: false,
            is_private: false,
            topics: vec![],
            license: None,
            html_url: String::new(),
            created_at: Some(Utc::now() - chrono::Duration::days(800)),
            updated_at: None,
            pushed_at: None,
        }
    }

    #[test]
    fn test_forked_repo_excluded_from_collaboration() {
        let repos = vec![repo(100, 0, false), repo(0, 0, true)];
        let metrics = collaboration(&repos, 0);
        assert_eq!(metrics.active_repos, 1);
        assert_eq!(metrics.total_stars, 100);
    }

    #[test]
    fn test_collaboration_sub_terms_are_capped() {
        let repos: Vec<RepositoryRecord> = (0..100).map(|_| repo(1000, 1000, false)).collect();
        let metrics = collaboration(&repos, 100_000);
        assert!(metrics.score <= 100.0);
        // Every sub-term saturated: 30 + 25 + 25 + 25 clamps to 100.
        assert_eq!(metrics.score, 100.0);
    }

    #[test]
    fn test_empty_repo_list_scores_zero_complexity() {
        let metrics = complexity(&[]);
        assert_eq!(metrics.score, 0.0);
        assert_eq!(metrics.language_diversity, 0);
    }

    #[test]
    fn test_impact_bounded() {
        let repos: Vec<RepositoryRecord> = (0..50).map(|_| repo(5000, 500, false)).collect();
        let metrics = impact(&repos, 50_000);
        assert!(metrics.score <= 100.0);
    }

    #[test]
    fn test_forked_repo_excluded_from_complexity() {
        let active_only = complexity(&[repo(100, 5, false)]);
        let with_fork = complexity(&[repo(100, 5, false), repo(0, 0, true)]);
        assert_eq!(active_only, with_fork);
    }
}
