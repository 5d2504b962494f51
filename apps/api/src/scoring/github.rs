//! GitHub-side category scores. Five categories, each a weighted sum of
//! capped sub-terms, folded with fixed weights into the platform score.

use std::collections::HashSet;

use chrono::Utc;

use crate::analyzer::metrics;
use crate::platforms::github::{ActivityEvent, GitHubProfile, LanguageStat, RepositoryRecord};
use crate::scoring::models::{GitHubScore, GitHubScoreDetails};

const REPOSITORY_WEIGHT: f64 = 0.25;
const LANGUAGE_WEIGHT: f64 = 0.20;
const COLLABORATION_WEIGHT: f64 = 0.25;
const COMPLEXITY_WEIGHT: f64 = 0.15;
const ACTIVITY_WEIGHT: f64 = 0.15;

pub fn score(
    profile: &GitHubProfile,
    repos: &[RepositoryRecord],
    languages: &[LanguageStat],
    events: &[ActivityEvent],
) -> GitHubScore {
    let active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();

    let repository = repository_score(&active);
    let language = language_score(languages);
    let collaboration = metrics::collaboration(repos, profile.followers).score;
    let complexity = metrics::complexity(repos).score;
    let activity = activity_score(events);

    let overall = (repository * REPOSITORY_WEIGHT
        + language * LANGUAGE_WEIGHT
        + collaboration * COLLABORATION_WEIGHT
        + complexity * COMPLEXITY_WEIGHT
        + activity * ACTIVITY_WEIGHT)
        .round() as u32;

    let distinct_languages: HashSet<&str> = active
        .iter()
        .filter_map(|r| r.language.as_deref())
        .collect();

    GitHubScore {
        overall: overall.min(100),
        repository,
        language,
        collaboration,
        complexity,
        activity,
        details: GitHubScoreDetails {
            public_repos: profile.public_repos,
            active_repos: active.len(),
            total_stars: active.iter().map(|r| r.stars).sum(),
            followers: profile.followers,
            languages_used: distinct_languages.len(),
        },
    }
}

/// Count (≤30) + stars (≤40) + forks (≤15) + recent pushes (≤15).
fn repository_score(active: &[&RepositoryRecord]) -> f64 {
    let total_stars: u32 = active.iter().map(|r| r.stars).sum();
    let total_forks: u32 = active.iter().map(|r| r.forks).sum();
    let now = Utc::now();
    let recently_pushed = active
        .iter()
        .filter(|r| {
            r.pushed_at
                .map(|p| (now - p).num_days() < 90)
                .unwrap_or(false)
        })
        .count();

    let count_term = (active.len() as f64 * 2.0).min(30.0);
    let star_term = (total_stars as f64 * 0.5).min(40.0);
    let fork_term = (total_forks as f64).min(15.0);
    let recency_term = (recently_pushed as f64 * 3.0).min(15.0);
    (count_term + star_term + fork_term + recency_term).clamp(0.0, 100.0)
}

/// Diversity (≤40) + breadth bonus (≤30) + depth of the top language (≤30).
fn language_score(languages: &[LanguageStat]) -> f64 {
    if languages.is_empty() {
        return 0.0;
    }
    let diversity = (languages.len() as f64 * 10.0).min(40.0);
    let breadth = if languages.len() >= 3 {
        30.0
    } else {
        languages.len() as f64 * 10.0
    };
    let depth = languages
        .first()
        .map(|top| top.percentage * 0.3)
        .unwrap_or(0.0)
        .min(30.0);
    (diversity + breadth + depth).clamp(0.0, 100.0)
}

/// Event volume (≤60, push events weighted heavier) + push share bonus (≤40).
fn activity_score(events: &[ActivityEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let pushes = events.iter().filter(|e| e.commits > 0).count();
    let volume = (events.len() as f64 * 2.0).min(60.0);
    let push_term = (pushes as f64 * 4.0).min(40.0);
    (volume + push_term).clamp(0.0, 100.0)
}
