//! Unified scoring engine: pulls both platform datasets through the
//! cache-aware clients, scores each side, and folds them into one
//! `UnifiedScore` with a fixed 60/40 GitHub/LeetCode blend.

pub mod breakdown;
pub mod github;
pub mod leetcode;
pub mod models;
pub mod readiness;

use std::sync::Arc;

use tracing::info;

use crate::platforms::github::GitHubClient;
use crate::platforms::leetcode::LeetCodeClient;
use crate::platforms::PlatformError;
use crate::resilience::validate::validate_username;

use crate::scoring::models::{
    GitHubScore, LeetCodeScore, UnifiedScore, GITHUB_WEIGHT, LEETCODE_WEIGHT,
};

pub struct ScoringEngine {
    github: Arc<GitHubClient>,
    leetcode: Arc<LeetCodeClient>,
}

impl ScoringEngine {
    pub fn new(github: Arc<GitHubClient>, leetcode: Arc<LeetCodeClient>) -> Self {
        Self { github, leetcode }
    }

    /// Scores one developer across both platforms. Username validation runs
    /// before any request is issued, so bad input never costs an API call.
    pub async fn calculate_unified_score(
        &self,
        github_username: &str,
        leetcode_username: &str,
        force_refresh: bool,
    ) -> Result<UnifiedScore, PlatformError> {
        validate_username(github_username)?;
        validate_username(leetcode_username)?;

        info!("scoring {github_username} (GitHub) / {leetcode_username} (LeetCode)");

        let (gh_profile, gh_repos, gh_languages, gh_events) = tokio::try_join!(
            self.github.fetch_user_profile(github_username, force_refresh),
            self.github.fetch_user_repositories(github_username, force_refresh),
            self.github.fetch_language_stats(github_username, force_refresh),
            self.github.fetch_recent_activity(github_username, force_refresh),
        )?;

        let (lc_profile, lc_contest, lc_submissions) = tokio::try_join!(
            self.leetcode.fetch_user_profile(leetcode_username, force_refresh),
            self.leetcode.fetch_contest_data(leetcode_username, force_refresh),
            self.leetcode
                .fetch_recent_submissions(leetcode_username, 100, force_refresh),
        )?;

        let github_score = github::score(&gh_profile, &gh_repos, &gh_languages, &gh_events);
        let leetcode_score = leetcode::score(&lc_profile, &lc_contest, &lc_submissions);

        Ok(Self::combine(github_score, leetcode_score))
    }

    fn combine(github_score: GitHubScore, leetcode_score: LeetCodeScore) -> UnifiedScore {
        let overall = (github_score.overall as f64 * GITHUB_WEIGHT
            + leetcode_score.overall as f64 * LEETCODE_WEIGHT)
            .round() as u32;

        let breakdown = breakdown::build(&github_score, &leetcode_score);
        let recommendations = breakdown::recommendations(&github_score, &leetcode_score);
        let interview_readiness = readiness::assess(&github_score, &leetcode_score);

        UnifiedScore {
            overall: overall.min(100),
            github: github_score,
            leetcode: leetcode_score,
            breakdown,
            recommendations,
            interview_readiness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::resilience::retry::RetryPolicy;
    use crate::resilience::ErrorClassifier;

    fn engine() -> ScoringEngine {
        let cache = Arc::new(CacheStore::in_memory());
        let classifier = Arc::new(ErrorClassifier::new(RetryPolicy {
            base_delay: std::time::Duration::from_millis(1),
            ..Default::default()
        }));
        let github = Arc::new(GitHubClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            cache.clone(),
            classifier.clone(),
        ));
        let leetcode = Arc::new(LeetCodeClient::new(
            "http://127.0.0.1:9".to_string(),
            cache,
            classifier,
        ));
        ScoringEngine::new(github, leetcode)
    }

    #[tokio::test]
    async fn test_empty_username_rejected_before_any_fetch() {
        let engine = engine();
        let err = engine
            .calculate_unified_score("", "solver", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_username_rejected() {
        let engine = engine();
        let err = engine
            .calculate_unified_score("octocat", "-bad-", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Validation(_)));
    }

    #[test]
    fn test_combine_applies_60_40_blend() {
        let gh = github::score(
            &crate::platforms::github::GitHubProfile {
                login: "dev".to_string(),
                name: None,
                avatar_url: String::new(),
                bio: None,
                company: None,
                location: None,
                blog: None,
                public_repos: 0,
                followers: 0,
                following: 0,
                created_at: None,
            },
            &[],
            &[],
            &[],
        );
        let lc = leetcode::score(
            &crate::platforms::leetcode::LeetCodeProfile {
                username: "solver".to_string(),
                real_name: None,
                avatar_url: None,
                country: None,
                ranking: 0,
                reputation: 0,
                total_solved: 0,
                easy_solved: 0,
                medium_solved: 0,
                hard_solved: 0,
                total_questions: 0,
            },
            &Default::default(),
            &[],
        );
        let expected = (gh.overall as f64 * 0.6 + lc.overall as f64 * 0.4).round() as u32;
        let unified = ScoringEngine::combine(gh, lc);
        assert_eq!(unified.overall, expected);
        assert!(unified.overall <= 100);
    }
}
