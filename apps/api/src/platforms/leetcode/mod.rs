//! LeetCode client. Unlike GitHub's REST surface, everything here is a single
//! GraphQL POST endpoint; per-method behavior differs only in the query
//! document and response path. GraphQL errors inside a 200 response are
//! failures, and a missing `matchedUser` is a distinct not-found condition.

pub mod queries;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::cache::CacheStore;
use crate::platforms::PlatformError;
use crate::resilience::breaker::CircuitBreaker;
use crate::resilience::validate::validate_username;
use crate::resilience::ErrorClassifier;

const SERVICE: &str = "leetcode";
const MAX_SUBMISSIONS: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Normalized shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeProfile {
    pub username: String,
    pub real_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub ranking: u64,
    pub reputation: i64,
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRound {
    pub title: String,
    pub start_time: i64,
    pub rating: f64,
    pub ranking: u64,
    pub problems_solved: u32,
    pub total_problems: u32,
}

/// Contest standing. A user who never attended a contest gets the zeroed
/// default rather than a not-found error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContestData {
    pub rating: f64,
    pub attended: u32,
    pub global_ranking: u64,
    pub top_percentage: f64,
    pub badge: Option<String>,
    pub history: Vec<ContestRound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub title: String,
    pub title_slug: String,
    pub status: String,
    pub lang: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub solved: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProblemStats {
    pub fundamental: Vec<TagCount>,
    pub intermediate: Vec<TagCount>,
    pub advanced: Vec<TagCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeLanguageStat {
    pub language: String,
    pub solved: u32,
    pub percentage: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Raw upstream payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmissionCount {
    difficulty: String,
    count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserProfileInner {
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    user_avatar: Option<String>,
    #[serde(default)]
    ranking: Option<u64>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    reputation: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<RawSubmissionCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchedUser {
    username: String,
    #[serde(default)]
    profile: Option<RawUserProfileInner>,
    #[serde(default)]
    submit_stats_global: Option<RawSubmitStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContestRanking {
    #[serde(default)]
    attended_contests_count: u32,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    global_ranking: u64,
    #[serde(default)]
    top_percentage: f64,
    #[serde(default)]
    badge: Option<RawBadge>,
}

#[derive(Debug, Deserialize)]
struct RawBadge {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContestHistoryEntry {
    #[serde(default)]
    attended: bool,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    ranking: u64,
    #[serde(default)]
    problems_solved: u32,
    #[serde(default)]
    total_problems: u32,
    #[serde(default)]
    contest: Option<RawContestMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContestMeta {
    #[serde(default)]
    title: String,
    #[serde(default)]
    start_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_slug: String,
    #[serde(default)]
    status_display: String,
    #[serde(default)]
    lang: String,
    /// LeetCode returns the epoch as a string.
    #[serde(default)]
    timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTagCount {
    tag_name: String,
    #[serde(default)]
    problems_solved: u32,
}

#[derive(Debug, Deserialize)]
struct RawTagProblemCounts {
    #[serde(default)]
    fundamental: Vec<RawTagCount>,
    #[serde(default)]
    intermediate: Vec<RawTagCount>,
    #[serde(default)]
    advanced: Vec<RawTagCount>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

pub struct LeetCodeClient {
    http: reqwest::Client,
    endpoint: String,
    cache: Arc<CacheStore>,
    classifier: Arc<ErrorClassifier>,
    breaker: CircuitBreaker,
}

impl LeetCodeClient {
    pub fn new(endpoint: String, cache: Arc<CacheStore>, classifier: Arc<ErrorClassifier>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            endpoint,
            cache,
            classifier,
            breaker: CircuitBreaker::new(SERVICE, 5, Duration::from_secs(60)),
        }
    }

    pub async fn fetch_user_profile(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<LeetCodeProfile, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "profile", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "profile", username).await {
            return Ok(hit);
        }

        let context = format!("leetcode.profile:{username}");
        let variables = json!({ "username": username });
        let data = self
            .classifier
            .with_retry(&context, || {
                self.graphql(queries::USER_PROFILE, variables.clone())
            })
            .await?;

        let profile = parse_profile(&data, username)?;
        self.cache
            .set(SERVICE, "profile", username, &profile, None)
            .await;
        Ok(profile)
    }

    pub async fn fetch_contest_data(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<ContestData, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "contest", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "contest", username).await {
            return Ok(hit);
        }

        let context = format!("leetcode.contest:{username}");
        let variables = json!({ "username": username });
        let data = self
            .classifier
            .with_retry(&context, || {
                self.graphql(queries::CONTEST_DATA, variables.clone())
            })
            .await?;

        let contest = parse_contest(&data)?;
        self.cache
            .set(SERVICE, "contest", username, &contest, None)
            .await;
        Ok(contest)
    }

    pub async fn fetch_recent_submissions(
        &self,
        username: &str,
        limit: u32,
        force_refresh: bool,
    ) -> Result<Vec<Submission>, PlatformError> {
        validate_username(username)?;
        let limit = limit.min(MAX_SUBMISSIONS);
        let params = format!("{username}:{limit}");
        if force_refresh {
            self.cache.invalidate(SERVICE, "submissions", &params).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "submissions", &params).await {
            return Ok(hit);
        }

        let context = format!("leetcode.submissions:{username}");
        let variables = json!({ "username": username, "limit": limit });
        let data = self
            .classifier
            .with_retry(&context, || {
                self.graphql(queries::RECENT_SUBMISSIONS, variables.clone())
            })
            .await?;

        let raw: Vec<RawSubmission> = serde_json::from_value(
            data.get("recentSubmissionList")
                .cloned()
                .unwrap_or(serde_json::Value::Array(vec![])),
        )?;
        let submissions: Vec<Submission> = raw
            .into_iter()
            .map(|s| Submission {
                title: s.title,
                title_slug: s.title_slug,
                status: s.status_display,
                lang: s.lang,
                timestamp: s.timestamp.parse().unwrap_or(0),
            })
            .collect();
        self.cache
            .set(SERVICE, "submissions", &params, &submissions, None)
            .await;
        Ok(submissions)
    }

    pub async fn fetch_problem_stats(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<ProblemStats, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "problem_stats", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "problem_stats", username).await {
            return Ok(hit);
        }

        let context = format!("leetcode.problem_stats:{username}");
        let variables = json!({ "username": username });
        let data = self
            .classifier
            .with_retry(&context, || {
                self.graphql(queries::PROBLEM_STATS, variables.clone())
            })
            .await?;

        let matched = data
            .get("matchedUser")
            .filter(|m| !m.is_null())
            .ok_or_else(|| {
                PlatformError::NotFound(format!("LeetCode user '{username}' not found"))
            })?;
        let raw: RawTagProblemCounts = serde_json::from_value(
            matched
                .get("tagProblemCounts")
                .cloned()
                .unwrap_or(json!({})),
        )?;
        let stats = ProblemStats {
            fundamental: convert_tags(raw.fundamental),
            intermediate: convert_tags(raw.intermediate),
            advanced: convert_tags(raw.advanced),
        };
        self.cache
            .set(SERVICE, "problem_stats", username, &stats, None)
            .await;
        Ok(stats)
    }

    /// Language distribution derived from recent *accepted* submissions;
    /// rejected and pending submissions do not count.
    pub async fn fetch_language_stats(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<Vec<LeetCodeLanguageStat>, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "language_stats", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "language_stats", username).await {
            return Ok(hit);
        }

        let submissions = self
            .fetch_recent_submissions(username, MAX_SUBMISSIONS, force_refresh)
            .await?;
        let stats = tally_languages(&submissions);
        debug!("leetcode language stats for {username}: {} languages", stats.len());
        self.cache
            .set(SERVICE, "language_stats", username, &stats, None)
            .await;
        Ok(stats)
    }

    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, PlatformError> {
        self.breaker.call(|| self.post_graphql(query, variables)).await
    }

    async fn post_graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, PlatformError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(
                "LeetCode endpoint not found".to_string(),
            ));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlatformError::RateLimited(
                "LeetCode rate limit reached, try again after 60 seconds".to_string(),
            ));
        }
        if status.is_server_error() {
            return Err(PlatformError::Unavailable(
                "LeetCode API is temporarily unavailable".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(PlatformError::Api(format!(
                "LeetCode API returned status {status}"
            )));
        }

        let body = response.text().await?;
        let envelope: GraphQlEnvelope = serde_json::from_str(&body)?;
        unwrap_envelope(envelope)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response parsing
// ────────────────────────────────────────────────────────────────────────────

/// GraphQL error arrays in a 200 response are failures; the first message is
/// surfaced.
fn unwrap_envelope(envelope: GraphQlEnvelope) -> Result<serde_json::Value, PlatformError> {
    if let Some(errors) = envelope.errors {
        if let Some(first) = errors.first() {
            return Err(PlatformError::Api(format!(
                "GraphQL error: {}",
                first.message
            )));
        }
    }
    envelope
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| PlatformError::Api("GraphQL response missing data".to_string()))
}

fn parse_profile(
    data: &serde_json::Value,
    username: &str,
) -> Result<LeetCodeProfile, PlatformError> {
    let matched = data
        .get("matchedUser")
        .filter(|m| !m.is_null())
        .ok_or_else(|| PlatformError::NotFound(format!("LeetCode user '{username}' not found")))?;
    let raw: RawMatchedUser = serde_json::from_value(matched.clone())?;

    let mut solved: HashMap<String, u32> = HashMap::new();
    if let Some(stats) = raw.submit_stats_global {
        for entry in stats.ac_submission_num {
            solved.insert(entry.difficulty, entry.count);
        }
    }

    let total_questions = data
        .get("allQuestionsCount")
        .and_then(|a| a.as_array())
        .and_then(|counts| {
            counts.iter().find_map(|c| {
                (c.get("difficulty")?.as_str()? == "All")
                    .then(|| c.get("count")?.as_u64())
                    .flatten()
            })
        })
        .unwrap_or(0) as u32;

    let profile = raw.profile.unwrap_or(RawUserProfileInner {
        real_name: None,
        user_avatar: None,
        ranking: None,
        country_name: None,
        reputation: None,
    });

    Ok(LeetCodeProfile {
        username: raw.username,
        real_name: profile.real_name.filter(|n| !n.is_empty()),
        avatar_url: profile.user_avatar,
        country: profile.country_name,
        ranking: profile.ranking.unwrap_or(0),
        reputation: profile.reputation.unwrap_or(0),
        total_solved: solved.get("All").copied().unwrap_or(0),
        easy_solved: solved.get("Easy").copied().unwrap_or(0),
        medium_solved: solved.get("Medium").copied().unwrap_or(0),
        hard_solved: solved.get("Hard").copied().unwrap_or(0),
        total_questions,
    })
}

fn parse_contest(data: &serde_json::Value) -> Result<ContestData, PlatformError> {
    let ranking = data.get("userContestRanking").filter(|r| !r.is_null());
    let Some(ranking) = ranking else {
        return Ok(ContestData::default());
    };
    let raw: RawContestRanking = serde_json::from_value(ranking.clone())?;

    let history: Vec<RawContestHistoryEntry> = serde_json::from_value(
        data.get("userContestRankingHistory")
            .cloned()
            .unwrap_or(serde_json::Value::Array(vec![])),
    )
    .unwrap_or_default();

    Ok(ContestData {
        rating: raw.rating,
        attended: raw.attended_contests_count,
        global_ranking: raw.global_ranking,
        top_percentage: raw.top_percentage,
        badge: raw.badge.and_then(|b| b.name),
        history: history
            .into_iter()
            .filter(|h| h.attended)
            .map(|h| {
                let meta = h.contest.unwrap_or(RawContestMeta {
                    title: String::new(),
                    start_time: 0,
                });
                ContestRound {
                    title: meta.title,
                    start_time: meta.start_time,
                    rating: h.rating,
                    ranking: h.ranking,
                    problems_solved: h.problems_solved,
                    total_problems: h.total_problems,
                }
            })
            .collect(),
    })
}

fn convert_tags(raw: Vec<RawTagCount>) -> Vec<TagCount> {
    raw.into_iter()
        .map(|t| TagCount {
            tag: t.tag_name,
            solved: t.problems_solved,
        })
        .collect()
}

/// Percentages are computed over accepted submissions only.
fn tally_languages(submissions: &[Submission]) -> Vec<LeetCodeLanguageStat> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for submission in submissions.iter().filter(|s| s.status == "Accepted") {
        *counts.entry(submission.lang.clone()).or_insert(0) += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut stats: Vec<LeetCodeLanguageStat> = counts
        .into_iter()
        .map(|(language, solved)| LeetCodeLanguageStat {
            language,
            solved,
            percentage: (solved as f64 / total as f64 * 1000.0).round() / 10.0,
        })
        .collect();
    stats.sort_by(|a, b| b.solved.cmp(&a.solved).then_with(|| a.language.cmp(&b.language)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn submission(lang: &str, status: &str) -> Submission {
        Submission {
            title: "Two Sum".to_string(),
            title_slug: "two-sum".to_string(),
            status: status.to_string(),
            lang: lang.to_string(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_graphql_errors_in_200_response_are_failures() {
        let envelope: GraphQlEnvelope = serde_json::from_value(json!({
            "data": null,
            "errors": [{"message": "user query throttled"}]
        }))
        .unwrap();
        let err = unwrap_envelope(envelope).unwrap_err();
        assert!(err.to_string().contains("user query throttled"));
    }

    #[test]
    fn test_missing_matched_user_is_not_found() {
        let data = json!({ "matchedUser": null, "allQuestionsCount": [] });
        let err = parse_profile(&data, "ghost").unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_profile_parsing_flattens_difficulty_counts() {
        let data = json!({
            "matchedUser": {
                "username": "coder",
                "profile": {"realName": "Ada", "ranking": 1234, "reputation": 50},
                "submitStatsGlobal": {
                    "acSubmissionNum": [
                        {"difficulty": "All", "count": 300},
                        {"difficulty": "Easy", "count": 120},
                        {"difficulty": "Medium", "count": 150},
                        {"difficulty": "Hard", "count": 30}
                    ]
                }
            },
            "allQuestionsCount": [{"difficulty": "All", "count": 3200}]
        });
        let profile = parse_profile(&data, "coder").unwrap();
        assert_eq!(profile.total_solved, 300);
        assert_eq!(profile.hard_solved, 30);
        assert_eq!(profile.total_questions, 3200);
        assert_eq!(profile.real_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_never_attended_contest_yields_default() {
        let data = json!({ "userContestRanking": null });
        let contest = parse_contest(&data).unwrap();
        assert_eq!(contest, ContestData::default());
    }

    #[test]
    fn test_contest_history_filters_unattended_rounds() {
        let data = json!({
            "userContestRanking": {
                "attendedContestsCount": 2,
                "rating": 1650.5,
                "globalRanking": 40000,
                "topPercentage": 12.5
            },
            "userContestRankingHistory": [
                {"attended": true, "rating": 1600.0, "ranking": 5000,
                 "problemsSolved": 3, "totalProblems": 4,
                 "contest": {"title": "Weekly 400", "startTime": 1700000000}},
                {"attended": false, "rating": 1500.0, "ranking": 0,
                 "problemsSolved": 0, "totalProblems": 4,
                 "contest": {"title": "Weekly 401", "startTime": 1700600000}}
            ]
        });
        let contest = parse_contest(&data).unwrap();
        assert_eq!(contest.attended, 2);
        assert_eq!(contest.history.len(), 1);
        assert_eq!(contest.history[0].title, "Weekly 400");
    }

    #[test]
    fn test_language_tally_counts_accepted_only() {
        let submissions = vec![
            submission("rust", "Accepted"),
            submission("rust", "Accepted"),
            submission("python3", "Accepted"),
            submission("python3", "Wrong Answer"),
            submission("cpp", "Time Limit Exceeded"),
        ];
        let stats = tally_languages(&submissions);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].language, "rust");
        assert_eq!(stats[0].solved, 2);
        let sum: f64 = stats.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.5, "sum was {sum}");
    }

    #[test]
    fn test_language_tally_empty_when_nothing_accepted() {
        let submissions = vec![submission("rust", "Wrong Answer")];
        assert!(tally_languages(&submissions).is_empty());
    }
}
