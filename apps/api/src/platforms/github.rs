//! GitHub REST client. Every method is cache-aware: consult the cache (or
//! invalidate on forced refresh), fetch through the retry wrapper, normalize
//! the upstream payload, store, return. Normalized shapes carry no
//! upstream-specific envelope fields.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::platforms::PlatformError;
use crate::resilience::breaker::CircuitBreaker;
use crate::resilience::validate::validate_username;
use crate::resilience::ErrorClassifier;

const SERVICE: &str = "github";
/// Unauthenticated calls get 60 req/hour upstream; a configured token raises
/// that to 5000 req/hour.
const PER_REPO_DELAY: Duration = Duration::from_millis(100);
const MAX_LANGUAGE_REPOS: usize = 20;
const TOP_LANGUAGES: usize = 8;
const RECENT_PUSH_BONUS: u32 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Normalized shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub watchers: u32,
    pub open_issues: u32,
    pub size_kb: u64,
    pub is_fork: bool,
    pub is_archived: bool,
    pub is_private: bool,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RepositoryRecord {
    /// Forked and archived repositories are excluded from every activity and
    /// quality aggregate.
    pub fn is_active(&self) -> bool {
        !self.is_fork && !self.is_archived
    }
}

/// One normalized public event. Unrecognized upstream event types are
/// filtered out entirely rather than passed through with empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub action: String,
    pub repo: String,
    pub details: String,
    pub message: Option<String>,
    pub branch: Option<String>,
    /// Commit count for push events, zero otherwise.
    pub commits: u32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitWeek {
    /// Unix epoch seconds of the week start.
    pub week_start: i64,
    pub total: u32,
    pub days: Vec<u32>,
}

/// One language's share of a user's weighted code volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    pub weighted_bytes: u64,
    pub percentage: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Raw upstream payloads (deserialize-only, never leave this module)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: String,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    blog: Option<String>,
    #[serde(default)]
    public_repos: u32,
    #[serde(default)]
    followers: u32,
    #[serde(default)]
    following: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<RawUser> for GitHubProfile {
    fn from(raw: RawUser) -> Self {
        GitHubProfile {
            login: raw.login,
            name: raw.name,
            avatar_url: raw.avatar_url,
            bio: raw.bio,
            company: raw.company,
            location: raw.location,
            blog: raw.blog.filter(|b| !b.is_empty()),
            public_repos: raw.public_repos,
            followers: raw.followers,
            following: raw.following,
            created_at: raw.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLicense {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
    name: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    watchers_count: u32,
    #[serde(default)]
    open_issues_count: u32,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default, rename = "private")]
    is_private: bool,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    license: Option<RawLicense>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
}

impl From<RawRepo> for RepositoryRecord {
    fn from(raw: RawRepo) -> Self {
        RepositoryRecord {
            name: raw.name,
            full_name: raw.full_name,
            description: raw.description,
            language: raw.language,
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            watchers: raw.watchers_count,
            open_issues: raw.open_issues_count,
            size_kb: raw.size,
            is_fork: raw.fork,
            is_archived: raw.archived,
            is_private: raw.is_private,
            topics: raw.topics,
            license: raw.license.and_then(|l| l.name),
            html_url: raw.html_url,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            pushed_at: raw.pushed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEventRepo {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    repo: Option<RawEventRepo>,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawCommitWeek {
    week: i64,
    total: u32,
    #[serde(default)]
    days: Vec<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cache: Arc<CacheStore>,
    classifier: Arc<ErrorClassifier>,
    breaker: CircuitBreaker,
}

impl GitHubClient {
    pub fn new(
        base_url: String,
        token: Option<String>,
        cache: Arc<CacheStore>,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            cache,
            classifier,
            breaker: CircuitBreaker::new(SERVICE, 5, Duration::from_secs(60)),
        }
    }

    pub async fn fetch_user_profile(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<GitHubProfile, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "profile", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "profile", username).await {
            return Ok(hit);
        }

        let context = format!("github.profile:{username}");
        let path = format!("/users/{username}");
        let resource = format!("user '{username}'");
        let value = self
            .classifier
            .with_retry(&context, || self.get_json(&path, &resource))
            .await?;
        let raw: RawUser = serde_json::from_value(value)?;
        let profile = GitHubProfile::from(raw);
        self.cache
            .set(SERVICE, "profile", username, &profile, None)
            .await;
        Ok(profile)
    }

    pub async fn fetch_user_repositories(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<Vec<RepositoryRecord>, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "repos", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "repos", username).await {
            return Ok(hit);
        }

        let context = format!("github.repos:{username}");
        let path = format!("/users/{username}/repos?per_page=100&sort=updated");
        let resource = format!("repositories for '{username}'");
        let value = self
            .classifier
            .with_retry(&context, || self.get_json(&path, &resource))
            .await?;
        let raw: Vec<RawRepo> = serde_json::from_value(value)?;
        let repos: Vec<RepositoryRecord> = raw.into_iter().map(RepositoryRecord::from).collect();
        self.cache.set(SERVICE, "repos", username, &repos, None).await;
        Ok(repos)
    }

    pub async fn fetch_repository_languages(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> Result<HashMap<String, u64>, PlatformError> {
        validate_username(owner)?;
        let params = format!("{owner}/{repo}");
        if force_refresh {
            self.cache.invalidate(SERVICE, "languages", &params).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "languages", &params).await {
            return Ok(hit);
        }

        let context = format!("github.languages:{params}");
        let path = format!("/repos/{owner}/{repo}/languages");
        let resource = format!("repository '{params}'");
        let value = self
            .classifier
            .with_retry(&context, || self.get_json(&path, &resource))
            .await?;
        let languages: HashMap<String, u64> = serde_json::from_value(value)?;
        self.cache
            .set(SERVICE, "languages", &params, &languages, None)
            .await;
        Ok(languages)
    }

    pub async fn fetch_repo_commit_activity(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> Result<Vec<CommitWeek>, PlatformError> {
        validate_username(owner)?;
        let params = format!("{owner}/{repo}");
        if force_refresh {
            self.cache.invalidate(SERVICE, "commit_activity", &params).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "commit_activity", &params).await {
            return Ok(hit);
        }

        let context = format!("github.commit_activity:{params}");
        let path = format!("/repos/{owner}/{repo}/stats/commit_activity");
        let resource = format!("repository '{params}'");
        let value = self
            .classifier
            .with_retry(&context, || self.get_json(&path, &resource))
            .await?;
        let raw: Vec<RawCommitWeek> = serde_json::from_value(value)?;
        let weeks: Vec<CommitWeek> = raw
            .into_iter()
            .map(|w| CommitWeek {
                week_start: w.week,
                total: w.total,
                days: w.days,
            })
            .collect();
        self.cache
            .set(SERVICE, "commit_activity", &params, &weeks, None)
            .await;
        Ok(weeks)
    }

    pub async fn fetch_recent_activity(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<Vec<ActivityEvent>, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "recent_activity", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "recent_activity", username).await {
            return Ok(hit);
        }

        let context = format!("github.recent_activity:{username}");
        let path = format!("/users/{username}/events/public?per_page=50");
        let resource = format!("events for '{username}'");
        let value = self
            .classifier
            .with_retry(&context, || self.get_json(&path, &resource))
            .await?;
        let raw: Vec<RawEvent> = serde_json::from_value(value)?;
        let events: Vec<ActivityEvent> = raw.into_iter().filter_map(format_event).collect();
        self.cache
            .set(SERVICE, "recent_activity", username, &events, None)
            .await;
        Ok(events)
    }

    /// Aggregates per-repository language bytes into a weighted distribution
    /// over the user's top languages. Serialized with a small delay between
    /// per-repository calls as a self-throttle against upstream rate limits;
    /// individual repository failures are skipped, not fatal.
    pub async fn fetch_language_stats(
        &self,
        username: &str,
        force_refresh: bool,
    ) -> Result<Vec<LanguageStat>, PlatformError> {
        validate_username(username)?;
        if force_refresh {
            self.cache.invalidate(SERVICE, "language_stats", username).await;
        } else if let Some(hit) = self.cache.get(SERVICE, "language_stats", username).await {
            return Ok(hit);
        }

        let repos = self.fetch_user_repositories(username, force_refresh).await?;
        let ranked = rank_repositories(&repos, Utc::now());

        let mut weighted: HashMap<String, f64> = HashMap::new();
        for (i, repo) in ranked.iter().take(MAX_LANGUAGE_REPOS).enumerate() {
            if i > 0 {
                tokio::time::sleep(PER_REPO_DELAY).await;
            }
            match self
                .fetch_repository_languages(username, &repo.name, force_refresh)
                .await
            {
                Ok(languages) => {
                    let weight = 1.0 + significance(repo, Utc::now()) as f64 / 100.0;
                    for (language, bytes) in languages {
                        *weighted.entry(language).or_insert(0.0) += bytes as f64 * weight;
                    }
                }
                Err(e) => {
                    warn!("skipping languages for {}/{}: {e}", username, repo.name);
                }
            }
        }

        let stats = build_language_stats(weighted);
        debug!("language stats for {username}: {} languages", stats.len());
        self.cache
            .set(SERVICE, "language_stats", username, &stats, None)
            .await;
        Ok(stats)
    }

    async fn get_json(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<serde_json::Value, PlatformError> {
        self.breaker.call(|| self.request_json(path, resource)).await
    }

    async fn request_json(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<serde_json::Value, PlatformError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).header(USER_AGENT, "devscore-api");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::ACCEPTED {
            // GitHub computes commit statistics lazily and answers 202 while
            // they are being generated; retryable.
            return Err(PlatformError::Api(
                "GitHub is still generating statistics for this resource".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(map_error_status(status, response.headers(), resource));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Status mapping
// ────────────────────────────────────────────────────────────────────────────

fn map_error_status(status: StatusCode, headers: &HeaderMap, resource: &str) -> PlatformError {
    let header_i64 = |name: &str| -> Option<i64> {
        headers.get(name)?.to_str().ok()?.trim().parse().ok()
    };

    match status {
        StatusCode::NOT_FOUND => {
            PlatformError::NotFound(format!("GitHub {resource} not found"))
        }
        StatusCode::FORBIDDEN => {
            let remaining = header_i64("x-ratelimit-remaining");
            let retry_after = header_i64("retry-after");
            if remaining == Some(0) || retry_after.is_some() {
                let wait = rate_limit_wait(
                    header_i64("x-ratelimit-reset"),
                    retry_after,
                    Utc::now().timestamp(),
                );
                PlatformError::RateLimited(format!(
                    "GitHub API rate limit reached, try again after {wait}"
                ))
            } else {
                PlatformError::AuthFailed("GitHub API access forbidden".to_string())
            }
        }
        StatusCode::UNAUTHORIZED => PlatformError::AuthFailed(
            "GitHub API authentication failed, check the configured token".to_string(),
        ),
        s if s.is_server_error() => {
            PlatformError::Unavailable("GitHub API is temporarily unavailable".to_string())
        }
        s => PlatformError::Api(format!("GitHub API returned status {s}")),
    }
}

/// Human-readable wait derived from the `Retry-After` header or the
/// rate-limit reset epoch, rounded up to whole minutes.
fn rate_limit_wait(reset_epoch: Option<i64>, retry_after: Option<i64>, now_epoch: i64) -> String {
    let seconds = retry_after
        .or_else(|| reset_epoch.map(|r| r - now_epoch))
        .unwrap_or(60)
        .max(0);
    let minutes = ((seconds + 59) / 60).max(1);
    format!("{minutes} minute(s)")
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization helpers
// ────────────────────────────────────────────────────────────────────────────

/// Repository relevance for the language aggregation: stars count double,
/// forks single, with a flat bonus for a push within the last year.
fn significance(repo: &RepositoryRecord, now: DateTime<Utc>) -> u32 {
    let mut score = repo.stars * 2 + repo.forks;
    if let Some(pushed) = repo.pushed_at {
        if (now - pushed).num_days() < 365 {
            score += RECENT_PUSH_BONUS;
        }
    }
    score
}

/// Active repositories ordered by descending significance.
fn rank_repositories(
    repos: &[RepositoryRecord],
    now: DateTime<Utc>,
) -> Vec<&RepositoryRecord> {
    let mut active: Vec<&RepositoryRecord> = repos.iter().filter(|r| r.is_active()).collect();
    active.sort_by_key(|r| std::cmp::Reverse(significance(r, now)));
    active
}

fn build_language_stats(weighted: HashMap<String, f64>) -> Vec<LanguageStat> {
    let mut entries: Vec<(String, f64)> = weighted.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_LANGUAGES);

    let total: f64 = entries.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    entries
        .into_iter()
        .map(|(language, w)| LanguageStat {
            language,
            weighted_bytes: w as u64,
            percentage: (w / total * 1000.0).round() / 10.0,
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Maps the six known GitHub event types to the normalized activity shape.
/// Anything else returns `None` and is dropped.
fn format_event(raw: RawEvent) -> Option<ActivityEvent> {
    let repo = raw.repo.map(|r| r.name).unwrap_or_default();
    let payload = &raw.payload;

    let event = match raw.event_type.as_str() {
        "PushEvent" => {
            let commits = payload
                .get("commits")
                .and_then(|c| c.as_array())
                .map(|c| c.len() as u32)
                .or_else(|| payload.get("size").and_then(|s| s.as_u64()).map(|s| s as u32))
                .unwrap_or(0);
            let message = payload
                .pointer("/commits/0/message")
                .and_then(|m| m.as_str())
                .map(String::from);
            let branch = payload
                .get("ref")
                .and_then(|r| r.as_str())
                .map(|r| r.trim_start_matches("refs/heads/").to_string());
            ActivityEvent {
                action: "Pushed".to_string(),
                repo,
                details: format!("{commits} commit(s)"),
                message,
                branch,
                commits,
                created_at: raw.created_at,
            }
        }
        "CreateEvent" => {
            let ref_type = payload
                .get("ref_type")
                .and_then(|r| r.as_str())
                .unwrap_or("repository");
            let ref_name = payload.get("ref").and_then(|r| r.as_str());
            ActivityEvent {
                action: "Created".to_string(),
                repo,
                details: match ref_name {
                    Some(name) => format!("{ref_type} {name}"),
                    None => ref_type.to_string(),
                },
                message: None,
                branch: ref_name
                    .filter(|_| ref_type == "branch")
                    .map(String::from),
                commits: 0,
                created_at: raw.created_at,
            }
        }
        "ForkEvent" => ActivityEvent {
            action: "Forked".to_string(),
            repo,
            details: payload
                .pointer("/forkee/full_name")
                .and_then(|f| f.as_str())
                .unwrap_or_default()
                .to_string(),
            message: None,
            branch: None,
            commits: 0,
            created_at: raw.created_at,
        },
        "WatchEvent" => ActivityEvent {
            action: "Starred".to_string(),
            details: repo.clone(),
            repo,
            message: None,
            branch: None,
            commits: 0,
            created_at: raw.created_at,
        },
        "IssuesEvent" => ActivityEvent {
            action: format!(
                "{} issue",
                capitalize(
                    payload
                        .get("action")
                        .and_then(|a| a.as_str())
                        .unwrap_or("updated")
                )
            ),
            repo,
            details: payload
                .pointer("/issue/title")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            message: None,
            branch: None,
            commits: 0,
            created_at: raw.created_at,
        },
        "PullRequestEvent" => ActivityEvent {
            action: format!(
                "{} pull request",
                capitalize(
                    payload
                        .get("action")
                        .and_then(|a| a.as_str())
                        .unwrap_or("updated")
                )
            ),
            repo,
            details: payload
                .pointer("/pull_request/title")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            message: None,
            branch: None,
            commits: 0,
            created_at: raw.created_at,
        },
        _ => return None,
    };

    Some(event)
}
