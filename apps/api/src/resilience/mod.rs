//! Failure classification and recovery for upstream platform calls.
//!
//! Every network failure flows through [`ErrorClassifier::classify`] before a
//! retry decision is made. Classified records land in a bounded rolling log
//! exposed by the diagnostics endpoint; the *original* error is what callers
//! ultimately receive.

pub mod breaker;
pub mod retry;
pub mod validate;

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::platforms::PlatformError;
use crate::resilience::retry::RetryPolicy;

/// Most-recent-first rolling log capacity.
const ERROR_LOG_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Api,
    RateLimit,
    NotFound,
    Validation,
    Cache,
    Timeout,
    Unknown,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        match self {
            ErrorKind::Network
            | ErrorKind::Api
            | ErrorKind::RateLimit
            | ErrorKind::Timeout
            | ErrorKind::Unknown => true,
            ErrorKind::NotFound | ErrorKind::Validation | ErrorKind::Cache => false,
        }
    }

    /// Canned, user-safe message. Deliberately distinct from the raw error text.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Network => "Unable to reach the service. Check your connection and try again.",
            ErrorKind::Api => "The upstream service returned an unexpected response. Please try again.",
            ErrorKind::RateLimit => "Too many requests right now. Please wait a moment before retrying.",
            ErrorKind::NotFound => "The requested profile could not be found.",
            ErrorKind::Validation => "The provided input is invalid.",
            ErrorKind::Cache => "A local storage error occurred. Results may load slower than usual.",
            ErrorKind::Timeout => "The request took too long to complete. Please try again.",
            ErrorKind::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Api => "API_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Cache => "CACHE_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        };
        write!(f, "{label}")
    }
}

/// One classified failure, kept for diagnostics only — never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub context: String,
    pub can_retry: bool,
    /// Parsed from free-text "try again after N seconds" phrasings, when present.
    pub retry_after_secs: Option<u64>,
    pub user_message: String,
}

/// Classifies raw failures and keeps the rolling diagnostic log.
pub struct ErrorClassifier {
    pub(crate) policy: RetryPolicy,
    log: Mutex<VecDeque<ErrorRecord>>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl ErrorClassifier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            log: Mutex::new(VecDeque::new()),
        }
    }

    /// Matches the raw error message against ordered rules and returns the
    /// classified record. Rule order matters: "rate limit" must win over the
    /// generic "api" match, and "not found" over everything retryable.
    pub fn classify(&self, error: &PlatformError, context: &str) -> ErrorRecord {
        let kind = match error {
            PlatformError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            PlatformError::Http(_) => ErrorKind::Network,
            other => classify_message(&other.to_string()),
        };

        let retry_after = match kind {
            ErrorKind::RateLimit => parse_retry_after(&error.to_string()),
            _ => None,
        };

        ErrorRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            context: context.to_string(),
            can_retry: kind.is_retryable(),
            retry_after_secs: retry_after.map(|d| d.as_secs()),
            user_message: contextual_message(kind, context),
        }
    }

    pub(crate) fn record(&self, record: ErrorRecord) {
        let mut log = self.log.lock().expect("error log lock poisoned");
        log.push_front(record);
        log.truncate(ERROR_LOG_CAP);
    }

    /// Snapshot of the rolling log, most recent first.
    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.log
            .lock()
            .expect("error log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

fn classify_message(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();

    if lower.contains("network") || lower.contains("fetch") || lower.contains("connection") {
        ErrorKind::Network
    } else if lower.contains("rate limit") || lower.contains("429") {
        ErrorKind::RateLimit
    } else if lower.contains("not found") || lower.contains("404") {
        ErrorKind::NotFound
    } else if lower.contains("invalid") || lower.contains("validation") {
        ErrorKind::Validation
    } else if lower.contains("api") || lower.contains("graphql") {
        ErrorKind::Api
    } else if lower.contains("cache") || lower.contains("storage") {
        ErrorKind::Cache
    } else if lower.contains("timeout") || lower.contains("timed out") {
        ErrorKind::Timeout
    } else {
        ErrorKind::Unknown
    }
}

/// Extends the canned message with a service-specific caveat when the call
/// context names the platform.
fn contextual_message(kind: ErrorKind, context: &str) -> String {
    let base = kind.user_message();
    let lower = context.to_lowercase();
    if lower.contains("github") {
        format!("{base} This may be due to GitHub API limitations or the profile being private.")
    } else if lower.contains("leetcode") {
        format!("{base} The LeetCode profile may be private or the proxy may be unavailable.")
    } else {
        base.to_string()
    }
}

/// Best-effort extraction of a wait duration from phrasings like
/// "try again after 30 seconds" or "retry after 2 minutes". Differently
/// worded messages fall through to `None`.
fn parse_retry_after(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let idx = lower.find("after")?;
    let rest = &lower[idx + "after".len()..];
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    let n: u64 = digits.parse().ok()?;
    if rest.contains("minute") {
        Some(Duration::from_secs(n * 60))
    } else if rest.contains("second") {
        Some(Duration::from_secs(n))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_retryable() {
        let classifier = ErrorClassifier::default();
        let err = PlatformError::NotFound("GitHub user 'ghost' not found".to_string());
        let record = classifier.classify(&err, "github.profile");
        assert_eq!(record.kind, ErrorKind::NotFound);
        assert!(!record.can_retry);
    }

    #[test]
    fn test_rate_limit_retryable_with_parsed_wait() {
        let classifier = ErrorClassifier::default();
        let err = PlatformError::RateLimited(
            "GitHub rate limit reached, try again after 120 seconds".to_string(),
        );
        let record = classifier.classify(&err, "github.repos");
        assert_eq!(record.kind, ErrorKind::RateLimit);
        assert!(record.can_retry);
        assert_eq!(record.retry_after_secs, Some(120));
    }

    #[test]
    fn test_rate_limit_minutes_phrasing() {
        let classifier = ErrorClassifier::default();
        let err = PlatformError::RateLimited("please retry after 2 minutes".to_string());
        let record = classifier.classify(&err, "github");
        assert_eq!(record.retry_after_secs, Some(120));
    }

    #[test]
    fn test_unrecognized_phrasing_has_no_retry_after() {
        let classifier = ErrorClassifier::default();
        let err = PlatformError::RateLimited("slow down, rate limit hit".to_string());
        let record = classifier.classify(&err, "github");
        assert_eq!(record.kind, ErrorKind::RateLimit);
        assert_eq!(record.retry_after_secs, None);
    }

    #[test]
    fn test_validation_message_classified() {
        assert_eq!(
            classify_message("Validation error: username is empty"),
            ErrorKind::Validation
        );
        assert_eq!(classify_message("invalid email address"), ErrorKind::Validation);
    }

    #[test]
    fn test_graphql_message_classified_as_api() {
        assert_eq!(
            classify_message("GraphQL query returned errors"),
            ErrorKind::Api
        );
    }

    #[test]
    fn test_unknown_fallback_is_retryable() {
        let kind = classify_message("something exploded");
        assert_eq!(kind, ErrorKind::Unknown);
        assert!(kind.is_retryable());
    }

    #[test]
    fn test_context_caveat_appended_for_github() {
        let msg = contextual_message(ErrorKind::Api, "github.language_stats");
        assert!(msg.contains("GitHub API limitations"));
    }

    #[test]
    fn test_log_is_bounded_and_most_recent_first() {
        let classifier = ErrorClassifier::default();
        for i in 0..60 {
            let err = PlatformError::Api(format!("boom {i}"));
            let record = classifier.classify(&err, "test");
            classifier.record(record);
        }
        let log = classifier.recent_errors();
        assert_eq!(log.len(), ERROR_LOG_CAP);
        // Most recent entry first
        assert!(log[0].timestamp >= log[ERROR_LOG_CAP - 1].timestamp);
    }
}
