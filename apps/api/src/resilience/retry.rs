use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::platforms::PlatformError;
use crate::resilience::ErrorClassifier;

/// Upper bound on random jitter added to every backoff delay.
const MAX_JITTER_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff for the given zero-based attempt, capped at
    /// `max_delay`, without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let millis =
            self.base_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

impl ErrorClassifier {
    /// Runs `operation`, retrying transient failures with jittered exponential
    /// backoff. Non-retryable failures and exhausted attempts return the
    /// *original* error unchanged; the classified record only drives logging
    /// and the retry decision.
    pub async fn with_retry<T, F, Fut>(
        &self,
        context: &str,
        mut operation: F,
    ) -> Result<T, PlatformError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let record = self.classify(&err, context);
                    let kind = record.kind;
                    let can_retry = record.can_retry;
                    self.record(record);

                    if !can_retry || attempt + 1 >= self.policy.max_attempts {
                        warn!(
                            "{context}: giving up after attempt {} ({kind}): {err}",
                            attempt + 1
                        );
                        return Err(err);
                    }

                    let jitter = Duration::from_millis(
                        rand::thread_rng().gen_range(0..MAX_JITTER_MS),
                    );
                    let delay = self.policy.backoff(attempt) + jitter;
                    warn!(
                        "{context}: attempt {} failed ({kind}), retrying in {}ms",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn classifier() -> ErrorClassifier {
        ErrorClassifier::new(RetryPolicy {
            base_delay: Duration::from_millis(10),
            ..RetryPolicy::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_invokes_operation_exactly_once() {
        let classifier = classifier();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = classifier
            .with_retry("github.profile", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PlatformError::NotFound("user not found".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success_invokes_three_times() {
        let classifier = classifier();
        let calls = AtomicU32::new(0);

        let result = classifier
            .with_retry("github.repos", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(PlatformError::Api("flaky".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_return_original_error() {
        let classifier = classifier();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = classifier
            .with_retry("leetcode.profile", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PlatformError::Api("persistent failure".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(PlatformError::Api(msg)) => assert_eq!(msg, "persistent failure"),
            other => panic!("expected the original Api error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_append_to_rolling_log() {
        let classifier = classifier();
        let _: Result<(), _> = classifier
            .with_retry("github.events", || async {
                Err(PlatformError::Api("boom".to_string()))
            })
            .await;

        // One record per failed attempt
        assert_eq!(classifier.recent_errors().len(), 3);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(10), policy.max_delay);
    }
}
