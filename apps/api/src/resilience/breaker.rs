use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::platforms::PlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Per-service circuit breaker. While open, calls fail immediately without
/// invoking the wrapped operation. Not meant to be shared across logically
/// distinct call sites unless shared fate is intended.
pub struct CircuitBreaker {
    service: String,
    failure_threshold: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(service: impl Into<String>, failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            service: service.into(),
            failure_threshold,
            reset_timeout,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().expect("breaker lock poisoned").state
    }

    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T, PlatformError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        // Fast-fail check happens before the operation runs; the lock is never
        // held across an await point.
        {
            let mut inner = self.inner.lock().expect("breaker lock poisoned");
            if inner.state == BreakerState::Open {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed < self.reset_timeout {
                    return Err(PlatformError::Unavailable(format!(
                        "{} is temporarily unavailable (circuit open)",
                        self.service
                    )));
                }
                info!("circuit breaker for {} entering half-open", self.service);
                inner.state = BreakerState::HalfOpen;
            }
        }

        match operation().await {
            Ok(value) => {
                let mut inner = self.inner.lock().expect("breaker lock poisoned");
                if inner.state != BreakerState::Closed {
                    info!("circuit breaker for {} closed", self.service);
                }
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                Ok(value)
            }
            Err(err) if err.trips_breaker() => {
                let mut inner = self.inner.lock().expect("breaker lock poisoned");
                inner.consecutive_failures += 1;
                if inner.state == BreakerState::HalfOpen
                    || inner.consecutive_failures >= self.failure_threshold
                {
                    warn!(
                        "circuit breaker for {} opened after {} consecutive failures",
                        self.service, inner.consecutive_failures
                    );
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fail(breaker: &CircuitBreaker) -> Result<(), PlatformError> {
        breaker
            .call(|| async { Err(PlatformError::Api("down".to_string())) })
            .await
            .map(|_: ()| ())
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new("github", 3, Duration::from_secs(30));
        for _ in 0..3 {
            let _ = fail(&breaker).await;
        }
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_fails_without_invoking() {
        let breaker = CircuitBreaker::new("github", 1, Duration::from_secs(30));
        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Open);

        let mut invoked = false;
        let result = breaker
            .call(|| {
                invoked = true;
                async { Ok(1) }
            })
            .await;
        assert!(result.is_err());
        assert!(!invoked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_closes_on_success() {
        let breaker = CircuitBreaker::new("leetcode", 1, Duration::from_secs(5));
        let _ = fail(&breaker).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        let result = breaker.call(|| async { Ok("recovered") }).await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_never_open_the_circuit() {
        let breaker = CircuitBreaker::new("github", 1, Duration::from_secs(30));
        for _ in 0..10 {
            let result: Result<(), _> = breaker
                .call(|| async { Err(PlatformError::NotFound("no such user".to_string())) })
                .await;
            assert!(result.is_err());
        }
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_reopens_on_failure() {
        let breaker = CircuitBreaker::new("leetcode", 1, Duration::from_secs(5));
        let _ = fail(&breaker).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        let _ = fail(&breaker).await;
        assert_eq!(breaker.state(), BreakerState::Open);
    }
}
