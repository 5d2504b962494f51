pub mod github;
pub mod leetcode;

use thiserror::Error;

/// Error type shared by both platform clients.
///
/// Variant messages are user-safe by construction: clients build them from
/// known status codes and usernames, never from raw upstream response bodies.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PlatformError {
    /// Infrastructure-level failures count toward opening a circuit.
    /// Client-side errors (bad input, missing users) never do.
    pub fn trips_breaker(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Unavailable(_) | Self::Api(_) | Self::RateLimited(_)
        )
    }
}
