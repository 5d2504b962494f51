use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::platforms::PlatformError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Validation(msg) => AppError::Validation(msg),
            PlatformError::NotFound(msg) => AppError::NotFound(msg),
            PlatformError::RateLimited(msg) => AppError::RateLimited(msg),
            PlatformError::AuthFailed(msg) => AppError::Upstream(msg),
            PlatformError::Unavailable(msg) => AppError::Unavailable(msg),
            PlatformError::Api(msg) => AppError::Upstream(msg),
            PlatformError::Http(e) => AppError::Unavailable(e.to_string()),
            PlatformError::Parse(e) => AppError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream API error: {msg}");
                (StatusCode::BAD_GATEWAY, "API_ERROR", msg.clone())
            }
            AppError::Unavailable(msg) => {
                tracing::error!("Upstream unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "An upstream service is temporarily unavailable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_errors_map_to_expected_statuses() {
        let cases = [
            (PlatformError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (PlatformError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                PlatformError::RateLimited("wait".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (PlatformError::Api("oops".into()), StatusCode::BAD_GATEWAY),
            (
                PlatformError::Unavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
