pub mod handlers;
pub mod health;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/score", get(handlers::handle_score))
        .route("/api/v1/analysis/:username", get(handlers::handle_analysis))
        .route(
            "/api/v1/cache/:username",
            delete(handlers::handle_cache_invalidate),
        )
        .route("/api/v1/errors/recent", get(handlers::handle_recent_errors))
        .with_state(state)
}
