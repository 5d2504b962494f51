//! Score, analysis, and cache-management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreParams {
    pub github_username: String,
    pub leetcode_username: String,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/v1/score?github_username=..&leetcode_username=..&refresh=false
pub async fn handle_score(
    State(state): State<AppState>,
    Query(params): Query<ScoreParams>,
) -> Result<Json<Value>, AppError> {
    let score = state
        .scoring
        .calculate_unified_score(
            &params.github_username,
            &params.leetcode_username,
            params.refresh,
        )
        .await?;
    Ok(Json(json!(score)))
}

/// GET /api/v1/analysis/:username?refresh=false
pub async fn handle_analysis(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<Value>, AppError> {
    let analysis = state.analyzer.analyze(&username, params.refresh, None).await?;
    Ok(Json(json!(analysis)))
}

/// DELETE /api/v1/cache/:username
/// Drops every cached entry whose key mentions the username, in both tiers.
pub async fn handle_cache_invalidate(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    info!("invalidating cached entries for {username}");
    state.cache.invalidate_pattern(&username).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/errors/recent
/// Most recent classified errors, newest first.
pub async fn handle_recent_errors(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "errors": state.classifier.recent_errors() }))
}
