use std::sync::Arc;

use sqlx::PgPool;

use crate::analyzer::ProfileAnalyzer;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::resilience::ErrorClassifier;
use crate::scoring::ScoringEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub cache: Arc<CacheStore>,
    pub classifier: Arc<ErrorClassifier>,
    pub analyzer: Arc<ProfileAnalyzer>,
    pub scoring: Arc<ScoringEngine>,
}
