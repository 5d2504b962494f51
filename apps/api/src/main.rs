mod analyzer;
mod cache;
mod config;
mod db;
mod errors;
mod platforms;
mod resilience;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer::ProfileAnalyzer;
use crate::cache::backend::{CacheBackend, PgCacheBackend};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::db::{create_pool, ensure_cache_table};
use crate::platforms::github::GitHubClient;
use crate::platforms::leetcode::LeetCodeClient;
use crate::resilience::retry::RetryPolicy;
use crate::resilience::ErrorClassifier;
use crate::routes::build_router;
use crate::scoring::ScoringEngine;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("devscore_api={}", &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DevScore API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the persistent cache tier
    let db = create_pool(&config.database_url).await?;
    ensure_cache_table(&db).await?;

    let backend = Arc::new(PgCacheBackend::new(db.clone()));
    match backend.purge_expired().await {
        Ok(n) if n > 0 => info!("purged {n} expired cache rows"),
        Ok(_) => {}
        Err(e) => warn!("startup cache purge failed: {e}"),
    }

    let cache = Arc::new(CacheStore::new(
        Some(backend),
        config.cache_capacity,
        Duration::from_secs(config.cache_ttl_hours * 60 * 60),
    ));

    // Shared error classifier and retry policy
    let classifier = Arc::new(ErrorClassifier::new(RetryPolicy::default()));

    // Platform clients
    let github = Arc::new(GitHubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
        cache.clone(),
        classifier.clone(),
    ));
    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set; unauthenticated rate limits apply");
    }
    let leetcode = Arc::new(LeetCodeClient::new(
        config.leetcode_graphql_url.clone(),
        cache.clone(),
        classifier.clone(),
    ));

    // Analyzer and scoring engine
    let analyzer = Arc::new(ProfileAnalyzer::new(github.clone(), cache.clone()));
    let scoring = Arc::new(ScoringEngine::new(github, leetcode));

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        cache,
        classifier,
        analyzer,
        scoring,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
