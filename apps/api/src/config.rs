use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` is required; everything else has a sensible default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub github_api_url: String,
    /// Optional personal access token. Unauthenticated GitHub access works but
    /// hits much lower rate limits.
    pub github_token: Option<String>,
    pub leetcode_graphql_url: String,
    pub port: u16,
    pub rust_log: String,
    pub cache_ttl_hours: u64,
    pub cache_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            github_api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            leetcode_graphql_url: std::env::var("LEETCODE_GRAPHQL_URL")
                .unwrap_or_else(|_| "https://leetcode.com/graphql".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cache_ttl_hours: std::env::var("CACHE_TTL_HOURS")
                .unwrap_or_else(|_| "6".to_string())
                .parse::<u64>()
                .context("CACHE_TTL_HOURS must be a number of hours")?,
            cache_capacity: std::env::var("CACHE_CAPACITY")
                .unwrap_or_else(|_| "100".to_string())
                .parse::<usize>()
                .context("CACHE_CAPACITY must be a number of entries")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
