use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// One row of the persistent cache tier.
#[derive(Debug, Clone, FromRow)]
pub struct CacheRow {
    pub cache_key: String,
    /// Serialized JSON payload.
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Persistent cache tier. Kept behind a trait so tests can substitute an
/// in-memory fake for the Postgres-backed implementation.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<CacheRow>>;
    async fn upsert(&self, row: &CacheRow) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Deletes every row whose key contains `pattern` (`LIKE '%pattern%'`).
    async fn delete_like(&self, pattern: &str) -> Result<()>;
    /// Range-deletes rows whose `expires_at` has passed. Returns rows removed.
    async fn purge_expired(&self) -> Result<u64>;
    async fn clear(&self) -> Result<()>;
}

pub struct PgCacheBackend {
    pool: PgPool,
}

impl PgCacheBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheBackend for PgCacheBackend {
    async fn fetch(&self, key: &str) -> Result<Option<CacheRow>> {
        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT cache_key, data, created_at, expires_at FROM api_cache WHERE cache_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert(&self, row: &CacheRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO api_cache (cache_key, data, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (cache_key)
            DO UPDATE SET data = $2, created_at = $3, expires_at = $4
            "#,
        )
        .bind(&row.cache_key)
        .bind(&row.data)
        .bind(row.created_at)
        .bind(row.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM api_cache WHERE cache_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_like(&self, pattern: &str) -> Result<()> {
        sqlx::query("DELETE FROM api_cache WHERE cache_key LIKE $1")
            .bind(format!("%{pattern}%"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM api_cache WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM api_cache").execute(&self.pool).await?;
        Ok(())
    }
}
