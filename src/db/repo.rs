//! Repository for the rate cache table.

use crate::domain::{Decimal, Symbol};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::warn;

/// A cached conversion rate and the time it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRate {
    pub rate: Decimal,
    pub cached_at_ms: i64,
}

/// Repository for database operations.
#[derive(Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Look up a cached rate stored at or after `min_cached_at_ms`.
    ///
    /// Rows holding an unparseable rate are treated as missing.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_cached_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
        min_cached_at_ms: i64,
    ) -> Result<Option<CachedRate>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT rate, cached_at_ms
            FROM rate_cache
            WHERE from_symbol = ? AND to_symbol = ? AND at_s = ? AND cached_at_ms >= ?
            "#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(at.timestamp())
        .bind(min_cached_at_ms)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let rate_str: String = row.try_get("rate")?;
        let cached_at_ms: i64 = row.try_get("cached_at_ms")?;
        match Decimal::from_str_canonical(&rate_str) {
            Ok(rate) => Ok(Some(CachedRate { rate, cached_at_ms })),
            Err(e) => {
                warn!("Ignoring corrupt cached rate {:?}: {}", rate_str, e);
                Ok(None)
            }
        }
    }

    /// Store (or refresh) a rate in the cache.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn put_cached_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
        rate: Decimal,
        cached_at_ms: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO rate_cache (from_symbol, to_symbol, at_s, rate, cached_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(from_symbol, to_symbol, at_s) DO UPDATE SET
                rate = excluded.rate,
                cached_at_ms = excluded.cached_at_ms
            "#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(at.timestamp())
        .bind(rate.to_canonical_string())
        .bind(cached_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete entries stored before `cached_before_ms`; returns rows removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn purge_stale_rates(&self, cached_before_ms: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rate_cache WHERE cached_at_ms < ?")
            .bind(cached_before_ms)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
