//! Read-through SQLite cache in front of another rate oracle.

use super::{RateError, RateOracle};
use crate::db::Repository;
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Serves rates from the cache while they are younger than `ttl`.
///
/// Cache read or write failures never fail a lookup; they are logged and the
/// inner oracle is used instead.
#[derive(Debug, Clone)]
pub struct CachedRateOracle {
    inner: Arc<dyn RateOracle>,
    repo: Arc<Repository>,
    ttl: Duration,
}

impl CachedRateOracle {
    pub fn new(inner: Arc<dyn RateOracle>, repo: Arc<Repository>, ttl: Duration) -> Self {
        Self { inner, repo, ttl }
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl RateOracle for CachedRateOracle {
    async fn fetch_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
    ) -> Result<Decimal, RateError> {
        let now_ms = Utc::now().timestamp_millis();
        let fresh_after = now_ms.saturating_sub(self.ttl_ms());

        match self.repo.get_cached_rate(from, to, at, fresh_after).await {
            Ok(Some(hit)) => {
                debug!("Rate cache hit: {}/{} at {}", from, to, at.timestamp());
                return Ok(hit.rate);
            }
            Ok(None) => {}
            Err(e) => warn!("Rate cache read failed, bypassing cache: {}", e),
        }

        let rate = self.inner.fetch_rate(from, to, at).await?;

        if let Err(e) = self.repo.put_cached_rate(from, to, at, rate, now_ms).await {
            warn!("Rate cache write failed: {}", e);
        }

        Ok(rate)
    }
}
