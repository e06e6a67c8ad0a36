//! Mock rate oracle for testing without network calls.

use super::{RateError, RateOracle};
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Mock oracle returning predefined rates.
#[derive(Debug, Clone, Default)]
pub struct MockRateOracle {
    rates: HashMap<(Symbol, Symbol), Decimal>,
    default_rate: Option<Decimal>,
    failures: HashMap<Symbol, RateError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockRateOracle {
    /// Create an oracle that knows no rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed rate for a currency pair.
    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((Symbol::new(from), Symbol::new(to)), rate);
        self
    }

    /// Rate returned for any pair without an explicit entry.
    pub fn with_default_rate(mut self, rate: Decimal) -> Self {
        self.default_rate = Some(rate);
        self
    }

    /// Make every lookup from `from` fail with `error`.
    pub fn with_failure(mut self, from: &str, error: RateError) -> Self {
        self.failures.insert(Symbol::new(from), error);
        self
    }

    /// Sleep before answering each lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups served so far, shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateOracle for MockRateOracle {
    async fn fetch_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        _at: DateTime<Utc>,
    ) -> Result<Decimal, RateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failures.get(from) {
            return Err(err.clone());
        }
        if from == to {
            return Ok(Decimal::one());
        }

        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .or(self.default_rate)
            .ok_or_else(|| RateError::UnknownSymbol(from.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 15, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_mock_returns_registered_rate() {
        let oracle = MockRateOracle::new().with_rate("BTC", "CAD", Decimal::from(1500));
        let rate = oracle
            .fetch_rate(&Symbol::new("BTC"), &Symbol::new("CAD"), at())
            .await
            .unwrap();
        assert_eq!(rate, Decimal::from(1500));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_pair_errors() {
        let oracle = MockRateOracle::new();
        let err = oracle
            .fetch_rate(&Symbol::new("AAAXXX"), &Symbol::new("BTC"), at())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Couldn't find AAAXXX");
    }

    #[tokio::test]
    async fn test_mock_same_currency_is_one() {
        let oracle = MockRateOracle::new();
        let rate = oracle
            .fetch_rate(&Symbol::new("BTC"), &Symbol::new("BTC"), at())
            .await
            .unwrap();
        assert_eq!(rate, Decimal::one());
    }

    #[tokio::test]
    async fn test_mock_failure_wins_over_default() {
        let oracle = MockRateOracle::new()
            .with_default_rate(Decimal::one())
            .with_failure("ETH", RateError::RateLimited);
        let err = oracle
            .fetch_rate(&Symbol::new("ETH"), &Symbol::new("CAD"), at())
            .await
            .unwrap_err();
        assert_eq!(err, RateError::RateLimited);
    }
}
