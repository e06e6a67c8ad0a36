//! Rate oracle abstraction for currency conversion rates.

use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

pub mod cached;
pub mod cryptocompare;
pub mod mock;

pub use cached::CachedRateOracle;
pub use cryptocompare::CryptoCompareOracle;
pub use mock::MockRateOracle;

/// Supplies the rate converting one unit of `from` into `to` at a point in time.
///
/// Implementations must be deterministic for a given (from, to, at) within their
/// caching window. Retries, if any, live in the implementation.
#[async_trait]
pub trait RateOracle: Send + Sync + fmt::Debug {
    /// Fetch the `from -> to` rate at `at`.
    ///
    /// # Returns
    /// Amount of `to` worth one unit of `from`.
    async fn fetch_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
    ) -> Result<Decimal, RateError>;
}

/// Convert `amount` of `from` into `to` at `at`.
///
/// Identical currencies convert 1:1 without consulting the oracle.
pub async fn convert_amount(
    oracle: &dyn RateOracle,
    amount: Decimal,
    from: &Symbol,
    to: &Symbol,
    at: DateTime<Utc>,
) -> Result<Decimal, RateError> {
    if from == to {
        return Ok(amount);
    }
    let rate = oracle.fetch_rate(from, to, at).await?;
    Ok(amount * rate)
}

/// Error type for rate lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed rate)
    ParseError(String),
    /// The price API has no rate for this symbol
    UnknownSymbol(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RateError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            RateError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            RateError::UnknownSymbol(symbol) => write!(f, "Couldn't find {}", symbol),
            RateError::RateLimited => write!(f, "Rate limited"),
            RateError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for RateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_error_display() {
        let err = RateError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = RateError::HttpError {
            status: 429,
            message: "Too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too many requests");

        let err = RateError::UnknownSymbol("AAAXXX".to_string());
        assert_eq!(err.to_string(), "Couldn't find AAAXXX");

        assert_eq!(RateError::RateLimited.to_string(), "Rate limited");
    }

    #[tokio::test]
    async fn test_convert_amount_same_currency_skips_oracle() {
        let oracle = MockRateOracle::new();
        let at = Utc.with_ymd_and_hms(2017, 3, 15, 0, 0, 0).unwrap();
        let btc = Symbol::new("BTC");

        let amount = convert_amount(&oracle, Decimal::from(2), &btc, &btc, at)
            .await
            .unwrap();
        assert_eq!(amount, Decimal::from(2));
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_amount_multiplies_by_rate() {
        let oracle = MockRateOracle::new().with_rate(
            "ETH",
            "BTC",
            Decimal::from_str_canonical("0.02533").unwrap(),
        );
        let at = Utc.with_ymd_and_hms(2017, 3, 15, 0, 0, 0).unwrap();

        let amount = convert_amount(
            &oracle,
            Decimal::from(10),
            &Symbol::new("ETH"),
            &Symbol::new("BTC"),
            at,
        )
        .await
        .unwrap();
        assert_eq!(amount, Decimal::from_str_canonical("0.2533").unwrap());
    }
}
