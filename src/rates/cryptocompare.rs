//! CryptoCompare daily-average price API client.

use super::{RateError, RateOracle};
use crate::domain::{Decimal, Symbol};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const EXTRA_PARAMS: &str = "acb-ledger";

/// Rate oracle backed by the public `data/dayAvg` endpoint.
///
/// Rate limits on the free tier are roughly 15/s, 300/min and 8000/h, so callers
/// should put a [`super::CachedRateOracle`] in front of it.
#[derive(Debug, Clone)]
pub struct CryptoCompareOracle {
    client: Client,
    base_url: String,
}

impl CryptoCompareOracle {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn default_url() -> Self {
        Self::new("https://min-api.cryptocompare.com".to_string())
    }

    async fn get_day_avg(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
    ) -> Result<serde_json::Value, RateError> {
        let url = format!("{}/data/dayAvg", self.base_url);
        let query = [
            ("fsym", from.to_string()),
            ("tsym", to.to_string()),
            ("toTs", at.timestamp().to_string()),
            ("extraParams", EXTRA_PARAMS.to_string()),
        ];
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(RateError::NetworkError(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(RateError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(RateError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RateError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(RateError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl RateOracle for CryptoCompareOracle {
    async fn fetch_rate(
        &self,
        from: &Symbol,
        to: &Symbol,
        at: DateTime<Utc>,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::one());
        }

        debug!(
            "Calling price API for from={}, to={}, at={}",
            from,
            to,
            at.timestamp()
        );
        let response = self.get_day_avg(from, to, at).await?;
        parse_day_avg(&response, from, to)
    }
}

/// Extract the `to` rate from a dayAvg response body.
///
/// The number is re-read from its JSON text so no binary float rounding leaks in.
fn parse_day_avg(
    response: &serde_json::Value,
    from: &Symbol,
    to: &Symbol,
) -> Result<Decimal, RateError> {
    let value = response
        .get(to.as_str())
        .ok_or_else(|| RateError::UnknownSymbol(from.to_string()))?;

    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => {
            return Err(RateError::ParseError(format!(
                "Unexpected rate value: {}",
                other
            )))
        }
    };

    let parsed = if text.contains(['e', 'E']) {
        rust_decimal::Decimal::from_scientific(&text).map(Decimal::new)
    } else {
        Decimal::from_str_canonical(&text)
    };
    parsed.map_err(|e| RateError::ParseError(format!("Invalid rate {}: {}", text, e)))
}
