pub mod acb;
pub mod health;
pub mod holdings;
pub mod reports;
pub mod trades;

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{Symbol, Trade};
use crate::error::AppError;
use crate::orchestration::Calculator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<Calculator>,
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(calculator: Arc<Calculator>, repo: Arc<Repository>, config: Config) -> Self {
        Self {
            calculator,
            repo,
            config,
        }
    }

    /// Requested reporting currency, or the configured default when absent.
    fn currency(&self, requested: Option<&str>) -> Result<Symbol, AppError> {
        match requested {
            None => Ok(self.config.default_currency.clone()),
            Some(raw) => {
                let symbol = Symbol::new(raw);
                if symbol.is_empty() {
                    return Err(AppError::BadRequest("Invalid currency".into()));
                }
                Ok(symbol)
            }
        }
    }
}

/// Reject trades the ledger cannot interpret.
fn validate_trades(trades: &[Trade]) -> Result<(), AppError> {
    for (i, trade) in trades.iter().enumerate() {
        if trade.asset.is_empty() || trade.base_currency.is_empty() {
            return Err(AppError::BadRequest(format!(
                "trades[{}]: asset and baseCurrency are required",
                i
            )));
        }
        if trade.quantity.is_negative() || trade.base_price.is_negative() || trade.base_fee.is_negative()
        {
            return Err(AppError::BadRequest(format!(
                "trades[{}]: amounts must not be negative",
                i
            )));
        }
    }
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/acb", post(acb::post_acb))
        .route("/v1/holdings", post(holdings::post_holdings))
        .route("/v1/reports/acb", post(reports::post_acb_report))
        .route("/v1/trades/import", post(trades::post_import))
        .route("/v1/trades/export", post(trades::post_export))
        .layer(cors)
        .with_state(state)
}
