use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::reports::parse_as_of;
use super::{validate_trades, AppState};
use crate::domain::Trade;
use crate::engine::CancelToken;
use crate::error::AppError;
use crate::reports::HoldingsReport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsRequest {
    pub currency: Option<String>,
    /// Valuation time; now when absent.
    pub as_of_ms: Option<i64>,
    pub trades: Vec<Trade>,
}

pub async fn post_holdings(
    State(state): State<AppState>,
    Json(req): Json<HoldingsRequest>,
) -> Result<Json<HoldingsReport>, AppError> {
    let currency = state.currency(req.currency.as_deref())?;
    validate_trades(&req.trades)?;

    let as_of = parse_as_of(req.as_of_ms)?;

    let report = state
        .calculator
        .holdings(req.trades, &currency, as_of, &CancelToken::new())
        .await?;

    Ok(Json(report))
}
