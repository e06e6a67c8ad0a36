use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{validate_trades, AppState};
use crate::domain::{sell_only, DispositionRecord, Symbol, Trade};
use crate::engine::CancelToken;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbRequest {
    pub currency: Option<String>,
    pub sell_only: Option<bool>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbResponse {
    pub currency: Symbol,
    pub records: Vec<DispositionRecord>,
}

pub async fn post_acb(
    State(state): State<AppState>,
    Json(req): Json<AcbRequest>,
) -> Result<Json<AcbResponse>, AppError> {
    let currency = state.currency(req.currency.as_deref())?;
    validate_trades(&req.trades)?;

    let records = state
        .calculator
        .calculate(req.trades, &currency, &CancelToken::new())
        .await?;

    let records = if req.sell_only.unwrap_or(false) {
        sell_only(&records)
    } else {
        records
    };

    Ok(Json(AcbResponse { currency, records }))
}
