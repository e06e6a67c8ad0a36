use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{validate_trades, AppState};
use crate::domain::{Decimal, Trade};
use crate::engine::CancelToken;
use crate::error::AppError;
use crate::reports::AcbReport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbReportRequest {
    pub currency: Option<String>,
    /// Report date; now when absent.
    pub as_of_ms: Option<i64>,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbReportResponse {
    #[serde(flatten)]
    pub report: AcbReport,
    pub net_income_by_year: BTreeMap<i32, Decimal>,
}

pub(super) fn parse_as_of(as_of_ms: Option<i64>) -> Result<DateTime<Utc>, AppError> {
    match as_of_ms {
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::BadRequest("asOfMs out of range".into())),
        None => Ok(Utc::now()),
    }
}

pub async fn post_acb_report(
    State(state): State<AppState>,
    Json(req): Json<AcbReportRequest>,
) -> Result<Json<AcbReportResponse>, AppError> {
    let currency = state.currency(req.currency.as_deref())?;
    validate_trades(&req.trades)?;
    let as_of = parse_as_of(req.as_of_ms)?;

    let report = state
        .calculator
        .acb_report(req.trades, &currency, as_of, &CancelToken::new())
        .await?;
    let net_income_by_year = report.net_income_by_year();

    Ok(Json(AcbReportResponse {
        report,
        net_income_by_year,
    }))
}
