use axum::body::Bytes;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::validate_trades;
use crate::domain::Trade;
use crate::error::AppError;
use crate::parsers::{read_trades, write_trades};

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub trades: Vec<Trade>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub trades: Vec<Trade>,
}

/// Parse a custom-format CSV body into trades ready for `/v1/acb`.
pub async fn post_import(body: Bytes) -> Result<Json<ImportResponse>, AppError> {
    let trades = read_trades(body.as_ref())?;
    Ok(Json(ImportResponse { trades }))
}

/// Render trades back into the custom CSV layout.
pub async fn post_export(Json(req): Json<ExportRequest>) -> Result<impl IntoResponse, AppError> {
    validate_trades(&req.trades)?;

    let mut csv = Vec::new();
    write_trades(&req.trades, &mut csv)
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}
