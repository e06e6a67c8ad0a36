use crate::engine::AcbError;
use crate::parsers::CsvImportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Acb(#[from] AcbError),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<CsvImportError> for AppError {
    fn from(err: CsvImportError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Acb(err) => {
                let status = match &err {
                    AcbError::Oversold(_) => StatusCode::BAD_REQUEST,
                    AcbError::Conversion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    AcbError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                };
                if status.is_server_error() {
                    error!("Calculation failed: {:?}", err);
                }
                (status, err.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
