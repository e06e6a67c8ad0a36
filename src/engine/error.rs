use crate::domain::Symbol;
use crate::rates::RateError;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::oversold::Oversold;

/// Terminal failures of a cost-basis computation. No variant carries partial
/// results.
#[derive(Debug, Error)]
pub enum AcbError {
    /// A rate lookup failed while normalizing trades.
    #[error("{source}")]
    Conversion {
        from: Symbol,
        to: Symbol,
        at: DateTime<Utc>,
        #[source]
        source: RateError,
    },
    /// One or more assets were sold beyond their tracked balance.
    #[error(transparent)]
    Oversold(#[from] Oversold),
    /// The caller cancelled the computation.
    #[error("Calculation cancelled")]
    Cancelled,
}
