pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod parsers;
pub mod rates;
pub mod reports;

pub use config::{Config, LedgerMode};
pub use db::{init_db, Repository};
pub use domain::{sell_only, Action, Decimal, DispositionRecord, Symbol, Trade};
pub use engine::{AcbError, CancelToken, Oversold};
pub use error::AppError;
pub use orchestration::Calculator;
pub use rates::{MockRateOracle, RateError, RateOracle};
