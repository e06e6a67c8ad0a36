//! Trade file formats.

pub mod custom;

pub use custom::{read_trades, write_trades, CsvImportError};
