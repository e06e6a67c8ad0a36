//! Cost-basis computation: currency normalization, the average-cost ledger
//! and oversold aggregation.

pub mod cancel;
pub mod error;
pub mod ledger;
pub mod normalizer;
pub mod oversold;
pub mod shard;

pub use cancel::CancelToken;
pub use error::AcbError;
pub use ledger::{run_ledger, AcbLedger, AssetPosition, LedgerOutput};
pub use normalizer::to_base_currency;
pub use oversold::Oversold;
pub use shard::{partition_by_asset, run_sharded};
