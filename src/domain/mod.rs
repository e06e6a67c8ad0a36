//! Domain types for the cost-basis engine.
//!
//! This module provides:
//! - Exact numeric handling via the Decimal wrapper
//! - Domain primitives: Symbol, Action
//! - Trade and DispositionRecord types with camelCase JSON serialization
//! - Stable (asset, date) ordering for the ledger walk

pub mod decimal;
pub mod ordering;
pub mod primitives;
pub mod record;
pub mod trade;

pub use decimal::Decimal;
pub use ordering::{sort_asset_date, TradeOrderingKey};
pub use primitives::{Action, ActionParseError, Symbol};
pub use record::{sell_only, DispositionRecord};
pub use trade::Trade;
