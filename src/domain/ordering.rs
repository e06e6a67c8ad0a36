//! Stable (asset, date) trade ordering for the ledger walk.

use crate::domain::{Symbol, Trade};
use chrono::{DateTime, Utc};

/// Ledger ordering key: asset first (lexicographic), then date ascending.
///
/// Trades with equal keys keep their input order because the sort is stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey<'a> {
    pub asset: &'a Symbol,
    pub date: DateTime<Utc>,
}

impl<'a> TradeOrderingKey<'a> {
    pub fn from_trade(trade: &'a Trade) -> Self {
        TradeOrderingKey {
            asset: &trade.asset,
            date: trade.date,
        }
    }
}

/// Sort trades by asset, then date.
pub fn sort_asset_date(trades: &mut [Trade]) {
    trades.sort_by(|a, b| TradeOrderingKey::from_trade(a).cmp(&TradeOrderingKey::from_trade(b)));
}
