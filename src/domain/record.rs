//! Disposition (ACB) record emitted by the ledger for every processed trade.

use crate::domain::{Action, Decimal, Symbol};
use serde::{Deserialize, Serialize};

/// Running cost-basis state of an asset right after one trade.
///
/// Sell-only fields (`proceeds`, `disposition_expenses`, `net_income`) are `None`
/// on buy records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispositionRecord {
    pub asset: Symbol,
    pub action: Action,
    pub quantity: Decimal,
    /// Calendar year of the trade itself, buy or sell.
    pub year_acquired: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proceeds: Option<Decimal>,
    /// Total (not per-unit) cost of the remaining balance.
    pub cost_base: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition_expenses: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Decimal>,
    pub coin_balance: Decimal,
}

impl DispositionRecord {
    pub fn is_sell(&self) -> bool {
        self.action == Action::Sell
    }
}

/// Keep only the records produced by sells.
pub fn sell_only(records: &[DispositionRecord]) -> Vec<DispositionRecord> {
    records.iter().filter(|r| r.is_sell()).cloned().collect()
}
