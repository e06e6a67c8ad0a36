use crate::domain::{sort_asset_date, Action, Decimal, DispositionRecord, Symbol, Trade};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::oversold::Oversold;

/// Running average-cost state of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetPosition {
    /// Total cost of the units held, not per unit.
    pub cost: Decimal,
    /// Units held.
    pub balance: Decimal,
}

impl AssetPosition {
    /// Average cost per unit, `None` while nothing is held.
    pub fn unit_cost(&self) -> Option<Decimal> {
        self.cost.checked_div(self.balance)
    }
}

/// Successful ledger run: every record plus the final position of each asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerOutput {
    pub records: Vec<DispositionRecord>,
    pub positions: BTreeMap<Symbol, AssetPosition>,
}

/// Average cost basis ledger.
///
/// Trades must be fed in (asset, date) order; each trade only touches the state
/// of its own asset.
#[derive(Debug, Default)]
pub struct AcbLedger {
    positions: HashMap<Symbol, AssetPosition>,
    oversold: Oversold,

    // Outputs accumulated during processing.
    records: Vec<DispositionRecord>,
}

impl AcbLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position of `asset`, zero if never traded.
    pub fn position(&self, asset: &Symbol) -> AssetPosition {
        self.positions.get(asset).copied().unwrap_or_default()
    }

    /// Process a single trade, updating state and emitting a record.
    pub fn process_trade(&mut self, trade: &Trade) {
        match trade.action {
            Action::Buy => self.handle_buy(trade),
            Action::Sell => self.handle_sell(trade),
        }
    }

    fn handle_buy(&mut self, trade: &Trade) {
        let position = self.positions.entry(trade.asset.clone()).or_default();
        position.cost += trade.base_price + trade.base_fee;
        position.balance += trade.quantity;

        self.records.push(DispositionRecord {
            asset: trade.asset.clone(),
            action: Action::Buy,
            quantity: trade.quantity,
            year_acquired: trade.date.year(),
            proceeds: None,
            cost_base: position.cost,
            disposition_expenses: None,
            net_income: None,
            coin_balance: position.balance,
        });
    }

    /// A sell exceeding the balance only records the shortfall; it leaves the
    /// position untouched and emits nothing.
    fn handle_sell(&mut self, trade: &Trade) {
        let current = self.position(&trade.asset);
        let new_balance = current.balance - trade.quantity;

        if new_balance.is_negative() {
            warn!(
                "Oversold {}: selling {} with only {} held on {}",
                trade.asset, trade.quantity, current.balance, trade.date
            );
            self.oversold.record(&trade.asset, -new_balance);
            return;
        }

        // cost * new_balance / balance, multiplied first. A zero-quantity sell
        // against an empty position leaves the cost as is.
        let new_cost = (current.cost * new_balance)
            .checked_div(current.balance)
            .unwrap_or(current.cost);

        let position = self.positions.entry(trade.asset.clone()).or_default();
        position.cost = new_cost;
        position.balance = new_balance;

        self.records.push(DispositionRecord {
            asset: trade.asset.clone(),
            action: Action::Sell,
            quantity: trade.quantity,
            year_acquired: trade.date.year(),
            proceeds: Some(trade.base_price),
            cost_base: new_cost,
            disposition_expenses: Some(trade.base_fee),
            net_income: Some(trade.base_price - new_cost - trade.base_fee),
            coin_balance: new_balance,
        });
    }

    /// Finish the run: all records, or the aggregated shortfall if any asset
    /// was oversold (records are then discarded).
    pub fn into_outputs(self) -> Result<LedgerOutput, Oversold> {
        self.oversold.into_result()?;
        Ok(LedgerOutput {
            records: self.records,
            positions: self.positions.into_iter().collect(),
        })
    }
}

/// Sort `trades` by (asset, date) and walk them through a fresh ledger.
pub fn run_ledger(mut trades: Vec<Trade>) -> Result<LedgerOutput, Oversold> {
    sort_asset_date(&mut trades);

    let mut ledger = AcbLedger::new();
    for trade in &trades {
        ledger.process_trade(trade);
    }
    ledger.into_outputs()
}
