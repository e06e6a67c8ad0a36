//! Trade type representing a single buy or sell event.

use crate::domain::{Action, Decimal, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An atomic buy or sell of `quantity` units of `asset`, priced in `base_currency`.
///
/// `base_price` is the total amount of base currency paid or received before fees,
/// not a per-unit price. `base_fee` is denominated in `base_currency` as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub date: DateTime<Utc>,
    pub action: Action,
    pub asset: Symbol,
    pub quantity: Decimal,
    pub base_currency: Symbol,
    pub base_price: Decimal,
    #[serde(default)]
    pub base_fee: Decimal,
}

impl Trade {
    pub fn new(
        date: DateTime<Utc>,
        action: Action,
        asset: impl Into<Symbol>,
        quantity: Decimal,
        base_currency: impl Into<Symbol>,
        base_price: Decimal,
        base_fee: Decimal,
    ) -> Self {
        Trade {
            date,
            action,
            asset: asset.into(),
            quantity,
            base_currency: base_currency.into(),
            base_price,
            base_fee,
        }
    }

    /// Whether this trade is already priced in `currency`.
    pub fn is_priced_in(&self, currency: &Symbol) -> bool {
        &self.base_currency == currency
    }
}
