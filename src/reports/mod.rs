//! Tax reports assembled from ledger output.

use crate::domain::{sell_only, Decimal, DispositionRecord, Symbol};
use crate::engine::{AcbError, AssetPosition, CancelToken};
use crate::rates::{convert_amount, RateOracle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Dispositions of a calculation, one item per sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcbReport {
    pub currency: Symbol,
    pub as_of: DateTime<Utc>,
    pub items: Vec<DispositionRecord>,
}

impl AcbReport {
    pub fn new(currency: Symbol, as_of: DateTime<Utc>, records: &[DispositionRecord]) -> Self {
        Self {
            currency,
            as_of,
            items: sell_only(records),
        }
    }

    /// Net income summed per calendar year of disposition.
    pub fn net_income_by_year(&self) -> BTreeMap<i32, Decimal> {
        let mut totals = BTreeMap::new();
        for item in &self.items {
            if let Some(net) = item.net_income {
                *totals.entry(item.year_acquired).or_insert_with(Decimal::zero) += net;
            }
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingItem {
    pub asset: Symbol,
    pub amount: Decimal,
    pub acb: Decimal,
    /// `amount` valued in the report currency.
    pub value: Decimal,
    /// `value / acb - 1`, absent when nothing was paid for the holding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain: Option<Decimal>,
}

/// What is still held after all trades, valued at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsReport {
    pub currency: Symbol,
    pub as_of: DateTime<Utc>,
    pub items: Vec<HoldingItem>,
}

impl HoldingsReport {
    /// Value every position that still carries a balance or a cost.
    ///
    /// Items follow asset order. A failed valuation aborts the report.
    pub async fn build(
        positions: &BTreeMap<Symbol, AssetPosition>,
        currency: &Symbol,
        as_of: DateTime<Utc>,
        oracle: &dyn RateOracle,
        cancel: &CancelToken,
    ) -> Result<Self, AcbError> {
        let mut items = Vec::new();

        for (asset, position) in positions {
            if position.balance.is_zero() && position.cost.is_zero() {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(AcbError::Cancelled);
            }

            let value = convert_amount(oracle, position.balance, asset, currency, as_of)
                .await
                .map_err(|source| AcbError::Conversion {
                    from: asset.clone(),
                    to: currency.clone(),
                    at: as_of,
                    source,
                })?;

            items.push(HoldingItem {
                asset: asset.clone(),
                amount: position.balance,
                acb: position.cost,
                value,
                gain: value.checked_div(position.cost).map(|r| r - Decimal::one()),
            });
        }

        Ok(Self {
            currency: currency.clone(),
            as_of,
            items,
        })
    }
}
