//! Aggregated "sold more than was bought" failure.

use crate::domain::{Decimal, Symbol};
use std::collections::BTreeMap;
use std::fmt;

/// Shortfall per asset collected over a whole ledger run.
///
/// Assets are kept in a `BTreeMap`, so the rendered message lists them in
/// lexicographic order regardless of processing order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Oversold {
    details: BTreeMap<Symbol, Decimal>,
}

impl Oversold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the shortfall of `asset`.
    pub fn record(&mut self, asset: &Symbol, amount: Decimal) {
        *self.details.entry(asset.clone()).or_default() += amount;
    }

    /// Fold another set of shortfalls into this one.
    pub fn merge(&mut self, other: Oversold) {
        for (asset, amount) in other.details {
            self.record(&asset, amount);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.details.values().all(Decimal::is_zero)
    }

    pub fn details(&self) -> &BTreeMap<Symbol, Decimal> {
        &self.details
    }

    pub fn shortfall(&self, asset: &Symbol) -> Option<Decimal> {
        self.details.get(asset).copied()
    }

    /// `Err(self)` when any shortfall was recorded.
    pub fn into_result(self) -> Result<(), Oversold> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Oversold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing previous buys for:")?;
        let entries = self.details.iter().filter(|(_, amount)| !amount.is_zero());
        for (i, (asset, amount)) in entries.enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{} ({})", sep, asset, amount.to_canonical_string())?;
        }
        Ok(())
    }
}

impl std::error::Error for Oversold {}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_single_asset_message() {
        let mut oversold = Oversold::new();
        oversold.record(&Symbol::new("AAA"), d("20"));
        assert_eq!(oversold.to_string(), "Missing previous buys for: AAA (20)");
    }

    #[test]
    fn test_assets_listed_alphabetically() {
        let mut oversold = Oversold::new();
        oversold.record(&Symbol::new("BBB"), d("12.345"));
        oversold.record(&Symbol::new("AAA"), d("20"));
        assert_eq!(
            oversold.to_string(),
            "Missing previous buys for: AAA (20), BBB (12.345)"
        );
    }

    #[test]
    fn test_shortfalls_accumulate() {
        let mut oversold = Oversold::new();
        let aaa = Symbol::new("AAA");
        oversold.record(&aaa, d("1.5"));
        oversold.record(&aaa, d("2.25"));
        assert_eq!(oversold.shortfall(&aaa), Some(d("3.75")));
        assert_eq!(oversold.to_string(), "Missing previous buys for: AAA (3.75)");
    }

    #[test]
    fn test_full_precision_rendering() {
        let mut oversold = Oversold::new();
        oversold.record(&Symbol::new("BTC"), d("0.000000012345678900"));
        assert_eq!(
            oversold.to_string(),
            "Missing previous buys for: BTC (0.0000000123456789)"
        );
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(Oversold::new().into_result().is_ok());
    }

    #[test]
    fn test_merge_combines_shards() {
        let mut left = Oversold::new();
        left.record(&Symbol::new("AAA"), d("1"));
        let mut right = Oversold::new();
        right.record(&Symbol::new("AAA"), d("2"));
        right.record(&Symbol::new("CCC"), d("3"));

        left.merge(right);
        assert_eq!(
            left.to_string(),
            "Missing previous buys for: AAA (3), CCC (3)"
        );
        assert!(left.into_result().is_err());
    }
}
