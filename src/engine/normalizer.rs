use crate::domain::{Decimal, Symbol, Trade};
use crate::rates::RateOracle;
use tracing::debug;

use super::cancel::CancelToken;
use super::error::AcbError;

/// Re-price every trade in `target`.
///
/// Trades already priced in `target` pass through untouched. A cross-currency
/// trade is converted in place at the rate of its own date, and one offsetting
/// fee-less trade is appended for the currency it was priced in: buying ETH with
/// BTC is also a sale of BTC. Synthetic trades follow all input trades; no other
/// ordering is implied.
///
/// The first failed lookup aborts the whole normalization, as does cancelling
/// `cancel`, which is checked before each lookup and raced against it.
pub async fn to_base_currency(
    mut trades: Vec<Trade>,
    target: &Symbol,
    oracle: &dyn RateOracle,
    cancel: &CancelToken,
) -> Result<Vec<Trade>, AcbError> {
    let mut extras = Vec::new();

    for trade in trades.iter_mut().filter(|t| !t.is_priced_in(target)) {
        if cancel.is_cancelled() {
            return Err(AcbError::Cancelled);
        }

        let rate = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AcbError::Cancelled),
            rate = oracle.fetch_rate(&trade.base_currency, target, trade.date) => rate,
        }
        .map_err(|source| AcbError::Conversion {
            from: trade.base_currency.clone(),
            to: target.clone(),
            at: trade.date,
            source,
        })?;

        let price = trade.base_price * rate;
        let fee = trade.base_fee * rate;
        debug!(
            "Converted {} {} {} at {} {}/{}",
            trade.action, trade.asset, trade.base_currency, rate, target, trade.base_currency
        );

        extras.push(Trade {
            date: trade.date,
            action: trade.action.opposite(),
            asset: trade.base_currency.clone(),
            quantity: trade.base_price,
            base_currency: target.clone(),
            base_price: price,
            base_fee: Decimal::zero(),
        });

        trade.base_price = price;
        trade.base_fee = fee;
        trade.base_currency = target.clone();
    }

    if !extras.is_empty() {
        debug!("Synthesized {} offsetting trades in {}", extras.len(), target);
    }
    trades.extend(extras);
    Ok(trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;
    use crate::rates::{MockRateOracle, RateError};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn trade(action: Action, asset: &str, qty: &str, ccy: &str, price: &str, fee: &str) -> Trade {
        Trade::new(
            Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
            action,
            asset,
            d(qty),
            ccy,
            d(price),
            d(fee),
        )
    }

    #[tokio::test]
    async fn test_target_priced_trades_pass_through() {
        let oracle = MockRateOracle::new();
        let input = vec![trade(Action::Buy, "ETH", "10", "CAD", "2000", "20")];

        let out = to_base_currency(input.clone(), &Symbol::new("CAD"), &oracle, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(out, input);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_cross_buy_converts_and_synthesizes_sell() {
        let oracle = MockRateOracle::new().with_rate("BTC", "CAD", d("1500"));
        let input = vec![trade(Action::Buy, "ETH", "5", "BTC", "8", "0.1")];

        let out = to_base_currency(input, &Symbol::new("CAD"), &oracle, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        let original = &out[0];
        assert_eq!(original.asset, Symbol::new("ETH"));
        assert_eq!(original.action, Action::Buy);
        assert_eq!(original.quantity, d("5"));
        assert_eq!(original.base_price, d("12000"));
        assert_eq!(original.base_fee, d("150"));
        assert_eq!(original.base_currency, Symbol::new("CAD"));

        let synthetic = &out[1];
        assert_eq!(synthetic.asset, Symbol::new("BTC"));
        assert_eq!(synthetic.action, Action::Sell);
        assert_eq!(synthetic.quantity, d("8"));
        assert_eq!(synthetic.base_price, d("12000"));
        assert!(synthetic.base_fee.is_zero());
        assert_eq!(synthetic.base_currency, Symbol::new("CAD"));
        assert_eq!(synthetic.date, original.date);
    }

    #[tokio::test]
    async fn test_cross_sell_synthesizes_buy() {
        let oracle = MockRateOracle::new().with_rate("BTC", "CAD", d("2"));
        let input = vec![trade(Action::Sell, "ETH", "5", "BTC", "8", "0")];

        let out = to_base_currency(input, &Symbol::new("CAD"), &oracle, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(out[1].action, Action::Buy);
        assert_eq!(out[1].asset, Symbol::new("BTC"));
    }

    #[tokio::test]
    async fn test_oracle_failure_aborts() {
        let oracle = MockRateOracle::new()
            .with_failure("XRP", RateError::NetworkError("down".to_string()))
            .with_default_rate(d("1"));
        let input = vec![
            trade(Action::Buy, "ETH", "1", "BTC", "1", "0"),
            trade(Action::Buy, "ETH", "1", "XRP", "1", "0"),
        ];

        let err = to_base_currency(input, &Symbol::new("CAD"), &oracle, &CancelToken::new())
            .await
            .unwrap_err();

        match err {
            AcbError::Conversion { from, source, .. } => {
                assert_eq!(from, Symbol::new("XRP"));
                assert_eq!(source, RateError::NetworkError("down".to_string()));
            }
            other => panic!("Expected Conversion error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let oracle = MockRateOracle::new().with_default_rate(d("1"));
        let cancel = CancelToken::new();
        cancel.cancel();

        let input = vec![trade(Action::Buy, "ETH", "1", "BTC", "1", "0")];
        let err = to_base_currency(input, &Symbol::new("CAD"), &oracle, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, AcbError::Cancelled));
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_inflight_lookup() {
        let oracle = MockRateOracle::new()
            .with_default_rate(d("1"))
            .with_delay(Duration::from_secs(30));
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let input = vec![trade(Action::Buy, "ETH", "1", "BTC", "1", "0")];
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            to_base_currency(input, &Symbol::new("CAD"), &oracle, &cancel),
        )
        .await
        .expect("normalization was not interrupted");

        assert!(matches!(result, Err(AcbError::Cancelled)));
    }
}
