//! Hand-maintained trade sheet in a fixed CSV layout.
//!
//! ```text
//! date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency
//! 2018-01-05,buy,1.5,ETH,2400,CAD,4.99,CAD
//! ```
//!
//! Anything above the header row is ignored, so exports with a title or notes
//! on top load as-is.

use crate::domain::{Action, Decimal, Symbol, Trade};
use chrono::{NaiveDate, TimeZone, Utc};
use std::io;
use thiserror::Error;
use tracing::debug;

pub const HEADER: [&str; 8] = [
    "date",
    "action",
    "amount",
    "currency",
    "base_amount",
    "base_currency",
    "fee_amount",
    "fee_currency",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No header row found")]
    MissingHeader,
    #[error("Line {line}: missing {field}")]
    MissingField { line: u64, field: &'static str },
    #[error("Line {line}: invalid date {value}")]
    InvalidDate { line: u64, value: String },
    #[error("Line {line}: invalid {field} {value}")]
    InvalidAmount {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("Line {line}: fee in {fee_currency} on a trade priced in {base_currency}")]
    FeeCurrencyMismatch {
        line: u64,
        fee_currency: String,
        base_currency: String,
    },
}

fn is_header(row: &csv::StringRecord) -> bool {
    HEADER
        .iter()
        .all(|name| row.iter().any(|v| v.trim().eq_ignore_ascii_case(name)))
}

fn column(row: &csv::StringRecord, idx: usize, line: u64) -> Result<&str, CsvImportError> {
    row.get(idx).map(str::trim).ok_or(CsvImportError::MissingField {
        line,
        field: HEADER[idx],
    })
}

fn parse_amount(row: &csv::StringRecord, idx: usize, line: u64) -> Result<Decimal, CsvImportError> {
    let raw = column(row, idx, line)?;
    match Decimal::from_str_canonical(raw) {
        Ok(v) if !v.is_negative() => Ok(v),
        _ => Err(CsvImportError::InvalidAmount {
            line,
            field: HEADER[idx],
            value: raw.to_string(),
        }),
    }
}

/// Read trades from a custom-format sheet.
///
/// Rows whose action is neither buy nor sell are skipped. A non-zero fee must be
/// paid in the trade's base currency; an empty fee currency means the base
/// currency.
pub fn read_trades<R: io::Read>(input: R) -> Result<Vec<Trade>, CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut on_data = false;
    let mut trades = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let row = record?;
        if !on_data {
            on_data = is_header(&row);
            continue;
        }
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| column(&row, idx, line);
        let amount = |idx: usize| parse_amount(&row, idx, line);

        let raw_date = field(0)?;
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(|| CsvImportError::InvalidDate {
                line,
                value: raw_date.to_string(),
            })?;

        let action = match field(1)?.parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let quantity = amount(2)?;
        let asset = Symbol::new(field(3)?);
        let base_price = amount(4)?;
        let base_currency = Symbol::new(field(5)?);
        let fee = amount(6)?;
        let fee_currency = Symbol::new(row.get(7).unwrap_or_default());

        if !fee.is_zero() && !fee_currency.is_empty() && fee_currency != base_currency {
            return Err(CsvImportError::FeeCurrencyMismatch {
                line,
                fee_currency: fee_currency.to_string(),
                base_currency: base_currency.to_string(),
            });
        }

        trades.push(Trade::new(
            date,
            action,
            asset,
            quantity,
            base_currency,
            base_price,
            fee,
        ));
    }

    if !on_data {
        return Err(CsvImportError::MissingHeader);
    }
    if skipped > 0 {
        debug!("Skipped {} rows with unsupported actions", skipped);
    }
    Ok(trades)
}

/// Write `trades` in the custom layout, header first.
pub fn write_trades<W: io::Write>(trades: &[Trade], output: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(HEADER)?;
    for trade in trades {
        writer.write_record([
            trade.date.format(DATE_FORMAT).to_string(),
            trade.action.to_string(),
            trade.quantity.to_canonical_string(),
            trade.asset.to_string(),
            trade.base_price.to_canonical_string(),
            trade.base_currency.to_string(),
            trade.base_fee.to_canonical_string(),
            trade.base_currency.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_reads_rows_after_header() {
        let input = "My trades,,,,,,,\n\
                     date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n\
                     2018-01-05,buy,1.5,eth,2400,cad,4.99,CAD\n\
                     2018-02-01,SELL,0.5,ETH,900,CAD,0,\n";

        let trades = read_trades(input.as_bytes()).unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].date, Utc.with_ymd_and_hms(2018, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(trades[0].action, Action::Buy);
        assert_eq!(trades[0].asset, Symbol::new("ETH"));
        assert_eq!(trades[0].quantity, d("1.5"));
        assert_eq!(trades[0].base_currency, Symbol::new("CAD"));
        assert_eq!(trades[0].base_price, d("2400"));
        assert_eq!(trades[0].base_fee, d("4.99"));
        assert_eq!(trades[1].action, Action::Sell);
        assert!(trades[1].base_fee.is_zero());
    }

    #[test]
    fn test_unknown_actions_are_skipped() {
        let input = "date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n\
                     2018-01-05,deposit,1,ETH,0,CAD,0,CAD\n\
                     2018-01-06,buy,1,ETH,10,CAD,0,CAD\n";

        let trades = read_trades(input.as_bytes()).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].action, Action::Buy);
    }

    #[test]
    fn test_missing_header() {
        let input = "2018-01-06,buy,1,ETH,10,CAD,0,CAD\n";
        assert!(matches!(
            read_trades(input.as_bytes()),
            Err(CsvImportError::MissingHeader)
        ));
    }

    #[test]
    fn test_invalid_date_reports_line() {
        let input = "date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n\
                     05/01/2018,buy,1,ETH,10,CAD,0,CAD\n";

        match read_trades(input.as_bytes()) {
            Err(CsvImportError::InvalidDate { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "05/01/2018");
            }
            other => panic!("Expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        let input = "date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n\
                     2018-01-06,buy,-1,ETH,10,CAD,0,CAD\n";

        match read_trades(input.as_bytes()) {
            Err(CsvImportError::InvalidAmount { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("Expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_fee_in_other_currency_rejected() {
        let input = "date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n\
                     2018-01-06,buy,1,ETH,0.1,BTC,5,BNB\n";

        assert!(matches!(
            read_trades(input.as_bytes()),
            Err(CsvImportError::FeeCurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_write_then_read_preserves_trades() {
        let trades = vec![
            Trade::new(
                Utc.with_ymd_and_hms(2017, 11, 2, 0, 0, 0).unwrap(),
                Action::Buy,
                "ETH",
                d("2.000"),
                "BTC",
                d("0.125"),
                d("0.001"),
            ),
            Trade::new(
                Utc.with_ymd_and_hms(2017, 12, 24, 0, 0, 0).unwrap(),
                Action::Sell,
                "ETH",
                d("1"),
                "CAD",
                d("1100"),
                Decimal::zero(),
            ),
        ];

        let mut buf = Vec::new();
        write_trades(&trades, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "date,action,amount,currency,base_amount,base_currency,fee_amount,fee_currency\n"
        ));
        assert!(text.contains("2017-11-02,buy,2,ETH,0.125,BTC,0.001,BTC\n"));

        assert_eq!(read_trades(buf.as_slice()).unwrap(), trades);
    }
}
