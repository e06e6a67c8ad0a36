use crate::config::LedgerMode;
use crate::domain::{DispositionRecord, Symbol, Trade};
use crate::engine::{run_ledger, run_sharded, to_base_currency, AcbError, CancelToken, LedgerOutput};
use crate::rates::RateOracle;
use crate::reports::{AcbReport, HoldingsReport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Runs full cost-basis computations against one rate oracle.
#[derive(Debug, Clone)]
pub struct Calculator {
    oracle: Arc<dyn RateOracle>,
    mode: LedgerMode,
}

impl Calculator {
    pub fn new(oracle: Arc<dyn RateOracle>, mode: LedgerMode) -> Self {
        Self { oracle, mode }
    }

    pub fn oracle(&self) -> &Arc<dyn RateOracle> {
        &self.oracle
    }

    /// Normalize `trades` into `target` and walk them through the ledger.
    pub async fn run(
        &self,
        trades: Vec<Trade>,
        target: &Symbol,
        cancel: &CancelToken,
    ) -> Result<LedgerOutput, AcbError> {
        let input_len = trades.len();
        let trades = to_base_currency(trades, target, self.oracle.as_ref(), cancel).await?;
        let synthetic = trades.len() - input_len;

        let output = match self.mode {
            LedgerMode::Sequential => run_ledger(trades)?,
            LedgerMode::Sharded => run_sharded(trades).await?,
        };

        info!(
            "Computed ACB in {}: {} trades ({} synthetic), {} records, {} assets",
            target,
            input_len,
            synthetic,
            output.records.len(),
            output.positions.len()
        );
        Ok(output)
    }

    /// Ordered disposition records of every trade, all priced in `target`.
    pub async fn calculate(
        &self,
        trades: Vec<Trade>,
        target: &Symbol,
        cancel: &CancelToken,
    ) -> Result<Vec<DispositionRecord>, AcbError> {
        Ok(self.run(trades, target, cancel).await?.records)
    }

    /// Dispositions of `trades` in `target`, stamped with `as_of`.
    pub async fn acb_report(
        &self,
        trades: Vec<Trade>,
        target: &Symbol,
        as_of: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> Result<AcbReport, AcbError> {
        let records = self.calculate(trades, target, cancel).await?;
        Ok(AcbReport::new(target.clone(), as_of, &records))
    }

    /// Remaining positions after `trades`, valued in `target` at `as_of`.
    pub async fn holdings(
        &self,
        trades: Vec<Trade>,
        target: &Symbol,
        as_of: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> Result<HoldingsReport, AcbError> {
        let output = self.run(trades, target, cancel).await?;
        HoldingsReport::build(&output.positions, target, as_of, self.oracle.as_ref(), cancel).await
    }
}
