//! Per-asset parallel ledger.
//!
//! Assets never interact inside the ledger, so each asset's trades can be
//! walked on its own blocking task. Results are merged back in asset order,
//! which yields exactly what [`run_ledger`] produces on the full list.

use crate::domain::{Symbol, Trade};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, error};

use super::ledger::{run_ledger, LedgerOutput};
use super::oversold::Oversold;

/// Group trades by asset, preserving input order inside each group.
pub fn partition_by_asset(trades: Vec<Trade>) -> BTreeMap<Symbol, Vec<Trade>> {
    let mut groups: BTreeMap<Symbol, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.asset.clone()).or_default().push(trade);
    }
    groups
}

/// Run the ledger with one blocking task per asset.
pub async fn run_sharded(trades: Vec<Trade>) -> Result<LedgerOutput, Oversold> {
    let groups = partition_by_asset(trades);
    debug!("Running ledger over {} asset shards", groups.len());

    let handles = groups
        .into_iter()
        .map(|(asset, group)| {
            let handle = tokio::task::spawn_blocking(move || run_ledger(group));
            async move { (asset, handle.await) }
        })
        .collect::<Vec<_>>();

    let mut output = LedgerOutput::default();
    let mut oversold = Oversold::new();

    // join_all keeps the BTreeMap order of the handles.
    for (asset, joined) in join_all(handles).await {
        match joined {
            Ok(Ok(shard)) => {
                output.records.extend(shard.records);
                output.positions.extend(shard.positions);
            }
            Ok(Err(shortfall)) => oversold.merge(shortfall),
            Err(e) => {
                // A panicking shard is a bug in the ledger itself.
                error!("Ledger shard for {} failed: {}", asset, e);
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
                panic!("ledger shard for {} was cancelled", asset);
            }
        }
    }

    oversold.into_result()?;
    Ok(output)
}
