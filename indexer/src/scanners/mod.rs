//! Transfer sources: two ways of pulling `Transfer` events into the ledger.
//!
//! [`rpc`] scans the node directly via `eth_getLogs` with adaptive window
//! bisection. [`explorer`] bootstraps from a paginated block-explorer REST
//! API, useful when an RPC scan from genesis would be too slow. Both are
//! modeled as a [`TransferSource`] so the batch-apply-and-commit loop lives
//! in one place ([`drive`]) instead of being duplicated per source.

pub mod explorer;
pub mod rpc;

use async_trait::async_trait;

use crate::error::Result;
use crate::ledger::apply_batch;
use crate::store::SqliteStore;
use crate::types::Transfer;

/// One unit of progress from a [`TransferSource`].
#[derive(Debug)]
pub enum SourceStep {
    /// Transfers to apply, without advancing `last_scanned_block` yet. Used
    /// by sources whose commit granularity (per page) is finer than their
    /// progress granularity (per window).
    Partial(Vec<Transfer>),
    /// Transfers to apply, committed together with a new
    /// `last_scanned_block`.
    Progress(Vec<Transfer>, u64),
    /// The source has reached its target head; nothing more to do.
    Done,
}

/// A source of normalized `Transfer` events that the ledger applier can
/// consume without knowing whether they came from the node or an explorer.
#[async_trait]
pub trait TransferSource: Send {
    /// Produce the next step. Returns `Ok(SourceStep::Done)` once the
    /// source has reached its target head.
    async fn next_step(&mut self) -> Result<SourceStep>;
}

/// Drive a [`TransferSource`] to completion, applying each step's transfers
/// to `store` and returning the final `last_scanned_block`.
///
/// # Errors
/// Propagates any error from the source or from applying a batch. Progress
/// already committed is preserved; the caller may retry by driving the same
/// source again (sources are expected to resume from `store`'s persisted
/// state on construction, not from in-memory position alone).
pub async fn drive(store: &SqliteStore, source: &mut dyn TransferSource) -> Result<u64> {
    let mut last = store.last_scanned_block().await?.unwrap_or(0);

    loop {
        match source.next_step().await? {
            SourceStep::Partial(transfers) => {
                apply_batch(store, &transfers, None).await?;
            }
            SourceStep::Progress(transfers, block) => {
                apply_batch(store, &transfers, Some(block)).await?;
                last = block;
            }
            SourceStep::Done => return Ok(last),
        }
    }
}
