//! The ledger applier (LDG): the pure, idempotent core that mutates holder
//! balances and records applied events.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, U256};
use tracing::warn;

use crate::error::Result;
use crate::store::SqliteStore;
use crate::types::{LogIndex, Transfer};

/// Outcome of applying a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The transfer was new and its mutations were committed.
    Applied,
    /// The transfer's `event_id` was already recorded; no mutation
    /// occurred.
    AlreadySeen,
}

/// Summary of applying one batch of transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Transfers newly applied.
    pub applied: u64,
    /// Transfers skipped as duplicates.
    pub already_seen: u64,
}

/// Counts negative-balance clamps across the process lifetime. Under a
/// correct full scan this should never move; a nonzero value indicates a
/// missed earlier event.
pub static CLAMPED_NEGATIVE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Apply a batch of transfers to the store within one transaction, and
/// optionally advance `last_scanned_block` in the same commit.
///
/// Transfers must already be in ascending `(block, logIndex)` order as
/// delivered by the source; this function does not sort them. All
/// mutations for the batch, plus the progress marker, commit together or
/// not at all — this is what makes interrupted scans resumable without
/// replay.
///
/// # Errors
/// Returns an error if the transaction fails to commit; the batch is
/// rolled back and the caller should retry.
pub async fn apply_batch(
    store: &SqliteStore,
    transfers: &[Transfer],
    last_scanned_block: Option<u64>,
) -> Result<BatchStats> {
    let mut stats = BatchStats::default();
    let mut tx = store.begin().await?;

    for transfer in transfers {
        let event_id = transfer.event_id();
        let log_index_str = match transfer.log_index {
            LogIndex::Real(idx) => idx.to_string(),
            LogIndex::TransactionIndexFallback(idx) => format!("ti{idx}"),
        };

        let already_seen = SqliteStore::check_and_record_event_tx(
            &mut tx,
            &event_id,
            transfer.block,
            &format!("{:#x}", transfer.tx_hash),
            &log_index_str,
            transfer.ts,
        )
        .await?;

        if already_seen {
            stats.already_seen += 1;
            continue;
        }

        for (addr, delta) in [
            (transfer.from, Delta::Debit(transfer.value)),
            (transfer.to, Delta::Credit(transfer.value)),
        ] {
            if addr.is_zero() {
                continue;
            }
            apply_endpoint(&mut tx, addr, delta, transfer.block, transfer.ts).await?;
        }

        stats.applied += 1;
    }

    if let Some(block) = last_scanned_block {
        SqliteStore::set_last_scanned_block(&mut tx, block).await?;
    }

    tx.commit().await.map_err(commit_error)?;
    Ok(stats)
}

enum Delta {
    Credit(U256),
    Debit(U256),
}

async fn apply_endpoint(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    addr: Address,
    delta: Delta,
    block: u64,
    ts: u64,
) -> Result<()> {
    let old = SqliteStore::holder_balance_tx(tx, addr).await?;

    let new = match delta {
        Delta::Credit(value) => old.saturating_add(value),
        Delta::Debit(value) => {
            if value > old {
                warn!(
                    address = %addr,
                    old = %old,
                    debit = %value,
                    "clamping negative balance to zero"
                );
                CLAMPED_NEGATIVE_COUNT.fetch_add(1, Ordering::Relaxed);
                SqliteStore::incr_clamped_negative_count(tx).await?;
                U256::ZERO
            } else {
                old - value
            }
        }
    };

    SqliteStore::upsert_holder_tx(tx, addr, new, block, ts).await
}

fn commit_error(e: sqlx::Error) -> crate::error::AppError {
    crate::error::InfraError::Database(e).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn transfer(from: Address, to: Address, value: u64, block: u64, log_index: u32) -> Transfer {
        Transfer {
            from,
            to,
            value: U256::from(value),
            block,
            ts: 1000 + block,
            tx_hash: B256::repeat_byte(block as u8),
            log_index: LogIndex::Real(log_index),
        }
    }

    async fn store() -> SqliteStore {
        let store = SqliteStore::connect(":memory:").await.unwrap();
        store.run_migrations().await.unwrap();
        store
    }

    #[tokio::test]
    async fn s1_single_transfer_clamps_sender_to_zero() {
        let store = store().await;
        let a = Address::repeat_byte(0xAA);
        let b = Address::repeat_byte(0xBB);

        let stats = apply_batch(&store, &[transfer(a, b, 100, 10, 0)], Some(10))
            .await
            .unwrap();
        assert_eq!(stats.applied, 1);

        assert_eq!(store.get_balance(a).await.unwrap(), Some(U256::ZERO));
        assert_eq!(store.get_balance(b).await.unwrap(), Some(U256::from(100u64)));
    }

    #[tokio::test]
    async fn s2_mint_then_transfer() {
        let store = store().await;
        let a = Address::repeat_byte(0xAA);
        let b = Address::repeat_byte(0xBB);

        apply_batch(&store, &[transfer(Address::ZERO, a, 500, 1, 0)], Some(1))
            .await
            .unwrap();
        apply_batch(&store, &[transfer(a, b, 200, 2, 0)], Some(2))
            .await
            .unwrap();

        assert_eq!(store.get_balance(a).await.unwrap(), Some(U256::from(300u64)));
        assert_eq!(store.get_balance(b).await.unwrap(), Some(U256::from(200u64)));
        assert_eq!(store.get_balance(Address::ZERO).await.unwrap(), None);
    }

    #[tokio::test]
    async fn s3_dedup_reapplication_is_a_noop() {
        let store = store().await;
        let a = Address::repeat_byte(0xAA);
        let b = Address::repeat_byte(0xBB);

        let t1 = transfer(Address::ZERO, a, 500, 1, 0);
        let t2 = transfer(a, b, 200, 2, 0);

        apply_batch(&store, &[t1.clone(), t2.clone()], Some(2))
            .await
            .unwrap();
        let stats = apply_batch(&store, &[t1, t2], Some(2)).await.unwrap();

        assert_eq!(stats.already_seen, 2);
        assert_eq!(stats.applied, 0);
        assert_eq!(store.get_balance(a).await.unwrap(), Some(U256::from(300u64)));
        assert_eq!(store.get_balance(b).await.unwrap(), Some(U256::from(200u64)));
    }

    #[tokio::test]
    async fn conservation_holds_across_non_mint_non_burn_transfers() {
        let store = store().await;
        let a = Address::repeat_byte(0xAA);
        let b = Address::repeat_byte(0xBB);
        let c = Address::repeat_byte(0xCC);

        apply_batch(&store, &[transfer(Address::ZERO, a, 1000, 1, 0)], Some(1))
            .await
            .unwrap();
        apply_batch(
            &store,
            &[transfer(a, b, 300, 2, 0), transfer(b, c, 100, 3, 0)],
            Some(3),
        )
        .await
        .unwrap();

        let total = store.get_balance(a).await.unwrap().unwrap_or(U256::ZERO)
            + store.get_balance(b).await.unwrap().unwrap_or(U256::ZERO)
            + store.get_balance(c).await.unwrap().unwrap_or(U256::ZERO);
        assert_eq!(total, U256::from(1000u64));
    }
}
