//! Integration coverage for resumability and monotonic progress across
//! separate store connections, simulating a process restart mid-scan.

use alloy::primitives::{Address, B256, U256};

use erc20_holder_indexer::ledger::apply_batch;
use erc20_holder_indexer::store::SqliteStore;
use erc20_holder_indexer::types::{LogIndex, Transfer};

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

async fn open(path: &str) -> SqliteStore {
    let store = SqliteStore::connect(path).await.expect("open store");
    store.run_migrations().await.expect("run migrations");
    store
}

#[tokio::test]
async fn last_scanned_block_survives_a_reconnect() {
    let dir = tempfile_dir();
    let path = dir.join("state.db");
    let path_str = path.to_str().unwrap();

    {
        let store = open(path_str).await;
        let a = Address::repeat_byte(0xAA);
        let b = Address::repeat_byte(0xBB);
        apply_batch(&store, &[transfer(a, b, 100, 10, 0)], Some(10))
            .await
            .expect("apply batch");
    }

    // Simulate a process restart: fresh connection, same file.
    let store = open(path_str).await;
    assert_eq!(store.last_scanned_block().await.unwrap(), Some(10));

    let a = Address::repeat_byte(0xAA);
    let b = Address::repeat_byte(0xBB);
    assert_eq!(store.get_balance(a).await.unwrap(), Some(U256::ZERO));
    assert_eq!(store.get_balance(b).await.unwrap(), Some(U256::from(100u64)));
}

#[tokio::test]
async fn resuming_from_last_scanned_block_does_not_reapply_prior_batches() {
    let dir = tempfile_dir();
    let path = dir.join("state.db");
    let path_str = path.to_str().unwrap();

    let a = Address::repeat_byte(0xAA);
    let b = Address::repeat_byte(0xBB);
    let c = Address::repeat_byte(0xCC);

    {
        let store = open(path_str).await;
        apply_batch(&store, &[transfer(Address::ZERO, a, 1000, 1, 0)], Some(1))
            .await
            .unwrap();
        apply_batch(&store, &[transfer(a, b, 300, 2, 0)], Some(2))
            .await
            .unwrap();
    }

    // Reconnect and resume from last_scanned_block + 1, applying only the
    // transfer the first run never saw.
    let store = open(path_str).await;
    let resume_from = store.last_scanned_block().await.unwrap().unwrap() + 1;
    assert_eq!(resume_from, 3);

    apply_batch(&store, &[transfer(b, c, 100, 3, 0)], Some(3))
        .await
        .unwrap();

    assert_eq!(store.get_balance(a).await.unwrap(), Some(U256::from(700u64)));
    assert_eq!(store.get_balance(b).await.unwrap(), Some(U256::from(200u64)));
    assert_eq!(store.get_balance(c).await.unwrap(), Some(U256::from(100u64)));
    assert_eq!(store.last_scanned_block().await.unwrap(), Some(3));
}

#[tokio::test]
async fn last_scanned_block_only_advances_on_successful_commit() {
    let dir = tempfile_dir();
    let path = dir.join("state.db");
    let store = open(path.to_str().unwrap()).await;

    let a = Address::repeat_byte(0xAA);
    let b = Address::repeat_byte(0xBB);

    apply_batch(&store, &[transfer(a, b, 10, 5, 0)], Some(5)).await.unwrap();
    assert_eq!(store.last_scanned_block().await.unwrap(), Some(5));

    apply_batch(&store, &[transfer(a, b, 10, 6, 0)], Some(6)).await.unwrap();
    assert_eq!(store.last_scanned_block().await.unwrap(), Some(6));

    // Never goes backwards under repeated application of the same batch.
    apply_batch(&store, &[transfer(a, b, 10, 6, 0)], Some(6)).await.unwrap();
    assert_eq!(store.last_scanned_block().await.unwrap(), Some(6));
}

/// A unique-per-call temp directory, distinct across concurrently running
/// tests in the same process. Left on disk for inspection on failure.
fn tempfile_dir() -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut dir = std::env::temp_dir();
    let unique = format!(
        "erc20-holder-indexer-test-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    dir.push(unique);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
