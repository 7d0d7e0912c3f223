//! SQLite implementation of the event store.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Sqlite, Transaction};
use tracing::{debug, instrument};

use crate::error::{InfraError, Result};
use crate::types::checksum;

/// A holder row read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderRow {
    /// Checksummed holder address.
    pub address: String,
    /// Current balance, arbitrary precision.
    pub balance: U256,
    /// Block of the most recently applied transfer touching this holder.
    pub last_tx_block: u64,
    /// Timestamp of the most recently applied transfer touching this
    /// holder.
    pub last_tx_ts: u64,
}

/// SQLite-backed event store.
///
/// Holds holder balances, a dedup ledger of applied events, and scalar
/// progress metadata (`last_scanned_block` and friends) in a single
/// WAL-journaled database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if absent) the database file at `path`, with WAL
    /// journaling enabled.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the connection pool
    /// cannot be established.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = sqlx::sqlite::SqliteConnectOptions::from_str(&format!("sqlite://{path}"))
            .map_err(sqlx::Error::from)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(InfraError::Database)?;

        Ok(Self { pool })
    }

    /// Access the underlying pool (used to begin transactions for batched
    /// ledger application).
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run pending migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfraError::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Begin a transaction used to apply one batch of transfers atomically.
    ///
    /// # Errors
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| InfraError::Database(e).into())
    }

    /// Fetch a single holder's balance, or `None` if the address has never
    /// received a transfer.
    ///
    /// # Errors
    /// Returns an error on database failure.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: Address) -> Result<Option<U256>> {
        let addr = checksum(address);
        let row: Option<(String,)> = sqlx::query_as("SELECT balance FROM holders WHERE address = ?1")
            .bind(&addr)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfraError::Database)?;

        row.map(|(balance,)| {
            U256::from_str(&balance)
                .map_err(|e| InfraError::Database(sqlx::Error::Decode(Box::new(e))).into())
        })
        .transpose()
    }

    /// Read `last_scanned_block` from `meta`, if set.
    ///
    /// # Errors
    /// Returns an error on database failure.
    pub async fn last_scanned_block(&self) -> Result<Option<u64>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM meta WHERE key = 'last_scanned_block'")
                .fetch_optional(&self.pool)
                .await
                .map_err(InfraError::Database)?;

        row.map(|(v,)| {
            v.parse()
                .map_err(|_| InfraError::Database(sqlx::Error::ColumnDecode {
                    index: "value".into(),
                    source: "invalid last_scanned_block".into(),
                })
                .into())
        })
        .transpose()
    }

    /// Persist `last_scanned_block` within an open transaction.
    ///
    /// # Errors
    /// Returns an error on database failure.
    pub async fn set_last_scanned_block(
        tx: &mut Transaction<'_, Sqlite>,
        block: u64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO meta (key, value) VALUES ('last_scanned_block', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(block.to_string())
        .execute(&mut **tx)
        .await
        .map_err(InfraError::Database)?;
        Ok(())
    }

    /// Increment the `clamped_negative_count` meta counter within an open
    /// transaction. Indicates a balance underflow was clamped to zero —
    /// expected only when replaying a partial history.
    ///
    /// # Errors
    /// Returns an error on database failure.
    pub async fn incr_clamped_negative_count(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
        sqlx::query(
            "INSERT INTO meta (key, value) VALUES ('clamped_negative_count', '1')
             ON CONFLICT(key) DO UPDATE SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT)",
        )
        .execute(&mut **tx)
        .await
        .map_err(InfraError::Database)?;
        Ok(())
    }

    /// Look up a holder's balance within an open transaction (0 if absent).
    ///
    /// # Errors
    /// Returns an error on database failure or a malformed stored balance.
    pub async fn holder_balance_tx(
        tx: &mut Transaction<'_, Sqlite>,
        address: Address,
    ) -> Result<U256> {
        let addr = checksum(address);
        let row: Option<(String,)> = sqlx::query_as("SELECT balance FROM holders WHERE address = ?1")
            .bind(&addr)
            .fetch_optional(&mut **tx)
            .await
            .map_err(InfraError::Database)?;

        match row {
            Some((balance,)) => U256::from_str(&balance)
                .map_err(|e| InfraError::Database(sqlx::Error::Decode(Box::new(e))).into()),
            None => Ok(U256::ZERO),
        }
    }

    /// Upsert a holder row within an open transaction.
    ///
    /// # Errors
    /// Returns an error on database failure.
    pub async fn upsert_holder_tx(
        tx: &mut Transaction<'_, Sqlite>,
        address: Address,
        balance: U256,
        last_tx_block: u64,
        last_tx_ts: u64,
    ) -> Result<()> {
        let addr = checksum(address);
        sqlx::query(
            "INSERT INTO holders (address, balance, last_tx_block, last_tx_ts)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(address) DO UPDATE SET
                balance = excluded.balance,
                last_tx_block = excluded.last_tx_block,
                last_tx_ts = excluded.last_tx_ts",
        )
        .bind(&addr)
        .bind(balance.to_string())
        .bind(i64::try_from(last_tx_block).unwrap_or(i64::MAX))
        .bind(i64::try_from(last_tx_ts).unwrap_or(i64::MAX))
        .execute(&mut **tx)
        .await
        .map_err(InfraError::Database)?;
        Ok(())
    }

    /// `true` if the event was already recorded (dedup check within an open
    /// transaction). If absent, inserts it and returns `false`.
    ///
    /// # Errors
    /// Returns an error on database failure.
    pub async fn check_and_record_event_tx(
        tx: &mut Transaction<'_, Sqlite>,
        event_id: &str,
        block_number: u64,
        tx_hash: &str,
        log_index: &str,
        ts: u64,
    ) -> Result<bool> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM events WHERE event_id = ?1")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(InfraError::Database)?;

        if existing.is_some() {
            debug!(event_id, "event already recorded, skipping");
            return Ok(true);
        }

        sqlx::query(
            "INSERT INTO events (event_id, block_number, tx_hash, log_index, ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(event_id)
        .bind(i64::try_from(block_number).unwrap_or(i64::MAX))
        .bind(tx_hash)
        .bind(log_index)
        .bind(i64::try_from(ts).unwrap_or(i64::MAX))
        .execute(&mut **tx)
        .await
        .map_err(InfraError::Database)?;

        Ok(false)
    }

    /// The `n` holders with the largest non-zero balance, ordered by
    /// numeric magnitude (length-then-lexicographic on the decimal string,
    /// which is equivalent for non-negative decimal strings with no
    /// leading zeros).
    ///
    /// # Errors
    /// Returns an error on database failure or a malformed stored balance.
    #[instrument(skip(self))]
    pub async fn top_n(&self, n: u32) -> Result<Vec<HolderRow>> {
        let rows: Vec<(String, String, i64, i64)> = sqlx::query_as(
            "SELECT address, balance, last_tx_block, last_tx_ts
             FROM holders
             WHERE balance != '0'
             ORDER BY LENGTH(balance) DESC, balance DESC
             LIMIT ?1",
        )
        .bind(i64::from(n))
        .fetch_all(&self.pool)
        .await
        .map_err(InfraError::Database)?;

        rows.into_iter()
            .map(|(address, balance, last_tx_block, last_tx_ts)| {
                Ok(HolderRow {
                    address,
                    balance: U256::from_str(&balance)
                        .map_err(|e| InfraError::Database(sqlx::Error::Decode(Box::new(e))))?,
                    last_tx_block: u64::try_from(last_tx_block).unwrap_or(0),
                    last_tx_ts: u64::try_from(last_tx_ts).unwrap_or(0),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        let store = SqliteStore::connect(":memory:").await.unwrap();
        store.run_migrations().await.unwrap();
        store
    }

    #[tokio::test]
    async fn upsert_and_read_balance() {
        let store = store().await;
        let addr = Address::repeat_byte(0x11);
        let mut tx = store.begin().await.unwrap();
        SqliteStore::upsert_holder_tx(&mut tx, addr, U256::from(100u64), 10, 1000)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let balance = store.get_balance(addr).await.unwrap();
        assert_eq!(balance, Some(U256::from(100u64)));
    }

    #[tokio::test]
    async fn event_dedup_within_transaction() {
        let store = store().await;
        let mut tx = store.begin().await.unwrap();
        let first =
            SqliteStore::check_and_record_event_tx(&mut tx, "0xabc:0", 10, "0xabc", "0", 1000)
                .await
                .unwrap();
        let second =
            SqliteStore::check_and_record_event_tx(&mut tx, "0xabc:0", 10, "0xabc", "0", 1000)
                .await
                .unwrap();
        tx.commit().await.unwrap();

        assert!(!first, "first insertion should report not-already-seen");
        assert!(second, "second insertion should report already-seen");
    }

    #[tokio::test]
    async fn top_n_excludes_zero_balances_and_orders_by_magnitude() {
        let store = store().await;
        let mut tx = store.begin().await.unwrap();
        for (byte, balance) in [(0xA, 9u64), (0xB, 10), (0xC, 100), (0xD, 0)] {
            SqliteStore::upsert_holder_tx(
                &mut tx,
                Address::repeat_byte(byte),
                U256::from(balance),
                1,
                1,
            )
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let top = store.top_n(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].balance, U256::from(100u64));
        assert_eq!(top[1].balance, U256::from(10u64));
    }

    #[tokio::test]
    async fn last_scanned_block_roundtrips() {
        let store = store().await;
        assert_eq!(store.last_scanned_block().await.unwrap(), None);

        let mut tx = store.begin().await.unwrap();
        SqliteStore::set_last_scanned_block(&mut tx, 42).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.last_scanned_block().await.unwrap(), Some(42));
    }
}
