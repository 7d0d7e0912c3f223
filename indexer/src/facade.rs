//! The indexer facade (IDX): orchestrates scan/bootstrap runs and answers
//! top-N queries, converting raw balances to human decimals using token
//! metadata.
//!
//! The facade owns the DB handle, the chain provider, and an explorer HTTP
//! client. It is instantiated once per process; scans and bootstraps
//! acquire an internal mutex so only one runs at a time against a given
//! store.

use std::sync::Arc;
use tokio::sync::Mutex;

use alloy::primitives::{Address, U256};
use evm_provider::{ChainProvider, StandardEvmProvider};

use crate::config::Settings;
use crate::error::{AppError, DomainError, InfraError, Result};
use crate::scanners::explorer::ExplorerScanner;
use crate::scanners::rpc::RpcScanner;
use crate::scanners::{drive, TransferSource};
use crate::store::{HolderRow, SqliteStore};
use crate::types::checksum;

/// Source to refresh from before answering a top-N query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Run an RPC log scan up to the confirmation-adjusted safe head.
    Rpc,
    /// Bootstrap from the block explorer, starting after the last scanned
    /// block.
    Explorer,
}

/// A holder entry as returned by top-N queries, with balance converted to
/// human-readable decimal form.
#[derive(Debug, Clone)]
pub struct TopHolder {
    /// Checksummed address.
    pub address: String,
    /// Raw balance, smallest token unit.
    pub balance_raw: U256,
    /// Balance divided by `10^decimals`, as a decimal string.
    pub balance_human: String,
    /// Unix timestamp of the holder's most recent applied transfer.
    pub last_tx_ts: u64,
}

/// The indexing engine: owns the store, chain provider, and explorer HTTP
/// client, and coordinates access to them.
#[derive(Clone)]
pub struct Indexer {
    store: SqliteStore,
    provider: Arc<StandardEvmProvider>,
    http: reqwest::Client,
    settings: Settings,
    scan_lock: Arc<Mutex<()>>,
}

impl Indexer {
    /// Build a facade from loaded settings, opening the store and chain
    /// provider.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened/migrated or the
    /// settings are invalid.
    pub async fn new(settings: Settings) -> Result<Self> {
        let store = SqliteStore::connect(&settings.db_path)
            .await
            .map_err(|e| AppError::Initialization(e.to_string()))?;
        store.run_migrations().await?;

        let provider = StandardEvmProvider::with_timeout(
            &settings.rpc_url,
            settings.chain_id,
            settings.http_request_timeout(),
        )
        .map_err(InfraError::Rpc)?;

        let http = reqwest::Client::builder()
            .timeout(settings.http_request_timeout())
            .build()
            .map_err(InfraError::Http)?;

        Ok(Self {
            store,
            provider: Arc::new(provider),
            http,
            settings,
            scan_lock: Arc::new(Mutex::new(())),
        })
    }

    fn token_address(&self) -> Result<Address> {
        crate::types::parse_address(&self.settings.token_address)
            .map_err(|e| DomainError::InvalidAddress(e.to_string()).into())
    }

    /// Run an RPC log scan up to the confirmation-adjusted safe head,
    /// advancing `last_scanned_block`.
    ///
    /// # Errors
    /// Returns [`AppError::ScanInProgress`] if a scan or bootstrap is
    /// already running; otherwise propagates provider/store errors.
    pub async fn scan(&self, start_block: Option<u64>, batch_size: u64, confirmations: u64) -> Result<u64> {
        let _guard = self
            .scan_lock
            .try_lock()
            .map_err(|_| AppError::ScanInProgress)?;

        let token = self.token_address()?;
        let head = self.provider.block_number().await.map_err(InfraError::Rpc)?;
        let safe_head = head.saturating_sub(confirmations);

        let cur = match self.store.last_scanned_block().await? {
            Some(last) => last + 1,
            None => start_block.ok_or(DomainError::MissingStartBlock)?,
        };

        if cur > safe_head {
            return Ok(self.store.last_scanned_block().await?.unwrap_or(safe_head));
        }

        let mut scanner = RpcScanner::new(self.provider.as_ref(), token, cur, safe_head, batch_size);
        drive(&self.store, &mut scanner).await
    }

    /// Bootstrap from the block explorer, starting after the last scanned
    /// block (or `start`, if the store is empty).
    ///
    /// # Errors
    /// Returns [`DomainError::MissingApiKey`] if no API key is configured
    /// or supplied; [`AppError::ScanInProgress`] if a scan is already
    /// running.
    pub async fn bootstrap(
        &self,
        api_key: Option<&str>,
        start: Option<u64>,
        offset: u32,
        sleep: std::time::Duration,
    ) -> Result<u64> {
        let _guard = self
            .scan_lock
            .try_lock()
            .map_err(|_| AppError::ScanInProgress)?;

        let api_key = api_key
            .map(ToString::to_string)
            .or_else(|| self.settings.explorer_api_key.clone())
            .ok_or(DomainError::MissingApiKey)?;

        let token = self.token_address()?;
        let head = self.provider.block_number().await.map_err(InfraError::Rpc)?;
        let confirmations = self.settings.confirmations;
        let safe_head = head.saturating_sub(confirmations);

        let from_block = match self.store.last_scanned_block().await? {
            Some(last) => last + 1,
            None => start.ok_or(DomainError::MissingStartBlock)?,
        };

        let mut scanner = ExplorerScanner::new(
            self.http.clone(),
            self.settings.explorer_base_url.clone(),
            api_key,
            token,
            self.settings.chain_id,
            from_block,
            safe_head,
            offset,
            sleep,
        );
        drive(&self.store, &mut scanner).await
    }

    async fn refresh(&self, refresh: Refresh, api_key: Option<&str>) -> Result<()> {
        match refresh {
            Refresh::Rpc => {
                self.scan(None, self.settings.batch_size, self.settings.confirmations)
                    .await?;
            }
            Refresh::Explorer => {
                self.bootstrap(
                    api_key,
                    None,
                    self.settings.bootstrap_offset,
                    self.settings.bootstrap_sleep(),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Convert a raw balance to its human-decimal string form (`raw / 10^decimals`).
    #[must_use]
    pub fn format_human(raw: U256, decimals: u8) -> String {
        if decimals == 0 {
            return raw.to_string();
        }
        let divisor = U256::from(10u64).pow(U256::from(decimals));
        let whole = raw / divisor;
        let frac = raw % divisor;
        let frac_str = frac.to_string();
        let padded = "0".repeat(decimals as usize - frac_str.len()) + &frac_str;
        format!("{whole}.{padded}")
    }

    /// `true` if an explorer API key is configured, so `/bootstrap` callers
    /// may omit it.
    #[must_use]
    pub fn has_configured_api_key(&self) -> bool {
        self.settings.explorer_api_key.is_some()
    }

    /// Checksummed display form of the configured token address.
    #[must_use]
    pub fn token_address_display(&self) -> String {
        self.token_address()
            .map(checksum)
            .unwrap_or_else(|_| self.settings.token_address.clone())
    }

    /// Current balance for a single address, directly from the store
    /// (no refresh).
    ///
    /// # Errors
    /// Returns an error if `address` is malformed or the store read fails.
    pub async fn balance(&self, address: &str) -> Result<U256> {
        let addr = crate::types::parse_address(address)
            .map_err(|e| DomainError::InvalidAddress(e.to_string()))?;
        Ok(self.store.get_balance(addr).await?.unwrap_or(U256::ZERO))
    }

    /// Token decimals, read live via `decimals()`. Used to convert raw
    /// balances to human-readable form.
    ///
    /// # Errors
    /// Returns an error on RPC failure.
    pub async fn decimals(&self) -> Result<u8> {
        let token = self.token_address()?;
        let selector = [0x31, 0x3c, 0xe5, 0x67]; // decimals()
        let result = self
            .provider
            .call(token, alloy::primitives::Bytes::from(selector.to_vec()))
            .await
            .map_err(InfraError::Rpc)?;
        Ok(result.last().copied().unwrap_or(18))
    }

    /// Token symbol, read live via `symbol()`.
    ///
    /// # Errors
    /// Returns an error on RPC failure.
    pub async fn symbol(&self) -> Result<String> {
        self.call_abi_string([0x95, 0xd8, 0x9b, 0x41]).await
    }

    /// Token display name, read live via `name()`.
    ///
    /// # Errors
    /// Returns an error on RPC failure.
    pub async fn name(&self) -> Result<String> {
        self.call_abi_string([0x06, 0xfd, 0xde, 0x03]).await
    }

    /// Total supply, read live via `totalSupply()`.
    ///
    /// # Errors
    /// Returns an error on RPC failure.
    pub async fn total_supply(&self) -> Result<U256> {
        let token = self.token_address()?;
        let result = self
            .provider
            .call(token, alloy::primitives::Bytes::from(vec![0x18, 0x16, 0x0d, 0xdd]))
            .await
            .map_err(InfraError::Rpc)?;
        Ok(U256::try_from_be_slice(&result).unwrap_or(U256::ZERO))
    }

    async fn call_abi_string(&self, selector: [u8; 4]) -> Result<String> {
        let token = self.token_address()?;
        let result = self
            .provider
            .call(token, alloy::primitives::Bytes::from(selector.to_vec()))
            .await
            .map_err(InfraError::Rpc)?;
        Ok(decode_abi_string(&result))
    }

    /// The `n` holders with the largest non-zero balance, after an implied
    /// refresh.
    ///
    /// # Errors
    /// Propagates refresh and store errors.
    pub async fn top_n(&self, n: u32, refresh: Refresh, api_key: Option<&str>) -> Result<Vec<TopHolder>> {
        self.refresh(refresh, api_key).await?;
        let decimals = self.decimals().await.unwrap_or(18);
        let rows = self.store.top_n(n).await?;
        Ok(rows.into_iter().map(|r| self.row_to_holder(r, decimals)).collect())
    }

    fn row_to_holder(&self, row: HolderRow, decimals: u8) -> TopHolder {
        TopHolder {
            address: row.address,
            balance_raw: row.balance,
            balance_human: Self::format_human(row.balance, decimals),
            last_tx_ts: row.last_tx_ts,
        }
    }

    /// Read-only access to the underlying store, for HTTP handlers that
    /// need a direct read (e.g. `/get_balance_batch`).
    #[must_use]
    pub const fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Read-only access to the chain provider, for handlers needing live
    /// contract reads (e.g. `/get_token_info`).
    #[must_use]
    pub fn provider(&self) -> Arc<StandardEvmProvider> {
        Arc::clone(&self.provider)
    }

    /// Checksum helper exposed for HTTP handlers formatting addresses.
    #[must_use]
    pub fn checksum(address: Address) -> String {
        checksum(address)
    }
}

/// Decode a Solidity ABI-encoded dynamic `string` return value: a 32-byte
/// offset, a 32-byte length, then the UTF-8 bytes padded to a 32-byte
/// boundary. Tolerant of short/malformed responses (returns empty string)
/// since token metadata is a best-effort display concern.
fn decode_abi_string(data: &[u8]) -> String {
    if data.len() < 64 {
        return String::new();
    }
    let len = U256::try_from_be_slice(&data[32..64])
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(0);
    let start = 64;
    let end = (start + len).min(data.len());
    if start >= end {
        return String::new();
    }
    String::from_utf8_lossy(&data[start..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::decode_abi_string;

    #[test]
    fn decode_abi_string_parses_dynamic_return() {
        let mut data = vec![0u8; 64];
        data[31] = 0x20; // offset = 32
        data[63] = 4; // length = 4
        data.extend_from_slice(b"USDC");
        data.extend_from_slice(&[0u8; 28]); // pad to 32-byte boundary
        assert_eq!(decode_abi_string(&data), "USDC");
    }

    #[test]
    fn decode_abi_string_tolerates_short_input() {
        assert_eq!(decode_abi_string(&[0u8; 10]), "");
    }
}
