//! Core trait for read-only EVM chain access.
//!
//! # Design Philosophy
//!
//! This trait is designed to:
//! - **Be chain-agnostic**: work with any EVM-compatible chain
//! - **Be minimal**: only the operations a log-scanning indexer needs —
//!   no transaction submission, nonce management, or gas estimation
//! - **Support testing**: easy to implement mock providers for testing
//!
//! # Example
//!
//! ```ignore
//! use evm_provider::{ChainProvider, LogFilter};
//!
//! async fn scan_once<P: ChainProvider>(provider: &P, filter: &LogFilter) {
//!     let page = provider.get_logs(filter).await.unwrap();
//!     println!("got {} logs", page.logs.len());
//! }
//! ```

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::LogFilter;
use crate::types::LogsPage;

/// Core trait for read-only access to any EVM chain.
///
/// Implementations handle chain-specific transport details while presenting
/// a uniform interface to callers such as the RPC and explorer scanners.
#[async_trait]
pub trait ChainProvider: Send + Sync + 'static {
    /// Chain identifier (e.g. 137 for Polygon mainnet).
    fn chain_id(&self) -> u64;

    /// Current chain head (highest known block number).
    async fn block_number(&self) -> Result<u64>;

    /// Fetch logs matching a filter. A single call is not expected to
    /// bisect an oversized range itself — that policy belongs to the
    /// caller, which can inspect the returned error to decide whether to
    /// retry with a smaller span.
    async fn get_logs(&self, filter: &LogFilter) -> Result<LogsPage>;

    /// Unix timestamp (seconds) of the given block.
    async fn block_timestamp(&self, block_number: u64) -> Result<u64>;

    /// Execute a read-only call against the chain.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Read an ERC-20 balance via the standard `balanceOf(address)`
    /// selector.
    ///
    /// Default implementation uses [`call`](Self::call); override only if a
    /// chain needs something unusual.
    async fn erc20_balance_of(&self, token: Address, account: Address) -> Result<U256> {
        const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
        let mut data = BALANCE_OF_SELECTOR.to_vec();
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(account.as_slice());

        let result = self.call(token, Bytes::from(data)).await?;
        if result.len() < 32 {
            return Err(ProviderError::InvalidResponse(
                "balanceOf returned less than 32 bytes".into(),
            ));
        }
        Ok(U256::from_be_slice(&result[..32]))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLANKET IMPLEMENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl<T: ChainProvider + ?Sized> ChainProvider for std::sync::Arc<T> {
    fn chain_id(&self) -> u64 {
        (**self).chain_id()
    }

    async fn block_number(&self) -> Result<u64> {
        (**self).block_number().await
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<LogsPage> {
        (**self).get_logs(filter).await
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64> {
        (**self).block_timestamp(block_number).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        (**self).call(to, data).await
    }

    async fn erc20_balance_of(&self, token: Address, account: Address) -> Result<U256> {
        (**self).erc20_balance_of(token, account).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
