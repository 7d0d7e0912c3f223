//! Standard EVM provider implementation backed by `chain-rpc`.
//!
//! This module provides [`StandardEvmProvider`], a concrete implementation
//! of [`ChainProvider`] that works with any standard EVM-compatible chain
//! reachable over JSON-RPC.
//!
//! # Example
//!
//! ```no_run
//! use evm_provider::StandardEvmProvider;
//!
//! # fn run() -> evm_provider::Result<()> {
//! let provider = StandardEvmProvider::new("https://polygon-rpc.com", 137)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use chain_rpc::{ClientConfig, RpcClient};
use tracing::{debug, instrument};

use crate::error::{ProviderError, Result};
use crate::traits::ChainProvider;
use crate::types::{LogFilter, LogsPage};

// ═══════════════════════════════════════════════════════════════════════════════
// STANDARD EVM PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Standard EVM provider for chains without special features.
///
/// Wraps a [`chain_rpc::RpcClient`] and implements [`ChainProvider`] on top
/// of it. The chain ID is supplied by the caller rather than queried at
/// connect time, since the set of chains this indexer targets is known
/// ahead of time via configuration.
#[derive(Debug, Clone)]
pub struct StandardEvmProvider {
    client: std::sync::Arc<RpcClient>,
    chain_id: u64,
}

impl StandardEvmProvider {
    /// Create a new provider connected to the given RPC URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        Self::with_timeout(rpc_url, chain_id, Duration::from_secs(30))
    }

    /// Create a new provider with a custom request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(rpc_url: &str, chain_id: u64, timeout: Duration) -> Result<Self> {
        let client = RpcClient::with_config(rpc_url, ClientConfig::default().with_timeout(timeout))
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;
        debug!(chain_id, rpc_url, "configured EVM provider");
        Ok(Self {
            client: std::sync::Arc::new(client),
            chain_id,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN PROVIDER IMPLEMENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl ChainProvider for StandardEvmProvider {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn block_number(&self) -> Result<u64> {
        Ok(self.client.block_number().await?)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_logs(&self, filter: &LogFilter) -> Result<LogsPage> {
        let topic0: B256 = filter.topic0;
        let logs = self
            .client
            .get_logs(filter.from_block, filter.to_block, filter.address, topic0)
            .await?;
        Ok(LogsPage {
            logs,
            complete: true,
        })
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn block_timestamp(&self, block_number: u64) -> Result<u64> {
        let header = self.client.get_block_by_number(block_number).await?;
        Ok(header
            .timestamp()
            .map_err(|e| ProviderError::InvalidResponse(format!("bad block timestamp: {e}")))?)
    }

    #[instrument(skip(self, data), fields(chain_id = self.chain_id))]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        Ok(self.client.call(to, data).await?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
