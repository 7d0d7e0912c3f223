//! Chain-agnostic abstraction for read-only EVM access: log scanning, block
//! timestamps, and contract calls.
//!
//! # Crate Relationships
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Application Layer (indexer)                             │
//! │  └─ scanners depend on ChainProvider, not a concrete impl │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Abstraction Layer (evm-provider) ◄── YOU ARE HERE       │
//! │  └─ StandardEvmProvider wraps chain-rpc                  │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  RPC Layer (chain-rpc)                                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use evm_provider::{ChainProvider, LogFilter, StandardEvmProvider};
//! use alloy::primitives::{address, b256};
//!
//! # async fn run() -> evm_provider::Result<()> {
//! let provider = StandardEvmProvider::new("https://polygon-rpc.com", 137)?;
//! let head = provider.block_number().await?;
//! let transfer_topic = b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
//! let token = address!("1111111111111111111111111111111111111111");
//! let filter = LogFilter::new(head - 2000, head, token, transfer_topic);
//! let page = provider.get_logs(&filter).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The [`ChainProvider`] trait
//! - [`standard`] - [`StandardEvmProvider`], the concrete implementation
//! - [`types`] - [`LogFilter`], [`LogsPage`], [`TokenMetadata`]
//! - [`error`] - Error types

#![doc(html_root_url = "https://docs.rs/evm-provider")]

pub mod error;
pub mod standard;
pub mod traits;
pub mod types;

pub use error::{ProviderError, Result};
pub use standard::StandardEvmProvider;
pub use traits::ChainProvider;
pub use types::{LogFilter, LogsPage, TokenMetadata};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn exports_are_available() {
        let _: fn(&str, u64) -> Result<StandardEvmProvider> = StandardEvmProvider::new;
    }
}
