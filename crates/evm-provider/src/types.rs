//! Chain-agnostic request/response types for read-only provider operations.

use alloy::primitives::{Address, B256};
use alloy::rpc::types::Log;

/// Filter parameters for a log scan, expressed as plain block numbers rather
/// than the hex-string wire format a JSON-RPC transport needs.
#[derive(Debug, Clone, Copy)]
pub struct LogFilter {
    /// First block to include (inclusive).
    pub from_block: u64,
    /// Last block to include (inclusive).
    pub to_block: u64,
    /// Contract address to filter on.
    pub address: Address,
    /// Event signature (topic 0) to filter on.
    pub topic0: B256,
}

impl LogFilter {
    /// Build a filter for `[from_block, to_block]` against a single
    /// contract address and event signature.
    #[must_use]
    pub const fn new(from_block: u64, to_block: u64, address: Address, topic0: B256) -> Self {
        Self {
            from_block,
            to_block,
            address,
            topic0,
        }
    }

    /// Number of blocks spanned by this filter, inclusive.
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.to_block - self.from_block + 1
    }
}

/// A page of logs returned by a scan; `logs` may be empty even when
/// `complete` is `false` (a range that was scanned but yielded no matches).
#[derive(Debug, Clone, Default)]
pub struct LogsPage {
    /// Logs returned for this page.
    pub logs: Vec<Log>,
    /// `true` when this page covered the full requested range without
    /// needing to shrink it.
    pub complete: bool,
}

/// Basic ERC-20 metadata, as read via `symbol()`, `name()`, `decimals()`,
/// and `totalSupply()`.
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    /// Token symbol, e.g. `"USDC"`.
    pub symbol: String,
    /// Token display name, e.g. `"USD Coin"`.
    pub name: String,
    /// Number of decimals the token's balances are denominated in.
    pub decimals: u8,
    /// Total supply, in the token's smallest unit.
    pub total_supply: alloy::primitives::U256,
}
