//! Request and response types for the JSON-RPC methods this crate speaks:
//! `eth_blockNumber`, `eth_getLogs`, `eth_getBlockByNumber`, `eth_call`.

use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::Log;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// LOG FILTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Filter parameters for `eth_getLogs`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Starting block (hex string like "0x100").
    pub from_block: String,
    /// Ending block (hex string like "0x200").
    pub to_block: String,
    /// Contract address to filter on.
    pub address: Address,
    /// Topics to filter; position 0 is the event signature.
    pub topics: Vec<Option<B256>>,
}

impl LogFilter {
    /// Create a filter for a block range against a single contract address
    /// and event signature (topic 0).
    #[must_use]
    pub fn new(from_block: u64, to_block: u64, address: Address, topic0: B256) -> Self {
        Self {
            from_block: format!("0x{from_block:x}"),
            to_block: format!("0x{to_block:x}"),
            address,
            topics: vec![Some(topic0)],
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCK HEADER (subset needed for timestamps)
// ═══════════════════════════════════════════════════════════════════════════════

/// The subset of `eth_getBlockByNumber`'s result this indexer needs.
///
/// Deliberately tolerant: proof-of-authority chains attach extra fields
/// (e.g. `extraData` beyond 32 bytes) that this type simply ignores via
/// `#[serde(default)]` / not declaring them, rather than rejecting the
/// response.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    /// Block number (hex string).
    pub number: String,
    /// Block timestamp (hex string, seconds since epoch).
    pub timestamp: String,
}

impl BlockHeader {
    /// Parse the block number from its hex-string form.
    ///
    /// # Errors
    /// Returns an error if the field is not valid hex.
    pub fn block_number(&self) -> Result<u64, std::num::ParseIntError> {
        u64::from_str_radix(self.number.trim_start_matches("0x"), 16)
    }

    /// Parse the timestamp from its hex-string form.
    ///
    /// # Errors
    /// Returns an error if the field is not valid hex.
    pub fn timestamp(&self) -> Result<u64, std::num::ParseIntError> {
        u64::from_str_radix(self.timestamp.trim_start_matches("0x"), 16)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ETH_CALL
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameters for `eth_call`, targeting a contract's read-only entry point.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    /// Target contract address.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON-RPC ENVELOPE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: u64,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    pub fn new(method: &'a str, params: P, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC response wrapper for extracting result or error.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    pub id: u64,
    pub result: Option<T>,
    pub error: Option<crate::error::RpcErrorDetail>,
}

pub use Log as TransferLog;
