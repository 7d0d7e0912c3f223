//! A minimal JSON-RPC client speaking the subset of the standard Ethereum
//! JSON-RPC API this indexer needs: `eth_blockNumber`, `eth_getLogs`,
//! `eth_getBlockByNumber`, `eth_call`.
//!
//! Unlike a full node client, this crate does not attempt automatic retry or
//! range bisection itself — that policy lives in the indexer's scanner
//! (`RpcError::classify` gives it the structured signal it needs). This
//! client's job is strictly request/response plumbing.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::Log;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{Result, RpcError};
use crate::types::{BlockHeader, CallRequest, JsonRpcRequest, JsonRpcResponse, LogFilter};

/// A JSON-RPC client over HTTP for a single node endpoint.
#[derive(Debug)]
pub struct RpcClient {
    client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
    #[allow(dead_code)]
    config: ClientConfig,
}

impl RpcClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(rpc_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn with_config(rpc_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RpcError::Http)?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
            config,
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// `eth_blockNumber` — the current chain head.
    ///
    /// # Errors
    /// Returns an error on transport failure or an RPC-level error.
    #[instrument(skip(self))]
    pub async fn block_number(&self) -> Result<u64> {
        let id = self.next_id();
        let request = JsonRpcRequest::new("eth_blockNumber", (), id);
        let response: JsonRpcResponse<String> = self.send_request(&request).await?;
        let hex = extract(response, "eth_blockNumber")?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| RpcError::InvalidResponse(format!("bad block number {hex}: {e}")))
    }

    /// `eth_getLogs` for a single contract address and topic0, over
    /// `[from_block, to_block]` inclusive.
    ///
    /// # Errors
    /// Returns an error on transport failure or an RPC-level error. Callers
    /// implementing the adaptive scanner should inspect
    /// [`RpcError::classify`] on failure to decide whether to bisect the
    /// range and retry.
    #[instrument(skip(self))]
    pub async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        address: Address,
        topic0: B256,
    ) -> Result<Vec<Log>> {
        let id = self.next_id();
        let filter = LogFilter::new(from_block, to_block, address, topic0);
        let request = JsonRpcRequest::new("eth_getLogs", [filter], id);
        let response: JsonRpcResponse<Vec<Log>> = self.send_request(&request).await?;
        let logs = extract(response, "eth_getLogs")?;
        debug!(count = logs.len(), from_block, to_block, "fetched logs");
        Ok(logs)
    }

    /// `eth_getBlockByNumber` (without full transaction objects), returning
    /// just the number and timestamp.
    ///
    /// # Errors
    /// Returns an error on transport failure, an RPC-level error, or if the
    /// block does not exist.
    #[instrument(skip(self))]
    pub async fn get_block_by_number(&self, block_number: u64) -> Result<BlockHeader> {
        let id = self.next_id();
        let request = JsonRpcRequest::new(
            "eth_getBlockByNumber",
            (format!("0x{block_number:x}"), false),
            id,
        );
        let response: JsonRpcResponse<Option<BlockHeader>> = self.send_request(&request).await?;
        extract(response, "eth_getBlockByNumber")?
            .ok_or_else(|| RpcError::InvalidResponse(format!("block {block_number} not found")))
    }

    /// `eth_call` against the latest state — used for reading `balanceOf`,
    /// `decimals`, `symbol`, `name`, `totalSupply`.
    ///
    /// # Errors
    /// Returns an error on transport failure or an RPC-level error.
    #[instrument(skip(self, data))]
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let id = self.next_id();
        let request = JsonRpcRequest::new("eth_call", (CallRequest { to, data }, "latest"), id);
        let response: JsonRpcResponse<Bytes> = self.send_request(&request).await?;
        extract(response, "eth_call")
    }

    async fn send_request<P, R>(&self, request: &JsonRpcRequest<'_, P>) -> Result<JsonRpcResponse<R>>
    where
        P: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(request)
            .send()
            .await?;
        let body: JsonRpcResponse<R> = response.json().await?;
        Ok(body)
    }
}

fn extract<T>(response: JsonRpcResponse<T>, method: &str) -> Result<T> {
    if let Some(error) = response.error {
        return Err(error.into_error());
    }
    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing result for {method}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn block_number_parses_hex_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({"method": "eth_blockNumber"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": "0x2a"
            })))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        assert_eq!(client.block_number().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn get_logs_surfaces_rpc_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32005, "message": "limit exceeded"}
            })))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        let addr: Address = "0x1a9b54a3075119f1546c52ca0940551a6ce5d2d0"
            .parse()
            .unwrap();
        let topic = B256::repeat_byte(0x11);
        let err = client.get_logs(0, 100, addr, topic).await.unwrap_err();
        assert_eq!(err.classify(), crate::error::RpcErrorClass::RetryableRange);
    }
}
