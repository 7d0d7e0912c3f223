//! Block-explorer-backed transfer source: paginated REST bootstrap used for
//! initial catch-up when an RPC log scan from genesis would be too slow.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{InfraError, Result};
use crate::scanners::{SourceStep, TransferSource};
use crate::types::{parse_address, LogIndex, Transfer};

/// `page * offset <= 10000` caps explorer pagination at 5 pages per window.
const MAX_PAGES_PER_WINDOW: u32 = 5;

/// Pulls token-transfer rows from a paginated block-explorer REST API,
/// shifting the query window on the highest block observed rather than
/// paginating past the provider's `page * offset <= 10000` cap.
pub struct ExplorerScanner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    token: Address,
    chain_id: u64,
    offset: u32,
    sleep: Duration,
    cur_start: u64,
    safe_head: u64,
    finished: bool,
    /// Page number (1-based) of the next fetch within the current window.
    page: u32,
    /// Highest transfer block seen so far in the current window, used to
    /// compute the next window's start block once this one closes.
    window_last_blk: Option<u64>,
}

impl ExplorerScanner {
    /// Build a scanner that will page through `[from_block, safe_head]`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        token: Address,
        chain_id: u64,
        from_block: u64,
        safe_head: u64,
        offset: u32,
        sleep: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            token,
            chain_id,
            offset,
            sleep,
            cur_start: from_block,
            safe_head,
            finished: false,
            page: 1,
            window_last_blk: None,
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}/api", self.base_url))
            .query(&[
                ("module", "account"),
                ("action", "tokentx"),
                ("contractaddress", &format!("{:#x}", self.token)),
                ("startblock", &self.cur_start.to_string()),
                ("endblock", &self.safe_head.to_string()),
                ("sort", "asc"),
                ("page", &page.to_string()),
                ("offset", &self.offset.to_string()),
                ("apikey", &self.api_key),
                ("chainid", &self.chain_id.to_string()),
            ])
            .send()
            .await
            .map_err(InfraError::Http)?;

        response.json::<Value>().await.map_err(InfraError::Http)
    }
}

#[async_trait]
impl TransferSource for ExplorerScanner {
    /// Fetches and applies exactly one page per call, so each page commits
    /// on its own rather than batching a whole window; sleeps between pages
    /// within a window, but not across a window boundary.
    async fn next_step(&mut self) -> Result<SourceStep> {
        if self.finished {
            return Ok(SourceStep::Done);
        }

        if self.cur_start > self.safe_head {
            self.finished = true;
            return Ok(SourceStep::Progress(Vec::new(), self.safe_head));
        }

        let body = self.fetch_page(self.page).await?;
        let rows = extract_rows(&body);
        let stop = is_stop_signal(&body, &rows);

        let mut accepted = Vec::new();
        if !stop {
            for row in &rows {
                if let Some(transfer) = parse_row(row, self.safe_head) {
                    self.window_last_blk =
                        Some(self.window_last_blk.map_or(transfer.block, |m| m.max(transfer.block)));
                    accepted.push(transfer);
                }
            }
        }

        let is_last_page_of_window =
            stop || rows.len() < self.offset as usize || self.page >= MAX_PAGES_PER_WINDOW;

        if is_last_page_of_window {
            let next_start = self.window_last_blk.take().map_or(self.cur_start + 1, |b| b + 1);
            debug!(
                window_start = self.cur_start,
                next_start,
                count = accepted.len(),
                "explorer window advanced"
            );
            self.cur_start = next_start;
            self.page = 1;
        } else {
            self.page += 1;
            tokio::time::sleep(self.sleep).await;
        }

        Ok(SourceStep::Partial(accepted))
    }
}

/// Determine if the source has signaled the end of a window: an explicit
/// "no more data" envelope, or an empty result set.
fn is_stop_signal(body: &Value, rows: &[Value]) -> bool {
    if rows.is_empty() {
        return true;
    }
    let status = body.get("status").and_then(Value::as_str);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if status == Some("0") {
        let lower = message.to_lowercase();
        if lower.starts_with("no") || lower.contains("window") {
            return true;
        }
    }
    false
}

/// Extract the row list from the `{status, message, result}` envelope.
/// `result` may be an array directly, or an object carrying the array
/// under one of several known keys.
fn extract_rows(body: &Value) -> Vec<Value> {
    match body.get("result") {
        Some(Value::Array(rows)) => rows.clone(),
        Some(Value::Object(obj)) => ["transactions", "events", "records"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array).cloned())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn field<'a>(row: &'a Value, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|n| row.get(*n).and_then(Value::as_str))
}

/// Tolerantly parse one explorer row into a [`Transfer`], dropping it if it
/// falls outside the safe range or is missing required fields.
fn parse_row(row: &Value, safe_head: u64) -> Option<Transfer> {
    let block: u64 = field(row, &["blockNumber", "block_number", "block_num"])?
        .parse()
        .ok()?;
    if block > safe_head {
        return None;
    }

    let mut tx_hash_str = field(row, &["hash", "tx_hash", "transactionHash"])?.to_string();
    if !tx_hash_str.starts_with("0x") {
        tx_hash_str = format!("0x{tx_hash_str}");
    }
    let tx_hash = tx_hash_str.parse().ok()?;

    let from = parse_address(field(row, &["from", "from_address"])?).ok()?;
    let to = parse_address(field(row, &["to", "to_address"])?).ok()?;

    let value = field(row, &["value", "token_value", "amount", "raw_amount"])
        .and_then(|v| U256::from_str_radix(v, 10).ok())?;

    let ts = field(row, &["timeStamp", "timestamp", "block_timestamp"])
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let log_index = match field(row, &["logIndex", "log_index", "logindex"]).and_then(|v| v.parse().ok()) {
        Some(idx) => LogIndex::Real(idx),
        None => {
            let tx_index = field(row, &["transactionIndex", "transaction_index"])
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            warn!(%tx_hash, "explorer row missing logIndex, namespacing transactionIndex fallback");
            LogIndex::TransactionIndexFallback(tx_index)
        }
    };

    Some(Transfer {
        from,
        to,
        value,
        block,
        ts,
        tx_hash,
        log_index,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_rows_handles_bare_array() {
        let body = json!({"status": "1", "message": "OK", "result": [{"a": 1}]});
        assert_eq!(extract_rows(&body).len(), 1);
    }

    #[test]
    fn extract_rows_handles_object_with_known_key() {
        let body = json!({"status": "1", "result": {"transactions": [{"a": 1}, {"a": 2}]}});
        assert_eq!(extract_rows(&body).len(), 2);
    }

    #[test]
    fn stop_signal_on_no_transactions_message() {
        let body = json!({"status": "0", "message": "No transactions found", "result": []});
        assert!(is_stop_signal(&body, &[]));
    }

    #[test]
    fn stop_signal_on_window_message() {
        let body = json!({"status": "0", "message": "result window is too large", "result": []});
        let rows = vec![json!({"a": 1})];
        assert!(is_stop_signal(&body, &rows));
    }

    #[test]
    fn parse_row_falls_back_to_transaction_index_for_log_index() {
        let row = json!({
            "blockNumber": "100",
            "hash": "aa".repeat(32),
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "500",
            "timeStamp": "1000",
            "transactionIndex": "7"
        });
        let transfer = parse_row(&row, 200).unwrap();
        assert!(matches!(transfer.log_index, LogIndex::TransactionIndexFallback(7)));
        assert!(transfer.event_id().ends_with(":ti7"));
    }

    #[test]
    fn parse_row_drops_rows_beyond_safe_head() {
        let row = json!({
            "blockNumber": "300",
            "hash": "bb".repeat(32),
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "1",
            "logIndex": "0"
        });
        assert!(parse_row(&row, 200).is_none());
    }

    #[test]
    fn parse_row_tolerates_alternate_field_names() {
        let row = json!({
            "block_number": "50",
            "tx_hash": "cc".repeat(32),
            "from_address": "0x1111111111111111111111111111111111111111",
            "to_address": "0x2222222222222222222222222222222222222222",
            "raw_amount": "42",
            "block_timestamp": "999",
            "log_index": "3"
        });
        let transfer = parse_row(&row, 200).unwrap();
        assert_eq!(transfer.value, U256::from(42u64));
        assert!(matches!(transfer.log_index, LogIndex::Real(3)));
    }
}
