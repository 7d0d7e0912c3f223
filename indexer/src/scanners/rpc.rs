//! RPC-backed transfer source: adaptive-window log scanning via
//! `eth_getLogs`.

use std::collections::HashMap;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use evm_provider::{ChainProvider, LogFilter, ProviderError};
use tracing::{debug, warn};

use crate::error::{InfraError, Result};
use crate::scanners::{SourceStep, TransferSource};
use crate::types::{LogIndex, Transfer};

const BISECTION_BACKOFF: Duration = Duration::from_millis(100);

/// `keccak256("Transfer(address,address,uint256)")`.
#[must_use]
pub fn transfer_topic0() -> B256 {
    alloy::primitives::keccak256(b"Transfer(address,address,uint256)")
}

/// Scans `[cur, safe_head]` in adaptive windows, halving the span on
/// retryable provider errors.
pub struct RpcScanner<'p, P: ChainProvider> {
    provider: &'p P,
    token: Address,
    topic0: B256,
    cur: u64,
    safe_head: u64,
    batch_size: u64,
    ts_cache: HashMap<u64, u64>,
}

impl<'p, P: ChainProvider> RpcScanner<'p, P> {
    /// Build a scanner covering `[cur, safe_head]` in windows of at most
    /// `batch_size` blocks.
    #[must_use]
    pub fn new(provider: &'p P, token: Address, cur: u64, safe_head: u64, batch_size: u64) -> Self {
        Self {
            provider,
            token,
            topic0: transfer_topic0(),
            cur,
            safe_head,
            batch_size,
            ts_cache: HashMap::new(),
        }
    }

    async fn block_timestamp(&mut self, block: u64) -> Result<u64> {
        if let Some(ts) = self.ts_cache.get(&block) {
            return Ok(*ts);
        }
        let ts = self
            .provider
            .block_timestamp(block)
            .await
            .map_err(InfraError::Rpc)?;
        self.ts_cache.insert(block, ts);
        Ok(ts)
    }

    async fn decode(&mut self, log: alloy::rpc::types::Log) -> Result<Transfer> {
        let topics = log.inner.data.topics();
        if topics.len() < 3 {
            return Err(InfraError::PermanentUpstream(
                "Transfer log missing indexed topics".into(),
            )
            .into());
        }
        let from = Address::from_word(topics[1]);
        let to = Address::from_word(topics[2]);
        let value = U256::from_be_slice(log.inner.data.data.as_ref());

        let block = log.block_number.ok_or_else(|| {
            InfraError::PermanentUpstream("Transfer log missing blockNumber".into())
        })?;
        let tx_hash = log.transaction_hash.ok_or_else(|| {
            InfraError::PermanentUpstream("Transfer log missing transactionHash".into())
        })?;
        let log_index = log.log_index.ok_or_else(|| {
            InfraError::PermanentUpstream("Transfer log missing logIndex".into())
        })?;

        let ts = self.block_timestamp(block).await?;

        Ok(Transfer {
            from,
            to,
            value,
            block,
            ts,
            tx_hash,
            log_index: LogIndex::Real(u32::try_from(log_index).unwrap_or(u32::MAX)),
        })
    }
}

#[async_trait]
impl<'p, P: ChainProvider> TransferSource for RpcScanner<'p, P> {
    async fn next_step(&mut self) -> Result<SourceStep> {
        if self.cur > self.safe_head {
            return Ok(SourceStep::Done);
        }

        let mut span = self.batch_size.min(self.safe_head - self.cur + 1);

        loop {
            let filter = LogFilter::new(self.cur, self.cur + span - 1, self.token, self.topic0);
            match self.provider.get_logs(&filter).await {
                Ok(page) => {
                    let mut transfers = Vec::with_capacity(page.logs.len());
                    for log in page.logs {
                        transfers.push(self.decode(log).await?);
                    }
                    let new_last = self.cur + span - 1;
                    debug!(from = self.cur, to = new_last, count = transfers.len(), "scanned window");
                    self.cur = new_last + 1;
                    return Ok(SourceStep::Progress(transfers, new_last));
                }
                Err(e) if e.is_retryable_range() && span > 1 => {
                    span = (span / 2).max(1);
                    warn!(new_span = span, "halving scan window after retryable provider error");
                    tokio::time::sleep(BISECTION_BACKOFF).await;
                }
                Err(e) => return Err(InfraError::Rpc(e).into()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;
    use async_trait::async_trait;
    use evm_provider::{LogsPage, Result as ProviderResult};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Rejects any request whose span exceeds `max_span` with a retryable
    /// RPC error, mirroring the S5 scenario.
    struct CappedSpanProvider {
        max_span: u64,
        max_span_requested: AtomicU64,
        requests: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl ChainProvider for CappedSpanProvider {
        fn chain_id(&self) -> u64 {
            137
        }

        async fn block_number(&self) -> ProviderResult<u64> {
            Ok(10_000)
        }

        async fn get_logs(&self, filter: &LogFilter) -> ProviderResult<LogsPage> {
            let span = filter.span();
            self.requests.lock().unwrap().push(span);
            self.max_span_requested
                .fetch_max(span, Ordering::SeqCst);
            if span > self.max_span {
                return Err(ProviderError::rpc(-32_005, "block range too large"));
            }
            Ok(LogsPage { logs: vec![], complete: true })
        }

        async fn block_timestamp(&self, _block_number: u64) -> ProviderResult<u64> {
            Ok(1_700_000_000)
        }

        async fn call(&self, _to: Address, _data: Bytes) -> ProviderResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    #[tokio::test]
    async fn s5_adaptive_span_never_exceeds_provider_cap() {
        let provider = CappedSpanProvider {
            max_span: 50,
            max_span_requested: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        };
        let mut scanner = RpcScanner::new(
            &provider,
            Address::repeat_byte(0x11),
            1,
            2000,
            2000,
        );

        loop {
            match scanner.next_step().await.unwrap() {
                SourceStep::Done => break,
                SourceStep::Progress(..) | SourceStep::Partial(_) => {}
            }
        }

        let requests = provider.requests.lock().unwrap();
        assert!(requests.iter().all(|&span| span <= 50));
        assert!(requests.iter().any(|&span| span == 2000));
    }

    #[tokio::test]
    async fn done_when_cur_exceeds_safe_head() {
        let provider = CappedSpanProvider {
            max_span: 2000,
            max_span_requested: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        };
        let mut scanner = RpcScanner::new(&provider, Address::ZERO, 101, 100, 2000);
        assert!(matches!(scanner.next_step().await.unwrap(), SourceStep::Done));
    }
}
