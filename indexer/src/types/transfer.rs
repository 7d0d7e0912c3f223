//! The normalized `Transfer` value object both scanners emit to the ledger.

use alloy::primitives::{Address, B256, U256};

/// A single ERC-20 `Transfer(address,address,uint256)` event, normalized
/// from either the RPC or explorer source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Sending address. The zero address marks a mint.
    pub from: Address,
    /// Receiving address. The zero address marks a burn.
    pub to: Address,
    /// Raw token amount moved, in the token's smallest unit.
    pub value: U256,
    /// Block the event was included in.
    pub block: u64,
    /// Unix timestamp (seconds) of `block`.
    pub ts: u64,
    /// Transaction hash.
    pub tx_hash: B256,
    /// Log index within the transaction.
    ///
    /// Sources that cannot recover the true log index (the explorer
    /// fallback) namespace a substitute value so it cannot collide with a
    /// real one — see [`Transfer::event_id`].
    pub log_index: LogIndex,
}

/// A transfer's log index, distinguishing a genuine per-log index from a
/// fallback derived from `transactionIndex` when a source cannot report the
/// real one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogIndex {
    /// The real `logIndex` of the emitted log.
    Real(u32),
    /// A fallback derived from the transaction index, namespaced so it
    /// cannot collide with a real `logIndex` value for the same transaction.
    TransactionIndexFallback(u64),
}

impl Transfer {
    /// Globally unique event identifier: `"{txHash}:{logIndex}"`, or
    /// `"{txHash}:ti{transactionIndex}"` for the explorer's fallback path.
    #[must_use]
    pub fn event_id(&self) -> String {
        match self.log_index {
            LogIndex::Real(idx) => format!("{:#x}:{idx}", self.tx_hash),
            LogIndex::TransactionIndexFallback(tx_idx) => {
                format!("{:#x}:ti{tx_idx}", self.tx_hash)
            }
        }
    }

    /// `true` if this transfer mints new supply (source is the zero
    /// address).
    #[must_use]
    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }

    /// `true` if this transfer burns supply (destination is the zero
    /// address).
    #[must_use]
    pub fn is_burn(&self) -> bool {
        self.to.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(log_index: LogIndex) -> Transfer {
        Transfer {
            from: Address::repeat_byte(0xaa),
            to: Address::repeat_byte(0xbb),
            value: U256::from(100u64),
            block: 10,
            ts: 1000,
            tx_hash: B256::repeat_byte(0x11),
            log_index,
        }
    }

    #[test]
    fn event_id_uses_real_log_index() {
        let t = sample(LogIndex::Real(3));
        assert!(t.event_id().ends_with(":3"));
        assert!(!t.event_id().contains("ti"));
    }

    #[test]
    fn event_id_namespaces_transaction_index_fallback() {
        let t = sample(LogIndex::TransactionIndexFallback(7));
        assert!(t.event_id().ends_with(":ti7"));
    }

    #[test]
    fn mint_and_burn_detection() {
        let mint = Transfer {
            from: Address::ZERO,
            ..sample(LogIndex::Real(0))
        };
        assert!(mint.is_mint());
        assert!(!mint.is_burn());

        let burn = Transfer {
            to: Address::ZERO,
            ..sample(LogIndex::Real(0))
        };
        assert!(burn.is_burn());
        assert!(!burn.is_mint());
    }
}
