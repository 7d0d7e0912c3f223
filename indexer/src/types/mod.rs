//! Core domain value types: address canonicalization and the `Transfer`
//! event.

mod primitives;
mod transfer;

pub use primitives::{checksum, parse_address};
pub use transfer::{LogIndex, Transfer};
