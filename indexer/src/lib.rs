//! ERC-20 holder indexer.
//!
//! Reconstructs the current set of token holders for an ERC-20 contract on
//! an EVM chain by scanning `Transfer` events from a configured genesis
//! block forward, and serves holder queries over a small HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Indexer (IDX)                          │
//! │                                                                   │
//! │   ┌───────────────┐        ┌───────────────┐                    │
//! │   │  RPC Scanner   │        │ Explorer Scan  │                    │
//! │   │ (eth_getLogs)  │        │  (REST, paged) │                    │
//! │   └───────┬────────┘        └───────┬────────┘                    │
//! │           │        Transfer         │                            │
//! │           └────────────┬────────────┘                            │
//! │                        ▼                                         │
//! │               ┌─────────────────┐                                │
//! │               │  Ledger (LDG)    │                                │
//! │               └────────┬─────────┘                                │
//! │                        ▼                                         │
//! │               ┌─────────────────┐                                │
//! │               │ Event Store (EVS)│  SQLite, WAL                   │
//! │               └─────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────┘
//!                         ▲
//!                         │
//!                  HTTP API (axum)
//! ```
//!
//! # Modules
//!
//! - [`types`] - Domain value types (addresses, `Transfer`)
//! - [`error`] - Layered error types
//! - [`config`] - Configuration loading and validation
//! - [`store`] - The event store (EVS): SQLite-backed holders/events/meta
//! - [`ledger`] - The ledger applier (LDG): idempotent balance mutation
//! - [`scanners`] - Transfer sources: RPC log scanning and explorer bootstrap
//! - [`facade`] - The indexer facade (IDX): orchestration and queries
//! - [`http`] - The HTTP API

pub mod config;
pub mod error;
pub mod facade;
pub mod http;
pub mod ledger;
pub mod scanners;
pub mod store;
pub mod types;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version string.
#[must_use]
pub const fn version() -> &'static str {
    VERSION
}
