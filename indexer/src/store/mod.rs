//! The event store (EVS): a single SQLite file holding holder balances, a
//! dedup ledger of applied events, and scalar progress metadata.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                      SqliteStore                        │
//! │   ┌───────────┐   ┌───────────┐   ┌───────────┐        │
//! │   │  holders  │   │  events   │   │   meta    │        │
//! │   └───────────┘   └───────────┘   └───────────┘        │
//! │                         │                                │
//! │                         ▼                                │
//! │          SQLx SQLite connection pool (WAL mode)          │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use erc20_holder_indexer::store::SqliteStore;
//!
//! let store = SqliteStore::connect("state.db").await?;
//! store.run_migrations().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations are located in `migrations/` and embedded at compile time via
//! `sqlx::migrate!`.

mod sqlite;

pub use sqlite::{HolderRow, SqliteStore};
