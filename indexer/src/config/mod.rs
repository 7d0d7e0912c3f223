//! Configuration loading and validation for the indexer.
//!
//! Configuration is loaded from multiple sources in order of precedence:
//! 1. Environment variables (highest, `INDEXER__` prefix)
//! 2. Environment-specific file (e.g. `config/production.toml`)
//! 3. Default file (`config/default.toml`)
//! 4. Built-in defaults (lowest)
//!
//! # Example
//!
//! ```ignore
//! use erc20_holder_indexer::config::Settings;
//!
//! let settings = Settings::load("production")?;
//! println!("RPC URL: {}", settings.rpc_url);
//! ```

mod settings;

pub use settings::{Settings, ZERO_ADDRESS};
