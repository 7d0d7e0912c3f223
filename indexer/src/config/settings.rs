//! Settings struct and loading logic.
//!
//! All settings have sensible defaults and can be overridden via
//! environment variables or a configuration file.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// The zero-address sentinel (mint/burn endpoint).
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// HTTP JSON-RPC endpoint for the chain.
    pub rpc_url: String,
    /// ERC-20 contract address being indexed.
    pub token_address: String,
    /// Genesis block to start scanning from when the store has no prior
    /// progress. Required if the store is empty.
    pub start_block: Option<u64>,
    /// Maximum block span requested per `eth_getLogs` call.
    pub batch_size: u64,
    /// Number of confirmations subtracted from the chain head to compute
    /// the safe head.
    pub confirmations: u64,
    /// Chain ID (informational; used in explorer API calls).
    pub chain_id: u64,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// API key for the block-explorer bootstrap source.
    pub explorer_api_key: Option<String>,
    /// Base URL of the block-explorer REST API.
    pub explorer_base_url: String,
    /// Page size for explorer pagination (max 2000, capped by `page * offset <= 10000`).
    pub bootstrap_offset: u32,
    /// Sleep between explorer pages, in milliseconds.
    pub bootstrap_sleep_ms: u64,
    /// Timeout for outbound HTTP/RPC requests, in milliseconds.
    pub http_request_timeout_ms: u64,
    /// Address the HTTP API server binds to.
    pub bind_addr: String,
}

impl Settings {
    /// Load settings from a configuration file and environment variables.
    ///
    /// Sources, in increasing precedence:
    /// 1. Built-in defaults
    /// 2. `config/default.toml` (if present)
    /// 3. `config/{environment}.toml` (if present)
    /// 4. Environment variables with an `INDEXER__` prefix (`__` separates
    ///    nested keys, though this flat settings struct has none)
    ///
    /// # Errors
    /// Returns `ConfigError` if configuration is invalid or cannot be
    /// loaded.
    pub fn load(environment: &str) -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());

        let builder = Config::builder()
            .set_default("rpc_url", "http://localhost:8545")?
            .set_default("token_address", ZERO_ADDRESS)?
            .set_default("start_block", Option::<i64>::None)?
            .set_default("batch_size", 2000)?
            .set_default("confirmations", 20)?
            .set_default("chain_id", 137)?
            .set_default("db_path", "state.db")?
            .set_default("explorer_api_key", Option::<String>::None)?
            .set_default("explorer_base_url", "https://api.polygonscan.com")?
            .set_default("bootstrap_offset", 2000)?
            .set_default("bootstrap_sleep_ms", 250)?
            .set_default("http_request_timeout_ms", 30_000)?
            .set_default("bind_addr", "0.0.0.0:8080")?
            .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(File::with_name(&format!("{config_dir}/{environment}")).required(false))
            .add_source(
                Environment::with_prefix("INDEXER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load settings from a specific file path.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    /// Validate settings, collecting every violation rather than stopping at
    /// the first one.
    ///
    /// # Errors
    /// Returns a list of validation error messages.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rpc_url.is_empty() {
            errors.push("rpc_url cannot be empty".into());
        }
        if self.token_address.parse::<alloy::primitives::Address>().is_err() {
            errors.push(format!("token_address '{}' is not a valid address", self.token_address));
        }
        if self.batch_size == 0 {
            errors.push("batch_size must be non-zero".into());
        }
        if self.chain_id == 0 {
            errors.push("chain_id must be non-zero".into());
        }
        if self.db_path.is_empty() {
            errors.push("db_path cannot be empty".into());
        }
        if self.bootstrap_offset == 0 || self.bootstrap_offset > 2000 {
            errors.push("bootstrap_offset must be in 1..=2000".into());
        }
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("bind_addr '{}' is not a valid socket address", self.bind_addr));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn http_request_timeout(&self) -> Duration {
        Duration::from_millis(self.http_request_timeout_ms)
    }

    /// Inter-page sleep for the explorer bootstrap as a [`Duration`].
    #[must_use]
    pub const fn bootstrap_sleep(&self) -> Duration {
        Duration::from_millis(self.bootstrap_sleep_ms)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
