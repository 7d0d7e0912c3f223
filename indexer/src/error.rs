//! Layered error types for the indexer.
//!
//! - [`DomainError`] - input/business-rule violations (bad address, missing
//!   API key, …)
//! - [`InfraError`] - failures from external systems (database, RPC, HTTP)
//! - [`AppError`] - application-level errors combining the two
//! - [`ApiError`] - HTTP API errors with status codes
//!
//! # Error Philosophy
//!
//! - Domain errors are recoverable and safe to show to callers (mapped to
//!   4xx).
//! - Infrastructure errors are logged but their details are hidden from HTTP
//!   callers (mapped to 500).
//! - The `Result` type alias uses `AppError` for application code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain-level errors representing invalid input or business-rule
/// violations. Recoverable and safe to surface to callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DomainError {
    /// Address string is not a valid 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// No `last_scanned_block` in the store and no explicit start block
    /// given.
    #[error("no start block configured and the store has no prior progress")]
    MissingStartBlock,

    /// An explorer-backed operation was requested without an API key.
    #[error("explorer API key is required for this operation")]
    MissingApiKey,

    /// A numeric field (value, block, offset, …) failed to parse or was out
    /// of range.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// INFRASTRUCTURE ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Infrastructure-level errors from external systems. Logged; details are
/// hidden from HTTP callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InfraError {
    /// Event store (SQLite) error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Chain provider error (JSON-RPC).
    #[error("RPC error: {0}")]
    Rpc(#[from] evm_provider::ProviderError),

    /// Explorer HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Upstream permanently rejected the request (non-retryable RPC error,
    /// explorer 4xx other than rate-limit).
    #[error("upstream rejected request: {0}")]
    PermanentUpstream(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPLICATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Application-level errors combining domain and infrastructure errors.
/// The primary error type used throughout the indexer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure error.
    #[error(transparent)]
    Infra(#[from] InfraError),

    /// A scan or bootstrap is already running against this store.
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// Initialization error (e.g. failed to open the database file).
    #[error("initialization error: {0}")]
    Initialization(String),
}

/// Type alias for application `Result`s.
pub type Result<T> = std::result::Result<T, AppError>;

// ═══════════════════════════════════════════════════════════════════════════════
// API ERRORS (HTTP-specific)
// ═══════════════════════════════════════════════════════════════════════════════

/// API-level errors with HTTP status codes, converted to responses via
/// [`IntoResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Wrapped application error.
    #[error(transparent)]
    App(#[from] AppError),

    /// Invalid request parameters caught at the HTTP boundary.
    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::App(AppError::Domain(_)) | Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.to_string())
            }
            Self::App(AppError::ScanInProgress) => {
                (StatusCode::CONFLICT, "SCAN_IN_PROGRESS", self.to_string())
            }
            Self::App(AppError::Infra(_) | AppError::Initialization(_)) => {
                tracing::error!(error = ?self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".into(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
