//! Error types for EVM provider operations.
//!
//! This module provides a chain-agnostic error hierarchy for read-only
//! provider operations:
//!
//! - [`ProviderError`] - The primary error type for all provider operations
//!
//! # Error Philosophy
//!
//! These errors are designed to be:
//! - **Actionable**: each variant tells you what went wrong
//! - **Convertible**: easy to convert from the underlying `chain-rpc` errors
//! - **Chain-agnostic**: same error types regardless of the underlying chain

use thiserror::Error;

/// Result type alias using [`ProviderError`].
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur when using an EVM chain provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Failed to establish connection to the RPC endpoint, or the request
    /// timed out in transit.
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON-RPC error returned by the server.
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Human-readable error message from the server.
        message: String,
    },

    /// The requested operation is not supported by this provider.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Failed to encode or decode contract call data.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Response was valid but had unexpected structure.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration provided to the provider.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic provider error wrapping underlying implementation errors.
    #[error("provider error: {0}")]
    Other(String),
}

/// Known retryable JSON-RPC error codes for range/timeout limits, mirroring
/// `chain_rpc::RpcErrorClass`.
const RETRYABLE_CODES: [i64; 2] = [-32_005, -32_062];

/// Message substrings indicating a provider-imposed range/timeout limit,
/// used as a fallback when the error code is unrecognized.
const RETRYABLE_NEEDLES: [&str; 6] = ["range", "limit", "timeout", "timed out", "too large", "too many"];

impl ProviderError {
    /// Create an RPC error from code and message.
    #[must_use]
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create an unsupported operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported(operation.into())
    }

    /// `true` if this error looks like a provider-imposed block-range or
    /// timeout limit that an adaptive scanner should retry with a smaller
    /// span, rather than a permanent rejection.
    ///
    /// Mirrors `chain_rpc::RpcErrorClass::classify`: prefer the error code,
    /// falling back to substring matching on the message when the code is
    /// unrecognized (providers are inconsistent about codes for
    /// range-too-large conditions). This is the single source of truth for
    /// that classification; callers should use this rather than re-deriving
    /// their own code/substring lists.
    #[must_use]
    pub fn is_retryable_range(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Rpc { code, message } => {
                RETRYABLE_CODES.contains(code) || {
                    let haystack = message.to_lowercase();
                    RETRYABLE_NEEDLES.iter().any(|n| haystack.contains(n))
                }
            }
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSIONS FROM chain-rpc ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

impl From<chain_rpc::RpcError> for ProviderError {
    fn from(err: chain_rpc::RpcError) -> Self {
        match err {
            chain_rpc::RpcError::Http(e) => Self::Connection(e.to_string()),
            chain_rpc::RpcError::Rpc { code, message, .. } => Self::Rpc { code, message },
            chain_rpc::RpcError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            chain_rpc::RpcError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_retryable_range_matches_known_codes() {
        let rpc_limit = ProviderError::rpc(-32_005, "rate limited");
        assert!(rpc_limit.is_retryable_range());

        let rpc_range = ProviderError::rpc(-32_062, "query returned more than 10000 results");
        assert!(rpc_range.is_retryable_range());
    }

    #[test]
    fn is_retryable_range_falls_back_to_message_substrings() {
        let unrecognized_code = ProviderError::rpc(-32_099, "block range too large, max is 2000");
        assert!(unrecognized_code.is_retryable_range());
    }

    #[test]
    fn is_retryable_range_rejects_unrelated_errors() {
        let invalid_params = ProviderError::rpc(-32_602, "invalid params");
        assert!(!invalid_params.is_retryable_range());

        let unsupported = ProviderError::unsupported("cursor pagination");
        assert!(!unsupported.is_retryable_range());
    }

    #[test]
    fn connection_errors_are_always_retryable() {
        let connection = ProviderError::Connection("connection refused".into());
        assert!(connection.is_retryable_range());
    }

    #[test]
    fn converts_rpc_error_variants() {
        let err: ProviderError = chain_rpc::RpcError::rpc(-32_005, "limit exceeded").into();
        assert!(matches!(err, ProviderError::Rpc { code: -32_005, .. }));
    }
}
