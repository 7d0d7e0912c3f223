//! Error types for the JSON-RPC client.
//!
//! This module provides the error hierarchy for RPC operations:
//!
//! - [`RpcError`] - The primary error type for all client operations
//! - [`RpcErrorClass`] - Structured classification of a JSON-RPC error for the
//!   adaptive scanner, with a substring-matching fallback for providers that
//!   don't use a recognized error code.
//!
//! # Error Philosophy
//!
//! These errors are designed to be:
//! - **Actionable**: each variant tells the caller what went wrong
//! - **Classifiable**: [`RpcErrorClass::classify`] gives the scanner a structured
//!   answer to "should I retry with a smaller range?" without re-parsing messages
//!   at every call site

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using [`RpcError`].
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur when using the JSON-RPC client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcError {
    /// HTTP-level error (connection refused, TLS issue, non-2xx, etc.).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON-RPC error returned by the server.
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code (e.g. -32005 for block range too large).
        code: i64,
        /// Human-readable error message from the server.
        message: String,
        /// Optional additional data from the error response.
        data: Option<String>,
    },

    /// Response was valid JSON but had unexpected structure.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration provided to the client.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RpcError {
    /// Create an RPC error from code and message.
    #[must_use]
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Classify this error for the adaptive scanner.
    ///
    /// Returns [`RpcErrorClass::RetryableRange`] when the error looks like a
    /// provider-imposed block-range or timeout limit, [`RpcErrorClass::Other`]
    /// otherwise.
    #[must_use]
    pub fn classify(&self) -> RpcErrorClass {
        match self {
            Self::Rpc { code, message, data } => classify_rpc(*code, message, data.as_deref()),
            Self::Http(e) if e.is_timeout() => RpcErrorClass::RetryableRange,
            _ => RpcErrorClass::Other,
        }
    }
}

/// Structured classification of an RPC error, for the adaptive block-range
/// scanner (`RPC`, §4.2 of the design). Prefer the error code; fall back to
/// substring matching on the message only when the code is unrecognized —
/// providers are inconsistent about codes for range-too-large conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorClass {
    /// The provider rejected the request because the requested block range
    /// (or timeout) was too large. The caller should halve the span and
    /// retry.
    RetryableRange,
    /// Any other error. The caller should surface it.
    Other,
}

/// Known retryable JSON-RPC error codes for range/timeout limits.
///
/// `-32005` ("limit exceeded") and `-32062` (header not found / range too
/// large, seen on some Polygon RPC providers) are the two codes this indexer
/// has observed in practice; anything else falls back to substring matching.
const RETRYABLE_CODES: [i64; 2] = [-32005, -32062];

fn classify_rpc(code: i64, message: &str, data: Option<&str>) -> RpcErrorClass {
    if RETRYABLE_CODES.contains(&code) {
        return RpcErrorClass::RetryableRange;
    }

    let haystack = data.map_or_else(|| message.to_lowercase(), |d| format!("{message} {d}").to_lowercase());
    const NEEDLES: [&str; 6] = [
        "range",
        "limit",
        "timeout",
        "timed out",
        "too large",
        "too many",
    ];
    if NEEDLES.iter().any(|n| haystack.contains(n)) {
        RpcErrorClass::RetryableRange
    } else {
        RpcErrorClass::Other
    }
}

/// Raw JSON-RPC error object as returned by the server.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorDetail {
    pub fn into_error(self) -> RpcError {
        RpcError::Rpc {
            code: self.code,
            message: self.message,
            data: self.data.map(|d| d.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_retryable_codes() {
        assert_eq!(
            RpcError::rpc(-32_005, "limit exceeded").classify(),
            RpcErrorClass::RetryableRange
        );
        assert_eq!(
            RpcError::rpc(-32_062, "header not found").classify(),
            RpcErrorClass::RetryableRange
        );
    }

    #[test]
    fn classifies_by_message_substring_fallback() {
        assert_eq!(
            RpcError::rpc(-32_000, "query returned more than 10000 results, block range too large")
                .classify(),
            RpcErrorClass::RetryableRange
        );
        assert_eq!(
            RpcError::rpc(-32_000, "request timed out").classify(),
            RpcErrorClass::RetryableRange
        );
    }

    #[test]
    fn classifies_unrelated_errors_as_other() {
        assert_eq!(
            RpcError::rpc(-32_602, "invalid params").classify(),
            RpcErrorClass::Other
        );
    }
}
