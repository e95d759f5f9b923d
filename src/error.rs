//! Resolution Error Types
//!
//! Typed failures of the outcome resolution pipeline. Every variant is
//! surfaced to the caller; nothing here is retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving a transaction outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Transport failure, timeout, non-success HTTP status or JSON-RPC error
    #[error("Network error: {0}")]
    Network(String),

    /// The node has no record of the transaction hash
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// The receipt list does not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The success value is not valid base64
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Serializable discriminant of [`ResolveError`], used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    NotFound,
    MalformedResponse,
    Encoding,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Network(_) => ErrorKind::Network,
            ResolveError::NotFound(_) => ErrorKind::NotFound,
            ResolveError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ResolveError::Encoding(_) => ErrorKind::Encoding,
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResolveError::Network(format!("request timed out: {}", e))
        } else {
            ResolveError::Network(e.to_string())
        }
    }
}
