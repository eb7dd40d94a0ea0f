//! Error types for oracle sessions

use std::time::Duration;
use thiserror::Error;

/// Result type for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Failures talking to the oracle.
///
/// Every variant is fatal for the current proof attempt. A session that
/// produced one of these is discarded, never reused.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The server could not be started or reached
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The server answered with something other than the expected reply
    #[error("oracle protocol error: {0}")]
    Protocol(String),

    /// The server returned a JSON-RPC error object
    #[error("oracle returned error {code} for {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: String,
        elapsed: Duration,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OracleError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        OracleError::Unavailable(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        OracleError::Protocol(message.into())
    }

    pub fn timeout(operation: impl Into<String>, elapsed: Duration) -> Self {
        OracleError::Timeout {
            operation: operation.into(),
            elapsed,
        }
    }

    /// Short name of the error kind, used in CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::Unavailable(_) | OracleError::Io(_) => "OracleUnavailable",
            OracleError::Protocol(_) | OracleError::Rpc { .. } | OracleError::Json(_) => {
                "OracleProtocolError"
            }
            OracleError::Timeout { .. } => "OracleTimeout",
        }
    }
}
