//! Error types for steamsync

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for steamsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad or missing required settings. Fatal at startup, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request budget would be exceeded. Soft failure, the engine
    /// reschedules instead of crashing.
    #[error("{provider} request budget exceeded: {used} used + {requested} requested >= limit {limit}")]
    BudgetExceeded {
        provider: &'static str,
        used: u32,
        requested: u32,
        limit: u32,
    },

    /// A provider reports itself down or cannot be reached at the status
    /// level. Triggers a scheduled retry.
    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// HTTP request failed (network error, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse a JSON payload
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// A provider price string that does not parse after normalization
    #[error("malformed price string: {0:?}")]
    PriceParse(String),

    /// Failed to read or write a local state file
    #[error("persistence error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Spreadsheet read/write failure, possibly aggregated over several
    /// range writes
    #[error("spreadsheet error: {0}")]
    Store(String),

    /// Operator interrupt observed between phases
    #[error("cancelled by operator")]
    Cancelled,
}

/// Result alias for steamsync operations
pub type Result<T> = std::result::Result<T, SyncError>;
