//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or opened.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read or write against a reachable store failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A stored document could not be decoded or encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document was valid JSON but not an object.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] tabex_model::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}
