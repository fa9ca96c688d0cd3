//! Export error types.

use thiserror::Error;

use tabex_csv::EncodeError;
use tabex_store::StoreError;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// The ways an export can fail.
///
/// Anything not listed here degrades instead of failing: malformed filter
/// fields are ignored and persistence failures fall back to an inline body.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested record type is not one of the exportable types.
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// The ad-hoc export body is malformed.
    #[error("{0}")]
    InvalidRows(String),

    /// The record store could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other failure while selecting or encoding records.
    #[error("{0}")]
    Internal(String),
}

impl ExportError {
    /// Whether the caller sent something invalid (as opposed to a server-side failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, ExportError::InvalidType(_) | ExportError::InvalidRows(_))
    }
}

impl From<StoreError> for ExportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => ExportError::StoreUnavailable(reason),
            other => ExportError::Internal(other.to_string()),
        }
    }
}

impl From<tabex_model::Error> for ExportError {
    fn from(err: tabex_model::Error) -> Self {
        match err {
            tabex_model::Error::UnknownRecordType(name) => ExportError::InvalidType(name),
            other => ExportError::Internal(other.to_string()),
        }
    }
}

impl From<EncodeError> for ExportError {
    fn from(err: EncodeError) -> Self {
        ExportError::Internal(err.to_string())
    }
}
