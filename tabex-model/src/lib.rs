//! Core data model for the tabex export engine.
//!
//! Defines the types every other tabex crate depends on:
//! - [`Record`]: one stored document (field name to JSON value)
//! - [`RecordType`]: the four exportable record kinds and their public aliases
//! - [`ExportFilter`]: leniently parsed filter criteria
//! - [`ExportSpec`]: the immutable description of one export request
//!
//! Malformed filter fields become "no constraint" through [`parse_optional`].
//! The only fallible parse is the record type itself.

mod filter;
mod record;
mod time;
mod value;

pub use filter::{ExportFilter, ExportSpec, StockState, parse_optional};
pub use record::{Record, RecordType};
pub use time::{end_of_day, parse_day, parse_instant, parse_timestamp};
pub use value::{cell_text, number_text};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building model values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("record is not a JSON object")]
    NotAnObject,
}
