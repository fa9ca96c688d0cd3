//! The tabex export engine.
//!
//! Turns an [`ExportSpec`](tabex_model::ExportSpec) into a CSV artifact:
//!
//! 1. [`filter::compile`] splits the filter into a store pre-filter and an
//!    in-memory predicate
//! 2. the records are read through a [`Ready`](tabex_store::Ready) store
//! 3. [`projection::shape_row`] applies the type's fixed column schema
//! 4. [`tabex_csv::encode`] writes the text
//! 5. an [`ExportSink`] stores it and hands back a URL, or the body itself
//!    when storing fails
//!
//! [`Exporter`] wires these together and also serves ad-hoc exports of
//! caller-supplied rows, which skip steps 1 to 3.

mod error;
mod exporter;
pub mod filter;
pub mod projection;
pub mod sink;

pub use error::{ExportError, ExportResult};
pub use exporter::{Exporter, RowsExport};
pub use filter::{CompiledFilter, compile};
pub use projection::{ProjectedRow, columns_for, shape_row};
pub use sink::{
    BaseUrl, CSV_CONTENT_TYPE, ExportArtifact, ExportSink, FileSink, ad_hoc_file_name,
    report_file_name, sanitize_file_name,
};
