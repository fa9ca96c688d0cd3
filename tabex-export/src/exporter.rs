use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::filter::compile;
use crate::projection::{columns_for, shape_row};
use crate::sink::{BaseUrl, ExportArtifact, ExportSink, ad_hoc_file_name, report_file_name};
use crate::{ExportError, ExportResult};
use tabex_csv::{CsvRow, encode};
use tabex_model::{ExportSpec, cell_text};
use tabex_store::{Ready, RecordStore};

/// An ad-hoc export of caller-supplied rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsExport {
    pub filename: Option<String>,
    /// Explicit header list; inferred from the first row when absent.
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Value>,
}

impl RowsExport {
    /// Read `{ filename?, headers?, rows }`. Only `rows` is validated: it must
    /// be an array. A `headers` value that isn't an array counts as absent, and
    /// `null` entries inside it become blank header names.
    pub fn from_json(body: &Value) -> ExportResult<Self> {
        let Some(rows) = body.get("rows").and_then(Value::as_array) else {
            return Err(ExportError::InvalidRows("rows must be an array".into()));
        };
        let headers = body
            .get("headers")
            .and_then(Value::as_array)
            .map(|hs| hs.iter().map(|h| cell_text(h).unwrap_or_default()).collect());
        let filename = body.get("filename").and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            filename,
            headers,
            rows: rows.clone(),
        })
    }

    /// The header list: explicit, or the first row's keys in order.
    pub fn resolved_headers(&self) -> Vec<String> {
        if let Some(headers) = &self.headers {
            return headers.clone();
        }
        self.rows
            .first()
            .and_then(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Composes store, filter, projection, encoder and sink for each export.
///
/// Holds no per-request state; one instance serves concurrent exports.
#[derive(Clone)]
pub struct Exporter {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn ExportSink>,
    clock: fn() -> i64,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Exporter {
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn ExportSink>) -> Self {
        Self {
            store,
            sink,
            clock: now_millis,
        }
    }

    /// Replace the millisecond clock used in generated file names.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Select, shape and encode the records described by `spec`.
    pub fn render(&self, spec: &ExportSpec) -> ExportResult<String> {
        let record_type = spec.record_type;
        let ready = Ready::acquire(self.store.as_ref())?;
        let compiled = compile(record_type, &spec.filter);
        let pushdown = compiled.pushdown();
        debug!(%record_type, ?compiled, "Compiled export filter");

        let candidates = ready.find_all(record_type.collection(), &pushdown)?;
        let rows: Vec<CsvRow> = candidates
            .iter()
            .filter(|record| compiled.matches(record))
            .map(|record| shape_row(record_type, record).into_cells())
            .collect();
        info!(
            %record_type,
            candidates = candidates.len(),
            rows = rows.len(),
            "Export rows selected"
        );
        Ok(encode(columns_for(record_type), &rows)?)
    }

    /// Run a typed export and persist it as `<report>-report-<millis>.csv`.
    pub fn run_export(&self, spec: &ExportSpec, base: &BaseUrl) -> ExportResult<ExportArtifact> {
        let text = self.render(spec)?;
        let file_name = report_file_name(spec.record_type, (self.clock)());
        Ok(self.persist(&file_name, &text, base))
    }

    /// Encode caller-supplied rows as-is and persist them.
    pub fn export_rows(&self, request: &RowsExport, base: &BaseUrl) -> ExportResult<ExportArtifact> {
        let headers = request.resolved_headers();
        let rows: Vec<CsvRow> = request
            .rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.as_object().and_then(|obj| obj.get(h)).and_then(cell_text))
                    .collect()
            })
            .collect();
        let text = encode(&headers, &rows)?;
        let file_name = ad_hoc_file_name(request.filename.as_deref(), (self.clock)());
        info!(columns = headers.len(), rows = rows.len(), "Ad-hoc export encoded");
        Ok(self.persist(&file_name, &text, base))
    }

    fn persist(&self, file_name: &str, text: &str, base: &BaseUrl) -> ExportArtifact {
        let artifact = self.sink.persist(file_name, text, base);
        debug!(file_name, stored = artifact.is_stored(), "Export persisted");
        artifact
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}
