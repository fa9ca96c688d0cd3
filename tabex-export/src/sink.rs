//! Export persistence.
//!
//! A sink never fails an export. If the text can't be stored it comes back
//! inline and the failure is only logged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use tabex_model::RecordType;

/// Content type of inline artifacts.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// URL path prefix under which stored reports are served.
pub const DEFAULT_FILES_PREFIX: &str = "/files";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name pattern"));

/// The result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArtifact {
    /// The CSV was stored and can be fetched from `url`.
    Stored { file_name: String, url: String },
    /// Storing failed; the CSV is returned directly.
    Inline { body: String, content_type: &'static str },
}

impl ExportArtifact {
    pub fn inline(body: impl Into<String>) -> Self {
        ExportArtifact::Inline {
            body: body.into(),
            content_type: CSV_CONTENT_TYPE,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, ExportArtifact::Stored { .. })
    }
}

/// Scheme and host that retrieval URLs are built on, e.g. `https://reports.example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new(scheme: &str, host: &str) -> Self {
        Self(format!("{scheme}://{host}"))
    }

    /// Use a full origin as-is; trailing slashes are dropped.
    pub fn from_origin(origin: &str) -> Self {
        Self(origin.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append an absolute path.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

/// Destination for encoded exports.
pub trait ExportSink: Send + Sync {
    /// Store `text` as `file_name`. Infallible: falls back to
    /// [`ExportArtifact::Inline`] when storing fails.
    fn persist(&self, file_name: &str, text: &str, base: &BaseUrl) -> ExportArtifact;
}

/// Writes reports into a directory that a static file server exposes.
///
/// Files are written to a hidden temporary name in the same directory and
/// renamed into place, so a concurrent reader sees either nothing or the
/// complete file. Same-name writes are last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_FILES_PREFIX.to_string(),
        }
    }

    /// Serve stored files under `prefix` instead of `/files`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = format!("/{}", prefix.trim_matches('/'));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn write(&self, file_name: &str, text: &str) -> io::Result<PathBuf> {
        if file_name.is_empty() || file_name != sanitize_file_name(file_name) || is_dots(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing unsafe file name {file_name:?}"),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);
        let tmp = self.dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, text)?;
        if let Err(err) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(target)
    }
}

impl ExportSink for FileSink {
    fn persist(&self, file_name: &str, text: &str, base: &BaseUrl) -> ExportArtifact {
        match self.write(file_name, text) {
            Ok(path) => {
                info!(path = %path.display(), bytes = text.len(), "Report written");
                ExportArtifact::Stored {
                    file_name: file_name.to_string(),
                    url: base.join(&format!("{}/{file_name}", self.prefix)),
                }
            }
            Err(err) => {
                warn!(
                    dir = %self.dir.display(),
                    file_name,
                    error = %err,
                    "Failed writing report file, returning CSV inline"
                );
                ExportArtifact::inline(text)
            }
        }
    }
}

/// `<report>-report-<millis>.csv`, e.g. `stock-report-1704844800000.csv`.
pub fn report_file_name(record_type: RecordType, millis: i64) -> String {
    format!("{}-report-{millis}.csv", record_type.report_name())
}

/// Strip every character outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(raw, "").into_owned()
}

/// File name for an ad-hoc export: the sanitized caller name, or
/// `export-<millis>.csv` when nothing usable is left.
pub fn ad_hoc_file_name(raw: Option<&str>, millis: i64) -> String {
    raw.map(sanitize_file_name)
        .filter(|name| !name.is_empty() && !is_dots(name))
        .unwrap_or_else(|| format!("export-{millis}.csv"))
}

fn is_dots(name: &str) -> bool {
    name.chars().all(|c| c == '.')
}
