//! CSV text encoding for exports.
//!
//! The output format is fixed so that downstream consumers can diff reports
//! byte for byte:
//! - a cell is quoted only when it contains `,`, `"`, `\n` or `\r`, and inner
//!   quotes are doubled
//! - a missing cell (`None`) is zero-length and unquoted
//! - the header line is always written, using the same quoting rule
//! - lines are joined with `\n`, without a trailing newline

use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

/// One output row; `None` cells are written empty.
pub type CsvRow = Vec<Option<String>>;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("csv write failed: {0}")]
    Write(#[from] csv::Error),

    #[error("csv flush failed: {0}")]
    Flush(String),

    #[error("csv output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode a single line from already-ordered cells.
pub fn encode_line<'a, I>(cells: I) -> EncodeResult<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let cells: Vec<&str> = cells.into_iter().map(Option::unwrap_or_default).collect();
    // The csv writer renders a lone empty field as `""`; here it stays blank.
    if cells.len() <= 1 && cells.iter().all(|c| c.is_empty()) {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&cells)?;
    let mut bytes = writer
        .into_inner()
        .map_err(|e| EncodeError::Flush(e.to_string()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8(bytes)?)
}

/// Encode a header line followed by `rows`.
///
/// Rows are written as given; callers are responsible for giving every row
/// one cell per header.
pub fn encode<H: AsRef<str>>(headers: &[H], rows: &[CsvRow]) -> EncodeResult<String> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(encode_line(headers.iter().map(|h| Some(h.as_ref())))?);
    for row in rows {
        lines.push(encode_line(row.iter().map(Option::as_deref))?);
    }
    Ok(lines.join("\n"))
}
