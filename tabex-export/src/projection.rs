//! Per-type column schemas.
//!
//! Column names and order are part of the export format and must not change.

use serde_json::Value;

use tabex_csv::CsvRow;
use tabex_model::{Record, RecordType, cell_text};

/// What a numeric column shows when its field is missing from the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Absent {
    /// Empty cell: the value was never set.
    Blank,
    /// `0`: a missing count is a zero count.
    Zero,
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Text,
    /// `null` renders as `0`; a missing field follows [`Absent`].
    Number(Absent),
}

#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    pointer: &'static str,
    source: Source,
}

impl Column {
    const fn text(name: &'static str, pointer: &'static str) -> Self {
        Self { name, pointer, source: Source::Text }
    }

    const fn number(name: &'static str, pointer: &'static str, absent: Absent) -> Self {
        Self { name, pointer, source: Source::Number(absent) }
    }

    fn render(&self, record: &Record) -> Option<String> {
        let value = record.pointer(self.pointer);
        match (self.source, value) {
            (Source::Text, value) => value.and_then(cell_text),
            (Source::Number(Absent::Blank), None) => None,
            (Source::Number(Absent::Zero), None) | (Source::Number(_), Some(Value::Null)) => {
                Some("0".to_string())
            }
            (Source::Number(_), Some(value)) => cell_text(value),
        }
    }
}

const BOOKING: [Column; 7] = [
    Column::text("id", "/id"),
    Column::text("name", "/name"),
    Column::number("capacityKW", "/capacityKW", Absent::Blank),
    Column::text("status", "/status"),
    Column::text("userId", "/userId"),
    Column::text("userName", "/user/name"),
    Column::text("createdAt", "/createdAt"),
];

const REQUEST: [Column; 6] = [
    Column::text("id", "/id"),
    Column::text("type", "/type"),
    Column::text("status", "/status"),
    Column::text("userId", "/userId"),
    Column::text("userName", "/user/name"),
    Column::text("createdAt", "/createdAt"),
];

const USER: [Column; 6] = [
    Column::text("id", "/id"),
    Column::text("name", "/name"),
    Column::text("email", "/email"),
    Column::text("phone", "/phone"),
    Column::text("role", "/role"),
    Column::text("createdAt", "/createdAt"),
];

const PRODUCT: [Column; 6] = [
    Column::text("id", "/id"),
    Column::text("name", "/name"),
    Column::text("sku", "/sku"),
    Column::number("stock", "/stock", Absent::Zero),
    Column::number("price", "/price", Absent::Blank),
    Column::text("createdAt", "/createdAt"),
];

const BOOKING_NAMES: [&str; 7] = names(&BOOKING);
const REQUEST_NAMES: [&str; 6] = names(&REQUEST);
const USER_NAMES: [&str; 6] = names(&USER);
const PRODUCT_NAMES: [&str; 6] = names(&PRODUCT);

const fn names<const N: usize>(columns: &[Column; N]) -> [&'static str; N] {
    let mut out = [""; N];
    let mut i = 0;
    while i < N {
        out[i] = columns[i].name;
        i += 1;
    }
    out
}

fn schema(record_type: RecordType) -> &'static [Column] {
    match record_type {
        RecordType::Booking => &BOOKING,
        RecordType::Request => &REQUEST,
        RecordType::User => &USER,
        RecordType::Product => &PRODUCT,
    }
}

/// Ordered column names for `record_type`; also the CSV header.
pub fn columns_for(record_type: RecordType) -> &'static [&'static str] {
    match record_type {
        RecordType::Booking => &BOOKING_NAMES,
        RecordType::Request => &REQUEST_NAMES,
        RecordType::User => &USER_NAMES,
        RecordType::Product => &PRODUCT_NAMES,
    }
}

/// One record shaped to its type's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    record_type: RecordType,
    cells: CsvRow,
}

impl ProjectedRow {
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn columns(&self) -> &'static [&'static str] {
        columns_for(self.record_type)
    }

    /// Cell text for `column`; `None` for empty cells and unknown columns.
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.columns().iter().position(|c| *c == column)?;
        self.cells.get(idx).and_then(Option::as_deref)
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    pub fn into_cells(self) -> CsvRow {
        self.cells
    }
}

/// Shape `record` into the column schema of `record_type`.
///
/// `userName` is read from the record's embedded `user` snapshot.
pub fn shape_row(record_type: RecordType, record: &Record) -> ProjectedRow {
    ProjectedRow {
        record_type,
        cells: schema(record_type).iter().map(|c| c.render(record)).collect(),
    }
}
