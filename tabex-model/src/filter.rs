use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::time::{end_of_day, parse_day, parse_instant};
use crate::RecordType;

/// Apply `parse` to an optional raw value, treating any failure as absent.
///
/// This is the single place where filter leniency lives: a malformed query
/// parameter narrows nothing instead of failing the export.
pub fn parse_optional<T>(raw: Option<&Value>, parse: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
    raw.and_then(parse)
}

/// Stock constraint for product exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StockState {
    /// No constraint.
    #[default]
    Any,
    /// Numeric stock greater than zero.
    In,
    /// Stock at or below zero; missing or non-numeric stock counts as zero.
    Out,
}

impl StockState {
    /// Parse `"in"`/`"out"`/`"any"`, booleans and their string forms.
    pub fn parse(raw: &Value) -> Option<Self> {
        match raw {
            Value::Bool(true) => Some(StockState::In),
            Value::Bool(false) => Some(StockState::Out),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "in" | "true" => Some(StockState::In),
                "out" | "false" => Some(StockState::Out),
                "any" | "all" => Some(StockState::Any),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Filter criteria for one export.
///
/// Every field is optional and parsed independently. Not every field applies
/// to every record type; fields that don't apply are ignored by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    /// Inclusive lower bound on `createdAt`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `createdAt`, already moved to 23:59:59.999 of its day.
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<String>,
    /// Lowercased free-text needle.
    pub search: Option<String>,
    pub in_stock: StockState,
}

impl ExportFilter {
    /// Build a filter from an untrusted JSON object. Anything other than an
    /// object yields the empty filter.
    pub fn from_json(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::default();
        };
        Self {
            from: parse_optional(obj.get("from"), |v| v.as_str().and_then(parse_instant)),
            to: parse_optional(obj.get("to"), |v| v.as_str().and_then(parse_day)).map(end_of_day),
            status: parse_optional(obj.get("status"), constraint),
            user_id: parse_optional(obj.get("userId"), constraint),
            role: parse_optional(obj.get("role"), constraint),
            search: parse_optional(obj.get("search"), search_needle),
            in_stock: parse_optional(obj.get("inStock"), StockState::parse).unwrap_or_default(),
        }
    }

    /// Build a filter from URL query pairs. Repeated keys keep the last value.
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let obj: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self::from_json(&Value::Object(obj))
    }

    /// Keep only the date bounds.
    pub fn date_range_only(self) -> Self {
        Self {
            from: self.from,
            to: self.to,
            ..Self::default()
        }
    }

    /// Whether any date bound is set.
    pub fn has_date_bounds(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// Exact-match constraint text. Blank values and the `All`/`all` sentinel mean
/// no constraint. Numbers are accepted in their text form.
fn constraint(raw: &Value) -> Option<String> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    match text.as_str() {
        "" | "All" | "all" => None,
        _ => Some(text),
    }
}

fn search_needle(raw: &Value) -> Option<String> {
    let needle = raw.as_str()?.trim();
    if needle.is_empty() {
        None
    } else {
        Some(needle.to_lowercase())
    }
}

/// The complete, immutable description of one export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpec {
    pub record_type: RecordType,
    pub filter: ExportFilter,
}

impl ExportSpec {
    pub fn new(record_type: RecordType, filter: ExportFilter) -> Self {
        Self { record_type, filter }
    }

    /// Parse a public type name and an optional raw filter object.
    pub fn parse(type_name: &str, filter: Option<&Value>) -> crate::Result<Self> {
        let record_type = type_name.parse()?;
        let filter = filter.map(ExportFilter::from_json).unwrap_or_default();
        Ok(Self::new(record_type, filter))
    }
}
