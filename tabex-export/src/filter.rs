//! Filter compilation.
//!
//! [`compile`] narrows an [`ExportFilter`] to the fields that apply to one
//! record type. The result answers two questions: which equality constraints
//! the store can evaluate itself ([`CompiledFilter::pushdown`]), and whether a
//! fetched record belongs in the export ([`CompiledFilter::matches`]).

use chrono::{DateTime, Utc};
use serde_json::Value;

use tabex_model::{ExportFilter, Record, RecordType, StockState, cell_text, parse_timestamp};
use tabex_store::StoreFilter;

/// A filter bound to one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    record_type: RecordType,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    exact: Vec<(&'static str, String)>,
    search: Option<String>,
    in_stock: StockState,
}

/// Bind `filter` to `record_type`, dropping criteria the type doesn't have.
pub fn compile(record_type: RecordType, filter: &ExportFilter) -> CompiledFilter {
    let mut exact = Vec::new();
    match record_type {
        RecordType::Booking | RecordType::Request => {
            if let Some(status) = &filter.status {
                exact.push(("status", status.clone()));
            }
            if let Some(user_id) = &filter.user_id {
                exact.push(("userId", user_id.clone()));
            }
        }
        RecordType::User => {
            if let Some(role) = &filter.role {
                exact.push(("role", role.clone()));
            }
        }
        RecordType::Product => {}
    }
    let in_stock = match record_type {
        RecordType::Product => filter.in_stock,
        _ => StockState::Any,
    };

    CompiledFilter {
        record_type,
        from: filter.from,
        to: filter.to,
        exact,
        search: filter.search.as_ref().map(|s| s.to_lowercase()),
        in_stock,
    }
}

/// JSON pointers searched by the free-text filter, per record type.
pub fn searchable_fields(record_type: RecordType) -> &'static [&'static str] {
    match record_type {
        RecordType::Product => &["/name", "/sku"],
        RecordType::User => &["/name", "/email"],
        RecordType::Booking => &["/name", "/user/name"],
        RecordType::Request => &["/type", "/user/name"],
    }
}

impl CompiledFilter {
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Equality constraints safe to evaluate inside the store.
    pub fn pushdown(&self) -> StoreFilter {
        self.exact
            .iter()
            .fold(StoreFilter::all(), |f, (field, value)| f.eq(*field, value.clone()))
    }

    /// Whether `record` belongs in the export. Pure; cheapest checks run first.
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_exact(record)
            && self.matches_stock(record)
            && self.matches_dates(record)
            && self.matches_search(record)
    }

    fn matches_exact(&self, record: &Record) -> bool {
        self.exact.iter().all(|(field, expected)| {
            matches!(record.get(field), Some(Value::String(actual)) if actual == expected)
        })
    }

    fn matches_stock(&self, record: &Record) -> bool {
        let stock = || record.get_number("/stock").unwrap_or(0.0);
        match self.in_stock {
            StockState::Any => true,
            StockState::In => stock() > 0.0,
            StockState::Out => stock() <= 0.0,
        }
    }

    fn matches_dates(&self, record: &Record) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(created) = record.get("createdAt").and_then(parse_timestamp) else {
            return false;
        };
        self.from.is_none_or(|from| created >= from) && self.to.is_none_or(|to| created <= to)
    }

    fn matches_search(&self, record: &Record) -> bool {
        let Some(needle) = &self.search else {
            return true;
        };
        searchable_fields(self.record_type).iter().any(|pointer| {
            record
                .pointer(pointer)
                .and_then(cell_text)
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str()))
        })
    }
}
