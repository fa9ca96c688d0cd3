use serde_json::Value;
use tabex_model::Record;

/// Equality constraints a store may evaluate before returning records.
///
/// Only top-level string fields are supported. Callers still re-check every
/// record in memory, so a store that ignores the pre-filter stays correct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    equals: Vec<(String, String)>,
}

impl StoreFilter {
    /// The empty filter, matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an exact-match constraint on a top-level field.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }

    pub fn constraints(&self) -> &[(String, String)] {
        &self.equals
    }

    /// Evaluate the filter against a record the way the SQL pushdown does:
    /// the field must be a string equal to the expected value.
    pub fn matches(&self, record: &Record) -> bool {
        self.equals.iter().all(|(field, expected)| {
            matches!(record.get(field), Some(Value::String(actual)) if actual == expected)
        })
    }
}
