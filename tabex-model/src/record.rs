use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A stored document belonging to one of the exportable record types.
///
/// Records have no shared base schema. Each type owns its own field set, and
/// some carry denormalized snapshots of other entities (bookings and requests
/// embed `user: { id, name, ... }` as it was at write time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Wraps an already-built field map.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(Error::NotAnObject),
        }
    }

    /// The underlying field map, in insertion order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Top-level field lookup.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether a top-level field is present at all (a `null` value counts as present).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Resolve a JSON pointer (e.g. `/user/name`) against the record.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        self.fields.get(head)?.pointer(tail)
    }

    /// Extract a string value using a JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(Value::as_str)
    }

    /// Extract a numeric value using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.pointer(pointer).and_then(Value::as_f64)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// The exportable record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Booking,
    Request,
    User,
    Product,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::Booking,
        RecordType::Request,
        RecordType::User,
        RecordType::Product,
    ];

    /// Name of the store collection holding records of this type.
    pub const fn collection(self) -> &'static str {
        match self {
            RecordType::Booking => "bookings",
            RecordType::Request => "requests",
            RecordType::User => "users",
            RecordType::Product => "products",
        }
    }

    /// Name used in generated report file names (`<report>-report-<millis>.csv`).
    pub const fn report_name(self) -> &'static str {
        match self {
            RecordType::Booking => "bookings",
            RecordType::Request => "requests",
            RecordType::User => "customers",
            RecordType::Product => "stock",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::Booking => "booking",
            RecordType::Request => "request",
            RecordType::User => "user",
            RecordType::Product => "product",
        };
        f.write_str(name)
    }
}

impl FromStr for RecordType {
    type Err = Error;

    /// Accepts the singular names plus the public aliases used by the HTTP
    /// surface (`customers`, `stock`, plurals). Matching is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" | "bookings" => Ok(RecordType::Booking),
            "request" | "requests" => Ok(RecordType::Request),
            "user" | "users" | "customer" | "customers" => Ok(RecordType::User),
            "product" | "products" | "stock" => Ok(RecordType::Product),
            other => Err(Error::UnknownRecordType(other.to_string())),
        }
    }
}
