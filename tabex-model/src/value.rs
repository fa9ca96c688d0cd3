use serde_json::{Number, Value};

/// Render a JSON value as CSV cell text.
///
/// `null` has no text (an empty cell). Strings are taken verbatim, numbers use
/// their shortest form (`100.0` becomes `100`), and nested arrays or objects
/// are written as compact JSON.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(serde_json::to_string(value).unwrap_or_default()),
    }
}

/// Shortest decimal text for a JSON number; integral floats drop the fraction.
///
/// Floats with magnitude at or above `1e21` or below `1e-6` use exponent
/// form (`1e300`, `1.5e-7`) instead of spelling out every digit.
pub fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.is_finite() && (f.abs() >= 1e21 || f.abs() < 1e-6) => format!("{f:e}"),
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
