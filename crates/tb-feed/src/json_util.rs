//! Shared JSON parsing helpers used by the provider adapters.

/// Parse a JSON value (string or number) as `f64`.
///
/// Handles the common exchange pattern where numeric values may be encoded
/// as either JSON strings (`"30000.5"`) or native numbers (`30000.5`).
/// Malformed text and `null` yield `None`.
#[inline]
pub fn parse_str_f64(v: Option<&serde_json::Value>) -> Option<f64> {
    let v = v?;
    if let Some(s) = v.as_str() {
        fast_float2::parse(s.trim()).ok()
    } else {
        v.as_f64()
    }
}

/// Parse a named field on a JSON object as `f64` (string or number).
#[inline]
pub fn parse_f64_field(v: &serde_json::Value, key: &str) -> Option<f64> {
    parse_str_f64(v.get(key))
}

/// Rows of an ISS-style table block: `root[block]["data"]` as an array.
pub fn table_rows<'a>(root: &'a serde_json::Value, block: &str) -> Option<&'a Vec<serde_json::Value>> {
    root.get(block)?.get("data")?.as_array()
}
