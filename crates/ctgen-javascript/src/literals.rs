//! JavaScript source literals for request and response data.
//!
//! JSON is valid JavaScript, so values are written compactly with
//! `serde_json`; quote style is applied afterwards by the code-style pass.

use indexmap::IndexMap;
use serde_json::Value;

pub fn value(v: &Value) -> String {
    serde_json::to_string(v).unwrap_or_default()
}

/// The body, or `undefined` when nothing is sent.
pub fn body(v: Option<&Value>) -> String {
    v.map_or_else(|| "undefined".to_string(), value)
}

pub fn string_map(map: &IndexMap<String, String>) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

pub fn string_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
