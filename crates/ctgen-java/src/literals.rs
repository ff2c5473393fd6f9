use indexmap::IndexMap;
use serde_json::Value;

/// A Java string literal. JSON string escapes are a subset of Java's.
pub fn string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// The body as a JSON document inside a Java string, or `null`.
pub fn body(v: Option<&Value>) -> String {
    match v {
        Some(v) => string(&serde_json::to_string(v).unwrap_or_default()),
        None => "null".to_string(),
    }
}

/// `Map.of()` or `Map.ofEntries(Map.entry(..), ..)`; `Map.of` stops at ten pairs.
pub fn string_map(map: &IndexMap<String, String>) -> String {
    if map.is_empty() {
        return "Map.of()".to_string();
    }
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("Map.entry({}, {})", string(k), string(v)))
        .collect();
    format!("Map.ofEntries({})", entries.join(", "))
}
