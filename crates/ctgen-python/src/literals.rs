//! Python literals for JSON values: `None`/`True`/`False` in place of
//! `null`/`true`/`false`, otherwise JSON syntax.

use indexmap::IndexMap;
use serde_json::Value;

pub fn string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "''".to_string())
}

pub fn value(v: &Value) -> String {
    match v {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", string(k), value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

pub fn body(v: Option<&Value>) -> String {
    v.map_or_else(|| "None".to_string(), value)
}

pub fn string_map(map: &IndexMap<String, String>) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", string(k), string(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Query parameters as `{name: [value]}`, or `None` when there are none.
pub fn query(map: &IndexMap<String, String>) -> String {
    if map.is_empty() {
        return "None".to_string();
    }
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: [{}]", string(k), string(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Milliseconds as a seconds literal, e.g. `5.0`.
pub fn seconds(ms: u64) -> String {
    format!("{:?}", ms as f64 / 1000.0)
}

/// Python `logging` level name for a configured level.
pub fn log_level(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" => "DEBUG",
        "warn" | "warning" => "WARNING",
        "error" => "ERROR",
        _ => "INFO",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_python_literals() {
        let v = json!({"active": true, "tags": [null, 1.5], "name": "Ann"});
        assert_eq!(value(&v), r#"{"active": True, "tags": [None, 1.5], "name": "Ann"}"#);
        assert_eq!(body(None), "None");
    }

    #[test]
    fn test_query_and_seconds() {
        let mut map = IndexMap::new();
        assert_eq!(query(&map), "None");
        map.insert("limit".to_string(), "10".to_string());
        assert_eq!(query(&map), r#"{"limit": ["10"]}"#);
        assert_eq!(seconds(5000), "5.0");
        assert_eq!(seconds(1500), "1.5");
        assert_eq!(log_level("trace"), "DEBUG");
        assert_eq!(log_level("warn"), "WARNING");
    }
}
