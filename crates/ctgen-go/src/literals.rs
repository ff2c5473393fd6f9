//! Go source literals for request and response data.

use indexmap::IndexMap;
use serde_json::Value;

pub fn string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Compact JSON as a raw string, falling back to an interpreted literal when
/// the JSON itself contains a backtick.
pub fn raw_json(v: &Value) -> String {
    let json = v.to_string();
    if json.contains('`') {
        string(&json)
    } else {
        format!("`{json}`")
    }
}

pub fn body(v: Option<&Value>) -> String {
    v.map_or_else(|| "nil".to_string(), |v| format!("json.RawMessage({})", raw_json(v)))
}

pub fn string_map(map: &IndexMap<String, String>) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", string(k), string(v)))
        .collect();
    format!("map[string]string{{{}}}", entries.join(", "))
}

pub fn url_values(map: &IndexMap<String, String>) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {{{}}}", string(k), string(v)))
        .collect();
    format!("url.Values{{{}}}", entries.join(", "))
}

/// `b.Header("k", exact("v"))` lines for a pact-go request or response
/// builder, one per entry, each ending in a newline.
pub fn builder_calls(method: &str, map: &IndexMap<String, String>, skip: Option<&str>, indent: &str) -> String {
    map.iter()
        .filter(|(k, _)| skip.is_none_or(|s| !k.eq_ignore_ascii_case(s)))
        .map(|(k, v)| format!("{indent}b.{method}({}, exact({}))\n", string(k), string(v)))
        .collect()
}

/// pact-go log level name.
pub fn log_level(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "TRACE",
        "debug" => "DEBUG",
        "warn" | "warning" => "WARN",
        "error" => "ERROR",
        _ => "INFO",
    }
}

/// Go test functions must continue with an upper-case letter after `Test`.
pub fn exported(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
