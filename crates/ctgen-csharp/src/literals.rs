use indexmap::IndexMap;
use serde_json::Value;

/// A regular (non-verbatim) C# string literal.
pub fn string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// The body as JSON text inside a C# string, or `null`.
pub fn body(v: Option<&Value>) -> String {
    match v {
        Some(v) => string(&serde_json::to_string(v).unwrap_or_default()),
        None => "null".to_string(),
    }
}

/// A `Dictionary<string, string>` built with index initializers.
pub fn dictionary(map: &IndexMap<String, String>) -> String {
    if map.is_empty() {
        return "new Dictionary<string, string>()".to_string();
    }
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("[{}] = {}", string(k), string(v)))
        .collect();
    format!("new Dictionary<string, string> {{ {} }}", entries.join(", "))
}

/// `.Method("k", "v")` calls, one per line, skipping `skip` (case-insensitive).
pub fn chain(method: &str, map: &IndexMap<String, String>, skip: Option<&str>, indent: &str) -> String {
    map.iter()
        .filter(|(k, _)| skip.is_none_or(|s| !k.eq_ignore_ascii_case(s)))
        .map(|(k, v)| format!("\n{indent}.{method}({}, {})", string(k), string(v)))
        .collect()
}

/// PactNet's `PactLogLevel` member for a log level name.
pub fn pact_log_level(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "Trace",
        "debug" => "Debug",
        "warn" | "warning" => "Warning",
        "error" => "Error",
        _ => "Information",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_literal() {
        let mut map = IndexMap::new();
        assert_eq!(dictionary(&map), "new Dictionary<string, string>()");
        map.insert("X-Api-Key".to_string(), "k".to_string());
        assert_eq!(
            dictionary(&map),
            r#"new Dictionary<string, string> { ["X-Api-Key"] = "k" }"#
        );
    }

    #[test]
    fn test_chain_skips_content_type() {
        let mut map = IndexMap::new();
        map.insert("Content-Type".to_string(), "application/json".to_string());
        map.insert("Authorization".to_string(), "Bearer t".to_string());
        assert_eq!(
            chain("WithHeader", &map, Some("content-type"), "    "),
            "\n    .WithHeader(\"Authorization\", \"Bearer t\")"
        );
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(pact_log_level("info"), "Information");
        assert_eq!(pact_log_level("WARN"), "Warning");
    }
}
