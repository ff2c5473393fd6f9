pub mod performance;
pub mod scaffold;
pub mod tests;

use ctgen_core::backend::{case_context, query_strings, request_headers, response_keys};
use ctgen_core::codestyle::{apply_quotes, apply_semicolons, reindent};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestCase;
use serde_json::{Map, Value, json};

use crate::literals;

/// Shared case fields plus the JavaScript literals the templates splice in.
pub fn case_fields(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = case_context(case, config);
    let keys = response_keys(case);
    ctx.insert("query_literal".into(), json!(literals::string_map(&query_strings(case))));
    ctx.insert("headers_literal".into(), json!(literals::string_map(&request_headers(case))));
    ctx.insert("body_literal".into(), json!(literals::body(case.request.body.as_ref())));
    ctx.insert(
        "response_headers_literal".into(),
        json!(literals::string_map(&case.response.headers)),
    );
    ctx.insert(
        "response_body_literal".into(),
        json!(literals::body(case.response.body.as_ref())),
    );
    ctx.insert("has_response_keys".into(), json!(!keys.is_empty()));
    ctx.insert("response_keys_literal".into(), json!(literals::string_list(&keys)));
    ctx
}

/// Indentation, quotes and semicolons from the configured code style.
pub fn style(source: &str, config: &LanguageConfig) -> String {
    let style = &config.code_style;
    let out = reindent(source, style);
    let out = apply_quotes(&out, style.quotes, "//");
    apply_semicolons(&out, style.semicolons)
}
