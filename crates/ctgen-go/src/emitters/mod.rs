pub mod performance;
pub mod scaffold;
pub mod tests;

use ctgen_core::backend::{case_context, query_strings, request_headers, suite_context};
use ctgen_core::codestyle::reindent;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestCase, TestSuite};
use serde_json::{Map, Value, json};

use crate::literals;

const BUILDER_INDENT: &str = "            ";

/// `consumer/user_management_api_consumer_test.go` and friends; each kind
/// is its own package directory.
pub fn test_path(suite: &TestSuite, kind: &str) -> String {
    format!("{kind}/{}_{kind}_test.go", suite.file_stem())
}

pub fn suite_fields(suite: &TestSuite, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = suite_context(suite, config);
    ctx.insert(
        "pact_log_level".into(),
        json!(literals::log_level(&config.advanced().logging.level)),
    );
    ctx
}

pub fn case_fields(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = case_context(case, config);
    let method_name = ctx
        .get("method_name")
        .and_then(Value::as_str)
        .map(literals::exported)
        .unwrap_or_default();
    ctx.insert("method_name".into(), json!(method_name));

    let headers = request_headers(case);
    let query = query_strings(case);
    let mut request_builder = literals::builder_calls("Query", &query, None, BUILDER_INDENT);
    let skip_request = case.request.body.is_some().then_some("content-type");
    request_builder.push_str(&literals::builder_calls("Header", &headers, skip_request, BUILDER_INDENT));
    if let Some(body) = &case.request.body {
        request_builder.push_str(&format!("{BUILDER_INDENT}b.JSONBody({})\n", literals::body(Some(body))));
    }
    let skip_response = case.response.body.is_some().then_some("content-type");
    let mut response_builder =
        literals::builder_calls("Header", &case.response.headers, skip_response, BUILDER_INDENT);
    if let Some(body) = &case.response.body {
        response_builder.push_str(&format!("{BUILDER_INDENT}b.JSONBody({})\n", literals::body(Some(body))));
    }
    ctx.insert("request_builder".into(), json!(request_builder));
    ctx.insert("response_builder".into(), json!(response_builder));

    ctx.insert("query_literal".into(), json!(literals::url_values(&query)));
    ctx.insert("headers_literal".into(), json!(literals::string_map(&headers)));
    ctx.insert("body_literal".into(), json!(literals::body(case.request.body.as_ref())));
    ctx
}

/// gofmt indents with tabs; string quoting is fixed by the language.
pub fn style(source: &str, config: &LanguageConfig) -> String {
    reindent(source, &config.code_style)
}
