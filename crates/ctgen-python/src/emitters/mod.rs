pub mod performance;
pub mod scaffold;

use ctgen_core::backend::{case_context, query_strings, request_headers, suite_context};
use ctgen_core::codestyle::{apply_quotes, reindent};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestCase, TestSuite};
use serde_json::{Map, Value, json};

use crate::literals;

/// Port of the pact-python mock service in consumer runs.
const MOCK_PORT: u16 = 1234;

pub const TEST_DIR: &str = "tests";

/// `tests/test_user_management_api_consumer.py` and friends.
pub fn test_path(suite: &TestSuite, kind: &str) -> String {
    format!("{TEST_DIR}/test_{}_{kind}.py", suite.file_stem())
}

pub fn suite_fields(suite: &TestSuite, config: &LanguageConfig) -> Map<String, Value> {
    let advanced = config.advanced();
    let mut ctx = suite_context(suite, config);
    ctx.insert("mock_port".into(), json!(MOCK_PORT));
    ctx.insert(
        "request_timeout_secs".into(),
        json!(literals::seconds(advanced.timeouts.request_ms)),
    );
    ctx.insert(
        "retry_backoff_secs".into(),
        json!(literals::seconds(advanced.retry.backoff_ms)),
    );
    ctx.insert(
        "pact_log_level".into(),
        json!(literals::log_level(&advanced.logging.level)),
    );
    ctx
}

pub fn case_fields(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = case_context(case, config);
    ctx.insert("query_literal".into(), json!(literals::query(&query_strings(case))));
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
    ctx
}

pub fn style(source: &str, config: &LanguageConfig) -> String {
    let out = reindent(source, &config.code_style);
    apply_quotes(&out, config.code_style.quotes, "#")
}
