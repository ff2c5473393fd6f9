pub mod performance;
pub mod scaffold;

use ctgen_core::backend::{case_context, request_headers, suite_context};
use ctgen_core::codestyle::reindent;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestCase, TestSuite};
use serde_json::{Map, Value, json};

use crate::literals;

/// `contracts.user_management_api`.
pub fn package_name(suite: &TestSuite) -> String {
    format!("contracts.{}", suite.file_stem())
}

/// `src/test/java/contracts/user_management_api/<Class><suffix>.java`.
pub fn source_path(suite: &TestSuite, config: &LanguageConfig, suffix: &str) -> String {
    let class = config.naming_convention.test_classes.apply(&suite.file_stem());
    format!(
        "src/test/java/{}/{class}{suffix}.java",
        package_name(suite).replace('.', "/")
    )
}

pub fn suite_fields(suite: &TestSuite, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = suite_context(suite, config);
    ctx.insert("package".into(), json!(package_name(suite)));
    ctx
}

pub fn case_fields(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = case_context(case, config);
    let query = case.request.query_string();
    let suffix = if query.is_empty() { String::new() } else { format!("?{query}") };
    ctx.insert("query_suffix".into(), json!(suffix));
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
    reindent(source, &config.code_style)
}
