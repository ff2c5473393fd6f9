pub mod performance;
pub mod scaffold;

use ctgen_core::backend::{case_context, query_strings, request_headers, suite_context};
use ctgen_core::codestyle::reindent;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestCase, TestSuite};
use serde_json::{Map, Value, json};

use crate::literals;

const CHAIN_INDENT: &str = "            ";

/// `UserManagementApi.ContractTests`, also the project directory.
pub fn project_name(suite: &TestSuite, config: &LanguageConfig) -> String {
    format!(
        "{}.ContractTests",
        config.naming_convention.test_classes.apply(&suite.file_stem())
    )
}

pub fn source_path(suite: &TestSuite, config: &LanguageConfig, suffix: &str) -> String {
    let class = config.naming_convention.test_classes.apply(&suite.file_stem());
    format!("{}/{class}{suffix}.cs", project_name(suite, config))
}

fn nunit(config: &LanguageConfig) -> bool {
    config.framework == "nunit"
}

/// `[Fact(Timeout = ..)]` or `[Test, Timeout(..)]`.
fn test_attribute(config: &LanguageConfig, timeout_ms: u64) -> String {
    if nunit(config) {
        format!("[Test, Timeout({timeout_ms})]")
    } else {
        format!("[Fact(Timeout = {timeout_ms})]")
    }
}

pub fn suite_fields(suite: &TestSuite, config: &LanguageConfig) -> Map<String, Value> {
    let advanced = config.advanced();
    let mut ctx = suite_context(suite, config);
    ctx.insert("namespace".into(), json!(project_name(suite, config)));
    ctx.insert(
        "pact_log_level".into(),
        json!(literals::pact_log_level(&advanced.logging.level)),
    );
    let (namespace, fixture, assert_true, verify) = if nunit(config) {
        ("NUnit.Framework", "[TestFixture]\n", "Assert.That(ok, Is.True, message)", "[Test]")
    } else {
        ("Xunit", "", "Assert.True(ok, message)", "[Fact]")
    };
    ctx.insert("framework_namespace".into(), json!(namespace));
    ctx.insert("fixture_attribute".into(), json!(fixture));
    ctx.insert("assert_true".into(), json!(assert_true));
    ctx.insert("verify_attribute".into(), json!(verify));
    ctx
}

pub fn case_fields(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let mut ctx = case_context(case, config);
    let headers = request_headers(case);
    let query = case.request.query_string();
    let suffix = if query.is_empty() { String::new() } else { format!("?{query}") };
    ctx.insert("query_suffix".into(), json!(suffix));
    ctx.insert(
        "query_chain".into(),
        json!(literals::chain("WithQuery", &query_strings(case), None, CHAIN_INDENT)),
    );
    let skip_request = case.request.body.is_some().then_some("content-type");
    ctx.insert(
        "header_chain".into(),
        json!(literals::chain("WithHeader", &headers, skip_request, CHAIN_INDENT)),
    );
    let skip_response = case.response.body.is_some().then_some("content-type");
    ctx.insert(
        "response_header_chain".into(),
        json!(literals::chain("WithHeader", &case.response.headers, skip_response, CHAIN_INDENT)),
    );
    ctx.insert("headers_literal".into(), json!(literals::dictionary(&headers)));
    ctx.insert("body_literal".into(), json!(literals::body(case.request.body.as_ref())));
    ctx.insert(
        "response_body_literal".into(),
        json!(literals::body(case.response.body.as_ref())),
    );
    ctx.insert(
        "test_attribute".into(),
        json!(test_attribute(config, config.advanced().timeouts.test_ms)),
    );
    ctx
}

pub fn style(source: &str, config: &LanguageConfig) -> String {
    reindent(source, &config.code_style)
}
