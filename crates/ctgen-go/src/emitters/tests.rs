use ctgen_core::TemplateEngine;
use ctgen_core::backend::render_suite;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;

use super::{case_fields, style, suite_fields, test_path};

pub fn consumer_path(suite: &TestSuite) -> String {
    test_path(suite, "consumer")
}

pub fn provider_path(suite: &TestSuite) -> String {
    test_path(suite, "provider")
}

/// A fresh V3 mock provider per test; pact-go merges interactions into one file.
pub fn emit_consumer_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    emit(
        engine,
        suite,
        config,
        &consumer_path(suite),
        include_str!("../../templates/consumer_test.go.tmpl"),
        include_str!("../../templates/consumer_case.go.tmpl"),
    )
}

pub fn emit_provider_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    emit(
        engine,
        suite,
        config,
        &provider_path(suite),
        include_str!("../../templates/provider_test.go.tmpl"),
        include_str!("../../templates/provider_case.go.tmpl"),
    )
}

fn emit(
    engine: &TemplateEngine,
    suite: &TestSuite,
    config: &LanguageConfig,
    path: &str,
    suite_template: &str,
    case_template: &str,
) -> String {
    let cases = suite.contract_tests().map(|c| case_fields(c, config)).collect();
    let source = render_suite(
        engine,
        path,
        suite_template,
        case_template,
        &suite_fields(suite, config),
        cases,
    );
    style(&source, config)
}
