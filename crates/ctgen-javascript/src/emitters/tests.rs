use ctgen_core::TemplateEngine;
use ctgen_core::backend::{render_suite, suite_context};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;

use super::{case_fields, style};

/// Emit `tests/<name>_consumer.test.js`: one Pact interaction per case.
pub fn emit_consumer_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    emit(
        engine,
        suite,
        config,
        &consumer_path(suite),
        include_str!("../../templates/consumer.test.js.tmpl"),
        include_str!("../../templates/consumer_case.js.tmpl"),
    )
}

/// Emit `tests/<name>_provider.test.js`: pact verification plus a direct
/// request per case against the running provider.
pub fn emit_provider_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    emit(
        engine,
        suite,
        config,
        &provider_path(suite),
        include_str!("../../templates/provider.test.js.tmpl"),
        include_str!("../../templates/provider_case.js.tmpl"),
    )
}

pub fn consumer_path(suite: &TestSuite) -> String {
    format!("tests/{}_consumer.test.js", suite.file_stem())
}

pub fn provider_path(suite: &TestSuite) -> String {
    format!("tests/{}_provider.test.js", suite.file_stem())
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
        &suite_context(suite, config),
        cases,
    );
    style(&source, config)
}
