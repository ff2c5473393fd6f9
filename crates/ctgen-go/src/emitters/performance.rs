use ctgen_core::TemplateEngine;
use ctgen_core::backend::{performance_context, render_suite};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestSuite, TestType};

use super::{case_fields, style, suite_fields, test_path};

pub fn performance_path(suite: &TestSuite) -> String {
    test_path(suite, "performance")
}

/// Goroutine load loops bounded by a context deadline per case.
pub fn emit_performance_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    let cases = suite
        .tests_of(TestType::Performance)
        .map(|case| {
            let mut ctx = case_fields(case, config);
            ctx.extend(performance_context(case, config));
            ctx
        })
        .collect();
    let path = performance_path(suite);
    let source = render_suite(
        engine,
        &path,
        include_str!("../../templates/performance_test.go.tmpl"),
        include_str!("../../templates/performance_case.go.tmpl"),
        &suite_fields(suite, config),
        cases,
    );
    style(&source, config)
}
