use ctgen_core::TemplateEngine;
use ctgen_core::backend::{performance_context, render_suite};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestSuite, TestType};

use super::{case_fields, source_path, style, suite_fields};

pub fn performance_path(suite: &TestSuite, config: &LanguageConfig) -> String {
    source_path(suite, config, "PerformanceTest")
}

/// A thread-pool load loop per performance case.
pub fn emit_performance_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    let cases = suite
        .tests_of(TestType::Performance)
        .map(|case| {
            let mut ctx = case_fields(case, config);
            ctx.extend(performance_context(case, config));
            ctx
        })
        .collect();
    let path = performance_path(suite, config);
    let source = render_suite(
        engine,
        &path,
        include_str!("../../templates/PerformanceTest.java.tmpl"),
        include_str!("../../templates/performance_case.java.tmpl"),
        &suite_fields(suite, config),
        cases,
    );
    style(&source, config)
}
