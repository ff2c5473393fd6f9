use ctgen_core::TemplateEngine;
use ctgen_core::backend::{performance_context, render_suite};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestSuite, TestType};
use serde_json::json;

use super::{case_fields, source_path, style, suite_fields, test_attribute};

pub fn performance_path(suite: &TestSuite, config: &LanguageConfig) -> String {
    source_path(suite, config, "PerformanceTests")
}

/// A task-based load loop per performance case; the test timeout covers the
/// whole run duration.
pub fn emit_performance_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    let cases = suite
        .tests_of(TestType::Performance)
        .map(|case| {
            let mut ctx = case_fields(case, config);
            let perf = performance_context(case, config);
            let timeout = perf
                .get("test_timeout_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or_default();
            ctx.extend(perf);
            ctx.insert("test_attribute".into(), json!(test_attribute(config, timeout)));
            ctx
        })
        .collect();
    let path = performance_path(suite, config);
    let source = render_suite(
        engine,
        &path,
        include_str!("../../templates/PerformanceTests.cs.tmpl"),
        include_str!("../../templates/performance_case.cs.tmpl"),
        &suite_fields(suite, config),
        cases,
    );
    style(&source, config)
}
