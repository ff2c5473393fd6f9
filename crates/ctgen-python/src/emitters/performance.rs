use ctgen_core::TemplateEngine;
use ctgen_core::backend::{performance_context, render_suite};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestSuite, TestType};
use serde_json::json;

use super::{case_fields, style, suite_fields, test_path};

pub fn performance_path(suite: &TestSuite) -> String {
    test_path(suite, "performance")
}

/// Thread-pool load loops; `pytest-timeout` marks cover each run.
pub fn emit_performance_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    let cases = suite
        .tests_of(TestType::Performance)
        .map(|case| {
            let mut ctx = case_fields(case, config);
            let perf = performance_context(case, config);
            let timeout_ms = perf
                .get("test_timeout_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or_default();
            ctx.extend(perf);
            ctx.insert("test_timeout_secs".into(), json!(timeout_ms.div_ceil(1000)));
            ctx
        })
        .collect();
    let path = performance_path(suite);
    let source = render_suite(
        engine,
        &path,
        include_str!("../../templates/test_performance.py.tmpl"),
        include_str!("../../templates/performance_case.py.tmpl"),
        &suite_fields(suite, config),
        cases,
    );
    style(&source, config)
}
