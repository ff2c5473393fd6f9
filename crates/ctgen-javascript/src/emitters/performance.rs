use ctgen_core::TemplateEngine;
use ctgen_core::backend::{performance_context, render_suite, suite_context};
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::{TestSuite, TestType};
use serde_json::json;

use super::{case_fields, style};

pub fn performance_path(suite: &TestSuite) -> String {
    format!("tests/{}_performance.test.js", suite.file_stem())
}

/// Emit `tests/<name>_performance.test.js` with a load loop per case.
///
/// Jest takes the per-test timeout as a third argument to `it`; Mocha
/// chains `.timeout()` on the returned test.
pub fn emit_performance_tests(engine: &TemplateEngine, suite: &TestSuite, config: &LanguageConfig) -> String {
    let cases = suite
        .tests_of(TestType::Performance)
        .map(|case| {
            let mut ctx = case_fields(case, config);
            let perf = performance_context(case, config);
            let timeout = perf.get("test_timeout_ms").cloned().unwrap_or(json!(0));
            let suffix = if config.framework == "mocha" {
                format!(").timeout({timeout})")
            } else {
                format!(", {timeout})")
            };
            ctx.extend(perf);
            ctx.insert("timeout_suffix".into(), json!(suffix));
            ctx
        })
        .collect();
    let path = performance_path(suite);
    let source = render_suite(
        engine,
        &path,
        include_str!("../../templates/performance.test.js.tmpl"),
        include_str!("../../templates/performance_case.js.tmpl"),
        &suite_context(suite, config),
        cases,
    );
    style(&source, config)
}
