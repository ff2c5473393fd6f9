use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::{Language, LanguageConfig};
use crate::error::{ConfigIssue, GenerateError};
use crate::ir::{TestCase, TestSuite};
use crate::output::{FileType, GeneratedFile, GeneratedOutput};
use crate::template::TemplateEngine;

/// Static capabilities of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendFeatures {
    pub consumer_tests: bool,
    pub provider_verification: bool,
    pub performance_tests: bool,
    pub mock_server: bool,
    pub parallel_execution: bool,
}

impl BackendFeatures {
    /// Names of the enabled features, for listings.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            (self.consumer_tests, "consumer-tests"),
            (self.provider_verification, "provider-verification"),
            (self.performance_tests, "performance-tests"),
            (self.mock_server, "mock-server"),
            (self.parallel_execution, "parallel-execution"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

/// Turns a `TestSuite` into runnable sources for one ecosystem.
pub trait LanguageGeneratorBackend: Send + Sync {
    fn language(&self) -> Language;

    fn supported_frameworks(&self) -> &'static [&'static str];

    fn supported_package_managers(&self) -> &'static [&'static str];

    fn features(&self) -> BackendFeatures;

    fn validate_config(&self, config: &LanguageConfig) -> Vec<ConfigIssue> {
        validate_common(
            self.language(),
            self.supported_frameworks(),
            self.supported_package_managers(),
            config,
        )
    }

    /// Fail with `InvalidConfiguration` when validation reports anything.
    fn check_config(&self, config: &LanguageConfig) -> Result<(), GenerateError> {
        let issues = self.validate_config(config);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(GenerateError::InvalidConfiguration(issues))
        }
    }

    fn generate_test_suite(
        &self,
        suite: &TestSuite,
        config: &LanguageConfig,
    ) -> Result<GeneratedOutput, GenerateError>;
}

/// Checks every backend shares: language match, known framework and package
/// manager, sane code style numbers.
pub fn validate_common(
    language: Language,
    frameworks: &[&str],
    package_managers: &[&str],
    config: &LanguageConfig,
) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if config.language != language {
        issues.push(ConfigIssue::new(
            "language",
            format!("backend generates {language}, config asks for {}", config.language),
            "LANGUAGE_MISMATCH",
        ));
    }
    if !frameworks.contains(&config.framework.as_str()) {
        issues.push(ConfigIssue::new(
            "framework",
            format!(
                "'{}' is not supported for {language}, expected one of: {}",
                config.framework,
                frameworks.join(", ")
            ),
            "UNSUPPORTED_FRAMEWORK",
        ));
    }
    if !package_managers.contains(&config.package_manager.as_str()) {
        issues.push(ConfigIssue::new(
            "packageManager",
            format!(
                "'{}' is not supported for {language}, expected one of: {}",
                config.package_manager,
                package_managers.join(", ")
            ),
            "UNSUPPORTED_PACKAGE_MANAGER",
        ));
    }
    if !(1..=8).contains(&config.code_style.indent_size) {
        issues.push(ConfigIssue::new(
            "codeStyle.indentSize",
            format!("{} is outside 1..=8", config.code_style.indent_size),
            "INVALID_INDENT_SIZE",
        ));
    }
    if config.code_style.max_line_length < 40 {
        issues.push(ConfigIssue::new(
            "codeStyle.maxLineLength",
            format!("{} is below the minimum of 40", config.code_style.max_line_length),
            "INVALID_LINE_LENGTH",
        ));
    }

    issues
}

/// Template fields every backend needs for one test case.
///
/// `method_name` follows `namingConvention.testMethods`; backends add their
/// own literal renderings on top.
pub fn case_context(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let headers: Vec<Value> = case
        .request
        .headers
        .iter()
        .map(|(name, value)| json!({"name": name, "value": value}))
        .collect();
    let query: Vec<Value> = case
        .request
        .query
        .iter()
        .map(|(name, value)| json!({"name": name, "value": display_scalar(value)}))
        .collect();

    let mut ctx = Map::new();
    ctx.insert("id".into(), json!(case.id));
    ctx.insert("name".into(), json!(case.name));
    ctx.insert(
        "method_name".into(),
        json!(config.naming_convention.test_methods.apply(&case.name)),
    );
    ctx.insert("description".into(), json!(case.description));
    ctx.insert("interaction".into(), json!(interaction(case)));
    ctx.insert("type".into(), json!(case.test_type.as_str()));
    ctx.insert("http_method".into(), json!(case.request.method.as_str()));
    ctx.insert("path".into(), json!(case.request.path));
    ctx.insert("status".into(), json!(case.response.status));
    ctx.insert("expects_failure".into(), json!(case.expects_failure()));
    ctx.insert("provider_state".into(), json!(case.provider_state));
    ctx.insert("headers".into(), Value::Array(headers));
    ctx.insert("query".into(), Value::Array(query));
    ctx.insert("query_string".into(), json!(case.request.query_string()));
    ctx.insert("has_body".into(), json!(case.request.body.is_some()));
    ctx.insert("has_response_body".into(), json!(case.response.body.is_some()));
    ctx.insert("given".into(), json!(case.scenario.given));
    ctx.insert("when".into(), json!(case.scenario.when));
    ctx.insert("then".into(), json!(case.scenario.then));
    ctx
}

/// Performance-plan numbers for a case, with request timeout and retry
/// settings filled from the advanced config when the plan leaves them open.
pub fn performance_context(case: &TestCase, config: &LanguageConfig) -> Map<String, Value> {
    let advanced = config.advanced();
    let mut ctx = Map::new();
    let Some(plan) = case.performance.as_ref() else {
        return ctx;
    };
    let duration_ms = plan.duration_secs * 1000;
    ctx.insert("kind".into(), json!(plan.kind.as_str()));
    ctx.insert("concurrency".into(), json!(plan.concurrency));
    ctx.insert("duration_secs".into(), json!(plan.duration_secs));
    ctx.insert("duration_ms".into(), json!(duration_ms));
    ctx.insert("payload_bytes".into(), json!(plan.payload_size.unwrap_or(0)));
    ctx.insert(
        "timeout_ms".into(),
        json!(plan.timeout_ms.unwrap_or(advanced.timeouts.request_ms)),
    );
    ctx.insert("max_retries".into(), json!(plan.max_retries.unwrap_or(0)));
    ctx.insert(
        "backoff_ms".into(),
        json!(plan.backoff_ms.unwrap_or(advanced.retry.backoff_ms)),
    );
    ctx.insert("p95_ms".into(), json!(plan.thresholds.p95_ms));
    ctx.insert(
        "max_response_time_ms".into(),
        json!(plan.thresholds.max_response_time_ms),
    );
    ctx.insert("max_error_rate".into(), json!(plan.thresholds.max_error_rate));
    ctx.insert(
        "test_timeout_ms".into(),
        json!(duration_ms + advanced.timeouts.test_ms),
    );
    ctx
}

/// Suite-wide template fields: identities, class name, URLs and the
/// advanced-config knobs every backend threads into its sources.
pub fn suite_context(suite: &TestSuite, config: &LanguageConfig) -> Map<String, Value> {
    let advanced = config.advanced();
    let stem = suite.file_stem();
    let mut ctx = Map::new();
    ctx.insert("title".into(), json!(suite.metadata.title));
    ctx.insert("version".into(), json!(suite.metadata.version));
    ctx.insert("name".into(), json!(stem));
    ctx.insert(
        "class_name".into(),
        json!(config.naming_convention.test_classes.apply(&stem)),
    );
    ctx.insert("consumer".into(), json!(suite.consumer));
    ctx.insert("provider".into(), json!(suite.provider));
    ctx.insert("provider_url".into(), json!(provider_url(suite, config)));
    ctx.insert("log_level".into(), json!(advanced.logging.level));
    ctx.insert("test_timeout_ms".into(), json!(advanced.timeouts.test_ms));
    ctx.insert("request_timeout_ms".into(), json!(advanced.timeouts.request_ms));
    ctx.insert("retry_attempts".into(), json!(advanced.retry.max_attempts));
    ctx.insert("retry_backoff_ms".into(), json!(advanced.retry.backoff_ms));
    ctx.insert("parallel".into(), json!(advanced.execution.parallel));
    ctx.insert("workers".into(), json!(advanced.execution.workers));
    ctx.insert("states".into(), json!(suite.setup.provider_states));
    ctx.insert("has_states".into(), json!(!suite.setup.provider_states.is_empty()));
    ctx
}

/// Where provider tests send requests: the configured network address, or
/// the suite's base URL when no advanced config is present.
pub fn provider_url(suite: &TestSuite, config: &LanguageConfig) -> String {
    match config.advanced_config {
        Some(ref advanced) => advanced.network.provider_url(),
        None => suite.setup.base_url.clone(),
    }
}

/// Render one case template per case, then stitch the results into the
/// suite template through `{{#each cases}}{{this.code}}{{/each}}`.
///
/// Case templates see the suite fields too; case fields win on collision.
pub fn render_suite(
    engine: &TemplateEngine,
    path: &str,
    suite_template: &str,
    case_template: &str,
    suite_ctx: &Map<String, Value>,
    cases: Vec<Map<String, Value>>,
) -> String {
    let mut rendered_cases = Vec::with_capacity(cases.len());
    for case in cases {
        let mut merged = suite_ctx.clone();
        merged.extend(case);
        let out = engine.render(case_template, &Value::Object(merged));
        log_template_warnings(path, &out.warnings);
        rendered_cases.push(json!({ "code": out.text }));
    }
    let mut ctx = suite_ctx.clone();
    ctx.insert("cases".into(), Value::Array(rendered_cases));
    let out = engine.render(suite_template, &Value::Object(ctx));
    log_template_warnings(path, &out.warnings);
    out.text
}

/// Pact interaction description; names are unique, so it leads.
fn interaction(case: &TestCase) -> String {
    if case.description.is_empty() {
        case.name.clone()
    } else {
        format!("{}: {}", case.name, case.description)
    }
}

/// Request headers as sent, with a JSON content type when a body goes out.
pub fn request_headers(case: &TestCase) -> IndexMap<String, String> {
    let mut headers = case.request.headers.clone();
    let has_content_type = headers.keys().any(|k| k.eq_ignore_ascii_case("content-type"));
    if case.request.body.is_some() && !has_content_type {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }
    headers
}

/// Query values as strings, the form every HTTP client expects.
pub fn query_strings(case: &TestCase) -> IndexMap<String, String> {
    case.request
        .query
        .iter()
        .map(|(name, value)| (name.clone(), display_scalar(value)))
        .collect()
}

/// Sorted top-level keys of an object response body.
pub fn response_keys(case: &TestCase) -> Vec<String> {
    match case.response.body {
        Some(Value::Object(ref map)) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            keys
        }
        _ => Vec::new(),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `.env.example` listing `advancedConfig.environment` plus the provider URL.
pub fn env_example_file(config: &LanguageConfig) -> GeneratedFile {
    let advanced = config.advanced();
    let mut content = String::from("# Copy to .env and adjust for your environment\n");
    content.push_str(&format!("PROVIDER_BASE_URL={}\n", advanced.network.provider_url()));
    content.push_str(&format!("PACT_LOG_LEVEL={}\n", advanced.logging.level));
    for (key, value) in &advanced.environment {
        content.push_str(&format!("{key}={value}\n"));
    }
    GeneratedFile::new(
        ".env.example",
        content,
        FileType::Setup,
        config.language,
        "Environment variables read by the contract tests",
    )
}

/// Log the warnings a template render produced for `path`.
pub fn log_template_warnings(path: &str, warnings: &[crate::template::TemplateWarning]) {
    for warning in warnings {
        log::warn!("{path}: {warning}");
    }
}
