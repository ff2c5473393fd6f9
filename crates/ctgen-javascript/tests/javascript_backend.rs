use std::fs;
use std::process::Command;

use ctgen_core::config::{AdvancedConfig, Language, LanguageConfig, QuoteStyle};
use ctgen_core::generator::{GenerationOptions, TestGenerator};
use ctgen_core::ir::TestSuite;
use ctgen_core::{GenerateError, LanguageGeneratorBackend, parse};
use ctgen_javascript::JavascriptGenerator;

const USERS: &str = include_str!("../../ctgen-core/tests/fixtures/users.yaml");

fn suite(provider_mode: bool) -> TestSuite {
    let spec = parse::from_yaml(USERS).unwrap();
    TestGenerator::new(GenerationOptions {
        seed: Some(42),
        provider_mode,
        ..GenerationOptions::default()
    })
    .generate(&spec)
    .unwrap()
}

fn config() -> LanguageConfig {
    LanguageConfig::for_language(Language::Javascript)
}

#[test]
fn consumer_suite_layout() {
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config())
        .unwrap();
    let paths: Vec<&str> = out.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "tests/user_management_api_consumer.test.js",
            "tests/user_management_api_performance.test.js",
            "package.json",
            "jest.config.js",
            ".env.example",
        ]
    );
    assert_eq!(out.configuration.mode, "consumer");
    assert_eq!(out.configuration.test_command, "npm test");
    assert_eq!(out.project_structure.package_file, "package.json");
}

#[test]
fn consumer_source_has_interactions() {
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config())
        .unwrap();
    let src = &out.file("tests/user_management_api_consumer.test.js").unwrap().content;
    assert!(src.contains("const { PactV3 } = require('@pact-foundation/pact');"));
    assert!(src.contains("consumer: 'user-management-api-consumer',"));
    assert!(src.contains("\n  it('postUsersSuccess', async () => {"));
    assert!(src.contains("status: 201,"));
    assert!(src.contains("'Authorization':'Bearer valid-test-token'"));
    assert!(src.contains(".given('user with id 999999999 does not exist')"));
    assert!(!src.contains("{{"));
    assert!(!src.contains("PerformanceLoad"));
}

#[test]
fn package_json_lists_dev_dependencies() {
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config())
        .unwrap();
    let pkg: serde_json::Value =
        serde_json::from_str(&out.file("package.json").unwrap().content).unwrap();
    for dep in out.dependencies.iter().filter(|d| d.is_dev()) {
        assert_eq!(pkg["devDependencies"][&dep.name], dep.version.as_str());
    }
    assert_eq!(pkg["scripts"]["test"], "jest");
    assert_eq!(
        pkg["scripts"]["test:performance"],
        "jest tests/user_management_api_performance.test.js"
    );
}

#[test]
fn code_style_is_applied() {
    let mut config = config();
    config.code_style.quotes = QuoteStyle::Double;
    config.code_style.semicolons = false;
    config.code_style.indent_size = 4;
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config)
        .unwrap();
    let src = &out.file("tests/user_management_api_consumer.test.js").unwrap().content;
    assert!(src.contains("const assert = require(\"assert\")\n"));
    assert!(src.contains("\n    it(\"getUsersSuccess\", async () => {"));
}

#[test]
fn provider_mode_verifies_against_configured_url() {
    let mut config = config();
    let mut advanced = AdvancedConfig::default();
    advanced.network.base_url = "http://api.internal".to_string();
    advanced.network.port = 9090;
    advanced.retry.max_attempts = 5;
    advanced.environment.insert("API_TOKEN".to_string(), "changeme".to_string());
    config.advanced_config = Some(advanced);
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(true), &config)
        .unwrap();
    assert!(out.file("tests/user_management_api_consumer.test.js").is_none());
    let src = &out.file("tests/user_management_api_provider.test.js").unwrap().content;
    assert!(src.contains("process.env.PROVIDER_BASE_URL || 'http://api.internal:9090'"));
    assert!(src.contains("const MAX_ATTEMPTS = 5;"));
    assert!(src.contains("'the client has exceeded its rate limit': async () => {},"));
    assert!(src.contains("new Verifier({"));
    assert_eq!(out.configuration.mode, "provider");
    assert_eq!(out.configuration.environment["API_TOKEN"], "changeme");
    assert!(out.file(".env.example").unwrap().content.contains("API_TOKEN=changeme"));
}

#[test]
fn performance_cases_use_jest_timeouts() {
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config())
        .unwrap();
    let src = &out.file("tests/user_management_api_performance.test.js").unwrap().content;
    assert!(src.contains("it('getUsersPerformanceStress', async () => {"));
    assert!(src.contains("concurrency: 100,"));
    assert!(src.contains("}, 150000);"));
    assert!(src.contains("payloadBytes: 1048576,"));
}

#[test]
fn mocha_chains_timeouts() {
    let mut config = config();
    config.framework = "mocha".to_string();
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config)
        .unwrap();
    let src = &out.file("tests/user_management_api_performance.test.js").unwrap().content;
    assert!(src.contains("}).timeout(150000);"));
    assert!(out.file(".mocharc.json").is_some());
}

#[test]
fn unsupported_framework_is_rejected_before_output() {
    let mut config = config();
    config.framework = "vitest".to_string();
    let err = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config)
        .unwrap_err();
    match err {
        GenerateError::InvalidConfiguration(issues) => {
            assert_eq!(issues[0].code, "UNSUPPORTED_FRAMEWORK");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
#[ignore] // Requires Node.js installed
fn generated_javascript_parses() {
    let out = JavascriptGenerator::new()
        .generate_test_suite(&suite(false), &config())
        .unwrap();
    let tmp = tempfile::tempdir().unwrap();
    for file in out.files.iter().filter(|f| f.path.ends_with(".js")) {
        let path = tmp.path().join(file.path.replace('/', "_"));
        fs::write(&path, &file.content).unwrap();
        let output = Command::new("node")
            .arg("--check")
            .arg(&path)
            .output()
            .expect("failed to run node");
        assert!(
            output.status.success(),
            "{} does not parse:\n{}",
            file.path,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

const NOTES: &str = r#"
openapi: 3.0.3
info: {title: Orders API, version: '1.0.0'}
paths:
  /authors/{slug}/notes:
    post:
      parameters:
        - {name: slug, in: path, required: true, schema: {type: string, enum: ["o'neil"]}}
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                text: {type: string, example: "Hi {{title}} and {{provider}}"}
      responses:
        '201': {description: created}
"#;

fn notes_source() -> String {
    let spec = parse::from_yaml(NOTES).unwrap();
    let suite = TestGenerator::new(GenerationOptions {
        seed: Some(7),
        categories: vec![ctgen_core::TestType::Success],
        ..GenerationOptions::default()
    })
    .generate(&spec)
    .unwrap();
    let out = JavascriptGenerator::new().generate_test_suite(&suite, &config()).unwrap();
    out.files
        .iter()
        .find(|f| f.path.ends_with("_consumer.test.js"))
        .unwrap()
        .content
        .clone()
}

#[test]
fn example_data_with_braces_is_kept_verbatim() {
    let src = notes_source();
    assert!(src.contains("'text':'Hi {{title}} and {{provider}}'"));
    assert!(!src.contains("Hi Orders API"));
}

#[test]
fn path_values_are_encoded_and_quoted() {
    let src = notes_source();
    assert!(src.contains("path: '/authors/o%27neil/notes',"));
}
