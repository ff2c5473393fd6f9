use ctgen_core::config::{AdvancedConfig, Language, LanguageConfig};
use ctgen_core::generator::{GenerationOptions, TestGenerator};
use ctgen_core::ir::TestSuite;
use ctgen_core::{LanguageGeneratorBackend, parse};
use ctgen_csharp::CsharpGenerator;

const USERS: &str = include_str!("../../ctgen-core/tests/fixtures/users.yaml");

const CONSUMER: &str = "UserManagementApi.ContractTests/UserManagementApiConsumerTests.cs";
const PROVIDER: &str = "UserManagementApi.ContractTests/UserManagementApiProviderTests.cs";
const PERFORMANCE: &str = "UserManagementApi.ContractTests/UserManagementApiPerformanceTests.cs";
const PROJECT: &str = "UserManagementApi.ContractTests/UserManagementApi.ContractTests.csproj";

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
    LanguageConfig::for_language(Language::Csharp)
}

#[test]
fn consumer_project_layout() {
    let out = CsharpGenerator::new().generate_test_suite(&suite(false), &config()).unwrap();
    let paths: Vec<&str> = out.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec![CONSUMER, PERFORMANCE, PROJECT, ".env.example"]);
    assert_eq!(out.configuration.test_command, format!("dotnet test {PROJECT}"));
    assert_eq!(out.setup_instructions[0], format!("dotnet restore {PROJECT}"));
}

#[test]
fn xunit_consumer_source() {
    let out = CsharpGenerator::new().generate_test_suite(&suite(false), &config()).unwrap();
    let src = &out.file(CONSUMER).unwrap().content;
    assert!(src.contains("namespace UserManagementApi.ContractTests;"));
    assert!(src.contains("using Xunit;"));
    assert!(src.contains("public class UserManagementApiConsumerTests\n{"));
    assert!(src.contains("    [Fact(Timeout = 30000)]\n    public async Task PostUsersSuccess()"));
    assert!(src.contains(".WithStatus((HttpStatusCode)201)"));
    assert!(src.contains(".WithHeader(\"Authorization\", \"Bearer valid-test-token\")"));
    assert!(src.contains("Assert.True(ok, message);"));
    assert!(src.contains("LogLevel = PactLogLevel.Information,"));
    assert!(!src.contains("{{"));
}

#[test]
fn nunit_swaps_attributes_and_packages() {
    let mut config = config();
    config.framework = "nunit".to_string();
    config.package_manager = "nuget".to_string();
    let out = CsharpGenerator::new().generate_test_suite(&suite(false), &config).unwrap();
    let src = &out.file(CONSUMER).unwrap().content;
    assert!(src.contains("[TestFixture]\npublic class UserManagementApiConsumerTests"));
    assert!(src.contains("[Test, Timeout(30000)]"));
    assert!(src.contains("Assert.That(ok, Is.True, message);"));
    let csproj = &out.file(PROJECT).unwrap().content;
    assert!(csproj.contains("<PackageReference Include=\"NUnit\" Version=\"3.14.0\" />"));
    assert!(!csproj.contains("xunit"));
    assert_eq!(out.setup_instructions[0], format!("nuget restore {PROJECT}"));
}

#[test]
fn csproj_references_every_dependency() {
    let out = CsharpGenerator::new().generate_test_suite(&suite(false), &config()).unwrap();
    let csproj = &out.file(PROJECT).unwrap().content;
    assert!(csproj.starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">"));
    for dep in &out.dependencies {
        assert!(csproj.contains(&format!(
            "<PackageReference Include=\"{}\" Version=\"{}\" />",
            dep.name, dep.version
        )));
    }
}

#[test]
fn provider_source_lists_states() {
    let mut config = config();
    let mut advanced = AdvancedConfig::default();
    advanced.logging.level = "debug".to_string();
    config.advanced_config = Some(advanced);
    let out = CsharpGenerator::new().generate_test_suite(&suite(true), &config).unwrap();
    let src = &out.file(PROVIDER).unwrap().content;
    assert!(src.contains("        \"the client has exceeded its rate limit\",\n"));
    assert!(src.contains(".ServiceProvider(\"user-management-api-provider\", new Uri(ProviderBaseUrl))"));
    assert!(src.contains("PactLogLevel.Debug"));
    assert!(src.contains("public async Task DeleteUsersIdSuccess()"));
}

#[test]
fn performance_timeouts_cover_duration() {
    let out = CsharpGenerator::new().generate_test_suite(&suite(false), &config()).unwrap();
    let src = &out.file(PERFORMANCE).unwrap().content;
    assert!(src.contains("[Fact(Timeout = 150000)]\n    public async Task GetUsersPerformanceStress()"));
}
