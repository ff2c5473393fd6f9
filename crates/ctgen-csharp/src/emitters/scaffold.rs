use ctgen_core::GenerateError;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{Dependency, DependencyScope};
use minijinja::{Environment, context};

use super::project_name;

pub fn dependencies(config: &LanguageConfig) -> Vec<Dependency> {
    let pm = config.package_manager.as_str();
    let mut deps = vec![
        Dependency::new("Microsoft.NET.Test.Sdk", "17.8.0", DependencyScope::Test, pm, "Test host"),
        Dependency::new("PactNet", "4.5.0", DependencyScope::Test, pm, "Pact consumer DSL and verifier"),
    ];
    if config.framework == "nunit" {
        deps.push(Dependency::new("NUnit", "3.14.0", DependencyScope::Test, pm, "Test framework"));
        deps.push(Dependency::new("NUnit3TestAdapter", "4.5.0", DependencyScope::Test, pm, "NUnit runner"));
    } else {
        deps.push(Dependency::new("xunit", "2.6.2", DependencyScope::Test, pm, "Test framework"));
        deps.push(Dependency::new(
            "xunit.runner.visualstudio",
            "2.5.4",
            DependencyScope::Test,
            pm,
            "xUnit runner",
        ));
    }
    deps
}

/// `UserManagementApi.ContractTests/UserManagementApi.ContractTests.csproj`.
pub fn project_path(suite: &TestSuite, config: &LanguageConfig) -> String {
    let project = project_name(suite, config);
    format!("{project}/{project}.csproj")
}

pub fn test_command(suite: &TestSuite, config: &LanguageConfig) -> String {
    format!("dotnet test {}", project_path(suite, config))
}

pub fn setup_instructions(suite: &TestSuite, config: &LanguageConfig) -> Vec<String> {
    let project = project_path(suite, config);
    let mut steps = vec![if config.package_manager == "nuget" {
        format!("nuget restore {project}")
    } else {
        format!("dotnet restore {project}")
    }];
    steps.push("cp .env.example .env".to_string());
    if suite.is_provider_mode {
        steps.push(format!(
            "Start {} with a /provider-states endpoint and place the {}-{}.json pact under pacts/",
            suite.provider, suite.consumer, suite.provider
        ));
    }
    steps.push(test_command(suite, config));
    steps
}

/// SDK-style test project with a `PackageReference` per dependency.
pub fn emit_project_file(
    suite: &TestSuite,
    config: &LanguageConfig,
    deps: &[Dependency],
) -> Result<String, GenerateError> {
    let advanced = config.advanced();
    let name = "ContractTests.csproj.j2";
    let mut env = Environment::new();
    env.add_template(name, include_str!("../../templates/ContractTests.csproj.j2"))
        .expect("template should be valid");
    let tmpl = env
        .get_template(name)
        .map_err(|e| GenerateError::Template(e.to_string()))?;
    tmpl.render(context! {
        namespace => project_name(suite, config),
        version => suite.metadata.version,
        dependencies => deps,
        framework => config.framework,
        parallel => advanced.execution.parallel,
        workers => advanced.execution.workers,
    })
    .map_err(|e| GenerateError::Template(format!("{name}: {e}")))
}
