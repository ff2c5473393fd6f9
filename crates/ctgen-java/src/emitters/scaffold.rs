use ctgen_core::GenerateError;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{Dependency, DependencyScope};
use minijinja::{Environment, context};
use serde::Serialize;

const PACT_JVM_VERSION: &str = "4.6.5";
const JUNIT_VERSION: &str = "5.10.1";

/// Maven coordinates split for the build templates.
#[derive(Debug, Serialize)]
struct Coordinate<'a> {
    group: &'a str,
    artifact: &'a str,
    version: &'a str,
}

pub fn dependencies(config: &LanguageConfig) -> Vec<Dependency> {
    let pm = config.package_manager.as_str();
    vec![
        Dependency::new("org.junit.jupiter:junit-jupiter", JUNIT_VERSION, DependencyScope::Test, pm, "JUnit 5"),
        Dependency::new(
            "au.com.dius.pact.consumer:junit5",
            PACT_JVM_VERSION,
            DependencyScope::Test,
            pm,
            "Pact JVM consumer DSL and mock server",
        ),
        Dependency::new(
            "au.com.dius.pact.provider:junit5",
            PACT_JVM_VERSION,
            DependencyScope::Test,
            pm,
            "Pact JVM provider verification",
        ),
    ]
}

pub fn build_file(config: &LanguageConfig) -> &'static str {
    if config.package_manager == "gradle" { "build.gradle" } else { "pom.xml" }
}

pub fn test_command(config: &LanguageConfig) -> String {
    if config.package_manager == "gradle" {
        "gradle test".to_string()
    } else {
        "mvn test".to_string()
    }
}

pub fn setup_instructions(suite: &TestSuite, config: &LanguageConfig) -> Vec<String> {
    let mut steps = vec![if config.package_manager == "gradle" {
        "gradle testClasses".to_string()
    } else {
        "mvn test-compile".to_string()
    }];
    steps.push("cp .env.example .env".to_string());
    if suite.is_provider_mode {
        steps.push(format!(
            "Start {} and place the {}-{}.json pact under pacts/",
            suite.provider, suite.consumer, suite.provider
        ));
    }
    steps.push(test_command(config));
    steps
}

/// `pom.xml` or `build.gradle` declaring every test dependency.
pub fn emit_build_file(
    suite: &TestSuite,
    config: &LanguageConfig,
    deps: &[Dependency],
) -> Result<String, GenerateError> {
    let coordinates: Vec<Coordinate<'_>> = deps
        .iter()
        .filter_map(|d| {
            let (group, artifact) = d.name.split_once(':')?;
            Some(Coordinate {
                group,
                artifact,
                version: &d.version,
            })
        })
        .collect();
    let advanced = config.advanced();
    let ctx = context! {
        group_id => "contracts",
        artifact_id => format!("{}-contract-tests", suite.consumer),
        version => suite.metadata.version,
        title => suite.metadata.title,
        dependencies => coordinates,
        log_level => advanced.logging.level,
        parallel => advanced.execution.parallel,
        workers => advanced.execution.workers,
    };
    let name = build_file(config);
    let source = if name == "build.gradle" {
        include_str!("../../templates/build.gradle.j2")
    } else {
        include_str!("../../templates/pom.xml.j2")
    };
    render(name, source, ctx)
}

fn render(name: &str, source: &str, ctx: minijinja::Value) -> Result<String, GenerateError> {
    let mut env = Environment::new();
    env.add_template(name, source)
        .expect("template should be valid");
    let tmpl = env
        .get_template(name)
        .map_err(|e| GenerateError::Template(e.to_string()))?;
    tmpl.render(ctx)
        .map_err(|e| GenerateError::Template(format!("{name}: {e}")))
}
