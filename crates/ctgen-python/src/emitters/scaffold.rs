use ctgen_core::GenerateError;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{Dependency, DependencyScope};
use minijinja::{Environment, Value, context};

use super::{TEST_DIR, style};
use crate::literals;

fn poetry(config: &LanguageConfig) -> bool {
    config.package_manager == "poetry"
}

pub fn dependencies(config: &LanguageConfig) -> Vec<Dependency> {
    let pm = config.package_manager.as_str();
    let mut deps = vec![
        Dependency::new("pytest", "7.4.3", DependencyScope::Dev, pm, "Test runner"),
        Dependency::new("pytest-timeout", "2.2.0", DependencyScope::Dev, pm, "Per-test timeouts"),
        Dependency::new("pact-python", "2.2.0", DependencyScope::Dev, pm, "Pact consumer DSL and verifier"),
        Dependency::new("requests", "2.31.0", DependencyScope::Dev, pm, "HTTP client"),
        Dependency::new("python-dotenv", "1.0.0", DependencyScope::Dev, pm, "Loads .env"),
    ];
    if config.advanced().execution.parallel {
        deps.push(Dependency::new("pytest-xdist", "3.5.0", DependencyScope::Dev, pm, "Parallel runs"));
    }
    deps
}

pub fn manifest_path(config: &LanguageConfig) -> &'static str {
    if poetry(config) { "pyproject.toml" } else { "requirements.txt" }
}

pub fn test_command(config: &LanguageConfig) -> String {
    if poetry(config) {
        "poetry run pytest".to_string()
    } else {
        "pytest".to_string()
    }
}

pub fn setup_instructions(suite: &TestSuite, config: &LanguageConfig) -> Vec<String> {
    let mut steps = vec![if poetry(config) {
        "poetry install".to_string()
    } else {
        "pip install -r requirements.txt".to_string()
    }];
    steps.push("cp .env.example .env".to_string());
    if suite.is_provider_mode {
        steps.push(format!(
            "Start {} with a /_pact/provider_states endpoint and place the {}-{}.json pact under pacts/",
            suite.provider, suite.consumer, suite.provider
        ));
    }
    steps.push(test_command(config));
    steps
}

/// `requirements.txt` pins, or a poetry `pyproject.toml`.
pub fn emit_manifest(suite: &TestSuite, config: &LanguageConfig, deps: &[Dependency]) -> Result<String, GenerateError> {
    if !poetry(config) {
        let pins: Vec<String> = deps.iter().map(|d| format!("{}=={}", d.name, d.version)).collect();
        return Ok(pins.join("\n") + "\n");
    }
    render(
        "pyproject.toml.j2",
        include_str!("../../templates/pyproject.toml.j2"),
        context! {
            name => format!("{}-contract-tests", suite.consumer),
            version => suite.metadata.version,
            title => suite.metadata.title,
            dependencies => deps,
        },
    )
}

pub fn emit_pytest_ini(config: &LanguageConfig) -> Result<String, GenerateError> {
    let advanced = config.advanced();
    render(
        "pytest.ini.j2",
        include_str!("../../templates/pytest.ini.j2"),
        context! {
            timeout_secs => advanced.timeouts.test_ms.div_ceil(1000),
            log_level => literals::log_level(&advanced.logging.level),
            parallel => advanced.execution.parallel,
            workers => advanced.execution.workers,
        },
    )
}

pub fn conftest_path() -> String {
    format!("{TEST_DIR}/conftest.py")
}

pub fn emit_conftest(suite: &TestSuite, config: &LanguageConfig) -> Result<String, GenerateError> {
    let source = render(
        "conftest.py.j2",
        include_str!("../../templates/conftest.py.j2"),
        context! {
            title => suite.metadata.title,
            log_level => literals::log_level(&config.advanced().logging.level),
        },
    )?;
    Ok(style(&source, config))
}

fn render(name: &str, source: &str, ctx: Value) -> Result<String, GenerateError> {
    let mut env = Environment::new();
    env.add_template(name, source).expect("template should be valid");
    let tmpl = env
        .get_template(name)
        .map_err(|e| GenerateError::Template(e.to_string()))?;
    tmpl.render(ctx)
        .map_err(|e| GenerateError::Template(format!("{name}: {e}")))
}
