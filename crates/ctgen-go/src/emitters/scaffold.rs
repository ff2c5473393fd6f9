use ctgen_core::GenerateError;
use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{Dependency, DependencyScope};
use minijinja::{Environment, context};

const PACT_GO: &str = "github.com/pact-foundation/pact-go/v2";
const PACT_GO_VERSION: &str = "v2.0.2";

pub fn dependencies(config: &LanguageConfig) -> Vec<Dependency> {
    vec![Dependency::new(
        PACT_GO,
        PACT_GO_VERSION,
        DependencyScope::Test,
        &config.package_manager,
        "Pact consumer DSL and verifier",
    )]
}

pub fn module_name(suite: &TestSuite) -> String {
    format!("{}-contract-tests", suite.consumer)
}

pub fn test_command(config: &LanguageConfig) -> String {
    if config.advanced().execution.parallel {
        format!("go test ./... -v -p {}", config.advanced().execution.workers)
    } else {
        "go test ./... -v".to_string()
    }
}

pub fn setup_instructions(suite: &TestSuite, config: &LanguageConfig) -> Vec<String> {
    let mut steps = vec![
        "go mod tidy".to_string(),
        format!("go install {PACT_GO}/cmd/pact-go@{PACT_GO_VERSION}"),
        "pact-go -l DEBUG install".to_string(),
        "cp .env.example .env".to_string(),
    ];
    if suite.is_provider_mode {
        steps.push(format!(
            "Start {} and place the {}-{}.json pact under pacts/",
            suite.provider, suite.consumer, suite.provider
        ));
    }
    steps.push(test_command(config));
    steps
}

pub fn emit_go_mod(suite: &TestSuite, deps: &[Dependency]) -> Result<String, GenerateError> {
    let name = "go.mod.j2";
    let mut env = Environment::new();
    env.add_template(name, include_str!("../../templates/go.mod.j2"))
        .expect("template should be valid");
    let tmpl = env
        .get_template(name)
        .map_err(|e| GenerateError::Template(e.to_string()))?;
    tmpl.render(context! {
        module => module_name(suite),
        dependencies => deps,
    })
    .map_err(|e| GenerateError::Template(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctgen_core::config::{AdvancedConfig, Language};

    #[test]
    fn test_parallel_flag() {
        let mut config = LanguageConfig::for_language(Language::Go);
        assert_eq!(test_command(&config), "go test ./... -v");
        let mut advanced = AdvancedConfig::default();
        advanced.execution.parallel = true;
        advanced.execution.workers = 8;
        config.advanced_config = Some(advanced);
        assert_eq!(test_command(&config), "go test ./... -v -p 8");
    }
}
