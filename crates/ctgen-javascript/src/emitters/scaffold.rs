use ctgen_core::config::LanguageConfig;
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{Dependency, DependencyScope};
use ctgen_core::GenerateError;
use minijinja::{Environment, context};
use serde_json::{Map, Value, json};

use super::performance::performance_path;
use super::tests::{consumer_path, provider_path};

/// Dev dependencies of the generated project.
pub fn dependencies(config: &LanguageConfig) -> Vec<Dependency> {
    let pm = config.package_manager.as_str();
    let mut deps = vec![
        Dependency::new("@pact-foundation/pact", "^12.1.0", DependencyScope::Dev, pm, "Pact consumer and provider DSL"),
        Dependency::new("axios", "^1.6.0", DependencyScope::Dev, pm, "HTTP client used by the tests"),
        Dependency::new("dotenv", "^16.3.0", DependencyScope::Dev, pm, "Loads .env into process.env"),
    ];
    deps.push(match config.framework.as_str() {
        "mocha" => Dependency::new("mocha", "^10.2.0", DependencyScope::Dev, pm, "Test runner"),
        _ => Dependency::new("jest", "^29.7.0", DependencyScope::Dev, pm, "Test runner"),
    });
    deps
}

/// `npm test`, `yarn test` or `pnpm test`.
pub fn test_command(config: &LanguageConfig) -> String {
    format!("{} test", config.package_manager)
}

pub fn setup_instructions(suite: &TestSuite, config: &LanguageConfig) -> Vec<String> {
    let pm = config.package_manager.as_str();
    let mut steps = vec![
        format!("{pm} install"),
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

/// `package.json` with every dev dependency under `devDependencies`.
pub fn emit_package_json(suite: &TestSuite, config: &LanguageConfig, deps: &[Dependency]) -> String {
    let runner = if config.framework == "mocha" { "mocha" } else { "jest" };
    let mut scripts = Map::new();
    scripts.insert("test".into(), json!(runner));
    let mode = if suite.is_provider_mode {
        ("test:provider", provider_path(suite))
    } else {
        ("test:consumer", consumer_path(suite))
    };
    scripts.insert(mode.0.into(), json!(format!("{runner} {}", mode.1)));
    if suite.has_performance_tests() {
        scripts.insert(
            "test:performance".into(),
            json!(format!("{runner} {}", performance_path(suite))),
        );
    }

    let dev: Map<String, Value> = deps
        .iter()
        .filter(|d| d.is_dev())
        .map(|d| (d.name.clone(), json!(d.version)))
        .collect();

    let package = json!({
        "name": format!("{}-contract-tests", suite.consumer),
        "version": suite.metadata.version,
        "private": true,
        "description": format!("Contract tests for {}", suite.metadata.title),
        "scripts": scripts,
        "devDependencies": dev,
    });
    let mut out = serde_json::to_string_pretty(&package).unwrap_or_default();
    out.push('\n');
    out
}

/// `jest.config.js` or `.mocharc.json`, whichever the framework reads.
pub fn emit_runner_config(config: &LanguageConfig) -> Result<(String, String), GenerateError> {
    let advanced = config.advanced();
    let verbose = matches!(advanced.logging.level.as_str(), "debug" | "trace");
    let ctx = context! {
        test_timeout_ms => advanced.timeouts.test_ms,
        parallel => advanced.execution.parallel,
        workers => advanced.execution.workers,
        verbose => verbose,
    };
    if config.framework == "mocha" {
        let content = render("mocharc.json.j2", include_str!("../../templates/mocharc.json.j2"), ctx)?;
        Ok((".mocharc.json".to_string(), content))
    } else {
        let content = render("jest.config.js.j2", include_str!("../../templates/jest.config.js.j2"), ctx)?;
        Ok(("jest.config.js".to_string(), content))
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use ctgen_core::config::{AdvancedConfig, Language};

    #[test]
    fn test_mocha_swaps_runner() {
        let mut config = LanguageConfig::for_language(Language::Javascript);
        config.framework = "mocha".to_string();
        config.package_manager = "pnpm".to_string();
        let deps = dependencies(&config);
        assert!(deps.iter().any(|d| d.name == "mocha"));
        assert!(!deps.iter().any(|d| d.name == "jest"));
        assert!(deps.iter().all(|d| d.manager == "pnpm"));
        assert_eq!(test_command(&config), "pnpm test");
    }

    #[test]
    fn test_runner_config_uses_timeouts() {
        let mut config = LanguageConfig::for_language(Language::Javascript);
        let mut advanced = AdvancedConfig::default();
        advanced.timeouts.test_ms = 45_000;
        advanced.execution.parallel = true;
        advanced.execution.workers = 4;
        config.advanced_config = Some(advanced);
        let (path, content) = emit_runner_config(&config).unwrap();
        assert_eq!(path, "jest.config.js");
        assert!(content.contains("testTimeout: 45000"));
        assert!(content.contains("maxWorkers: 4"));

        config.framework = "mocha".to_string();
        let (path, content) = emit_runner_config(&config).unwrap();
        assert_eq!(path, ".mocharc.json");
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["timeout"], 45000);
        assert_eq!(parsed["parallel"], true);
        assert_eq!(parsed["reporter"], "dot");
    }
}
