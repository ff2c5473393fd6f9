use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend, env_example_file};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, TemplateEngine};

use crate::emitters;

/// Jest or Mocha suites driving Pact JS.
#[derive(Debug, Default)]
pub struct JavascriptGenerator {
    engine: TemplateEngine,
}

impl JavascriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageGeneratorBackend for JavascriptGenerator {
    fn language(&self) -> Language {
        Language::Javascript
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        &["jest", "mocha"]
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        &["npm", "yarn", "pnpm"]
    }

    fn features(&self) -> BackendFeatures {
        BackendFeatures {
            consumer_tests: true,
            provider_verification: true,
            performance_tests: true,
            mock_server: true,
            parallel_execution: true,
        }
    }

    fn generate_test_suite(
        &self,
        suite: &TestSuite,
        config: &LanguageConfig,
    ) -> Result<GeneratedOutput, GenerateError> {
        self.check_config(config)?;
        log::debug!(
            "javascript: {} cases with {} ({})",
            suite.tests.len(),
            config.framework,
            config.package_manager
        );

        let mut files = Vec::new();
        let (test_path, content, description) = if suite.is_provider_mode {
            (
                emitters::tests::provider_path(suite),
                emitters::tests::emit_provider_tests(&self.engine, suite, config),
                "Pact provider verification",
            )
        } else {
            (
                emitters::tests::consumer_path(suite),
                emitters::tests::emit_consumer_tests(&self.engine, suite, config),
                "Pact consumer contract tests",
            )
        };
        files.push(GeneratedFile::new(&test_path, content, FileType::Test, Language::Javascript, description));

        let mut source_files = vec![test_path];
        if suite.has_performance_tests() {
            let path = emitters::performance::performance_path(suite);
            files.push(GeneratedFile::new(
                &path,
                emitters::performance::emit_performance_tests(&self.engine, suite, config),
                FileType::Test,
                Language::Javascript,
                "Load, stress and resilience checks",
            ));
            source_files.push(path);
        }

        let dependencies = emitters::scaffold::dependencies(config);
        files.push(GeneratedFile::new(
            "package.json",
            emitters::scaffold::emit_package_json(suite, config, &dependencies),
            FileType::Dependency,
            Language::Javascript,
            "npm manifest with dev dependencies and test scripts",
        ));
        let (runner_path, runner_config) = emitters::scaffold::emit_runner_config(config)?;
        files.push(GeneratedFile::new(
            &runner_path,
            runner_config,
            FileType::Config,
            Language::Javascript,
            format!("{} configuration", config.framework),
        ));
        let env = env_example_file(config);
        let config_files = vec![runner_path, env.path.clone()];
        files.push(env);

        Ok(GeneratedOutput {
            files,
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: "tests".to_string(),
                config_files,
                source_files,
                package_file: "package.json".to_string(),
                build_file: None,
            },
            dependencies,
            setup_instructions: emitters::scaffold::setup_instructions(suite, config),
            configuration: ProjectConfiguration {
                language: Language::Javascript,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: emitters::scaffold::test_command(config),
                mode: suite.mode().to_string(),
                environment: config.advanced().environment,
            },
        })
    }
}
