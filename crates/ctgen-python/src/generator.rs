use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend, env_example_file};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, TemplateEngine};

use crate::emitters;

/// pytest suites using pact-python and `requests`.
#[derive(Debug, Default)]
pub struct PythonGenerator {
    engine: TemplateEngine,
}

impl PythonGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageGeneratorBackend for PythonGenerator {
    fn language(&self) -> Language {
        Language::Python
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        &["pytest"]
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        &["pip", "poetry"]
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
        log::debug!("python: {} cases with {}", suite.tests.len(), config.package_manager);

        let mut files = Vec::new();
        let (test_path, content, description) = if suite.is_provider_mode {
            (
                emitters::tests::provider_path(suite),
                emitters::tests::emit_provider_tests(&self.engine, suite, config),
                "pact-python provider verification",
            )
        } else {
            (
                emitters::tests::consumer_path(suite),
                emitters::tests::emit_consumer_tests(&self.engine, suite, config),
                "pact-python consumer contract tests",
            )
        };
        files.push(GeneratedFile::new(&test_path, content, FileType::Test, Language::Python, description));

        let mut source_files = vec![test_path];
        if suite.has_performance_tests() {
            let path = emitters::performance::performance_path(suite);
            files.push(GeneratedFile::new(
                &path,
                emitters::performance::emit_performance_tests(&self.engine, suite, config),
                FileType::Test,
                Language::Python,
                "Load, stress and resilience checks",
            ));
            source_files.push(path);
        }

        let conftest = emitters::scaffold::conftest_path();
        files.push(GeneratedFile::new(
            &conftest,
            emitters::scaffold::emit_conftest(suite, config)?,
            FileType::Setup,
            Language::Python,
            "Loads .env and sets pact logging",
        ));

        let dependencies = emitters::scaffold::dependencies(config);
        let manifest = emitters::scaffold::manifest_path(config);
        files.push(GeneratedFile::new(
            manifest,
            emitters::scaffold::emit_manifest(suite, config, &dependencies)?,
            FileType::Dependency,
            Language::Python,
            format!("{} dependencies", config.package_manager),
        ));
        files.push(GeneratedFile::new(
            "pytest.ini",
            emitters::scaffold::emit_pytest_ini(config)?,
            FileType::Config,
            Language::Python,
            "pytest configuration",
        ));
        let env = env_example_file(config);
        let config_files = vec!["pytest.ini".to_string(), conftest, env.path.clone()];
        files.push(env);

        Ok(GeneratedOutput {
            files,
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: emitters::TEST_DIR.to_string(),
                config_files,
                source_files,
                package_file: manifest.to_string(),
                build_file: None,
            },
            dependencies,
            setup_instructions: emitters::scaffold::setup_instructions(suite, config),
            configuration: ProjectConfiguration {
                language: Language::Python,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: emitters::scaffold::test_command(config),
                mode: suite.mode().to_string(),
                environment: config.advanced().environment,
            },
        })
    }
}
