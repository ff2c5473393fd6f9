use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend, env_example_file};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, TemplateEngine};

use crate::emitters;

/// `go test` packages using pact-go v2.
#[derive(Debug, Default)]
pub struct GoGenerator {
    engine: TemplateEngine,
}

impl GoGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageGeneratorBackend for GoGenerator {
    fn language(&self) -> Language {
        Language::Go
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        &["testing"]
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        &["go-modules"]
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
        log::debug!("go: {} cases", suite.tests.len());

        let mut files = Vec::new();
        let (test_path, content, description) = if suite.is_provider_mode {
            (
                emitters::tests::provider_path(suite),
                emitters::tests::emit_provider_tests(&self.engine, suite, config),
                "pact-go provider verification",
            )
        } else {
            (
                emitters::tests::consumer_path(suite),
                emitters::tests::emit_consumer_tests(&self.engine, suite, config),
                "pact-go consumer contract tests",
            )
        };
        let test_dir = if suite.is_provider_mode { "provider" } else { "consumer" };
        files.push(GeneratedFile::new(&test_path, content, FileType::Test, Language::Go, description));

        let mut source_files = vec![test_path];
        if suite.has_performance_tests() {
            let path = emitters::performance::performance_path(suite);
            files.push(GeneratedFile::new(
                &path,
                emitters::performance::emit_performance_tests(&self.engine, suite, config),
                FileType::Test,
                Language::Go,
                "Load, stress and resilience checks",
            ));
            source_files.push(path);
        }

        let dependencies = emitters::scaffold::dependencies(config);
        files.push(GeneratedFile::new(
            "go.mod",
            emitters::scaffold::emit_go_mod(suite, &dependencies)?,
            FileType::Dependency,
            Language::Go,
            "Go module requiring pact-go",
        ));
        let env = env_example_file(config);
        let config_files = vec![env.path.clone()];
        files.push(env);

        Ok(GeneratedOutput {
            files,
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: test_dir.to_string(),
                config_files,
                source_files,
                package_file: "go.mod".to_string(),
                build_file: None,
            },
            dependencies,
            setup_instructions: emitters::scaffold::setup_instructions(suite, config),
            configuration: ProjectConfiguration {
                language: Language::Go,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: emitters::scaffold::test_command(config),
                mode: suite.mode().to_string(),
                environment: config.advanced().environment,
            },
        })
    }
}
