use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend, env_example_file};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, TemplateEngine};

use crate::emitters;

/// JUnit 5 classes using Pact JVM, built with Maven or Gradle.
#[derive(Debug, Default)]
pub struct JavaGenerator {
    engine: TemplateEngine,
}

impl JavaGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageGeneratorBackend for JavaGenerator {
    fn language(&self) -> Language {
        Language::Java
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        &["junit5"]
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        &["maven", "gradle"]
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
        log::debug!("java: {} cases with {}", suite.tests.len(), config.package_manager);

        let mut files = Vec::new();
        let (test_path, content, description) = if suite.is_provider_mode {
            (
                emitters::tests::provider_path(suite, config),
                emitters::tests::emit_provider_tests(&self.engine, suite, config),
                "Pact provider verification",
            )
        } else {
            (
                emitters::tests::consumer_path(suite, config),
                emitters::tests::emit_consumer_tests(&self.engine, suite, config),
                "Pact consumer contract tests",
            )
        };
        files.push(GeneratedFile::new(&test_path, content, FileType::Test, Language::Java, description));

        let mut source_files = vec![test_path];
        if suite.has_performance_tests() {
            let path = emitters::performance::performance_path(suite, config);
            files.push(GeneratedFile::new(
                &path,
                emitters::performance::emit_performance_tests(&self.engine, suite, config),
                FileType::Test,
                Language::Java,
                "Load, stress and resilience checks",
            ));
            source_files.push(path);
        }

        let dependencies = emitters::scaffold::dependencies(config);
        let build_file = emitters::scaffold::build_file(config);
        files.push(GeneratedFile::new(
            build_file,
            emitters::scaffold::emit_build_file(suite, config, &dependencies)?,
            FileType::Build,
            Language::Java,
            format!("{} build with test dependencies", config.package_manager),
        ));
        let env = env_example_file(config);
        let config_files = vec![env.path.clone()];
        files.push(env);

        Ok(GeneratedOutput {
            files,
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: "src/test/java".to_string(),
                config_files,
                source_files,
                package_file: build_file.to_string(),
                build_file: Some(build_file.to_string()),
            },
            dependencies,
            setup_instructions: emitters::scaffold::setup_instructions(suite, config),
            configuration: ProjectConfiguration {
                language: Language::Java,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: emitters::scaffold::test_command(config),
                mode: suite.mode().to_string(),
                environment: config.advanced().environment,
            },
        })
    }
}
