use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend, env_example_file};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, TemplateEngine};

use crate::emitters;

/// xUnit or NUnit test projects using PactNet.
#[derive(Debug, Default)]
pub struct CsharpGenerator {
    engine: TemplateEngine,
}

impl CsharpGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageGeneratorBackend for CsharpGenerator {
    fn language(&self) -> Language {
        Language::Csharp
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        &["xunit", "nunit"]
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        &["dotnet", "nuget"]
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
        log::debug!("csharp: {} cases with {}", suite.tests.len(), config.framework);

        let mut files = Vec::new();
        let (test_path, content, description) = if suite.is_provider_mode {
            (
                emitters::tests::provider_path(suite, config),
                emitters::tests::emit_provider_tests(&self.engine, suite, config),
                "PactNet provider verification",
            )
        } else {
            (
                emitters::tests::consumer_path(suite, config),
                emitters::tests::emit_consumer_tests(&self.engine, suite, config),
                "PactNet consumer contract tests",
            )
        };
        files.push(GeneratedFile::new(&test_path, content, FileType::Test, Language::Csharp, description));

        let mut source_files = vec![test_path];
        if suite.has_performance_tests() {
            let path = emitters::performance::performance_path(suite, config);
            files.push(GeneratedFile::new(
                &path,
                emitters::performance::emit_performance_tests(&self.engine, suite, config),
                FileType::Test,
                Language::Csharp,
                "Load, stress and resilience checks",
            ));
            source_files.push(path);
        }

        let dependencies = emitters::scaffold::dependencies(config);
        let project = emitters::scaffold::project_path(suite, config);
        files.push(GeneratedFile::new(
            &project,
            emitters::scaffold::emit_project_file(suite, config, &dependencies)?,
            FileType::Build,
            Language::Csharp,
            "Test project with package references",
        ));
        let env = env_example_file(config);
        let config_files = vec![env.path.clone()];
        files.push(env);

        Ok(GeneratedOutput {
            files,
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: emitters::project_name(suite, config),
                config_files,
                source_files,
                package_file: project.clone(),
                build_file: Some(project),
            },
            dependencies,
            setup_instructions: emitters::scaffold::setup_instructions(suite, config),
            configuration: ProjectConfiguration {
                language: Language::Csharp,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: emitters::scaffold::test_command(suite, config),
                mode: suite.mode().to_string(),
                environment: config.advanced().environment,
            },
        })
    }
}
