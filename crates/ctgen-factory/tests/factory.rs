use std::sync::{Arc, Mutex};

use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::generator::{GenerationOptions, TestGenerator};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::{
    FileType, GeneratedFile, GeneratedOutput, ProjectConfiguration, ProjectStructure,
};
use ctgen_core::{GenerateError, parse};
use ctgen_factory::LanguageGeneratorFactory;

const USERS: &str = include_str!("../../ctgen-core/tests/fixtures/users.yaml");

fn suite() -> TestSuite {
    let spec = parse::from_yaml(USERS).unwrap();
    TestGenerator::new(GenerationOptions {
        seed: Some(7),
        ..GenerationOptions::default()
    })
    .generate(&spec)
    .unwrap()
}

/// Records the metadata it was called with and emits one file.
struct Recorder {
    seen: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
}

impl LanguageGeneratorBackend for Recorder {
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
            provider_verification: false,
            performance_tests: false,
            mock_server: false,
            parallel_execution: false,
        }
    }

    fn generate_test_suite(
        &self,
        suite: &TestSuite,
        config: &LanguageConfig,
    ) -> Result<GeneratedOutput, GenerateError> {
        self.seen
            .lock()
            .unwrap()
            .push((suite.metadata.language.clone(), suite.metadata.framework.clone()));
        Ok(GeneratedOutput {
            files: vec![GeneratedFile::new("double.txt", "", FileType::Test, Language::Go, "double")],
            project_structure: ProjectStructure {
                root_dir: ".".to_string(),
                test_dir: ".".to_string(),
                config_files: Vec::new(),
                source_files: Vec::new(),
                package_file: "double.txt".to_string(),
                build_file: None,
            },
            dependencies: Vec::new(),
            setup_instructions: Vec::new(),
            configuration: ProjectConfiguration {
                language: Language::Go,
                framework: config.framework.clone(),
                package_manager: config.package_manager.clone(),
                test_command: "true".to_string(),
                mode: suite.mode().to_string(),
                environment: Default::default(),
            },
        })
    }
}

#[test]
fn go_output_has_test_file_and_module() {
    let factory = LanguageGeneratorFactory::new();
    let out = factory
        .generate_tests(&suite(), &LanguageConfig::for_language(Language::Go))
        .unwrap();
    assert!(out.files.iter().any(|f| f.path.ends_with("_test.go")));
    let go_mod = out.file("go.mod").unwrap();
    assert!(go_mod.content.starts_with("module "));
}

#[test]
fn every_builtin_generates_for_its_defaults() {
    let factory = LanguageGeneratorFactory::new();
    let suite = suite();
    for language in Language::ALL {
        let out = factory
            .generate_tests(&suite, &LanguageConfig::for_language(language))
            .unwrap_or_else(|e| panic!("{language}: {e}"));
        assert_eq!(out.configuration.language, language);
        assert!(out.files_of(FileType::Test).count() >= 1, "{language}");
        assert!(!out.dependencies.is_empty(), "{language}");
        assert!(!out.setup_instructions.is_empty(), "{language}");
    }
}

#[test]
fn registered_double_shadows_builtin() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut factory = LanguageGeneratorFactory::new();
    factory.register_generator("go", Box::new(Recorder { seen: Arc::clone(&seen) }));

    let out = factory
        .generate_tests(&suite(), &LanguageConfig::for_language(Language::Go))
        .unwrap();
    assert_eq!(out.files[0].path, "double.txt");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[(Some("go".to_string()), Some("testing".to_string()))]
    );
    assert_eq!(factory.supported_languages().len(), 5);
}

#[test]
fn registered_keys_extend_supported_languages() {
    let mut factory = LanguageGeneratorFactory::new();
    factory.register_generator(
        "Kotlin",
        Box::new(Recorder {
            seen: Arc::new(Mutex::new(Vec::new())),
        }),
    );
    assert_eq!(factory.supported_languages().last().map(String::as_str), Some("kotlin"));
    assert!(factory.create_generator("kotlin").is_ok());
}

#[test]
fn invalid_config_aborts_before_files() {
    let factory = LanguageGeneratorFactory::new();
    let mut config = LanguageConfig::for_language(Language::Java);
    config.framework = "testng".to_string();
    config.code_style.indent_size = 0;
    match factory.generate_tests(&suite(), &config) {
        Err(GenerateError::InvalidConfiguration(issues)) => {
            let codes: Vec<&str> = issues.iter().map(|i| i.code.as_str()).collect();
            assert_eq!(codes, vec!["UNSUPPORTED_FRAMEWORK", "INVALID_INDENT_SIZE"]);
        }
        other => panic!("expected InvalidConfiguration, got {:?}", other.map(|o| o.files.len())),
    }
}
