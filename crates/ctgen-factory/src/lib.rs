//! Maps language keys to backends.
//!
//! The five built-in backends form the closed [`Backend`] enum. Extra
//! backends, typically test doubles, can be registered on a
//! [`LanguageGeneratorFactory`] and shadow a built-in with the same key.

use ctgen_core::backend::{BackendFeatures, LanguageGeneratorBackend};
use ctgen_core::config::{Language, LanguageConfig};
use ctgen_core::ir::TestSuite;
use ctgen_core::output::GeneratedOutput;
use ctgen_core::GenerateError;
use ctgen_csharp::CsharpGenerator;
use ctgen_go::GoGenerator;
use ctgen_java::JavaGenerator;
use ctgen_javascript::JavascriptGenerator;
use ctgen_python::PythonGenerator;
use indexmap::IndexMap;

/// A built-in backend.
#[derive(Debug)]
pub enum Backend {
    Javascript(JavascriptGenerator),
    Java(JavaGenerator),
    Csharp(CsharpGenerator),
    Python(PythonGenerator),
    Go(GoGenerator),
}

impl Backend {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Javascript => Backend::Javascript(JavascriptGenerator::new()),
            Language::Java => Backend::Java(JavaGenerator::new()),
            Language::Csharp => Backend::Csharp(CsharpGenerator::new()),
            Language::Python => Backend::Python(PythonGenerator::new()),
            Language::Go => Backend::Go(GoGenerator::new()),
        }
    }

    fn inner(&self) -> &dyn LanguageGeneratorBackend {
        match self {
            Backend::Javascript(g) => g,
            Backend::Java(g) => g,
            Backend::Csharp(g) => g,
            Backend::Python(g) => g,
            Backend::Go(g) => g,
        }
    }
}

impl LanguageGeneratorBackend for Backend {
    fn language(&self) -> Language {
        self.inner().language()
    }

    fn supported_frameworks(&self) -> &'static [&'static str] {
        self.inner().supported_frameworks()
    }

    fn supported_package_managers(&self) -> &'static [&'static str] {
        self.inner().supported_package_managers()
    }

    fn features(&self) -> BackendFeatures {
        self.inner().features()
    }

    fn generate_test_suite(
        &self,
        suite: &TestSuite,
        config: &LanguageConfig,
    ) -> Result<GeneratedOutput, GenerateError> {
        self.inner().generate_test_suite(suite, config)
    }
}

/// Registry of built-in and injected backends.
pub struct LanguageGeneratorFactory {
    builtins: Vec<Backend>,
    registered: IndexMap<String, Box<dyn LanguageGeneratorBackend>>,
}

impl Default for LanguageGeneratorFactory {
    fn default() -> Self {
        Self {
            builtins: Language::ALL.into_iter().map(Backend::for_language).collect(),
            registered: IndexMap::new(),
        }
    }
}

impl LanguageGeneratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` under `key`, replacing any earlier registration
    /// and shadowing a built-in with the same key.
    pub fn register_generator(&mut self, key: &str, backend: Box<dyn LanguageGeneratorBackend>) {
        let key = key.trim().to_ascii_lowercase();
        log::debug!("registering backend '{key}'");
        self.registered.insert(key, backend);
    }

    /// Look up a backend by key. Built-ins also answer to their aliases
    /// (`js`, `c#`, `golang`, ...).
    pub fn create_generator(&self, key: &str) -> Result<&dyn LanguageGeneratorBackend, GenerateError> {
        let normalized = key.trim().to_ascii_lowercase();
        if let Some(backend) = self.registered.get(&normalized) {
            return Ok(backend.as_ref());
        }
        Language::from_key(&normalized)
            .and_then(|language| self.builtins.iter().find(|b| b.language() == language))
            .map(|b| b as &dyn LanguageGeneratorBackend)
            .ok_or_else(|| GenerateError::UnsupportedLanguage {
                language: key.to_string(),
                valid: self.supported_languages(),
            })
    }

    /// Canonical built-in keys followed by any extra registered keys.
    pub fn supported_languages(&self) -> Vec<String> {
        let mut keys: Vec<String> = Language::ALL.iter().map(|l| l.as_str().to_string()).collect();
        for key in self.registered.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Run the backend for `config.language`, stamping the language and
    /// framework into the suite metadata the backend sees.
    pub fn generate_tests(
        &self,
        suite: &TestSuite,
        config: &LanguageConfig,
    ) -> Result<GeneratedOutput, GenerateError> {
        let backend = self.create_generator(config.language.as_str())?;
        let mut suite = suite.clone();
        suite.metadata.language = Some(config.language.as_str().to_string());
        suite.metadata.framework = Some(config.framework.clone());
        let output = backend.generate_test_suite(&suite, config)?;
        log::info!(
            "{}: generated {} files for {} cases",
            config.language,
            output.files.len(),
            suite.tests.len()
        );
        Ok(output)
    }
}
