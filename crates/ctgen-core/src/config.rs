use std::fmt;
use std::fs;
use std::path::Path;

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::generator::GenerationOptions;

/// Top-level project configuration loaded from `.ctgen.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub input: String,
    pub output: String,
    pub language: LanguageConfig,
    pub generation: GenerationOptions,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "contract-tests".to_string(),
            language: LanguageConfig::default(),
            generation: GenerationOptions::default(),
        }
    }
}

/// Target ecosystem of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Java,
    Csharp,
    Python,
    Go,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Javascript,
        Language::Java,
        Language::Csharp,
        Language::Python,
        Language::Go,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Csharp => "csharp",
            Language::Python => "python",
            Language::Go => "go",
        }
    }

    /// Accepts the canonical key plus common short forms (`js`, `c#`, `golang`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "node" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "csharp" | "c#" | "cs" | "dotnet" => Some(Language::Csharp),
            "python" | "py" => Some(Language::Python),
            "go" | "golang" => Some(Language::Go),
            _ => None,
        }
    }

    pub fn default_framework(&self) -> &'static str {
        match self {
            Language::Javascript => "jest",
            Language::Java => "junit5",
            Language::Csharp => "xunit",
            Language::Python => "pytest",
            Language::Go => "testing",
        }
    }

    pub fn default_package_manager(&self) -> &'static str {
        match self {
            Language::Javascript => "npm",
            Language::Java => "maven",
            Language::Csharp => "dotnet",
            Language::Python => "pip",
            Language::Go => "go-modules",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStyle {
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "PascalCase")]
    Pascal,
    #[serde(rename = "snake_case")]
    Snake,
    #[serde(rename = "kebab-case")]
    Kebab,
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
}

impl CaseStyle {
    pub fn apply(&self, input: &str) -> String {
        match self {
            CaseStyle::Camel => input.to_lower_camel_case(),
            CaseStyle::Pascal => input.to_upper_camel_case(),
            CaseStyle::Snake => input.to_snake_case(),
            CaseStyle::Kebab => input.to_kebab_case(),
            CaseStyle::ScreamingSnake => input.to_shouty_snake_case(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConvention {
    pub test_classes: CaseStyle,
    pub test_methods: CaseStyle,
    pub variables: CaseStyle,
    pub constants: CaseStyle,
}

impl NamingConvention {
    pub fn for_language(language: Language) -> Self {
        let (test_methods, variables) = match language {
            Language::Javascript | Language::Java => (CaseStyle::Camel, CaseStyle::Camel),
            Language::Csharp => (CaseStyle::Pascal, CaseStyle::Camel),
            Language::Python => (CaseStyle::Snake, CaseStyle::Snake),
            Language::Go => (CaseStyle::Pascal, CaseStyle::Camel),
        };
        Self {
            test_classes: CaseStyle::Pascal,
            test_methods,
            variables,
            constants: CaseStyle::ScreamingSnake,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indentation {
    Spaces,
    Tabs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn char(&self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStyle {
    pub indentation: Indentation,
    pub indent_size: usize,
    pub max_line_length: usize,
    pub semicolons: bool,
    pub quotes: QuoteStyle,
}

impl CodeStyle {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Javascript => Self {
                indentation: Indentation::Spaces,
                indent_size: 2,
                max_line_length: 100,
                semicolons: true,
                quotes: QuoteStyle::Single,
            },
            Language::Java | Language::Csharp => Self {
                indentation: Indentation::Spaces,
                indent_size: 4,
                max_line_length: 120,
                semicolons: true,
                quotes: QuoteStyle::Double,
            },
            Language::Python => Self {
                indentation: Indentation::Spaces,
                indent_size: 4,
                max_line_length: 88,
                semicolons: false,
                quotes: QuoteStyle::Double,
            },
            Language::Go => Self {
                indentation: Indentation::Tabs,
                indent_size: 1,
                max_line_length: 120,
                semicolons: false,
                quotes: QuoteStyle::Double,
            },
        }
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        match self.indentation {
            Indentation::Tabs => "\t".to_string(),
            Indentation::Spaces => " ".repeat(self.indent_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeoutConfig {
    pub test_ms: u64,
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            test_ms: 30_000,
            request_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub base_url: String,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            port: 8080,
        }
    }
}

impl NetworkConfig {
    /// `base_url` with the port appended unless it already names one.
    pub fn provider_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let host = base.split("://").nth(1).unwrap_or(base);
        if host.contains(':') {
            base.to_string()
        } else {
            format!("{base}:{}", self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub parallel: bool,
    pub workers: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            workers: 1,
        }
    }
}

/// Optional knobs consumed by every backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub timeouts: TimeoutConfig,
    pub logging: LoggingConfig,
    pub network: NetworkConfig,
    pub retry: RetryConfig,
    pub execution: ExecutionConfig,
    pub environment: IndexMap<String, String>,
}

/// Caller-supplied target selection and style.
///
/// Missing fields default per language, so `language: go` alone yields tabs
/// and the `testing` framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawLanguageConfig")]
pub struct LanguageConfig {
    pub language: Language,
    pub framework: String,
    pub package_manager: String,
    pub naming_convention: NamingConvention,
    pub code_style: CodeStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_config: Option<AdvancedConfig>,
}

impl LanguageConfig {
    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            framework: language.default_framework().to_string(),
            package_manager: language.default_package_manager().to_string(),
            naming_convention: NamingConvention::for_language(language),
            code_style: CodeStyle::for_language(language),
            advanced_config: None,
        }
    }

    /// The advanced section, or its defaults when absent.
    pub fn advanced(&self) -> AdvancedConfig {
        self.advanced_config.clone().unwrap_or_default()
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::for_language(Language::Javascript)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLanguageConfig {
    #[serde(default = "default_language")]
    language: Language,
    framework: Option<String>,
    package_manager: Option<String>,
    naming_convention: Option<NamingConvention>,
    code_style: Option<CodeStyle>,
    advanced_config: Option<AdvancedConfig>,
}

fn default_language() -> Language {
    Language::Javascript
}

impl From<RawLanguageConfig> for LanguageConfig {
    fn from(raw: RawLanguageConfig) -> Self {
        let defaults = LanguageConfig::for_language(raw.language);
        Self {
            language: raw.language,
            framework: raw.framework.unwrap_or(defaults.framework),
            package_manager: raw.package_manager.unwrap_or(defaults.package_manager),
            naming_convention: raw.naming_convention.unwrap_or(defaults.naming_convention),
            code_style: raw.code_style.unwrap_or(defaults.code_style),
            advanced_config: raw.advanced_config,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".ctgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ProjectConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# ctgen configuration
input: openapi.yaml
output: contract-tests

language:
  language: javascript      # javascript | java | csharp | python | go
  framework: jest           # jest | mocha, junit5, xunit | nunit, pytest, testing
  packageManager: npm       # npm | yarn | pnpm, maven | gradle, dotnet | nuget, pip | poetry, go-modules
  # codeStyle:
  #   indentation: spaces   # spaces | tabs
  #   indentSize: 2
  #   maxLineLength: 100
  #   semicolons: true
  #   quotes: single        # single | double
  # advancedConfig:
  #   network:
  #     baseUrl: http://localhost
  #     port: 8080
  #   timeouts:
  #     testMs: 30000
  #   environment:
  #     API_TOKEN: changeme

generation:
  categories: [success, boundary, edge, auth, error, performance]
  composition: first_branch # first_branch | per_branch
  # seed: 42
  provider_mode: false
  strict: false
  base_url: http://localhost:8080
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CompositionStrategy;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "contract-tests");
        assert_eq!(config.language.language, Language::Javascript);
        assert_eq!(config.language.framework, "jest");
        assert_eq!(config.generation.composition, CompositionStrategy::FirstBranch);
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: ProjectConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.language.package_manager, "npm");
        assert_eq!(config.generation.categories.len(), 6);
        assert!(!config.generation.strict);
    }

    #[test]
    fn test_language_fields_default_per_language() {
        let yaml = "language:\n  language: go\n";
        let config: ProjectConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.language.framework, "testing");
        assert_eq!(config.language.package_manager, "go-modules");
        assert_eq!(config.language.code_style.indentation, Indentation::Tabs);
        assert_eq!(config.language.naming_convention.test_methods, CaseStyle::Pascal);
        // Defaults applied
        assert_eq!(config.input, "openapi.yaml");
    }

    #[test]
    fn test_parse_advanced_config() {
        let yaml = r#"
language:
  language: python
  framework: pytest
  packageManager: poetry
  advancedConfig:
    network:
      baseUrl: https://staging.example.com
    environment:
      API_TOKEN: abc
"#;
        let config: ProjectConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let advanced = config.language.advanced();
        assert_eq!(advanced.network.base_url, "https://staging.example.com");
        assert_eq!(advanced.network.port, 8080);
        assert_eq!(advanced.timeouts.test_ms, 30_000);
        assert_eq!(advanced.environment["API_TOKEN"], "abc");
    }

    #[test]
    fn test_language_from_key_aliases() {
        assert_eq!(Language::from_key("JS"), Some(Language::Javascript));
        assert_eq!(Language::from_key("c#"), Some(Language::Csharp));
        assert_eq!(Language::from_key("golang"), Some(Language::Go));
        assert_eq!(Language::from_key("rust"), None);
    }

    #[test]
    fn test_case_style_apply() {
        assert_eq!(CaseStyle::Camel.apply("post_users_success"), "postUsersSuccess");
        assert_eq!(CaseStyle::Pascal.apply("post_users_success"), "PostUsersSuccess");
        assert_eq!(CaseStyle::ScreamingSnake.apply("baseUrl"), "BASE_URL");
    }

    #[test]
    fn test_provider_url() {
        let mut network = NetworkConfig::default();
        assert_eq!(network.provider_url(), "http://localhost:8080");
        network.base_url = "http://api.local:3000/".to_string();
        assert_eq!(network.provider_url(), "http://api.local:3000");
    }
}
