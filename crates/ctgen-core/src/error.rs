use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("malformed operation {operation}: {reason}")]
    MalformedOperation { operation: String, reason: String },
}

/// One problem found while validating a `LanguageConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ConfigIssue {
    pub fn new(field: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code: code.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("unsupported language '{language}', expected one of: {}", .valid.join(", "))]
    UnsupportedLanguage { language: String, valid: Vec<String> },

    #[error("invalid configuration: {}", format_issues(.0))]
    InvalidConfiguration(Vec<ConfigIssue>),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("template rendering failed: {0}")]
    Template(String),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({}): {}", i.field, i.code, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}
