use indexmap::IndexMap;
use serde::Serialize;

use crate::config::Language;

/// What a generated file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Test,
    Config,
    Build,
    Dependency,
    Setup,
    Documentation,
}

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub language: Language,
    pub description: String,
}

impl GeneratedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        file_type: FileType,
        language: Language,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            file_type,
            language,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Runtime,
    Dev,
    Test,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub scope: DependencyScope,
    pub manager: String,
    pub description: String,
}

impl Dependency {
    pub fn new(name: &str, version: &str, scope: DependencyScope, manager: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            scope,
            manager: manager.to_string(),
            description: description.to_string(),
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self.scope, DependencyScope::Dev | DependencyScope::Test)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructure {
    pub root_dir: String,
    pub test_dir: String,
    pub config_files: Vec<String>,
    pub source_files: Vec<String>,
    pub package_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_file: Option<String>,
}

/// How to run the generated project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    pub language: Language,
    pub framework: String,
    pub package_manager: String,
    pub test_command: String,
    pub mode: String,
    pub environment: IndexMap<String, String>,
}

/// Everything one backend run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutput {
    pub files: Vec<GeneratedFile>,
    pub project_structure: ProjectStructure,
    pub dependencies: Vec<Dependency>,
    pub setup_instructions: Vec<String>,
    pub configuration: ProjectConfiguration,
}

impl GeneratedOutput {
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn files_of(&self, file_type: FileType) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |f| f.file_type == file_type)
    }
}
