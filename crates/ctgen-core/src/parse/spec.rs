use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::ParsedOperation;
use super::schema::SchemaOrRef;
use super::security::{SecurityRequirement, SecurityScheme};

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecInfo {
    pub title: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A dereferenced API description, flattened to a list of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSpec {
    pub info: SpecInfo,

    #[serde(default)]
    pub operations: Vec<ParsedOperation>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,

    /// Document-level security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl ParsedSpec {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            info: SpecInfo {
                title: title.to_string(),
                version: version.to_string(),
                description: None,
            },
            operations: Vec::new(),
            schemas: IndexMap::new(),
            security_schemes: IndexMap::new(),
            security: Vec::new(),
        }
    }
}
