use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::domain::{DomainHint, DomainType};
use crate::parse::SchemaType;

/// A schema after composition resolution, paired with where it sits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub constraints: Constraints,
    pub context: SchemaContext,
}

/// JSON-Schema constraints with exclusive bounds normalized to numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResolvedSchema>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, ResolvedSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub read_only: bool,
    pub write_only: bool,
}

/// Where a resolved schema sits in the request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaContext {
    pub field_path: Vec<String>,
    pub is_required: bool,
    pub depth: usize,
    pub domain_hints: Vec<DomainHint>,
}

impl SchemaContext {
    /// `requestBody.address.city`
    pub fn path_string(&self) -> String {
        self.field_path.join(".")
    }

    pub fn field_name(&self) -> &str {
        self.field_path.last().map(String::as_str).unwrap_or("")
    }
}

impl ResolvedSchema {
    pub fn path(&self) -> String {
        self.context.path_string()
    }

    pub fn field_name(&self) -> &str {
        self.context.field_name()
    }

    pub fn is_required(&self) -> bool {
        self.context.is_required
    }

    pub fn has_domain(&self, domain: DomainType) -> bool {
        self.context
            .domain_hints
            .iter()
            .any(|h| h.domain_type == domain)
    }

    /// The highest-confidence hint, if any.
    pub fn primary_hint(&self) -> Option<&DomainHint> {
        self.context.domain_hints.first()
    }

    pub fn format(&self) -> Option<&str> {
        self.constraints.format.as_deref()
    }

    /// Depth-first walk over this schema and every nested object property.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ResolvedSchema)) {
        visit(self);
        for prop in self.constraints.properties.values() {
            prop.walk(visit);
        }
    }
}
