pub mod document;
pub mod operation;
pub mod parameter;
pub mod schema;
pub mod security;
pub mod spec;

use crate::error::ParseError;
use document::OpenApiDocument;

pub use operation::{HttpMethod, MediaType, ParsedOperation, RequestBody, Response};
pub use parameter::{Parameter, ParameterLocation};
pub use schema::{ExclusiveBound, Schema, SchemaOrRef, SchemaType, TypeSet};
pub use security::{
    ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};
pub use spec::{ParsedSpec, SpecInfo};

/// Parse a dereferenced OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<ParsedSpec, ParseError> {
    let doc: OpenApiDocument = serde_yaml_ng::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc.into_parsed_spec())
}

/// Parse a dereferenced OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<ParsedSpec, ParseError> {
    let doc: OpenApiDocument = serde_json::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc.into_parsed_spec())
}

fn validate_version(doc: &OpenApiDocument) -> Result<(), ParseError> {
    if !doc.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(doc.openapi.clone()));
    }
    if doc.info.title.trim().is_empty() {
        return Err(ParseError::MissingField("info.title".to_string()));
    }
    Ok(())
}
