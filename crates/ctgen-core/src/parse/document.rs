use indexmap::IndexMap;
use serde::Deserialize;

use super::operation::{HttpMethod, MediaType, ParsedOperation, RequestBody, Response};
use super::parameter::{Parameter, ParameterOrRef};
use super::schema::SchemaOrRef;
use super::security::{SecurityRequirement, SecurityScheme};
use super::spec::{ParsedSpec, SpecInfo};

/// An OpenAPI 3.x document whose references were already inlined upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,

    pub info: SpecInfo,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Option<Components>,

    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,

    pub get: Option<DocumentOperation>,
    pub post: Option<DocumentOperation>,
    pub put: Option<DocumentOperation>,
    pub delete: Option<DocumentOperation>,
    pub patch: Option<DocumentOperation>,
    pub options: Option<DocumentOperation>,
    pub head: Option<DocumentOperation>,
    pub trace: Option<DocumentOperation>,
}

/// An operation as written in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentOperation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<BodyOrRef>,
    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Body(RequestBody),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

impl OpenApiDocument {
    /// Flatten `paths` into the operation list the generator consumes.
    pub fn into_parsed_spec(self) -> ParsedSpec {
        let mut operations = Vec::new();

        for (path, item) in &self.paths {
            let shared = inline_parameters(path, &item.parameters);

            macro_rules! add_op {
                ($method:expr, $op:expr) => {
                    if let Some(ref op) = $op {
                        operations.push(flatten_operation($method, path, op, &shared));
                    }
                };
            }

            add_op!(HttpMethod::Get, item.get);
            add_op!(HttpMethod::Post, item.post);
            add_op!(HttpMethod::Put, item.put);
            add_op!(HttpMethod::Delete, item.delete);
            add_op!(HttpMethod::Patch, item.patch);
            add_op!(HttpMethod::Options, item.options);
            add_op!(HttpMethod::Head, item.head);
            add_op!(HttpMethod::Trace, item.trace);
        }

        let components = self.components.unwrap_or_default();
        ParsedSpec {
            info: self.info,
            operations,
            schemas: components.schemas,
            security_schemes: components.security_schemes,
            security: self.security,
        }
    }
}

fn flatten_operation(
    method: HttpMethod,
    path: &str,
    op: &DocumentOperation,
    shared: &[Parameter],
) -> ParsedOperation {
    let mut parameters = shared.to_vec();
    for param in inline_parameters(path, &op.parameters) {
        // Operation-level parameters override path-level ones with the same name and location.
        parameters.retain(|p| !(p.name == param.name && p.location == param.location));
        parameters.push(param);
    }

    let request_body = match &op.request_body {
        Some(BodyOrRef::Body(body)) => Some(body.clone()),
        Some(BodyOrRef::Ref { ref_path }) => {
            log::warn!("{method} {path}: dropping unresolved request body reference {ref_path}");
            None
        }
        None => None,
    };

    let mut responses = IndexMap::new();
    for (status, resp) in &op.responses {
        match resp {
            ResponseOrRef::Response(r) => {
                responses.insert(status.clone(), r.clone());
            }
            ResponseOrRef::Ref { ref_path } => {
                log::warn!("{method} {path}: response {status} references {ref_path}, keeping it bodiless");
                responses.insert(
                    status.clone(),
                    Response {
                        description: format!("Reference: {ref_path}"),
                        content: IndexMap::<String, MediaType>::new(),
                        headers: IndexMap::new(),
                    },
                );
            }
        }
    }

    ParsedOperation {
        path: path.to_string(),
        method,
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        tags: op.tags.clone(),
        parameters,
        request_body,
        responses,
        security: op.security.clone(),
        deprecated: op.deprecated,
    }
}

fn inline_parameters(path: &str, params: &[ParameterOrRef]) -> Vec<Parameter> {
    params
        .iter()
        .filter_map(|p| match p {
            ParameterOrRef::Parameter(param) => Some(param.clone()),
            ParameterOrRef::Ref { ref_path } => {
                log::warn!("{path}: dropping unresolved parameter reference {ref_path}");
                None
            }
        })
        .collect()
}
