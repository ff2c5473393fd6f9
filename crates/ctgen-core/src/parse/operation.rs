use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::{Parameter, ParameterLocation};
use super::schema::SchemaOrRef;
use super::security::SecurityRequirement;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    pub fn as_lower(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Methods a client may safely repeat.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, HttpMethod::Post | HttpMethod::Patch)
    }

    pub fn accepts_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media type entry of a request body or response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

impl RequestBody {
    /// Prefer `application/json`, fall back to the first content type.
    pub fn preferred(&self) -> Option<(&String, &MediaType)> {
        self.content
            .get_key_value("application/json")
            .or_else(|| self.content.first())
    }
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,
}

impl Response {
    pub fn json_schema(&self) -> Option<&SchemaOrRef> {
        self.content
            .get("application/json")
            .or_else(|| self.content.values().next())
            .and_then(|mt| mt.schema.as_ref())
    }
}

/// One HTTP method + path entry of a dereferenced API document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOperation {
    pub path: String,
    pub method: HttpMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    /// `None` inherits the document-level requirement, `Some(vec![])` disables auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default)]
    pub deprecated: bool,
}

impl ParsedOperation {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            path: path.to_string(),
            method,
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: None,
            deprecated: false,
        }
    }

    /// `POST /users`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    pub fn has_path_parameters(&self) -> bool {
        self.parameters_in(ParameterLocation::Path).next().is_some() || self.path.contains('{')
    }

    pub fn request_schema(&self) -> Option<&SchemaOrRef> {
        self.request_body
            .as_ref()
            .and_then(|b| b.preferred())
            .and_then(|(_, mt)| mt.schema.as_ref())
    }

    /// The first declared 2xx status and its response.
    pub fn success_response(&self) -> Option<(u16, &Response)> {
        self.responses.iter().find_map(|(code, resp)| {
            let status: u16 = code.parse().ok()?;
            (200..300).contains(&status).then_some((status, resp))
        })
    }

    pub fn success_status(&self) -> u16 {
        self.success_response().map(|(s, _)| s).unwrap_or(200)
    }

    pub fn declares_status(&self, status: u16) -> bool {
        self.responses.contains_key(&status.to_string())
    }

    pub fn response_for(&self, status: u16) -> Option<&Response> {
        self.responses.get(&status.to_string())
    }
}
