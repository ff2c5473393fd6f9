//! Test-case synthesis strategies.
//!
//! Every synthesizer reads one operation's [`SynthesisContext`] and returns
//! the cases of its category. Names follow
//! `<method>_<path>_<category>[_<discriminator>]`.

pub mod auth;
pub mod boundary;
pub mod edge;
pub mod error_case;
pub mod performance;
pub mod rules;
pub mod success;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::analysis::{ResolvedSchema, SecurityRequirementInfo};
use crate::error::SynthesisError;
use crate::ir::{RequestSpec, ResponseSpec, TestCase, TestType};
use crate::mock::{MockDataGenerator, Variation};
use crate::parse::{ParameterLocation, ParsedOperation};

pub use auth::AuthSynthesizer;
pub use boundary::BoundarySynthesizer;
pub use edge::EdgeCaseSynthesizer;
pub use error_case::ErrorCaseSynthesizer;
pub use performance::PerformanceSynthesizer;
pub use rules::{BusinessRule, default_rules};
pub use success::SuccessSynthesizer;

/// Token placed on requests that should pass authentication.
pub const VALID_TOKEN: &str = "valid-test-token";
/// `user:password`, base64-encoded.
pub const VALID_BASIC: &str = "dXNlcjpwYXNzd29yZA==";

/// One category of test-case synthesis.
pub trait Synthesizer {
    fn category(&self) -> TestType;

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError>;
}

/// A parameter together with its analyzed schema.
#[derive(Debug, Clone)]
pub struct ParameterSchema {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: ResolvedSchema,
}

/// Everything synthesizers know about one operation.
#[derive(Debug, Clone)]
pub struct SynthesisContext<'a> {
    pub operation: &'a ParsedOperation,
    pub body: Option<ResolvedSchema>,
    pub parameters: Vec<ParameterSchema>,
    pub success_body: Option<ResolvedSchema>,
    /// Every scheme the operation names, in first-seen order.
    pub security: Vec<SecurityRequirementInfo>,
    /// Requirement alternatives; schemes inside one alternative are all required.
    pub alternatives: Vec<Vec<SecurityRequirementInfo>>,
    /// Concrete values for path parameters, shared by every case.
    pub path_values: IndexMap<String, Value>,
    /// Appended to every name, e.g. `branch2` under per-branch composition.
    pub variant: Option<String>,
}

impl<'a> SynthesisContext<'a> {
    pub fn new(operation: &'a ParsedOperation) -> Self {
        Self {
            operation,
            body: None,
            parameters: Vec::new(),
            success_body: None,
            security: Vec::new(),
            alternatives: Vec::new(),
            path_values: IndexMap::new(),
            variant: None,
        }
    }

    /// Draw concrete path parameter values.
    pub fn fill_path_values(&mut self, mock: &mut MockDataGenerator) {
        for param in self.parameters.iter().filter(|p| p.location == ParameterLocation::Path) {
            let value = mock.generate_realistic_data(&param.name, &param.schema, Variation::Valid);
            self.path_values.insert(param.name.clone(), value);
        }
        for name in template_params(&self.operation.path) {
            self.path_values
                .entry(name)
                .or_insert_with(|| Value::String("1".to_string()));
        }
    }

    /// `post_users`, `get_users_id`, `get_root`.
    pub fn base_name(&self) -> String {
        format!("{}_{}", self.operation.method.as_lower(), path_slug(&self.operation.path))
    }

    /// `<base>_<category>[_<discriminator>][_<variant>]`
    pub fn case_name(&self, category: TestType, discriminator: Option<&str>) -> String {
        let mut name = format!("{}_{}", self.base_name(), category.as_str());
        if let Some(d) = discriminator {
            name.push('_');
            name.push_str(&sanitize(d));
        }
        if let Some(ref v) = self.variant {
            name.push('_');
            name.push_str(v);
        }
        name
    }

    pub fn success_status(&self) -> u16 {
        self.operation.success_status()
    }

    /// Singular resource noun from the last static path segment.
    pub fn resource(&self) -> String {
        let segment = self
            .operation
            .path
            .split('/')
            .rev()
            .find(|s| !s.is_empty() && !s.starts_with('{'))
            .unwrap_or("resource");
        let noun = segment.to_lowercase().replace(['-', '_'], " ");
        noun.strip_suffix('s').map(str::to_string).unwrap_or(noun)
    }

    /// Provider state describing the data a valid request relies on.
    pub fn provider_state(&self) -> Option<String> {
        let resource = self.resource();
        if let Some((name, value)) = self.path_values.first() {
            return Some(format!("{resource} with {name} {} exists", display(value)));
        }
        (self.operation.method == crate::parse::HttpMethod::Get).then(|| format!("{resource} records exist"))
    }

    /// Concrete request path using `overrides` in place of the shared values.
    /// Values are percent-encoded as path segments.
    pub fn concrete_path(&self, overrides: &IndexMap<String, Value>) -> String {
        let mut path = self.operation.path.clone();
        for (name, value) in self.path_values.iter() {
            let value = overrides.get(name).unwrap_or(value);
            path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(&display(value)));
        }
        path
    }

    /// A request that satisfies every constraint.
    ///
    /// `all_params` includes optional query and header parameters; `minimal`
    /// keeps only required body properties.
    pub fn valid_request(&self, mock: &mut MockDataGenerator, all_params: bool, minimal: bool) -> RequestSpec {
        let mut request = RequestSpec::new(self.operation.method, self.concrete_path(&IndexMap::new()));

        for param in &self.parameters {
            if !param.required && !all_params {
                continue;
            }
            match param.location {
                ParameterLocation::Query => {
                    let value = mock.generate_realistic_data(&param.name, &param.schema, Variation::Valid);
                    request.query.insert(param.name.clone(), value);
                }
                ParameterLocation::Header => {
                    let value = mock.generate_realistic_data(&param.name, &param.schema, Variation::Valid);
                    request.headers.insert(param.name.clone(), display(&value));
                }
                ParameterLocation::Path | ParameterLocation::Cookie => {}
            }
        }

        if let Some(ref body) = self.body {
            let value = if minimal {
                mock.generate_minimal("requestBody", body)
            } else {
                mock.generate_realistic_data("requestBody", body, Variation::Valid)
            };
            request.body = Some(value);
            request
                .headers
                .insert("Content-Type".to_string(), "application/json".to_string());
        }

        self.apply_valid_auth(&mut request);
        request
    }

    /// True when some alternative needs no credential at all.
    pub fn allows_anonymous(&self) -> bool {
        self.alternatives.iter().any(Vec::is_empty)
    }

    /// The alternative valid requests satisfy: the first one, or none when
    /// anonymous access is allowed.
    pub fn accepted_schemes(&self) -> &[SecurityRequirementInfo] {
        if self.allows_anonymous() {
            return &[];
        }
        self.alternatives.first().map_or(&[], Vec::as_slice)
    }

    /// The first alternative that names `scheme`.
    pub fn alternative_with(&self, scheme: &str) -> Option<&[SecurityRequirementInfo]> {
        self.alternatives
            .iter()
            .find(|alt| alt.iter().any(|i| i.scheme_name == scheme))
            .map(Vec::as_slice)
    }

    /// Attach a passing credential for every scheme of the accepted alternative.
    pub fn apply_valid_auth(&self, request: &mut RequestSpec) {
        for info in self.accepted_schemes() {
            if let Some(credential) = valid_credential(info) {
                place_credential(request, &credential);
            }
        }
    }

    /// The expected success response with a body drawn from the response schema.
    pub fn success_response(&self, mock: &mut MockDataGenerator) -> ResponseSpec {
        let mut response = ResponseSpec::status(self.success_status());
        if let Some(ref schema) = self.success_body {
            response.body = Some(mock.generate_realistic_data("responseBody", schema, Variation::Valid));
            response
                .headers
                .insert("Content-Type".to_string(), "application/json".to_string());
        }
        response
    }

    /// Every analyzed field a client sends: body properties (recursively) then parameters.
    pub fn request_fields(&self) -> Vec<&ResolvedSchema> {
        let mut fields = Vec::new();
        if let Some(ref body) = self.body {
            if body.constraints.properties.is_empty() {
                fields.push(body);
            } else {
                for prop in body.constraints.properties.values() {
                    prop.walk(&mut |f| {
                        if !f.constraints.read_only {
                            fields.push(f);
                        }
                    });
                }
            }
        }
        for param in &self.parameters {
            if param.location != ParameterLocation::Cookie {
                fields.push(&param.schema);
            }
        }
        fields
    }
}

/// The credential that passes authentication for `info`.
pub fn valid_credential(info: &SecurityRequirementInfo) -> Option<crate::analysis::Credential> {
    let token = match info.kind {
        crate::analysis::CredentialKind::Basic => VALID_BASIC,
        _ => VALID_TOKEN,
    };
    info.credential(token)
}

/// Put a credential on the request, merging cookies.
pub fn place_credential(request: &mut RequestSpec, credential: &crate::analysis::Credential) {
    use crate::analysis::CredentialLocation;
    match credential.location {
        CredentialLocation::Header => {
            request
                .headers
                .insert(credential.name.clone(), credential.value.clone());
        }
        CredentialLocation::Query => {
            request
                .query
                .insert(credential.name.clone(), Value::String(credential.value.clone()));
        }
        CredentialLocation::Cookie => {
            let pair = format!("{}={}", credential.name, credential.value);
            let cookie = match request.headers.get("Cookie") {
                Some(existing) => format!("{existing}; {pair}"),
                None => pair,
            };
            request.headers.insert("Cookie".to_string(), cookie);
        }
    }
}

/// Set (or with `None`, remove) the value at a field path such as
/// `requestBody.address.city`, `query.limit` or `path.id`.
pub fn set_field(ctx: &SynthesisContext<'_>, request: &mut RequestSpec, field_path: &[String], value: Option<Value>) {
    let Some((root, rest)) = field_path.split_first() else {
        return;
    };
    match root.as_str() {
        "requestBody" => {
            if rest.is_empty() {
                request.body = value;
                return;
            }
            let body = request.body.get_or_insert_with(|| Value::Object(Map::new()));
            set_nested(body, rest, value);
        }
        "query" => {
            if let Some(name) = rest.first() {
                match value {
                    Some(v) => {
                        request.query.insert(name.clone(), v);
                    }
                    None => {
                        request.query.shift_remove(name);
                    }
                }
            }
        }
        "header" => {
            if let Some(name) = rest.first() {
                match value {
                    Some(v) => {
                        request.headers.insert(name.clone(), display(&v));
                    }
                    None => {
                        request.headers.shift_remove(name);
                    }
                }
            }
        }
        "path" => {
            if let Some(name) = rest.first() {
                let mut overrides = IndexMap::new();
                let replacement = value.unwrap_or_else(|| Value::String(String::new()));
                overrides.insert(name.clone(), replacement);
                request.path = ctx.concrete_path(&overrides);
            }
        }
        _ => {}
    }
}

fn set_nested(target: &mut Value, path: &[String], value: Option<Value>) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };
    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(head.clone(), v);
            }
            None => {
                map.remove(head);
            }
        }
        return;
    }
    let child = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    set_nested(child, rest, value);
}

/// `/users/{id}/orders` becomes `users_id_orders`; `/` becomes `root`.
pub fn path_slug(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| sanitize(&s.replace(['{', '}'], "").to_lowercase()))
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        "root".to_string()
    } else {
        segments.join("_")
    }
}

/// Replace anything that cannot appear in an identifier with `_`.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Reject operations no synthesizer can work with.
pub fn validate_operation(op: &ParsedOperation) -> Result<(), SynthesisError> {
    let malformed = |reason: String| SynthesisError::MalformedOperation {
        operation: op.label(),
        reason,
    };
    if op.path.trim().is_empty() {
        return Err(malformed("path is empty".to_string()));
    }
    if !op.path.starts_with('/') {
        return Err(malformed(format!("path '{}' does not start with '/'", op.path)));
    }
    for code in op.responses.keys() {
        if !is_status_key(code) {
            return Err(malformed(format!("response key '{code}' is not a status code")));
        }
    }
    Ok(())
}

fn is_status_key(code: &str) -> bool {
    if code == "default" {
        return true;
    }
    let bytes = code.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_digit() || *b == b'X' || *b == b'x')
}

fn template_params(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|s| s.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .map(str::to_string)
        .collect()
}

pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A generic `{error, message}` payload and its key list.
pub(crate) fn default_error_payload(status: u16, message: &str) -> (Value, Vec<String>) {
    let error = match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Error",
    };
    (
        serde_json::json!({"error": error, "message": message}),
        vec!["error".to_string(), "message".to_string()],
    )
}

/// The declared error payload for `status`, or the generic one.
pub(crate) fn error_payload(
    ctx: &SynthesisContext<'_>,
    analyzer: &crate::analysis::SchemaAnalyzer,
    mock: &mut MockDataGenerator,
    status: u16,
    message: &str,
) -> (Value, Vec<String>) {
    let declared = ctx
        .operation
        .response_for(status)
        .and_then(|r| r.json_schema())
        .map(|schema| {
            analyzer
                .analyze_schema(schema, "responseBody", &crate::analysis::AnalysisContext::root())
                .value
        });
    match declared {
        Some(schema) => {
            let body = mock.generate_realistic_data("responseBody", &schema, Variation::Valid);
            let shape = match body {
                Value::Object(ref map) => map.keys().cloned().collect(),
                _ => Vec::new(),
            };
            (body, shape)
        }
        None => default_error_payload(status, message),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::analysis::{AnalysisContext, SchemaAnalyzer};
    use crate::parse::{HttpMethod, Parameter, SchemaOrRef};

    pub fn operation(method: HttpMethod, path: &str, body: Option<Value>) -> ParsedOperation {
        let mut op = ParsedOperation::new(method, path);
        if let Some(schema) = body {
            op.request_body = Some(serde_json::from_value(serde_json::json!({
                "required": true,
                "content": {"application/json": {"schema": schema}}
            })).unwrap());
        }
        op
    }

    pub fn context<'a>(op: &'a ParsedOperation, mock: &mut MockDataGenerator) -> SynthesisContext<'a> {
        let analyzer = SchemaAnalyzer::new();
        let mut ctx = SynthesisContext::new(op);
        ctx.body = op.request_schema().map(|s| {
            analyzer
                .analyze_schema(s, "requestBody", &AnalysisContext::root())
                .value
        });
        ctx.parameters = op
            .parameters
            .iter()
            .map(|p: &Parameter| ParameterSchema {
                name: p.name.clone(),
                location: p.location,
                required: p.required || p.location == ParameterLocation::Path,
                schema: analyzer.analyze_parameter(p).value,
            })
            .collect();
        ctx.success_body = op
            .success_response()
            .and_then(|(_, r)| r.json_schema())
            .map(|s: &SchemaOrRef| {
                analyzer
                    .analyze_schema(s, "responseBody", &AnalysisContext::root())
                    .value
            });
        ctx.fill_path_values(mock);
        ctx
    }
}
