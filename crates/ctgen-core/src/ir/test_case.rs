use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse::HttpMethod;

/// Category of a synthesized test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Success,
    Boundary,
    Edge,
    Auth,
    Error,
    Performance,
}

impl TestType {
    pub const ALL: [TestType; 6] = [
        TestType::Success,
        TestType::Boundary,
        TestType::Edge,
        TestType::Auth,
        TestType::Error,
        TestType::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Success => "success",
            TestType::Boundary => "boundary",
            TestType::Edge => "edge",
            TestType::Auth => "auth",
            TestType::Error => "error",
            TestType::Performance => "performance",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the provider should accept the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    Valid,
    Invalid,
}

/// Given/when/then narrative plus the field-level details of a case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub given: String,
    pub when: String,
    pub then: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expectation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_shape: Vec<String>,
}

impl Scenario {
    pub fn new(given: impl Into<String>, when: impl Into<String>, then: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            when: when.into(),
            then: then.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Concrete path with path parameters filled in.
    pub path: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, Value>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: IndexMap::new(),
            body: None,
            query: IndexMap::new(),
        }
    }

    /// Query parameters rendered as `a=1&b=x`, values unquoted and
    /// percent-encoded.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}={}", urlencoding::encode(k), urlencoding::encode(&value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    pub status: u16,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ResponseSpec {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceKind {
    Load,
    Stress,
    Volume,
    Timeout,
    Concurrency,
    Retry,
}

impl PerformanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceKind::Load => "load",
            PerformanceKind::Stress => "stress",
            PerformanceKind::Volume => "volume",
            PerformanceKind::Timeout => "timeout",
            PerformanceKind::Concurrency => "concurrency",
            PerformanceKind::Retry => "retry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub max_response_time_ms: u64,
    pub p95_ms: u64,
    pub max_error_rate: f64,
}

/// Declarative load profile; backends turn it into executable load logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub kind: PerformanceKind,
    pub concurrency: u32,
    pub duration_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_size: Option<usize>,
    pub thresholds: Thresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_ms: Option<u64>,
}

/// One synthesized contract-test scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub scenario: Scenario,
    pub request: RequestSpec,
    pub response: ResponseSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceConfig>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        test_type: TestType,
        request: RequestSpec,
        response: ResponseSpec,
    ) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            description: String::new(),
            test_type,
            scenario: Scenario::default(),
            request,
            response,
            provider_state: None,
            tags: vec![test_type.as_str().to_string()],
            performance: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_provider_state(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(state.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// True when the expected response is a failure the provider should produce.
    pub fn expects_failure(&self) -> bool {
        !self.response.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_serializes_type_and_camel_case() {
        let case = TestCase::new(
            "get_users_success",
            TestType::Success,
            RequestSpec::new(HttpMethod::Get, "/users"),
            ResponseSpec::status(200),
        )
        .with_provider_state("users exist");
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["providerState"], "users exist");
        assert_eq!(json["request"]["method"], "GET");
        assert_eq!(json["tags"], serde_json::json!(["success"]));
        assert!(json.get("performance").is_none());
    }

    #[test]
    fn test_query_string() {
        let mut request = RequestSpec::new(HttpMethod::Get, "/users");
        request.query.insert("limit".to_string(), serde_json::json!(10));
        request.query.insert("q".to_string(), serde_json::json!("ann"));
        assert_eq!(request.query_string(), "limit=10&q=ann");
    }

    #[test]
    fn test_query_string_is_encoded() {
        let mut request = RequestSpec::new(HttpMethod::Get, "/search");
        request.query.insert("q".to_string(), serde_json::json!("tom & jerry's"));
        request.query.insert("sort by".to_string(), serde_json::json!("name"));
        assert_eq!(request.query_string(), "q=tom%20%26%20jerry%27s&sort%20by=name");
    }
}
