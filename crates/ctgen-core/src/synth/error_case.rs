use indexmap::IndexMap;
use serde_json::{Value, json};

use super::{SynthesisContext, Synthesizer, display, error_payload};
use crate::analysis::SchemaAnalyzer;
use crate::error::SynthesisError;
use crate::ir::{Expectation, RequestSpec, ResponseSpec, Scenario, TestCase, TestType};
use crate::mock::{MockDataGenerator, Variation};
use crate::parse::{HttpMethod, ParameterLocation, SchemaType};

const RETRY_AFTER_SECS: &str = "60";

/// Not-found, conflict, validation, rate-limit and server-error responses.
#[derive(Default)]
pub struct ErrorCaseSynthesizer {
    analyzer: SchemaAnalyzer,
}

impl ErrorCaseSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

struct ErrorScenario {
    discriminator: &'static str,
    status: u16,
    request: RequestSpec,
    provider_state: Option<String>,
    when: String,
    message: &'static str,
}

impl Synthesizer for ErrorCaseSynthesizer {
    fn category(&self) -> TestType {
        TestType::Error
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        let op = ctx.operation;
        let label = op.label();
        let resource = ctx.resource();
        let mut scenarios = Vec::new();

        if !ctx.path_values.is_empty() || op.declares_status(404) {
            let mut overrides = IndexMap::new();
            for name in ctx.path_values.keys() {
                overrides.insert(name.clone(), self.missing_value(ctx, name));
            }
            let mut request = ctx.valid_request(mock, false, false);
            request.path = ctx.concrete_path(&overrides);
            let state = match overrides.first() {
                Some((name, value)) => format!("{resource} with {name} {} does not exist", display(value)),
                None => format!("{resource} does not exist"),
            };
            scenarios.push(ErrorScenario {
                discriminator: "not_found",
                status: 404,
                request,
                provider_state: Some(state),
                when: format!("{label} targets a missing {resource}"),
                message: "resource not found",
            });
        }

        if op.method == HttpMethod::Post || op.declares_status(409) {
            scenarios.push(ErrorScenario {
                discriminator: "conflict",
                status: 409,
                request: ctx.valid_request(mock, false, false),
                provider_state: Some(format!("{resource} already exists")),
                when: format!("{label} would create a duplicate {resource}"),
                message: "resource already exists",
            });
        }

        if let Some(request) = self.invalid_request(ctx, mock) {
            let status = if op.declares_status(422) { 422 } else { 400 };
            scenarios.push(ErrorScenario {
                discriminator: "validation",
                status,
                request,
                provider_state: ctx.provider_state(),
                when: format!("{label} is called with invalid input"),
                message: "request validation failed",
            });
        }

        scenarios.push(ErrorScenario {
            discriminator: "rate_limited",
            status: 429,
            request: ctx.valid_request(mock, false, false),
            provider_state: Some("the client has exceeded its rate limit".to_string()),
            when: format!("{label} is called once more"),
            message: "too many requests",
        });

        scenarios.push(ErrorScenario {
            discriminator: "server_error",
            status: 500,
            request: ctx.valid_request(mock, false, false),
            provider_state: Some("the provider encounters an internal error".to_string()),
            when: format!("{label} is called"),
            message: "internal server error",
        });

        Ok(scenarios
            .into_iter()
            .map(|s| self.error_case(ctx, mock, s))
            .collect())
    }
}

impl ErrorCaseSynthesizer {
    fn missing_value(&self, ctx: &SynthesisContext<'_>, name: &str) -> Value {
        let numeric = ctx
            .parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Path && p.name == name)
            .is_some_and(|p| p.schema.schema_type.is_numeric());
        if numeric {
            json!(999_999_999)
        } else {
            json!(format!("nonexistent-{}", name.to_lowercase()))
        }
    }

    /// A request the provider must reject: a body violating its schema, or a
    /// required query parameter left out.
    fn invalid_request(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Option<RequestSpec> {
        let mut request = ctx.valid_request(mock, false, false);
        if let Some(ref body) = ctx.body {
            let invalid = mock.generate_realistic_data("requestBody", body, Variation::Invalid);
            request.body = Some(match invalid {
                Value::Object(ref map) if map.is_empty() && body.schema_type == SchemaType::Object => {
                    json!("not-an-object")
                }
                other => other,
            });
            return Some(request);
        }
        let required = ctx
            .parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Query && p.required)?;
        request.query.shift_remove(&required.name);
        Some(request)
    }

    fn error_case(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator, s: ErrorScenario) -> TestCase {
        let (body, shape) = error_payload(ctx, &self.analyzer, mock, s.status, s.message);
        let mut response = ResponseSpec::status(s.status);
        response.body = Some(body);
        response
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        if s.status == 429 {
            response
                .headers
                .insert("Retry-After".to_string(), RETRY_AFTER_SECS.to_string());
        }

        let mut scenario = Scenario::new(
            s.provider_state.clone().unwrap_or_else(|| "the provider is available".to_string()),
            s.when,
            format!("it responds with {} and an error payload", s.status),
        );
        scenario.case = Some(s.discriminator.to_string());
        scenario.expected = Some(Expectation::Invalid);
        scenario.error_code = Some(s.status);
        scenario.error_shape = shape;

        let mut case = TestCase::new(
            ctx.case_name(TestType::Error, Some(s.discriminator)),
            TestType::Error,
            s.request,
            response,
        )
        .with_description(format!("{}: {}", ctx.operation.label(), s.message))
        .with_scenario(scenario);
        if let Some(state) = s.provider_state {
            case = case.with_provider_state(state);
        }
        case
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::test_support;

    fn names(cases: &[TestCase]) -> Vec<&str> {
        cases.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_get_by_id() {
        let mut op = test_support::operation(HttpMethod::Get, "/users/{id}", None);
        op.parameters = serde_json::from_value(json!([
            {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}
        ]))
        .unwrap();
        let mut mock = MockDataGenerator::seeded(6);
        let ctx = test_support::context(&op, &mut mock);
        let cases = ErrorCaseSynthesizer::new().synthesize(&ctx, &mut mock).unwrap();
        assert_eq!(
            names(&cases),
            vec!["get_users_id_error_not_found", "get_users_id_error_rate_limited", "get_users_id_error_server_error"]
        );
        assert_eq!(cases[0].request.path, "/users/999999999");
        assert_eq!(
            cases[0].provider_state.as_deref(),
            Some("user with id 999999999 does not exist")
        );
        assert_eq!(cases[1].response.headers["Retry-After"], "60");
    }

    #[test]
    fn test_post_with_declared_422() {
        let mut op = test_support::operation(
            HttpMethod::Post,
            "/users",
            Some(json!({
                "type": "object",
                "required": ["email"],
                "properties": {"email": {"type": "string", "format": "email"}}
            })),
        );
        op.responses.insert("422".to_string(), Default::default());
        let mut mock = MockDataGenerator::seeded(6);
        let ctx = test_support::context(&op, &mut mock);
        let cases = ErrorCaseSynthesizer::new().synthesize(&ctx, &mut mock).unwrap();
        assert_eq!(
            names(&cases),
            vec![
                "post_users_error_conflict",
                "post_users_error_validation",
                "post_users_error_rate_limited",
                "post_users_error_server_error"
            ]
        );
        let validation = &cases[1];
        assert_eq!(validation.response.status, 422);
        assert_eq!(validation.request.body.as_ref().unwrap()["email"], "not-an-email");
        assert_eq!(validation.scenario.error_shape, vec!["error", "message"]);
    }

    #[test]
    fn test_required_query_removed_for_validation() {
        let mut op = test_support::operation(HttpMethod::Get, "/search", None);
        op.parameters = serde_json::from_value(json!([
            {"name": "q", "in": "query", "required": true, "schema": {"type": "string"}}
        ]))
        .unwrap();
        let mut mock = MockDataGenerator::seeded(6);
        let ctx = test_support::context(&op, &mut mock);
        let cases = ErrorCaseSynthesizer::new().synthesize(&ctx, &mut mock).unwrap();
        let validation = cases.iter().find(|c| c.name == "get_search_error_validation").unwrap();
        assert_eq!(validation.response.status, 400);
        assert!(validation.request.query.is_empty());
    }
}
