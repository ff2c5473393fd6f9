use heck::ToSnakeCase;

use super::{SynthesisContext, Synthesizer, error_payload, place_credential, valid_credential};
use crate::analysis::{CredentialKind, CredentialLocation, SchemaAnalyzer, SecurityRequirementInfo};
use crate::error::SynthesisError;
use crate::ir::{Expectation, RequestSpec, ResponseSpec, Scenario, TestCase, TestType};
use crate::mock::MockDataGenerator;

const INVALID_TOKEN: &str = "invalid-test-token";
const EXPIRED_TOKEN: &str = "expired-test-token";
const UNDERSCOPED_TOKEN: &str = "insufficient-scope-token";
/// `invalid:invalid`, base64-encoded.
const INVALID_BASIC: &str = "aW52YWxpZDppbnZhbGlk";

/// Missing, invalid, expired and under-scoped credentials per required scheme.
///
/// Each case varies one scheme and keeps valid credentials for the other
/// schemes of the first alternative that names it.
#[derive(Default)]
pub struct AuthSynthesizer {
    analyzer: SchemaAnalyzer,
}

impl AuthSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Synthesizer for AuthSynthesizer {
    fn category(&self) -> TestType {
        TestType::Auth
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        if ctx.security.is_empty() || ctx.allows_anonymous() {
            return Ok(Vec::new());
        }

        let mut anonymous = ctx.valid_request(mock, false, false);
        for info in &ctx.security {
            strip_credential(&mut anonymous, info);
        }

        let mut cases = Vec::new();
        for info in &ctx.security {
            if info.kind == CredentialKind::MutualTls {
                log::debug!(
                    "{}: {} uses mutual TLS, no request-level auth cases",
                    ctx.operation.label(),
                    info.scheme_name
                );
                continue;
            }
            let mut base = anonymous.clone();
            for other in ctx
                .alternative_with(&info.scheme_name)
                .unwrap_or_default()
                .iter()
                .filter(|o| o.scheme_name != info.scheme_name)
            {
                if let Some(credential) = valid_credential(other) {
                    place_credential(&mut base, &credential);
                }
            }
            let scheme = info.scheme_name.to_snake_case();
            let (invalid, expired) = match info.kind {
                CredentialKind::Basic => (INVALID_BASIC, INVALID_BASIC),
                _ => (INVALID_TOKEN, EXPIRED_TOKEN),
            };

            let variants = [
                ("missing", None, "no credential"),
                ("invalid", Some(invalid), "an invalid credential"),
                ("expired", Some(expired), "an expired credential"),
            ];
            for (suffix, token, sent) in variants {
                let mut request = base.clone();
                if let Some(credential) = token.and_then(|t| info.credential(t)) {
                    place_credential(&mut request, &credential);
                }
                cases.push(self.auth_case(ctx, mock, info, request, &format!("{scheme}_{suffix}"), 401, sent));
            }

            if !info.scopes.is_empty() {
                let mut request = base.clone();
                if let Some(credential) = info.credential(UNDERSCOPED_TOKEN) {
                    place_credential(&mut request, &credential);
                }
                let sent = format!("a credential lacking {}", info.scopes.join(", "));
                cases.push(self.auth_case(
                    ctx,
                    mock,
                    info,
                    request,
                    &format!("{scheme}_insufficient_scope"),
                    403,
                    &sent,
                ));
            }
        }
        Ok(cases)
    }
}

impl AuthSynthesizer {
    #[allow(clippy::too_many_arguments)]
    fn auth_case(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
        info: &SecurityRequirementInfo,
        request: RequestSpec,
        discriminator: &str,
        status: u16,
        sent: &str,
    ) -> TestCase {
        let message = if status == 403 {
            "insufficient scope"
        } else {
            "authentication required"
        };
        let (body, shape) = error_payload(ctx, &self.analyzer, mock, status, message);
        let mut response = ResponseSpec::status(status);
        response.body = Some(body);

        let mut scenario = Scenario::new(
            format!("{} requires {} ({})", ctx.operation.label(), info.scheme_name, info.kind.label()),
            format!("the request carries {sent}"),
            format!("the provider responds with {status}"),
        );
        scenario.case = Some(discriminator.to_string());
        scenario.expected = Some(Expectation::Invalid);
        scenario.error_code = Some(status);
        scenario.error_shape = shape;

        let mut case = TestCase::new(
            ctx.case_name(TestType::Auth, Some(discriminator)),
            TestType::Auth,
            request,
            response,
        )
        .with_description(format!("{}: rejects {sent}", ctx.operation.label()))
        .with_scenario(scenario)
        .with_tag(info.kind.label());
        if let Some(state) = ctx.provider_state() {
            case = case.with_provider_state(state);
        }
        case
    }
}

/// Remove whatever credential `info` would place.
fn strip_credential(request: &mut RequestSpec, info: &SecurityRequirementInfo) {
    let Some(credential) = info.credential("") else {
        return;
    };
    match credential.location {
        CredentialLocation::Header => {
            request.headers.shift_remove(&credential.name);
        }
        CredentialLocation::Query => {
            request.query.shift_remove(&credential.name);
        }
        CredentialLocation::Cookie => {
            let Some(cookie) = request.headers.shift_remove("Cookie") else {
                return;
            };
            let prefix = format!("{}=", credential.name);
            let kept: Vec<&str> = cookie
                .split("; ")
                .filter(|pair| !pair.starts_with(&prefix))
                .collect();
            if !kept.is_empty() {
                request.headers.insert("Cookie".to_string(), kept.join("; "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ApiKeyLocation, HttpMethod};
    use crate::synth::test_support;
    use serde_json::json;

    fn bearer(scopes: &[&str]) -> SecurityRequirementInfo {
        SecurityRequirementInfo {
            scheme_name: "bearerAuth".to_string(),
            kind: CredentialKind::Bearer,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            declared: true,
        }
    }

    fn run(infos: Vec<SecurityRequirementInfo>) -> Vec<TestCase> {
        let op = test_support::operation(HttpMethod::Get, "/users", None);
        let mut mock = MockDataGenerator::seeded(2);
        let mut ctx = test_support::context(&op, &mut mock);
        ctx.alternatives = vec![infos.clone()];
        ctx.security = infos;
        AuthSynthesizer::new().synthesize(&ctx, &mut mock).unwrap()
    }

    #[test]
    fn test_bearer_with_scopes() {
        let cases = run(vec![bearer(&["users:read"])]);
        let summary: Vec<(&str, u16)> = cases.iter().map(|c| (c.name.as_str(), c.response.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("get_users_auth_bearer_auth_missing", 401),
                ("get_users_auth_bearer_auth_invalid", 401),
                ("get_users_auth_bearer_auth_expired", 401),
                ("get_users_auth_bearer_auth_insufficient_scope", 403),
            ]
        );
        assert!(!cases[0].request.headers.contains_key("Authorization"));
        assert_eq!(cases[1].request.headers["Authorization"], "Bearer invalid-test-token");
        assert_eq!(cases[3].scenario.error_shape, vec!["error", "message"]);
    }

    #[test]
    fn test_no_scopes_no_403() {
        let cases = run(vec![bearer(&[])]);
        assert_eq!(cases.len(), 3);
        assert!(cases.iter().all(|c| c.response.status == 401));
    }

    #[test]
    fn test_empty_security_disables_auth() {
        assert!(run(Vec::new()).is_empty());
    }

    fn api_key_header() -> SecurityRequirementInfo {
        SecurityRequirementInfo {
            scheme_name: "apiKey".to_string(),
            kind: CredentialKind::ApiKey {
                name: "X-API-Key".to_string(),
                location: ApiKeyLocation::Header,
            },
            scopes: Vec::new(),
            declared: true,
        }
    }

    #[test]
    fn test_combined_requirement_varies_one_scheme_at_a_time() {
        let cases = run(vec![bearer(&[]), api_key_header()]);
        assert_eq!(cases.len(), 6);
        let bearer_missing = &cases[0];
        assert!(!bearer_missing.request.headers.contains_key("Authorization"));
        assert_eq!(bearer_missing.request.headers["X-API-Key"], "valid-test-token");
        let key_invalid = cases
            .iter()
            .find(|c| c.name == "get_users_auth_api_key_invalid")
            .unwrap();
        assert_eq!(key_invalid.request.headers["X-API-Key"], "invalid-test-token");
        assert_eq!(key_invalid.request.headers["Authorization"], "Bearer valid-test-token");
    }

    #[test]
    fn test_alternatives_do_not_borrow_credentials() {
        let op = test_support::operation(HttpMethod::Get, "/users", None);
        let mut mock = MockDataGenerator::seeded(2);
        let mut ctx = test_support::context(&op, &mut mock);
        ctx.security = vec![bearer(&[]), api_key_header()];
        ctx.alternatives = vec![vec![bearer(&[])], vec![api_key_header()]];
        let cases = AuthSynthesizer::new().synthesize(&ctx, &mut mock).unwrap();
        assert_eq!(cases.len(), 6);
        assert!(cases.iter().all(|c| c.request.headers.len() <= 1));
    }

    #[test]
    fn test_anonymous_alternative_disables_auth() {
        let op = test_support::operation(HttpMethod::Get, "/users", None);
        let mut mock = MockDataGenerator::seeded(2);
        let mut ctx = test_support::context(&op, &mut mock);
        ctx.security = vec![bearer(&[])];
        ctx.alternatives = vec![vec![bearer(&[])], Vec::new()];
        assert!(AuthSynthesizer::new().synthesize(&ctx, &mut mock).unwrap().is_empty());
    }

    #[test]
    fn test_api_key_in_query_and_mtls_skipped() {
        let cases = run(vec![
            SecurityRequirementInfo {
                scheme_name: "apiKey".to_string(),
                kind: CredentialKind::ApiKey {
                    name: "api_key".to_string(),
                    location: ApiKeyLocation::Query,
                },
                scopes: Vec::new(),
                declared: true,
            },
            SecurityRequirementInfo {
                scheme_name: "mtls".to_string(),
                kind: CredentialKind::MutualTls,
                scopes: Vec::new(),
                declared: true,
            },
        ]);
        assert_eq!(cases.len(), 3);
        assert!(!cases[0].request.query.contains_key("api_key"));
        assert_eq!(cases[2].request.query["api_key"], json!("expired-test-token"));
    }

    #[test]
    fn test_declared_401_schema_shapes_payload() {
        let mut op = test_support::operation(HttpMethod::Get, "/users", None);
        op.responses.insert(
            "401".to_string(),
            serde_json::from_value(json!({
                "description": "unauthorized",
                "content": {"application/json": {"schema": {
                    "type": "object",
                    "required": ["code", "detail"],
                    "properties": {"code": {"type": "integer"}, "detail": {"type": "string"}}
                }}}
            }))
            .unwrap(),
        );
        let mut mock = MockDataGenerator::seeded(3);
        let mut ctx = test_support::context(&op, &mut mock);
        ctx.security = vec![bearer(&[])];
        ctx.alternatives = vec![ctx.security.clone()];
        let cases = AuthSynthesizer::new().synthesize(&ctx, &mut mock).unwrap();
        assert_eq!(cases[0].scenario.error_shape, vec!["code", "detail"]);
    }
}
