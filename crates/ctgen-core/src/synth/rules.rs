use serde_json::{Value, json};

use super::{SynthesisContext, default_error_payload, set_field};
use crate::analysis::ResolvedSchema;
use crate::ir::{Expectation, RequestSpec, ResponseSpec, Scenario, TestCase, TestType};
use crate::mock::MockDataGenerator;
use crate::parse::{HttpMethod, ParsedOperation, SchemaType};

/// A business-logic scenario keyed off the shape of an operation.
///
/// Rules see the whole synthesis context so they can reuse the valid request
/// and only perturb what the scenario is about.
pub trait BusinessRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, operation: &ParsedOperation) -> bool;

    fn synthesize(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Vec<TestCase>;
}

/// The rules every `EdgeCaseSynthesizer` starts with.
pub fn default_rules() -> Vec<Box<dyn BusinessRule>> {
    vec![
        Box::new(DuplicateEmailRule),
        Box::new(UnchangedPasswordRule),
        Box::new(InsufficientInventoryRule),
    ]
}

fn path_has(operation: &ParsedOperation, needles: &[&str]) -> bool {
    let path = operation.path.to_lowercase();
    needles.iter().any(|n| path.contains(n))
}

/// Set every object key containing `needle` (case-insensitive), at any depth.
fn override_matching(target: &mut Value, needle: &str, value: &Value) -> usize {
    let mut hits = 0;
    match target {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key.to_lowercase().contains(needle) && !child.is_object() {
                    *child = value.clone();
                    hits += 1;
                } else {
                    hits += override_matching(child, needle, value);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                hits += override_matching(item, needle, value);
            }
        }
        _ => {}
    }
    hits
}

struct RuleCase<'a> {
    discriminator: &'a str,
    status: u16,
    provider_state: String,
    when: String,
    message: &'a str,
}

fn rule_case(ctx: &SynthesisContext<'_>, request: RequestSpec, spec: RuleCase<'_>) -> TestCase {
    let (body, shape) = default_error_payload(spec.status, spec.message);
    let mut response = ResponseSpec::status(spec.status);
    response.body = Some(body);

    let mut scenario = Scenario::new(
        spec.provider_state.clone(),
        spec.when,
        format!("the provider refuses with {}", spec.status),
    );
    scenario.case = Some(spec.discriminator.to_string());
    scenario.expected = Some(Expectation::Invalid);
    scenario.error_code = Some(spec.status);
    scenario.error_shape = shape;

    TestCase::new(
        ctx.case_name(TestType::Edge, Some(spec.discriminator)),
        TestType::Edge,
        request,
        response,
    )
    .with_description(spec.message.to_string())
    .with_scenario(scenario)
    .with_provider_state(spec.provider_state)
    .with_tag("business-rule")
}

/// Registering an email that already exists. Only fires when the request
/// body has an email-format or email-named property.
pub struct DuplicateEmailRule;

const EXISTING_EMAIL: &str = "existing.user@example.com";

fn is_email_field(field: &ResolvedSchema) -> bool {
    field.schema_type == SchemaType::String
        && (field
            .constraints
            .format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("email"))
            || field.field_name().to_lowercase().contains("email"))
}

impl BusinessRule for DuplicateEmailRule {
    fn name(&self) -> &'static str {
        "duplicate-email"
    }

    fn matches(&self, operation: &ParsedOperation) -> bool {
        operation.method == HttpMethod::Post && path_has(operation, &["user", "register", "signup"])
    }

    fn synthesize(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Vec<TestCase> {
        let Some(ref schema) = ctx.body else {
            return Vec::new();
        };
        let mut email_fields = Vec::new();
        schema.walk(&mut |field| {
            if is_email_field(field) {
                email_fields.push(field.context.field_path.clone());
            }
        });
        if email_fields.is_empty() {
            return Vec::new();
        }

        let mut request = ctx.valid_request(mock, false, false);
        for path in &email_fields {
            set_field(ctx, &mut request, path, Some(json!(EXISTING_EMAIL)));
        }
        vec![rule_case(
            ctx,
            request,
            RuleCase {
                discriminator: "duplicate_email",
                status: 409,
                provider_state: format!("a user with email {EXISTING_EMAIL} exists"),
                when: format!("{} is called with the same email", ctx.operation.label()),
                message: "email address is already registered",
            },
        )]
    }
}

/// Changing a password to the value it already has.
pub struct UnchangedPasswordRule;

const CURRENT_PASSWORD: &str = "Current-Passw0rd!";

impl BusinessRule for UnchangedPasswordRule {
    fn name(&self) -> &'static str {
        "unchanged-password"
    }

    fn matches(&self, operation: &ParsedOperation) -> bool {
        operation.method.accepts_body() && path_has(operation, &["password"])
    }

    fn synthesize(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Vec<TestCase> {
        let mut request = ctx.valid_request(mock, false, false);
        match request.body {
            Some(ref mut body) => {
                override_matching(body, "password", &json!(CURRENT_PASSWORD));
            }
            None => {
                request.body = Some(json!({
                    "currentPassword": CURRENT_PASSWORD,
                    "newPassword": CURRENT_PASSWORD
                }));
            }
        }
        vec![rule_case(
            ctx,
            request,
            RuleCase {
                discriminator: "unchanged_password",
                status: 400,
                provider_state: "user password is set".to_string(),
                when: "the new password equals the current one".to_string(),
                message: "new password must differ from the current password",
            },
        )]
    }
}

/// Ordering more units than are in stock.
pub struct InsufficientInventoryRule;

const OVERSIZED_QUANTITY: u64 = 1_000_000;

impl BusinessRule for InsufficientInventoryRule {
    fn name(&self) -> &'static str {
        "insufficient-inventory"
    }

    fn matches(&self, operation: &ParsedOperation) -> bool {
        operation.method == HttpMethod::Post && path_has(operation, &["order", "cart", "checkout"])
    }

    fn synthesize(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Vec<TestCase> {
        let mut request = ctx.valid_request(mock, false, false);
        if let Some(ref mut body) = request.body {
            let quantity = json!(OVERSIZED_QUANTITY);
            if override_matching(body, "quantity", &quantity) == 0 {
                override_matching(body, "qty", &quantity);
            }
        }
        vec![rule_case(
            ctx,
            request,
            RuleCase {
                discriminator: "insufficient_inventory",
                status: 409,
                provider_state: "product stock is below the requested quantity".to_string(),
                when: format!("{} requests {OVERSIZED_QUANTITY} units", ctx.operation.label()),
                message: "insufficient inventory for the requested quantity",
            },
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::test_support;

    #[test]
    fn test_default_rule_matching() {
        let rules = default_rules();
        let matching = |method, path| -> Vec<&'static str> {
            let op = ParsedOperation::new(method, path);
            rules.iter().filter(|r| r.matches(&op)).map(|r| r.name()).collect()
        };
        assert_eq!(matching(HttpMethod::Post, "/users"), vec!["duplicate-email"]);
        assert_eq!(matching(HttpMethod::Get, "/users"), Vec::<&str>::new());
        assert_eq!(matching(HttpMethod::Put, "/users/{id}/password"), vec!["unchanged-password"]);
        assert_eq!(matching(HttpMethod::Post, "/orders"), vec!["insufficient-inventory"]);
    }

    #[test]
    fn test_duplicate_email_overrides_nested_email() {
        let op = test_support::operation(
            HttpMethod::Post,
            "/users",
            Some(json!({
                "type": "object",
                "properties": {
                    "contact": {"type": "object", "properties": {"email": {"type": "string"}}}
                }
            })),
        );
        let mut mock = MockDataGenerator::seeded(4);
        let ctx = test_support::context(&op, &mut mock);
        let cases = DuplicateEmailRule.synthesize(&ctx, &mut mock);
        assert_eq!(cases.len(), 1);
        let case = &cases[0];
        assert_eq!(case.name, "post_users_edge_duplicate_email");
        assert_eq!(case.response.status, 409);
        assert_eq!(case.request.body.as_ref().unwrap()["contact"]["email"], EXISTING_EMAIL);
        assert_eq!(case.scenario.error_shape, vec!["error", "message"]);
    }

    #[test]
    fn test_duplicate_email_needs_an_email_field() {
        let op = test_support::operation(
            HttpMethod::Post,
            "/users",
            Some(json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
            })),
        );
        let mut mock = MockDataGenerator::seeded(4);
        let ctx = test_support::context(&op, &mut mock);
        assert!(DuplicateEmailRule.synthesize(&ctx, &mut mock).is_empty());

        let bodiless = test_support::operation(HttpMethod::Post, "/signup", None);
        let ctx = test_support::context(&bodiless, &mut mock);
        assert!(DuplicateEmailRule.synthesize(&ctx, &mut mock).is_empty());
    }

    #[test]
    fn test_duplicate_email_follows_format() {
        let op = test_support::operation(
            HttpMethod::Post,
            "/register",
            Some(json!({
                "type": "object",
                "properties": {"login": {"type": "string", "format": "email"}}
            })),
        );
        let mut mock = MockDataGenerator::seeded(4);
        let ctx = test_support::context(&op, &mut mock);
        let cases = DuplicateEmailRule.synthesize(&ctx, &mut mock);
        assert_eq!(cases[0].request.body.as_ref().unwrap()["login"], EXISTING_EMAIL);
    }

    #[test]
    fn test_inventory_uses_quantity_field() {
        let op = test_support::operation(
            HttpMethod::Post,
            "/orders",
            Some(json!({
                "type": "object",
                "properties": {"productId": {"type": "string"}, "quantity": {"type": "integer"}}
            })),
        );
        let mut mock = MockDataGenerator::seeded(9);
        let ctx = test_support::context(&op, &mut mock);
        let case = &InsufficientInventoryRule.synthesize(&ctx, &mut mock)[0];
        assert_eq!(case.request.body.as_ref().unwrap()["quantity"], json!(1_000_000));
    }
}
