use regex::Regex;
use serde_json::{Number, Value, json};

use super::{SynthesisContext, Synthesizer, set_field};
use crate::analysis::{BoundaryTarget, ResolvedSchema, get_boundary_values};
use crate::error::SynthesisError;
use crate::ir::{Expectation, RequestSpec, ResponseSpec, Scenario, TestCase, TestType};
use crate::mock::{MAX_GENERATED_LENGTH, MockDataGenerator, Variation, invalid_format_value};
use crate::parse::{ParameterLocation, SchemaType};

/// Status expected when the provider rejects a boundary violation.
pub const VALIDATION_STATUS: u16 = 400;

const PATTERN_CANDIDATES: &[&str] = &["!!!invalid!!!", "", " ", "0", "ZZZZ", "a"];

/// Item-count limits above this are not materialized as boundary arrays.
const MAX_BOUNDARY_ITEMS: usize = 1000;

/// One mutation of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCase {
    pub suffix: String,
    /// `None` removes the field from the request.
    pub value: Option<Value>,
    pub valid: bool,
}

impl FieldCase {
    pub fn new(suffix: impl Into<String>, value: Option<Value>, valid: bool) -> Self {
        Self {
            suffix: suffix.into(),
            value,
            valid,
        }
    }
}

/// Limits, nulls, type corruption, pattern and format violations per field.
pub struct BoundarySynthesizer;

impl Synthesizer for BoundarySynthesizer {
    fn category(&self) -> TestType {
        TestType::Boundary
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        let base = ctx.valid_request(mock, false, false);
        // Optional parameters are only exercised on a request that sends them.
        let with_optional = ctx
            .parameters
            .iter()
            .any(|p| !p.required && p.location != ParameterLocation::Cookie)
            .then(|| ctx.valid_request(mock, true, false));
        let mut cases = Vec::new();

        for field in ctx.request_fields() {
            let request = match with_optional {
                Some(ref full) if is_optional_parameter(field) => full,
                _ => &base,
            };
            for field_case in field_cases(field, mock) {
                cases.push(field_test_case(ctx, request, field, field_case, TestType::Boundary));
            }
        }
        Ok(cases)
    }
}

fn is_optional_parameter(field: &ResolvedSchema) -> bool {
    !field.is_required()
        && field
            .context
            .field_path
            .first()
            .is_some_and(|root| root == "query" || root == "header")
}

/// A boundary length or count small enough to build, or `None` past `ceiling`.
fn materializable(value: f64, ceiling: usize) -> Option<usize> {
    (0.0..=ceiling as f64).contains(&value).then_some(value as usize)
}

/// Apply one field mutation to `base` and describe the expected outcome.
pub(super) fn field_test_case(
    ctx: &SynthesisContext<'_>,
    base: &RequestSpec,
    field: &ResolvedSchema,
    field_case: FieldCase,
    category: TestType,
) -> TestCase {
    let path = field.path();
    let case_id = format!("{path}_{}", field_case.suffix);

    let mut request = base.clone();
    set_field(ctx, &mut request, &field.context.field_path, field_case.value.clone());

    let (status, expected) = if field_case.valid {
        (ctx.success_status(), Expectation::Valid)
    } else {
        (VALIDATION_STATUS, Expectation::Invalid)
    };
    let readable = field_case.suffix.replace('_', " ");
    let outcome = if field_case.valid { "accepts" } else { "rejects" };

    let mut scenario = Scenario::new(
        format!("{} expects {path}", ctx.operation.label()),
        format!("{path} is sent as {readable}"),
        format!("the provider {outcome} it with {status}"),
    );
    scenario.field = Some(path.clone());
    scenario.case = Some(case_id.clone());
    scenario.value = Some(field_case.value.unwrap_or(Value::Null));
    scenario.expected = Some(expected);
    scenario.error_code = (!field_case.valid).then_some(VALIDATION_STATUS);

    let mut case = TestCase::new(
        ctx.case_name(category, Some(&case_id)),
        category,
        request,
        ResponseSpec::status(status),
    )
    .with_description(format!("{path}: {readable}"))
    .with_scenario(scenario);
    if let Some(state) = ctx.provider_state() {
        case = case.with_provider_state(state);
    }
    case
}

/// Every boundary mutation for one field.
pub fn field_cases(field: &ResolvedSchema, mock: &mut MockDataGenerator) -> Vec<FieldCase> {
    let in_body = field
        .context
        .field_path
        .first()
        .is_some_and(|root| root == "requestBody");
    let c = &field.constraints;
    let mut cases = Vec::new();

    match (in_body, field.is_required()) {
        (true, true) => cases.push(FieldCase::new("null_required", Some(Value::Null), false)),
        (true, false) => cases.push(FieldCase::new("null_optional", Some(Value::Null), c.nullable)),
        (false, true) => cases.push(FieldCase::new("missing_required", None, false)),
        (false, false) => cases.push(FieldCase::new("missing_optional", None, true)),
    }

    if in_body {
        cases.extend(type_mismatches(field.schema_type));
    } else if field.schema_type != SchemaType::String {
        cases.push(FieldCase::new("type_string", Some(json!("type_mismatch")), false));
    }

    match field.schema_type {
        SchemaType::Integer | SchemaType::Number => {
            let integer = field.schema_type == SchemaType::Integer;
            for bound in get_boundary_values(c, integer) {
                if bound.target == BoundaryTarget::Value {
                    cases.push(FieldCase::new(bound.label, Some(number(bound.value, integer)), bound.valid));
                }
            }
            cases.extend(multiple_of_cases(field, integer));
        }
        SchemaType::String => {
            for bound in get_boundary_values(c, false) {
                if bound.target != BoundaryTarget::Length {
                    continue;
                }
                let Some(len) = materializable(bound.value, MAX_GENERATED_LENGTH) else {
                    log::debug!("{}: skipping {} of {} characters", field.path(), bound.label, bound.value);
                    continue;
                };
                let text = mock.string_of_length(len);
                cases.push(FieldCase::new(bound.label, Some(Value::String(text)), bound.valid));
            }
            if let Some(ref pattern) = c.pattern {
                match Regex::new(pattern) {
                    Ok(re) => {
                        if let Some(candidate) = PATTERN_CANDIDATES.iter().find(|s| !re.is_match(s)) {
                            cases.push(FieldCase::new("pattern_mismatch", Some(json!(candidate)), false));
                        }
                    }
                    Err(e) => log::warn!("{}: pattern '{pattern}' does not compile: {e}", field.path()),
                }
            }
            if let Some(bad) = c.format.as_deref().and_then(invalid_format_value) {
                cases.push(FieldCase::new("format_invalid", Some(json!(bad)), false));
            }
        }
        SchemaType::Array => {
            for bound in get_boundary_values(c, false) {
                if bound.target != BoundaryTarget::Items {
                    continue;
                }
                let Some(count) = materializable(bound.value, MAX_BOUNDARY_ITEMS) else {
                    log::debug!("{}: skipping {} of {} items", field.path(), bound.label, bound.value);
                    continue;
                };
                let items = (0..count)
                    .map(|_| match c.items {
                        Some(ref item) => mock.generate_realistic_data(item.field_name(), item, Variation::Valid),
                        None => json!("item"),
                    })
                    .collect();
                cases.push(FieldCase::new(bound.label, Some(Value::Array(items)), bound.valid));
            }
        }
        SchemaType::Object | SchemaType::Boolean | SchemaType::Null => {}
    }

    cases
}

fn type_mismatches(own: SchemaType) -> Vec<FieldCase> {
    if own == SchemaType::Null {
        return Vec::new();
    }
    let corruptions = [
        (SchemaType::String, json!("type_mismatch")),
        (SchemaType::Number, json!(12345.67)),
        (SchemaType::Integer, json!(42)),
        (SchemaType::Boolean, json!(true)),
        (SchemaType::Array, json!(["unexpected"])),
        (SchemaType::Object, json!({"unexpected": "value"})),
    ];
    corruptions
        .into_iter()
        .filter(|(t, _)| *t != own && !(own == SchemaType::Number && *t == SchemaType::Integer))
        .map(|(t, value)| FieldCase::new(format!("type_{}", t.as_str()), Some(value), false))
        .collect()
}

fn multiple_of_cases(field: &ResolvedSchema, integer: bool) -> Vec<FieldCase> {
    let c = &field.constraints;
    let Some(m) = c.multiple_of.filter(|m| *m > 0.0 && m.is_finite()) else {
        return Vec::new();
    };
    // Smallest multiple at or above the minimum, then strictly above the exclusive minimum.
    let mut valid = c.minimum.map_or(0.0, |min| (min / m).ceil() * m);
    if let Some(ex) = c.exclusive_minimum
        && valid <= ex
    {
        valid = ((ex / m).floor() + 1.0) * m;
        if valid <= ex {
            valid += m;
        }
    }
    let too_high = c.maximum.is_some_and(|max| valid > max) || c.exclusive_maximum.is_some_and(|ex| valid >= ex);
    if too_high || !valid.is_finite() {
        log::debug!("{}: no multiple of {m} fits the declared range", field.path());
        return Vec::new();
    }
    let mut cases = vec![FieldCase::new("multiple_of_valid", Some(number(valid, integer)), true)];
    if !(integer && m < 2.0) {
        let off = if integer { (m / 2.0).floor().max(1.0) } else { m / 2.0 };
        cases.push(FieldCase::new("multiple_of_invalid", Some(number(valid + off, integer)), false));
    }
    cases
}

fn number(value: f64, integer: bool) -> Value {
    if integer {
        json!(value.round() as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}
