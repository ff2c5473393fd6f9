use chrono::{FixedOffset, NaiveDate, SecondsFormat, TimeZone};
use serde_json::{Value, json};

use super::boundary::{FieldCase, field_test_case};
use super::rules::{BusinessRule, default_rules};
use super::{SynthesisContext, Synthesizer};
use crate::analysis::{DomainType, ResolvedSchema};
use crate::error::SynthesisError;
use crate::ir::{TestCase, TestType};
use crate::mock::{MockDataGenerator, Variation};
use crate::parse::SchemaType;

/// Which temporal wire form a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Date,
    DateTime,
}

/// Enum, temporal, currency and locale edge cases plus business rules.
pub struct EdgeCaseSynthesizer {
    rules: Vec<Box<dyn BusinessRule>>,
}

impl Default for EdgeCaseSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeCaseSynthesizer {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// No business rules at all.
    pub fn without_rules() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Box<dyn BusinessRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl Synthesizer for EdgeCaseSynthesizer {
    fn category(&self) -> TestType {
        TestType::Edge
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        let base = ctx.valid_request(mock, false, false);
        let mut cases = Vec::new();

        for field in ctx.request_fields() {
            let mut field_cases = enum_cases(field, mock);
            field_cases.extend(temporal_cases(field));
            field_cases.extend(currency_cases(field));
            field_cases.extend(locale_cases(field));
            for field_case in field_cases {
                cases.push(field_test_case(ctx, &base, field, field_case, TestType::Edge));
            }
        }

        for rule in self.rules.iter().filter(|r| r.matches(ctx.operation)) {
            log::debug!("{}: applying business rule {}", ctx.operation.label(), rule.name());
            cases.extend(rule.synthesize(ctx, mock));
        }
        Ok(cases)
    }
}

fn in_body(field: &ResolvedSchema) -> bool {
    field
        .context
        .field_path
        .first()
        .is_some_and(|root| root == "requestBody")
}

fn has_specific(field: &ResolvedSchema, specific: &str) -> bool {
    field
        .context
        .domain_hints
        .iter()
        .any(|h| h.specific_type.as_deref() == Some(specific))
}

fn enum_cases(field: &ResolvedSchema, mock: &mut MockDataGenerator) -> Vec<FieldCase> {
    let values = &field.constraints.enum_values;
    if values.is_empty() {
        return Vec::new();
    }
    let mut cases = vec![FieldCase::new(
        "enum_invalid",
        Some(mock.generate_realistic_data(field.field_name(), field, Variation::Invalid)),
        false,
    )];

    let recased = values.iter().find_map(|v| {
        let s = v.as_str()?;
        let upper = s.to_uppercase();
        let flipped = if upper != s { upper } else { s.to_lowercase() };
        (flipped != s && !values.contains(&json!(flipped))).then_some(flipped)
    });
    if let Some(recased) = recased {
        cases.push(FieldCase::new("enum_case", Some(json!(recased)), false));
    }

    if in_body(field) {
        let allowed = field.constraints.nullable || values.contains(&Value::Null);
        cases.push(FieldCase::new("enum_null", Some(Value::Null), allowed));
    }
    cases
}

fn temporal_kind(field: &ResolvedSchema) -> Option<Temporal> {
    if field.schema_type != SchemaType::String || !field.constraints.enum_values.is_empty() {
        return None;
    }
    match field.format() {
        Some("date") => Some(Temporal::Date),
        Some("date-time") => Some(Temporal::DateTime),
        Some(_) => None,
        None if has_specific(field, "date") => Some(Temporal::Date),
        None if has_specific(field, "datetime") => Some(Temporal::DateTime),
        None => None,
    }
}

fn temporal_cases(field: &ResolvedSchema) -> Vec<FieldCase> {
    let Some(kind) = temporal_kind(field) else {
        return Vec::new();
    };
    let render = |date: &str| match kind {
        Temporal::Date => json!(date),
        Temporal::DateTime => json!(format!("{date}T12:00:00Z")),
    };

    let mut cases = vec![
        FieldCase::new("past", Some(render("1900-01-01")), true),
        FieldCase::new("far_future", Some(render("9999-12-31")), true),
        FieldCase::new("leap_year", Some(render("2024-02-29")), true),
        FieldCase::new("invalid_leap_day", Some(render("2023-02-29")), false),
    ];

    if kind == Temporal::DateTime {
        let extremes = [
            ("timezone_max", FixedOffset::east_opt(14 * 3600)),
            ("timezone_min", FixedOffset::west_opt(12 * 3600)),
        ];
        for (suffix, offset) in extremes {
            let stamp = offset.and_then(|tz| {
                let local = NaiveDate::from_ymd_opt(2024, 6, 15)?.and_hms_opt(12, 0, 0)?;
                tz.from_local_datetime(&local).single()
            });
            if let Some(stamp) = stamp {
                cases.push(FieldCase::new(
                    suffix,
                    Some(json!(stamp.to_rfc3339_opts(SecondsFormat::Secs, true))),
                    true,
                ));
            }
        }
    }
    cases
}

fn currency_cases(field: &ResolvedSchema) -> Vec<FieldCase> {
    if !field.schema_type.is_numeric() || !field.has_domain(DomainType::Financial) {
        return Vec::new();
    }
    let c = &field.constraints;
    let zero_allowed = !(c.minimum.is_some_and(|m| m > 0.0) || c.exclusive_minimum.is_some_and(|m| m >= 0.0));
    vec![
        FieldCase::new("currency_negative", Some(json!(-100.0)), false),
        FieldCase::new("currency_overflow", Some(json!(1e15)), false),
        FieldCase::new("currency_precision", Some(json!(10.999)), false),
        FieldCase::new("currency_zero", Some(json!(0)), zero_allowed),
    ]
}

fn locale_cases(field: &ResolvedSchema) -> Vec<FieldCase> {
    if field.schema_type != SchemaType::String
        || !field.constraints.enum_values.is_empty()
        || !has_specific(field, "locale")
    {
        return Vec::new();
    }
    vec![
        FieldCase::new("locale_format", Some(json!("en_US")), false),
        FieldCase::new("locale_unsupported", Some(json!("xx-XX")), false),
        FieldCase::new("locale_case", Some(json!("EN-us")), true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Expectation;
    use crate::parse::{HttpMethod, ParsedOperation};
    use crate::synth::test_support;

    fn cases_for(path: &str, body: Value) -> Vec<TestCase> {
        let op = test_support::operation(HttpMethod::Post, path, Some(body));
        let mut mock = MockDataGenerator::seeded(11);
        let ctx = test_support::context(&op, &mut mock);
        EdgeCaseSynthesizer::new().synthesize(&ctx, &mut mock).unwrap()
    }

    fn case_ids(cases: &[TestCase]) -> Vec<&str> {
        cases.iter().filter_map(|c| c.scenario.case.as_deref()).collect()
    }

    #[test]
    fn test_enum_cases() {
        let cases = cases_for(
            "/tickets",
            json!({
                "type": "object",
                "required": ["priority"],
                "properties": {"priority": {"type": "string", "enum": ["low", "high"]}}
            }),
        );
        assert_eq!(
            case_ids(&cases),
            vec![
                "requestBody.priority_enum_invalid",
                "requestBody.priority_enum_case",
                "requestBody.priority_enum_null"
            ]
        );
        assert_eq!(cases[0].scenario.value, Some(json!("__invalid_enum_value__")));
        assert_eq!(cases[1].scenario.value, Some(json!("LOW")));
        assert!(cases.iter().all(|c| c.expects_failure()));
    }

    #[test]
    fn test_temporal_date_time() {
        let cases = cases_for(
            "/events",
            json!({
                "type": "object",
                "properties": {"startsAt": {"type": "string", "format": "date-time"}}
            }),
        );
        let by_id = |id: &str| {
            cases
                .iter()
                .find(|c| c.scenario.case.as_deref() == Some(id))
                .unwrap_or_else(|| panic!("missing {id}"))
        };
        assert_eq!(
            by_id("requestBody.startsAt_leap_year").scenario.value,
            Some(json!("2024-02-29T12:00:00Z"))
        );
        assert_eq!(
            by_id("requestBody.startsAt_invalid_leap_day").scenario.expected,
            Some(Expectation::Invalid)
        );
        assert_eq!(
            by_id("requestBody.startsAt_timezone_max").scenario.value,
            Some(json!("2024-06-15T12:00:00+14:00"))
        );
        assert_eq!(
            by_id("requestBody.startsAt_timezone_min").scenario.value,
            Some(json!("2024-06-15T12:00:00-12:00"))
        );
    }

    #[test]
    fn test_currency_zero_respects_minimum() {
        let cases = cases_for(
            "/payments",
            json!({
                "type": "object",
                "properties": {"amount": {"type": "number", "minimum": 0.01}}
            }),
        );
        let zero = cases
            .iter()
            .find(|c| c.scenario.case.as_deref() == Some("requestBody.amount_currency_zero"))
            .unwrap();
        assert_eq!(zero.response.status, 400);
        assert_eq!(
            case_ids(&cases)
                .iter()
                .filter(|id| id.contains("currency"))
                .count(),
            4
        );
    }

    #[test]
    fn test_locale_cases() {
        let cases = cases_for(
            "/settings",
            json!({"type": "object", "properties": {"locale": {"type": "string"}}}),
        );
        let valid: Vec<&str> = cases
            .iter()
            .filter(|c| c.scenario.expected == Some(Expectation::Valid))
            .filter_map(|c| c.scenario.case.as_deref())
            .collect();
        assert_eq!(valid, vec!["requestBody.locale_locale_case"]);
    }

    #[test]
    fn test_business_rules_are_pluggable() {
        struct Teapot;
        impl BusinessRule for Teapot {
            fn name(&self) -> &'static str {
                "teapot"
            }
            fn matches(&self, operation: &ParsedOperation) -> bool {
                operation.path.contains("tea")
            }
            fn synthesize(&self, ctx: &SynthesisContext<'_>, mock: &mut MockDataGenerator) -> Vec<TestCase> {
                let request = ctx.valid_request(mock, false, false);
                vec![TestCase::new(
                    ctx.case_name(TestType::Edge, Some("teapot")),
                    TestType::Edge,
                    request,
                    crate::ir::ResponseSpec::status(418),
                )]
            }
        }

        let synth = EdgeCaseSynthesizer::without_rules().with_rule(Box::new(Teapot));
        assert_eq!(synth.rule_names(), vec!["teapot"]);
        let op = ParsedOperation::new(HttpMethod::Post, "/tea");
        let mut mock = MockDataGenerator::seeded(1);
        let ctx = test_support::context(&op, &mut mock);
        let cases = synth.synthesize(&ctx, &mut mock).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "post_tea_edge_teapot");
    }

    #[test]
    fn test_default_rules_apply_to_user_registration() {
        let cases = cases_for(
            "/users",
            json!({"type": "object", "properties": {"email": {"type": "string", "format": "email"}}}),
        );
        assert!(cases.iter().any(|c| c.name == "post_users_edge_duplicate_email"));
    }
}
