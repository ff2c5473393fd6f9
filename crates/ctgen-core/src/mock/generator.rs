use chrono::{Days, NaiveDate, NaiveTime, SecondsFormat};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};

use super::heuristics::{self, ValueKind};
use crate::analysis::ResolvedSchema;
use crate::parse::SchemaType;

/// What kind of value the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variation {
    /// Conforms to every constraint.
    Valid,
    /// Violates type or constraints on purpose.
    Invalid,
    /// Conforms, but sits on limits and drops optional fields at random.
    Edge,
}

/// Which object properties to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    All,
    RequiredOnly,
    Sampled,
}

const INVALID_ENUM_SENTINEL: &str = "__invalid_enum_value__";

/// Longest string built only to sit on or past a length limit.
pub const MAX_GENERATED_LENGTH: usize = 64 * 1024;

/// Upper end of the random item count when `maxItems` is large or absent.
const MAX_SAMPLED_ITEMS: usize = 10;

/// Produces concrete, domain-aware values for resolved schemas.
pub struct MockDataGenerator {
    rng: StdRng,
}

impl MockDataGenerator {
    /// Reproducible values for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }

    pub fn generate_realistic_data(
        &mut self,
        field_name: &str,
        schema: &ResolvedSchema,
        variation: Variation,
    ) -> Value {
        let shape = match variation {
            Variation::Edge => Shape::Sampled,
            _ => Shape::All,
        };
        self.generate(field_name, schema, variation, shape)
    }

    /// A valid value carrying only required object properties, recursively.
    pub fn generate_minimal(&mut self, field_name: &str, schema: &ResolvedSchema) -> Value {
        self.generate(field_name, schema, Variation::Valid, Shape::RequiredOnly)
    }

    /// A random v4-layout UUID drawn from this generator's RNG.
    pub fn uuid(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.random())
            .into_uuid()
            .to_string()
    }

    /// An opaque alphanumeric token, used for credentials.
    pub fn token(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        (0..len)
            .map(|_| ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    pub fn string_of_length(&mut self, len: usize) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
        (0..len)
            .map(|_| ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    fn generate(
        &mut self,
        field_name: &str,
        schema: &ResolvedSchema,
        variation: Variation,
        shape: Shape,
    ) -> Value {
        let c = &schema.constraints;

        if !c.enum_values.is_empty() {
            return match variation {
                Variation::Invalid => invalid_enum_value(&c.enum_values),
                _ => c
                    .enum_values
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or(Value::Null),
            };
        }

        if variation == Variation::Valid
            && let Some(example) = c.example.clone()
        {
            return example;
        }

        match schema.schema_type {
            SchemaType::Object => self.object(schema, variation, shape),
            SchemaType::Array => self.array(field_name, schema, variation, shape),
            SchemaType::String => self.string(field_name, schema, variation),
            SchemaType::Integer | SchemaType::Number => self.number(field_name, schema, variation),
            SchemaType::Boolean => match variation {
                Variation::Invalid => json!("not-a-boolean"),
                _ => Value::Bool(self.rng.random_bool(0.5)),
            },
            SchemaType::Null => match variation {
                Variation::Invalid => json!("not-null"),
                _ => Value::Null,
            },
        }
    }

    fn object(&mut self, schema: &ResolvedSchema, variation: Variation, shape: Shape) -> Value {
        let c = &schema.constraints;
        let mut map = Map::new();
        for (name, prop) in &c.properties {
            if prop.constraints.read_only {
                continue;
            }
            let required = c.required.contains(name);
            let include = match shape {
                Shape::All => true,
                Shape::RequiredOnly => required,
                Shape::Sampled => required || self.rng.random_bool(0.5),
            };
            if include {
                map.insert(name.clone(), self.generate(name, prop, variation, shape));
            }
        }
        Value::Object(map)
    }

    fn array(
        &mut self,
        field_name: &str,
        schema: &ResolvedSchema,
        variation: Variation,
        shape: Shape,
    ) -> Value {
        let c = &schema.constraints;
        if variation == Variation::Invalid {
            return json!("not-an-array");
        }

        let min = c.min_items.unwrap_or(0) as usize;
        let max = c
            .max_items
            .map(|m| usize::try_from(m).unwrap_or(usize::MAX))
            .unwrap_or(min.max(3))
            .max(min)
            .min(min.max(MAX_SAMPLED_ITEMS));
        let count = match (variation, shape) {
            (Variation::Edge, _) => min,
            (_, Shape::RequiredOnly) => min.max(1).min(max),
            _ => self.rng.random_range(min.max(1).min(max)..=max),
        };

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match c.items {
                Some(ref item) => self.generate(field_name, item, variation, shape),
                None => Value::String(self.word()),
            };
            if c.unique_items && items.contains(&value) {
                continue;
            }
            items.push(value);
        }
        Value::Array(items)
    }

    fn string(&mut self, field_name: &str, schema: &ResolvedSchema, variation: Variation) -> Value {
        let c = &schema.constraints;
        let min = usize::try_from(c.min_length.unwrap_or(0)).unwrap_or(usize::MAX);
        let max = c.max_length.map(|m| usize::try_from(m).unwrap_or(usize::MAX));

        match variation {
            Variation::Invalid => {
                if min > 0 {
                    return json!("");
                }
                if let Some(over) = max
                    .and_then(|m| m.checked_add(1))
                    .filter(|&n| n <= MAX_GENERATED_LENGTH)
                {
                    return Value::String(self.string_of_length(over));
                }
                if let Some(bad) = c.format.as_deref().and_then(heuristics::invalid_format_value) {
                    return json!(bad);
                }
                return json!(12345);
            }
            Variation::Edge => {
                if let Some(max) = max.filter(|&m| m <= MAX_GENERATED_LENGTH) {
                    return Value::String(self.string_of_length(max));
                }
                if c.min_length.is_some() && min <= MAX_GENERATED_LENGTH {
                    return Value::String(self.string_of_length(min));
                }
            }
            Variation::Valid => {}
        }

        let realistic = heuristics::detect(field_name, c.format.as_deref())
            .and_then(|kind| self.realistic(kind))
            .and_then(|v| v.as_str().map(str::to_string));

        let mut text = match realistic {
            Some(text) => text,
            None => {
                let word = self.word();
                if word.len() >= min && max.is_none_or(|m| word.len() <= m) {
                    word
                } else {
                    let target = min.max(8);
                    let target = max.map_or(target, |m| target.min(m));
                    self.string_of_length(target)
                }
            }
        };

        let len = text.chars().count();
        if let Some(max) = max
            && len > max
        {
            text = text.chars().take(max).collect();
        }
        if text.chars().count() < min {
            let pad = min - text.chars().count();
            text.push_str(&self.string_of_length(pad));
        }
        Value::String(text)
    }

    fn number(&mut self, field_name: &str, schema: &ResolvedSchema, variation: Variation) -> Value {
        let c = &schema.constraints;
        let integer = schema.schema_type == SchemaType::Integer;

        if variation == Variation::Invalid {
            return json!("NaN");
        }

        let step = if integer { 1.0 } else { 0.01 };
        let low = c.minimum.or(c.exclusive_minimum.map(|m| m + step));
        let high = c.maximum.or(c.exclusive_maximum.map(|m| m - step));

        if variation == Variation::Edge
            && let Some(edge) = low.or(high)
        {
            return number_value(edge, integer);
        }

        let realistic = match heuristics::detect(field_name, c.format.as_deref()) {
            Some(kind @ (ValueKind::Price
            | ValueKind::Quantity
            | ValueKind::Age
            | ValueKind::Latitude
            | ValueKind::Longitude
            | ValueKind::Identifier)) => self.realistic(kind).and_then(|v| v.as_f64()),
            _ => None,
        };

        let (lo, hi) = match (low, high) {
            (Some(lo), Some(hi)) if hi >= lo => (lo, hi),
            (Some(lo), None) => (lo, lo + 1000.0),
            (None, Some(hi)) => (if hi >= 1.0 { 1.0 } else { hi - 1000.0 }, hi),
            _ => (1.0, 1000.0),
        };

        let mut value = match realistic {
            Some(v) if v >= lo && v <= hi => v,
            _ if integer => self.rng.random_range(lo.ceil() as i64..=hi.floor().max(lo.ceil()) as i64) as f64,
            _ if (hi - lo).is_finite() => round_cents(self.rng.random_range(lo..=hi)),
            _ => {
                // The span overflows f64, so interpolate between the ends.
                let t: f64 = self.rng.random();
                round_cents(lo * (1.0 - t) + hi * t)
            }
        };

        if let Some(multiple) = c.multiple_of {
            value = (value / multiple).round() * multiple;
            if value < lo {
                value += multiple;
            }
            if value > hi {
                value -= multiple;
            }
        }

        number_value(value, integer)
    }

    fn realistic(&mut self, kind: ValueKind) -> Option<Value> {
        Some(match kind {
            ValueKind::Email => {
                let first = self.pick(heuristics::FIRST_NAMES).to_lowercase();
                let last = self.pick(heuristics::LAST_NAMES).to_lowercase();
                let domain = self.pick(heuristics::EMAIL_DOMAINS);
                json!(format!("{first}.{last}@{domain}"))
            }
            ValueKind::Phone => {
                let n: u32 = self.rng.random_range(1_000_000..10_000_000);
                json!(format!("+1-555-{:03}-{:04}", n / 10_000 % 1000, n % 10_000))
            }
            ValueKind::Url => {
                let word = self.word();
                json!(format!("https://{word}.example.com/{}", self.word()))
            }
            ValueKind::Uuid => json!(self.uuid()),
            ValueKind::Identifier => json!(self.rng.random_range(1..100_000)),
            ValueKind::FirstName => json!(self.pick(heuristics::FIRST_NAMES)),
            ValueKind::LastName => json!(self.pick(heuristics::LAST_NAMES)),
            ValueKind::FullName => {
                let first = self.pick(heuristics::FIRST_NAMES);
                json!(format!("{first} {}", self.pick(heuristics::LAST_NAMES)))
            }
            ValueKind::Username => {
                let first = self.pick(heuristics::FIRST_NAMES).to_lowercase();
                json!(format!("{first}{}", self.rng.random_range(10..1000)))
            }
            ValueKind::Street => {
                let number = self.rng.random_range(1..2000);
                json!(format!("{number} {}", self.pick(heuristics::STREETS)))
            }
            ValueKind::City => json!(self.pick(heuristics::CITIES)),
            ValueKind::Country => json!(self.pick_pair(heuristics::COUNTRIES).0),
            ValueKind::CountryCode => json!(self.pick_pair(heuristics::COUNTRIES).1),
            ValueKind::PostalCode => json!(format!("{:05}", self.rng.random_range(10_000..99_999))),
            ValueKind::Date => json!(self.date().format("%Y-%m-%d").to_string()),
            ValueKind::DateTime => {
                let date = self.date();
                let time = NaiveTime::from_hms_opt(
                    self.rng.random_range(0..24),
                    self.rng.random_range(0..60),
                    self.rng.random_range(0..60),
                )?;
                json!(date.and_time(time).and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            ValueKind::Time => json!(format!(
                "{:02}:{:02}:00",
                self.rng.random_range(0..24),
                self.rng.random_range(0..60)
            )),
            ValueKind::Company => json!(self.pick(heuristics::COMPANIES)),
            ValueKind::CurrencyCode => json!(self.pick(heuristics::CURRENCIES)),
            ValueKind::Locale => json!(self.pick(heuristics::LOCALES)),
            ValueKind::IpAddress => json!(format!(
                "192.168.{}.{}",
                self.rng.random_range(0..255),
                self.rng.random_range(1..255)
            )),
            ValueKind::Hostname => json!(format!("{}.example.com", self.word())),
            ValueKind::Password => json!(format!("{}!{}A", self.token(12), self.rng.random_range(10..99))),
            ValueKind::Latitude => json!((self.rng.random_range(-90.0..=90.0_f64) * 1e4).round() / 1e4),
            ValueKind::Longitude => json!((self.rng.random_range(-180.0..=180.0_f64) * 1e4).round() / 1e4),
            ValueKind::Price => json!((self.rng.random_range(1.0..500.0_f64) * 100.0).round() / 100.0),
            ValueKind::Quantity => json!(self.rng.random_range(1..50)),
            ValueKind::Age => json!(self.rng.random_range(18..90)),
            ValueKind::Description => {
                let words: Vec<&str> = (0..4).map(|_| self.pick(heuristics::WORDS)).collect();
                json!(words.join(" "))
            }
        })
    }

    fn date(&mut self) -> NaiveDate {
        let offset = self.rng.random_range(0..2190);
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap_or_default()
    }

    fn word(&mut self) -> String {
        self.pick(heuristics::WORDS).to_string()
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or("")
    }

    fn pick_pair(&mut self, options: &[(&'static str, &'static str)]) -> (&'static str, &'static str) {
        options.choose(&mut self.rng).copied().unwrap_or(("", ""))
    }
}

fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() { scaled.round() / 100.0 } else { value }
}

fn number_value(value: f64, integer: bool) -> Value {
    if integer {
        json!(value.round() as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn invalid_enum_value(options: &[Value]) -> Value {
    if options.iter().all(Value::is_number) {
        let max = options.iter().filter_map(Value::as_f64).fold(f64::MIN, f64::max);
        return json!(max as i64 + 1);
    }
    json!(INVALID_ENUM_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisContext, SchemaAnalyzer};

    fn resolve(json: Value) -> ResolvedSchema {
        let schema = serde_json::from_value(json).unwrap();
        SchemaAnalyzer::new()
            .analyze_schema(&schema, "requestBody", &AnalysisContext::root())
            .value
    }

    fn user_schema() -> ResolvedSchema {
        resolve(json!({
            "type": "object",
            "required": ["email", "age"],
            "properties": {
                "email": {"type": "string", "format": "email"},
                "age": {"type": "integer", "minimum": 18, "maximum": 99},
                "nickname": {"type": "string", "maxLength": 8},
                "id": {"type": "string", "readOnly": true}
            }
        }))
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let schema = user_schema();
        let a = MockDataGenerator::seeded(7).generate_realistic_data("user", &schema, Variation::Valid);
        let b = MockDataGenerator::seeded(7).generate_realistic_data("user", &schema, Variation::Valid);
        assert_eq!(a, b);
    }

    #[test]
    fn test_valid_object_respects_constraints() {
        let schema = user_schema();
        let mut mock = MockDataGenerator::seeded(1);
        for _ in 0..20 {
            let value = mock.generate_realistic_data("user", &schema, Variation::Valid);
            assert!(value["email"].as_str().unwrap().contains('@'));
            let age = value["age"].as_i64().unwrap();
            assert!((18..=99).contains(&age));
            assert!(value["nickname"].as_str().unwrap().chars().count() <= 8);
            assert!(value.get("id").is_none());
        }
    }

    #[test]
    fn test_minimal_has_only_required() {
        let value = MockDataGenerator::seeded(3).generate_minimal("user", &user_schema());
        let obj = value.as_object().unwrap();
        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["email", "age"]);
    }

    #[test]
    fn test_enum_precedence() {
        let schema = resolve(json!({"type": "string", "enum": ["active", "inactive"], "example": "other"}));
        let mut mock = MockDataGenerator::seeded(9);
        let valid = mock.generate_realistic_data("status", &schema, Variation::Valid);
        assert!(valid == json!("active") || valid == json!("inactive"));
        let invalid = mock.generate_realistic_data("status", &schema, Variation::Invalid);
        assert_eq!(invalid, json!(INVALID_ENUM_SENTINEL));
    }

    #[test]
    fn test_example_used_for_valid_only() {
        let schema = resolve(json!({"type": "string", "minLength": 1, "example": "hello"}));
        let mut mock = MockDataGenerator::seeded(2);
        assert_eq!(mock.generate_realistic_data("greeting", &schema, Variation::Valid), json!("hello"));
        assert_eq!(mock.generate_realistic_data("greeting", &schema, Variation::Invalid), json!(""));
    }

    #[test]
    fn test_invalid_variations() {
        let mut mock = MockDataGenerator::seeded(4);
        let number = resolve(json!({"type": "number"}));
        assert_eq!(mock.generate_realistic_data("price", &number, Variation::Invalid), json!("NaN"));
        let array = resolve(json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(mock.generate_realistic_data("tags", &array, Variation::Invalid), json!("not-an-array"));
        let email = resolve(json!({"type": "string", "format": "email"}));
        assert_eq!(mock.generate_realistic_data("email", &email, Variation::Invalid), json!("not-an-email"));
    }

    #[test]
    fn test_multiple_of_is_respected() {
        let schema = resolve(json!({"type": "integer", "minimum": 0, "maximum": 100, "multipleOf": 5}));
        let mut mock = MockDataGenerator::seeded(11);
        for _ in 0..20 {
            let v = mock.generate_realistic_data("step", &schema, Variation::Valid).as_i64().unwrap();
            assert_eq!(v % 5, 0);
            assert!((0..=100).contains(&v));
        }
    }

    #[test]
    fn test_uuid_shape() {
        let id = MockDataGenerator::seeded(5).uuid();
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().nth(14), Some('4'));
    }

    #[test]
    fn test_full_f64_range_does_not_overflow() {
        let schema = resolve(json!({"type": "number", "minimum": -1.7e308, "maximum": 1.7e308}));
        let mut mock = MockDataGenerator::seeded(4);
        for _ in 0..10 {
            let value = mock.generate_realistic_data("reading", &schema, Variation::Valid);
            let n = value.as_f64().unwrap();
            assert!((-1.7e308..=1.7e308).contains(&n));
        }
    }

    #[test]
    fn test_huge_limits_stay_small() {
        let schema = resolve(json!({"type": "string", "maxLength": 2147483647u64}));
        let mut mock = MockDataGenerator::seeded(4);
        let invalid = mock.generate_realistic_data("note", &schema, Variation::Invalid);
        assert_eq!(invalid, json!(12345));
        let edge = mock.generate_realistic_data("note", &schema, Variation::Edge);
        assert!(edge.as_str().unwrap().len() <= MAX_GENERATED_LENGTH);

        let list = resolve(json!({"type": "array", "maxItems": 1000000, "items": {"type": "integer"}}));
        let items = mock.generate_realistic_data("counts", &list, Variation::Valid);
        assert!(items.as_array().unwrap().len() <= MAX_SAMPLED_ITEMS);
    }
}
