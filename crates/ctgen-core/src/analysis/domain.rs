//! Table-driven domain classification.
//!
//! Each table row is a regular expression matched against the snake_case field
//! name, the field path, the lowercased description and the schema `format`.
//! Every match adds a weight, capped per source. A hint is emitted only when
//! the combined score exceeds [`HINT_THRESHOLD`].

use heck::ToSnakeCase;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Broad semantic category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    Financial,
    Temporal,
    Personal,
    Geographic,
    Technical,
    Business,
}

impl DomainType {
    pub const ALL: [DomainType; 6] = [
        DomainType::Financial,
        DomainType::Temporal,
        DomainType::Personal,
        DomainType::Geographic,
        DomainType::Technical,
        DomainType::Business,
    ];
}

/// An advisory classification of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainHint {
    #[serde(rename = "type")]
    pub domain_type: DomainType,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_type: Option<String>,
}

pub const HINT_THRESHOLD: f64 = 0.2;

const NAME_WEIGHT: f64 = 0.5;
const NAME_CAP: f64 = 0.6;
const PATH_WEIGHT: f64 = 0.15;
const PATH_CAP: f64 = 0.2;
const DESCRIPTION_WEIGHT: f64 = 0.2;
const DESCRIPTION_CAP: f64 = 0.3;
const FORMAT_WEIGHT: f64 = 0.4;

const TEXT_RULES: &[(DomainType, &str, &str)] = &[
    (DomainType::Financial, "price", r"price|cost"),
    (
        DomainType::Financial,
        "amount",
        r"amount|total|balance|(^|_)fee($|_|s)|salary|payment|(^|_)tax($|_)|discount",
    ),
    (DomainType::Financial, "currency_code", r"currency"),
    (DomainType::Financial, "account", r"iban|account_?number|routing"),
    (DomainType::Financial, "card_number", r"(^|_)card($|_)|credit_?card"),
    (DomainType::Temporal, "date", r"(^|_)(date|dob)($|_)|birthday|_on$"),
    (
        DomainType::Temporal,
        "datetime",
        r"timestamp|(^|_)time($|_)|_at$|datetime|created|updated|expires",
    ),
    (DomainType::Temporal, "duration", r"duration|timeout|(^|_)ttl($|_)"),
    (DomainType::Personal, "email", r"e_?mail"),
    (DomainType::Personal, "phone", r"phone|mobile|(^|_)tel($|_)"),
    (
        DomainType::Personal,
        "name",
        r"(^|_)(first_|last_|full_|display_|given_|family_)?name$|username",
    ),
    (DomainType::Personal, "address", r"address|street"),
    (DomainType::Personal, "national_id", r"ssn|social_security|passport"),
    (DomainType::Personal, "demographic", r"birth|(^|_)age($|_)|gender"),
    (DomainType::Geographic, "country", r"country"),
    (DomainType::Geographic, "city", r"city|town"),
    (DomainType::Geographic, "latitude", r"(^|_)(lat|latitude)($|_)"),
    (DomainType::Geographic, "longitude", r"(^|_)(lng|lon|longitude)($|_)"),
    (DomainType::Geographic, "postal_code", r"zip|postal|postcode"),
    (DomainType::Geographic, "region", r"region|(^|_)state($|_)|province"),
    (DomainType::Technical, "identifier", r"(^|_)id$|uuid|guid"),
    (DomainType::Technical, "url", r"url|uri|(^|_)link($|_)|href|website"),
    (DomainType::Technical, "network", r"(^|_)ip($|_)|ip_?address|hostname"),
    (
        DomainType::Technical,
        "credential",
        r"token|secret|api_?key|password|(^|_)hash($|_)",
    ),
    (DomainType::Technical, "version", r"version"),
    (DomainType::Technical, "locale", r"locale|(^|_)lang(uage)?($|_)"),
    (DomainType::Business, "order", r"order"),
    (DomainType::Business, "invoice", r"invoice"),
    (DomainType::Business, "product", r"(^|_)sku($|_)|product|(^|_)item"),
    (DomainType::Business, "customer", r"customer|(^|_)client($|_)"),
    (DomainType::Business, "company", r"company|organi[sz]ation|(^|_)org($|_)"),
    (DomainType::Business, "quantity", r"quantity|(^|_)qty($|_)|stock|inventory"),
    (DomainType::Business, "status", r"status"),
];

const FORMAT_RULES: &[(DomainType, &str, &[&str])] = &[
    (DomainType::Temporal, "date", &["date"]),
    (DomainType::Temporal, "datetime", &["date-time", "time"]),
    (DomainType::Temporal, "duration", &["duration"]),
    (DomainType::Personal, "email", &["email", "idn-email"]),
    (
        DomainType::Technical,
        "url",
        &["uri", "url", "uri-reference", "iri"],
    ),
    (DomainType::Technical, "identifier", &["uuid"]),
    (DomainType::Technical, "network", &["ipv4", "ipv6", "hostname"]),
    (DomainType::Technical, "credential", &["password", "byte", "binary"]),
    (DomainType::Financial, "amount", &["decimal", "money", "currency"]),
];

struct TextRule {
    domain: DomainType,
    specific_type: &'static str,
    pattern: Regex,
}

/// What the scorer looks at for one field.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSignals<'a> {
    pub name: &'a str,
    pub path: &'a [String],
    pub description: Option<&'a str>,
    pub format: Option<&'a str>,
}

/// Scores field signals against the domain tables.
pub struct DomainScorer {
    rules: Vec<TextRule>,
}

impl Default for DomainScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone, Copy)]
struct Score {
    name: f64,
    path: f64,
    description: f64,
    format: f64,
}

impl Score {
    fn total(&self) -> f64 {
        self.name.min(NAME_CAP)
            + self.path.min(PATH_CAP)
            + self.description.min(DESCRIPTION_CAP)
            + self.format.min(FORMAT_WEIGHT)
    }
}

impl DomainScorer {
    pub fn new() -> Self {
        let rules = TEXT_RULES
            .iter()
            .map(|(domain, specific_type, pattern)| TextRule {
                domain: *domain,
                specific_type,
                pattern: Regex::new(pattern).expect("domain pattern should be valid"),
            })
            .collect();
        Self { rules }
    }

    /// Classify a field. Hints are sorted by descending confidence.
    pub fn classify(&self, signals: &FieldSignals<'_>) -> Vec<DomainHint> {
        let name = signals.name.to_snake_case();
        let parent_path: Vec<String> = signals
            .path
            .iter()
            .take(signals.path.len().saturating_sub(1))
            .map(|s| s.to_snake_case())
            .collect();
        let description = signals.description.map(str::to_lowercase);

        let mut scores = [Score::default(); 6];
        let mut specific: [Option<(&'static str, f64)>; 6] = [None; 6];

        for rule in &self.rules {
            let idx = domain_index(rule.domain);
            let mut weight = 0.0;
            if !name.is_empty() && rule.pattern.is_match(&name) {
                scores[idx].name += NAME_WEIGHT;
                weight += NAME_WEIGHT;
            }
            if parent_path.iter().any(|seg| rule.pattern.is_match(seg)) {
                scores[idx].path += PATH_WEIGHT;
                weight += PATH_WEIGHT;
            }
            if let Some(ref text) = description
                && rule.pattern.is_match(text)
            {
                scores[idx].description += DESCRIPTION_WEIGHT;
                weight += DESCRIPTION_WEIGHT;
            }
            record_specific(&mut specific[idx], rule.specific_type, weight);
        }

        if let Some(format) = signals.format {
            for (domain, specific_type, formats) in FORMAT_RULES {
                if formats.contains(&format) {
                    let idx = domain_index(*domain);
                    scores[idx].format += FORMAT_WEIGHT;
                    record_specific(&mut specific[idx], specific_type, FORMAT_WEIGHT);
                }
            }
        }

        let mut hints: Vec<DomainHint> = DomainType::ALL
            .iter()
            .enumerate()
            .filter_map(|(idx, domain)| {
                let total = scores[idx].total();
                (total > HINT_THRESHOLD).then(|| DomainHint {
                    domain_type: *domain,
                    confidence: total.min(1.0),
                    specific_type: specific[idx].map(|(s, _)| s.to_string()),
                })
            })
            .collect();

        hints.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        hints
    }
}

fn record_specific(slot: &mut Option<(&'static str, f64)>, specific_type: &'static str, weight: f64) {
    if weight <= 0.0 {
        return;
    }
    match slot {
        Some((_, best)) if *best >= weight => {}
        _ => *slot = Some((specific_type, weight)),
    }
}

fn domain_index(domain: DomainType) -> usize {
    match domain {
        DomainType::Financial => 0,
        DomainType::Temporal => 1,
        DomainType::Personal => 2,
        DomainType::Geographic => 3,
        DomainType::Technical => 4,
        DomainType::Business => 5,
    }
}
