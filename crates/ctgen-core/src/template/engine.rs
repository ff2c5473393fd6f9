//! A small template language for stamping test sources.
//!
//! Supported syntax, evaluated in this fixed order:
//!
//! 1. `{{#each list}}...{{/each}}` with `{{this}}`, `{{this.prop}}` and
//!    `{{helper this.prop}}` inside the block
//! 2. `{{#if path}}...{{/if}}`, a truthy test with no `else`
//! 3. `{{dotted.path}}` interpolation
//! 4. `{{helper arg}}` where `arg` is a dotted path or a quoted literal
//!
//! Blocks do not nest. Rendering never fails: anything that cannot be
//! resolved stays in the output verbatim and is reported as a warning.
//! Substituted values are never scanned again, so data containing `{{x}}`
//! comes out exactly as given.

use std::fmt;
use std::sync::LazyLock;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;

static EACH_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#each\s+([\w.]+)\s*\}\}(.*?)\{\{/each\}\}").expect("each pattern should be valid")
});

static IF_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#if\s+([\w.]+)\s*\}\}(.*?)\{\{/if\}\}").expect("if pattern should be valid")
});

static THIS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(?:(\w+)\s+)?this(?:\.([\w.]+))?\s*\}\}").expect("this pattern should be valid")
});

static VARIABLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("variable pattern should be valid")
});

static SLOT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").expect("slot pattern should be valid"));

static HELPER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*(\w+)\s+([\w.]+|"[^"]*")\s*\}\}"#).expect("helper pattern should be valid")
});

/// A single-argument formatting function callable from templates.
pub type Helper = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Something the engine could not resolve and left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWarning {
    UnresolvedVariable { path: String },
    UnknownHelper { name: String },
    NotAList { path: String },
}

impl fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateWarning::UnresolvedVariable { path } => write!(f, "unresolved variable '{path}'"),
            TemplateWarning::UnknownHelper { name } => write!(f, "unknown helper '{name}'"),
            TemplateWarning::NotAList { path } => write!(f, "'{path}' is not a list, each block skipped"),
        }
    }
}

/// Output text plus everything left unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub warnings: Vec<TemplateWarning>,
}

impl Rendered {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Values already substituted during one render, parked behind opaque
/// tokens until every pass has run.
#[derive(Default)]
struct Slots {
    values: Vec<String>,
}

impl Slots {
    fn hold(&mut self, value: String) -> String {
        self.values.push(value);
        format!("\u{E000}{}\u{E001}", self.values.len() - 1)
    }

    fn restore(&self, text: &str) -> String {
        SLOT_TOKEN
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.values.get(i))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

pub struct TemplateEngine {
    helpers: IndexMap<String, Helper>,
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// An engine with the built-in helpers registered.
    pub fn new() -> Self {
        let mut engine = Self {
            helpers: IndexMap::new(),
        };
        engine.register_helper("upper", |v| display(v).to_uppercase());
        engine.register_helper("lower", |v| display(v).to_lowercase());
        engine.register_helper("camel", |v| display(v).to_lower_camel_case());
        engine.register_helper("pascal", |v| display(v).to_upper_camel_case());
        engine.register_helper("snake", |v| display(v).to_snake_case());
        engine.register_helper("kebab", |v| display(v).to_kebab_case());
        engine.register_helper("json", |v| serde_json::to_string(v).unwrap_or_default());
        engine.register_helper("quote", |v| {
            serde_json::to_string(&Value::String(display(v))).unwrap_or_default()
        });
        engine
    }

    /// Register or replace a helper.
    pub fn register_helper<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Box::new(helper));
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn render(&self, template: &str, context: &Value) -> Rendered {
        if !template.contains("{{") {
            return Rendered {
                text: template.to_string(),
                warnings: Vec::new(),
            };
        }

        let mut warnings = Vec::new();
        let mut slots = Slots::default();
        let text = self.expand_each(template, context, &mut slots, &mut warnings);
        let text = expand_if(&text, context);
        let text = interpolate(&text, context, &mut slots, &mut warnings);
        let text = self.apply_helpers(&text, context, &mut slots, &mut warnings);

        Rendered {
            text: slots.restore(&text),
            warnings,
        }
    }

    fn expand_each(
        &self,
        template: &str,
        context: &Value,
        slots: &mut Slots,
        warnings: &mut Vec<TemplateWarning>,
    ) -> String {
        EACH_BLOCK
            .replace_all(template, |caps: &Captures| {
                let path = &caps[1];
                let body = &caps[2];
                let Some(Value::Array(items)) = lookup(context, path) else {
                    warnings.push(TemplateWarning::NotAList {
                        path: path.to_string(),
                    });
                    return String::new();
                };
                items
                    .iter()
                    .map(|item| self.render_item(body, item, slots, warnings))
                    .collect::<String>()
            })
            .into_owned()
    }

    fn render_item(
        &self,
        body: &str,
        item: &Value,
        slots: &mut Slots,
        warnings: &mut Vec<TemplateWarning>,
    ) -> String {
        THIS_TAG
            .replace_all(body, |caps: &Captures| {
                let value = match caps.get(2) {
                    Some(prop) => lookup(item, prop.as_str()),
                    None => Some(item),
                };
                let Some(value) = value else {
                    let path = caps.get(2).map_or("this".to_string(), |p| format!("this.{}", p.as_str()));
                    warnings.push(TemplateWarning::UnresolvedVariable { path });
                    return caps[0].to_string();
                };
                match caps.get(1) {
                    None => slots.hold(display(value)),
                    Some(name) => match self.helpers.get(name.as_str()) {
                        Some(helper) => slots.hold(helper(value)),
                        None => {
                            warnings.push(TemplateWarning::UnknownHelper {
                                name: name.as_str().to_string(),
                            });
                            caps[0].to_string()
                        }
                    },
                }
            })
            .into_owned()
    }

    fn apply_helpers(
        &self,
        template: &str,
        context: &Value,
        slots: &mut Slots,
        warnings: &mut Vec<TemplateWarning>,
    ) -> String {
        HELPER_TAG
            .replace_all(template, |caps: &Captures| {
                let name = &caps[1];
                let arg = &caps[2];
                let Some(helper) = self.helpers.get(name) else {
                    warnings.push(TemplateWarning::UnknownHelper {
                        name: name.to_string(),
                    });
                    return caps[0].to_string();
                };
                if let Some(literal) = arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')) {
                    return slots.hold(helper(&Value::String(literal.to_string())));
                }
                match lookup(context, arg) {
                    Some(value) => slots.hold(helper(value)),
                    None => {
                        warnings.push(TemplateWarning::UnresolvedVariable {
                            path: arg.to_string(),
                        });
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

fn expand_if(template: &str, context: &Value) -> String {
    IF_BLOCK
        .replace_all(template, |caps: &Captures| {
            if lookup(context, &caps[1]).is_some_and(is_truthy) {
                caps[2].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

fn interpolate(template: &str, context: &Value, slots: &mut Slots, warnings: &mut Vec<TemplateWarning>) -> String {
    VARIABLE_TAG
        .replace_all(template, |caps: &Captures| match lookup(context, &caps[1]) {
            Some(value) => slots.hold(display(value)),
            None => {
                warnings.push(TemplateWarning::UnresolvedVariable {
                    path: caps[1].to_string(),
                });
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Walk a dotted path; numeric segments index arrays.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
