use std::fmt;

use serde::Serialize;

use super::domain::{DomainScorer, FieldSignals};
use super::resolved::{Constraints, ResolvedSchema, SchemaContext};
use crate::parse::{ExclusiveBound, Parameter, Schema, SchemaOrRef, SchemaType, TypeSet};

/// Nesting depth past which a schema is treated as an opaque string.
pub const MAX_SCHEMA_DEPTH: usize = 10;

/// A place where analysis had to degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaWarning {
    UnresolvedReference { path: String, reference: String },
    DepthLimitReached { path: String, depth: usize },
    CompositionBranchSelected {
        path: String,
        keyword: &'static str,
        branches: usize,
    },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::UnresolvedReference { path, reference } => {
                write!(f, "{path}: unresolved reference {reference}, treated as string")
            }
            SchemaWarning::DepthLimitReached { path, depth } => {
                write!(f, "{path}: nesting depth {depth} exceeds limit, treated as string")
            }
            SchemaWarning::CompositionBranchSelected {
                path,
                keyword,
                branches,
            } => write!(
                f,
                "{path}: {keyword} has {branches} alternatives, only the first is analyzed"
            ),
        }
    }
}

/// A value produced by analysis plus everything that degraded along the way.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    pub value: T,
    pub warnings: Vec<SchemaWarning>,
}

impl<T> Resolution<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Where the schema being analyzed hangs in its parent.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub parent_path: Vec<String>,
    pub is_required: bool,
    pub depth: usize,
}

impl AnalysisContext {
    pub fn root() -> Self {
        Self {
            parent_path: Vec::new(),
            is_required: true,
            depth: 0,
        }
    }

    pub fn under(prefix: &str, is_required: bool) -> Self {
        Self {
            parent_path: vec![prefix.to_string()],
            is_required,
            depth: 0,
        }
    }
}

/// Resolves composition, extracts constraints and attaches domain hints.
#[derive(Default)]
pub struct SchemaAnalyzer {
    scorer: DomainScorer,
}

impl SchemaAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze_schema(
        &self,
        schema: &SchemaOrRef,
        field_name: &str,
        context: &AnalysisContext,
    ) -> Resolution<ResolvedSchema> {
        let mut warnings = Vec::new();
        let value = self.resolve(schema, field_name, context, &mut warnings);
        Resolution { value, warnings }
    }

    /// Analyze a parameter's schema under `<location>.<name>`.
    pub fn analyze_parameter(&self, param: &Parameter) -> Resolution<ResolvedSchema> {
        let context = AnalysisContext::under(param.location.as_str(), param.required);
        let fallback = SchemaOrRef::inline(Schema::of_type(SchemaType::String));
        let schema = param.schema.as_ref().unwrap_or(&fallback);
        let mut resolution = self.analyze_schema(schema, &param.name, &context);
        if resolution.value.constraints.example.is_none() {
            resolution.value.constraints.example = param.example.clone();
        }
        resolution
    }

    /// The alternatives of a top-level `oneOf`/`anyOf`, each merged with the
    /// keywords of the enclosing schema. Non-composite schemas yield themselves.
    pub fn branches(&self, schema: &SchemaOrRef) -> Vec<SchemaOrRef> {
        let SchemaOrRef::Schema(s) = schema else {
            return vec![schema.clone()];
        };
        let alternatives = if !s.one_of.is_empty() {
            &s.one_of
        } else if !s.any_of.is_empty() {
            &s.any_of
        } else {
            return vec![schema.clone()];
        };

        let mut shared = (**s).clone();
        shared.one_of.clear();
        shared.any_of.clear();

        alternatives
            .iter()
            .map(|alt| {
                SchemaOrRef::inline(Schema {
                    all_of: vec![SchemaOrRef::inline(shared.clone()), alt.clone()],
                    ..Schema::default()
                })
            })
            .collect()
    }

    fn resolve(
        &self,
        schema: &SchemaOrRef,
        field_name: &str,
        context: &AnalysisContext,
        warnings: &mut Vec<SchemaWarning>,
    ) -> ResolvedSchema {
        let mut field_path = context.parent_path.clone();
        if !field_name.is_empty() {
            field_path.push(field_name.to_string());
        }
        let path = field_path.join(".");

        if context.depth > MAX_SCHEMA_DEPTH {
            warnings.push(SchemaWarning::DepthLimitReached {
                path,
                depth: context.depth,
            });
            return permissive(None, field_path, context);
        }

        let flat = match schema {
            SchemaOrRef::Ref { ref_path } => {
                warnings.push(SchemaWarning::UnresolvedReference {
                    path,
                    reference: ref_path.clone(),
                });
                return permissive(Some(ref_path), field_path, context);
            }
            SchemaOrRef::Schema(s) => self.flatten(s, &path, context.depth, warnings),
        };

        let (schema_type, type_nullable) = infer_type(&flat);
        let mut constraints = extract_constraints(&flat);
        constraints.nullable = constraints.nullable || type_nullable;

        for (name, prop) in &flat.properties {
            let child = AnalysisContext {
                parent_path: field_path.clone(),
                is_required: flat.required.contains(name),
                depth: context.depth + 1,
            };
            let resolved = self.resolve(prop, name, &child, warnings);
            constraints.properties.insert(name.clone(), resolved);
        }

        if let Some(ref items) = flat.items {
            // Items sit beside the array as `<field>[]`, not under it.
            let child = AnalysisContext {
                parent_path: context.parent_path.clone(),
                is_required: true,
                depth: context.depth + 1,
            };
            let item_name = format!("{field_name}[]");
            constraints.items = Some(Box::new(self.resolve(items, &item_name, &child, warnings)));
        }

        let domain_hints = self.scorer.classify(&FieldSignals {
            name: field_name,
            path: &field_path,
            description: flat.description.as_deref(),
            format: flat.format.as_deref(),
        });

        ResolvedSchema {
            schema_type,
            constraints,
            context: SchemaContext {
                field_path,
                is_required: context.is_required,
                depth: context.depth,
                domain_hints,
            },
        }
    }

    /// Collapse `allOf`/`oneOf`/`anyOf` into one composition-free schema.
    fn flatten(
        &self,
        schema: &Schema,
        path: &str,
        depth: usize,
        warnings: &mut Vec<SchemaWarning>,
    ) -> Schema {
        if !schema.has_composition() {
            return schema.clone();
        }
        if depth > MAX_SCHEMA_DEPTH {
            warnings.push(SchemaWarning::DepthLimitReached {
                path: path.to_string(),
                depth,
            });
            return permissive_schema(None);
        }

        let mut merged = Schema::default();

        for part in &schema.all_of {
            let flat = self.flatten_part(part, path, depth, warnings);
            merge_into(&mut merged, &flat);
        }

        let alternatives = if !schema.one_of.is_empty() {
            Some(("oneOf", &schema.one_of))
        } else if !schema.any_of.is_empty() {
            Some(("anyOf", &schema.any_of))
        } else {
            None
        };
        if let Some((keyword, alts)) = alternatives {
            if alts.len() > 1 {
                warnings.push(SchemaWarning::CompositionBranchSelected {
                    path: path.to_string(),
                    keyword,
                    branches: alts.len(),
                });
            }
            let first = self.flatten_part(&alts[0], path, depth, warnings);
            merge_into(&mut merged, &first);
        }

        let mut own = schema.clone();
        own.all_of.clear();
        own.one_of.clear();
        own.any_of.clear();
        merge_into(&mut merged, &own);

        merged
    }

    fn flatten_part(
        &self,
        part: &SchemaOrRef,
        path: &str,
        depth: usize,
        warnings: &mut Vec<SchemaWarning>,
    ) -> Schema {
        match part {
            SchemaOrRef::Ref { ref_path } => {
                warnings.push(SchemaWarning::UnresolvedReference {
                    path: path.to_string(),
                    reference: ref_path.clone(),
                });
                permissive_schema(Some(ref_path))
            }
            SchemaOrRef::Schema(s) => self.flatten(s, path, depth + 1, warnings),
        }
    }
}

/// Later scalars win; properties and required names accumulate.
fn merge_into(target: &mut Schema, source: &Schema) {
    macro_rules! take {
        ($($field:ident),* $(,)?) => {
            $(
                if source.$field.is_some() {
                    target.$field = source.$field.clone();
                }
            )*
        };
    }
    take!(
        schema_type,
        format,
        title,
        description,
        default_value,
        nullable,
        items,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of,
        min_length,
        max_length,
        pattern,
        min_items,
        max_items,
        unique_items,
        read_only,
        write_only,
        example,
    );

    if !source.enum_values.is_empty() {
        target.enum_values = source.enum_values.clone();
    }
    for (name, prop) in &source.properties {
        target.properties.insert(name.clone(), prop.clone());
    }
    for name in &source.required {
        if !target.required.contains(name) {
            target.required.push(name.clone());
        }
    }
}

fn infer_type(schema: &Schema) -> (SchemaType, bool) {
    match &schema.schema_type {
        Some(TypeSet::Single(t)) => (*t, false),
        Some(TypeSet::Multiple(types)) => {
            let nullable = types.contains(&SchemaType::Null);
            let primary = types
                .iter()
                .copied()
                .find(|t| *t != SchemaType::Null)
                .unwrap_or(SchemaType::Null);
            (primary, nullable)
        }
        None => {
            if !schema.properties.is_empty() {
                (SchemaType::Object, false)
            } else if schema.items.is_some() {
                (SchemaType::Array, false)
            } else if let Some(first) = schema.enum_values.first() {
                (json_type(first), false)
            } else {
                (SchemaType::String, false)
            }
        }
    }
}

fn json_type(value: &serde_json::Value) -> SchemaType {
    match value {
        serde_json::Value::Null => SchemaType::Null,
        serde_json::Value::Bool(_) => SchemaType::Boolean,
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => SchemaType::Integer,
        serde_json::Value::Number(_) => SchemaType::Number,
        serde_json::Value::String(_) => SchemaType::String,
        serde_json::Value::Array(_) => SchemaType::Array,
        serde_json::Value::Object(_) => SchemaType::Object,
    }
}

fn extract_constraints(schema: &Schema) -> Constraints {
    let (minimum, exclusive_minimum) = normalize_bound(schema.minimum, schema.exclusive_minimum);
    let (maximum, exclusive_maximum) = normalize_bound(schema.maximum, schema.exclusive_maximum);

    Constraints {
        format: schema.format.clone(),
        pattern: schema.pattern.clone(),
        min_length: schema.min_length,
        max_length: schema.max_length,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of: schema.multiple_of.filter(|m| *m > 0.0),
        enum_values: schema.enum_values.clone(),
        items: None,
        properties: Default::default(),
        required: schema.required.clone(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items.unwrap_or(false),
        nullable: schema.nullable.unwrap_or(false),
        example: schema.example.clone(),
        default_value: schema.default_value.clone(),
        description: schema.description.clone(),
        read_only: schema.read_only.unwrap_or(false),
        write_only: schema.write_only.unwrap_or(false),
    }
}

/// OpenAPI 3.0 marks `minimum` exclusive with a flag; 3.1 gives the bound directly.
fn normalize_bound(inclusive: Option<f64>, exclusive: Option<ExclusiveBound>) -> (Option<f64>, Option<f64>) {
    match exclusive {
        Some(ExclusiveBound::Flag(true)) => (None, inclusive),
        Some(ExclusiveBound::Value(v)) => (inclusive, Some(v)),
        Some(ExclusiveBound::Flag(false)) | None => (inclusive, None),
    }
}

fn permissive_schema(reference: Option<&str>) -> Schema {
    Schema {
        description: reference.map(|r| format!("Reference: {r}")),
        ..Schema::of_type(SchemaType::String)
    }
}

fn permissive(reference: Option<&str>, field_path: Vec<String>, context: &AnalysisContext) -> ResolvedSchema {
    ResolvedSchema {
        schema_type: SchemaType::String,
        constraints: Constraints {
            description: reference.map(|r| format!("Reference: {r}")),
            ..Constraints::default()
        },
        context: SchemaContext {
            field_path,
            is_required: context.is_required,
            depth: context.depth,
            domain_hints: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::DomainType;

    fn schema(json: serde_json::Value) -> SchemaOrRef {
        serde_json::from_value(json).unwrap()
    }

    fn analyze(json: serde_json::Value) -> Resolution<ResolvedSchema> {
        SchemaAnalyzer::new().analyze_schema(&schema(json), "requestBody", &AnalysisContext::root())
    }

    #[test]
    fn test_all_of_later_scalars_win_and_properties_union() {
        let res = analyze(serde_json::json!({
            "allOf": [
                {"type": "object", "properties": {"id": {"type": "integer"}}, "required": ["id"], "description": "base"},
                {"properties": {"name": {"type": "string"}}, "required": ["name"], "description": "derived"}
            ]
        }));
        let resolved = res.value;
        assert_eq!(resolved.schema_type, SchemaType::Object);
        assert_eq!(resolved.constraints.description.as_deref(), Some("derived"));
        assert_eq!(
            resolved.constraints.properties.keys().collect::<Vec<_>>(),
            vec!["id", "name"]
        );
        assert_eq!(resolved.constraints.required, vec!["id", "name"]);
        assert!(resolved.constraints.properties["name"].is_required());
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn test_parent_keywords_apply_after_all_of() {
        let res = analyze(serde_json::json!({
            "allOf": [{"type": "string", "maxLength": 10}],
            "maxLength": 5
        }));
        assert_eq!(res.value.constraints.max_length, Some(5));
    }

    #[test]
    fn test_one_of_picks_first_branch_with_warning() {
        let res = analyze(serde_json::json!({
            "oneOf": [
                {"type": "object", "properties": {"card": {"type": "string"}}},
                {"type": "object", "properties": {"iban": {"type": "string"}}}
            ]
        }));
        assert!(res.value.constraints.properties.contains_key("card"));
        assert!(!res.value.constraints.properties.contains_key("iban"));
        assert_eq!(
            res.warnings,
            vec![SchemaWarning::CompositionBranchSelected {
                path: "requestBody".to_string(),
                keyword: "oneOf",
                branches: 2,
            }]
        );
    }

    #[test]
    fn test_branches_keep_shared_keywords() {
        let analyzer = SchemaAnalyzer::new();
        let s = schema(serde_json::json!({
            "description": "payment",
            "anyOf": [{"type": "integer"}, {"type": "string"}]
        }));
        let branches = analyzer.branches(&s);
        assert_eq!(branches.len(), 2);
        let second = analyzer.analyze_schema(&branches[1], "body", &AnalysisContext::root());
        assert_eq!(second.value.schema_type, SchemaType::String);
        assert_eq!(second.value.constraints.description.as_deref(), Some("payment"));
        assert!(second.is_clean());
    }

    #[test]
    fn test_unresolved_ref_degrades_to_string() {
        let res = analyze(serde_json::json!({
            "type": "object",
            "properties": {"owner": {"$ref": "#/components/schemas/User"}}
        }));
        let owner = &res.value.constraints.properties["owner"];
        assert_eq!(owner.schema_type, SchemaType::String);
        assert_eq!(
            owner.constraints.description.as_deref(),
            Some("Reference: #/components/schemas/User")
        );
        assert_eq!(res.warnings.len(), 1);
        assert!(res.warnings[0].to_string().contains("requestBody.owner"));
    }

    #[test]
    fn test_type_array_with_null_is_nullable() {
        let res = analyze(serde_json::json!({"type": ["string", "null"]}));
        assert_eq!(res.value.schema_type, SchemaType::String);
        assert!(res.value.constraints.nullable);
    }

    #[test]
    fn test_exclusive_flag_is_normalized() {
        let res = analyze(serde_json::json!({
            "type": "number",
            "minimum": 0,
            "exclusiveMinimum": true,
            "maximum": 10
        }));
        let c = &res.value.constraints;
        assert_eq!(c.minimum, None);
        assert_eq!(c.exclusive_minimum, Some(0.0));
        assert_eq!(c.maximum, Some(10.0));
    }

    #[test]
    fn test_depth_limit_terminates() {
        let mut json = serde_json::json!({"type": "string"});
        for _ in 0..(MAX_SCHEMA_DEPTH + 3) {
            json = serde_json::json!({"type": "object", "properties": {"child": json}});
        }
        let res = analyze(json);
        assert!(
            res.warnings
                .iter()
                .any(|w| matches!(w, SchemaWarning::DepthLimitReached { .. }))
        );
    }

    #[test]
    fn test_field_paths_and_domain_hints() {
        let res = analyze(serde_json::json!({
            "type": "object",
            "required": ["email"],
            "properties": {
                "email": {"type": "string", "format": "email"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }));
        let email = &res.value.constraints.properties["email"];
        assert_eq!(email.path(), "requestBody.email");
        assert!(email.is_required());
        assert_eq!(email.context.depth, 1);
        assert!(email.has_domain(DomainType::Personal));

        let tags = &res.value.constraints.properties["tags"];
        assert!(!tags.is_required());
        let items = tags.constraints.items.as_ref().unwrap();
        assert_eq!(items.path(), "requestBody.tags[]");
        assert_eq!(items.field_name(), "tags[]");
    }

    #[test]
    fn test_parameter_analysis_uses_location_prefix() {
        let param: Parameter = serde_json::from_value(serde_json::json!({
            "name": "limit",
            "in": "query",
            "schema": {"type": "integer", "minimum": 1, "maximum": 100},
            "example": 20
        }))
        .unwrap();
        let res = SchemaAnalyzer::new().analyze_parameter(&param);
        assert_eq!(res.value.path(), "query.limit");
        assert!(!res.value.is_required());
        assert_eq!(res.value.constraints.example, Some(serde_json::json!(20)));
    }
}
