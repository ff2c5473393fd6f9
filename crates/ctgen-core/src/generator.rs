use std::collections::HashSet;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisContext, CredentialLocation, SchemaAnalyzer, SecurityAnalyzer,
};
use crate::error::{GenerateError, SynthesisError};
use crate::ir::{SuiteMetadata, SuiteSetup, TestCase, TestSuite, TestType, slugify};
use crate::mock::MockDataGenerator;
use crate::parse::{ParameterLocation, ParsedOperation, ParsedSpec};
use crate::synth::{
    AuthSynthesizer, BoundarySynthesizer, EdgeCaseSynthesizer, ErrorCaseSynthesizer,
    ParameterSchema, PerformanceSynthesizer, SuccessSynthesizer, SynthesisContext, Synthesizer,
    valid_credential, validate_operation,
};

/// How `oneOf`/`anyOf` request bodies are covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionStrategy {
    /// Generate against the first alternative only.
    #[default]
    FirstBranch,
    /// Repeat success and boundary synthesis for every alternative.
    PerBranch,
}

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub categories: Vec<TestType>,
    pub composition: CompositionStrategy,
    /// Makes mock values reproducible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub provider_mode: bool,
    /// Abort on the first malformed operation instead of skipping it.
    pub strict: bool,
    pub base_url: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            categories: TestType::ALL.to_vec(),
            composition: CompositionStrategy::default(),
            seed: None,
            provider_mode: false,
            strict: false,
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn enables(&self, category: TestType) -> bool {
        self.categories.contains(&category)
    }
}

/// Turns a `ParsedSpec` into a `TestSuite`.
pub struct TestGenerator {
    options: GenerationOptions,
    analyzer: SchemaAnalyzer,
    synthesizers: Vec<Box<dyn Synthesizer>>,
}

impl TestGenerator {
    pub fn new(options: GenerationOptions) -> Self {
        Self {
            options,
            analyzer: SchemaAnalyzer::new(),
            synthesizers: vec![
                Box::new(SuccessSynthesizer),
                Box::new(BoundarySynthesizer),
                Box::new(EdgeCaseSynthesizer::new()),
                Box::new(AuthSynthesizer::new()),
                Box::new(ErrorCaseSynthesizer::new()),
                Box::new(PerformanceSynthesizer),
            ],
        }
    }

    /// Replace the synthesizer of the same category.
    pub fn with_synthesizer(mut self, synthesizer: Box<dyn Synthesizer>) -> Self {
        let category = synthesizer.category();
        match self.synthesizers.iter().position(|s| s.category() == category) {
            Some(i) => self.synthesizers[i] = synthesizer,
            None => self.synthesizers.push(synthesizer),
        }
        self
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn generate(&self, spec: &ParsedSpec) -> Result<TestSuite, GenerateError> {
        let mut mock = MockDataGenerator::new(self.options.seed);
        let security = SecurityAnalyzer::new(&spec.security_schemes, &spec.security);

        let mut tests = Vec::new();
        let mut warnings = Vec::new();
        let mut skipped = Vec::new();

        for op in &spec.operations {
            log::debug!("synthesizing {}", op.label());
            match self.operation_cases(op, &security, &mut mock, &mut warnings) {
                Ok(cases) => tests.extend(cases),
                Err(e) if !self.options.strict => {
                    log::warn!("skipping {}: {e}", op.label());
                    skipped.push(op.label());
                }
                Err(e) => return Err(e.into()),
            }
        }

        dedupe_names(&mut tests);
        let mut seen = HashSet::new();
        warnings.retain(|w| seen.insert(w.clone()));

        let mut provider_states = Vec::new();
        for state in tests.iter().filter_map(|t| t.provider_state.as_ref()) {
            if !provider_states.contains(state) {
                provider_states.push(state.clone());
            }
        }

        let slug = slugify(&spec.info.title);
        log::debug!("{} test cases for {}", tests.len(), spec.info.title);

        Ok(TestSuite {
            name: spec.info.title.clone(),
            consumer: format!("{slug}-consumer"),
            provider: format!("{slug}-provider"),
            tests,
            setup: SuiteSetup {
                base_url: self.options.base_url.clone(),
                provider_states,
                auth_headers: auth_headers(spec, &security),
            },
            metadata: SuiteMetadata {
                title: spec.info.title.clone(),
                version: spec.info.version.clone(),
                language: None,
                framework: None,
                generated_at: Utc::now(),
                is_provider_mode: self.options.provider_mode,
                operation_count: spec.operations.len(),
                warnings,
                skipped_operations: skipped,
            },
            is_provider_mode: self.options.provider_mode,
        })
    }

    fn operation_cases(
        &self,
        op: &ParsedOperation,
        security: &SecurityAnalyzer<'_>,
        mock: &mut MockDataGenerator,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        validate_operation(op)?;

        let base = self.context(op, security, mock, warnings);
        let branches = match self.options.composition {
            CompositionStrategy::PerBranch => self.branch_contexts(&base, warnings),
            CompositionStrategy::FirstBranch => Vec::new(),
        };

        let mut cases = Vec::new();
        for synth in &self.synthesizers {
            let category = synth.category();
            if !self.options.enables(category) {
                continue;
            }
            let per_branch = matches!(category, TestType::Success | TestType::Boundary);
            if per_branch && !branches.is_empty() {
                for ctx in &branches {
                    cases.extend(synth.synthesize(ctx, mock)?);
                }
            } else {
                cases.extend(synth.synthesize(&base, mock)?);
            }
        }
        Ok(cases)
    }

    fn context<'a>(
        &self,
        op: &'a ParsedOperation,
        security: &SecurityAnalyzer<'_>,
        mock: &mut MockDataGenerator,
        warnings: &mut Vec<String>,
    ) -> SynthesisContext<'a> {
        let label = op.label();
        let mut note = |w: &dyn std::fmt::Display| warnings.push(format!("{label}: {w}"));

        let mut ctx = SynthesisContext::new(op);
        if let Some(schema) = op.request_schema() {
            let resolution = self
                .analyzer
                .analyze_schema(schema, "requestBody", &AnalysisContext::root());
            resolution.warnings.iter().for_each(|w| note(w));
            ctx.body = Some(resolution.value);
        }
        for param in &op.parameters {
            let resolution = self.analyzer.analyze_parameter(param);
            resolution.warnings.iter().for_each(|w| note(w));
            ctx.parameters.push(ParameterSchema {
                name: param.name.clone(),
                location: param.location,
                required: param.required || param.location == ParameterLocation::Path,
                schema: resolution.value,
            });
        }
        if let Some(schema) = op.success_response().and_then(|(_, r)| r.json_schema()) {
            let resolution = self
                .analyzer
                .analyze_schema(schema, "responseBody", &AnalysisContext::root());
            resolution.warnings.iter().for_each(|w| note(w));
            ctx.success_body = Some(resolution.value);
        }
        ctx.security = security.analyze(op);
        ctx.alternatives = security.alternatives(op, &ctx.security);
        ctx.fill_path_values(mock);
        ctx
    }

    /// One context per body alternative, or none when the body has no choice.
    fn branch_contexts<'a>(&self, base: &SynthesisContext<'a>, warnings: &mut Vec<String>) -> Vec<SynthesisContext<'a>> {
        let Some(schema) = base.operation.request_schema() else {
            return Vec::new();
        };
        let branches = self.analyzer.branches(schema);
        if branches.len() < 2 {
            return Vec::new();
        }
        branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let resolution = self
                    .analyzer
                    .analyze_schema(branch, "requestBody", &AnalysisContext::root());
                for w in &resolution.warnings {
                    warnings.push(format!("{}: {w}", base.operation.label()));
                }
                let mut ctx = base.clone();
                ctx.body = Some(resolution.value);
                ctx.variant = Some(format!("branch{}", i + 1));
                ctx
            })
            .collect()
    }
}

impl Default for TestGenerator {
    fn default() -> Self {
        Self::new(GenerationOptions::default())
    }
}

/// Suffix repeated names with `_2`, `_3`, ... keeping ids in step.
fn dedupe_names(tests: &mut [TestCase]) {
    let mut used: HashSet<String> = HashSet::new();
    for test in tests.iter_mut() {
        if used.insert(test.name.clone()) {
            continue;
        }
        let mut n = 2;
        let mut candidate = format!("{}_{n}", test.name);
        while used.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{n}", test.name);
        }
        used.insert(candidate.clone());
        test.id = candidate.clone();
        test.name = candidate;
    }
}

/// Header credentials that make requests pass, one per header name.
fn auth_headers(spec: &ParsedSpec, security: &SecurityAnalyzer<'_>) -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    for op in &spec.operations {
        for info in security.analyze(op) {
            if let Some(credential) = valid_credential(&info)
                && credential.location == CredentialLocation::Header
            {
                headers.entry(credential.name).or_insert(credential.value);
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::HttpMethod;
    use serde_json::json;

    fn spec_with(ops: Vec<ParsedOperation>) -> ParsedSpec {
        let mut spec = ParsedSpec::new("Pet Store", "1.0.0");
        spec.operations = ops;
        spec
    }

    fn only(categories: &[TestType]) -> GenerationOptions {
        GenerationOptions {
            categories: categories.to_vec(),
            seed: Some(7),
            ..GenerationOptions::default()
        }
    }

    #[test]
    fn test_suite_identity() {
        let spec = spec_with(vec![ParsedOperation::new(HttpMethod::Get, "/pets")]);
        let suite = TestGenerator::new(only(&[TestType::Success])).generate(&spec).unwrap();
        assert_eq!(suite.name, "Pet Store");
        assert_eq!(suite.consumer, "pet-store-consumer");
        assert_eq!(suite.provider, "pet-store-provider");
        assert_eq!(suite.tests.len(), 3);
        assert_eq!(suite.metadata.operation_count, 1);
        assert_eq!(suite.setup.provider_states, vec!["pet records exist"]);
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let spec = spec_with(vec![
            ParsedOperation::new(HttpMethod::Get, "/pets"),
            ParsedOperation::new(HttpMethod::Get, "/pets/"),
        ]);
        let suite = TestGenerator::new(only(&[TestType::Success])).generate(&spec).unwrap();
        let names: Vec<&str> = suite.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "get_pets_success",
                "get_pets_success_minimal",
                "get_pets_success_maximal",
                "get_pets_success_2",
                "get_pets_success_minimal_2",
                "get_pets_success_maximal_2",
            ]
        );
        assert_eq!(suite.tests[3].id, "get_pets_success_2");
    }

    #[test]
    fn test_malformed_operation_is_skipped_unless_strict() {
        let spec = spec_with(vec![
            ParsedOperation::new(HttpMethod::Get, "pets"),
            ParsedOperation::new(HttpMethod::Get, "/owners"),
        ]);
        let suite = TestGenerator::new(only(&[TestType::Success])).generate(&spec).unwrap();
        assert_eq!(suite.metadata.skipped_operations, vec!["GET pets"]);
        assert!(suite.tests.iter().all(|t| t.name.starts_with("get_owners")));

        let strict = GenerationOptions {
            strict: true,
            ..only(&[TestType::Success])
        };
        let err = TestGenerator::new(strict).generate(&spec).unwrap_err();
        assert!(matches!(err, GenerateError::Synthesis(_)));
    }

    #[test]
    fn test_per_branch_composition() {
        let mut op = ParsedOperation::new(HttpMethod::Post, "/pets");
        op.request_body = Some(
            serde_json::from_value(json!({
                "content": {"application/json": {"schema": {
                    "oneOf": [
                        {"type": "object", "properties": {"bark": {"type": "boolean"}}},
                        {"type": "object", "properties": {"meow": {"type": "boolean"}}}
                    ]
                }}}
            }))
            .unwrap(),
        );
        let spec = spec_with(vec![op]);

        let first = TestGenerator::new(only(&[TestType::Success])).generate(&spec).unwrap();
        assert_eq!(first.tests.len(), 3);
        assert!(!first.metadata.warnings.is_empty());

        let per_branch = GenerationOptions {
            composition: CompositionStrategy::PerBranch,
            ..only(&[TestType::Success])
        };
        let suite = TestGenerator::new(per_branch).generate(&spec).unwrap();
        assert_eq!(suite.tests.len(), 6);
        assert_eq!(suite.tests[0].name, "post_pets_success_branch1");
        assert_eq!(suite.tests[3].name, "post_pets_success_branch2");
        assert!(suite.tests[3].request.body.as_ref().unwrap().get("meow").is_some());
    }

    #[test]
    fn test_options_deserialize_snake_case() {
        let options: GenerationOptions =
            serde_yaml_ng::from_str("categories: [auth, error]\ncomposition: per_branch\nseed: 3\n").unwrap();
        assert_eq!(options.categories, vec![TestType::Auth, TestType::Error]);
        assert_eq!(options.composition, CompositionStrategy::PerBranch);
        assert_eq!(options.seed, Some(3));
        assert_eq!(options.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_auth_headers_from_bearer_scheme() {
        let mut spec = spec_with(vec![ParsedOperation::new(HttpMethod::Get, "/pets")]);
        spec.security_schemes
            .insert("bearerAuth".to_string(), crate::parse::SecurityScheme::bearer());
        let mut requirement = IndexMap::new();
        requirement.insert("bearerAuth".to_string(), Vec::new());
        spec.security = vec![requirement];
        let suite = TestGenerator::new(only(&[TestType::Auth])).generate(&spec).unwrap();
        assert_eq!(suite.setup.auth_headers["Authorization"], "Bearer valid-test-token");
        assert_eq!(suite.tests.len(), 3);
    }

    #[test]
    fn test_combined_requirement_sends_every_credential() {
        let mut spec = spec_with(vec![ParsedOperation::new(HttpMethod::Get, "/pets")]);
        spec.security_schemes
            .insert("bearerAuth".to_string(), crate::parse::SecurityScheme::bearer());
        spec.security_schemes.insert(
            "apiKey".to_string(),
            crate::parse::SecurityScheme::api_key("X-API-Key", crate::parse::ApiKeyLocation::Header),
        );
        let mut requirement = IndexMap::new();
        requirement.insert("bearerAuth".to_string(), Vec::new());
        requirement.insert("apiKey".to_string(), Vec::new());
        spec.security = vec![requirement];

        let suite = TestGenerator::new(only(&[TestType::Success, TestType::Auth]))
            .generate(&spec)
            .unwrap();
        let success = suite.tests.iter().find(|t| t.name == "get_pets_success").unwrap();
        assert_eq!(success.request.headers["Authorization"], "Bearer valid-test-token");
        assert_eq!(success.request.headers["X-API-Key"], "valid-test-token");

        let missing_key = suite
            .tests
            .iter()
            .find(|t| t.name == "get_pets_auth_api_key_missing")
            .unwrap();
        assert!(!missing_key.request.headers.contains_key("X-API-Key"));
        assert_eq!(missing_key.request.headers["Authorization"], "Bearer valid-test-token");
    }
}
