use super::{SynthesisContext, Synthesizer};
use crate::error::SynthesisError;
use crate::ir::{Scenario, TestCase, TestType};
use crate::mock::MockDataGenerator;

/// Default, minimal and maximal happy-path requests.
pub struct SuccessSynthesizer;

impl Synthesizer for SuccessSynthesizer {
    fn category(&self) -> TestType {
        TestType::Success
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        let label = ctx.operation.label();
        let status = ctx.success_status();
        let summary = ctx
            .operation
            .summary
            .clone()
            .unwrap_or_else(|| label.clone());

        let variants = [
            (None, false, false, "a valid request"),
            (Some("minimal"), false, true, "only required fields and parameters"),
            (Some("maximal"), true, false, "every optional field and parameter"),
        ];

        let mut cases = Vec::with_capacity(variants.len());
        for (discriminator, all_params, minimal, sent) in variants {
            let request = ctx.valid_request(mock, all_params, minimal);
            let response = ctx.success_response(mock);
            let mut case = TestCase::new(
                ctx.case_name(TestType::Success, discriminator),
                TestType::Success,
                request,
                response,
            )
            .with_description(format!("{summary}: succeeds with {sent}"))
            .with_scenario(Scenario::new(
                "the provider is available",
                format!("{label} is called with {sent}"),
                format!("it responds with {status}"),
            ));
            if let Some(state) = ctx.provider_state() {
                case = case.with_provider_state(state);
            }
            for tag in &ctx.operation.tags {
                case = case.with_tag(tag.clone());
            }
            cases.push(case);
        }
        Ok(cases)
    }
}
