use super::{SynthesisContext, Synthesizer};
use crate::error::SynthesisError;
use crate::ir::{PerformanceConfig, PerformanceKind, Scenario, TestCase, TestType, Thresholds};
use crate::mock::MockDataGenerator;

/// One mebibyte, the payload used by volume scenarios.
pub const VOLUME_PAYLOAD_BYTES: usize = 1024 * 1024;

fn thresholds(max_response_time_ms: u64, p95_ms: u64, max_error_rate: f64) -> Thresholds {
    Thresholds {
        max_response_time_ms,
        p95_ms,
        max_error_rate,
    }
}

fn config(kind: PerformanceKind, concurrency: u32, duration_secs: u64, thresholds: Thresholds) -> PerformanceConfig {
    PerformanceConfig {
        kind,
        concurrency,
        duration_secs,
        payload_size: None,
        thresholds,
        timeout_ms: None,
        max_retries: None,
        backoff_ms: None,
    }
}

/// Declarative load scenarios; backends turn the config into load loops.
pub struct PerformanceSynthesizer;

impl PerformanceSynthesizer {
    /// The scenarios that apply to the context's operation.
    pub fn plans(ctx: &SynthesisContext<'_>) -> Vec<PerformanceConfig> {
        let mut plans = vec![
            config(PerformanceKind::Load, 10, 60, thresholds(1000, 500, 0.01)),
            config(PerformanceKind::Stress, 100, 120, thresholds(3000, 2000, 0.05)),
        ];
        if ctx.body.is_some() {
            let mut volume = config(PerformanceKind::Volume, 5, 30, thresholds(5000, 3000, 0.01));
            volume.payload_size = Some(VOLUME_PAYLOAD_BYTES);
            plans.push(volume);
        }
        let mut timeout = config(PerformanceKind::Timeout, 1, 10, thresholds(5000, 5000, 0.0));
        timeout.timeout_ms = Some(5000);
        plans.push(timeout);
        plans.push(config(PerformanceKind::Concurrency, 50, 30, thresholds(2000, 1000, 0.02)));
        if ctx.operation.method.is_idempotent() {
            let mut retry = config(PerformanceKind::Retry, 1, 30, thresholds(5000, 3000, 0.0));
            retry.max_retries = Some(3);
            retry.backoff_ms = Some(500);
            plans.push(retry);
        }
        plans
    }
}

impl Synthesizer for PerformanceSynthesizer {
    fn category(&self) -> TestType {
        TestType::Performance
    }

    fn synthesize(
        &self,
        ctx: &SynthesisContext<'_>,
        mock: &mut MockDataGenerator,
    ) -> Result<Vec<TestCase>, SynthesisError> {
        let label = ctx.operation.label();
        let mut cases = Vec::new();

        for plan in Self::plans(ctx) {
            let kind = plan.kind.as_str();
            let request = ctx.valid_request(mock, false, false);
            let response = ctx.success_response(mock);
            let then = match plan.kind {
                PerformanceKind::Timeout => format!(
                    "every response arrives within {} ms",
                    plan.timeout_ms.unwrap_or_default()
                ),
                PerformanceKind::Retry => format!(
                    "transient failures recover within {} retries",
                    plan.max_retries.unwrap_or_default()
                ),
                _ => format!(
                    "p95 stays under {} ms and errors under {}%",
                    plan.thresholds.p95_ms,
                    plan.thresholds.max_error_rate * 100.0
                ),
            };

            let mut case = TestCase::new(
                ctx.case_name(TestType::Performance, Some(kind)),
                TestType::Performance,
                request,
                response,
            )
            .with_description(format!("{label}: {kind} test"))
            .with_scenario(Scenario::new(
                "the provider is available",
                format!(
                    "{} clients call {label} for {}s",
                    plan.concurrency, plan.duration_secs
                ),
                then,
            ))
            .with_tag(kind);
            if let Some(state) = ctx.provider_state() {
                case = case.with_provider_state(state);
            }
            case.performance = Some(plan);
            cases.push(case);
        }
        Ok(cases)
    }
}
