pub mod suite;
pub mod test_case;

pub use suite::{SuiteMetadata, SuiteSetup, TestSuite, slugify};
pub use test_case::{
    Expectation, PerformanceConfig, PerformanceKind, RequestSpec, ResponseSpec, Scenario,
    TestCase, TestType, Thresholds,
};
