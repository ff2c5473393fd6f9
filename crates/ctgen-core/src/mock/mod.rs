//! Domain-aware mock values for resolved schemas.

pub mod generator;
pub mod heuristics;

pub use generator::{MAX_GENERATED_LENGTH, MockDataGenerator, Variation};
pub use heuristics::{ValueKind, invalid_format_value};
