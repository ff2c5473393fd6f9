pub mod analysis;
pub mod backend;
pub mod codestyle;
pub mod config;
pub mod error;
pub mod generator;
pub mod ir;
pub mod mock;
pub mod output;
pub mod parse;
pub mod synth;
pub mod template;

pub use backend::{BackendFeatures, LanguageGeneratorBackend};
pub use config::{Language, LanguageConfig, ProjectConfig};
pub use error::{ConfigIssue, GenerateError, ParseError, SynthesisError};
pub use generator::{CompositionStrategy, GenerationOptions, TestGenerator};
pub use ir::{TestCase, TestSuite, TestType};
pub use output::{Dependency, DependencyScope, FileType, GeneratedFile, GeneratedOutput};
pub use template::{Rendered, TemplateEngine};
