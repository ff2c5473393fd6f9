pub mod engine;

pub use engine::{Helper, Rendered, TemplateEngine, TemplateWarning, lookup};
