pub mod boundary;
pub mod domain;
pub mod resolved;
pub mod schema_analyzer;
pub mod security;

pub use boundary::{BoundaryTarget, BoundaryValue, get_boundary_values};
pub use domain::{DomainHint, DomainScorer, DomainType, FieldSignals};
pub use resolved::{Constraints, ResolvedSchema, SchemaContext};
pub use schema_analyzer::{
    AnalysisContext, MAX_SCHEMA_DEPTH, Resolution, SchemaAnalyzer, SchemaWarning,
};
pub use security::{
    Credential, CredentialKind, CredentialLocation, SecurityAnalyzer, SecurityRequirementInfo,
};
