//! Features Module - Feature Contracts
//!
//! Schemas, vectors, request validation and URL heuristics.
//! Everything that decides which number lands in which column lives here.

pub mod layout;
pub mod url;
pub mod validate;
pub mod vector;


// Re-export common types
pub use layout::{FeatureSchema, FieldKind, FieldSpec, RequestShape, SchemaError};
pub use validate::{validate_request, ValidationError};
pub use vector::FeatureVector;
