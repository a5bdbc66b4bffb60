//! Model Module - Classifier, artifacts and loading
//!
//! The service depends only on the `Classifier` trait; the random forest
//! and its artifact envelope are one implementation of it.

pub mod artifact;
pub mod classifier;
pub mod forest;
pub mod label;
pub mod loader;

// Re-export common types
pub use artifact::{ArtifactError, ModelArtifact, ModelMetadata};
pub use classifier::{Classifier, ModelError};
pub use forest::{ForestParams, RandomForest};
pub use label::{Label, LabelVocabulary};
pub use loader::{load_model, ModelHandle, ModelStatus};
