//! Classifier seam
//!
//! The service only ever needs `feature_count` and `predict`. Anything that
//! implements this trait can be injected, which is how tests swap in stubs.

use thiserror::Error;

use super::label::Label;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("X has {received} features, but the model is expecting {expected} features as input")]
    ShapeMismatch { expected: usize, received: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Training failed: {0}")]
    Training(String),
}

/// Trait for loaded binary classifiers
pub trait Classifier: Send + Sync {
    /// Short model identifier for logs and introspection
    fn name(&self) -> &str;

    /// Number of features the model was fit on
    fn feature_count(&self) -> usize;

    /// Column names the model was fit on, when the artifact recorded them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Classify one ordered feature vector
    fn predict(&self, features: &[f64]) -> Result<Label, ModelError>;
}

/// Shared input checks for implementors
pub fn check_input(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            received: features.len(),
        });
    }
    if let Some(i) = features.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::InvalidInput(format!(
            "feature {} is not a finite number",
            i
        )));
    }
    Ok(())
}
