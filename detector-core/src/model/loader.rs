//! Model Loader - one-shot artifact loading
//!
//! Loads the artifact once at startup. A failed load is not fatal: the
//! handle records the reason and the service keeps answering health and
//! introspection routes while refusing predictions.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::artifact::ModelArtifact;
use super::classifier::Classifier;
use crate::features::FeatureSchema;

/// Loader outcome, shared read-only for the lifetime of the process
#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<dyn Classifier>),
    Unavailable { reason: String },
}

/// Loader status as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    Error,
}

impl ModelHandle {
    pub fn loaded<C: Classifier + 'static>(classifier: C) -> Self {
        ModelHandle::Loaded(Arc::new(classifier))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelHandle::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        match self {
            ModelHandle::Loaded(classifier) => Some(classifier),
            ModelHandle::Unavailable { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelHandle::Loaded(_))
    }

    pub fn feature_count(&self) -> Option<usize> {
        self.classifier().map(|c| c.feature_count())
    }

    pub fn status(&self) -> ModelStatus {
        if self.is_loaded() {
            ModelStatus::Loaded
        } else {
            ModelStatus::Error
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelHandle::Loaded(c) => f
                .debug_struct("Loaded")
                .field("name", &c.name())
                .field("feature_count", &c.feature_count())
                .finish(),
            ModelHandle::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Load the artifact at `path`. Never fails; see `ModelHandle::Unavailable`.
pub fn load_model(path: &Path) -> ModelHandle {
    log::info!("Loading model artifact from: {}", path.display());

    match ModelArtifact::load(path) {
        Ok(artifact) => {
            log::info!(
                "Model loaded successfully: {} trees, {} features, trained {}",
                artifact.metadata.n_estimators,
                artifact.metadata.feature_count,
                artifact.metadata.trained_at.to_rfc3339()
            );
            ModelHandle::loaded(artifact)
        }
        Err(e) => {
            log::error!("Error loading model: {}", e);
            ModelHandle::unavailable(e.to_string())
        }
    }
}

/// Startup diagnostic: compare the loaded model against the serving schema.
/// Returns false (and logs a warning) when they disagree. The model stays
/// loaded either way; mismatched requests fail individually.
pub fn check_schema(handle: &ModelHandle, schema: &FeatureSchema) -> bool {
    let Some(classifier) = handle.classifier() else {
        return true;
    };

    if classifier.feature_count() != schema.feature_count() {
        log::warn!(
            "Model expects {} features but schema '{}' defines {}",
            classifier.feature_count(),
            schema.name,
            schema.feature_count()
        );
        return false;
    }

    if let Some(names) = classifier.feature_names() {
        if !schema.matches_names(names) {
            log::warn!(
                "Model feature names differ from schema '{}' (same count, different columns or order)",
                schema.name
            );
            return false;
        }
    }

    true
}
