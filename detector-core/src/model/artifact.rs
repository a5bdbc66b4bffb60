//! Model Artifact - persisted forest plus metadata
//!
//! JSON envelope: `{ format_version, metadata, checksum, forest }`.
//! The checksum is the SHA-256 of the serialized forest and is verified on
//! every load, so a truncated or hand-edited artifact is refused instead of
//! silently serving a different model.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::classifier::{Classifier, ModelError};
use super::forest::RandomForest;
use super::label::Label;

/// Current artifact envelope version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Metadata declares {declared} features but the forest was fit on {actual}")]
    FeatureCountMismatch { declared: usize, actual: usize },

    #[error("Corrupt model: {0}")]
    Corrupt(#[from] ModelError),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub feature_count: usize,
    pub classes: Vec<i64>,
    pub n_estimators: usize,
    pub seed: u64,
    /// Held-out F1 reported at training time
    pub f1_score: Option<f64>,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub metadata: ModelMetadata,
    pub checksum: String,
    pub forest: RandomForest,
}

impl ModelArtifact {
    /// Wrap a fitted forest. `feature_names` are the training columns in order.
    pub fn new(
        forest: RandomForest,
        feature_names: Vec<String>,
        f1_score: Option<f64>,
    ) -> Result<Self, ArtifactError> {
        if feature_names.len() != forest.n_features() {
            return Err(ArtifactError::FeatureCountMismatch {
                declared: feature_names.len(),
                actual: forest.n_features(),
            });
        }

        let metadata = ModelMetadata {
            model_type: forest.name().to_string(),
            feature_count: forest.n_features(),
            feature_names,
            classes: forest.classes().to_vec(),
            n_estimators: forest.n_trees(),
            seed: forest.params().seed,
            f1_score,
            trained_at: Utc::now(),
        };

        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            metadata,
            checksum: forest_checksum(&forest)?,
            forest,
        })
    }

    /// Save artifact to disk
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        // Ensure directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(self)?;
        fs::write(path, json)?;
        log::info!("Model artifact saved to {} ({} trees)", path.display(), self.forest.n_trees());
        Ok(())
    }

    /// Load artifact from disk with validation
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&data)?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Version, checksum and structural checks
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let actual = forest_checksum(&self.forest)?;
        if actual != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }

        if self.metadata.feature_count != self.forest.n_features() {
            return Err(ArtifactError::FeatureCountMismatch {
                declared: self.metadata.feature_count,
                actual: self.forest.n_features(),
            });
        }

        self.forest.validate()?;
        Ok(())
    }
}

/// Hex SHA-256 of the compact JSON form of `forest`
pub fn forest_checksum(forest: &RandomForest) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(forest)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

impl Classifier for ModelArtifact {
    fn name(&self) -> &str {
        &self.metadata.model_type
    }

    fn feature_count(&self) -> usize {
        self.forest.n_features()
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.metadata.feature_names)
    }

    fn predict(&self, features: &[f64]) -> Result<Label, ModelError> {
        self.forest.predict(features)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::ForestParams;
    use ndarray::Array2;

    fn fitted() -> ModelArtifact {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let a = (i % 3) as f64 - 1.0;
            let b = (i % 2) as f64;
            values.extend([a, b]);
            labels.push(if b == 1.0 { 1 } else { -1 });
        }
        let x = Array2::from_shape_vec((30, 2), values).unwrap();
        let forest = RandomForest::fit(&x, &labels, ForestParams::default().with_trees(5)).unwrap();
        ModelArtifact::new(forest, vec!["a".to_string(), "b".to_string()], Some(1.0)).unwrap()
    }

    #[test]
    fn test_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        let original = fitted();
        original.save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();

        assert_eq!(loaded, original);
        for row in [[-1.0, 0.0], [0.0, 1.0], [1.0, 1.0]] {
            assert_eq!(loaded.predict(&row).unwrap(), original.predict(&row).unwrap());
        }
    }

    #[test]
    fn test_metadata() {
        let artifact = fitted();
        assert_eq!(artifact.metadata.feature_count, 2);
        assert_eq!(artifact.metadata.classes, vec![-1, 1]);
        assert_eq!(artifact.metadata.n_estimators, 5);
        assert_eq!(artifact.metadata.model_type, "random_forest");
        assert_eq!(artifact.feature_names().unwrap(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelArtifact::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{\"format_version\": 1").unwrap();
        assert!(matches!(ModelArtifact::load(&path), Err(ArtifactError::Serialization(_))));
    }

    #[test]
    fn test_reject_tampered_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut artifact = fitted();
        artifact.checksum = "0".repeat(64);
        artifact.save(&path).unwrap();

        assert!(matches!(
            ModelArtifact::load(&path),
            Err(ArtifactError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_reject_future_version() {
        let mut artifact = fitted();
        artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
        assert!(matches!(
            artifact.verify(),
            Err(ArtifactError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_new_rejects_wrong_name_count() {
        let artifact = fitted();
        let result = ModelArtifact::new(artifact.forest, vec!["only_one".to_string()], None);
        assert!(matches!(
            result,
            Err(ArtifactError::FeatureCountMismatch { declared: 1, actual: 2 })
        ));
    }
}
