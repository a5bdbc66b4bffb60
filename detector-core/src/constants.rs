//! Central Configuration Constants
//!
//! Single source of truth for pipeline and service defaults.
//! To move the dataset directory or model file, only edit this file.

/// Directory holding the raw, merged and cleaned datasets
pub const DEFAULT_DATA_DIR: &str = "dataset";

/// Kaggle phishing dataset (renamed onto the UCI schema during merge)
pub const KAGGLE_DATASET_FILE: &str = "phishing_kaggle.csv";

/// UCI phishing dataset (canonical column set and order)
pub const UCI_DATASET_FILE: &str = "phishing_uci.csv";

/// Merged dataset, overwritten in place by the cleaning stage
pub const COMBINED_DATASET_FILE: &str = "phishing_combined.csv";

/// Serialized model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "phishing_model.json";

/// Label column shared by both datasets after merge
pub const LABEL_COLUMN: &str = "Result";

/// Seed shared by the train/test split and the forest.
/// Evaluation reproduces the training split only if this stays fixed.
pub const DEFAULT_SEED: u64 = 42;

/// Held-out proportion for the stratified split
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Number of trees in the forest
pub const DEFAULT_TREES: usize = 100;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";
