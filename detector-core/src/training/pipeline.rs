//! Training Pipeline - merge, clean, summarize, train, evaluate
//!
//! Stages run strictly in order and communicate only through files in the
//! data directory. Any error aborts the run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array2, Axis};
use thiserror::Error;

use super::dataset::{clean_table, merge_tables, Dataset, DatasetError, DatasetSummary, RawTable};
use super::metrics::{f1_score, ClassificationReport};
use super::split::{stratified_split, SplitError};
use crate::constants::{
    COMBINED_DATASET_FILE, DEFAULT_DATA_DIR, DEFAULT_MODEL_PATH, DEFAULT_SEED, DEFAULT_TEST_SIZE,
    DEFAULT_TREES, KAGGLE_DATASET_FILE, UCI_DATASET_FILE,
};
use crate::model::{ArtifactError, ForestParams, ModelArtifact, ModelError, RandomForest};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Unknown stage '{0}' (expected merge, clean, summarize, train, evaluate or all)")]
    UnknownStage(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub model_path: PathBuf,
    pub n_estimators: usize,
    pub seed: u64,
    pub test_size: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            n_estimators: DEFAULT_TREES,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
        }
    }
}

impl PipelineConfig {
    pub fn kaggle_path(&self) -> PathBuf {
        self.data_dir.join(KAGGLE_DATASET_FILE)
    }

    pub fn uci_path(&self) -> PathBuf {
        self.data_dir.join(UCI_DATASET_FILE)
    }

    pub fn combined_path(&self) -> PathBuf {
        self.data_dir.join(COMBINED_DATASET_FILE)
    }

    fn forest_params(&self) -> ForestParams {
        ForestParams::default()
            .with_trees(self.n_estimators)
            .with_seed(self.seed)
    }
}

/// Which stage(s) to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Merge,
    Clean,
    Summarize,
    Train,
    Evaluate,
    All,
}

impl Stage {
    pub const NAMES: [&'static str; 6] = ["merge", "clean", "summarize", "train", "evaluate", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Merge => "merge",
            Stage::Clean => "clean",
            Stage::Summarize => "summarize",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
            Stage::All => "all",
        }
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(Stage::Merge),
            "clean" => Ok(Stage::Clean),
            "summarize" => Ok(Stage::Summarize),
            "train" => Ok(Stage::Train),
            "evaluate" => Ok(Stage::Evaluate),
            "all" => Ok(Stage::All),
            other => Err(PipelineError::UnknownStage(other.to_string())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STAGES
// ============================================================================

/// Stage 1: Kaggle rows mapped onto the UCI schema, written to the combined file
pub fn merge_datasets(config: &PipelineConfig) -> Result<RawTable> {
    let uci = RawTable::read_csv(&config.uci_path())?;
    let kaggle = RawTable::read_csv(&config.kaggle_path())?;

    let merged = merge_tables(uci, kaggle)?;
    merged.write_csv(&config.combined_path())?;

    log::info!(
        "Combined dataset saved to {} ({} rows)",
        config.combined_path().display(),
        merged.len()
    );
    Ok(merged)
}

/// Stage 2: integer-normalize and deduplicate the combined file in place.
/// Returns the cleaned dataset and the number of duplicate rows dropped.
pub fn clean_dataset(config: &PipelineConfig) -> Result<(Dataset, usize)> {
    let table = RawTable::read_csv(&config.combined_path())?;
    let (dataset, removed) = clean_table(&table)?;
    dataset.write_csv(&config.combined_path())?;

    log::info!(
        "Cleaned dataset saved to {} ({} duplicates dropped)",
        config.combined_path().display(),
        removed
    );
    Ok((dataset, removed))
}

/// Stage 3: log shape, column types, missing cells, duplicates, class
/// balance and per-column statistics of the combined file.
///
/// `duplicates_removed` is what an earlier clean dropped, so the reported
/// duplicate count is the one before cleaning.
pub fn summarize(config: &PipelineConfig, duplicates_removed: usize) -> Result<DatasetSummary> {
    let table = RawTable::read_csv(&config.combined_path())?;
    let summary = DatasetSummary::from_table(&table)?.with_duplicates_removed(duplicates_removed);
    summary.log();
    Ok(summary)
}

/// Held-out partition shared by training and evaluation
struct Partition {
    x_train: Array2<f64>,
    y_train: Vec<i64>,
    x_test: Array2<f64>,
    y_test: Vec<i64>,
}

fn partition(dataset: &Dataset, config: &PipelineConfig) -> Result<Partition> {
    let (x, y) = dataset.features_and_labels()?;
    let split = stratified_split(&y, config.test_size, config.seed)?;

    Ok(Partition {
        x_train: x.select(Axis(0), &split.train),
        y_train: split.train.iter().map(|&i| y[i]).collect(),
        x_test: x.select(Axis(0), &split.test),
        y_test: split.test.iter().map(|&i| y[i]).collect(),
    })
}

/// Outcome of the training stage
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub f1: f64,
}

/// Stage 4: fit on the training split, score F1 on the test split, persist
pub fn train_random_forest(config: &PipelineConfig) -> Result<TrainingSummary> {
    let dataset = Dataset::read_csv(&config.combined_path())?;
    let names = dataset.feature_names()?;
    let part = partition(&dataset, config)?;

    let forest = RandomForest::fit(&part.x_train, &part.y_train, config.forest_params())?;
    let predicted = forest.predict_batch(&part.x_test)?;
    let f1 = f1_score(&part.y_test, &predicted);
    log::info!("F1 Score: {:.4}", f1);

    let artifact = ModelArtifact::new(forest, names, Some(f1))?;
    artifact.save(&config.model_path)?;

    Ok(TrainingSummary {
        train_rows: part.y_train.len(),
        test_rows: part.y_test.len(),
        f1,
    })
}

/// Stage 5: reload the artifact and score it on the same held-out split
pub fn evaluate_saved_model(config: &PipelineConfig) -> Result<ClassificationReport> {
    let dataset = Dataset::read_csv(&config.combined_path())?;
    let part = partition(&dataset, config)?;

    let artifact = ModelArtifact::load(&config.model_path)?;
    let predicted = artifact.forest.predict_batch(&part.x_test)?;
    let report = ClassificationReport::from_labels(&part.y_test, &predicted);

    log::info!("Model Evaluation Report:\n{}", report);
    Ok(report)
}

/// Run one stage, or all of them in order
pub fn run(config: &PipelineConfig, stage: Stage) -> Result<()> {
    log::info!("Running pipeline stage '{}' in {}", stage, config.data_dir.display());

    match stage {
        Stage::Merge => {
            merge_datasets(config)?;
        }
        Stage::Clean => {
            clean_dataset(config)?;
        }
        Stage::Summarize => {
            summarize(config, 0)?;
        }
        Stage::Train => {
            train_random_forest(config)?;
        }
        Stage::Evaluate => {
            evaluate_saved_model(config)?;
        }
        Stage::All => {
            merge_datasets(config)?;
            let (_, removed) = clean_dataset(config)?;
            summarize(config, removed)?;
            train_random_forest(config)?;
            evaluate_saved_model(config)?;
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
