//! Training Module - offline dataset preparation and model fitting

pub mod dataset;
pub mod metrics;
pub mod pipeline;
pub mod split;

// Re-export common types
pub use dataset::{ColumnStats, ColumnType, Dataset, DatasetError, DatasetSummary, RawTable};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use pipeline::{run, PipelineConfig, PipelineError, Stage};
pub use split::{stratified_split, SplitError, TrainTestSplit};
