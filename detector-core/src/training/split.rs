//! Stratified train/test split
//!
//! Rows are grouped by label in ascending order and each group is shuffled
//! with its own pass of one seeded RNG. The same labels and seed always
//! produce the same index sets.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test_size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    #[error("Class {label} has {count} row(s); at least 2 are needed to stratify")]
    ClassTooSmall { label: i64, count: usize },

    #[error("Cannot split an empty label set")]
    Empty,
}

/// Row indices of each partition, sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-class test share: `round(test_size * n)` clamped so each side keeps a row
fn test_count(test_size: f64, n: usize) -> usize {
    let wanted = (test_size * n as f64).round() as usize;
    wanted.clamp(1, n - 1)
}

pub fn stratified_split(
    labels: &[i64],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }
    if labels.is_empty() {
        return Err(SplitError::Empty);
    }

    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        groups.entry(*label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (label, mut rows) in groups {
        if rows.len() < 2 {
            return Err(SplitError::ClassTooSmall {
                label,
                count: rows.len(),
            });
        }
        rows.shuffle(&mut rng);
        let n_test = test_count(test_size, rows.len());
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    log::debug!(
        "Stratified split: {} train rows, {} test rows (seed {})",
        train.len(),
        test.len(),
        seed
    );
    Ok(TrainTestSplit { train, test })
}
