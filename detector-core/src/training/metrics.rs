//! Binary classification metrics.
//!
//! Labels are raw dataset values. The positive class is `RAW_PHISHING` (1)
//! and the matrix label order is `[-1, 1]`. Any ratio with a zero
//! denominator is reported as 0.0.

use std::fmt;

use serde::Serialize;

use crate::model::label::{RAW_LEGITIMATE, RAW_PHISHING};

/// Row/column label order of the confusion matrix
pub const LABEL_ORDER: [i64; 2] = [RAW_LEGITIMATE, RAW_PHISHING];

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

// =============================================================================
// Confusion Matrix
// =============================================================================

/// 2x2 counts. `counts[actual][predicted]`, both indexed by `LABEL_ORDER`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Count pairs. Values outside `LABEL_ORDER` are not counted.
    pub fn from_labels(actual: &[i64], predicted: &[i64]) -> Self {
        debug_assert_eq!(actual.len(), predicted.len());

        let index = |label: i64| LABEL_ORDER.iter().position(|l| *l == label);
        let mut counts = [[0; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            if let (Some(a), Some(p)) = (index(*a), index(*p)) {
                counts[a][p] += 1;
            }
        }
        Self { counts }
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives(), self.true_positives() + self.false_positives())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives(), self.true_positives() + self.false_negatives())
    }

    /// Harmonic mean of precision and recall
    pub fn f1(&self) -> f64 {
        let tp = self.true_positives();
        ratio(2 * tp, 2 * tp + self.false_positives() + self.false_negatives())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12}{:>8}{:>8}", "", "pred -1", "pred 1")?;
        for (i, label) in LABEL_ORDER.iter().enumerate() {
            writeln!(
                f,
                "{:>12}{:>8}{:>8}",
                format!("actual {}", label),
                self.counts[i][0],
                self.counts[i][1]
            )?;
        }
        Ok(())
    }
}

/// F1 of the phishing class
pub fn f1_score(actual: &[i64], predicted: &[i64]) -> f64 {
    ConfusionMatrix::from_labels(actual, predicted).f1()
}

// =============================================================================
// Classification Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_labels(actual: &[i64], predicted: &[i64]) -> Self {
        let matrix = ConfusionMatrix::from_labels(actual, predicted);
        Self {
            accuracy: matrix.accuracy(),
            precision: matrix.precision(),
            recall: matrix.recall(),
            f1: matrix.f1(),
            support: matrix.total(),
            confusion_matrix: matrix,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:  {:.4}", self.accuracy)?;
        writeln!(f, "Precision: {:.4}", self.precision)?;
        writeln!(f, "Recall:    {:.4}", self.recall)?;
        writeln!(f, "F1 Score:  {:.4}", self.f1)?;
        writeln!(f, "Support:   {}", self.support)?;
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{}", self.confusion_matrix)
    }
}
