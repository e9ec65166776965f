//! Classification scoring on held-out windows
//!
//! Accuracy plus per-class precision, recall and F1 derived from a 4x4
//! confusion matrix. A class with no predictions (or no support) scores 0 for
//! the undefined ratio.

use std::fmt;

use metsense_core::MetClass;
use serde::{Deserialize, Serialize};

use crate::{MlError, MlResult};

/// Counts of (true class, predicted class) pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// `counts[true][predicted]`
    pub counts: [[usize; MetClass::COUNT]; MetClass::COUNT],
}

impl ConfusionMatrix {
    /// Tally paired truths and predictions
    pub fn from_predictions(truth: &[MetClass], predicted: &[MetClass]) -> MlResult<Self> {
        if truth.len() != predicted.len() {
            return Err(MlError::ShapeMismatch(format!(
                "{} labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }

        let mut matrix = Self::default();
        for (t, p) in truth.iter().zip(predicted) {
            matrix.counts[t.index()][p.index()] += 1;
        }
        Ok(matrix)
    }

    /// Number of scored samples
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction on the diagonal, 0 when empty
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..MetClass::COUNT).map(|i| self.counts[i][i]).sum();
        correct as f32 / total as f32
    }

    /// Metrics for one class
    pub fn class_metrics(&self, class: MetClass) -> ClassMetrics {
        let i = class.index();
        let true_positive = self.counts[i][i];
        let support: usize = self.counts[i].iter().sum();
        let predicted: usize = self.counts.iter().map(|row| row[i]).sum();

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            class,
            precision,
            recall,
            f1,
            support,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Precision, recall and F1 of one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Class scored
    pub class: MetClass,
    /// Correct among predicted as this class
    pub precision: f32,
    /// Correct among truly this class
    pub recall: f32,
    /// Harmonic mean of precision and recall
    pub f1: f32,
    /// Samples truly of this class
    pub support: usize,
}

/// Held-out evaluation of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Overall accuracy
    pub accuracy: f32,
    /// One entry per class in index order
    pub per_class: Vec<ClassMetrics>,
    /// Underlying counts
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Score predictions against the truth
    pub fn new(truth: &[MetClass], predicted: &[MetClass]) -> MlResult<Self> {
        let confusion = ConfusionMatrix::from_predictions(truth, predicted)?;
        Ok(Self {
            accuracy: confusion.accuracy(),
            per_class: MetClass::ALL
                .iter()
                .map(|&class| confusion.class_metrics(class))
                .collect(),
            confusion,
        })
    }

    /// Support-weighted mean F1
    pub fn weighted_f1(&self) -> f32 {
        let total: usize = self.per_class.iter().map(|m| m.support).sum();
        if total == 0 {
            return 0.0;
        }
        self.per_class
            .iter()
            .map(|m| m.f1 * m.support as f32)
            .sum::<f32>()
            / total as f32
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:>9} {:>9} {:>9} {:>9}", "class", "precision", "recall", "f1", "support")?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:<10} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                m.class.name(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        write!(f, "accuracy {:.3} on {} windows", self.accuracy, self.confusion.total())
    }
}
