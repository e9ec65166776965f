//! Stratified train/test split
//!
//! Each class is shuffled on its own and `round(n_c * test_fraction)` of its
//! rows are held out, clamped so both sides keep at least one row of every
//! class. A class with fewer than two rows cannot be split and is an error.

use metsense_core::MetClass;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::SplitConfig;
use crate::{MlError, MlResult};

/// Fewest rows a present class needs
pub const MIN_SAMPLES_PER_CLASS: usize = 2;

/// Row indices of each side, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Rows used for fitting
    pub train: Vec<usize>,
    /// Rows held out for evaluation
    pub test: Vec<usize>,
}

/// Split row indices by class
pub fn stratified_split(labels: &[MetClass], config: &SplitConfig) -> MlResult<SplitIndices> {
    config.validate()?;
    if labels.is_empty() {
        return Err(MlError::InsufficientData("cannot split zero rows".into()));
    }

    let mut by_class: [Vec<usize>; MetClass::COUNT] = Default::default();
    for (i, label) in labels.iter().enumerate() {
        by_class[label.index()].push(i);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (class, mut rows) in MetClass::ALL.into_iter().zip(by_class) {
        if rows.is_empty() {
            continue;
        }
        if rows.len() < MIN_SAMPLES_PER_CLASS {
            return Err(MlError::InsufficientClassSamples {
                class,
                count: rows.len(),
                min: MIN_SAMPLES_PER_CLASS,
            });
        }

        let n_test = ((rows.len() as f32 * config.test_fraction).round() as usize).clamp(1, rows.len() - 1);
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
