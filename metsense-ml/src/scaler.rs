//! Per-feature standardization
//!
//! Fit once on the training split and stored with the model; inference only
//! ever applies `(v - mean) / scale`. `scale` is the population standard
//! deviation of the column, with 1.0 standing in for a constant column so the
//! transform stays finite.

use serde::{Deserialize, Serialize};

use crate::{MlError, MlResult};

/// Mean/scale normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Column means
    pub mean: Vec<f32>,
    /// Column scales, never 0
    pub scale: Vec<f32>,
}

impl StandardScaler {
    /// Fit column statistics over equal-length rows
    pub fn fit(rows: &[Vec<f32>]) -> MlResult<Self> {
        let first = rows
            .first()
            .ok_or_else(|| MlError::InsufficientData("cannot fit scaler on zero rows".into()))?;
        let n_features = first.len();
        if rows.iter().any(|row| row.len() != n_features) {
            return Err(MlError::ShapeMismatch("scaler rows differ in length".into()));
        }

        // Accumulate in f64, the columns can be long
        let count = rows.len() as f64;
        let mut sum = vec![0.0f64; n_features];
        for row in rows {
            for (s, &v) in sum.iter_mut().zip(row) {
                *s += v as f64;
            }
        }
        let mean: Vec<f64> = sum.iter().map(|s| s / count).collect();

        let mut squares = vec![0.0f64; n_features];
        for row in rows {
            for ((sq, &v), m) in squares.iter_mut().zip(row).zip(&mean) {
                let d = v as f64 - m;
                *sq += d * d;
            }
        }

        let scale = squares
            .iter()
            .map(|sq| {
                let std_dev = (sq / count).sqrt() as f32;
                if std_dev == 0.0 || !std_dev.is_finite() {
                    1.0
                } else {
                    std_dev
                }
            })
            .collect();

        Ok(Self {
            mean: mean.into_iter().map(|m| m as f32).collect(),
            scale,
        })
    }

    /// Number of columns
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one row
    pub fn transform(&self, row: &[f32]) -> MlResult<Vec<f32>> {
        if row.len() != self.mean.len() {
            return Err(MlError::FeatureLengthMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((&v, &m), &s)| (v - m) / s)
            .collect())
    }

    /// Standardize many rows
    pub fn transform_rows(&self, rows: &[Vec<f32>]) -> MlResult<Vec<Vec<f32>>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }
}
