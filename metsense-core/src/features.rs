//! Window → 16-dimensional feature vector
//!
//! ## Feature Set
//!
//! Time-domain statistics only, cheap enough to compute on a phone every
//! 1.25 s (stride of a 50-sample window at 20 Hz):
//!
//! | Index | Name              | Definition                                   |
//! |-------|-------------------|----------------------------------------------|
//! | 0-2   | `mean_{x,y,z}`    | arithmetic mean per axis                     |
//! | 3     | `mean_magnitude`  | mean of `sqrt(x²+y²+z²)`                     |
//! | 4-6   | `std_{x,y,z}`     | population standard deviation per axis       |
//! | 7     | `std_magnitude`   | population standard deviation of magnitude   |
//! | 8-9   | `{min,max}_magnitude` | extremes of magnitude                    |
//! | 10-12 | `rms_{x,y,z}`     | root mean square per axis                    |
//! | 13    | `zero_crossings_x`| sign changes of `x - mean(x)`                |
//! | 14-15 | `magnitude_p{25,75}` | percentiles, linear interpolation         |
//!
//! The order is a wire contract: persisted models, the mobile export and the
//! inference call all index features by position in `FEATURE_NAMES`.
//!
//! ## Zero Crossings
//!
//! Centered values that are exactly 0 carry no sign and are skipped. A crossing
//! is counted each time a non-zero centered value has the opposite sign of the
//! previous non-zero one:
//!
//! ```text
//! +  0  -   → 1 crossing
//! +  0  +   → 0 crossings
//! 0  0  0   → 0 crossings
//! ```
//!
//! ## Degenerate Windows
//!
//! A single-sample window is valid: both standard deviations and the zero
//! crossing count are 0. An empty window is rejected with `EmptyWindow`.

use alloc::vec::Vec;
use core::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::sample::AccelSample;
use crate::window::{Window, WindowConfig};

/// Length of every feature vector
pub const NUM_FEATURES: usize = 16;

/// Feature names in extraction order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "mean_x",
    "mean_y",
    "mean_z",
    "mean_magnitude",
    "std_x",
    "std_y",
    "std_z",
    "std_magnitude",
    "min_magnitude",
    "max_magnitude",
    "rms_x",
    "rms_y",
    "rms_z",
    "zero_crossings_x",
    "magnitude_p25",
    "magnitude_p75",
];

/// Fixed-order statistics of one window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureVector(pub [f32; NUM_FEATURES]);

impl FeatureVector {
    /// Values in `FEATURE_NAMES` order
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Owned copy of the values
    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.0[i])
    }

    /// Pairs of (name, value)
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

/// Per-axis statistics used by the extractor
#[derive(Debug, Clone, Copy)]
struct AxisStats {
    mean: f32,
    std_dev: f32,
    rms: f32,
}

impl AxisStats {
    fn from_values(values: &[f32]) -> Self {
        let count = values.len() as f32;

        let mean = values.iter().sum::<f32>() / count;

        let variance = values
            .iter()
            .map(|&v| (v - mean) * (v - mean))
            .sum::<f32>()
            / count;
        let std_dev = libm::sqrtf(variance);

        let sum_squares: f32 = values.iter().map(|&v| v * v).sum();
        let rms = libm::sqrtf(sum_squares / count);

        Self { mean, std_dev, rms }
    }
}

/// Computes feature vectors from accelerometer windows
///
/// Stateless apart from the window geometry, which is recorded so a model can
/// carry the settings it was trained with.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    config: WindowConfig,
}

impl FeatureExtractor {
    /// Create an extractor for the given geometry
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Geometry this extractor was configured with
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Feature names in output order
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    /// Extract features from three equal-length axis sequences
    pub fn extract(&self, x: &[f32], y: &[f32], z: &[f32]) -> CoreResult<FeatureVector> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(CoreError::AxisLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        if x.is_empty() {
            return Err(CoreError::EmptyWindow);
        }
        if x.iter().chain(y).chain(z).any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidValue);
        }

        let sx = AxisStats::from_values(x);
        let sy = AxisStats::from_values(y);
        let sz = AxisStats::from_values(z);

        let mut magnitude: Vec<f32> = x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((&a, &b), &c)| libm::sqrtf(a * a + b * b + c * c))
            .collect();
        let sm = AxisStats::from_values(&magnitude);

        let zero_crossings = zero_crossings(x, sx.mean);

        magnitude.sort_unstable_by(|a, b| a.total_cmp(b));
        let min_magnitude = magnitude[0];
        let max_magnitude = magnitude[magnitude.len() - 1];
        let p25 = percentile_sorted(&magnitude, 25.0);
        let p75 = percentile_sorted(&magnitude, 75.0);

        let features = FeatureVector([
            sx.mean,
            sy.mean,
            sz.mean,
            sm.mean,
            sx.std_dev,
            sy.std_dev,
            sz.std_dev,
            sm.std_dev,
            min_magnitude,
            max_magnitude,
            sx.rms,
            sy.rms,
            sz.rms,
            zero_crossings as f32,
            p25,
            p75,
        ]);

        if features.0.iter().any(|v| !v.is_finite()) {
            // Only reachable when squares overflow f32
            return Err(CoreError::InvalidValue);
        }

        Ok(features)
    }

    /// Extract features from a slice of samples
    pub fn extract_samples(&self, samples: &[AccelSample]) -> CoreResult<FeatureVector> {
        let x: Vec<f32> = samples.iter().map(|s| s.x).collect();
        let y: Vec<f32> = samples.iter().map(|s| s.y).collect();
        let z: Vec<f32> = samples.iter().map(|s| s.z).collect();
        self.extract(&x, &y, &z)
    }

    /// Extract features from a segmented window
    pub fn extract_window(&self, window: &Window<'_, '_>) -> CoreResult<FeatureVector> {
        let (x, y, z) = window.axes();
        self.extract(&x, &y, &z)
    }
}

/// Sign changes of `values - mean`, skipping exact zeros
fn zero_crossings(values: &[f32], mean: f32) -> u32 {
    let mut crossings = 0u32;
    let mut last_sign: Option<bool> = None;

    for &v in values {
        let centered = v - mean;
        if centered == 0.0 {
            continue;
        }
        let positive = centered > 0.0;
        if let Some(previous) = last_sign {
            if previous != positive {
                crossings += 1;
            }
        }
        last_sign = Some(positive);
    }

    crossings
}

/// Percentile of ascending-sorted, non-empty data with linear interpolation
fn percentile_sorted(sorted: &[f32], percentile: f32) -> f32 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f32;
    let lower = libm::floorf(rank) as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
