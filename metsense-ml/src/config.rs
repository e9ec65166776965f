//! Training configuration
//!
//! Every knob carries its documented default, so an empty JSON object is a
//! valid config:
//!
//! ```
//! use metsense_ml::TrainingConfig;
//!
//! let config = TrainingConfig::from_json_str(r#"{ "forest": { "n_estimators": 20 } }"#).unwrap();
//! assert_eq!(config.forest.n_estimators, 20);
//! assert_eq!(config.forest.max_depth, 10);
//! assert_eq!(config.window.window_size, 50);
//! ```

use std::fs;
use std::path::Path;

use metsense_core::constants::DEFAULT_VOTING_WINDOW;
use metsense_core::WindowConfig;
use serde::{Deserialize, Serialize};

use crate::{MlError, MlResult};

/// Number of features tried at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Every feature
    All,
    /// `floor(sqrt(n))`, at least 1
    Sqrt,
    /// `floor(log2(n))`, at least 1
    Log2,
    /// Fixed count, capped at `n`
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the number of features
    pub fn resolve(&self, n_features: usize) -> usize {
        let count = match *self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Count(count) => count,
        };
        count.clamp(1, n_features.max(1))
    }
}

/// Configuration for the random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Features tried per split
    pub max_features: MaxFeatures,
    /// Train each tree on a bootstrap sample
    pub bootstrap: bool,
    /// Random seed, tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: 10,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Check ranges
    pub fn validate(&self) -> MlResult<()> {
        if self.n_estimators == 0 {
            return Err(MlError::InvalidConfig("n_estimators must be at least 1".into()));
        }
        if self.max_depth == 0 || self.max_depth > u8::MAX as usize {
            return Err(MlError::InvalidConfig(format!(
                "max_depth must be in 1..=255, got {}",
                self.max_depth
            )));
        }
        if self.min_samples_split < 2 {
            return Err(MlError::InvalidConfig("min_samples_split must be at least 2".into()));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(MlError::InvalidConfig("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

/// Held-out split parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of each class held out for evaluation
    pub test_fraction: f32,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Check the fraction leaves something on both sides
    pub fn validate(&self) -> MlResult<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(MlError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Settings the classifier needs to train
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Forest hyperparameters
    pub forest: ForestConfig,
    /// Held-out split
    pub split: SplitConfig,
    /// Window geometry recorded in the model metadata
    pub window: WindowConfig,
}

impl ClassifierConfig {
    /// Check every section
    pub fn validate(&self) -> MlResult<()> {
        self.window.validate()?;
        self.forest.validate()?;
        self.split.validate()
    }
}

/// End-to-end training run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Window geometry
    pub window: WindowConfig,
    /// Forest hyperparameters
    pub forest: ForestConfig,
    /// Held-out split
    pub split: SplitConfig,
    /// Majority-vote history length for live monitoring
    pub voting_window: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            forest: ForestConfig::default(),
            split: SplitConfig::default(),
            voting_window: DEFAULT_VOTING_WINDOW,
        }
    }
}

impl TrainingConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> MlResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> MlResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every section
    pub fn validate(&self) -> MlResult<()> {
        self.classifier().validate()?;
        if self.voting_window == 0 {
            return Err(MlError::InvalidConfig("voting_window must be at least 1".into()));
        }
        Ok(())
    }

    /// Classifier part of the config
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            forest: self.forest.clone(),
            split: self.split,
            window: self.window,
        }
    }
}
