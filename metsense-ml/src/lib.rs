//! MET-class classification from accelerometer features
//!
//! ## Overview
//!
//! This crate turns the feature vectors produced by `metsense-core` into
//! activity-intensity classes. It trains a random forest on labeled windows,
//! persists it together with the normalizer fitted on the same data, and
//! serves predictions either one vector at a time or over a live stream.
//!
//! ## Why Random Forest?
//!
//! 1. **Small inputs**: 16 time-domain features per window, no need for deep models
//! 2. **No feature engineering for scale**: splits are threshold tests
//! 3. **Calibrated-enough probabilities**: leaf class frequencies averaged over trees
//! 4. **Portable**: a flat node array per tree exports cleanly to phones
//!
//! ## Training Flow
//!
//! ```text
//! rows, labels ─▶ stratified split (seed) ─▶ scaler.fit(train)
//!              ─▶ forest.fit(scaled train) ─▶ evaluate(scaled test)
//!              ─▶ MetModel { forest, scaler, metadata, artifact_id }
//! ```
//!
//! Every random draw comes from an explicitly seeded `StdRng`, so the same
//! data and config always produce the same model and the same artifact id.
//!
//! ## Memory Model
//!
//! For the default 50 trees of depth ≤ 10:
//! ```text
//! Per tree: at most 2^11 - 1 nodes at depth 10
//! Forest:   50 trees, a few hundred nodes each on typical data
//! Runtime:  one scaled 16-float vector per prediction
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use metsense_ml::{MetClassifier, MetMonitor};
//!
//! let classifier = MetClassifier::load("models/met")?;
//! let prediction = classifier.predict(&[0.0; 16])?;
//! println!("{} ({:.2})", prediction.class_name, prediction.confidence);
//!
//! if let Some(model) = classifier.into_model() {
//!     let mut monitor = MetMonitor::new(model, 3)?;
//!     if let Some(output) = monitor.push_xyz(0.1, 0.2, 9.8)? {
//!         println!("smoothed: {}", output.smoothed_class);
//!     }
//! }
//! # Ok::<(), metsense_ml::MlError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod errors;
pub mod forest;
pub mod model;
pub mod monitor;
pub mod node;
pub mod scaler;
pub mod scoring;
pub mod split;
pub mod tree;

// Public API
pub use config::{ClassifierConfig, ForestConfig, MaxFeatures, SplitConfig, TrainingConfig};
pub use errors::{MlError, MlResult};
pub use forest::{ForestStats, RandomForest};
pub use model::{MetClassifier, MetModel, MobileScalerParams, MobileTreeParams, ModelMetadata, Prediction};
pub use monitor::{MetMonitor, MonitorOutput};
pub use node::{ClassProbabilities, Node, NodeType};
pub use scaler::StandardScaler;
pub use scoring::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use split::{stratified_split, SplitIndices};
pub use tree::{DecisionTree, TreeConfig};
