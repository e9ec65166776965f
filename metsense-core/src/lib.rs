//! Core signal path for accelerometer MET classification
//!
//! Turns a labeled tri-axial acceleration stream into fixed-length feature
//! vectors over sliding windows, and smooths window-level class decisions.
//! Everything here is deterministic and free of I/O so the same code runs in
//! the training pipeline and on the phone.
//!
//! Key constraints:
//! - `no_std` + `alloc` capable (disable the default `std` feature)
//! - Feature order is a wire contract with persisted models
//! - Windows never mix samples from two (subject, activity) groups
//!
//! ```
//! use metsense_core::{FeatureExtractor, WindowConfig, FEATURE_NAMES};
//!
//! let extractor = FeatureExtractor::new(WindowConfig::default());
//! let x = [0.1, -0.2, 0.3, -0.1];
//! let y = [0.0; 4];
//! let z = [9.8; 4];
//!
//! let features = extractor.extract(&x, &y, &z).unwrap();
//! assert_eq!(features.as_slice().len(), FEATURE_NAMES.len());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod buffer;
pub mod constants;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod labels;
pub mod sample;
pub mod stability;
pub mod window;

// Public API
pub use dataset::{build_dataset, LabeledFeatures};
pub use errors::{CoreError, CoreResult};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use labels::{label_samples, ActivityMetTable, MetClass};
pub use sample::{group_samples, AccelSample, SampleGroup};
pub use stability::MajorityVoter;
pub use window::{Window, WindowConfig, WindowSegmenter, Windows};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
