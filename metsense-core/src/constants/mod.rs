//! Constants for metsense Core
//!
//! Centralized numeric values used throughout the pipeline. Every value that
//! ends up inside a persisted model or drives a label is defined here, with
//! its unit and source.
//!
//! ## Organization
//!
//! - **Met**: MET breakpoints and the default activity table
//! - **Sampling**: window geometry and accelerometer sampling rate
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Changing a breakpoint or a window default invalidates trained models
//! 3. Include units in names (`_HZ`, `_SAMPLES`)

/// MET breakpoints and activity reference values.
pub mod met;

/// Sampling rate and window geometry defaults.
pub mod sampling;

pub use met::{
    LIGHT_MET_MIN, MODERATE_MET_MIN, VIGOROUS_MET_MIN, DEFAULT_ACTIVITY_METS,
};

pub use sampling::{
    DEFAULT_SAMPLING_RATE_HZ, DEFAULT_WINDOW_SIZE_SAMPLES, MIN_WINDOW_SIZE_SAMPLES,
    DEFAULT_VOTING_WINDOW,
};
