//! Error Types for the Extraction Path
//!
//! ## Design Philosophy
//!
//! Errors in the core crate fall into two groups, and neither is ever absorbed
//! silently:
//!
//! ### Configuration errors
//! - `UnmappedActivity`: an activity name has no MET value. Substituting a
//!   default would quietly mislabel every window of that activity.
//! - `InvalidMetValue`: a MET table entry that is not a finite, non-negative number.
//! - `InvalidWindowSize` / `InvalidVotingWindow`: parameters that make the
//!   segmenter or the voter undefined.
//! - `LabelCountMismatch`: labels and samples out of step.
//!
//! ### Degenerate-input errors
//! - `EmptyWindow`: statistics of zero samples are undefined.
//! - `AxisLengthMismatch`: x, y and z must describe the same instants.
//! - `InvalidValue`: NaN or infinity in an acceleration channel.
//!
//! Degenerate-but-defined inputs (a one-sample window, a constant signal) are
//! not errors: they produce a standard deviation of 0 and no zero crossings.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use metsense_core::{ActivityMetTable, CoreError};
//!
//! let table = ActivityMetTable::default();
//! match table.met_class("Skydiving") {
//!     Ok(class) => println!("class {}", class.index()),
//!     Err(CoreError::UnmappedActivity { activity }) => {
//!         // Extend the table; never guess a value
//!         eprintln!("no MET value for {}", activity);
//!     }
//!     Err(other) => eprintln!("{}", other),
//! }
//! ```

use alloc::string::String;
use thiserror_no_std::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by labeling, windowing, extraction and smoothing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Activity name has no entry in the MET table
    #[error("Activity '{activity}' has no MET value")]
    UnmappedActivity {
        /// The unknown activity label
        activity: String,
    },

    /// MET table entry is not a finite, non-negative number
    #[error("Invalid MET value {value} for activity '{activity}'")]
    InvalidMetValue {
        /// Activity being registered
        activity: String,
        /// Rejected MET value
        value: f32,
    },

    /// Feature extraction on a window with no samples
    #[error("Window contains no samples")]
    EmptyWindow,

    /// The three axes have different lengths
    #[error("Axis lengths differ: x={x}, y={y}, z={z}")]
    AxisLengthMismatch {
        /// Number of x samples
        x: usize,
        /// Number of y samples
        y: usize,
        /// Number of z samples
        z: usize,
    },

    /// Acceleration value is NaN or infinite
    #[error("Invalid value: not a finite number")]
    InvalidValue,

    /// Window size that leaves the stride undefined
    #[error("Window size {size} is invalid, need at least {min}")]
    InvalidWindowSize {
        /// Requested window size
        size: usize,
        /// Smallest accepted window size
        min: usize,
    },

    /// Voting history of zero predictions
    #[error("Voting window must hold at least one prediction")]
    InvalidVotingWindow,

    /// Labels do not line up with samples
    #[error("Expected {expected} labels, got {actual}")]
    LabelCountMismatch {
        /// Number of samples
        expected: usize,
        /// Number of labels supplied
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_messages_name_the_condition() {
        let err = CoreError::UnmappedActivity { activity: "Skydiving".to_string() };
        assert_eq!(err.to_string(), "Activity 'Skydiving' has no MET value");

        let err = CoreError::AxisLengthMismatch { x: 3, y: 2, z: 3 };
        assert!(err.to_string().contains("y=2"));
    }
}
