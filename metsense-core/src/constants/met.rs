//! MET Constants
//!
//! Breakpoints that bucket a continuous MET value into the four intensity
//! classes, and the reference MET value of each activity in the default
//! activity table.

// ===== CLASS BREAKPOINTS =====
// Each breakpoint is the inclusive lower bound of the next class.

/// Lower bound of the Light class (MET).
///
/// Below 1.5 MET is sedentary behaviour (sitting, reclining).
///
/// Source: Sedentary Behaviour Research Network consensus definition
pub const LIGHT_MET_MIN: f32 = 1.5;

/// Lower bound of the Moderate class (MET).
///
/// Source: ACSM / CDC physical activity intensity guidelines
pub const MODERATE_MET_MIN: f32 = 3.0;

/// Lower bound of the Vigorous class (MET).
///
/// Source: ACSM / CDC physical activity intensity guidelines
pub const VIGOROUS_MET_MIN: f32 = 6.0;

// ===== ACTIVITY TABLE =====

/// Default activity -> MET values.
///
/// Names follow the WISDM activity labels plus `Running` and `SlowWalk`.
///
/// Source: Compendium of Physical Activities (Ainsworth et al.)
pub const DEFAULT_ACTIVITY_METS: [(&str, f32); 8] = [
    ("Walking", 3.0),
    ("Jogging", 7.0),
    ("Running", 8.0),
    ("Upstairs", 4.0),
    ("Downstairs", 3.5),
    ("Sitting", 1.0),
    ("Standing", 1.2),
    ("SlowWalk", 2.5),
];
