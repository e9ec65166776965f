//! Sampling and Window Geometry Constants

/// Accelerometer sampling rate assumed by the default pipeline (Hz).
///
/// Source: WISDM dataset collection rate
pub const DEFAULT_SAMPLING_RATE_HZ: f32 = 20.0;

/// Samples per window (2.5 s at 20 Hz).
pub const DEFAULT_WINDOW_SIZE_SAMPLES: usize = 50;

/// Smallest window the segmenter accepts.
///
/// Stride is `window_size / 2`; a window of 1 would give a stride of 0.
pub const MIN_WINDOW_SIZE_SAMPLES: usize = 2;

/// Window-level predictions kept by the majority voter.
pub const DEFAULT_VOTING_WINDOW: usize = 3;
