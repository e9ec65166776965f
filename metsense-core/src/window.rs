//! Sliding-window segmentation of sample groups
//!
//! ## Overview
//!
//! Windows are the unit of feature extraction. Each (subject, activity) group
//! is cut into fixed-length windows with 50% overlap:
//!
//! ```text
//! group:   s0 s1 s2 ... s99          window_size = 50, stride = 25
//! window0: [s0  .. s49]
//! window1:      [s25 .. s74]
//! window2:           [s50 .. s99]
//! ```
//!
//! Segmentation starts at index 0 and continues while a full window fits.
//! A partial trailing window is dropped, never padded, so a group shorter than
//! `window_size` yields nothing. The label of a window is the label of its
//! first sample.
//!
//! The iterator is lazy and borrows the group; running it twice with the same
//! parameters yields the same windows.

use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SAMPLING_RATE_HZ, DEFAULT_WINDOW_SIZE_SAMPLES, MIN_WINDOW_SIZE_SAMPLES};
use crate::errors::{CoreError, CoreResult};
use crate::labels::MetClass;
use crate::sample::{AccelSample, SampleGroup};

/// Window geometry shared by training and inference
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowConfig {
    /// Samples per window
    pub window_size: usize,
    /// Accelerometer sampling rate in Hz
    pub sampling_rate_hz: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE_SAMPLES,
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }
}

impl WindowConfig {
    /// Distance between consecutive window starts (50% overlap)
    pub fn stride(&self) -> usize {
        self.window_size / 2
    }

    /// Window length in seconds
    pub fn duration_secs(&self) -> f32 {
        self.window_size as f32 / self.sampling_rate_hz
    }

    /// Check the geometry is usable for segmentation
    pub fn validate(&self) -> CoreResult<()> {
        if self.window_size < MIN_WINDOW_SIZE_SAMPLES {
            return Err(CoreError::InvalidWindowSize {
                size: self.window_size,
                min: MIN_WINDOW_SIZE_SAMPLES,
            });
        }
        Ok(())
    }
}

/// One window of a group
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'g, 'a> {
    /// Offset of the first sample within the group
    pub start: usize,
    /// Samples of the window, `window_size` long
    pub samples: &'g [&'a AccelSample],
    /// Class of the first sample
    pub label: MetClass,
}

impl<'g, 'a> Window<'g, 'a> {
    /// Axis columns of the window, ready for extraction
    pub fn axes(&self) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let x = self.samples.iter().map(|s| s.x).collect();
        let y = self.samples.iter().map(|s| s.y).collect();
        let z = self.samples.iter().map(|s| s.z).collect();
        (x, y, z)
    }
}

/// Cuts sample groups into overlapping windows
#[derive(Debug, Clone, Copy)]
pub struct WindowSegmenter {
    config: WindowConfig,
}

impl WindowSegmenter {
    /// Create a segmenter, rejecting windows smaller than 2 samples
    pub fn new(config: WindowConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Geometry in use
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Number of windows a group of `len` samples produces
    ///
    /// `max(0, (len - W) / S + 1)`
    pub fn expected_window_count(&self, len: usize) -> usize {
        let size = self.config.window_size;
        if len < size {
            0
        } else {
            (len - size) / self.config.stride() + 1
        }
    }

    /// Lazily segment one group
    ///
    /// `labels[i]` is the class of `group.samples[i]`.
    pub fn segment<'g, 'a>(
        &self,
        group: &'g SampleGroup<'a>,
        labels: &'g [MetClass],
    ) -> CoreResult<Windows<'g, 'a>> {
        if labels.len() != group.len() {
            return Err(CoreError::LabelCountMismatch {
                expected: group.len(),
                actual: labels.len(),
            });
        }

        Ok(Windows {
            samples: &group.samples,
            labels,
            window_size: self.config.window_size,
            stride: self.config.stride(),
            next_start: 0,
        })
    }
}

/// Iterator over the windows of one group
#[derive(Debug, Clone)]
pub struct Windows<'g, 'a> {
    samples: &'g [&'a AccelSample],
    labels: &'g [MetClass],
    window_size: usize,
    stride: usize,
    next_start: usize,
}

impl<'g, 'a> Iterator for Windows<'g, 'a> {
    type Item = Window<'g, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start;
        let end = start.checked_add(self.window_size)?;
        if end > self.samples.len() {
            return None;
        }

        self.next_start = start + self.stride;
        Some(Window {
            start,
            samples: &self.samples[start..end],
            label: self.labels[start],
        })
    }
}
