//! Live classification of an accelerometer stream
//!
//! The monitor keeps the most recent `window_size` readings in a ring buffer.
//! Once the buffer first fills, and every stride readings after that, it
//! extracts features, classifies them and feeds the class through a majority
//! voter. Emission points line up with the windows the segmenter cuts during
//! training:
//!
//! ```text
//! readings:  1 ........ 50 ....... 75 ....... 100
//! emits:                ^          ^           ^
//! ```

use std::sync::Arc;

use log::debug;
use metsense_core::buffer::CircularBuffer;
use metsense_core::{AccelSample, FeatureExtractor, MajorityVoter, MetClass, WindowConfig, FEATURE_NAMES};

use crate::model::{MetModel, Prediction};
use crate::{MlError, MlResult};

/// One classified window
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOutput {
    /// Raw model output for the window
    pub prediction: Prediction,
    /// Majority over recent windows
    pub smoothed_class: MetClass,
}

/// Sliding-window classifier with vote smoothing
#[derive(Debug, Clone)]
pub struct MetMonitor {
    /// Shared trained model
    model: Arc<MetModel>,
    /// Feature extraction with the model's geometry
    extractor: FeatureExtractor,
    /// Latest readings as (x, y, z)
    readings: CircularBuffer<[f32; 3]>,
    /// Class history
    voter: MajorityVoter,
    /// Readings since the last reset
    seen: usize,
}

impl MetMonitor {
    /// Create a monitor for a model trained on the standard feature order
    pub fn new(model: impl Into<Arc<MetModel>>, voting_window: usize) -> MlResult<Self> {
        let model = model.into();
        if !model.feature_names().iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(MlError::FeatureOrderMismatch);
        }

        let window = model.window_config();
        window.validate()?;
        let voter = MajorityVoter::new(voting_window)?;

        Ok(Self {
            extractor: FeatureExtractor::new(window),
            readings: CircularBuffer::with_capacity(window.window_size),
            voter,
            model,
            seen: 0,
        })
    }

    /// Window geometry in use
    pub fn window_config(&self) -> &WindowConfig {
        self.extractor.config()
    }

    /// Model behind the monitor
    pub fn model(&self) -> &Arc<MetModel> {
        &self.model
    }

    /// Feed one sample, ignoring its labels
    pub fn push(&mut self, sample: &AccelSample) -> MlResult<Option<MonitorOutput>> {
        self.push_xyz(sample.x, sample.y, sample.z)
    }

    /// Feed one raw reading
    pub fn push_xyz(&mut self, x: f32, y: f32, z: f32) -> MlResult<Option<MonitorOutput>> {
        self.readings.push([x, y, z]);
        self.seen += 1;

        let config = self.extractor.config();
        if self.seen < config.window_size || (self.seen - config.window_size) % config.stride() != 0 {
            return Ok(None);
        }

        let xs: Vec<f32> = self.readings.iter().map(|r| r[0]).collect();
        let ys: Vec<f32> = self.readings.iter().map(|r| r[1]).collect();
        let zs: Vec<f32> = self.readings.iter().map(|r| r[2]).collect();

        let features = self.extractor.extract(&xs, &ys, &zs)?;
        let prediction = self.model.predict(features.as_slice())?;
        let smoothed_class = self.voter.push(prediction.predicted_class);

        debug!(
            "Window at reading {}: {} ({:.2}), smoothed {}",
            self.seen, prediction.class_name, prediction.confidence, smoothed_class
        );

        Ok(Some(MonitorOutput {
            prediction,
            smoothed_class,
        }))
    }

    /// Drop buffered readings and vote history
    pub fn reset(&mut self) {
        self.readings.clear();
        self.voter.reset();
        self.seen = 0;
    }
}
