//! Stream → labeled feature matrix
//!
//! Glues the label mapper, the grouping step, the segmenter and the extractor:
//!
//! ```text
//! samples ─label─▶ classes ─group─▶ (subject, activity) groups
//!         ─segment─▶ windows ─extract─▶ (FeatureVector, MetClass) rows
//! ```
//!
//! Every sample is labeled before the first window is built, so an unmapped
//! activity fails the whole build instead of leaking partial data into
//! training.

use alloc::vec::Vec;

use crate::errors::CoreResult;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::labels::{label_samples, ActivityMetTable, MetClass};
use crate::sample::{group_samples, AccelSample};
use crate::window::WindowSegmenter;

/// Feature rows with one class label each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledFeatures {
    /// One feature vector per window
    pub features: Vec<FeatureVector>,
    /// Class of each window
    pub labels: Vec<MetClass>,
}

impl LabeledFeatures {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if no window was produced
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rows as plain vectors, the shape the classifier trains on
    pub fn feature_rows(&self) -> Vec<Vec<f32>> {
        self.features.iter().map(FeatureVector::to_vec).collect()
    }

    /// Window count per class, indexed by `MetClass::index`
    pub fn class_distribution(&self) -> [usize; MetClass::COUNT] {
        let mut counts = [0usize; MetClass::COUNT];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }
}

/// Build the training matrix from a raw sample stream
pub fn build_dataset(
    samples: &[AccelSample],
    table: &ActivityMetTable,
    segmenter: &WindowSegmenter,
    extractor: &FeatureExtractor,
) -> CoreResult<LabeledFeatures> {
    let labels = label_samples(table, samples)?;
    let groups = group_samples(samples);

    let mut dataset = LabeledFeatures::default();
    let mut short_groups = 0usize;

    for group in &groups {
        let group_labels: Vec<MetClass> = group.indices.iter().map(|&i| labels[i]).collect();

        let before = dataset.len();
        for window in segmenter.segment(group, &group_labels)? {
            dataset.features.push(extractor.extract_window(&window)?);
            dataset.labels.push(window.label);
        }

        if dataset.len() == before {
            short_groups += 1;
        }
    }

    if short_groups > 0 {
        log_warn!(
            "{} of {} groups shorter than window size {} produced no windows",
            short_groups,
            groups.len(),
            segmenter.config().window_size
        );
    }
    log_debug!(
        "Built {} windows from {} samples in {} groups",
        dataset.len(),
        samples.len(),
        groups.len()
    );

    Ok(dataset)
}
