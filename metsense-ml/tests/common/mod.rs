//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::OnceLock;

use metsense_core::{build_dataset, ActivityMetTable, FeatureExtractor, LabeledFeatures, WindowConfig, WindowSegmenter};
use metsense_data::{DataSource, SyntheticSource};
use metsense_ml::{MetClassifier, MetModel, TrainingConfig};

/// Windowed features of the default synthetic stream
pub fn synthetic_dataset() -> LabeledFeatures {
    let samples = SyntheticSource::default().load().unwrap();
    let window = WindowConfig::default();
    build_dataset(
        &samples,
        &ActivityMetTable::default(),
        &WindowSegmenter::new(window).unwrap(),
        &FeatureExtractor::new(window),
    )
    .unwrap()
}

/// Classifier trained once per test binary on synthetic data
pub fn trained_classifier() -> &'static MetClassifier {
    static CLASSIFIER: OnceLock<MetClassifier> = OnceLock::new();
    CLASSIFIER.get_or_init(|| {
        let mut classifier = MetClassifier::new(TrainingConfig::default().classifier());
        classifier.train_dataset(&synthetic_dataset()).unwrap();
        classifier
    })
}

/// Model of [`trained_classifier`]
pub fn trained_model() -> MetModel {
    trained_classifier().model().cloned().unwrap()
}
