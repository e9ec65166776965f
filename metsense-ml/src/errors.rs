//! Error types for training, inference and model artifacts

use metsense_core::{CoreError, MetClass};
use thiserror::Error;

/// Errors raised by the classifier and its artifacts
#[derive(Error, Debug)]
pub enum MlError {
    /// Error from the signal path
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem error while saving or loading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed artifact or config JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Prediction or save before train/load
    #[error("Model is not trained or loaded")]
    NotReady,

    /// Feature vector of the wrong length
    #[error("Expected {expected} features, got {actual}")]
    FeatureLengthMismatch {
        /// Features the model was trained on
        expected: usize,
        /// Features supplied
        actual: usize,
    },

    /// Training inputs disagree in shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A class is too rare for a stratified split
    #[error("Class {class} has {count} samples, at least {min} required")]
    InsufficientClassSamples {
        /// Offending class
        class: MetClass,
        /// Samples present
        count: usize,
        /// Samples required
        min: usize,
    },

    /// Not enough rows to train
    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    /// Artifact directory lacks a file
    #[error("Missing artifact file: {file}")]
    MissingArtifact {
        /// File name within the directory
        file: String,
    },

    /// Files in one directory come from different saves
    #[error("Artifact id mismatch in {file}: expected {expected}, found {found}")]
    ArtifactMismatch {
        /// File carrying the foreign id
        file: String,
        /// Id from the metadata
        expected: String,
        /// Id found in the file
        found: String,
    },

    /// Metadata contradicts itself or the model
    #[error("Invalid model metadata: {0}")]
    InvalidMetadata(String),

    /// Model features are not in extraction order
    #[error("Model feature order does not match the extractor")]
    FeatureOrderMismatch,

    /// Configuration out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ML operations
pub type MlResult<T> = Result<T, MlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = MlError::FeatureLengthMismatch { expected: 16, actual: 15 };
        assert_eq!(err.to_string(), "Expected 16 features, got 15");

        let err = MlError::MissingArtifact { file: "scaler.json".into() };
        assert!(err.to_string().contains("scaler.json"));

        let err: MlError = CoreError::EmptyWindow.into();
        assert!(matches!(err, MlError::Core(CoreError::EmptyWindow)));
    }
}
