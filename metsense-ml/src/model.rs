//! Classifier wrapper and model artifacts
//!
//! ## Model
//!
//! A `MetModel` bundles the forest, the scaler fitted on the same training
//! split and the metadata describing both. The three are saved, loaded and
//! shared as one value, so a forest can never meet a foreign normalizer.
//!
//! ## Artifact Directory
//!
//! ```text
//! model_dir/
//! ├── met_model.json        { artifact_id, content: forest }
//! ├── scaler.json           { artifact_id, content: { mean, scale } }
//! └── model_metadata.json   { feature_names, met_classes, model_type,
//!                             n_features, window_size, sampling_rate_hz,
//!                             artifact_id, test_accuracy }
//! ```
//!
//! `artifact_id` is a SHA-256 fingerprint of the forest, scaler and feature
//! names. `save` writes into a staging directory next to the target and
//! renames it into place, and `load` refuses a directory whose files carry
//! different ids.
//!
//! ## Mobile Export
//!
//! `export_mobile` writes plain numeric arrays for on-device runtimes:
//! `scaler_params.json { mean, scale }` and
//! `tree_params.json { n_estimators, max_depth, feature_importances, classes }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use metsense_core::{CoreError, LabeledFeatures, MetClass, WindowConfig, FEATURE_NAMES};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ClassifierConfig;
use crate::forest::{argmax_class, RandomForest};
use crate::node::ClassProbabilities;
use crate::scaler::StandardScaler;
use crate::scoring::ClassificationReport;
use crate::split::stratified_split;
use crate::{MlError, MlResult};

/// Serialized forest file
pub const MODEL_FILE: &str = "met_model.json";
/// Serialized scaler file
pub const SCALER_FILE: &str = "scaler.json";
/// Metadata file
pub const METADATA_FILE: &str = "model_metadata.json";
/// Exported scaler parameters
pub const SCALER_EXPORT_FILE: &str = "scaler_params.json";
/// Exported forest summary
pub const TREE_EXPORT_FILE: &str = "tree_params.json";
/// Model type recorded in metadata
pub const MODEL_TYPE: &str = "RandomForestClassifier";

/// Result of classifying one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable class, serialized as its index
    #[serde(with = "class_index")]
    pub predicted_class: MetClass,
    /// Name of the predicted class
    pub class_name: String,
    /// Probability per class index, sums to 1
    pub probabilities: ClassProbabilities,
    /// Probability of the predicted class
    pub confidence: f32,
}

impl Prediction {
    fn from_probabilities(probabilities: ClassProbabilities) -> Self {
        let predicted_class = argmax_class(&probabilities);
        Self {
            predicted_class,
            class_name: predicted_class.name().to_string(),
            probabilities,
            confidence: probabilities[predicted_class.index()],
        }
    }
}

mod class_index {
    use metsense_core::MetClass;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(class: &MetClass, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(class.index() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MetClass, D::Error> {
        let index = u8::deserialize(deserializer)?;
        MetClass::from_index(index as usize)
            .ok_or_else(|| D::Error::custom(format!("class index {} out of range", index)))
    }
}

/// Contents of `model_metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature names in input order
    pub feature_names: Vec<String>,
    /// Class index (as string) → class name
    pub met_classes: BTreeMap<String, String>,
    /// Always `RandomForestClassifier`
    pub model_type: String,
    /// Length of the input vector
    pub n_features: usize,
    /// Samples per window the model was trained on
    pub window_size: usize,
    /// Sampling rate the model was trained on
    pub sampling_rate_hz: f32,
    /// Fingerprint shared by all files of one save
    pub artifact_id: String,
    /// Held-out accuracy, absent for models not evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f32>,
}

impl ModelMetadata {
    fn validate(&self) -> MlResult<()> {
        if self.model_type != MODEL_TYPE {
            return Err(MlError::InvalidMetadata(format!(
                "unsupported model type {}",
                self.model_type
            )));
        }
        if self.n_features != self.feature_names.len() {
            return Err(MlError::InvalidMetadata(format!(
                "n_features is {} but {} feature names are listed",
                self.n_features,
                self.feature_names.len()
            )));
        }
        if self.met_classes.len() != MetClass::COUNT {
            return Err(MlError::InvalidMetadata(format!(
                "expected {} classes, found {}",
                MetClass::COUNT,
                self.met_classes.len()
            )));
        }
        for class in MetClass::ALL {
            let key = class.index().to_string();
            match self.met_classes.get(&key) {
                Some(name) if name == class.name() => {}
                Some(name) => {
                    return Err(MlError::InvalidMetadata(format!(
                        "class {} is named {}, expected {}",
                        key,
                        name,
                        class.name()
                    )));
                }
                None => {
                    return Err(MlError::InvalidMetadata(format!("class {} missing from met_classes", key)));
                }
            }
        }
        Ok(())
    }
}

/// On-disk wrapper stamping a payload with its artifact id
#[derive(Serialize, Deserialize)]
struct ArtifactFile<T> {
    artifact_id: String,
    content: T,
}

/// Exported normalizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileScalerParams {
    /// Column means
    pub mean: Vec<f32>,
    /// Column scales
    pub scale: Vec<f32>,
}

/// Exported forest summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileTreeParams {
    /// Trees in the forest
    pub n_estimators: usize,
    /// Configured depth limit
    pub max_depth: usize,
    /// Importance per feature, sums to 1
    pub feature_importances: Vec<f32>,
    /// Class indices the probabilities refer to
    pub classes: Vec<usize>,
}

/// Trained forest, scaler and metadata as one value
#[derive(Debug, Clone, PartialEq)]
pub struct MetModel {
    forest: RandomForest,
    scaler: StandardScaler,
    metadata: ModelMetadata,
}

impl MetModel {
    /// Assemble a model from fitted parts and stamp it
    pub fn new<S: AsRef<str>>(
        forest: RandomForest,
        scaler: StandardScaler,
        feature_names: &[S],
        window: WindowConfig,
        test_accuracy: Option<f32>,
    ) -> MlResult<Self> {
        if !forest.is_fitted() {
            return Err(MlError::NotReady);
        }
        let n_features = feature_names.len();
        if forest.n_features() != n_features || scaler.n_features() != n_features {
            return Err(MlError::ShapeMismatch(format!(
                "{} feature names, forest expects {}, scaler expects {}",
                n_features,
                forest.n_features(),
                scaler.n_features()
            )));
        }

        let feature_names: Vec<String> = feature_names.iter().map(|n| n.as_ref().to_string()).collect();
        let artifact_id = fingerprint(&forest, &scaler, &feature_names)?;
        let met_classes = MetClass::class_names()
            .into_iter()
            .map(|(index, name)| (index.to_string(), name))
            .collect();

        Ok(Self {
            forest,
            scaler,
            metadata: ModelMetadata {
                feature_names,
                met_classes,
                model_type: MODEL_TYPE.to_string(),
                n_features,
                window_size: window.window_size,
                sampling_rate_hz: window.sampling_rate_hz,
                artifact_id,
                test_accuracy,
            },
        })
    }

    /// Classify one raw (unscaled) feature vector
    pub fn predict(&self, features: &[f32]) -> MlResult<Prediction> {
        if features.len() != self.metadata.n_features {
            return Err(MlError::FeatureLengthMismatch {
                expected: self.metadata.n_features,
                actual: features.len(),
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidValue.into());
        }

        let scaled = self.scaler.transform(features)?;
        let probabilities = self.forest.predict_proba(&scaled)?;
        Ok(Prediction::from_probabilities(probabilities))
    }

    /// Metadata as persisted
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Feature names in input order
    pub fn feature_names(&self) -> &[String] {
        &self.metadata.feature_names
    }

    /// Window geometry the model was trained with
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            window_size: self.metadata.window_size,
            sampling_rate_hz: self.metadata.sampling_rate_hz,
        }
    }

    /// Fingerprint of this model
    pub fn artifact_id(&self) -> &str {
        &self.metadata.artifact_id
    }

    /// Trained forest
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Write the three artifact files, replacing `dir` as a whole
    pub fn save(&self, dir: impl AsRef<Path>) -> MlResult<()> {
        let dir = dir.as_ref();
        let parent = parent_dir(dir);
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".met-model-staging-")
            .tempdir_in(&parent)?;

        let id = &self.metadata.artifact_id;
        write_json(
            &staging.path().join(MODEL_FILE),
            &ArtifactFile { artifact_id: id.clone(), content: &self.forest },
        )?;
        write_json(
            &staging.path().join(SCALER_FILE),
            &ArtifactFile { artifact_id: id.clone(), content: &self.scaler },
        )?;
        write_json(&staging.path().join(METADATA_FILE), &self.metadata)?;

        if dir.exists() {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string());
            let backup = parent.join(format!(".{}.previous-{}", name, id));
            if backup.exists() {
                fs::remove_dir_all(&backup)?;
            }
            fs::rename(dir, &backup)?;

            if let Err(e) = fs::rename(staging.path(), dir) {
                if let Err(restore) = fs::rename(&backup, dir) {
                    warn!("Could not restore {} from {}: {}", dir.display(), backup.display(), restore);
                }
                return Err(e.into());
            }
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!("Saved {} but could not remove backup {}: {}", dir.display(), backup.display(), e);
            }
        } else {
            fs::rename(staging.path(), dir)?;
        }
        // Renamed away, nothing left to clean up
        let _ = staging.keep();

        info!("Saved model {} to {}", id, dir.display());
        Ok(())
    }

    /// Read and cross-check an artifact directory
    pub fn load(dir: impl AsRef<Path>) -> MlResult<Self> {
        let dir = dir.as_ref();
        for file in [METADATA_FILE, MODEL_FILE, SCALER_FILE] {
            if !dir.join(file).is_file() {
                return Err(MlError::MissingArtifact { file: file.to_string() });
            }
        }

        let metadata: ModelMetadata = read_json(&dir.join(METADATA_FILE))?;
        metadata.validate()?;

        let forest: ArtifactFile<RandomForest> = read_json(&dir.join(MODEL_FILE))?;
        check_artifact_id(MODEL_FILE, &metadata.artifact_id, &forest.artifact_id)?;
        let scaler: ArtifactFile<StandardScaler> = read_json(&dir.join(SCALER_FILE))?;
        check_artifact_id(SCALER_FILE, &metadata.artifact_id, &scaler.artifact_id)?;

        let (forest, scaler) = (forest.content, scaler.content);
        let recomputed = fingerprint(&forest, &scaler, &metadata.feature_names)?;
        if recomputed != metadata.artifact_id {
            return Err(MlError::ArtifactMismatch {
                file: MODEL_FILE.to_string(),
                expected: metadata.artifact_id.clone(),
                found: recomputed,
            });
        }
        if !forest.is_fitted() {
            return Err(MlError::InvalidMetadata("forest has no trees".into()));
        }
        if forest.n_features() != metadata.n_features || scaler.n_features() != metadata.n_features {
            return Err(MlError::InvalidMetadata(format!(
                "metadata lists {} features, forest expects {}, scaler expects {}",
                metadata.n_features,
                forest.n_features(),
                scaler.n_features()
            )));
        }

        info!("Loaded model {} from {}", metadata.artifact_id, dir.display());
        Ok(Self { forest, scaler, metadata })
    }

    /// Write the mobile parameter files into `dir`
    pub fn export_mobile(&self, dir: impl AsRef<Path>) -> MlResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        write_json(
            &dir.join(SCALER_EXPORT_FILE),
            &MobileScalerParams {
                mean: self.scaler.mean.clone(),
                scale: self.scaler.scale.clone(),
            },
        )?;
        write_json(
            &dir.join(TREE_EXPORT_FILE),
            &MobileTreeParams {
                n_estimators: self.forest.trees().len(),
                max_depth: self.forest.config().max_depth,
                feature_importances: self.forest.feature_importances(),
                classes: MetClass::ALL.iter().map(|c| c.index()).collect(),
            },
        )?;

        info!("Exported mobile parameters to {}", dir.display());
        Ok(())
    }
}

fn fingerprint(forest: &RandomForest, scaler: &StandardScaler, feature_names: &[String]) -> MlResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(forest)?);
    hasher.update(serde_json::to_vec(scaler)?);
    hasher.update(serde_json::to_vec(feature_names)?);
    Ok(hex::encode(&hasher.finalize()[..16]))
}

fn check_artifact_id(file: &str, expected: &str, found: &str) -> MlResult<()> {
    if expected != found {
        return Err(MlError::ArtifactMismatch {
            file: file.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

fn parent_dir(dir: &Path) -> PathBuf {
    match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> MlResult<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> MlResult<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Trains, evaluates and serves a `MetModel`
#[derive(Debug, Clone, Default)]
pub struct MetClassifier {
    config: ClassifierConfig,
    model: Option<MetModel>,
    report: Option<ClassificationReport>,
}

impl MetClassifier {
    /// Untrained classifier
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            model: None,
            report: None,
        }
    }

    /// Configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Check if a model is present
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Current model, if trained or loaded
    pub fn model(&self) -> Option<&MetModel> {
        self.model.as_ref()
    }

    /// Take the model out of the classifier
    pub fn into_model(self) -> Option<MetModel> {
        self.model
    }

    /// Held-out evaluation of the last training run
    pub fn report(&self) -> Option<&ClassificationReport> {
        self.report.as_ref()
    }

    /// Train on rows and labels, returning held-out accuracy
    ///
    /// The scaler is fitted on the training split only.
    pub fn train<S: AsRef<str>>(
        &mut self,
        features: &[Vec<f32>],
        labels: &[MetClass],
        feature_names: &[S],
    ) -> MlResult<f32> {
        self.config.validate()?;
        if features.is_empty() {
            return Err(MlError::InsufficientData("no feature rows".into()));
        }
        if feature_names.is_empty() {
            return Err(MlError::ShapeMismatch("no feature names".into()));
        }
        if labels.len() != features.len() {
            return Err(MlError::ShapeMismatch(format!(
                "{} rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some((i, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(MlError::ShapeMismatch(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                feature_names.len()
            )));
        }
        if features.iter().flatten().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidValue.into());
        }

        let split = stratified_split(labels, &self.config.split)?;
        let pick_rows = |indices: &[usize]| -> Vec<Vec<f32>> {
            indices.iter().map(|&i| features[i].clone()).collect()
        };
        let pick_labels = |indices: &[usize]| -> Vec<MetClass> { indices.iter().map(|&i| labels[i]).collect() };

        let (train_x, train_y) = (pick_rows(&split.train), pick_labels(&split.train));
        let (test_x, test_y) = (pick_rows(&split.test), pick_labels(&split.test));
        info!(
            "Training on {} windows ({} train, {} test)",
            features.len(),
            train_x.len(),
            test_x.len()
        );

        let scaler = StandardScaler::fit(&train_x)?;
        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&scaler.transform_rows(&train_x)?, &train_y)?;

        let predicted = forest.predict_batch(&scaler.transform_rows(&test_x)?)?;
        let report = ClassificationReport::new(&test_y, &predicted)?;
        let accuracy = report.accuracy;

        let stats = forest.stats();
        info!(
            "Trained {} trees ({} nodes, depth {}), held-out accuracy {:.3}",
            stats.num_trees, stats.total_nodes, stats.max_depth, accuracy
        );
        debug!("Held-out report:\n{}", report);

        self.model = Some(MetModel::new(
            forest,
            scaler,
            feature_names,
            self.config.window,
            Some(accuracy),
        )?);
        self.report = Some(report);
        Ok(accuracy)
    }

    /// Train on a dataset built by the signal path
    pub fn train_dataset(&mut self, dataset: &LabeledFeatures) -> MlResult<f32> {
        self.train(&dataset.feature_rows(), &dataset.labels, &FEATURE_NAMES)
    }

    /// Classify one raw feature vector
    pub fn predict(&self, features: &[f32]) -> MlResult<Prediction> {
        self.model.as_ref().ok_or(MlError::NotReady)?.predict(features)
    }

    /// Save the model artifacts
    pub fn save(&self, dir: impl AsRef<Path>) -> MlResult<()> {
        self.model.as_ref().ok_or(MlError::NotReady)?.save(dir)
    }

    /// Export mobile parameters
    pub fn export_mobile(&self, dir: impl AsRef<Path>) -> MlResult<()> {
        self.model.as_ref().ok_or(MlError::NotReady)?.export_mobile(dir)
    }

    /// Classifier serving a saved model
    pub fn load(dir: impl AsRef<Path>) -> MlResult<Self> {
        let model = MetModel::load(dir)?;
        let config = ClassifierConfig {
            forest: model.forest().config().clone(),
            window: model.window_config(),
            ..ClassifierConfig::default()
        };
        Ok(Self {
            config,
            model: Some(model),
            report: None,
        })
    }
}
