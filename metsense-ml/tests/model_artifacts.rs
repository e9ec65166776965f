//! Save/load/export behaviour of model artifact directories

mod common;

use std::fs;
use std::path::Path;

use metsense_core::{MetClass, FEATURE_NAMES};
use metsense_ml::model::{METADATA_FILE, MODEL_FILE, SCALER_EXPORT_FILE, SCALER_FILE, TREE_EXPORT_FILE};
use metsense_ml::{MetClassifier, MetModel, MlError, MobileScalerParams, MobileTreeParams, Prediction};
use serde_json::Value;

fn rewrite_json(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut value: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    edit(&mut value);
    fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
}

#[test]
fn test_loaded_model_predicts_identically() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");

    model.save(&model_dir).unwrap();
    let loaded = MetModel::load(&model_dir).unwrap();

    assert_eq!(loaded.artifact_id(), model.artifact_id());
    assert_eq!(loaded.feature_names(), model.feature_names());

    for row in common::synthetic_dataset().feature_rows().iter().step_by(7) {
        let before = model.predict(row).unwrap();
        let after = loaded.predict(row).unwrap();
        assert_eq!(before.predicted_class, after.predicted_class);
        assert_eq!(before.probabilities, after.probabilities);
    }
}

#[test]
fn test_metadata_file_layout() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    model.save(dir.path().join("met")).unwrap();

    let metadata: Value = serde_json::from_slice(&fs::read(dir.path().join("met").join(METADATA_FILE)).unwrap()).unwrap();
    assert_eq!(metadata["model_type"], "RandomForestClassifier");
    assert_eq!(metadata["n_features"], 16);
    assert_eq!(metadata["window_size"], 50);
    assert_eq!(metadata["met_classes"]["0"], "Sedentary");
    assert_eq!(metadata["met_classes"]["3"], "Vigorous");
    assert_eq!(metadata["feature_names"][15], FEATURE_NAMES[15]);
    assert_eq!(metadata["artifact_id"].as_str().unwrap().len(), 32);
}

#[test]
fn test_save_replaces_existing_directory() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");

    fs::create_dir_all(&model_dir).unwrap();
    fs::write(model_dir.join("stale.txt"), b"old").unwrap();

    model.save(&model_dir).unwrap();
    model.save(&model_dir).unwrap();

    assert!(!model_dir.join("stale.txt").exists());
    assert!(MetModel::load(&model_dir).is_ok());

    // No staging or backup directories left behind
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("met")]);
}

#[test]
fn test_load_rejects_missing_files() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();

    for file in [MODEL_FILE, SCALER_FILE, METADATA_FILE] {
        let model_dir = dir.path().join(file.replace('.', "_"));
        model.save(&model_dir).unwrap();
        fs::remove_file(model_dir.join(file)).unwrap();

        match MetModel::load(&model_dir) {
            Err(MlError::MissingArtifact { file: missing }) => assert_eq!(missing, file),
            other => panic!("expected MissingArtifact for {}, got {:?}", file, other),
        }
    }
}

#[test]
fn test_load_rejects_mixed_artifacts() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");
    model.save(&model_dir).unwrap();

    rewrite_json(&model_dir.join(SCALER_FILE), |v| {
        v["artifact_id"] = Value::from("00000000000000000000000000000000");
    });

    match MetModel::load(&model_dir) {
        Err(MlError::ArtifactMismatch { file, expected, .. }) => {
            assert_eq!(file, SCALER_FILE);
            assert_eq!(expected, model.artifact_id());
        }
        other => panic!("expected ArtifactMismatch, got {:?}", other),
    }
}

#[test]
fn test_load_rejects_bad_metadata() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");
    model.save(&model_dir).unwrap();

    rewrite_json(&model_dir.join(METADATA_FILE), |v| {
        v["model_type"] = Value::from("GradientBoostingClassifier");
    });
    assert!(matches!(MetModel::load(&model_dir), Err(MlError::InvalidMetadata(_))));

    model.save(&model_dir).unwrap();
    rewrite_json(&model_dir.join(METADATA_FILE), |v| {
        v["n_features"] = Value::from(12);
    });
    assert!(matches!(MetModel::load(&model_dir), Err(MlError::InvalidMetadata(_))));

    model.save(&model_dir).unwrap();
    rewrite_json(&model_dir.join(METADATA_FILE), |v| {
        v["met_classes"].as_object_mut().unwrap().remove("3");
    });
    assert!(matches!(MetModel::load(&model_dir), Err(MlError::InvalidMetadata(_))));

    fs::write(model_dir.join(METADATA_FILE), b"{not json").unwrap();
    assert!(matches!(MetModel::load(&model_dir), Err(MlError::Json(_))));
}

#[test]
fn test_load_rejects_foreign_class_map() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");

    // Right count, wrong keys
    model.save(&model_dir).unwrap();
    rewrite_json(&model_dir.join(METADATA_FILE), |v| {
        v["met_classes"] = serde_json::json!({"0": "Sedentary", "1": "Light", "2": "Moderate", "9": "Vigorous"});
    });
    assert!(matches!(MetModel::load(&model_dir), Err(MlError::InvalidMetadata(_))));

    // Right keys, renamed class
    model.save(&model_dir).unwrap();
    rewrite_json(&model_dir.join(METADATA_FILE), |v| {
        v["met_classes"]["0"] = Value::from("Running");
    });
    match MetModel::load(&model_dir) {
        Err(MlError::InvalidMetadata(message)) => assert!(message.contains("Running")),
        other => panic!("expected InvalidMetadata, got {:?}", other),
    }

    model.save(&model_dir).unwrap();
    let loaded = MetModel::load(&model_dir).unwrap();
    assert_eq!(loaded.metadata().met_classes["3"], MetClass::Vigorous.name());
}

#[test]
fn test_load_rejects_edited_forest_with_kept_id() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");
    model.save(&model_dir).unwrap();

    rewrite_json(&model_dir.join(MODEL_FILE), |v| {
        let samples = v["content"]["num_samples"].as_u64().unwrap();
        v["content"]["num_samples"] = Value::from(samples + 1);
    });

    match MetModel::load(&model_dir) {
        Err(MlError::ArtifactMismatch { expected, found, .. }) => {
            assert_eq!(expected, model.artifact_id());
            assert_ne!(found, expected);
        }
        other => panic!("expected ArtifactMismatch, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_save_succeeds_when_backup_cannot_be_removed() {
    use std::os::unix::fs::PermissionsExt;

    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("met");

    fs::create_dir_all(&model_dir).unwrap();
    fs::write(model_dir.join("stale.txt"), b"old").unwrap();
    fs::set_permissions(&model_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // The new model is in place even if the old directory lingers
    model.save(&model_dir).unwrap();
    assert_eq!(MetModel::load(&model_dir).unwrap().artifact_id(), model.artifact_id());

    let backup = dir.path().join(format!(".met.previous-{}", model.artifact_id()));
    if backup.exists() {
        fs::set_permissions(&backup, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[test]
fn test_classifier_load_serves_predictions() {
    let dir = tempfile::tempdir().unwrap();
    common::trained_classifier().save(dir.path().join("met")).unwrap();

    let classifier = MetClassifier::load(dir.path().join("met")).unwrap();
    assert!(classifier.is_ready());
    assert!(classifier.report().is_none());

    let prediction = classifier.predict(common::synthetic_dataset().features[0].as_slice()).unwrap();
    let sum: f32 = prediction.probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    assert!((0.0..=1.0).contains(&prediction.confidence));
}

#[test]
fn test_untrained_classifier_is_not_ready() {
    let classifier = MetClassifier::default();
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(classifier.predict(&[0.0; 16]), Err(MlError::NotReady)));
    assert!(matches!(classifier.save(dir.path().join("met")), Err(MlError::NotReady)));
    assert!(matches!(classifier.export_mobile(dir.path()), Err(MlError::NotReady)));
    assert!(!dir.path().join("met").exists());
}

#[test]
fn test_mobile_export_contents() {
    let model = common::trained_model();
    let dir = tempfile::tempdir().unwrap();
    model.export_mobile(dir.path()).unwrap();

    let scaler: MobileScalerParams =
        serde_json::from_slice(&fs::read(dir.path().join(SCALER_EXPORT_FILE)).unwrap()).unwrap();
    assert_eq!(scaler.mean.len(), 16);
    assert_eq!(scaler.scale.len(), 16);
    assert!(scaler.scale.iter().all(|&s| s > 0.0));

    let trees: MobileTreeParams =
        serde_json::from_slice(&fs::read(dir.path().join(TREE_EXPORT_FILE)).unwrap()).unwrap();
    assert_eq!(trees.n_estimators, 50);
    assert_eq!(trees.max_depth, 10);
    assert_eq!(trees.classes, vec![0, 1, 2, 3]);
    assert_eq!(trees.feature_importances.len(), 16);
    let total: f32 = trees.feature_importances.iter().sum();
    assert!((total - 1.0).abs() < 1e-4);
}

#[test]
fn test_prediction_json_uses_class_index() {
    let model = common::trained_model();
    let prediction = model.predict(common::synthetic_dataset().features[0].as_slice()).unwrap();

    let json: Value = serde_json::to_value(&prediction).unwrap();
    let index = json["predicted_class"].as_u64().unwrap() as usize;
    assert_eq!(MetClass::from_index(index), Some(prediction.predicted_class));
    assert_eq!(json["probabilities"].as_array().unwrap().len(), 4);

    let back: Prediction = serde_json::from_value(json).unwrap();
    assert_eq!(back, prediction);
}
