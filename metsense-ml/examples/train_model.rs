//! metsense end-to-end training example
//!
//! Loads accelerometer data, builds windowed features, trains the MET
//! classifier, saves the model directory and the mobile export, then replays
//! a stream through the live monitor.
//!
//! ```text
//! cargo run --example train_model -- [WISDM_raw.txt] [out_dir] [config.json]
//! ```
//!
//! Without a readable WISDM file the synthetic generator is used instead.

use std::env;
use std::path::PathBuf;
use std::process;

use metsense_core::{build_dataset, ActivityMetTable, FeatureExtractor, WindowSegmenter};
use metsense_data::{DataSource, FallbackSource, SyntheticSource, WisdmFileSource};
use metsense_ml::{MetClassifier, MetMonitor, MlError, TrainingConfig};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let data_path = args.next().unwrap_or_else(|| "data/raw/WISDM_ar_v1.1_raw.txt".into());
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "models".into()));
    let config = match args.next() {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };

    println!("=== metsense MET Classifier Training ===\n");

    println!("Step 1: Loading data");
    println!("====================");
    let mut source = FallbackSource::new(WisdmFileSource::new(&data_path), SyntheticSource::default());
    let samples = source.load()?;
    println!("{} samples from {}", samples.len(), source.name());
    if source.used_fallback() {
        println!("(could not read {}, using synthetic data)", data_path);
    }

    println!("\nStep 2: Building windowed features");
    println!("==================================");
    let table = ActivityMetTable::default();
    let segmenter = WindowSegmenter::new(config.window)?;
    let extractor = FeatureExtractor::new(config.window);
    let dataset = build_dataset(&samples, &table, &segmenter, &extractor)?;
    println!(
        "{} windows of {} samples ({:.1}s)",
        dataset.len(),
        config.window.window_size,
        config.window.duration_secs()
    );
    println!("Class distribution: {:?}", dataset.class_distribution());

    println!("\nStep 3: Training");
    println!("================");
    let mut classifier = MetClassifier::new(config.classifier());
    let accuracy = classifier.train_dataset(&dataset)?;
    if let Some(report) = classifier.report() {
        println!("{}", report);
    }
    println!("Held-out accuracy: {:.3}", accuracy);

    println!("\nStep 4: Saving artifacts");
    println!("========================");
    let model_dir = out_dir.join("met");
    let mobile_dir = out_dir.join("mobile");
    classifier.save(&model_dir)?;
    classifier.export_mobile(&mobile_dir)?;
    println!("Model:  {}", model_dir.display());
    println!("Mobile: {}", mobile_dir.display());

    println!("\nStep 5: Live monitoring replay");
    println!("==============================");
    let model = classifier.into_model().ok_or(MlError::NotReady)?;
    println!("Artifact id: {}", model.artifact_id());
    let mut monitor = MetMonitor::new(model, config.voting_window)?;

    let subject = samples.first().map(|s| s.subject).unwrap_or_default();
    for sample in samples.iter().filter(|s| s.subject == subject).take(400) {
        if let Some(output) = monitor.push(sample)? {
            println!(
                "[{:>10}] raw {:<9} ({:.2})  smoothed {}",
                sample.activity,
                output.prediction.class_name,
                output.prediction.confidence,
                output.smoothed_class
            );
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
