//! Integration tests for the signal path
//!
//! Raw samples through labeling, grouping, segmentation and feature
//! extraction, then window decisions through the voter.

use metsense_core::{
    build_dataset, group_samples, label_samples, AccelSample, ActivityMetTable, CoreError, FeatureExtractor,
    MajorityVoter, MetClass, WindowConfig, WindowSegmenter, NUM_FEATURES,
};
use proptest::prelude::*;

/// Sine-ish wobble around gravity, amplitude growing with intensity
fn session(subject: u32, activity: &str, len: usize, amplitude: f32) -> Vec<AccelSample> {
    (0..len)
        .map(|i| {
            let phase = i as f32 * 0.7;
            AccelSample::new(
                subject,
                activity,
                i as u64,
                amplitude * libm::sinf(phase),
                amplitude * libm::cosf(phase),
                9.8 + 0.5 * amplitude * libm::sinf(2.0 * phase),
            )
        })
        .collect()
}

#[test]
fn test_windows_follow_groups() {
    let mut samples = session(1, "Walking", 120, 3.0);
    samples.extend(session(1, "Jogging", 75, 6.0));
    samples.extend(session(2, "Walking", 49, 3.0));

    let table = ActivityMetTable::default();
    let labels = label_samples(&table, &samples).unwrap();
    let segmenter = WindowSegmenter::new(WindowConfig::default()).unwrap();

    let groups = group_samples(&samples);
    assert_eq!(groups.len(), 3);

    let counts: Vec<usize> = groups
        .iter()
        .map(|group| {
            let group_labels: Vec<MetClass> = group.indices.iter().map(|&i| labels[i]).collect();
            let windows: Vec<_> = segmenter.segment(group, &group_labels).unwrap().collect();
            for window in &windows {
                assert!(window.start + window.samples.len() <= group.len());
                assert!(window.samples.iter().all(|s| s.activity == group.activity));
            }
            windows.len()
        })
        .collect();

    // (120-50)/25+1, (75-50)/25+1, too short
    assert_eq!(counts, vec![3, 2, 0]);
}

#[test]
fn test_dataset_from_mixed_stream() {
    let mut samples = session(1, "Sitting", 100, 0.2);
    samples.extend(session(1, "SlowWalk", 100, 2.0));
    samples.extend(session(2, "Walking", 100, 3.0));
    samples.extend(session(2, "Jogging", 100, 6.0));

    let window = WindowConfig::default();
    let dataset = build_dataset(
        &samples,
        &ActivityMetTable::default(),
        &WindowSegmenter::new(window).unwrap(),
        &FeatureExtractor::new(window),
    )
    .unwrap();

    assert_eq!(dataset.len(), 12);
    assert_eq!(dataset.class_distribution(), [3, 3, 3, 3]);
    assert!(dataset
        .features
        .iter()
        .all(|f| f.as_slice().len() == NUM_FEATURES && f.as_slice().iter().all(|v| v.is_finite())));

    // Intensity shows up in the magnitude spread
    let spread = |i: usize| dataset.features[i].get("std_magnitude").unwrap();
    assert!(spread(0) < spread(3));
    assert!(spread(6) < spread(9));
}

#[test]
fn test_unmapped_activity_is_an_error() {
    let mut samples = session(1, "Walking", 60, 3.0);
    samples.extend(session(1, "Skydiving", 60, 9.0));

    match label_samples(&ActivityMetTable::default(), &samples) {
        Err(CoreError::UnmappedActivity { activity }) => assert_eq!(activity, "Skydiving"),
        other => panic!("expected UnmappedActivity, got {:?}", other),
    }
}

#[test]
fn test_voter_smooths_window_decisions() {
    use MetClass::*;

    let mut voter = MajorityVoter::new(3).unwrap();
    let decisions = [Sedentary, Sedentary, Moderate, Sedentary, Sedentary];
    assert_eq!(voter.smooth(&decisions), vec![Sedentary; 5]);
}

proptest! {
    #[test]
    fn test_segmenting_is_repeatable(len in 0usize..400, size in 2usize..80) {
        let samples = session(7, "Walking", len, 3.0);
        let labels = label_samples(&ActivityMetTable::default(), &samples).unwrap();
        let segmenter = WindowSegmenter::new(WindowConfig { window_size: size, ..WindowConfig::default() }).unwrap();

        for group in group_samples(&samples) {
            let first: Vec<_> = segmenter.segment(&group, &labels).unwrap().collect();
            let second: Vec<_> = segmenter.segment(&group, &labels).unwrap().collect();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), segmenter.expected_window_count(group.len()));
        }
    }
}
