//! Accelerometer samples and (subject, activity) grouping
//!
//! Samples are immutable inputs. Grouping gathers the samples of one subject
//! performing one activity, keeping their original order, so the segmenter
//! never sees a sequence that mixes two groups.

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One tri-axial accelerometer reading
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccelSample {
    /// Subject (user) identifier
    pub subject: u32,
    /// Activity label as recorded by the data source
    pub activity: String,
    /// Timestamp or sequence index
    pub timestamp: u64,
    /// Acceleration along x
    pub x: f32,
    /// Acceleration along y
    pub y: f32,
    /// Acceleration along z
    pub z: f32,
}

impl AccelSample {
    /// Create a sample
    pub fn new(subject: u32, activity: impl Into<String>, timestamp: u64, x: f32, y: f32, z: f32) -> Self {
        Self {
            subject,
            activity: activity.into(),
            timestamp,
            x,
            y,
            z,
        }
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// Ordered samples of a single (subject, activity) pair
///
/// Only `group_samples` builds groups, which is what guarantees that every
/// sample in `samples` shares `subject` and `activity`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup<'a> {
    /// Subject shared by all samples
    pub subject: u32,
    /// Activity shared by all samples
    pub activity: &'a str,
    /// Samples in stream order
    pub samples: Vec<&'a AccelSample>,
    /// Position of each sample in the original stream
    pub indices: Vec<usize>,
}

impl<'a> SampleGroup<'a> {
    /// Number of samples in the group
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the group has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Split a stream into (subject, activity) groups
///
/// Groups come out ordered by first appearance of the subject, then by first
/// appearance of the activity within that subject. Samples of a group keep
/// their stream order even when the group's runs are interleaved with other
/// groups.
pub fn group_samples(samples: &[AccelSample]) -> Vec<SampleGroup<'_>> {
    // subject -> positions of its groups in `groups`
    let mut subjects: Vec<(u32, Vec<usize>)> = Vec::new();
    let mut groups: Vec<SampleGroup<'_>> = Vec::new();

    for (index, sample) in samples.iter().enumerate() {
        let subject_pos = match subjects.iter().position(|(id, _)| *id == sample.subject) {
            Some(pos) => pos,
            None => {
                subjects.push((sample.subject, Vec::new()));
                subjects.len() - 1
            }
        };

        let group_pos = subjects[subject_pos]
            .1
            .iter()
            .copied()
            .find(|&g| groups[g].activity == sample.activity);

        let group_pos = match group_pos {
            Some(g) => g,
            None => {
                groups.push(SampleGroup {
                    subject: sample.subject,
                    activity: sample.activity.as_str(),
                    samples: Vec::new(),
                    indices: Vec::new(),
                });
                subjects[subject_pos].1.push(groups.len() - 1);
                groups.len() - 1
            }
        };

        groups[group_pos].samples.push(sample);
        groups[group_pos].indices.push(index);
    }

    // Emit subject by subject in first-appearance order
    let mut order: Vec<usize> = Vec::with_capacity(groups.len());
    for (_, group_ids) in &subjects {
        order.extend_from_slice(group_ids);
    }

    let mut slots: Vec<Option<SampleGroup<'_>>> = groups.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|g| slots[g].take())
        .collect()
}
