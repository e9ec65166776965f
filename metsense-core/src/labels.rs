//! Activity → MET value → MET class
//!
//! ## Overview
//!
//! Labels for training come from two lookups:
//!
//! ```text
//! "Jogging" ──table──▶ 7.0 MET ──breakpoints──▶ Vigorous (3)
//! ```
//!
//! The first lookup is configuration and can fail: an activity missing from the
//! table is an `UnmappedActivity` error. The second lookup is a pure, total
//! function of the MET value with inclusive lower bounds:
//!
//! | MET value       | Class         |
//! |-----------------|---------------|
//! | `< 1.5`         | 0 Sedentary   |
//! | `[1.5, 3.0)`    | 1 Light       |
//! | `[3.0, 6.0)`    | 2 Moderate    |
//! | `>= 6.0`        | 3 Vigorous    |
//!
//! Note that `Standing` (1.2 MET) lands in Sedentary, not Light.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ACTIVITY_METS, LIGHT_MET_MIN, MODERATE_MET_MIN, VIGOROUS_MET_MIN};
use crate::errors::{CoreError, CoreResult};
use crate::sample::AccelSample;

/// Ordinal activity-intensity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum MetClass {
    /// Below 1.5 MET
    Sedentary = 0,
    /// 1.5 to 3.0 MET
    Light = 1,
    /// 3.0 to 6.0 MET
    Moderate = 2,
    /// 6.0 MET and above
    Vigorous = 3,
}

impl MetClass {
    /// Number of classes
    pub const COUNT: usize = 4;

    /// All classes in index order
    pub const ALL: [MetClass; Self::COUNT] = [
        MetClass::Sedentary,
        MetClass::Light,
        MetClass::Moderate,
        MetClass::Vigorous,
    ];

    /// Bucket a MET value using the fixed breakpoints
    ///
    /// Each breakpoint belongs to the class that starts there, so 3.0 is
    /// Moderate. Monotone non-decreasing in `met`.
    pub fn from_met(met: f32) -> Self {
        if met < LIGHT_MET_MIN {
            MetClass::Sedentary
        } else if met < MODERATE_MET_MIN {
            MetClass::Light
        } else if met < VIGOROUS_MET_MIN {
            MetClass::Moderate
        } else {
            MetClass::Vigorous
        }
    }

    /// Class for an index in `0..COUNT`
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Index in `0..COUNT`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            MetClass::Sedentary => "Sedentary",
            MetClass::Light => "Light",
            MetClass::Moderate => "Moderate",
            MetClass::Vigorous => "Vigorous",
        }
    }

    /// Index → name map as persisted with a model
    pub fn class_names() -> BTreeMap<usize, String> {
        Self::ALL
            .iter()
            .map(|class| (class.index(), class.name().to_string()))
            .collect()
    }
}

impl fmt::Display for MetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Activity name → MET value lookup
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivityMetTable {
    entries: BTreeMap<String, f32>,
}

impl Default for ActivityMetTable {
    fn default() -> Self {
        let entries = DEFAULT_ACTIVITY_METS
            .iter()
            .map(|(name, met)| (name.to_string(), *met))
            .collect();
        Self { entries }
    }
}

impl ActivityMetTable {
    /// Table with no activities
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Register or replace an activity
    ///
    /// MET values must be finite and non-negative.
    pub fn insert(&mut self, activity: impl Into<String>, met: f32) -> CoreResult<()> {
        let activity = activity.into();
        if !met.is_finite() || met < 0.0 {
            return Err(CoreError::InvalidMetValue { activity, value: met });
        }
        self.entries.insert(activity, met);
        Ok(())
    }

    /// MET value of an activity
    pub fn met_value(&self, activity: &str) -> CoreResult<f32> {
        self.entries
            .get(activity)
            .copied()
            .ok_or_else(|| CoreError::UnmappedActivity {
                activity: activity.to_string(),
            })
    }

    /// MET class of an activity
    pub fn met_class(&self, activity: &str) -> CoreResult<MetClass> {
        self.met_value(activity).map(MetClass::from_met)
    }

    /// Registered activity names, sorted
    pub fn activities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered activities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no activity is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Label every sample of a stream
///
/// Fails on the first activity missing from `table`, before any label is
/// handed out.
pub fn label_samples(table: &ActivityMetTable, samples: &[AccelSample]) -> CoreResult<Vec<MetClass>> {
    samples
        .iter()
        .map(|sample| table.met_class(&sample.activity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    #[test]
    fn test_breakpoints_start_the_next_class() {
        assert_eq!(MetClass::from_met(1.49), MetClass::Sedentary);
        assert_eq!(MetClass::from_met(1.5), MetClass::Light);
        assert_eq!(MetClass::from_met(2.99), MetClass::Light);
        assert_eq!(MetClass::from_met(3.0), MetClass::Moderate);
        assert_eq!(MetClass::from_met(5.99), MetClass::Moderate);
        assert_eq!(MetClass::from_met(6.0), MetClass::Vigorous);
        assert_eq!(MetClass::from_met(0.0), MetClass::Sedentary);
        assert_eq!(MetClass::from_met(f32::MAX), MetClass::Vigorous);
    }

    #[test]
    fn test_default_table_matches_reference_classes() {
        let table = ActivityMetTable::default();
        assert_eq!(table.len(), 8);

        assert_eq!(table.met_class("Sitting").unwrap(), MetClass::Sedentary);
        assert_eq!(table.met_class("Standing").unwrap(), MetClass::Sedentary);
        assert_eq!(table.met_class("SlowWalk").unwrap(), MetClass::Light);
        assert_eq!(table.met_class("Walking").unwrap(), MetClass::Moderate);
        assert_eq!(table.met_class("Upstairs").unwrap(), MetClass::Moderate);
        assert_eq!(table.met_class("Downstairs").unwrap(), MetClass::Moderate);
        assert_eq!(table.met_class("Jogging").unwrap(), MetClass::Vigorous);
        assert_eq!(table.met_class("Running").unwrap(), MetClass::Vigorous);
    }

    #[test]
    fn test_unmapped_activity_is_an_error() {
        let table = ActivityMetTable::default();
        let err = table.met_value("Skydiving").unwrap_err();
        assert_eq!(
            err,
            CoreError::UnmappedActivity { activity: "Skydiving".to_string() }
        );
    }

    #[test]
    fn test_insert_rejects_non_finite_values() {
        let mut table = ActivityMetTable::empty();
        assert!(table.insert("Cycling", f32::NAN).is_err());
        assert!(table.insert("Cycling", -1.0).is_err());
        table.insert("Cycling", 7.5).unwrap();
        assert_eq!(table.met_class("Cycling").unwrap(), MetClass::Vigorous);
    }

    #[test]
    fn test_label_samples_stops_on_unmapped() {
        let table = ActivityMetTable::default();
        let samples = vec![
            AccelSample::new(1, "Sitting", 0, 0.0, 0.0, 9.8),
            AccelSample::new(1, "Teleporting", 1, 0.0, 0.0, 9.8),
        ];
        assert!(matches!(
            label_samples(&table, &samples),
            Err(CoreError::UnmappedActivity { .. })
        ));

        let labels = label_samples(&table, &samples[..1]).unwrap();
        assert_eq!(labels, vec![MetClass::Sedentary]);
    }

    #[test]
    fn test_index_name_round_trip() {
        for class in MetClass::ALL {
            assert_eq!(MetClass::from_index(class.index()), Some(class));
        }
        assert_eq!(MetClass::from_index(4), None);

        let names = MetClass::class_names();
        assert_eq!(names.len(), 4);
        assert_eq!(names[&2], "Moderate");
    }

    proptest! {
        #[test]
        fn test_from_met_is_monotone(a in -10.0f32..20.0, b in -10.0f32..20.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(MetClass::from_met(lo) <= MetClass::from_met(hi));
        }
    }
}
