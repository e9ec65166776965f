//! Majority voting over recent window predictions
//!
//! Classifying each window on its own makes the reported intensity jump
//! whenever a single window is noisy (picking the phone up, a bump in the
//! pocket). The voter keeps the last N class decisions and reports the
//! majority among them:
//!
//! ```text
//! raw:      0 0 3 0 0
//! history: [0] [0 0] [0 0 3] [0 3 0] [3 0 0]
//! smoothed: 0 0 0 0 0
//! ```
//!
//! Ties go to whichever tied class was seen most recently, so a genuine change
//! of activity shows through as soon as it holds a plurality.
//!
//! The voter only holds class history, never model state.

use alloc::vec::Vec;

use crate::buffer::CircularBuffer;
use crate::constants::DEFAULT_VOTING_WINDOW;
use crate::errors::{CoreError, CoreResult};
use crate::labels::MetClass;

/// Rolling majority filter over class decisions
#[derive(Debug, Clone)]
pub struct MajorityVoter {
    history: CircularBuffer<MetClass>,
}

impl Default for MajorityVoter {
    fn default() -> Self {
        Self {
            history: CircularBuffer::with_capacity(DEFAULT_VOTING_WINDOW),
        }
    }
}

impl MajorityVoter {
    /// Voter keeping the last `window` decisions
    pub fn new(window: usize) -> CoreResult<Self> {
        if window == 0 {
            return Err(CoreError::InvalidVotingWindow);
        }
        Ok(Self {
            history: CircularBuffer::with_capacity(window),
        })
    }

    /// Number of decisions considered
    pub fn window(&self) -> usize {
        self.history.capacity()
    }

    /// Decisions currently retained, oldest first
    pub fn history(&self) -> impl Iterator<Item = MetClass> + '_ {
        self.history.iter().copied()
    }

    /// Record a decision and return the smoothed class
    pub fn push(&mut self, class: MetClass) -> MetClass {
        self.history.push(class);
        self.current().unwrap_or(class)
    }

    /// Majority of the retained decisions, if any
    pub fn current(&self) -> Option<MetClass> {
        let mut votes = [0usize; MetClass::COUNT];
        let mut last_seen = [0usize; MetClass::COUNT];

        for (position, class) in self.history.iter().enumerate() {
            votes[class.index()] += 1;
            last_seen[class.index()] = position;
        }

        MetClass::ALL
            .iter()
            .copied()
            .filter(|class| votes[class.index()] > 0)
            .max_by_key(|class| (votes[class.index()], last_seen[class.index()]))
    }

    /// Smooth a whole sequence from an empty history
    pub fn smooth(&mut self, classes: &[MetClass]) -> Vec<MetClass> {
        self.reset();
        classes.iter().map(|&class| self.push(class)).collect()
    }

    /// Forget all decisions
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::labels::MetClass::*;

    #[test]
    fn test_lone_spike_is_suppressed() {
        let mut voter = MajorityVoter::new(3).unwrap();
        let smoothed = voter.smooth(&[Sedentary, Sedentary, Vigorous, Sedentary, Sedentary]);
        assert_eq!(smoothed, vec![Sedentary; 5]);
    }

    #[test]
    fn test_sustained_change_comes_through() {
        let mut voter = MajorityVoter::new(3).unwrap();
        let smoothed = voter.smooth(&[Light, Light, Moderate, Moderate, Moderate]);
        assert_eq!(smoothed, vec![Light, Light, Light, Moderate, Moderate]);
    }

    #[test]
    fn test_ties_go_to_most_recent() {
        let mut voter = MajorityVoter::new(2).unwrap();
        assert_eq!(voter.push(Light), Light);
        // [Light, Vigorous]: one vote each
        assert_eq!(voter.push(Vigorous), Vigorous);

        let mut voter = MajorityVoter::new(4).unwrap();
        for class in [Moderate, Light, Light, Moderate] {
            voter.push(class);
        }
        assert_eq!(voter.current(), Some(Moderate));
    }

    #[test]
    fn test_three_way_split_follows_latest() {
        let mut voter = MajorityVoter::new(3).unwrap();
        let smoothed = voter.smooth(&[Sedentary, Light, Moderate]);
        assert_eq!(smoothed, vec![Sedentary, Light, Moderate]);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let mut voter = MajorityVoter::new(1).unwrap();
        let raw = [Vigorous, Sedentary, Light, Light, Moderate];
        assert_eq!(voter.smooth(&raw), raw.to_vec());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert_eq!(MajorityVoter::new(0).unwrap_err(), CoreError::InvalidVotingWindow);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut voter = MajorityVoter::default();
        assert_eq!(voter.window(), 3);
        voter.push(Vigorous);
        voter.push(Vigorous);
        voter.reset();
        assert_eq!(voter.current(), None);
        assert_eq!(voter.push(Sedentary), Sedentary);
        assert_eq!(voter.history().count(), 1);
    }
}
