//! Primary/fallback source combinator

use log::{info, warn};
use metsense_core::AccelSample;

use crate::{DataResult, DataSource};

/// Loads `primary`, or `fallback` when the primary fails
#[derive(Debug, Clone)]
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
    used_fallback: bool,
}

impl<P: DataSource, F: DataSource> FallbackSource<P, F> {
    /// Combine two sources
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            used_fallback: false,
        }
    }

    /// Whether the last load came from the fallback
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Primary source
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Fallback source
    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: DataSource, F: DataSource> DataSource for FallbackSource<P, F> {
    fn name(&self) -> &str {
        if self.used_fallback {
            self.fallback.name()
        } else {
            self.primary.name()
        }
    }

    fn load(&mut self) -> DataResult<Vec<AccelSample>> {
        match self.primary.load() {
            Ok(samples) => {
                self.used_fallback = false;
                info!("Loaded {} samples from {}", samples.len(), self.primary.name());
                Ok(samples)
            }
            Err(e) => {
                warn!(
                    "Source {} failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                self.used_fallback = true;
                self.fallback.load()
            }
        }
    }
}
