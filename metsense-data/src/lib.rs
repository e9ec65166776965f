//! Accelerometer data sources for metsense
//!
//! ## Source Selection Guide
//!
//! ### WISDM text file
//! - **Use when**: the raw WISDM export is already on disk
//! - **Format**: `user,activity,timestamp,x,y,z;` one reading per line
//! - **Robustness**: malformed lines are skipped and counted
//!
//! ### HTTP fetch (feature `http`)
//! - **Use when**: the raw text lives behind a URL
//! - **Caching**: downloaded once to a local path, parsed from there afterwards
//! - **Client**: blocking `ureq`, no async runtime
//!
//! ### Synthetic
//! - **Use when**: no real data is reachable, or in tests
//! - **Determinism**: every draw comes from a seeded `StdRng`
//! - **Shape**: 7 activities x 10 subjects x 100 readings, gravity on z
//!
//! ### Fallback
//! Wraps a primary and a fallback source. A failing primary is logged at
//! warn level and the fallback is loaded instead. This is the only place in
//! metsense where an error degrades instead of propagating.
//!
//! ## Example Usage
//!
//! ```rust
//! use metsense_data::{DataSource, FallbackSource, SyntheticSource, WisdmFileSource};
//!
//! let mut source = FallbackSource::new(
//!     WisdmFileSource::new("data/raw/WISDM_ar_v1.1_raw.txt"),
//!     SyntheticSource::default(),
//! );
//! let samples = source.load()?;
//! println!("{} samples (fallback: {})", samples.len(), source.used_fallback());
//! # Ok::<(), metsense_data::DataError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fallback;
#[cfg(feature = "http")]
pub mod http;
pub mod synthetic;
pub mod wisdm;

pub use fallback::FallbackSource;
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use synthetic::{SyntheticConfig, SyntheticSource};
pub use wisdm::{parse_wisdm, ParseStats, WisdmFileSource};

use metsense_core::{AccelSample, CoreError};
use thiserror::Error;

/// Common data source errors
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading or writing local files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network fetch failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Source produced no samples
    #[error("Source {source_name} yielded no samples")]
    Empty {
        /// Name of the empty source
        source_name: String,
    },

    /// Generator parameters rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample construction failed
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for data sources
pub type DataResult<T> = Result<T, DataError>;

/// Trait for everything that produces an accelerometer stream
pub trait DataSource {
    /// Short human-readable name, used in logs
    fn name(&self) -> &str;

    /// Produce the full ordered sample stream
    fn load(&mut self) -> DataResult<Vec<AccelSample>>;
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&mut self) -> DataResult<Vec<AccelSample>> {
        (**self).load()
    }
}
