//! WISDM raw text fetched over HTTP
//!
//! The body is streamed to a cache file on first use and parsed from disk
//! afterwards, so repeated training runs only download once.
//!
//! ## Features
//!
//! - Blocking `ureq` client, no async runtime
//! - Retries on transport errors, 5xx and 429 with exponential backoff
//! - Download lands in `<cache>.part` and is renamed into place when complete
//!
//! ## Example
//!
//! ```rust,no_run
//! use metsense_data::{DataSource, HttpSource};
//! use metsense_data::http::HttpConfig;
//!
//! let config = HttpConfig::new("https://example.org/WISDM_ar_v1.1_raw.txt")
//!     .timeout_secs(60)
//!     .max_retries(2);
//! let mut source = HttpSource::new(config, "data/raw/WISDM_ar_v1.1_raw.txt")?;
//! let samples = source.load()?;
//! # Ok::<(), metsense_data::DataError>(())
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use metsense_core::AccelSample;

use crate::wisdm::{parse_wisdm, ParseStats};
use crate::{DataError, DataResult, DataSource};

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Location of the raw text
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create config with defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: format!("metsense/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set retry count
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Cached HTTP download of a WISDM text file
pub struct HttpSource {
    config: HttpConfig,
    agent: ureq::Agent,
    cache_path: PathBuf,
    name: String,
    last_stats: Option<ParseStats>,
}

impl HttpSource {
    /// Create a source downloading into `cache_path`
    pub fn new(config: HttpConfig, cache_path: impl Into<PathBuf>) -> DataResult<Self> {
        if !config.url.starts_with("http://") && !config.url.starts_with("https://") {
            return Err(DataError::Http("URL must start with http:// or https://".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        let name = format!("http:{}", config.url);

        Ok(Self {
            config,
            agent,
            cache_path: cache_path.into(),
            name,
            last_stats: None,
        })
    }

    /// Where the body is cached
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Counters from the most recent load
    pub fn last_stats(&self) -> Option<ParseStats> {
        self.last_stats
    }

    fn download(&self) -> DataResult<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Downloading {} to {}", self.config.url, self.cache_path.display());
        let partial = self.cache_path.with_extension("part");
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                thread::sleep(Duration::from_millis(100 * (1 << attempt.min(6))));
            }

            match self.agent.get(&self.config.url).call() {
                Ok(response) => {
                    return store_body(&mut response.into_reader(), &partial, &self.cache_path);
                }
                Err(ureq::Error::Status(code, _)) if code >= 500 || code == 429 => {
                    warn!("Attempt {} got status {}", attempt + 1, code);
                    last_error = Some(DataError::Http(format!("server returned {}", code)));
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(DataError::Http(format!("server returned {}", code)));
                }
                Err(ureq::Error::Transport(e)) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(DataError::Http(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Http("download failed".into())))
    }
}

/// Stream `body` into `partial`, then move it to `dest`
///
/// A failed transfer removes `partial` so no truncated file is left behind.
fn store_body<R: Read + ?Sized>(body: &mut R, partial: &Path, dest: &Path) -> DataResult<()> {
    let written = File::create(partial).and_then(|mut file| {
        io::copy(body, &mut file)?;
        file.sync_all()
    });

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(partial) {
            warn!("Could not remove partial download {}: {}", partial.display(), cleanup);
        }
        return Err(e.into());
    }

    fs::rename(partial, dest)?;
    Ok(())
}

impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> DataResult<Vec<AccelSample>> {
        if !self.cache_path.exists() {
            self.download()?;
        }

        let file = File::open(&self.cache_path)?;
        let (samples, stats) = parse_wisdm(BufReader::new(file))?;
        self.last_stats = Some(stats);

        if samples.is_empty() {
            return Err(DataError::Empty {
                source_name: self.name.clone(),
            });
        }
        Ok(samples)
    }
}
