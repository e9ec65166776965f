//! WISDM raw text format
//!
//! One reading per record, records terminated by `;` (optional on the last
//! record of a line):
//!
//! ```text
//! 33,Jogging,49105962326000,-0.6946377,12.680544,0.50395286;
//! ```
//!
//! Fields past the sixth are ignored. Records that cannot be parsed are
//! skipped and counted, never fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use metsense_core::AccelSample;

use crate::{DataError, DataResult, DataSource};

/// Counters from one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Records turned into samples
    pub parsed: usize,
    /// Records skipped as malformed
    pub skipped: usize,
    /// 1-based line of the first skipped record
    pub first_skipped_line: Option<usize>,
}

/// Parse WISDM records from a reader
pub fn parse_wisdm<R: BufRead>(reader: R) -> DataResult<(Vec<AccelSample>, ParseStats)> {
    let mut samples = Vec::new();
    let mut stats = ParseStats::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        for record in line.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            match parse_record(record) {
                Some(sample) => {
                    samples.push(sample);
                    stats.parsed += 1;
                }
                None => {
                    stats.skipped += 1;
                    if stats.first_skipped_line.is_none() {
                        stats.first_skipped_line = Some(line_no + 1);
                    }
                }
            }
        }
    }

    if stats.skipped > 0 {
        warn!(
            "Skipped {} malformed WISDM records (first on line {})",
            stats.skipped,
            stats.first_skipped_line.unwrap_or(0)
        );
    }
    debug!("Parsed {} WISDM records", stats.parsed);

    Ok((samples, stats))
}

fn parse_record(record: &str) -> Option<AccelSample> {
    let mut fields = record.split(',').map(str::trim);

    let subject = fields.next()?.parse::<u32>().ok()?;
    let activity = fields.next().filter(|a| !a.is_empty())?;
    let timestamp = fields.next()?.parse::<u64>().ok()?;

    let mut axis = || fields.next()?.parse::<f32>().ok().filter(|v| v.is_finite());
    let x = axis()?;
    let y = axis()?;
    let z = axis()?;

    Some(AccelSample::new(subject, activity, timestamp, x, y, z))
}

/// WISDM text file on local disk
#[derive(Debug, Clone)]
pub struct WisdmFileSource {
    path: PathBuf,
    name: String,
    last_stats: Option<ParseStats>,
}

impl WisdmFileSource {
    /// Create a source for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("wisdm:{}", path.display());
        Self {
            path,
            name,
            last_stats: None,
        }
    }

    /// File being parsed
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counters from the most recent load
    pub fn last_stats(&self) -> Option<ParseStats> {
        self.last_stats
    }
}

impl DataSource for WisdmFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> DataResult<Vec<AccelSample>> {
        let file = File::open(&self.path)?;
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
