//! Scan configuration.
//!
//! Everything the engine needs to know is passed in here at construction;
//! there is no process-wide state.

use crate::error::{CarveError, Result};
use crate::types::{LENGTH_FIELD_SIZE, LFLE_MAGIC, MAX_RECORD, MIN_RECORD, WINDOW_SIZE};
use serde::Serialize;

/// Where the search resumes after a candidate whose body was inspected
/// and rejected.
///
/// Accepted records always resume past their span, and length-field
/// rejections always resume one byte after the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Jump over the declared span. Fast, but a genuine record that starts
    /// inside a bogus span is never seen.
    #[default]
    SkipSpan,
    /// Resume right after the rejected magic.
    NextByte,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub magic: [u8; 4],
    /// Exclusive lower bound on the declared length.
    pub min_record: u32,
    /// Inclusive upper bound on the declared length.
    pub max_record: u32,
    /// Bytes of new territory per window; consecutive windows start this far apart.
    pub window_size: usize,
    /// Lookahead read after each window.
    pub overlap: usize,
    pub resume: ResumePolicy,
    pub verbose: bool,
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            magic: LFLE_MAGIC,
            min_record: MIN_RECORD,
            max_record: MAX_RECORD,
            window_size: WINDOW_SIZE,
            overlap: WINDOW_SIZE,
            resume: ResumePolicy::SkipSpan,
            verbose: false,
            show_progress: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size and keeps the overlap equal to it.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self.overlap = size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_record_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_record = min;
        self.max_record = max;
        self
    }

    pub fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_resume_policy(mut self, resume: ResumePolicy) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Total bytes pulled from the input per window.
    #[inline]
    pub fn read_size(&self) -> usize {
        self.window_size + self.overlap
    }

    /// Checks the sizing invariants the windowed scan depends on.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(CarveError::InvalidConfig(
                "window size must be non-zero".to_string(),
            ));
        }
        // the shortest acceptable record must hold the length field and the magic
        if (self.min_record as usize) < LENGTH_FIELD_SIZE + self.magic.len() - 1 {
            return Err(CarveError::InvalidConfig(format!(
                "minimum record length {:#x} cannot hold a length field and magic",
                self.min_record
            )));
        }
        if self.max_record <= self.min_record {
            return Err(CarveError::InvalidConfig(format!(
                "maximum record length {:#x} must exceed minimum {:#x}",
                self.max_record, self.min_record
            )));
        }
        if self.overlap < self.max_record as usize {
            return Err(CarveError::InvalidConfig(format!(
                "overlap {:#x} is smaller than the maximum record length {:#x}",
                self.overlap, self.max_record
            )));
        }
        if self.max_record as usize > self.window_size {
            return Err(CarveError::InvalidConfig(format!(
                "maximum record length {:#x} exceeds the window size {:#x}",
                self.max_record, self.window_size
            )));
        }
        Ok(())
    }
}
