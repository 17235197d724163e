use serde::Serialize;

use crate::types::{Record, SkipReason};

/// Bookkeeping for one scan. Never consulted by the scan itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub too_large: u64,
    pub too_small: u64,
    pub invalid_structure: u64,
    pub invalid_contents: u64,
    pub accepted: Vec<Record>,
    pub windows: u64,
    pub candidates: u64,
    pub rereads: u64,
    pub bytes_written: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.candidates += 1;
        match reason {
            SkipReason::TooLarge => self.too_large += 1,
            SkipReason::TooSmall => self.too_small += 1,
            SkipReason::InvalidStructure => self.invalid_structure += 1,
            SkipReason::InvalidContents => self.invalid_contents += 1,
        }
    }

    pub fn record_accept(&mut self, record: Record) {
        self.candidates += 1;
        self.bytes_written += record.length as u64;
        self.accepted.push(record);
    }

    pub fn skipped(&self, reason: SkipReason) -> u64 {
        match reason {
            SkipReason::TooLarge => self.too_large,
            SkipReason::TooSmall => self.too_small,
            SkipReason::InvalidStructure => self.invalid_structure,
            SkipReason::InvalidContents => self.invalid_contents,
        }
    }

    #[inline]
    pub fn total_skipped(&self) -> u64 {
        SkipReason::ALL.iter().map(|r| self.skipped(*r)).sum()
    }

    #[inline]
    pub fn records_written(&self) -> usize {
        self.accepted.len()
    }

    /// Human-readable summary: the written count, then one line per
    /// nonzero skip counter.
    pub fn summary_lines(&self, min_record: u32, max_record: u32) -> Vec<String> {
        let mut lines = vec![format!("Wrote {} records", self.records_written())];
        for reason in SkipReason::ALL {
            let n = self.skipped(reason);
            if n == 0 {
                continue;
            }
            lines.push(match reason {
                SkipReason::TooLarge => format!(
                    "Skipped {} records with length greater than {:#x}",
                    n, max_record
                ),
                SkipReason::TooSmall => format!(
                    "Skipped {} records with length less than {:#x}",
                    n, min_record
                ),
                SkipReason::InvalidStructure => {
                    format!("Skipped {} records with invalid structure", n)
                }
                SkipReason::InvalidContents => {
                    format!("Skipped {} records with invalid content", n)
                }
            });
        }
        lines
    }
}
