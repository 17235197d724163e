//! Structural checks on candidate records.
//!
//! The same [`RecordValidator::validate_span`] runs whether the span came
//! from the loaded window or from a boundary re-read.

use crate::analysis::MagicLocator;
use crate::config::ScanConfig;
use crate::types::{LENGTH_FIELD_SIZE, SkipReason};

#[derive(Debug, Clone)]
pub struct RecordValidator {
    locator: MagicLocator,
    min_record: u32,
    max_record: u32,
}

impl RecordValidator {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            locator: MagicLocator::new(&config.magic),
            min_record: config.min_record,
            max_record: config.max_record,
        }
    }

    /// Reads the little-endian length field that ends at `index`.
    ///
    /// `None` when fewer than four bytes precede `index` or `index` is
    /// past the end of `data`.
    #[inline]
    pub fn declared_length(data: &[u8], index: usize) -> Option<u32> {
        let start = index.checked_sub(LENGTH_FIELD_SIZE)?;
        let field: [u8; LENGTH_FIELD_SIZE] = data.get(start..index)?.try_into().ok()?;
        Some(u32::from_le_bytes(field))
    }

    /// Applies the length bounds. Both are cheap rejections of chance hits:
    /// near-zero lengths from unrelated data, outsized ones from garbage.
    pub fn check_length(&self, length: u32) -> Result<(), SkipReason> {
        if length <= self.min_record {
            return Err(SkipReason::TooSmall);
        }
        if length > self.max_record {
            return Err(SkipReason::TooLarge);
        }
        Ok(())
    }

    /// Checks a materialized span against its declared length.
    ///
    /// A span holding more than one magic has ambiguous boundaries and is
    /// rejected as [`SkipReason::InvalidContents`]. A span cut short by the
    /// end of input, or whose leading and trailing length fields differ, is
    /// [`SkipReason::InvalidStructure`].
    pub fn validate_span(&self, span: &[u8], length: u32) -> Result<(), SkipReason> {
        if self.locator.count_in(span, 2) > 1 {
            return Err(SkipReason::InvalidContents);
        }
        if span.len() != length as usize || span.len() < LENGTH_FIELD_SIZE {
            return Err(SkipReason::InvalidStructure);
        }
        let head = &span[..LENGTH_FIELD_SIZE];
        let tail = &span[span.len() - LENGTH_FIELD_SIZE..];
        if head != tail {
            return Err(SkipReason::InvalidStructure);
        }
        Ok(())
    }
}
