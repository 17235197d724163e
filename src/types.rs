use serde::Serialize;
use std::fmt;
use std::ops::Range;

pub type Offset = u64;

const KB: usize = 1024;

/// Signature found right after the leading length field of every record.
pub const LFLE_MAGIC: [u8; 4] = *b"LfLe";
/// Records of this length or less are header-sized artifacts.
pub const MIN_RECORD: u32 = 0x30;
pub const MAX_RECORD: u32 = 4 * KB as u32 * 16;
pub const WINDOW_SIZE: usize = 4 * KB * 1000;
/// Width of the little-endian length field that precedes the magic.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Why a candidate was not written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooLarge,
    TooSmall,
    /// Leading and trailing length fields disagree, or the span is cut short.
    InvalidStructure,
    /// More than one magic inside the span.
    InvalidContents,
}

impl SkipReason {
    pub const ALL: [SkipReason; 4] = [
        SkipReason::TooLarge,
        SkipReason::TooSmall,
        SkipReason::InvalidStructure,
        SkipReason::InvalidContents,
    ];

    /// True when the rejection came from inspecting the record body rather
    /// than the length field alone.
    #[inline]
    pub fn is_span_level(self) -> bool {
        matches!(
            self,
            SkipReason::InvalidStructure | SkipReason::InvalidContents
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::TooLarge => "too large",
            SkipReason::TooSmall => "too small",
            SkipReason::InvalidStructure => "invalid structure",
            SkipReason::InvalidContents => "invalid contents",
        };
        f.write_str(s)
    }
}

/// A located magic marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute offset of the magic in the input.
    pub offset: Offset,
    /// Position of the magic inside the window that found it.
    pub index: usize,
}

impl Candidate {
    /// Absolute offset of the length field, i.e. where the record starts.
    #[inline]
    pub fn record_start(&self) -> Offset {
        self.offset - LENGTH_FIELD_SIZE as u64
    }
}

/// A record span `[offset, offset + length)` in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub offset: Offset,
    pub length: u32,
}

impl Record {
    pub fn new(offset: Offset, length: u32) -> Self {
        Self { offset, length }
    }

    #[inline]
    pub fn end(&self) -> Offset {
        self.offset + self.length as u64
    }

    #[inline]
    pub fn span(&self) -> Range<Offset> {
        self.offset..self.end()
    }
}
