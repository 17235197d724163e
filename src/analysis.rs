use memchr::memmem::Finder;

use crate::io::Window;
use crate::types::Candidate;

/// Finds magic markers inside a window's scan range.
#[derive(Debug, Clone)]
pub struct MagicLocator {
    finder: Finder<'static>,
}

impl MagicLocator {
    pub fn new(magic: &[u8]) -> Self {
        Self {
            finder: Finder::new(magic).into_owned(),
        }
    }

    #[inline]
    pub fn magic(&self) -> &[u8] {
        self.finder.needle()
    }

    /// First magic starting at or after window index `from` and before the
    /// end of the window's scan range. The match itself may run into the
    /// lookahead.
    pub fn next_in(&self, window: &Window<'_>, from: usize) -> Option<Candidate> {
        let range = window.scan_range();
        let from = from.max(range.start);
        if from >= range.end {
            return None;
        }

        let data = window.data();
        let hay_end = (range.end + self.magic().len() - 1).min(data.len());
        let pos = self.finder.find(&data[from..hay_end])?;
        let index = from + pos;

        Some(Candidate {
            offset: window.offset() + index as u64,
            index,
        })
    }

    /// Every magic start in the window's scan range, overlapping hits
    /// included.
    pub fn positions(&self, window: &Window<'_>) -> Vec<usize> {
        let mut out = Vec::new();
        let mut from = 0;
        while let Some(c) = self.next_in(window, from) {
            out.push(c.index);
            from = c.index + 1;
        }
        out
    }

    /// Number of magic occurrences in `data`, overlapping hits included,
    /// stopping once `limit` is hit.
    pub fn count_in(&self, data: &[u8], limit: usize) -> usize {
        let mut count = 0;
        let mut from = 0;
        while count < limit {
            let Some(pos) = self.finder.find(&data[from..]) else {
                break;
            };
            count += 1;
            from += pos + 1;
        }
        count
    }
}
