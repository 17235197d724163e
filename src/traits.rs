//! The port between the carving engine and whatever holds the raw bytes.

use crate::error::{CarveError, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A random-access, read-only source of raw bytes, typically a disk image.
///
/// Reads are positional: every call names its absolute offset, so the
/// windowed scan and boundary re-reads can share one source without
/// coordinating a cursor.
pub trait BlockSource {
    /// Reads up to `buffer.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read, which is less than `buffer.len()`
    /// only when the end of the source is reached.
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize>;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// Fills as much of `buffer` as the source holds from `offset` on.
    ///
    /// Keeps reading across short reads and stops only at end of input.
    fn read_full(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            let n = self.read_chunk(offset + filled as u64, &mut buffer[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

impl<T: AsRef<[u8]>> BlockSource for Cursor<T> {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.seek(SeekFrom::Start(offset))
            .map_err(|source| CarveError::Read { offset, source })?;
        self.read(buffer)
            .map_err(|source| CarveError::Read { offset, source })
    }

    fn size(&self) -> u64 {
        self.get_ref().as_ref().len() as u64
    }
}
