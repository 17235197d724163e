use crate::config::ScanConfig;
use crate::error::{CarveError, Result};
use crate::traits::BlockSource;
use crate::types::{LENGTH_FIELD_SIZE, Offset};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

/// Read-only access to a raw image file.
pub struct DiskReader {
    file: File,
    size: u64,
}

impl DiskReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| CarveError::OpenInput {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path)
            .map_err(open_err)?;

        let size = file.seek(SeekFrom::End(0)).map_err(open_err)?;
        file.seek(SeekFrom::Start(0)).map_err(open_err)?;

        Ok(Self { file, size })
    }
}

impl BlockSource for DiskReader {
    fn read_chunk(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| CarveError::Read { offset, source })?;
        self.file
            .read(buffer)
            .map_err(|source| CarveError::Read { offset, source })
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// One buffered region of the input: `window_size` bytes of new territory
/// followed by up to `overlap` bytes of lookahead.
#[derive(Debug)]
pub struct Window<'a> {
    data: &'a [u8],
    offset: Offset,
    sequence: u64,
    window_size: usize,
}

impl<'a> Window<'a> {
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Absolute offset of `data()[0]`.
    #[inline]
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// 1-based position of this window in the scan.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Window-relative positions at which a candidate magic may start.
    ///
    /// The first bytes hold the length field of a record whose magic sits
    /// right after them; everything past the end of the range belongs to
    /// the next window and is only lookahead here. Consecutive windows'
    /// ranges tile the input without gaps.
    pub fn scan_range(&self) -> Range<usize> {
        let end = (self.window_size + LENGTH_FIELD_SIZE).min(self.data.len());
        LENGTH_FIELD_SIZE.min(end)..end
    }

    /// True when `[start, start + length)` can be served from this buffer.
    ///
    /// Anything reaching past the primary region is re-read from the
    /// source instead, so correctness never depends on the lookahead size.
    #[inline]
    pub fn holds(&self, start: usize, length: usize) -> bool {
        start + length < self.window_size && start + length <= self.data.len()
    }
}

/// Pulls overlapping windows from a [`BlockSource`], one at a time.
///
/// The reader does not own the source: each call borrows it just for the
/// read, leaving it free for boundary re-reads while a window is in use.
pub struct WindowedReader {
    buffer: Vec<u8>,
    window_size: usize,
    next_offset: Offset,
    sequence: u64,
    total_size: u64,
    done: bool,
}

impl WindowedReader {
    pub fn new(config: &ScanConfig, total_size: u64) -> Self {
        Self {
            buffer: vec![0u8; config.read_size()],
            window_size: config.window_size,
            next_offset: 0,
            sequence: 0,
            total_size,
            done: false,
        }
    }

    /// Bytes of new territory consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.next_offset.min(self.total_size)
    }

    #[inline]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn next_window<S: BlockSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<Window<'_>>> {
        if self.done {
            return Ok(None);
        }

        let offset = self.next_offset;
        let n = source.read_full(offset, &mut self.buffer)?;
        if n == 0 {
            self.done = true;
            return Ok(None);
        }

        self.sequence += 1;
        self.next_offset += self.window_size as u64;

        Ok(Some(Window {
            data: &self.buffer[..n],
            offset,
            sequence: self.sequence,
            window_size: self.window_size,
        }))
    }
}
