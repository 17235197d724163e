use crate::error::Result;
use crate::io::Window;
use crate::traits::BlockSource;
use crate::types::{Candidate, LENGTH_FIELD_SIZE, SkipReason};
use crate::validation::RecordValidator;
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// Where a record's bytes were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPath {
    /// Sliced out of the loaded window.
    Window,
    /// Read again from the source because the span crosses the window edge.
    Reread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Written { path: ReadPath },
    Rejected { reason: SkipReason, path: ReadPath },
}

/// Passes writes through while hashing them.
pub struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Flushes and returns the inner writer with the hex SHA-256 of
    /// everything written.
    pub fn finish(mut self) -> io::Result<(W, String)> {
        self.inner.flush()?;
        let digest = hex::encode(self.hasher.finalize());
        Ok((self.inner, digest))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Copies validated record spans to the output sink.
///
/// The sink only ever receives whole spans.
pub struct RecordExtractor<W: Write> {
    sink: HashingWriter<W>,
    scratch: Vec<u8>,
}

impl<W: Write> RecordExtractor<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: HashingWriter::new(sink),
            scratch: Vec::new(),
        }
    }

    /// Materializes the record announced by `candidate`, validates it and
    /// writes it out.
    ///
    /// Spans that fit the window's primary region are sliced from memory;
    /// all others are read again from `source` at their absolute offset.
    /// Only I/O failures are errors.
    pub fn extract<S: BlockSource + ?Sized>(
        &mut self,
        window: &Window<'_>,
        candidate: &Candidate,
        length: u32,
        source: &mut S,
        validator: &RecordValidator,
    ) -> Result<Extraction> {
        let start = candidate.index - LENGTH_FIELD_SIZE;
        let len = length as usize;

        let (span, path) = if window.holds(start, len) {
            (&window.data()[start..start + len], ReadPath::Window)
        } else {
            self.scratch.resize(len, 0);
            let n = source.read_full(candidate.record_start(), &mut self.scratch)?;
            (&self.scratch[..n], ReadPath::Reread)
        };

        if let Err(reason) = validator.validate_span(span, length) {
            return Ok(Extraction::Rejected { reason, path });
        }

        self.sink.write_all(span)?;

        Ok(Extraction::Written { path })
    }

    /// Flushes the sink and returns it with the output digest.
    pub fn finish(self) -> Result<(W, String)> {
        Ok(self.sink.finish()?)
    }
}
