//! The scan loop: windows in, validated records out.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::analysis::MagicLocator;
use crate::config::{ResumePolicy, ScanConfig};
use crate::error::Result;
use crate::extraction::{Extraction, ReadPath, RecordExtractor};
use crate::io::{Window, WindowedReader};
use crate::progress::ScanProgress;
use crate::statistics::ScanStats;
use crate::traits::BlockSource;
use crate::types::{Offset, Record};
use crate::validation::RecordValidator;

pub type ProgressCallback<'a> = &'a dyn Fn(&ScanProgress);

/// What a finished (or cancelled) scan hands back.
#[derive(Debug)]
pub struct CarveOutcome<W> {
    pub stats: ScanStats,
    pub sink: W,
    /// Hex SHA-256 of every byte written to the sink.
    pub output_sha256: String,
    pub cancelled: bool,
}

/// Single-threaded record carver.
///
/// The search cursor is kept in absolute coordinates and carried from one
/// window to the next, so each magic occurrence is classified at most once
/// and hits inside an already classified span are never looked at again.
pub struct Carver {
    config: ScanConfig,
    locator: MagicLocator,
    validator: RecordValidator,
    running: Option<Arc<AtomicBool>>,
}

impl Carver {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            locator: MagicLocator::new(&config.magic),
            validator: RecordValidator::new(&config),
            config,
            running: None,
        })
    }

    /// Stops the scan between windows once `running` is cleared.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn cancelled(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.load(Ordering::SeqCst))
    }

    pub fn carve<S, W>(
        &self,
        source: &mut S,
        sink: W,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<CarveOutcome<W>>
    where
        S: BlockSource + ?Sized,
        W: Write,
    {
        let total = source.size();
        let mut windows = WindowedReader::new(&self.config, total);
        let mut extractor = RecordExtractor::new(sink);
        let mut stats = ScanStats::new();
        let mut cursor: Offset = 0;
        let mut cancelled = false;

        info!(
            input_size = total,
            window_size = self.config.window_size,
            "starting scan"
        );

        loop {
            if self.cancelled() {
                warn!(
                    offset = windows.position(),
                    "scan cancelled, flushing output"
                );
                cancelled = true;
                break;
            }

            let Some(window) = windows.next_window(&mut *source)? else {
                break;
            };
            stats.windows += 1;
            self.scan_window(&window, &mut *source, &mut extractor, &mut stats, &mut cursor)?;

            if let Some(callback) = progress.filter(|_| self.config.show_progress) {
                callback(&ScanProgress {
                    total_bytes: total,
                    scanned_bytes: windows.position(),
                    records_written: stats.records_written(),
                    windows: stats.windows,
                });
            }
        }

        let (sink, output_sha256) = extractor.finish()?;

        info!(
            records = stats.records_written(),
            skipped = stats.total_skipped(),
            rereads = stats.rereads,
            "scan complete"
        );

        Ok(CarveOutcome {
            stats,
            sink,
            output_sha256,
            cancelled,
        })
    }

    fn scan_window<S, W>(
        &self,
        window: &Window<'_>,
        source: &mut S,
        extractor: &mut RecordExtractor<W>,
        stats: &mut ScanStats,
        cursor: &mut Offset,
    ) -> Result<()>
    where
        S: BlockSource + ?Sized,
        W: Write,
    {
        let verbose = self.config.verbose;
        let range = window.scan_range();
        let mut from = usize::try_from(cursor.saturating_sub(window.offset()))
            .unwrap_or(usize::MAX)
            .max(range.start);

        if verbose {
            debug!(
                "new window #{} @ {:#x}, searching {:#x}..{:#x}",
                window.sequence(),
                window.offset(),
                window.offset() + from as u64,
                window.offset() + range.end as u64
            );
        }

        let mut first = true;
        while let Some(candidate) = self.locator.next_in(window, from) {
            if verbose && !first && candidate.index != from {
                debug!(
                    "slack space @ {:#x} with length {:#x}",
                    window.offset() + from as u64,
                    candidate.index - from
                );
            }
            first = false;

            // scan ranges start past the length field, so this always resolves
            let length =
                RecordValidator::declared_length(window.data(), candidate.index).unwrap_or(0);
            let resume = match self.validator.check_length(length) {
                Err(reason) => {
                    if verbose {
                        debug!(
                            "skipping {:#x}: length {:#x} is {}",
                            candidate.record_start(),
                            length,
                            reason
                        );
                    }
                    stats.record_skip(reason);
                    candidate.index + 1
                }
                Ok(()) => {
                    let record = Record::new(candidate.record_start(), length);
                    let extraction =
                        extractor.extract(window, &candidate, length, &mut *source, &self.validator)?;
                    match extraction {
                        Extraction::Written { path } => {
                            if path == ReadPath::Reread {
                                stats.rereads += 1;
                            }
                            if verbose {
                                debug!(
                                    "wrote record @ {:#x} with length {:#x} ({:?})",
                                    record.offset, length, path
                                );
                            }
                            stats.record_accept(record);
                            candidate.index + length as usize
                        }
                        Extraction::Rejected { reason, path } => {
                            if path == ReadPath::Reread {
                                stats.rereads += 1;
                            }
                            if verbose {
                                debug!(
                                    "rejected record @ {:#x} with length {:#x}: {}",
                                    record.offset, length, reason
                                );
                            }
                            stats.record_skip(reason);
                            match self.config.resume {
                                ResumePolicy::SkipSpan => candidate.index + length as usize,
                                ResumePolicy::NextByte => candidate.index + 1,
                            }
                        }
                    }
                }
            };

            from = resume;
            *cursor = window.offset() + resume as u64;
        }

        Ok(())
    }
}
