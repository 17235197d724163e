//! Progress reporting for the scan.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Snapshot handed to progress callbacks after every window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanProgress {
    pub total_bytes: u64,
    pub scanned_bytes: u64,
    pub records_written: usize,
    pub windows: u64,
}

impl ScanProgress {
    /// Returns the progress percentage (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.scanned_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Progress bar over the bytes of the input image.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn for_scan(total_bytes: u64) -> Self {
        let bar = ProgressBar::new(total_bytes);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {percent}% {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);

        Self { bar }
    }

    /// A reporter that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn update(&self, progress: &ScanProgress) {
        self.bar.set_position(progress.scanned_bytes);
        self.bar
            .set_message(format!("{} records", progress.records_written));
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
