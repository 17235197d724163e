pub mod analysis;
pub mod carving;
pub mod config;
pub mod error;
pub mod extraction;
pub mod io;
pub mod progress;
pub mod report;
pub mod statistics;
pub mod traits;
pub mod types;
pub mod validation;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

pub use carving::{CarveOutcome, Carver, ProgressCallback};
pub use config::{ResumePolicy, ScanConfig};
pub use error::{CarveError, Result};
pub use io::DiskReader;
pub use report::ScanReport;
pub use statistics::ScanStats;
pub use traits::BlockSource;
pub use types::{Record, SkipReason};

/// Carves every record from the image at `input` into a freshly created
/// `output` file.
///
/// The configuration is checked before either file is touched.
pub fn carve_file(
    input: &Path,
    output: &Path,
    config: ScanConfig,
    running: Option<Arc<AtomicBool>>,
    progress: Option<ProgressCallback<'_>>,
) -> Result<ScanReport> {
    let start = Instant::now();

    let mut carver = Carver::new(config)?;
    if let Some(running) = running {
        carver = carver.with_running_flag(running);
    }

    let mut reader = DiskReader::open(input)?;
    let input_size = reader.size();

    let file = File::create(output).map_err(|source| CarveError::CreateOutput {
        path: output.to_path_buf(),
        source,
    })?;

    let outcome = carver.carve(&mut reader, BufWriter::new(file), progress)?;
    let file = outcome.sink.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    Ok(ScanReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        input_size,
        config: carver.config().clone(),
        stats: outcome.stats,
        output_sha256: outcome.output_sha256,
        cancelled: outcome.cancelled,
        elapsed: start.elapsed(),
    })
}
