//! End-of-scan report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::{CarveError, Result};
use crate::statistics::ScanStats;

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_size: u64,
    pub config: ScanConfig,
    pub stats: ScanStats,
    pub output_sha256: String,
    pub cancelled: bool,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(d.as_millis() as u64)
}

impl ScanReport {
    pub fn summary_lines(&self) -> Vec<String> {
        self.stats
            .summary_lines(self.config.min_record, self.config.max_record)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CarveError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
