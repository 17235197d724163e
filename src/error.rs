use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that terminate a carving run.
///
/// Rejected candidates are not errors; they are counted as
/// [`SkipReason`](crate::types::SkipReason)s and the scan goes on.
#[derive(Error, Debug)]
pub enum CarveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot open input image {path:?}: {source}")]
    OpenInput { path: PathBuf, source: io::Error },

    #[error("Cannot create output file {path:?}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },

    #[error("Read error at offset {offset:#x}: {source}")]
    Read { offset: u64, source: io::Error },

    #[error("Cannot serialize scan report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CarveError>;
