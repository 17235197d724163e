use clap::Parser;
use std::path::PathBuf;

use lfle::{ResumePolicy, ScanConfig};

#[derive(Parser, Debug)]
#[command(name = "lfle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Recover event log entries from an image by heuristically looking for record structures",
    long_about = None
)]
pub struct Cli {
    /// Path to a raw (dd) image file
    pub input_path: PathBuf,

    /// Path of the file receiving the recovered event log records
    pub output_path: PathBuf,

    /// Print debugging messages during scanning
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable status messages (percent complete) during scanning
    #[arg(short = 's', long = "no-status")]
    pub no_status: bool,

    /// Resume right after a rejected record instead of skipping its declared span
    #[arg(long)]
    pub strict_resume: bool,

    /// Write a JSON report of the scan to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn scan_config(&self) -> ScanConfig {
        let resume = if self.strict_resume {
            ResumePolicy::NextByte
        } else {
            ResumePolicy::SkipSpan
        };

        ScanConfig::new()
            .with_verbose(self.verbose)
            .with_progress(!self.no_status)
            .with_resume_policy(resume)
    }
}
