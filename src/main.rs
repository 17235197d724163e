use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use humansize::{BINARY, format_size};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

use lfle::progress::{ProgressReporter, ScanProgress};
use lfle::{BlockSource, DiskReader, ProgressCallback, ScanConfig, ScanReport, carve_file};

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    let config = cli.scan_config();
    let input_size = DiskReader::open(&cli.input_path)
        .with_context(|| format!("Failed to open image: {:?}", cli.input_path))?
        .size();

    if let Some(banner) = scan_banner(&config, &cli.input_path, input_size) {
        println!("{}", banner);
    }

    let reporter = if config.show_progress {
        ProgressReporter::for_scan(input_size)
    } else {
        ProgressReporter::hidden()
    };
    let progress_cb = |p: &ScanProgress| reporter.update(p);

    let report = carve_file(
        &cli.input_path,
        &cli.output_path,
        config,
        Some(running),
        Some(&progress_cb as ProgressCallback<'_>),
    )
    .with_context(|| {
        format!(
            "Failed to carve {:?} into {:?}",
            cli.input_path, cli.output_path
        )
    })?;

    reporter.finish(if report.cancelled {
        "cancelled"
    } else {
        "100% complete"
    });

    print_summary(&report);

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }

    Ok(())
}

/// The opening status line, suppressed along with the progress bar.
fn scan_banner(config: &ScanConfig, input: &Path, input_size: u64) -> Option<String> {
    config
        .show_progress
        .then(|| format!("Scanning {:?} ({})", input, format_size(input_size, BINARY)))
}

fn print_summary(report: &ScanReport) {
    println!();
    if report.cancelled {
        println!("[!] {}", style("Scan cancelled, output is partial").yellow());
    }
    for (i, line) in report.summary_lines().iter().enumerate() {
        if i == 0 {
            println!("{}", style(line).green().bold());
        } else {
            println!("{}", style(line).yellow());
        }
    }
    println!(
        "Output:  {:?} ({})",
        report.output,
        format_size(report.stats.bytes_written, BINARY)
    );
    println!("SHA-256: {}", report.output_sha256);
}
