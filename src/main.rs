//! Main entry point for the zipwalk CLI application.
//!
//! Loads each archive named on the command line, walks it, and prints a
//! structural report.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::error_span;

use zipwalk::zip::{TracingSink, WalkError, ZipWalker};
use zipwalk::{Cli, io, logging, report};

/// Result of walking one archive.
struct Outcome {
    report: String,
    error: Option<WalkError>,
}

/// Application entry point.
///
/// Archives are loaded and walked concurrently; reports are printed in the
/// order the archives were given. Exits with status 1 if any archive could
/// not be loaded or walked to its end.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.debug_log().as_deref())?;

    let tasks: Vec<_> = cli
        .files
        .iter()
        .map(|location| tokio::spawn(analyze(location.clone(), cli.verbose)))
        .collect();

    let mut failures = 0usize;
    for (location, task) in cli.files.iter().zip(tasks) {
        match task.await? {
            Ok(outcome) => {
                if !cli.is_quiet() {
                    print!("{}", outcome.report);
                }
                if let Some(err) = outcome.error {
                    failures += 1;
                    if !cli.is_very_quiet() {
                        eprintln!("{}: {err}", location.display());
                    }
                }
            }
            Err(e) => {
                failures += 1;
                if !cli.is_very_quiet() {
                    eprintln!("{}: {e:#}", location.display());
                }
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Load one archive into memory and walk it on the blocking pool.
async fn analyze(location: PathBuf, verbose: bool) -> Result<Outcome> {
    let reader = io::open(&location)?;
    let data = io::read_all(&reader).await?;
    let outcome = tokio::task::spawn_blocking(move || walk_buffer(&location, &data, verbose)).await?;
    Ok(outcome)
}

/// Walk an in-memory archive, logging diagnostics under the archive's name.
fn walk_buffer(location: &Path, data: &[u8], verbose: bool) -> Outcome {
    let display = location.display().to_string();
    let name = location
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| display.clone());
    let span = error_span!("archive", name = %name);
    let _enter = span.enter();

    match ZipWalker::new(data).walk(TracingSink) {
        Ok(model) => Outcome {
            report: report::render(&display, &model, verbose),
            error: None,
        },
        Err(failure) => Outcome {
            report: report::render_failure(&display, &failure, verbose),
            error: Some(failure.error),
        },
    }
}
