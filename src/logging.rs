//! Logging and tracing configuration.
//!
//! Walk diagnostics reach the log through [`TracingSink`](crate::zip::TracingSink).
//! By default only anomalies and errors are shown. Debug mode shows every
//! parsed record and mirrors the output to a log file.
//!
//! `RUST_LOG` overrides the default filter:
//! ```bash
//! RUST_LOG=zipwalk=debug zipwalk archive.zip
//! ```

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Debug log written when `--debug` is given without `--log-file`.
pub const DEFAULT_DEBUG_LOG: &str = "zipwalk_debug.txt";

fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("zipwalk=debug")
    } else {
        EnvFilter::new("zipwalk=warn")
    }
}

/// Initialize the logging/tracing system
///
/// Call this once at application startup. Later calls leave the first
/// subscriber in place.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    let file_layer = match log_file {
        Some(path) if debug => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        _ => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(file_layer)
        .try_init();

    if debug {
        debug!("[******** Debug Mode ********]");
    }

    Ok(())
}
