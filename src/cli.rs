use clap::Parser;
use std::path::PathBuf;

use crate::logging::DEFAULT_DEBUG_LOG;

#[derive(Parser, Debug)]
#[command(name = "zipwalk")]
#[command(version)]
#[command(about = "Walk the structure of ZIP archives without extracting them", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipwalk test.zip                   summary of records, anomalies and overlay\n  \
  zipwalk -v setup.exe               list every entry and central directory header\n  \
  zipwalk -d a.zip b.zip             debug trace of every field into zipwalk_debug.txt")]
pub struct Cli {
    /// ZIP files to walk
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Log every parsed field and write a debug log file
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Debug log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// List every entry and central directory header
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Log file to mirror diagnostics into, only in debug mode.
    pub fn debug_log(&self) -> Option<PathBuf> {
        if !self.debug {
            return None;
        }
        Some(
            self.log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEBUG_LOG)),
        )
    }
}
