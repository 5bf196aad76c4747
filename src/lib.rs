//! # zipwalk
//!
//! A passive analyzer for the ZIP container format.
//!
//! The walker reads an archive front to back and reconstructs its local
//! entries, data descriptors, central directory and end record without
//! decompressing or decrypting anything. Bytes appended after the end
//! record are reported as overlay data.
//!
//! ## Features
//!
//! - Forward, offset-driven walk with strict phase ordering
//! - Bounds-checked reads; truncation is reported with its byte offset
//! - Signature-driven data descriptor detection
//! - Encryption flag and compression method reporting
//! - Overlay detection for self-extracting and polyglot files
//!
//! ## Example
//!
//! ```no_run
//! use zipwalk::zip::{TracingSink, ZipWalker};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("archive.zip")?;
//!
//!     match ZipWalker::new(&data).walk(TracingSink) {
//!         Ok(model) => {
//!             for entry in &model.entries {
//!                 println!("{}", entry.header.file_name.escape_ascii());
//!             }
//!             println!("overlay: {:?}", model.overlay_length);
//!         }
//!         Err(failure) => eprintln!("{failure}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod logging;
pub mod report;
pub mod zip;

pub use cli::Cli;
pub use io::{LocalFileReader, ReadAt};
pub use zip::{ArchiveModel, WalkError, ZipWalker, ZippedFileEntry};
