//! ZIP structure walking.
//!
//! This module reconstructs the logical layout of a ZIP archive from its raw
//! bytes without decompressing or verifying anything.
//!
//! ## Architecture
//!
//! - [`cursor`]: Bounds-checked little-endian reads over the buffer
//! - [`structures`]: Record types (local header, data descriptor, central
//!   directory header, end record) and their parsers
//! - [`walker`]: The forward-scanning state machine producing an [`ArchiveModel`]
//! - [`events`]: Diagnostic events and the sinks that receive them
//! - [`error`]: Error kinds, each carrying the offending byte offset
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file, optionally
//!    followed by a data descriptor
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Anything after the EOCD record is overlay data, common in
//! self-extracting executables.
//!
//! ## Limitations
//!
//! - No decompression and no CRC verification
//! - Disk number fields are reported as opaque values
//! - No ZIP64 extended fields

pub mod cursor;
pub mod error;
pub mod events;
pub mod structures;
pub mod walker;

pub use cursor::{ByteCursor, Signature};
pub use error::{WalkError, WalkFailure};
pub use events::{Anomaly, DiagnosticSink, NullSink, TracingSink, WalkEvent};
pub use structures::*;
pub use walker::{ArchiveModel, WalkState, ZipWalker};
