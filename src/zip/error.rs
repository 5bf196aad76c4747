//! Error kinds raised while walking an archive.
//!
//! Only conditions that abandon the walk are errors. A local entry phase
//! that ends on an unexpected signature is not one of them: it is recorded
//! as [`Anomaly::UnexpectedTerminator`](super::events::Anomaly) and the walk
//! goes on to look for the end record.

use std::fmt;

use super::cursor::Signature;
use super::walker::ArchiveModel;

/// Structural problems detected in the archive bytes.
///
/// Every variant carries the byte offset at which it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    /// The first local header signature check failed.
    NotAnArchive { found: Vec<u8> },
    /// A required record did not start with its magic bytes.
    SignatureMismatch {
        offset: usize,
        expected: Signature,
        found: Signature,
    },
    /// A read would have extended past the end of the buffer.
    Truncated {
        offset: usize,
        requested: usize,
        available: usize,
    },
}

impl WalkError {
    pub fn offset(&self) -> usize {
        match self {
            WalkError::NotAnArchive { .. } => 0,
            WalkError::SignatureMismatch { offset, .. }
            | WalkError::Truncated { offset, .. } => *offset,
        }
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::NotAnArchive { found } => {
                write!(f, "Not a ZIP archive (found {:?} at 0x0)", hex(found))
            }
            WalkError::SignatureMismatch {
                offset,
                expected,
                found,
            } => write!(
                f,
                "Signature mismatch at {:#x}: expected {}, found {}",
                offset,
                hex(expected),
                hex(found)
            ),
            WalkError::Truncated {
                offset,
                requested,
                available,
            } => write!(
                f,
                "Truncated read at {:#x}: requested {} bytes, {} available",
                offset, requested, available
            ),
        }
    }
}

impl std::error::Error for WalkError {}

/// A walk that was abandoned, together with everything parsed before the
/// failure.
#[derive(Debug)]
pub struct WalkFailure<'a> {
    pub error: WalkError,
    pub partial: ArchiveModel<'a>,
}

impl fmt::Display for WalkFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} entries, {} central directory headers parsed)",
            self.error,
            self.partial.entries.len(),
            self.partial.central_directory.len()
        )
    }
}

impl std::error::Error for WalkFailure<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
