//! Diagnostic events emitted while walking an archive.
//!
//! The walker never logs on its own. Every parsed record and every anomaly
//! is handed to a [`DiagnosticSink`] supplied by the caller, which decides
//! how (and whether) to present it. [`TracingSink`] forwards events to the
//! `tracing` ecosystem, `Vec<WalkEvent>` collects them.

use std::fmt;

use tracing::{debug, error, warn};

use super::error::{WalkError, hex};
use super::structures::{
    CentralDirectoryHeader, DataDescriptor, EndOfCentralDirectory, LocalFileHeader,
};

/// Structural oddities that do not stop the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Local entries were followed by neither another local header nor the
    /// central directory. The walk continues with the end record.
    UnexpectedTerminator { offset: usize, found: Vec<u8> },
    /// No end of central directory record where one was expected.
    MissingEndRecord { offset: usize, found: Vec<u8> },
    /// Bytes left over after the archive's logical end.
    Overlay { offset: usize, length: usize },
}

impl Anomaly {
    pub fn offset(&self) -> usize {
        match self {
            Anomaly::UnexpectedTerminator { offset, .. }
            | Anomaly::MissingEndRecord { offset, .. }
            | Anomaly::Overlay { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnexpectedTerminator { offset, found } => write!(
                f,
                "Unexpected terminator {:?} after local entries at {:#x}",
                hex(found),
                offset
            ),
            Anomaly::MissingEndRecord { offset, found } => write!(
                f,
                "No end of central directory record at {:#x} (found {:?})",
                offset,
                hex(found)
            ),
            Anomaly::Overlay { offset, length } => {
                write!(f, "Overlay data: {:#x} bytes at {:#x}", length, offset)
            }
        }
    }
}

/// One observation made by the walker, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    LocalHeader {
        index: usize,
        offset: usize,
        header: LocalFileHeader,
    },
    Payload {
        offset: usize,
        length: usize,
    },
    DataDescriptor {
        offset: usize,
        descriptor: DataDescriptor,
    },
    CentralDirectoryHeader {
        index: usize,
        offset: usize,
        header: CentralDirectoryHeader,
    },
    EndOfCentralDirectory {
        offset: usize,
        record: EndOfCentralDirectory,
    },
    /// Signature seen at a phase boundary.
    NextSignature {
        offset: usize,
        found: Vec<u8>,
    },
    Anomaly(Anomaly),
    /// The buffer was consumed exactly.
    ArchiveEnd {
        offset: usize,
    },
    /// Fatal error that abandoned the walk.
    Error(WalkError),
}

/// Receiver for [`WalkEvent`]s.
pub trait DiagnosticSink {
    fn event(&mut self, event: WalkEvent);
}

impl DiagnosticSink for Vec<WalkEvent> {
    fn event(&mut self, event: WalkEvent) {
        self.push(event);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn event(&mut self, event: WalkEvent) {
        (**self).event(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn event(&mut self, _event: WalkEvent) {}
}

/// Forwards events to `tracing`.
///
/// Records are logged at debug level, anomalies at warn and fatal errors at
/// error level. Filenames are printed as escaped bytes since their encoding
/// depends on flag bit 11.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn event(&mut self, event: WalkEvent) {
        match event {
            WalkEvent::LocalHeader {
                index,
                offset,
                header,
            } => {
                debug!("######## File {:#x} ########", index + 1);
                debug!(
                    offset,
                    version = header.version_needed,
                    flag = header.flag,
                    method = header.compression_method.as_u16(),
                    time = header.last_mod_time,
                    date = header.last_mod_date,
                    crc32 = header.crc32,
                    compressed_size = header.compressed_size,
                    uncompressed_size = header.uncompressed_size,
                    filename = %header.file_name.escape_ascii(),
                    extra = %hex(&header.extra_field),
                    "LocalHeader"
                );
                debug!(
                    "Compression Method: {}",
                    header.compression_method.name()
                );
                if let Some(option) = header.compression_option {
                    debug!("Compression Option: {}", option.name());
                }
                if header.encrypted {
                    debug!("Flag: File Encrypted");
                }
            }
            WalkEvent::Payload { offset, length } => {
                debug!(offset, "FileDataSize: {length:#x}");
            }
            WalkEvent::DataDescriptor { offset, descriptor } => {
                debug!(
                    offset,
                    crc32 = descriptor.crc32,
                    compressed_size = descriptor.compressed_size,
                    uncompressed_size = descriptor.uncompressed_size,
                    "DataDescriptor"
                );
            }
            WalkEvent::CentralDirectoryHeader {
                index,
                offset,
                header,
            } => {
                debug!("######## Central Directory {:#x} ########", index + 1);
                debug!(
                    offset,
                    version_made_by = header.version_made_by,
                    version_needed = header.version_needed,
                    flag = header.flag,
                    method = header.compression_method.as_u16(),
                    crc32 = header.crc32,
                    compressed_size = header.compressed_size,
                    uncompressed_size = header.uncompressed_size,
                    disk_number_start = header.disk_number_start,
                    internal_attrs = header.internal_attrs,
                    external_attrs = header.external_attrs,
                    local_header_offset = header.local_header_offset,
                    filename = %header.file_name.escape_ascii(),
                    extra = %hex(&header.extra_field),
                    comment = %header.comment.escape_ascii(),
                    "CentralDirectoryHeader"
                );
            }
            WalkEvent::EndOfCentralDirectory { offset, record } => {
                debug!("######## End of Central Directory ########");
                debug!(
                    offset,
                    disk_number = record.disk_number,
                    disk_with_cd = record.disk_with_cd,
                    disk_entries = record.disk_entries,
                    total_entries = record.total_entries,
                    cd_size = record.cd_size,
                    cd_offset = record.cd_offset,
                    comment = %record.comment.escape_ascii(),
                    "CentralDirectoryEnd"
                );
            }
            WalkEvent::NextSignature { offset, found } => {
                debug!(offset, "NextSignature: {}", hex(&found));
            }
            WalkEvent::Anomaly(anomaly) => warn!("{anomaly}"),
            WalkEvent::ArchiveEnd { offset } => debug!("File End: {offset:#x}"),
            WalkEvent::Error(err) => error!("{err}"),
        }
    }
}
