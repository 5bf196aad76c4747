//! Forward-scanning archive walker.
//!
//! ## Walking Strategy
//!
//! Unlike an extractor, which locates the End of Central Directory at the
//! tail of the file and follows offsets from there, the walker starts at
//! byte zero and moves strictly forward:
//!
//! 1. Local file headers, each followed by its payload and an optional
//!    data descriptor
//! 2. Central Directory File Headers
//! 3. At most one End of Central Directory record
//!
//! The record type expected next is decided by the signature found at the
//! current offset. Whatever follows the end record is reported as overlay.
//! There is no resynchronization: a record that does not start where the
//! previous one ended is never searched for.

use super::cursor::ByteCursor;
use super::error::{WalkError, WalkFailure};
use super::events::{Anomaly, DiagnosticSink, WalkEvent};
use super::structures::*;

/// Phases of a walk. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    ScanningLocalEntries,
    ScanningCentralDirectory,
    ScanningEndRecord,
    Done,
}

/// Logical structure reconstructed from an archive buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveModel<'a> {
    /// Local entries in physical order
    pub entries: Vec<ZippedFileEntry<'a>>,
    pub central_directory: Vec<CentralDirectoryHeader>,
    pub end_record: Option<EndOfCentralDirectory>,
    /// Non-fatal oddities, in the order they were found
    pub anomalies: Vec<Anomaly>,
    /// Bytes left after the logical end. `None` when the walk was abandoned,
    /// or when it ended without seeing any central directory header or end
    /// record, since there is no archive end to measure from.
    pub overlay_length: Option<usize>,
}

impl<'a> ArchiveModel<'a> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.central_directory.is_empty() && self.end_record.is_none()
    }

    pub fn encrypted_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.header.encrypted).count()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay_length.is_some_and(|len| len > 0)
    }

    /// Local entry a central directory header points back to.
    pub fn entry_for(&self, header: &CentralDirectoryHeader) -> Option<&ZippedFileEntry<'a>> {
        let offset = header.local_header_offset as usize;
        self.entries.iter().find(|e| e.offset == offset)
    }
}

/// Sequential walker over one archive buffer.
///
/// ## Example
///
/// ```
/// use zipwalk::zip::{NullSink, WalkError, ZipWalker};
///
/// let failure = ZipWalker::new(b"not a zip").walk(NullSink).unwrap_err();
/// assert!(matches!(failure.error, WalkError::NotAnArchive { .. }));
/// assert!(failure.partial.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ZipWalker<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> ZipWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
        }
    }

    /// Walk the whole buffer, reporting every record to `sink`.
    ///
    /// # Errors
    ///
    /// Returns a [`WalkFailure`] holding the partial model when the first
    /// bytes are not a local header, a required record has the wrong
    /// signature, or a read runs past the end of the buffer.
    pub fn walk<S: DiagnosticSink>(&self, sink: S) -> Result<ArchiveModel<'a>, WalkFailure<'a>> {
        Walk {
            cursor: self.cursor,
            offset: 0,
            state: WalkState::ScanningLocalEntries,
            model: ArchiveModel::default(),
            sink,
        }
        .run()
    }
}

struct Walk<'a, S> {
    cursor: ByteCursor<'a>,
    offset: usize,
    state: WalkState,
    model: ArchiveModel<'a>,
    sink: S,
}

impl<'a, S: DiagnosticSink> Walk<'a, S> {
    fn run(mut self) -> Result<ArchiveModel<'a>, WalkFailure<'a>> {
        loop {
            let step = match self.state {
                WalkState::ScanningLocalEntries => self.scan_local_entry(),
                WalkState::ScanningCentralDirectory => self.scan_central_directory(),
                WalkState::ScanningEndRecord => self.scan_end_record(),
                WalkState::Done => break,
            };

            if let Err(error) = step {
                self.sink.event(WalkEvent::Error(error.clone()));
                return Err(WalkFailure {
                    error,
                    partial: self.model,
                });
            }
        }

        self.finish();
        Ok(self.model)
    }

    /// Up to four bytes at the current offset, reported as the signature
    /// that decides the next transition.
    fn next_signature(&mut self) -> &'a [u8] {
        let found = self.cursor.tail(self.offset);
        self.sink.event(WalkEvent::NextSignature {
            offset: self.offset,
            found: found.to_vec(),
        });
        found
    }

    fn scan_local_entry(&mut self) -> Result<(), WalkError> {
        let offset = self.offset;
        let index = self.model.entries.len();

        if index == 0 && self.cursor.tail(offset) != LFH_SIGNATURE {
            return Err(WalkError::NotAnArchive {
                found: self.cursor.tail(offset).to_vec(),
            });
        }

        let header = LocalFileHeader::parse(&self.cursor, offset)?;
        self.sink.event(WalkEvent::LocalHeader {
            index,
            offset,
            header: header.clone(),
        });
        self.offset += header.length();

        let payload = self
            .cursor
            .read_slice(self.offset, header.compressed_size as usize)?;
        self.sink.event(WalkEvent::Payload {
            offset: self.offset,
            length: payload.len(),
        });
        self.offset += payload.len();

        let mut next = self.next_signature();
        let descriptor = DataDescriptor::parse(&self.cursor, self.offset)?;
        if let Some(descriptor) = descriptor {
            self.sink.event(WalkEvent::DataDescriptor {
                offset: self.offset,
                descriptor,
            });
            self.offset += descriptor.length();
            next = self.next_signature();
        }

        self.model.entries.push(ZippedFileEntry {
            offset,
            header,
            payload,
            descriptor,
        });

        if next == LFH_SIGNATURE {
            return Ok(());
        }
        if next == CDFH_SIGNATURE {
            self.state = WalkState::ScanningCentralDirectory;
            return Ok(());
        }

        // The end record may still follow directly
        self.record(Anomaly::UnexpectedTerminator {
            offset: self.offset,
            found: next.to_vec(),
        });
        self.state = WalkState::ScanningEndRecord;
        Ok(())
    }

    fn scan_central_directory(&mut self) -> Result<(), WalkError> {
        let offset = self.offset;
        let header = CentralDirectoryHeader::parse(&self.cursor, offset)?;
        self.sink.event(WalkEvent::CentralDirectoryHeader {
            index: self.model.central_directory.len(),
            offset,
            header: header.clone(),
        });
        self.offset += header.length();
        self.model.central_directory.push(header);

        if self.next_signature() != CDFH_SIGNATURE {
            self.state = WalkState::ScanningEndRecord;
        }
        Ok(())
    }

    fn scan_end_record(&mut self) -> Result<(), WalkError> {
        let found = self.cursor.tail(self.offset);
        if found != EOCD_SIGNATURE {
            self.record(Anomaly::MissingEndRecord {
                offset: self.offset,
                found: found.to_vec(),
            });
            self.state = WalkState::Done;
            return Ok(());
        }

        let record = EndOfCentralDirectory::parse(&self.cursor, self.offset)?;
        self.sink.event(WalkEvent::EndOfCentralDirectory {
            offset: self.offset,
            record: record.clone(),
        });
        self.offset += record.length();
        self.model.end_record = Some(record);
        self.state = WalkState::Done;
        Ok(())
    }

    fn finish(&mut self) {
        if self.model.central_directory.is_empty() && self.model.end_record.is_none() {
            return;
        }

        let remaining = self.cursor.remaining(self.offset);
        self.model.overlay_length = Some(remaining);

        if remaining == 0 {
            self.sink.event(WalkEvent::ArchiveEnd {
                offset: self.offset,
            });
        } else {
            self.record(Anomaly::Overlay {
                offset: self.offset,
                length: remaining,
            });
        }
    }

    fn record(&mut self, anomaly: Anomaly) {
        self.sink.event(WalkEvent::Anomaly(anomaly.clone()));
        self.model.anomalies.push(anomaly);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::events::NullSink;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn stored_entry(name: &[u8], data: &[u8]) -> Vec<u8> {
        let mut buf = LFH_SIGNATURE.to_vec();
        push_u16(&mut buf, 10);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, data.len() as u32);
        push_u32(&mut buf, data.len() as u32);
        push_u16(&mut buf, name.len() as u16);
        push_u16(&mut buf, 0);
        buf.extend_from_slice(name);
        buf.extend_from_slice(data);
        buf
    }

    fn central_header(name: &[u8], local_offset: u32) -> Vec<u8> {
        let mut buf = CDFH_SIGNATURE.to_vec();
        for _ in 0..6 {
            push_u16(&mut buf, 0);
        }
        for _ in 0..3 {
            push_u32(&mut buf, 0);
        }
        push_u16(&mut buf, name.len() as u16);
        for _ in 0..4 {
            push_u16(&mut buf, 0);
        }
        push_u32(&mut buf, 0);
        push_u32(&mut buf, local_offset);
        buf.extend_from_slice(name);
        buf
    }

    fn end_record(entries: u16) -> Vec<u8> {
        let mut buf = EOCD_SIGNATURE.to_vec();
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, entries);
        push_u16(&mut buf, entries);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 0);
        push_u16(&mut buf, 0);
        buf
    }

    #[test]
    fn two_entries_in_order() {
        let first = stored_entry(b"one", b"1");
        let second = stored_entry(b"two", b"22");
        let mut buf = first.clone();
        buf.extend_from_slice(&second);
        buf.extend_from_slice(&central_header(b"one", 0));
        buf.extend_from_slice(&central_header(b"two", first.len() as u32));
        buf.extend_from_slice(&end_record(2));

        let model = ZipWalker::new(&buf).walk(NullSink).unwrap();
        assert_eq!(model.entries.len(), 2);
        assert_eq!(model.entries[1].offset, first.len());
        assert_eq!(model.entries[1].payload, b"22");
        assert_eq!(model.central_directory.len(), 2);
        assert_eq!(
            model.entry_for(&model.central_directory[1]).unwrap().header.file_name,
            b"two"
        );
        assert_eq!(model.overlay_length, Some(0));
        assert!(model.anomalies.is_empty());
    }

    #[test]
    fn unexpected_terminator_is_not_fatal() {
        let mut buf = stored_entry(b"a", b"x");
        let junk_at = buf.len();
        buf.extend_from_slice(b"JUNKJUNK");

        let mut events = Vec::new();
        let model = ZipWalker::new(&buf).walk(&mut events).unwrap();
        assert_eq!(model.entries.len(), 1);
        assert!(model.central_directory.is_empty());
        assert_eq!(
            model.anomalies,
            vec![
                Anomaly::UnexpectedTerminator {
                    offset: junk_at,
                    found: b"JUNK".to_vec()
                },
                Anomaly::MissingEndRecord {
                    offset: junk_at,
                    found: b"JUNK".to_vec()
                },
            ]
        );
        // No central directory structures, so no archive end to measure from
        assert_eq!(model.overlay_length, None);
        assert!(matches!(
            events.last(),
            Some(WalkEvent::Anomaly(Anomaly::MissingEndRecord { .. }))
        ));
    }

    #[test]
    fn end_record_right_after_local_entries() {
        let mut buf = stored_entry(b"a", b"x");
        let end_at = buf.len();
        buf.extend_from_slice(&end_record(0));

        let mut events = Vec::new();
        let model = ZipWalker::new(&buf).walk(&mut events).unwrap();
        assert_eq!(
            model.anomalies,
            vec![Anomaly::UnexpectedTerminator {
                offset: end_at,
                found: EOCD_SIGNATURE.to_vec()
            }]
        );
        assert_eq!(model.end_record.as_ref().unwrap().total_entries, 0);
        assert_eq!(model.overlay_length, Some(0));
        assert!(matches!(events.last(), Some(WalkEvent::ArchiveEnd { offset }) if *offset == buf.len()));
    }

    #[test]
    fn missing_end_record_still_finishes() {
        let mut buf = stored_entry(b"a", b"x");
        buf.extend_from_slice(&central_header(b"a", 0));

        let model = ZipWalker::new(&buf).walk(NullSink).unwrap();
        assert_eq!(model.central_directory.len(), 1);
        assert!(model.end_record.is_none());
        assert_eq!(
            model.anomalies,
            vec![Anomaly::MissingEndRecord {
                offset: buf.len(),
                found: Vec::new()
            }]
        );
        assert_eq!(model.overlay_length, Some(0));
    }

    #[test]
    fn bad_central_header_after_good_one_keeps_partial_model() {
        let mut buf = stored_entry(b"a", b"x");
        buf.extend_from_slice(&central_header(b"a", 0));
        let mut truncated = central_header(b"long-name", 0);
        truncated.truncate(50);
        buf.extend_from_slice(&truncated);

        let failure = ZipWalker::new(&buf).walk(NullSink).unwrap_err();
        assert!(matches!(failure.error, WalkError::Truncated { .. }));
        assert_eq!(failure.partial.entries.len(), 1);
        assert_eq!(failure.partial.central_directory.len(), 1);
        assert_eq!(failure.partial.overlay_length, None);
    }

    #[test]
    fn walking_twice_gives_the_same_model() {
        let mut buf = stored_entry(b"a", b"x");
        buf.extend_from_slice(&central_header(b"a", 0));
        buf.extend_from_slice(&end_record(1));

        let walker = ZipWalker::new(&buf);
        assert_eq!(
            walker.walk(NullSink).unwrap(),
            walker.walk(NullSink).unwrap()
        );
    }
}
