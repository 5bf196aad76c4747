//! Byte-level archive builder shared by the integration tests.

#![allow(dead_code)]

pub struct Entry {
    pub flag: u16,
    pub method: u16,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
    pub payload: Vec<u8>,
    pub uncompressed_size: u32,
    pub crc32: u32,
    /// Append a `PK\x07\x08` block after the payload
    pub descriptor: bool,
}

impl Entry {
    /// Deflated "a.txt", 10 compressed bytes standing for 20 uncompressed.
    pub fn deflated_a_txt() -> Self {
        Self {
            flag: 0,
            method: 8,
            name: b"a.txt".to_vec(),
            extra: Vec::new(),
            payload: (0u8..10).collect(),
            uncompressed_size: 20,
            crc32: 0x1234_5678,
            descriptor: false,
        }
    }

    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            flag: 0,
            method: 0,
            name: name.as_bytes().to_vec(),
            extra: Vec::new(),
            payload: data.to_vec(),
            uncompressed_size: data.len() as u32,
            crc32: 0,
            descriptor: false,
        }
    }

    pub fn local_bytes(&self) -> Vec<u8> {
        let mut buf = b"PK\x03\x04".to_vec();
        push_u16(&mut buf, 20);
        push_u16(&mut buf, self.flag);
        push_u16(&mut buf, self.method);
        push_u16(&mut buf, 0x6000);
        push_u16(&mut buf, 0x5821);
        push_u32(&mut buf, self.crc32);
        push_u32(&mut buf, self.payload.len() as u32);
        push_u32(&mut buf, self.uncompressed_size);
        push_u16(&mut buf, self.name.len() as u16);
        push_u16(&mut buf, self.extra.len() as u16);
        buf.extend_from_slice(&self.name);
        buf.extend_from_slice(&self.extra);
        buf.extend_from_slice(&self.payload);
        if self.descriptor {
            buf.extend_from_slice(b"PK\x07\x08");
            push_u32(&mut buf, self.crc32);
            push_u32(&mut buf, self.payload.len() as u32);
            push_u32(&mut buf, self.uncompressed_size);
        }
        buf
    }

    pub fn central_bytes(&self, local_offset: u32) -> Vec<u8> {
        let mut buf = b"PK\x01\x02".to_vec();
        push_u16(&mut buf, 0x031e);
        push_u16(&mut buf, 20);
        push_u16(&mut buf, self.flag);
        push_u16(&mut buf, self.method);
        push_u16(&mut buf, 0x6000);
        push_u16(&mut buf, 0x5821);
        push_u32(&mut buf, self.crc32);
        push_u32(&mut buf, self.payload.len() as u32);
        push_u32(&mut buf, self.uncompressed_size);
        push_u16(&mut buf, self.name.len() as u16);
        push_u16(&mut buf, self.extra.len() as u16);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u32(&mut buf, 0o100644 << 16);
        push_u32(&mut buf, local_offset);
        buf.extend_from_slice(&self.name);
        buf.extend_from_slice(&self.extra);
        buf
    }
}

pub fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn end_record(entries: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
    let mut buf = b"PK\x05\x06".to_vec();
    push_u16(&mut buf, 0);
    push_u16(&mut buf, 0);
    push_u16(&mut buf, entries);
    push_u16(&mut buf, entries);
    push_u32(&mut buf, cd_size);
    push_u32(&mut buf, cd_offset);
    push_u16(&mut buf, comment.len() as u16);
    buf.extend_from_slice(comment);
    buf
}

/// A complete archive: local entries, central directory, end record.
pub fn archive(entries: &[Entry]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut offsets = Vec::new();
    for entry in entries {
        offsets.push(buf.len() as u32);
        buf.extend_from_slice(&entry.local_bytes());
    }

    let cd_offset = buf.len();
    for (entry, offset) in entries.iter().zip(offsets) {
        buf.extend_from_slice(&entry.central_bytes(offset));
    }
    let cd_size = buf.len() - cd_offset;

    buf.extend_from_slice(&end_record(
        entries.len() as u16,
        cd_size as u32,
        cd_offset as u32,
        b"",
    ));
    buf
}
