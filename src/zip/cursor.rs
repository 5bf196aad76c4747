//! Bounds-checked little-endian reads over the archive buffer.

use byteorder::{ByteOrder, LittleEndian};

use super::error::WalkError;

/// A four byte record signature (`PK\x03\x04` and friends).
pub type Signature = [u8; 4];

/// Read-only view over the raw archive bytes.
///
/// All reads take an absolute offset into the buffer so that errors can
/// point at the exact byte position in the original file. A read that
/// would run past the end of the buffer fails with
/// [`WalkError::Truncated`] instead of returning a short result.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of bytes available from `offset` to the end of the buffer.
    pub fn remaining(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(offset)
    }

    pub fn read_slice(&self, offset: usize, length: usize) -> Result<&'a [u8], WalkError> {
        let available = self.remaining(offset);
        if length > available {
            return Err(WalkError::Truncated {
                offset,
                requested: length,
                available,
            });
        }
        Ok(&self.data[offset..offset + length])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, WalkError> {
        Ok(LittleEndian::read_u16(self.read_slice(offset, 2)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, WalkError> {
        Ok(LittleEndian::read_u32(self.read_slice(offset, 4)?))
    }

    /// Read the four bytes at `offset` without consuming anything.
    pub fn peek_signature(&self, offset: usize) -> Result<Signature, WalkError> {
        let bytes = self.read_slice(offset, 4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Up to four bytes at `offset`, for reporting what was found where a
    /// signature was expected near the end of the buffer.
    pub fn tail(&self, offset: usize) -> &'a [u8] {
        let start = offset.min(self.data.len());
        let end = offset.saturating_add(4).min(self.data.len());
        &self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16(0).unwrap(), 0x1234);
        assert_eq!(cursor.read_u32(2).unwrap(), 0x1234_5678);
    }

    #[test]
    fn read_past_end_is_truncated() {
        let data = [1u8, 2, 3];
        let cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_u32(0),
            Err(WalkError::Truncated {
                offset: 0,
                requested: 4,
                available: 3
            })
        );
        assert_eq!(
            cursor.read_slice(5, 1),
            Err(WalkError::Truncated {
                offset: 5,
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn zero_length_slice_at_end_is_empty() {
        let data = [1u8, 2];
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_slice(2, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn tail_is_clamped() {
        let data = *b"PK\x03";
        let cursor = ByteCursor::new(&data);
        assert_eq!(cursor.tail(1), b"K\x03");
        assert_eq!(cursor.tail(10), b"");
        assert!(cursor.peek_signature(0).is_err());
    }
}
