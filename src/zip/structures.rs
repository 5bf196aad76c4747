use super::cursor::{ByteCursor, Signature};
use super::error::WalkError;

/// Local File Header signature (`PK\x03\x04`)
pub const LFH_SIGNATURE: Signature = *b"PK\x03\x04";
/// Data Descriptor signature (`PK\x07\x08`)
pub const DATA_DESCRIPTOR_SIGNATURE: Signature = *b"PK\x07\x08";
/// Central Directory File Header signature (`PK\x01\x02`)
pub const CDFH_SIGNATURE: Signature = *b"PK\x01\x02";
/// End of Central Directory signature (`PK\x05\x06`)
pub const EOCD_SIGNATURE: Signature = *b"PK\x05\x06";

/// General purpose flag bits this walker reports on.
pub const FLAG_ENCRYPTED: u16 = 0x0001;
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
pub const FLAG_UTF8: u16 = 0x0800;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Imploded,
    Deflated,
    Deflate64,
    Bzip2,
    Lzma,
    Other(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            6 => CompressionMethod::Imploded,
            8 => CompressionMethod::Deflated,
            9 => CompressionMethod::Deflate64,
            12 => CompressionMethod::Bzip2,
            14 => CompressionMethod::Lzma,
            _ => CompressionMethod::Other(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Imploded => 6,
            CompressionMethod::Deflated => 8,
            CompressionMethod::Deflate64 => 9,
            CompressionMethod::Bzip2 => 12,
            CompressionMethod::Lzma => 14,
            CompressionMethod::Other(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::Stored => "Stored",
            CompressionMethod::Imploded => "Imploded",
            CompressionMethod::Deflated => "Deflated",
            CompressionMethod::Deflate64 => "Enhanced Deflating using Deflate64",
            CompressionMethod::Bzip2 => "BZIP2",
            CompressionMethod::Lzma => "LZMA",
            CompressionMethod::Other(_) => "Other",
        }
    }
}

/// Deflate speed/ratio hint carried in flag bits 1-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOption {
    Normal,
    Maximum,
    Fast,
    SuperFast,
}

impl CompressionOption {
    /// Only meaningful for Deflated and Deflate64 entries.
    pub fn from_flag(method: CompressionMethod, flag: u16) -> Option<Self> {
        if !matches!(
            method,
            CompressionMethod::Deflated | CompressionMethod::Deflate64
        ) {
            return None;
        }
        Some(match (flag >> 1) & 0x03 {
            0 => CompressionOption::Normal,
            1 => CompressionOption::Maximum,
            2 => CompressionOption::Fast,
            _ => CompressionOption::SuperFast,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionOption::Normal => "Normal",
            CompressionOption::Maximum => "Maximum",
            CompressionOption::Fast => "Fast",
            CompressionOption::SuperFast => "Super Fast",
        }
    }
}

/// Read the signature at `offset` and make sure it is `expected`.
///
/// Called before any other field of a record is decoded.
fn expect_signature(
    cursor: &ByteCursor<'_>,
    offset: usize,
    expected: Signature,
) -> Result<(), WalkError> {
    let found = cursor.peek_signature(offset)?;
    if found != expected {
        return Err(WalkError::SignatureMismatch {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}

/// Decode a raw MS-DOS date into (year, month, day).
pub fn dos_date(date: u16) -> (u16, u8, u8) {
    let day = (date & 0x1F) as u8;
    let month = ((date >> 5) & 0x0F) as u8;
    let year = ((date >> 9) & 0x7F) + 1980;
    (year, month, day)
}

/// Decode a raw MS-DOS time into (hour, minute, second).
pub fn dos_time(time: u16) -> (u8, u8, u8) {
    let second = ((time & 0x1F) * 2) as u8;
    let minute = ((time >> 5) & 0x3F) as u8;
    let hour = ((time >> 11) & 0x1F) as u8;
    (hour, minute, second)
}

/// Local File Header (LFH) - 30 bytes plus filename and extra field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flag: u16,
    pub compression_method: CompressionMethod,
    pub compression_option: Option<CompressionOption>,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: Vec<u8>,
    pub extra_field: Vec<u8>,
    pub encrypted: bool,
}

impl LocalFileHeader {
    pub const SIGNATURE: Signature = LFH_SIGNATURE;
    pub const SIZE: usize = 30;

    pub fn parse(cursor: &ByteCursor<'_>, offset: usize) -> Result<Self, WalkError> {
        expect_signature(cursor, offset, Self::SIGNATURE)?;
        // Fixed part must be complete before any field is trusted
        cursor.read_slice(offset, Self::SIZE)?;

        let flag = cursor.read_u16(offset + 6)?;
        let compression_method = CompressionMethod::from_u16(cursor.read_u16(offset + 8)?);
        let file_name_length = cursor.read_u16(offset + 26)? as usize;
        let extra_field_length = cursor.read_u16(offset + 28)? as usize;

        let name_offset = offset + Self::SIZE;
        let file_name = cursor.read_slice(name_offset, file_name_length)?;
        let extra_field = cursor.read_slice(name_offset + file_name_length, extra_field_length)?;

        Ok(Self {
            version_needed: cursor.read_u16(offset + 4)?,
            flag,
            compression_method,
            compression_option: CompressionOption::from_flag(compression_method, flag),
            last_mod_time: cursor.read_u16(offset + 10)?,
            last_mod_date: cursor.read_u16(offset + 12)?,
            crc32: cursor.read_u32(offset + 14)?,
            compressed_size: cursor.read_u32(offset + 18)?,
            uncompressed_size: cursor.read_u32(offset + 22)?,
            file_name: file_name.to_vec(),
            extra_field: extra_field.to_vec(),
            encrypted: flag & FLAG_ENCRYPTED != 0,
        })
    }

    /// Total on-disk size of the header.
    pub fn length(&self) -> usize {
        Self::SIZE + self.file_name.len() + self.extra_field.len()
    }

    pub fn has_data_descriptor_flag(&self) -> bool {
        self.flag & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Flag bit 11: filename and comment are UTF-8 rather than CP437.
    pub fn utf8_names(&self) -> bool {
        self.flag & FLAG_UTF8 != 0
    }
}

/// Data Descriptor - 16 bytes, trails the payload of streamed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    pub const SIGNATURE: Signature = DATA_DESCRIPTOR_SIGNATURE;
    pub const SIZE: usize = 16;

    /// Parse a descriptor at `offset` if its signature is there.
    ///
    /// Flag bit 3 is not consulted. Returns `None` without consuming
    /// anything when the signature is absent.
    pub fn parse(cursor: &ByteCursor<'_>, offset: usize) -> Result<Option<Self>, WalkError> {
        match cursor.peek_signature(offset) {
            Ok(sig) if sig == Self::SIGNATURE => {}
            _ => return Ok(None),
        }

        Ok(Some(Self {
            crc32: cursor.read_u32(offset + 4)?,
            compressed_size: cursor.read_u32(offset + 8)?,
            uncompressed_size: cursor.read_u32(offset + 12)?,
        }))
    }

    pub fn length(&self) -> usize {
        Self::SIZE
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flag: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: Vec<u8>,
    pub extra_field: Vec<u8>,
    pub comment: Vec<u8>,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: Signature = CDFH_SIGNATURE;
    pub const SIZE: usize = 46;

    pub fn parse(cursor: &ByteCursor<'_>, offset: usize) -> Result<Self, WalkError> {
        expect_signature(cursor, offset, Self::SIGNATURE)?;
        cursor.read_slice(offset, Self::SIZE)?;

        let file_name_length = cursor.read_u16(offset + 28)? as usize;
        let extra_field_length = cursor.read_u16(offset + 30)? as usize;
        let comment_length = cursor.read_u16(offset + 32)? as usize;

        // Variable fields follow in fixed order: name, extra, comment
        let mut pointer = offset + Self::SIZE;
        let file_name = cursor.read_slice(pointer, file_name_length)?;
        pointer += file_name_length;
        let extra_field = cursor.read_slice(pointer, extra_field_length)?;
        pointer += extra_field_length;
        let comment = cursor.read_slice(pointer, comment_length)?;

        Ok(Self {
            version_made_by: cursor.read_u16(offset + 4)?,
            version_needed: cursor.read_u16(offset + 6)?,
            flag: cursor.read_u16(offset + 8)?,
            compression_method: CompressionMethod::from_u16(cursor.read_u16(offset + 10)?),
            last_mod_time: cursor.read_u16(offset + 12)?,
            last_mod_date: cursor.read_u16(offset + 14)?,
            crc32: cursor.read_u32(offset + 16)?,
            compressed_size: cursor.read_u32(offset + 20)?,
            uncompressed_size: cursor.read_u32(offset + 24)?,
            file_name: file_name.to_vec(),
            extra_field: extra_field.to_vec(),
            comment: comment.to_vec(),
            disk_number_start: cursor.read_u16(offset + 34)?,
            internal_attrs: cursor.read_u16(offset + 36)?,
            external_attrs: cursor.read_u32(offset + 38)?,
            local_header_offset: cursor.read_u32(offset + 42)?,
        })
    }

    pub fn length(&self) -> usize {
        Self::SIZE + self.file_name.len() + self.extra_field.len() + self.comment.len()
    }

    pub fn utf8_names(&self) -> bool {
        self.flag & FLAG_UTF8 != 0
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.file_name.last() == Some(&b'/')
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: Signature = EOCD_SIGNATURE;
    pub const SIZE: usize = 22;

    pub fn parse(cursor: &ByteCursor<'_>, offset: usize) -> Result<Self, WalkError> {
        expect_signature(cursor, offset, Self::SIGNATURE)?;
        cursor.read_slice(offset, Self::SIZE)?;

        let comment_length = cursor.read_u16(offset + 20)? as usize;
        let comment = cursor.read_slice(offset + Self::SIZE, comment_length)?;

        Ok(Self {
            disk_number: cursor.read_u16(offset + 4)?,
            disk_with_cd: cursor.read_u16(offset + 6)?,
            disk_entries: cursor.read_u16(offset + 8)?,
            total_entries: cursor.read_u16(offset + 10)?,
            cd_size: cursor.read_u32(offset + 12)?,
            cd_offset: cursor.read_u32(offset + 16)?,
            comment: comment.to_vec(),
        })
    }

    pub fn length(&self) -> usize {
        Self::SIZE + self.comment.len()
    }
}

/// One local entry: header, still-compressed payload and optional
/// trailing data descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZippedFileEntry<'a> {
    /// Offset of the local header within the archive buffer
    pub offset: usize,
    pub header: LocalFileHeader,
    pub payload: &'a [u8],
    pub descriptor: Option<DataDescriptor>,
}

impl ZippedFileEntry<'_> {
    /// (compressed, uncompressed) sizes, preferring the data descriptor.
    pub fn effective_sizes(&self) -> (u32, u32) {
        match &self.descriptor {
            Some(dd) => (dd.compressed_size, dd.uncompressed_size),
            None => (self.header.compressed_size, self.header.uncompressed_size),
        }
    }

    pub fn effective_crc32(&self) -> u32 {
        self.descriptor.map_or(self.header.crc32, |dd| dd.crc32)
    }

    /// Bytes occupied by header, payload and descriptor together.
    pub fn length(&self) -> usize {
        self.header.length()
            + self.payload.len()
            + self.descriptor.as_ref().map_or(0, DataDescriptor::length)
    }
}
