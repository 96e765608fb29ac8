//! Fixed-size encode/decode of the file header and item descriptors.
//!
//! All multi-byte integers are little-endian, written and read explicitly through
//! `byteorder` rather than relied on via host layout.

use crate::error::{Error, Result, map_read_error};
use crate::types::{DESCRIPTOR_SIZE, FORMAT_VERSION_MAJOR, FORMAT_VERSION_MINOR, HEADER_SIZE, MAGIC};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Parsed, validated file header.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub version_major: u16,
    pub version_minor: u16,
    pub item_count: u32,
    pub file_size: u64,
}

impl Header {
    pub fn new(item_count: u32, file_size: u64) -> Self {
        Self {
            version_major: FORMAT_VERSION_MAJOR,
            version_minor: FORMAT_VERSION_MINOR,
            item_count,
            file_size,
        }
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u16::<LittleEndian>(self.version_major)?;
        w.write_u16::<LittleEndian>(self.version_minor)?;
        w.write_u32::<LittleEndian>(self.item_count)?;
        w.write_u64::<LittleEndian>(self.file_size)?;
        let written = 8 + 2 + 2 + 4 + 8;
        w.write_all(&vec![0u8; (HEADER_SIZE as usize) - written])?;
        Ok(())
    }

    /// Decode the header from exactly `HEADER_SIZE` bytes, validating magic and
    /// version but *not* `file_size` against the actual file length (that is the
    /// reader's job, since this function has no view of the whole file).
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)
            .map_err(|e| map_read_error(e, "header magic"))?;
        if magic != MAGIC {
            return Err(Error::BadFileFormat(format!(
                "bad magic: expected {MAGIC:?}, found {magic:?}"
            )));
        }

        let version_major = read_u16(r, "header version major")?;
        let version_minor = read_u16(r, "header version minor")?;

        if version_major < crate::types::OLDEST_SUPPORTED_MAJOR {
            return Err(Error::VersionTooOld {
                found: version_major,
                minor: version_minor,
                oldest: crate::types::OLDEST_SUPPORTED_MAJOR,
            });
        }
        if version_major > FORMAT_VERSION_MAJOR {
            return Err(Error::VersionTooNew {
                found: version_major,
                minor: version_minor,
                newest: FORMAT_VERSION_MAJOR,
            });
        }

        let item_count = read_u32(r, "header item count")?;
        let file_size = read_u64(r, "header file size")?;

        if file_size < HEADER_SIZE {
            return Err(Error::BadFileFormat(format!(
                "file_size {file_size} is smaller than the header itself ({HEADER_SIZE})"
            )));
        }

        // Reserved tail: read and discard so the stream position lands exactly at
        // HEADER_SIZE regardless of how much of the header we actually interpret.
        let consumed = 8 + 2 + 2 + 4 + 8;
        let mut reserved = vec![0u8; (HEADER_SIZE as usize) - consumed];
        r.read_exact(&mut reserved)
            .map_err(|e| map_read_error(e, "header reserved tail"))?;

        Ok(Self {
            version_major,
            version_minor,
            item_count,
            file_size,
        })
    }
}

/// Parsed item descriptor, before the reader has validated it against the file body.
#[derive(Debug, Clone, Copy)]
pub struct RawDescriptor {
    pub type_tag: u8,
    pub key_start: u64,
    pub key_len: u64,
    pub array_start: u64,
    pub array_len: u64,
}

impl RawDescriptor {
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.type_tag)?;
        w.write_all(&[0u8; 7])?;
        w.write_u64::<LittleEndian>(self.key_start)?;
        w.write_u64::<LittleEndian>(self.key_len)?;
        w.write_u64::<LittleEndian>(self.array_start)?;
        w.write_u64::<LittleEndian>(self.array_len)?;
        let written = 1 + 7 + 8 + 8 + 8 + 8;
        w.write_all(&vec![0u8; (DESCRIPTOR_SIZE as usize) - written])?;
        Ok(())
    }

    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let type_tag = r
            .read_u8()
            .map_err(|e| map_read_error(e, "descriptor type tag"))?;
        let mut reserved_head = [0u8; 7];
        r.read_exact(&mut reserved_head)
            .map_err(|e| map_read_error(e, "descriptor reserved head"))?;
        let key_start = read_u64(r, "descriptor key_start")?;
        let key_len = read_u64(r, "descriptor key_len")?;
        let array_start = read_u64(r, "descriptor array_start")?;
        let array_len = read_u64(r, "descriptor array_len")?;

        let consumed = 1 + 7 + 8 + 8 + 8 + 8;
        let mut reserved_tail = vec![0u8; (DESCRIPTOR_SIZE as usize) - consumed];
        r.read_exact(&mut reserved_tail)
            .map_err(|e| map_read_error(e, "descriptor reserved tail"))?;

        Ok(Self {
            type_tag,
            key_start,
            key_len,
            array_start,
            array_len,
        })
    }
}

fn read_u16<R: Read>(r: &mut R, context: &str) -> Result<u16> {
    r.read_u16::<LittleEndian>()
        .map_err(|e| map_read_error(e, context))
}

fn read_u32<R: Read>(r: &mut R, context: &str) -> Result<u32> {
    r.read_u32::<LittleEndian>()
        .map_err(|e| map_read_error(e, context))
}

fn read_u64<R: Read>(r: &mut R, context: &str) -> Result<u64> {
    r.read_u64::<LittleEndian>()
        .map_err(|e| map_read_error(e, context))
}
