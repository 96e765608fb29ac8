//! The fixed value-type registry and on-disk format constants.

use crate::error::Error;

/// One of the eight element types a stored array can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    U8 = 0,
    I8 = 1,
    U32 = 2,
    I32 = 3,
    U64 = 4,
    I64 = 5,
    F32 = 6,
    F64 = 7,
}

/// Number of distinct type tags; tags `0..NUM_TYPES` are valid.
pub const NUM_TYPES: u8 = 8;

impl TypeCode {
    /// Decode a raw tag byte, rejecting anything outside `0..NUM_TYPES`.
    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(Self::U8),
            1 => Ok(Self::I8),
            2 => Ok(Self::U32),
            3 => Ok(Self::I32),
            4 => Ok(Self::U64),
            5 => Ok(Self::I64),
            6 => Ok(Self::F32),
            7 => Ok(Self::F64),
            other => Err(Error::BadType(other)),
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Byte width of a single element of this type.
    pub fn width(self) -> u64 {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Whether a raw tag byte names a valid type, without constructing one.
    pub fn is_valid(tag: u8) -> bool {
        tag < NUM_TYPES
    }
}

/// 8-byte magic identifying a keyed array store file.
pub const MAGIC: [u8; 8] = *b"KASTORE1";

/// Current format major/minor version written by this library.
pub const FORMAT_VERSION_MAJOR: u16 = 1;
pub const FORMAT_VERSION_MINOR: u16 = 0;

/// Oldest file-format major version this library can still read.
pub const OLDEST_SUPPORTED_MAJOR: u16 = 1;

/// Byte size of the fixed-size file header.
pub const HEADER_SIZE: u64 = 64;

/// Byte size of one fixed-size item descriptor.
pub const DESCRIPTOR_SIZE: u64 = 64;

/// Alignment boundary, in bytes, that every array region start is rounded up to.
pub const ARRAY_ALIGN: u64 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_format_table() {
        assert_eq!(TypeCode::U8.width(), 1);
        assert_eq!(TypeCode::I8.width(), 1);
        assert_eq!(TypeCode::U32.width(), 4);
        assert_eq!(TypeCode::I32.width(), 4);
        assert_eq!(TypeCode::U64.width(), 8);
        assert_eq!(TypeCode::I64.width(), 8);
        assert_eq!(TypeCode::F32.width(), 4);
        assert_eq!(TypeCode::F64.width(), 8);
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(TypeCode::from_tag(8).is_err());
        assert!(TypeCode::from_tag(255).is_err());
        assert!(!TypeCode::is_valid(8));
    }

    #[test]
    fn valid_tags_round_trip() {
        for tag in 0..NUM_TYPES {
            let ty = TypeCode::from_tag(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
    }
}
