//! Deterministic offset assignment ("the packer walk"), used both to write files
//! and, on read, to validate that a file's descriptors match what the writer
//! would have produced.

use crate::error::{Error, Result};
use crate::item::Item;
use crate::types::{ARRAY_ALIGN, DESCRIPTOR_SIZE, HEADER_SIZE};

fn round_up_to_align(offset: u64, align: u64) -> Result<u64> {
    let remainder = offset % align;
    if remainder == 0 {
        return Ok(offset);
    }
    offset
        .checked_add(align - remainder)
        .ok_or_else(|| Error::BadFileFormat("offset overflow while aligning".into()))
}

/// Assign `key_start`/`array_start` to every item (already sorted) and return the
/// resulting total file size: all keys first, tightly packed, then all arrays,
/// each rounded up to `ARRAY_ALIGN`.
pub fn pack(items: &mut [Item<'_>]) -> Result<u64> {
    let descriptors_size = (items.len() as u64)
        .checked_mul(DESCRIPTOR_SIZE)
        .ok_or_else(|| Error::BadFileFormat("descriptor region overflow".into()))?;
    let mut offset = HEADER_SIZE
        .checked_add(descriptors_size)
        .ok_or_else(|| Error::BadFileFormat("header/descriptor region overflow".into()))?;

    for item in items.iter_mut() {
        item.key_start = offset;
        offset = offset
            .checked_add(item.key_len())
            .ok_or_else(|| Error::BadFileFormat("key region overflow".into()))?;
    }

    for item in items.iter_mut() {
        offset = round_up_to_align(offset, ARRAY_ALIGN)?;
        item.array_start = offset;
        let array_bytes = item
            .array_len
            .checked_mul(item.type_code.width())
            .ok_or_else(|| Error::BadFileFormat("array size overflow".into()))?;
        offset = offset
            .checked_add(array_bytes)
            .ok_or_else(|| Error::BadFileFormat("array region overflow".into()))?;
    }

    Ok(offset)
}

/// Recompute the packer walk from a parsed descriptor count alone and compare it
/// against the `key_start`/`array_start` the reader parsed from disk. Any mismatch
/// means the file was not produced by this packing scheme (or was corrupted).
pub fn verify_layout(descriptors: &[(u64, u64, crate::types::TypeCode, u64, u64)]) -> Result<()> {
    // Each tuple is (parsed_key_start, parsed_array_start, type_code, key_len, array_len).
    let descriptors_size = (descriptors.len() as u64)
        .checked_mul(DESCRIPTOR_SIZE)
        .ok_or_else(|| Error::BadFileFormat("descriptor region overflow".into()))?;
    let mut offset = HEADER_SIZE
        .checked_add(descriptors_size)
        .ok_or_else(|| Error::BadFileFormat("header/descriptor region overflow".into()))?;

    for (parsed_key_start, _, _, key_len, _) in descriptors {
        if *parsed_key_start != offset {
            return Err(Error::BadFileFormat(format!(
                "key_start mismatch: descriptor says {parsed_key_start}, packer walk expects {offset}"
            )));
        }
        offset = offset
            .checked_add(*key_len)
            .ok_or_else(|| Error::BadFileFormat("key region overflow".into()))?;
    }

    for (_, parsed_array_start, type_code, _, array_len) in descriptors {
        offset = round_up_to_align(offset, ARRAY_ALIGN)?;
        if *parsed_array_start != offset {
            return Err(Error::BadFileFormat(format!(
                "array_start mismatch: descriptor says {parsed_array_start}, packer walk expects {offset}"
            )));
        }
        let array_bytes = array_len
            .checked_mul(type_code.width())
            .ok_or_else(|| Error::BadFileFormat("array size overflow".into()))?;
        offset = offset
            .checked_add(array_bytes)
            .ok_or_else(|| Error::BadFileFormat("array region overflow".into()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeCode;
    use std::borrow::Cow;

    #[test]
    fn single_item_layout() {
        let bytes = [1u8, 2, 3];
        let mut items = vec![Item::new(
            b"abc".to_vec(),
            TypeCode::U8,
            Cow::Borrowed(&bytes[..]),
            3,
        )];
        let file_size = pack(&mut items).unwrap();

        let expected_key_start = HEADER_SIZE + DESCRIPTOR_SIZE;
        assert_eq!(items[0].key_start, expected_key_start);
        let expected_array_start =
            round_up_to_align(expected_key_start + 3, ARRAY_ALIGN).unwrap();
        assert_eq!(items[0].array_start, expected_array_start);
        assert_eq!(file_size, expected_array_start + 3);
    }

    #[test]
    fn array_start_always_aligned() {
        // A 1-byte key forces the key region to an odd boundary, exercising padding.
        let mut items = vec![Item::new(
            b"k".to_vec(),
            TypeCode::U64,
            Cow::Borrowed(&[0u8; 8][..]),
            1,
        )];
        pack(&mut items).unwrap();
        assert_eq!(items[0].array_start % ARRAY_ALIGN, 0);
    }

    #[test]
    fn empty_items_size_is_just_header() {
        let mut items: Vec<Item<'_>> = Vec::new();
        let file_size = pack(&mut items).unwrap();
        assert_eq!(file_size, HEADER_SIZE);
    }
}
