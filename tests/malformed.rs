//! Rejection of files that are not valid keyed array stores.

use kas::{Error, OpenFlags, ReadStore, WriteStore};
use tempfile::NamedTempFile;

#[test]
fn array_region_past_file_size_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    let mut w = WriteStore::create(file.path()).unwrap();
    w.put(b"k", &[1u32, 2, 3]).unwrap();
    w.close().unwrap();

    // Truncate the file so the last array's bytes run past EOF, while leaving
    // the header's file_size field untouched (it still claims the original size).
    let mut raw = std::fs::read(file.path()).unwrap();
    let original_len = raw.len();
    raw.truncate(original_len - 4);
    std::fs::write(file.path(), &raw).unwrap();

    let err = ReadStore::open(file.path(), OpenFlags::NO_MMAP).unwrap_err();
    assert!(matches!(err, Error::BadFileFormat(_)));
}

#[test]
fn bad_magic_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    let w = WriteStore::create(file.path()).unwrap();
    w.close().unwrap();

    let mut raw = std::fs::read(file.path()).unwrap();
    raw[0] = b'X';
    std::fs::write(file.path(), &raw).unwrap();

    let err = ReadStore::open(file.path(), OpenFlags::NONE).unwrap_err();
    assert!(matches!(err, Error::BadFileFormat(_)));
}

#[test]
fn truncated_header_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    let w = WriteStore::create(file.path()).unwrap();
    w.close().unwrap();

    let raw = std::fs::read(file.path()).unwrap();
    std::fs::write(file.path(), &raw[..32]).unwrap();

    let err = ReadStore::open(file.path(), OpenFlags::NONE).unwrap_err();
    assert!(matches!(err, Error::BadFileFormat(_)));
}
