//! Regression test: the same file opened with and without `OpenFlags::NO_MMAP`
//! must expose identical contents. This pins down the mmap-vs-heap decision to
//! "mmap unless NO_MMAP is set", so the flag always wins regardless of any other
//! signal (e.g. file size) that might otherwise be read as a hint to fall back.

use kas::{OpenFlags, ReadStore, WriteStore};
use tempfile::NamedTempFile;

#[test]
fn mmap_and_heap_reads_agree() {
    let file = NamedTempFile::new().unwrap();
    let mut w = WriteStore::create(file.path()).unwrap();
    w.put(b"alpha", &[1u8, 2, 3, 4]).unwrap();
    w.put(b"beta", &[9.5f64, -1.0]).unwrap();
    w.put::<i32>(b"gamma", &[]).unwrap();
    w.close().unwrap();

    let mmapped = ReadStore::open(file.path(), OpenFlags::NONE).unwrap();
    let heap = ReadStore::open(file.path(), OpenFlags::NO_MMAP).unwrap();

    assert_eq!(mmapped.len(), heap.len());
    assert_eq!(mmapped.file_size(), heap.file_size());
    assert_eq!(mmapped.version(), heap.version());

    let mmapped_items: Vec<(Vec<u8>, Vec<u8>)> = mmapped
        .iter()
        .map(|(k, _, v)| (k.to_vec(), v.to_vec()))
        .collect();
    let heap_items: Vec<(Vec<u8>, Vec<u8>)> = heap
        .iter()
        .map(|(k, _, v)| (k.to_vec(), v.to_vec()))
        .collect();
    assert_eq!(mmapped_items, heap_items);
}
