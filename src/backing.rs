//! The buffer that owns a read-mode store's file bytes: either a memory-mapped
//! region or a heap slurp. One enum rather than two optional fields, since a
//! read-mode store never needs both at once.

use std::ops::Deref;

use memmap2::Mmap;

pub(crate) enum Backing {
    Mmap(Mmap),
    Heap(Vec<u8>),
}

impl Backing {
    pub(crate) fn is_mmap(&self) -> bool {
        matches!(self, Backing::Mmap(_))
    }
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Mmap(mmap) => &mmap[..],
            Backing::Heap(buf) => &buf[..],
        }
    }
}
