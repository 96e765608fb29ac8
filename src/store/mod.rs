//! The public store API: open/close, put, get, and introspection.
//!
//! The Fresh → Open → Closed state machine is encoded in the
//! type system rather than checked at runtime: [`open`] returns a [`ReadStore`] or
//! a [`WriteStore`] depending on mode, and `get`/`put` are only defined on the
//! respective type, so calling the wrong one is a compile error. "Closed" is just
//! ordinary ownership — [`WriteStore::close`] consumes `self`, and a dropped
//! [`ReadStore`] releases its backing buffer.

mod reader;
mod writer;

pub use reader::ReadStore;
pub use writer::{Element, WriteStore};

use crate::error::{Error, Result};
use std::path::Path;

/// Bitflags controlling how a store is opened. Only [`OpenFlags::NO_MMAP`] is
/// currently defined; the rest of the bit space is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub const NONE: OpenFlags = OpenFlags(0);
    /// Disable memory mapping on the read side; always slurp the file to the heap.
    pub const NO_MMAP: OpenFlags = OpenFlags(1 << 0);

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for OpenFlags {
    type Output = OpenFlags;
    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

/// Either half of an opened store, as returned by [`open`].
pub enum Store<'a> {
    Read(ReadStore),
    Write(WriteStore<'a>),
}

/// Open `path` in mode `'r'` or `'w'`, matching the shape of a single-entry-point
/// `open(path, mode, flags)` interface. Prefer [`ReadStore::open`] /
/// [`WriteStore::create`] directly in new Rust code — this wrapper exists for
/// parity with that interface, and to give `'r'`/`'w'`-mode mistakes a single
/// place to be rejected as [`Error::BadMode`].
pub fn open<'a, P: AsRef<Path>>(path: P, mode: char, flags: OpenFlags) -> Result<Store<'a>> {
    match mode {
        'r' => Ok(Store::Read(ReadStore::open(path, flags)?)),
        'w' => Ok(Store::Write(WriteStore::create(path)?)),
        other => Err(Error::BadMode(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_mode_is_rejected() {
        let err = open("/nonexistent/path/does/not/matter", 'x', OpenFlags::NONE).unwrap_err();
        assert!(matches!(err, Error::BadMode('x')));
    }

    #[test]
    fn flag_composition() {
        let flags = OpenFlags::NONE | OpenFlags::NO_MMAP;
        assert!(flags.contains(OpenFlags::NO_MMAP));
        assert!(!OpenFlags::NONE.contains(OpenFlags::NO_MMAP));
    }
}
