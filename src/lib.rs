//! A portable single-file container for a small collection of named, typed
//! numeric arrays — a "keyed array store".
//!
//! The on-disk format is a fixed little-endian header, a table of fixed-size item
//! descriptors, a tightly packed key region, and an 8-byte-aligned array region.
//! Items are always stored in ascending key order, so lookups are a binary search
//! over the descriptor table rather than a linear scan.
//!
//! ```no_run
//! use kas::{OpenFlags, ReadStore, WriteStore};
//!
//! let mut w = WriteStore::create("example.kas").unwrap();
//! w.put(b"temperatures", &[20.5f32, 21.0, 19.75]).unwrap();
//! w.close().unwrap();
//!
//! let r = ReadStore::open("example.kas", OpenFlags::NONE).unwrap();
//! let (bytes, len, _type_code) = r.get(b"temperatures").unwrap();
//! assert_eq!(len, 3);
//! assert_eq!(bytes.len(), 12);
//! ```

mod backing;
mod codec;
pub mod error;
mod item;
mod packer;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::{Element, OpenFlags, ReadStore, Store, WriteStore, open};
pub use types::TypeCode;
