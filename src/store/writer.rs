//! Write-mode store: accumulate items, then sort, pack, and emit on close.

use crate::codec::{Header, RawDescriptor};
use crate::error::{Error, Result};
use crate::item::{Item, key_order};
use crate::packer;
use crate::types::TypeCode;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A store open for writing. Array payloads passed to [`WriteStore::put`] are
/// borrowed for the lifetime `'a`, which must enclose the eventual call to
/// [`WriteStore::close`].
pub struct WriteStore<'a> {
    path: PathBuf,
    items: Vec<Item<'a>>,
    closed: bool,
}

impl<'a> WriteStore<'a> {
    /// Open `path` for writing. The file itself is not created until [`close`] is
    /// called — everything before that is accumulated in memory.
    ///
    /// [`close`]: WriteStore::close
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "opening store for writing");
        Ok(Self {
            path,
            items: Vec::new(),
            closed: false,
        })
    }

    fn reject_if_duplicate_or_empty(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        if self
            .items
            .iter()
            .any(|item| key_order(&item.key, key) == std::cmp::Ordering::Equal)
        {
            return Err(Error::DuplicateKey(key.to_vec()));
        }
        Ok(())
    }

    /// Insert an array whose bytes are already the on-disk little-endian encoding.
    /// This is the zero-copy path: `array_bytes` is borrowed, not copied.
    pub fn put_bytes(
        &mut self,
        key: &[u8],
        type_code: TypeCode,
        array_bytes: &'a [u8],
    ) -> Result<()> {
        self.reject_if_duplicate_or_empty(key)?;
        let width = type_code.width();
        if array_bytes.len() as u64 % width != 0 {
            return Err(Error::BadFileFormat(format!(
                "array byte length {} is not a multiple of element width {width}",
                array_bytes.len()
            )));
        }
        let array_len = array_bytes.len() as u64 / width;
        debug!(?key, array_len, "put");
        self.items.push(Item::new(
            key.to_vec(),
            type_code,
            Cow::Borrowed(array_bytes),
            array_len,
        ));
        Ok(())
    }

    /// Insert a typed array, encoding it to little-endian bytes. Unlike
    /// [`put_bytes`](Self::put_bytes), this copies: the caller's slice need not
    /// outlive `'a`.
    pub fn put<T: Element>(&mut self, key: &[u8], values: &[T]) -> Result<()> {
        self.reject_if_duplicate_or_empty(key)?;
        let mut bytes = Vec::with_capacity(values.len() * std::mem::size_of::<T>());
        for value in values {
            value.write_le(&mut bytes);
        }
        debug!(?key, array_len = values.len(), "put (typed)");
        self.items.push(Item::new(
            key.to_vec(),
            T::TYPE_CODE,
            Cow::Owned(bytes),
            values.len() as u64,
        ));
        Ok(())
    }

    /// Number of items inserted so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sort, pack, and emit the file, consuming the store.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.items.sort();
        let file_size = packer::pack(&mut self.items)?;

        let file = File::create(&self.path)?;
        let mut w = BufWriter::new(file);

        let header = Header::new(self.items.len() as u32, file_size);
        header.encode(&mut w)?;

        for item in &self.items {
            RawDescriptor {
                type_tag: item.type_code.tag(),
                key_start: item.key_start,
                key_len: item.key_len(),
                array_start: item.array_start,
                array_len: item.array_len,
            }
            .encode(&mut w)?;
        }

        let mut pos = crate::types::HEADER_SIZE
            + (self.items.len() as u64) * crate::types::DESCRIPTOR_SIZE;
        for item in &self.items {
            w.write_all(&item.key)?;
            pos += item.key_len();
        }

        for item in &self.items {
            if item.array_start > pos {
                let padding = item.array_start - pos;
                w.write_all(&vec![0u8; padding as usize])?;
                pos += padding;
            }
            w.write_all(&item.array_bytes)?;
            pos += item.array_bytes.len() as u64;
        }

        w.flush()?;
        debug!(path = ?self.path, items = self.items.len(), file_size, "closed store");
        Ok(())
    }
}

impl Drop for WriteStore<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.flush() {
                warn!(path = ?self.path, %err, "store dropped without explicit close, and the implicit flush failed");
            }
        }
    }
}

/// A numeric element type that can be written with [`WriteStore::put`].
pub trait Element: Copy {
    const TYPE_CODE: TypeCode;
    fn write_le(&self, out: &mut Vec<u8>);
}

macro_rules! impl_element {
    ($ty:ty, $code:expr) => {
        impl Element for $ty {
            const TYPE_CODE: TypeCode = $code;
            fn write_le(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_element!(u8, TypeCode::U8);
impl_element!(i8, TypeCode::I8);
impl_element!(u32, TypeCode::U32);
impl_element!(i32, TypeCode::I32);
impl_element!(u64, TypeCode::U64);
impl_element!(i64, TypeCode::I64);
impl_element!(f32, TypeCode::F32);
impl_element!(f64, TypeCode::F64);
