//! Read-mode store: parse and validate a file, then serve zero-copy lookups
//! against the backing buffer (mmap or heap slurp).

use crate::backing::Backing;
use crate::codec::{Header, RawDescriptor};
use crate::error::{Error, Result, map_read_error};
use crate::item::key_order;
use crate::packer;
use crate::store::OpenFlags;
use crate::types::{DESCRIPTOR_SIZE, HEADER_SIZE, TypeCode};
use memmap2::MmapOptions;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct Descriptor {
    type_code: TypeCode,
    key_start: u64,
    key_len: u64,
    array_start: u64,
    array_len: u64,
}

/// A store open for reading. Every [`get`](ReadStore::get) call returns a view
/// borrowed from the backing buffer, which is released when the store is dropped.
pub struct ReadStore {
    backing: Backing,
    descriptors: Vec<Descriptor>,
    file_size: u64,
    version_major: u16,
    version_minor: u16,
}

fn checked_usize(n: u64, context: &str) -> Result<usize> {
    usize::try_from(n).map_err(|_| {
        warn!(requested = n, context, "refusing implausible allocation size");
        Error::NoMemory { requested: n }
    })
}

fn slurp(file: &mut File, file_size: u64) -> Result<Vec<u8>> {
    let len = checked_usize(file_size, "heap slurp")?;
    file.seek(SeekFrom::Start(0))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)
        .map_err(|e| map_read_error(e, "file body"))?;
    Ok(buf)
}

impl ReadStore {
    /// Open `path` for reading, running the full parse-and-validate pipeline
    /// before returning.
    pub fn open<P: AsRef<Path>>(path: P, flags: OpenFlags) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "opening store for reading");

        let mut file = File::open(path)?;
        let mut header_buf = vec![0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header_buf)
            .map_err(|e| map_read_error(e, "header"))?;
        let header = Header::decode(&mut Cursor::new(header_buf))?;

        let actual_size = file.metadata()?.len();
        let use_mmap = !flags.contains(OpenFlags::NO_MMAP);

        let backing = if use_mmap {
            if actual_size != header.file_size {
                return Err(Error::BadFileFormat(format!(
                    "on-disk size {actual_size} does not match header file_size {}",
                    header.file_size
                )));
            }
            match unsafe { MmapOptions::new().map(&file) } {
                Ok(mmap) => Backing::Mmap(mmap),
                Err(err) => {
                    debug!(%err, "mmap unsupported, falling back to heap buffer");
                    Backing::Heap(slurp(&mut file, header.file_size)?)
                }
            }
        } else {
            Backing::Heap(slurp(&mut file, header.file_size)?)
        };

        let descriptors = Self::parse_descriptors(&backing, header.item_count, header.file_size)?;

        debug!(
            ?path,
            items = descriptors.len(),
            file_size = header.file_size,
            mmap = backing.is_mmap(),
            "store opened"
        );

        Ok(Self {
            backing,
            descriptors,
            file_size: header.file_size,
            version_major: header.version_major,
            version_minor: header.version_minor,
        })
    }

    fn parse_descriptors(
        backing: &Backing,
        item_count: u32,
        file_size: u64,
    ) -> Result<Vec<Descriptor>> {
        let mut cursor = Cursor::new(&backing[..]);
        cursor
            .seek(SeekFrom::Start(HEADER_SIZE))
            .map_err(|e| map_read_error(e, "seek to descriptor region"))?;

        let descriptors_end = HEADER_SIZE
            .checked_add((item_count as u64).checked_mul(DESCRIPTOR_SIZE).ok_or_else(|| {
                Error::BadFileFormat("item_count * descriptor size overflow".into())
            })?)
            .ok_or_else(|| Error::BadFileFormat("header + descriptor region overflow".into()))?;
        if descriptors_end > file_size {
            return Err(Error::BadFileFormat(format!(
                "item_count {item_count} implies a descriptor table ending at {descriptors_end}, past file_size {file_size}"
            )));
        }

        let mut raw = Vec::with_capacity(item_count as usize);
        for _ in 0..item_count {
            raw.push(RawDescriptor::decode(&mut cursor)?);
        }

        let mut descriptors = Vec::with_capacity(raw.len());
        let mut layout_rows = Vec::with_capacity(raw.len());
        for d in &raw {
            let type_code = TypeCode::from_tag(d.type_tag)?;

            let key_end = d
                .key_start
                .checked_add(d.key_len)
                .ok_or_else(|| Error::BadFileFormat("key_start + key_len overflow".into()))?;
            if key_end > file_size {
                return Err(Error::BadFileFormat(format!(
                    "key region [{}, {key_end}) exceeds file_size {file_size}",
                    d.key_start
                )));
            }

            let array_bytes = d
                .array_len
                .checked_mul(type_code.width())
                .ok_or_else(|| Error::BadFileFormat("array_len * width overflow".into()))?;
            let array_end = d
                .array_start
                .checked_add(array_bytes)
                .ok_or_else(|| Error::BadFileFormat("array_start + array bytes overflow".into()))?;
            if array_end > file_size {
                return Err(Error::BadFileFormat(format!(
                    "array region [{}, {array_end}) exceeds file_size {file_size}",
                    d.array_start
                )));
            }

            layout_rows.push((d.key_start, d.array_start, type_code, d.key_len, d.array_len));
            descriptors.push(Descriptor {
                type_code,
                key_start: d.key_start,
                key_len: d.key_len,
                array_start: d.array_start,
                array_len: d.array_len,
            });
        }

        packer::verify_layout(&layout_rows)?;

        for window in descriptors.windows(2) {
            let a_key = &backing[window[0].key_start as usize
                ..(window[0].key_start + window[0].key_len) as usize];
            let b_key = &backing[window[1].key_start as usize
                ..(window[1].key_start + window[1].key_len) as usize];
            if key_order(a_key, b_key) != Ordering::Less {
                return Err(Error::BadFileFormat(
                    "descriptors are not in strictly ascending key order".into(),
                ));
            }
        }

        Ok(descriptors)
    }

    fn key_bytes(&self, d: &Descriptor) -> &[u8] {
        &self.backing[d.key_start as usize..(d.key_start + d.key_len) as usize]
    }

    fn array_bytes(&self, d: &Descriptor) -> &[u8] {
        let array_byte_len = d.array_len * d.type_code.width();
        &self.backing[d.array_start as usize..(d.array_start + array_byte_len) as usize]
    }

    /// Number of items stored in this file.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Total on-disk size of the file, as recorded in the header.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn version(&self) -> (u16, u16) {
        (self.version_major, self.version_minor)
    }

    /// Look up an array by key via binary search over the sorted items.
    pub fn get(&self, key: &[u8]) -> Result<(&[u8], u64, TypeCode)> {
        let idx = self
            .descriptors
            .binary_search_by(|d| key_order(self.key_bytes(d), key));
        match idx {
            Ok(i) => {
                let d = &self.descriptors[i];
                Ok((self.array_bytes(d), d.array_len, d.type_code))
            }
            Err(_) => {
                debug!(?key, "key not found");
                Err(Error::KeyNotFound(key.to_vec()))
            }
        }
    }

    /// Iterate over every stored item in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], TypeCode, &[u8])> {
        self.descriptors
            .iter()
            .map(|d| (self.key_bytes(d), d.type_code, self.array_bytes(d)))
    }

    /// Render a human-readable dump of every item, for debugging.
    pub fn dump(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "version {}.{}, {} item(s), {} byte(s)",
            self.version_major,
            self.version_minor,
            self.len(),
            self.file_size()
        );
        for (key, type_code, bytes) in self.iter() {
            let _ = writeln!(
                out,
                "  {:?} : tag={} len={} bytes",
                String::from_utf8_lossy(key),
                type_code.tag(),
                bytes.len()
            );
        }
        out
    }
}
