//! Error types for keyed array store operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected internal error: {0}")]
    Generic(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid open mode: expected 'r' or 'w', got {0:?}")]
    BadMode(char),

    #[error("allocation of {requested} bytes rejected as implausible")]
    NoMemory { requested: u64 },

    #[error("bad file format: {0}")]
    BadFileFormat(String),

    #[error(
        "file version {found}.{minor} is older than the oldest supported major version {oldest}"
    )]
    VersionTooOld {
        found: u16,
        minor: u16,
        oldest: u16,
    },

    #[error(
        "file version {found}.{minor} is newer than the newest supported major version {newest}"
    )]
    VersionTooNew {
        found: u16,
        minor: u16,
        newest: u16,
    },

    #[error("invalid type tag: {0}")]
    BadType(u8),

    #[error("duplicate key: {0:?}")]
    DuplicateKey(Vec<u8>),

    #[error("key must not be empty")]
    EmptyKey,

    #[error("key not found: {0:?}")]
    KeyNotFound(Vec<u8>),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Disambiguate a short read per the format's error taxonomy: a clean EOF means the
/// file is malformed, any other I/O error kind is a genuine I/O failure.
pub(crate) fn map_read_error(err: io::Error, context: &str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::BadFileFormat(format!("{context}: unexpected end of file"))
    } else {
        Error::Io(err)
    }
}
