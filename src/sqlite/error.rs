//! Error taxonomy for the page decoder.
//!
//! Every variant is terminal for the operation that raised it. Nothing here is
//! retried and no partial result is returned alongside an error.

use super::btree::PageType;
use std::str::Utf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Short read against the byte source. Classified as an I/O failure.
    #[error("truncated read: wanted {wanted} bytes at offset {offset}, source holds {size} bytes")]
    Truncated { offset: u64, wanted: u64, size: u64 },

    #[error("malformed varint at offset {offset}")]
    MalformedVarint { offset: u64 },

    #[error("unknown page type 0x{flag:02x} at offset {offset}")]
    UnknownPageType { flag: u8, offset: u64 },

    #[error("invalid page number {0}")]
    InvalidPageNumber(u32),

    #[error("invalid page size {0}: must be a power of two from 512 to 32768, or 1 for 65536")]
    InvalidPageSize(u16),

    /// The page exists but its cells do not use the table leaf layout.
    #[error("page {page_number} is {found:?}, expected a table leaf page")]
    UnexpectedPageType { page_number: u32, found: PageType },

    #[error("cell at offset {offset} declares {record_size} payload bytes but only {available} remain")]
    TruncatedCell {
        offset: u64,
        record_size: u64,
        available: u64,
    },

    #[error("record header of {header_size} bytes ends mid-varint at offset {offset}")]
    RecordHeaderUnderrun { header_size: u64, offset: usize },

    #[error("record header of {header_size} bytes does not fit a {payload_len} byte payload")]
    RecordHeaderOverrun { header_size: u64, payload_len: usize },

    #[error("field {index} needs {content_size} bytes at body offset {start} but the body is {body_len} bytes")]
    RecordBodyOverrun {
        index: usize,
        content_size: u64,
        start: usize,
        body_len: usize,
    },

    #[error("record fields use {used} of {body_len} body bytes")]
    RecordBodyTrailing { used: usize, body_len: usize },

    #[error("reserved serial type {0}")]
    ReservedType(u64),

    #[error("invalid serial type {0}")]
    InvalidSerialType(u64),

    #[error("field needs {expected} bytes, got {actual}")]
    FieldLength { expected: u64, actual: usize },

    #[error("text field is not valid UTF-8: {0}")]
    InvalidText(#[from] Utf8Error),

    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("malformed schema row {row_id}: {reason}")]
    MalformedSchemaRow { row_id: u64, reason: String },

    #[error("binary parse error: {0:?}")]
    Parse(nom::error::ErrorKind),
}

impl Error {
    /// True for failures of the byte source itself, as opposed to format errors.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Truncated { .. })
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Parse(nom::error::ErrorKind::Eof),
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parse(e.code),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
