//! SQLite Database Header Implementation
//!
//! Handles parsing of the SQLite database header (first 100 bytes of the file)
//! as laid out in the SQLite file format.
//!
//! ## Database Header Format (First 100 bytes)
//!
//! - Bytes 0-15: Header string "SQLite format 3\0"
//! - Bytes 16-17: Page size in bytes (big-endian, 1 means 65536)
//! - Bytes 28-31: Size of database file in pages
//! - Bytes 56-59: Database text encoding (1:UTF-8, 2:UTF-16le, 3:UTF-16be)
//!
//! The remaining fields are not decoded.

use crate::sqlite::error::{Error, Result};
use crate::sqlite::source::ByteSource;
use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::{preceded, tuple};
use nom::IResult;
use tracing::{debug, warn};

/// Represents the SQLite database header (first 100 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHeader {
    magic_ok: bool,
    /// Page size as stored (bytes 16-17)
    page_size: u16,
    /// Size of database file in pages (bytes 28-31)
    database_size: u32,
    /// Database text encoding (bytes 56-59)
    text_encoding: u32,
}

impl DatabaseHeader {
    /// Size of the SQLite database header in bytes
    pub const HEADER_SIZE: usize = 100;

    /// Magic string that should appear at the start of every SQLite file
    const MAGIC_STRING: &'static [u8] = b"SQLite format 3\0";

    /// Reads the header from the start of `source`.
    ///
    /// Fails with [`Error::Truncated`] when the source holds fewer than 100
    /// bytes, and with [`Error::InvalidPageSize`] for an illegal page size.
    pub fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Self> {
        let bytes = source.read_vec_at(0, Self::HEADER_SIZE)?;
        Self::parse(&bytes)
    }

    /// Parses a database header from raw bytes
    pub fn parse(header_bytes: &[u8]) -> Result<Self> {
        let (_, (magic, page_size, database_size, text_encoding)) = fields(header_bytes)?;
        if !Self::is_valid_page_size(page_size) {
            return Err(Error::InvalidPageSize(page_size));
        }

        let header = DatabaseHeader {
            magic_ok: magic == Self::MAGIC_STRING,
            page_size,
            database_size,
            text_encoding,
        };
        if !header.magic_ok {
            warn!("database header is missing the SQLite magic string");
        }

        debug!("Parsed database header: {:?}", header);
        Ok(header)
    }

    /// 512 through 32768 in powers of two; 1 encodes 65536.
    fn is_valid_page_size(page_size: u16) -> bool {
        page_size == 1 || (page_size >= 512 && page_size.is_power_of_two())
    }

    /// Page size exactly as stored in bytes 16-17.
    pub fn page_size(&self) -> u16 {
        self.page_size
    }

    /// Page size in bytes, with the stored value 1 standing for 65536.
    pub fn page_size_bytes(&self) -> u32 {
        match self.page_size {
            1 => 65536,
            n => u32::from(n),
        }
    }

    pub fn database_size(&self) -> u32 {
        self.database_size
    }

    pub fn text_encoding(&self) -> u32 {
        self.text_encoding
    }

    pub fn has_magic(&self) -> bool {
        self.magic_ok
    }

    /// Returns true if the database uses UTF-8 encoding
    pub fn is_utf8(&self) -> bool {
        self.text_encoding == 1
    }
}

fn fields(input: &[u8]) -> IResult<&[u8], (&[u8], u16, u32, u32)> {
    tuple((
        take(16usize),
        be_u16,
        preceded(take(10usize), be_u32),
        preceded(take(24usize), be_u32),
    ))(input)
}
