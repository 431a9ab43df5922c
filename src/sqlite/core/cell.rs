//! Table B-tree leaf cells.
//!
//! A cell is `varint(record size) | varint(rowid) | record payload`. Each step
//! needs the length of the one before it, so the reader resolves them strictly
//! in that order and a [`Cell`] only exists once all three are known.

use super::record::Record;
use super::varint::{Varint, MAX_VARINT_LEN};
use crate::sqlite::error::{Error, Result};
use crate::sqlite::source::ByteSource;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    offset: u64,
    record_size: u64,
    row_id: u64,
    payload_offset: u64,
    payload: Vec<u8>,
}

impl Cell {
    /// Reads the cell starting at absolute file offset `offset`.
    pub fn read<S: ByteSource + ?Sized>(source: &S, offset: u64) -> Result<Self> {
        let (record_size, size_len) = read_varint_at(source, offset)?;
        let row_id_offset = offset + u64::from(size_len);
        let (row_id, row_id_len) = read_varint_at(source, row_id_offset)?;
        let payload_offset = row_id_offset + u64::from(row_id_len);

        let available = source.size()?.saturating_sub(payload_offset);
        let payload_len = usize::try_from(record_size)
            .ok()
            .filter(|_| record_size <= available)
            .ok_or(Error::TruncatedCell {
                offset,
                record_size,
                available,
            })?;
        let payload = source.read_vec_at(payload_offset, payload_len)?;

        debug!(
            "Cell at {}: record size {}, rowid {}, payload at {}",
            offset, record_size, row_id, payload_offset
        );
        Ok(Self {
            offset,
            record_size,
            row_id,
            payload_offset,
            payload,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn record_size(&self) -> u64 {
        self.record_size
    }

    pub fn row_id(&self) -> u64 {
        self.row_id
    }

    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decodes the payload into a record borrowing from this cell.
    pub fn record(&self) -> Result<Record<'_>> {
        Record::decode(&self.payload)
    }
}

/// Decodes one varint from the source. Running off the end of the source is a
/// malformed varint, reported at the offset where it started.
fn read_varint_at<S: ByteSource + ?Sized>(source: &S, offset: u64) -> Result<(u64, u8)> {
    let remaining = source.size()?.saturating_sub(offset);
    let window = source.read_vec_at(offset, remaining.min(MAX_VARINT_LEN as u64) as usize)?;
    window
        .read_varint(0)
        .map_err(|_| Error::MalformedVarint { offset })
}
