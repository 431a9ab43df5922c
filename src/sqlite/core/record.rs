//! SQLite Record Format Implementation
//!
//! This module handles parsing SQLite records (rows) as laid out in the SQLite file format.
//!
//! ## Record Format
//!
//! A record in SQLite represents a single row of data and consists of:
//!
//! - A header containing:
//!   - Header size (varint), counting the size varint itself
//!   - Serial type codes (sequence of varints)
//! - The body: field contents concatenated in serial type order
//!
//! The number of fields is not stored anywhere; it is however many serial
//! types fit in the header.

use super::serial_type::{Kind, SerialType, Value};
use super::varint::Varint;
use crate::sqlite::error::{Error, Result};
use std::ops::Range;

/// Serial types and body ranges of a record, without the payload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    header_size: u64,
    columns: Vec<(SerialType, Range<usize>)>,
}

impl RecordLayout {
    /// Parses the record header of `payload` and assigns each field its range
    /// of the body. Ranges are relative to the start of the payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header_size, size_len) = payload.read_varint(0)?;
        let header_end = usize::try_from(header_size)
            .ok()
            .filter(|&end| end >= usize::from(size_len) && end <= payload.len())
            .ok_or(Error::RecordHeaderOverrun {
                header_size,
                payload_len: payload.len(),
            })?;

        let header = &payload[..header_end];
        let mut cursor = usize::from(size_len);
        let mut serial_types = Vec::new();
        while cursor < header_end {
            let (code, len) = header
                .read_varint(cursor)
                .map_err(|_| Error::RecordHeaderUnderrun {
                    header_size,
                    offset: cursor,
                })?;
            cursor += usize::from(len);
            serial_types.push(SerialType::classify(code));
        }

        let body_len = payload.len() - header_end;
        let mut start = 0usize;
        let mut columns = Vec::with_capacity(serial_types.len());
        for (index, serial_type) in serial_types.into_iter().enumerate() {
            let end = usize::try_from(serial_type.content_size())
                .ok()
                .and_then(|size| start.checked_add(size))
                .filter(|&end| end <= body_len)
                .ok_or(Error::RecordBodyOverrun {
                    index,
                    content_size: serial_type.content_size(),
                    start,
                    body_len,
                })?;
            columns.push((serial_type, header_end + start..header_end + end));
            start = end;
        }

        if start != body_len {
            return Err(Error::RecordBodyTrailing {
                used: start,
                body_len,
            });
        }

        Ok(Self {
            header_size,
            columns,
        })
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Attaches the layout to the payload it was parsed from.
    pub(crate) fn bind<'a>(&self, payload: &'a [u8]) -> Record<'a> {
        let fields = self
            .columns
            .iter()
            .map(|(serial_type, range)| Field {
                serial_type: *serial_type,
                raw: payload.get(range.clone()).unwrap_or_default(),
            })
            .collect();
        Record {
            header_size: self.header_size,
            fields,
        }
    }
}

/// A decoded record whose fields borrow from the cell payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    header_size: u64,
    fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    /// Decodes a record payload.
    ///
    /// Field sizes must add up to exactly the body length: an overrun fails
    /// with [`Error::RecordBodyOverrun`] and leftover bytes fail with
    /// [`Error::RecordBodyTrailing`]. Nothing is clamped.
    pub fn decode(payload: &'a [u8]) -> Result<Self> {
        Ok(RecordLayout::parse(payload)?.bind(payload))
    }

    /// Length of the record header, including its own size varint.
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field<'a>> {
        self.fields.get(index)
    }

    /// Decodes every field, stopping at the first failure.
    pub fn values(&self) -> Result<Vec<Value<'a>>> {
        self.fields.iter().map(Field::value).collect()
    }
}

/// One column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    serial_type: SerialType,
    raw: &'a [u8],
}

impl<'a> Field<'a> {
    pub fn serial_type(&self) -> u64 {
        self.serial_type.code()
    }

    pub fn content_size(&self) -> u64 {
        self.serial_type.content_size()
    }

    pub fn kind(&self) -> Kind {
        self.serial_type.kind()
    }

    /// The field's bytes inside the record body.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn value(&self) -> Result<Value<'a>> {
        self.serial_type.decode(self.raw)
    }
}
