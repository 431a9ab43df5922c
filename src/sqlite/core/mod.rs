//! Byte-level codecs of the file format: header, varints, cells and records.

pub mod cell;
pub mod header;
pub mod record;
pub mod schema;
pub mod serial_type;
pub mod varint;
