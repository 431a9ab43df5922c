//! SQLite variable-length integers.
//!
//! A varint is 1-9 bytes, most significant group first. Bytes 1-8 carry seven
//! bits each and use the high bit as a continuation flag; a ninth byte, when
//! reached, carries all eight bits.

use crate::sqlite::error::{Error, Result};

/// Longest possible encoding.
pub const MAX_VARINT_LEN: usize = 9;

/// Utility functions for handling SQLite variable-length integers (varints)
pub trait Varint {
    /// Decode the varint starting at `at`, returning the value and the number
    /// of bytes it occupied.
    fn read_varint(&self, at: usize) -> Result<(u64, u8)>;
}

impl Varint for [u8] {
    fn read_varint(&self, at: usize) -> Result<(u64, u8)> {
        let bytes = self.get(at..).unwrap_or_default();
        let mut value = 0u64;

        for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
            if i == MAX_VARINT_LEN - 1 {
                value = (value << 8) | u64::from(byte);
                return Ok((value, MAX_VARINT_LEN as u8));
            }
            value = (value << 7) | u64::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok((value, i as u8 + 1));
            }
        }

        Err(Error::MalformedVarint { offset: at as u64 })
    }
}

/// Number of bytes `value` occupies when encoded.
pub const fn varint_len(value: u64) -> usize {
    let mut len = 1;
    let mut rest = value >> 7;
    while rest != 0 && len < MAX_VARINT_LEN - 1 {
        rest >>= 7;
        len += 1;
    }
    if rest != 0 {
        MAX_VARINT_LEN
    } else {
        len
    }
}

/// Encode `value` into the front of `buf`, returning the number of bytes
/// written. `buf` must hold at least [`MAX_VARINT_LEN`] bytes.
pub fn write_varint(buf: &mut [u8], value: u64) -> usize {
    let len = varint_len(value);

    if len == MAX_VARINT_LEN {
        buf[8] = value as u8;
        let mut rest = value >> 8;
        for slot in buf[..8].iter_mut().rev() {
            *slot = (rest as u8 & 0x7f) | 0x80;
            rest >>= 7;
        }
        return len;
    }

    let mut rest = value;
    for (i, slot) in buf[..len].iter_mut().rev().enumerate() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        *slot = (rest as u8 & 0x7f) | continuation;
        rest >>= 7;
    }
    len
}

/// Encode `value` into a fresh buffer.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = write_varint(&mut buf, value);
    buf[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_boundaries() -> Result<()> {
        assert_eq!([0x00u8].read_varint(0)?, (0, 1));
        assert_eq!([0x01u8].read_varint(0)?, (1, 1));
        assert_eq!([0x7fu8].read_varint(0)?, (127, 1));
        Ok(())
    }

    #[test]
    fn test_two_byte_boundaries() -> Result<()> {
        assert_eq!([0x81u8, 0x00].read_varint(0)?, (128, 2));
        assert_eq!([0x81u8, 0x01].read_varint(0)?, (129, 2));
        assert_eq!([0xffu8, 0x7f].read_varint(0)?, (16383, 2));
        assert_eq!([0x81u8, 0x80, 0x00].read_varint(0)?, (16384, 3));
        Ok(())
    }

    #[test]
    fn test_ninth_byte_uses_all_eight_bits() -> Result<()> {
        assert_eq!([0xffu8; 9].read_varint(0)?, (u64::MAX, 9));

        let mut bytes = [0x80u8; 9];
        bytes[8] = 0xff;
        assert_eq!(bytes.read_varint(0)?, (0xff, 9));
        Ok(())
    }

    #[test]
    fn test_eight_byte_encoding_stops_on_clear_high_bit() -> Result<()> {
        let mut bytes = [0xffu8; 8];
        bytes[7] = 0x7f;
        assert_eq!(bytes.read_varint(0)?, (0x00ff_ffff_ffff_ffff, 8));
        Ok(())
    }

    #[test]
    fn test_reads_at_offset_and_ignores_trailing_bytes() -> Result<()> {
        let bytes = [0xaa, 0x81, 0x00, 0x05];
        assert_eq!(bytes.read_varint(1)?, (128, 2));
        assert_eq!(bytes.read_varint(3)?, (5, 1));
        Ok(())
    }

    #[test]
    fn test_missing_terminator_is_malformed() {
        assert!(matches!(
            [0x81u8, 0x80].read_varint(0),
            Err(Error::MalformedVarint { offset: 0 })
        ));
        assert!(matches!(
            [0x01u8].read_varint(1),
            Err(Error::MalformedVarint { offset: 1 })
        ));
        assert!(matches!(
            [0xffu8; 8].read_varint(0),
            Err(Error::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_encoded_lengths() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(16383), 2);
        assert_eq!(varint_len(16384), 3);
        assert_eq!(varint_len(0x00ff_ffff_ffff_ffff), 8);
        assert_eq!(varint_len(0x0100_0000_0000_0000), 9);
        assert_eq!(varint_len(u64::MAX), 9);
    }

    #[test]
    fn test_round_trip_across_lengths() -> Result<()> {
        let values = [
            0,
            127,
            128,
            16383,
            16384,
            (1 << 21) - 1,
            1 << 21,
            (1 << 49) + 7,
            0x00ff_ffff_ffff_ffff,
            0x0100_0000_0000_0000,
            u64::MAX,
        ];
        for value in values {
            let bytes = encode_varint(value);
            assert_eq!(bytes.len(), varint_len(value));
            assert_eq!(bytes.read_varint(0)?, (value, bytes.len() as u8));
        }
        Ok(())
    }

    #[test]
    fn test_canonical_bytes_round_trip() -> Result<()> {
        for bytes in [vec![0x00], vec![0x7f], vec![0x81, 0x00], vec![0xff, 0x7f]] {
            let (value, len) = bytes.read_varint(0)?;
            assert_eq!(usize::from(len), bytes.len());
            assert_eq!(encode_varint(value), bytes);
        }
        Ok(())
    }
}
