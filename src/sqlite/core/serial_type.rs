//! Serial type codes of the record format.
//!
//! | code      | size        | meaning                      |
//! |-----------|-------------|------------------------------|
//! | 0         | 0           | NULL                         |
//! | 1..=6     | 1,2,3,4,6,8 | big-endian signed integer    |
//! | 7         | 8           | big-endian IEEE 754 double   |
//! | 8, 9      | 0           | integer constants 0 and 1    |
//! | 10, 11    | 0           | reserved                     |
//! | even >=12 | (N-12)/2    | BLOB                         |
//! | odd >=13  | (N-13)/2    | TEXT                         |

use crate::sqlite::error::{Error, Result};
use std::fmt;

/// Storage class selected by a serial type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Int8,
    Int16,
    Int24,
    Int32,
    Int48,
    Int64,
    Float64,
    ConstZero,
    ConstOne,
    Reserved,
    Blob,
    Text,
    Invalid,
}

impl Kind {
    /// True for every kind that decodes to [`Value::Integer`].
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Int8
                | Kind::Int16
                | Kind::Int24
                | Kind::Int32
                | Kind::Int48
                | Kind::Int64
                | Kind::ConstZero
                | Kind::ConstOne
        )
    }
}

/// A classified serial type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialType {
    code: u64,
    content_size: u64,
    kind: Kind,
}

impl SerialType {
    /// Classify a code. Total over `u64`; never fails.
    pub fn classify(code: u64) -> Self {
        let (content_size, kind) = match code {
            0 => (0, Kind::Null),
            1 => (1, Kind::Int8),
            2 => (2, Kind::Int16),
            3 => (3, Kind::Int24),
            4 => (4, Kind::Int32),
            5 => (6, Kind::Int48),
            6 => (8, Kind::Int64),
            7 => (8, Kind::Float64),
            8 => (0, Kind::ConstZero),
            9 => (0, Kind::ConstOne),
            10 | 11 => (0, Kind::Reserved),
            n if n >= 12 && n % 2 == 0 => ((n - 12) / 2, Kind::Blob),
            n if n >= 13 => ((n - 13) / 2, Kind::Text),
            _ => (0, Kind::Invalid),
        };
        Self {
            code,
            content_size,
            kind,
        }
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    /// Number of body bytes a field of this type occupies.
    pub fn content_size(&self) -> u64 {
        self.content_size
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Decode a field's bytes. `bytes` must hold at least `content_size` bytes;
    /// anything past that is ignored.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Value<'a>> {
        let content = usize::try_from(self.content_size)
            .ok()
            .and_then(|len| bytes.get(..len))
            .ok_or(Error::FieldLength {
                expected: self.content_size,
                actual: bytes.len(),
            })?;

        let value = match self.kind {
            Kind::Null => Value::Null,
            Kind::Int8 | Kind::Int16 | Kind::Int24 | Kind::Int32 | Kind::Int48 | Kind::Int64 => {
                Value::Integer(be_signed(content))
            }
            Kind::Float64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(content);
                Value::Float(f64::from_be_bytes(buf))
            }
            Kind::ConstZero => Value::Integer(0),
            Kind::ConstOne => Value::Integer(1),
            Kind::Reserved => return Err(Error::ReservedType(self.code)),
            Kind::Blob => Value::Blob(content),
            Kind::Text => Value::Text(std::str::from_utf8(content)?),
            Kind::Invalid => return Err(Error::InvalidSerialType(self.code)),
        };
        Ok(value)
    }
}

/// Sign-extend a big-endian two's complement integer of 1-8 bytes.
fn be_signed(bytes: &[u8]) -> i64 {
    let fill = match bytes.first() {
        Some(&b) if b & 0x80 != 0 => 0xff,
        _ => 0x00,
    };
    let mut buf = [fill; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    i64::from_be_bytes(buf)
}

/// A decoded field value. Blob and text borrow from the record payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Integer(i64),
    Float(f64),
    Blob(&'a [u8]),
    Text(&'a str),
}

impl<'a> Value<'a> {
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Blob(bytes) => {
                for b in bytes.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_sizes() {
        let expected = [
            (0, 0, Kind::Null),
            (1, 1, Kind::Int8),
            (2, 2, Kind::Int16),
            (3, 3, Kind::Int24),
            (4, 4, Kind::Int32),
            (5, 6, Kind::Int48),
            (6, 8, Kind::Int64),
            (7, 8, Kind::Float64),
            (8, 0, Kind::ConstZero),
            (9, 0, Kind::ConstOne),
            (10, 0, Kind::Reserved),
            (11, 0, Kind::Reserved),
        ];
        for (code, size, kind) in expected {
            let st = SerialType::classify(code);
            assert_eq!((st.content_size(), st.kind()), (size, kind), "code {}", code);
        }
    }

    #[test]
    fn test_blob_and_text_sizes() {
        assert_eq!(SerialType::classify(12).kind(), Kind::Blob);
        assert_eq!(SerialType::classify(12).content_size(), 0);
        assert_eq!(SerialType::classify(20).content_size(), 4);
        assert_eq!(SerialType::classify(13).kind(), Kind::Text);
        assert_eq!(SerialType::classify(13).content_size(), 0);
        assert_eq!(SerialType::classify(23).content_size(), 5);

        let huge = SerialType::classify(u64::MAX);
        assert_eq!(huge.kind(), Kind::Text);
        assert_eq!(huge.content_size(), (u64::MAX - 13) / 2);
    }

    #[test]
    fn test_integers_sign_extend() -> Result<()> {
        assert_eq!(SerialType::classify(1).decode(&[0xff])?, Value::Integer(-1));
        assert_eq!(SerialType::classify(1).decode(&[0x7f])?, Value::Integer(127));
        assert_eq!(
            SerialType::classify(2).decode(&[0x80, 0x00])?,
            Value::Integer(-32768)
        );
        assert_eq!(
            SerialType::classify(3).decode(&[0xff, 0xff, 0xfe])?,
            Value::Integer(-2)
        );
        assert_eq!(
            SerialType::classify(3).decode(&[0x01, 0x00, 0x00])?,
            Value::Integer(65536)
        );
        assert_eq!(
            SerialType::classify(4).decode(&[0x00, 0x01, 0x00, 0x00])?,
            Value::Integer(65536)
        );
        assert_eq!(
            SerialType::classify(5).decode(&[0x80, 0, 0, 0, 0, 0])?,
            Value::Integer(-(1 << 47))
        );
        assert_eq!(
            SerialType::classify(6).decode(&i64::MIN.to_be_bytes())?,
            Value::Integer(i64::MIN)
        );
        Ok(())
    }

    #[test]
    fn test_constants_float_blob_text() -> Result<()> {
        assert_eq!(SerialType::classify(0).decode(&[])?, Value::Null);
        assert_eq!(SerialType::classify(8).decode(&[])?, Value::Integer(0));
        assert_eq!(SerialType::classify(9).decode(&[])?, Value::Integer(1));
        assert_eq!(
            SerialType::classify(7).decode(&1.5f64.to_be_bytes())?,
            Value::Float(1.5)
        );
        assert_eq!(
            SerialType::classify(16).decode(&[1, 2])?,
            Value::Blob(&[1, 2])
        );
        assert_eq!(SerialType::classify(19).decode(b"abc")?, Value::Text("abc"));
        Ok(())
    }

    #[test]
    fn test_reserved_and_bad_text_fail() {
        assert!(matches!(
            SerialType::classify(10).decode(&[]),
            Err(Error::ReservedType(10))
        ));
        assert!(matches!(
            SerialType::classify(11).decode(&[]),
            Err(Error::ReservedType(11))
        ));
        assert!(matches!(
            SerialType::classify(15).decode(&[0xff]),
            Err(Error::InvalidText(_))
        ));
    }

    #[test]
    fn test_short_input_is_rejected() {
        assert!(matches!(
            SerialType::classify(4).decode(&[0, 1]),
            Err(Error::FieldLength {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Text("hi").to_string(), "hi");
        assert_eq!(Value::Blob(&[0xde, 0xad]).to_string(), "dead");
    }
}
