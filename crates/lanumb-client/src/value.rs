use std::fmt;

use lanumb_frame::{FrameError, MalformedReason, PayloadReader};
use tracing::debug;

/// Numeric encoding of a measurement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl TypeTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x10 => Some(Self::U8),
            0x11 => Some(Self::I8),
            0x12 => Some(Self::U16),
            0x13 => Some(Self::I16),
            0x14 => Some(Self::U32),
            0x15 => Some(Self::I32),
            0x16 => Some(Self::F32),
            0x17 => Some(Self::F64),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::U8 => 0x10,
            Self::I8 => 0x11,
            Self::U16 => 0x12,
            Self::I16 => 0x13,
            Self::U32 => 0x14,
            Self::I32 => 0x15,
            Self::F32 => 0x16,
            Self::F64 => 0x17,
        }
    }

    /// Number of value bytes following the tag.
    pub fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// A decoded measurement value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    F64(f64),
    /// The device used a type tag this client does not know. Its numeric
    /// value is 0, which is what devices and existing tooling expect, but
    /// it is kept distinct from a real zero.
    Unrecognized { tag: u8 },
}

impl Value {
    /// The value as a float; 0.0 for [`Value::Unrecognized`].
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::U8(v) => f64::from(v),
            Self::I8(v) => f64::from(v),
            Self::U16(v) => f64::from(v),
            Self::I16(v) => f64::from(v),
            Self::U32(v) => f64::from(v),
            Self::I32(v) => f64::from(v),
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
            Self::Unrecognized { .. } => 0.0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Self::U8(_) => Some(TypeTag::U8),
            Self::I8(_) => Some(TypeTag::I8),
            Self::U16(_) => Some(TypeTag::U16),
            Self::I16(_) => Some(TypeTag::I16),
            Self::U32(_) => Some(TypeTag::U32),
            Self::I32(_) => Some(TypeTag::I32),
            Self::F32(_) => Some(TypeTag::F32),
            Self::F64(_) => Some(TypeTag::F64),
            Self::Unrecognized { .. } => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_tag().map_or("unrecognized", TypeTag::name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Unrecognized { .. } => write!(f, "0"),
        }
    }
}

/// Decode a type tag and the value behind it.
///
/// The value must be the last thing in `reader`: its remaining length has
/// to match the width the tag calls for. Bytes behind an unknown tag are
/// left unread.
pub fn decode_value(reader: &mut PayloadReader<'_>) -> Result<Value, FrameError> {
    let tag = reader.read_u8()?;
    let Some(type_tag) = TypeTag::from_u8(tag) else {
        debug!(tag, "unrecognized value type, using 0");
        return Ok(Value::Unrecognized { tag });
    };

    if reader.remaining() != type_tag.width() {
        return Err(FrameError::Malformed(MalformedReason::ValueLength {
            tag,
            expected: type_tag.width(),
            actual: reader.remaining(),
        }));
    }

    let value = match type_tag {
        TypeTag::U8 => Value::U8(reader.read_u8()?),
        TypeTag::I8 => Value::I8(reader.read_i8()?),
        TypeTag::U16 => Value::U16(reader.read_u16_le()?),
        TypeTag::I16 => Value::I16(reader.read_i16_le()?),
        TypeTag::U32 => Value::U32(reader.read_u32_le()?),
        TypeTag::I32 => Value::I32(reader.read_i32_le()?),
        TypeTag::F32 => Value::F32(reader.read_f32_le()?),
        TypeTag::F64 => Value::F64(reader.read_f64_le()?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Value, FrameError> {
        decode_value(&mut PayloadReader::new(bytes))
    }

    #[test]
    fn float32_one() {
        let value = decode(&[22, 0x00, 0x00, 0x80, 0x3F]).unwrap();
        assert_eq!(value, Value::F32(1.0));
        assert_eq!(value.as_f64(), 1.0);
    }

    #[test]
    fn unsigned_char_max() {
        let value = decode(&[16, 0xFF]).unwrap();
        assert_eq!(value, Value::U8(255));
        assert_eq!(value.as_f64(), 255.0);
    }

    #[test]
    fn signed_long_minus_one() {
        let value = decode(&[21, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(value, Value::I32(-1));
        assert_eq!(value.as_f64(), -1.0);
    }

    #[test]
    fn remaining_widths() {
        assert_eq!(decode(&[17, 0xFE]).unwrap(), Value::I8(-2));
        assert_eq!(decode(&[18, 0x34, 0x12]).unwrap(), Value::U16(0x1234));
        assert_eq!(decode(&[19, 0x00, 0x80]).unwrap(), Value::I16(i16::MIN));
        assert_eq!(
            decode(&[20, 0x78, 0x56, 0x34, 0x12]).unwrap(),
            Value::U32(0x1234_5678)
        );

        let mut f64_bytes = vec![23];
        f64_bytes.extend_from_slice(&(-12.25f64).to_le_bytes());
        assert_eq!(decode(&f64_bytes).unwrap(), Value::F64(-12.25));
    }

    #[test]
    fn unknown_tag_falls_back_to_flagged_zero() {
        let value = decode(&[0x42, 0x01, 0x02]).unwrap();
        assert_eq!(value, Value::Unrecognized { tag: 0x42 });
        assert_eq!(value.as_f64(), 0.0);
        assert!(!value.is_recognized());
        assert_eq!(value.type_name(), "unrecognized");
    }

    #[test]
    fn short_value_is_rejected() {
        let err = decode(&[22, 0x00, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Malformed(MalformedReason::ValueLength {
                tag: 22,
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let err = decode(&[16, 0x01, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Malformed(MalformedReason::ValueLength { .. })
        ));
    }

    #[test]
    fn missing_tag_is_truncation() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Malformed(MalformedReason::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn tag_codes_roundtrip() {
        for code in 0x10..=0x17 {
            let tag = TypeTag::from_u8(code).unwrap();
            assert_eq!(tag.code(), code);
        }
    }
}
