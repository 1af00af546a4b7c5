//! PostgreSQL `int8` wrapper and codec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, EncodePlan, ScanPlan};
use crate::error::{Error, Result};
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{DriverValue, IsNull, ScanTarget, Value};
use crate::wire;

/// Nullable `int8` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int8 {
    /// The integer payload, meaningless unless `valid`
    pub value: i64,
    /// False means SQL NULL
    pub valid: bool,
}

impl From<i64> for Int8 {
    fn from(value: i64) -> Self {
        Int8 { value, valid: true }
    }
}

impl From<Option<i64>> for Int8 {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(value) => Int8 { value, valid: true },
            None => Int8::default(),
        }
    }
}

impl Serialize for Int8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if self.valid {
            serializer.serialize_i64(self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for Int8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        Ok(Int8::from(Option::<i64>::deserialize(deserializer)?))
    }
}

impl TryFrom<DriverValue> for Int8 {
    type Error = Error;

    fn try_from(src: DriverValue) -> Result<Self> {
        match src {
            DriverValue::Null => Ok(Int8::default()),
            DriverValue::Int8(value) => Ok(Int8::from(value)),
            DriverValue::Text(s) => parse_int8(s.as_bytes()).map(Int8::from),
            other => Err(Error::conversion(other.type_name(), "Int8")),
        }
    }
}

impl TryFrom<Int8> for DriverValue {
    type Error = Error;

    fn try_from(src: Int8) -> Result<Self> {
        if !src.valid {
            return Ok(DriverValue::Null);
        }
        Ok(DriverValue::Int8(src.value))
    }
}

fn parse_int8(bytes: &[u8]) -> Result<i64> {
    let s = simdutf8::compat::from_utf8(bytes).map_err(|_| Error::invalid_text("int8", bytes))?;
    s.parse().map_err(|_| Error::invalid_text("int8", bytes))
}

/// The int64-producing shapes, widened into a wrapper.
pub(crate) fn int64_value(value: &Value) -> Option<Int8> {
    match value {
        Value::Int8(v) => Some(Int8::from(*v)),
        Value::Int8Value(v) => Some(*v),
        _ => None,
    }
}

/// Codec for the `int8` type.
///
/// Binary payload is an 8-byte big-endian two's complement integer; text
/// payload is the decimal string.
#[derive(Debug)]
pub struct Int8Codec;

impl Codec for Int8Codec {
    fn format_supported(&self, _format: FormatCode) -> bool {
        true
    }

    fn preferred_format(&self) -> FormatCode {
        FormatCode::Binary
    }

    fn plan_encode(
        &self,
        _map: &Map,
        _oid: Oid,
        format: FormatCode,
        value: &Value,
    ) -> Option<&'static dyn EncodePlan> {
        match format {
            FormatCode::Binary => match value {
                Value::Int8(_) => Some(&EncodeInt8Binary),
                Value::Int8Value(_) => Some(&EncodeInt8ValueBinary),
                _ => None,
            },
            FormatCode::Text => match value {
                Value::Int8(_) => Some(&EncodeInt8Text),
                Value::Int8Value(_) => Some(&EncodeInt8ValueText),
                _ => None,
            },
        }
    }

    fn plan_scan(
        &self,
        _map: &Map,
        _oid: Oid,
        format: FormatCode,
        target: &ScanTarget,
    ) -> Option<&'static dyn ScanPlan> {
        match format {
            FormatCode::Binary => match target {
                ScanTarget::Int8(_) => Some(&ScanBinaryToInt8),
                ScanTarget::Int8Value(_) => Some(&ScanBinaryToInt8Value),
                _ => None,
            },
            FormatCode::Text => match target {
                ScanTarget::Int8(_) => Some(&ScanTextToInt8),
                ScanTarget::Int8Value(_) => Some(&ScanTextToInt8Value),
                _ => None,
            },
        }
    }
}

struct EncodeInt8Binary;

impl EncodePlan for EncodeInt8Binary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Int8(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        wire::put_i64(buf, *v);
        Ok(IsNull::No)
    }
}

struct EncodeInt8Text;

impl EncodePlan for EncodeInt8Text {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Int8(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        buf.extend_from_slice(v.to_string().as_bytes());
        Ok(IsNull::No)
    }
}

struct EncodeInt8ValueBinary;

impl EncodePlan for EncodeInt8ValueBinary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Int8Value(n) = value else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        wire::put_i64(buf, n.value);
        Ok(IsNull::No)
    }
}

struct EncodeInt8ValueText;

impl EncodePlan for EncodeInt8ValueText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Int8Value(n) = value else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        buf.extend_from_slice(n.value.to_string().as_bytes());
        Ok(IsNull::No)
    }
}

fn decode_binary(src: &[u8]) -> Result<i64> {
    wire::get_i64(src).ok_or_else(|| Error::invalid_length("int8", src.len()))
}

struct ScanBinaryToInt8;

impl ScanPlan for ScanBinaryToInt8 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Int8(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("i64"))?;
        **out = decode_binary(src)?;
        Ok(())
    }
}

struct ScanTextToInt8;

impl ScanPlan for ScanTextToInt8 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Int8(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("i64"))?;
        **out = parse_int8(src)?;
        Ok(())
    }
}

struct ScanBinaryToInt8Value;

impl ScanPlan for ScanBinaryToInt8Value {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Int8Value(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Int8::default(),
            Some(src) => **out = Int8::from(decode_binary(src)?),
        }
        Ok(())
    }
}

struct ScanTextToInt8Value;

impl ScanPlan for ScanTextToInt8Value {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Int8Value(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Int8::default(),
            Some(src) => **out = Int8::from(parse_int8(src)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn test_binary_roundtrip() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(oid::INT8, FormatCode::Binary, &Value::Int8(-42), &mut buf)
            .unwrap();
        assert_eq!(buf.len(), 8);

        let mut out = 0_i64;
        map.scan(
            oid::INT8,
            FormatCode::Binary,
            Some(&buf),
            &mut ScanTarget::Int8(&mut out),
        )
        .unwrap();
        assert_eq!(out, -42);
    }

    #[test]
    fn test_text_roundtrip() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(
            oid::INT8,
            FormatCode::Text,
            &Value::Int8Value(Int8::from(9007)),
            &mut buf,
        )
        .unwrap();
        assert_eq!(buf, b"9007");

        let mut out = Int8::default();
        map.scan(
            oid::INT8,
            FormatCode::Text,
            Some(&buf),
            &mut ScanTarget::Int8Value(&mut out),
        )
        .unwrap();
        assert_eq!(out, Int8::from(9007));
    }

    #[test]
    fn test_scan_invalid_length() {
        let map = Map::new();
        let mut out = 0_i64;
        let err = map
            .scan(
                oid::INT8,
                FormatCode::Binary,
                Some(&[0, 0, 0, 1]),
                &mut ScanTarget::Int8(&mut out),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLength { len: 4, .. }));
    }

    #[test]
    fn test_scan_invalid_text() {
        let map = Map::new();
        let mut out = 0_i64;
        let err = map
            .scan(
                oid::INT8,
                FormatCode::Text,
                Some(b"12.5"),
                &mut ScanTarget::Int8(&mut out),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidText { .. }));
    }

    #[test]
    fn test_null_roundtrip() {
        let map = Map::new();
        let mut buf = Vec::new();
        let is_null = map
            .encode(
                oid::INT8,
                FormatCode::Binary,
                &Value::Int8Value(Int8::default()),
                &mut buf,
            )
            .unwrap();
        assert_eq!(is_null, IsNull::Yes);

        let mut out = Int8::from(5);
        map.scan(
            oid::INT8,
            FormatCode::Binary,
            None,
            &mut ScanTarget::Int8Value(&mut out),
        )
        .unwrap();
        assert!(!out.valid);
    }

    #[test]
    fn test_json() {
        assert_eq!(serde_json::to_string(&Int8::from(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Int8::default()).unwrap(), "null");
        assert_eq!(serde_json::from_str::<Int8>("3").unwrap(), Int8::from(3));
    }
}
