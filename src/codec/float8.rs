//! PostgreSQL `float8` wrapper and codec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::int8::{int64_value, Int8};
use crate::codec::{Codec, EncodePlan, ScanPlan};
use crate::error::{Error, Result};
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{DriverValue, IsNull, ScanTarget, Value};
use crate::wire;

/// Nullable `float8` value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Float8 {
    /// The double payload, meaningless unless `valid`
    pub value: f64,
    /// False means SQL NULL
    pub valid: bool,
}

impl From<f64> for Float8 {
    fn from(value: f64) -> Self {
        Float8 { value, valid: true }
    }
}

impl From<Option<f64>> for Float8 {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(value) => Float8 { value, valid: true },
            None => Float8::default(),
        }
    }
}

impl Serialize for Float8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if self.valid {
            serializer.serialize_f64(self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for Float8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        Ok(Float8::from(Option::<f64>::deserialize(deserializer)?))
    }
}

impl TryFrom<DriverValue> for Float8 {
    type Error = Error;

    fn try_from(src: DriverValue) -> Result<Self> {
        match src {
            DriverValue::Null => Ok(Float8::default()),
            DriverValue::Float8(value) => Ok(Float8::from(value)),
            DriverValue::Text(s) => parse_float8(s.as_bytes()).map(Float8::from),
            other => Err(Error::conversion(other.type_name(), "Float8")),
        }
    }
}

impl TryFrom<Float8> for DriverValue {
    type Error = Error;

    fn try_from(src: Float8) -> Result<Self> {
        if !src.valid {
            return Ok(DriverValue::Null);
        }
        Ok(DriverValue::Float8(src.value))
    }
}

fn parse_float8(bytes: &[u8]) -> Result<f64> {
    let s =
        simdutf8::compat::from_utf8(bytes).map_err(|_| Error::invalid_text("float8", bytes))?;
    s.parse().map_err(|_| Error::invalid_text("float8", bytes))
}

/// Render a double the way the server spells it in text format: shortest
/// round-trippable decimal, with `NaN`, `Infinity` and `-Infinity` for the
/// non-finite values.
fn format_float8(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

/// Reject doubles that do not survive the round trip through i64.
fn to_int64(value: f64) -> Result<i64> {
    let truncated = value as i64;
    if value != truncated as f64 {
        return Err(Error::lossy_conversion(value, "i64"));
    }
    Ok(truncated)
}

/// The double-precision shapes on the encode side.
fn float64_value(value: &Value) -> Option<Float8> {
    match value {
        Value::Float8(v) => Some(Float8::from(*v)),
        Value::Float8Value(v) => Some(*v),
        _ => None,
    }
}

/// Codec for the `float8` type.
///
/// Binary payload is an 8-byte IEEE-754 double, bit pattern in big-endian
/// order; text payload is the shortest round-trippable decimal rendering.
/// Int64-producing values widen to double on encode; an Int64-accepting
/// target requires the decoded double to be exactly integral.
#[derive(Debug)]
pub struct Float8Codec;

impl Codec for Float8Codec {
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
                Value::Float8(_) => Some(&EncodeFloat8Binary),
                Value::Float8Value(_) => Some(&EncodeFloat8ValueBinary),
                Value::Int8(_) | Value::Int8Value(_) => Some(&EncodeInt64Binary),
                _ => None,
            },
            FormatCode::Text => match value {
                Value::Float8(_) => Some(&EncodeFloat8Text),
                Value::Float8Value(_) => Some(&EncodeFloat8ValueText),
                Value::Int8(_) | Value::Int8Value(_) => Some(&EncodeInt64Text),
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
                ScanTarget::Float8(_) => Some(&ScanBinaryToFloat8),
                ScanTarget::Float8Value(_) => Some(&ScanBinaryToFloat8Value),
                ScanTarget::Int8(_) | ScanTarget::Int8Value(_) => Some(&ScanBinaryToInt64),
                _ => None,
            },
            FormatCode::Text => match target {
                ScanTarget::Float8(_) => Some(&ScanTextToFloat8),
                ScanTarget::Float8Value(_) => Some(&ScanTextToFloat8Value),
                ScanTarget::Int8(_) | ScanTarget::Int8Value(_) => Some(&ScanTextToInt64),
                _ => None,
            },
        }
    }
}

struct EncodeFloat8Binary;

impl EncodePlan for EncodeFloat8Binary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Float8(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        wire::put_f64(buf, *v);
        Ok(IsNull::No)
    }
}

struct EncodeFloat8Text;

impl EncodePlan for EncodeFloat8Text {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Float8(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        buf.extend_from_slice(format_float8(*v).as_bytes());
        Ok(IsNull::No)
    }
}

struct EncodeFloat8ValueBinary;

impl EncodePlan for EncodeFloat8ValueBinary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(n) = float64_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        wire::put_f64(buf, n.value);
        Ok(IsNull::No)
    }
}

struct EncodeFloat8ValueText;

impl EncodePlan for EncodeFloat8ValueText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(n) = float64_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        buf.extend_from_slice(format_float8(n.value).as_bytes());
        Ok(IsNull::No)
    }
}

struct EncodeInt64Binary;

impl EncodePlan for EncodeInt64Binary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(n) = int64_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        wire::put_f64(buf, n.value as f64);
        Ok(IsNull::No)
    }
}

struct EncodeInt64Text;

impl EncodePlan for EncodeInt64Text {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(n) = int64_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !n.valid {
            return Ok(IsNull::Yes);
        }
        buf.extend_from_slice(n.value.to_string().as_bytes());
        Ok(IsNull::No)
    }
}

fn decode_binary(src: &[u8]) -> Result<f64> {
    wire::get_f64(src).ok_or_else(|| Error::invalid_length("float8", src.len()))
}

struct ScanBinaryToFloat8;

impl ScanPlan for ScanBinaryToFloat8 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Float8(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("f64"))?;
        **out = decode_binary(src)?;
        Ok(())
    }
}

struct ScanTextToFloat8;

impl ScanPlan for ScanTextToFloat8 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Float8(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("f64"))?;
        **out = parse_float8(src)?;
        Ok(())
    }
}

struct ScanBinaryToFloat8Value;

impl ScanPlan for ScanBinaryToFloat8Value {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Float8Value(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Float8::default(),
            Some(src) => **out = Float8::from(decode_binary(src)?),
        }
        Ok(())
    }
}

struct ScanTextToFloat8Value;

impl ScanPlan for ScanTextToFloat8Value {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Float8Value(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Float8::default(),
            Some(src) => **out = Float8::from(parse_float8(src)?),
        }
        Ok(())
    }
}

/// Store a decoded double into an Int64-accepting target.
fn store_int64(decoded: Option<f64>, target: &mut ScanTarget) -> Result<()> {
    match target {
        ScanTarget::Int8(out) => {
            let v = decoded.ok_or_else(|| Error::null_not_allowed("i64"))?;
            **out = to_int64(v)?;
            Ok(())
        }
        ScanTarget::Int8Value(out) => {
            match decoded {
                None => **out = Int8::default(),
                Some(v) => **out = Int8::from(to_int64(v)?),
            }
            Ok(())
        }
        _ => Err(Error::TargetTypeChanged),
    }
}

struct ScanBinaryToInt64;

impl ScanPlan for ScanBinaryToInt64 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let decoded = src.map(decode_binary).transpose()?;
        store_int64(decoded, target)
    }
}

struct ScanTextToInt64;

impl ScanPlan for ScanTextToInt64 {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let decoded = src.map(parse_float8).transpose()?;
        store_int64(decoded, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn test_encode_binary() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(oid::FLOAT8, FormatCode::Binary, &Value::Float8(3.0), &mut buf)
            .unwrap();
        assert_eq!(buf, [0x40, 0x08, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_text() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(oid::FLOAT8, FormatCode::Text, &Value::Float8(1.5), &mut buf)
            .unwrap();
        assert_eq!(buf, b"1.5");
    }

    #[test]
    fn test_encode_text_nonfinite() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(
            oid::FLOAT8,
            FormatCode::Text,
            &Value::Float8(f64::NEG_INFINITY),
            &mut buf,
        )
        .unwrap();
        assert_eq!(buf, b"-Infinity");
    }

    #[test]
    fn test_encode_int64_widens() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(
            oid::FLOAT8,
            FormatCode::Binary,
            &Value::Int8Value(Int8::from(3)),
            &mut buf,
        )
        .unwrap();
        assert_eq!(buf, 3.0_f64.to_be_bytes());
    }

    #[test]
    fn test_scan_binary() {
        let map = Map::new();
        let mut out = 0.0_f64;
        map.scan(
            oid::FLOAT8,
            FormatCode::Binary,
            Some(&3.0_f64.to_be_bytes()),
            &mut ScanTarget::Float8(&mut out),
        )
        .unwrap();
        assert_eq!(out, 3.0);
    }

    #[test]
    fn test_scan_binary_into_int64() {
        let map = Map::new();
        let mut out = Int8::default();
        map.scan(
            oid::FLOAT8,
            FormatCode::Binary,
            Some(&3.0_f64.to_be_bytes()),
            &mut ScanTarget::Int8Value(&mut out),
        )
        .unwrap();
        assert_eq!(out, Int8::from(3));
    }

    #[test]
    fn test_scan_text_into_int64_lossy() {
        let map = Map::new();
        let mut out = Int8::default();
        let err = map
            .scan(
                oid::FLOAT8,
                FormatCode::Text,
                Some(b"1.5"),
                &mut ScanTarget::Int8Value(&mut out),
            )
            .unwrap_err();
        assert!(matches!(err, Error::LossyConversion { .. }));
        assert_eq!(out, Int8::default());
    }

    #[test]
    fn test_scan_invalid_length() {
        let map = Map::new();
        let mut out = 0.0_f64;
        let err = map
            .scan(
                oid::FLOAT8,
                FormatCode::Binary,
                Some(&[0; 4]),
                &mut ScanTarget::Float8(&mut out),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLength { len: 4, .. }));
    }

    #[test]
    fn test_scan_text_permissive() {
        let map = Map::new();
        let mut out = 0.0_f64;
        map.scan(
            oid::FLOAT8,
            FormatCode::Text,
            Some(b"NaN"),
            &mut ScanTarget::Float8(&mut out),
        )
        .unwrap();
        assert!(out.is_nan());
    }

    #[test]
    fn test_json() {
        assert_eq!(serde_json::to_string(&Float8::from(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Float8::default()).unwrap(), "null");
        assert_eq!(
            serde_json::from_str::<Float8>("1.5").unwrap(),
            Float8::from(1.5)
        );
    }
}
