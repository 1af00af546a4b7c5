//! PostgreSQL `bool` wrapper and codec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, EncodePlan, ScanPlan};
use crate::error::{Error, Result};
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{DriverValue, IsNull, ScanTarget, Value};

/// Nullable `bool` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bool {
    /// The boolean payload, meaningless unless `valid`
    pub value: bool,
    /// False means SQL NULL
    pub valid: bool,
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        Bool { value, valid: true }
    }
}

impl From<Option<bool>> for Bool {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(value) => Bool { value, valid: true },
            None => Bool::default(),
        }
    }
}

impl Serialize for Bool {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if self.valid {
            serializer.serialize_bool(self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for Bool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        Ok(Bool::from(Option::<bool>::deserialize(deserializer)?))
    }
}

impl TryFrom<DriverValue> for Bool {
    type Error = Error;

    fn try_from(src: DriverValue) -> Result<Self> {
        match src {
            DriverValue::Null => Ok(Bool::default()),
            DriverValue::Bool(value) => Ok(Bool::from(value)),
            DriverValue::Text(s) => parse_bool(s.as_bytes()).map(Bool::from),
            DriverValue::Bytes(b) => parse_bool(&b).map(Bool::from),
            other => Err(Error::conversion(other.type_name(), "Bool")),
        }
    }
}

impl TryFrom<Bool> for DriverValue {
    type Error = Error;

    fn try_from(src: Bool) -> Result<Self> {
        if !src.valid {
            return Ok(DriverValue::Null);
        }
        Ok(DriverValue::Bool(src.value))
    }
}

/// Parse the boolean spellings PostgreSQL and its drivers exchange.
pub(crate) fn parse_bool(bytes: &[u8]) -> Result<bool> {
    match bytes {
        b"t" | b"true" | b"TRUE" | b"T" | b"1" => Ok(true),
        b"f" | b"false" | b"FALSE" | b"F" | b"0" => Ok(false),
        _ => Err(Error::invalid_text("bool", bytes)),
    }
}

/// Codec for the `bool` type.
///
/// Binary payload is exactly one byte, `0x01` true and `0x00` false; text
/// payload is exactly one byte, `t` or `f`.
#[derive(Debug)]
pub struct BoolCodec;

impl Codec for BoolCodec {
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
                Value::Bool(_) => Some(&EncodeBoolBinary),
                Value::BoolValue(_) => Some(&EncodeBoolValueBinary),
                _ => None,
            },
            FormatCode::Text => match value {
                Value::Bool(_) => Some(&EncodeBoolText),
                Value::BoolValue(_) => Some(&EncodeBoolValueText),
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
                ScanTarget::Bool(_) => Some(&ScanBinaryToBool),
                ScanTarget::BoolValue(_) => Some(&ScanBinaryToBoolValue),
                _ => None,
            },
            FormatCode::Text => match target {
                ScanTarget::Bool(_) => Some(&ScanTextToBool),
                ScanTarget::BoolValue(_) => Some(&ScanTextToBoolValue),
                _ => None,
            },
        }
    }
}

fn binary_byte(value: bool) -> u8 {
    if value { 1 } else { 0 }
}

fn text_byte(value: bool) -> u8 {
    if value { b't' } else { b'f' }
}

struct EncodeBoolBinary;

impl EncodePlan for EncodeBoolBinary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Bool(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        buf.push(binary_byte(*v));
        Ok(IsNull::No)
    }
}

struct EncodeBoolText;

impl EncodePlan for EncodeBoolText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Bool(v) = value else {
            return Err(Error::TargetTypeChanged);
        };
        buf.push(text_byte(*v));
        Ok(IsNull::No)
    }
}

struct EncodeBoolValueBinary;

impl EncodePlan for EncodeBoolValueBinary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::BoolValue(b) = value else {
            return Err(Error::TargetTypeChanged);
        };
        if !b.valid {
            return Ok(IsNull::Yes);
        }
        buf.push(binary_byte(b.value));
        Ok(IsNull::No)
    }
}

struct EncodeBoolValueText;

impl EncodePlan for EncodeBoolValueText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::BoolValue(b) = value else {
            return Err(Error::TargetTypeChanged);
        };
        if !b.valid {
            return Ok(IsNull::Yes);
        }
        buf.push(text_byte(b.value));
        Ok(IsNull::No)
    }
}

fn decode_binary(src: &[u8]) -> Result<bool> {
    if src.len() != 1 {
        return Err(Error::invalid_length("bool", src.len()));
    }
    Ok(src[0] == 1)
}

fn decode_text(src: &[u8]) -> Result<bool> {
    if src.len() != 1 {
        return Err(Error::invalid_length("bool", src.len()));
    }
    match src[0] {
        b't' => Ok(true),
        b'f' => Ok(false),
        _ => Err(Error::invalid_text("bool", src)),
    }
}

struct ScanBinaryToBool;

impl ScanPlan for ScanBinaryToBool {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Bool(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("bool"))?;
        **out = decode_binary(src)?;
        Ok(())
    }
}

struct ScanTextToBool;

impl ScanPlan for ScanTextToBool {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Bool(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("bool"))?;
        **out = decode_text(src)?;
        Ok(())
    }
}

struct ScanBinaryToBoolValue;

impl ScanPlan for ScanBinaryToBoolValue {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::BoolValue(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Bool::default(),
            Some(src) => **out = Bool::from(decode_binary(src)?),
        }
        Ok(())
    }
}

struct ScanTextToBoolValue;

impl ScanPlan for ScanTextToBoolValue {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::BoolValue(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Bool::default(),
            Some(src) => **out = Bool::from(decode_text(src)?),
        }
        Ok(())
    }
}
