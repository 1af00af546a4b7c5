//! PostgreSQL `text` wrapper and codec.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, EncodePlan, ScanPlan};
use crate::error::{Error, Result};
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{DriverValue, IsNull, ScanTarget, Value};

/// Nullable `text` value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    /// The string payload, meaningless unless `valid`
    pub value: String,
    /// False means SQL NULL
    pub valid: bool,
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text { value, valid: true }
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text {
            value: value.to_owned(),
            valid: true,
        }
    }
}

impl From<Option<String>> for Text {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => Text { value, valid: true },
            None => Text::default(),
        }
    }
}

impl Serialize for Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if self.valid {
            serializer.serialize_str(&self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        Ok(Text::from(Option::<String>::deserialize(deserializer)?))
    }
}

impl TryFrom<DriverValue> for Text {
    type Error = Error;

    fn try_from(src: DriverValue) -> Result<Self> {
        match src {
            DriverValue::Null => Ok(Text::default()),
            DriverValue::Text(s) => Ok(Text::from(s)),
            DriverValue::Bytes(b) => decode_text(&b).map(Text::from),
            other => Err(Error::conversion(other.type_name(), "Text")),
        }
    }
}

impl TryFrom<Text> for DriverValue {
    type Error = Error;

    fn try_from(src: Text) -> Result<Self> {
        if !src.valid {
            return Ok(DriverValue::Null);
        }
        Ok(DriverValue::Text(src.value))
    }
}

fn decode_text(src: &[u8]) -> Result<String> {
    simdutf8::compat::from_utf8(src)
        .map(str::to_owned)
        .map_err(|_| Error::invalid_text("text", src))
}

/// Codec for the `text` family (`text`, `varchar`).
///
/// Both wire formats carry the UTF-8 string bytes verbatim, so the codec
/// prefers text format and its plans do not branch on the format.
#[derive(Debug)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn format_supported(&self, _format: FormatCode) -> bool {
        true
    }

    fn preferred_format(&self) -> FormatCode {
        FormatCode::Text
    }

    fn plan_encode(
        &self,
        _map: &Map,
        _oid: Oid,
        _format: FormatCode,
        value: &Value,
    ) -> Option<&'static dyn EncodePlan> {
        match value {
            Value::Text(_) => Some(&EncodeText),
            Value::TextValue(_) => Some(&EncodeTextValue),
            _ => None,
        }
    }

    fn plan_scan(
        &self,
        _map: &Map,
        _oid: Oid,
        _format: FormatCode,
        target: &ScanTarget,
    ) -> Option<&'static dyn ScanPlan> {
        match target {
            ScanTarget::Text(_) => Some(&ScanToString),
            ScanTarget::TextValue(_) => Some(&ScanToTextValue),
            _ => None,
        }
    }
}

struct EncodeText;

impl EncodePlan for EncodeText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::Text(s) = value else {
            return Err(Error::TargetTypeChanged);
        };
        buf.extend_from_slice(s.as_bytes());
        Ok(IsNull::No)
    }
}

struct EncodeTextValue;

impl EncodePlan for EncodeTextValue {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Value::TextValue(t) = value else {
            return Err(Error::TargetTypeChanged);
        };
        if !t.valid {
            return Ok(IsNull::Yes);
        }
        buf.extend_from_slice(t.value.as_bytes());
        Ok(IsNull::No)
    }
}

struct ScanToString;

impl ScanPlan for ScanToString {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Text(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("String"))?;
        **out = decode_text(src)?;
        Ok(())
    }
}

struct ScanToTextValue;

impl ScanPlan for ScanToTextValue {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::TextValue(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Text::default(),
            Some(src) => **out = Text::from(decode_text(src)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn test_roundtrip() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(oid::TEXT, FormatCode::Text, &Value::Text("hello"), &mut buf)
            .unwrap();
        assert_eq!(buf, b"hello");

        let mut out = String::new();
        map.scan(
            oid::TEXT,
            FormatCode::Text,
            Some(&buf),
            &mut ScanTarget::Text(&mut out),
        )
        .unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_varchar_uses_same_codec() {
        let map = Map::new();
        let mut buf = Vec::new();
        map.encode(
            oid::VARCHAR,
            FormatCode::Binary,
            &Value::Text("abc"),
            &mut buf,
        )
        .unwrap();
        assert_eq!(buf, b"abc");
    }

    #[test]
    fn test_preferred_format_is_text() {
        assert_eq!(TextCodec.preferred_format(), FormatCode::Text);
    }

    #[test]
    fn test_scan_invalid_utf8() {
        let map = Map::new();
        let mut out = String::new();
        let err = map
            .scan(
                oid::TEXT,
                FormatCode::Text,
                Some(&[0xFF, 0xFE]),
                &mut ScanTarget::Text(&mut out),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidText { .. }));
    }

    #[test]
    fn test_wrapper_null() {
        let map = Map::new();
        let mut buf = Vec::new();
        let is_null = map
            .encode(
                oid::TEXT,
                FormatCode::Text,
                &Value::TextValue(&Text::default()),
                &mut buf,
            )
            .unwrap();
        assert_eq!(is_null, IsNull::Yes);

        let mut out = Text::from("old");
        map.scan(
            oid::TEXT,
            FormatCode::Text,
            None,
            &mut ScanTarget::TextValue(&mut out),
        )
        .unwrap();
        assert!(!out.valid);
    }

    #[test]
    fn test_json() {
        assert_eq!(
            serde_json::to_string(&Text::from("hi")).unwrap(),
            "\"hi\""
        );
        assert_eq!(serde_json::to_string(&Text::default()).unwrap(), "null");
    }
}
