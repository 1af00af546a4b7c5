//! PostgreSQL `timestamptz` wrapper and codec.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, EncodePlan, ScanPlan};
use crate::error::{Error, Result};
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{DriverValue, IsNull, ScanTarget, Value};
use crate::wire;

/// Microseconds from 1970-01-01 00:00:00 UTC to 2000-01-01 00:00:00 UTC.
const MICROS_FROM_UNIX_EPOCH_TO_Y2K: i64 = 946_684_800 * 1_000_000;

/// Binary sentinel for `infinity`.
const INFINITY_MICROS: i64 = i64::MAX;
/// Binary sentinel for `-infinity`.
const NEGATIVE_INFINITY_MICROS: i64 = i64::MIN;

// The server renders the UTC offset at second, minute, or hour precision
// depending on the session time zone. The shapes are told apart by the byte
// at a fixed negative index from the end of the string.
const SECOND_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%::z";
const MINUTE_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";
const HOUR_OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Marks a timestamp as one of the two unbounded sentinel values.
///
/// When the modifier is not `None` the time payload is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfinityModifier {
    /// An ordinary, finite timestamp
    #[default]
    None,
    /// `infinity`, later than every finite timestamp
    Infinity,
    /// `-infinity`, earlier than every finite timestamp
    NegativeInfinity,
}

impl fmt::Display for InfinityModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfinityModifier::None => write!(f, "none"),
            InfinityModifier::Infinity => write!(f, "infinity"),
            InfinityModifier::NegativeInfinity => write!(f, "-infinity"),
        }
    }
}

/// Nullable `timestamptz` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamptz {
    /// The instant, meaningless unless `valid` and `infinity` is `None`
    pub time: DateTime<Utc>,
    /// Sentinel marker for the unbounded values
    pub infinity: InfinityModifier,
    /// False means SQL NULL
    pub valid: bool,
}

impl Timestamptz {
    /// The `infinity` sentinel value.
    pub fn infinity() -> Self {
        Timestamptz {
            infinity: InfinityModifier::Infinity,
            valid: true,
            ..Timestamptz::default()
        }
    }

    /// The `-infinity` sentinel value.
    pub fn negative_infinity() -> Self {
        Timestamptz {
            infinity: InfinityModifier::NegativeInfinity,
            valid: true,
            ..Timestamptz::default()
        }
    }
}

impl Default for Timestamptz {
    fn default() -> Self {
        Timestamptz {
            time: DateTime::UNIX_EPOCH,
            infinity: InfinityModifier::None,
            valid: false,
        }
    }
}

impl From<DateTime<Utc>> for Timestamptz {
    fn from(time: DateTime<Utc>) -> Self {
        Timestamptz {
            time,
            infinity: InfinityModifier::None,
            valid: true,
        }
    }
}

impl From<Option<DateTime<Utc>>> for Timestamptz {
    fn from(time: Option<DateTime<Utc>>) -> Self {
        match time {
            Some(time) => Timestamptz::from(time),
            None => Timestamptz::default(),
        }
    }
}

impl Serialize for Timestamptz {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if !self.valid {
            return serializer.serialize_none();
        }
        match self.infinity {
            InfinityModifier::None => serializer
                .serialize_str(&self.time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            InfinityModifier::Infinity => serializer.serialize_str("infinity"),
            InfinityModifier::NegativeInfinity => serializer.serialize_str("-infinity"),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamptz {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(Timestamptz::default());
        };
        match s.as_str() {
            "infinity" => Ok(Timestamptz::infinity()),
            "-infinity" => Ok(Timestamptz::negative_infinity()),
            s => DateTime::parse_from_rfc3339(s)
                .map(|t| Timestamptz::from(t.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

impl TryFrom<DriverValue> for Timestamptz {
    type Error = Error;

    fn try_from(src: DriverValue) -> Result<Self> {
        match src {
            DriverValue::Null => Ok(Timestamptz::default()),
            DriverValue::Timestamptz(time) => Ok(Timestamptz::from(time)),
            DriverValue::Text(s) => parse_text(s.as_bytes()),
            other => Err(Error::conversion(other.type_name(), "Timestamptz")),
        }
    }
}

impl TryFrom<Timestamptz> for DriverValue {
    type Error = Error;

    fn try_from(src: Timestamptz) -> Result<Self> {
        if !src.valid {
            return Ok(DriverValue::Null);
        }
        match src.infinity {
            InfinityModifier::None => Ok(DriverValue::Timestamptz(src.time)),
            modifier => Ok(DriverValue::Text(modifier.to_string())),
        }
    }
}

/// The timestamp-producing shapes on the encode side.
fn timestamptz_value(value: &Value) -> Option<Timestamptz> {
    match value {
        Value::Timestamptz(t) => Some(Timestamptz::from(*t)),
        Value::TimestamptzValue(t) => Some(*t),
        _ => None,
    }
}

/// Parse the server's text rendering, including the sentinel literals.
fn parse_text(src: &[u8]) -> Result<Timestamptz> {
    match src {
        b"infinity" => return Ok(Timestamptz::infinity()),
        b"-infinity" => return Ok(Timestamptz::negative_infinity()),
        _ => {}
    }

    let s =
        simdutf8::compat::from_utf8(src).map_err(|_| Error::invalid_text("timestamptz", src))?;

    let format = if src.len() >= 9 && (src[src.len() - 9] == b'-' || src[src.len() - 9] == b'+') {
        SECOND_OFFSET_FORMAT
    } else if src.len() >= 6 && (src[src.len() - 6] == b'-' || src[src.len() - 6] == b'+') {
        MINUTE_OFFSET_FORMAT
    } else {
        HOUR_OFFSET_FORMAT
    };

    DateTime::parse_from_str(s, format)
        .map(|t| Timestamptz::from(t.with_timezone(&Utc)))
        .map_err(|_| Error::invalid_text("timestamptz", src))
}

/// The signed microsecond offset from 2000-01-01 00:00:00 UTC carried in the
/// binary format.
fn micros_since_y2k(ts: &Timestamptz) -> Result<i64> {
    match ts.infinity {
        InfinityModifier::None => ts
            .time
            .timestamp_micros()
            .checked_sub(MICROS_FROM_UNIX_EPOCH_TO_Y2K)
            .ok_or_else(|| Error::lossy_conversion(ts.time, "timestamptz")),
        InfinityModifier::Infinity => Ok(INFINITY_MICROS),
        InfinityModifier::NegativeInfinity => Ok(NEGATIVE_INFINITY_MICROS),
    }
}

fn decode_binary(src: &[u8]) -> Result<Timestamptz> {
    let micros =
        wire::get_i64(src).ok_or_else(|| Error::invalid_length("timestamptz", src.len()))?;
    match micros {
        INFINITY_MICROS => Ok(Timestamptz::infinity()),
        NEGATIVE_INFINITY_MICROS => Ok(Timestamptz::negative_infinity()),
        _ => {
            let time = micros
                .checked_add(MICROS_FROM_UNIX_EPOCH_TO_Y2K)
                .and_then(DateTime::from_timestamp_micros)
                .ok_or_else(|| Error::lossy_conversion(micros, "DateTime<Utc>"))?;
            Ok(Timestamptz::from(time))
        }
    }
}

/// Codec for the `timestamptz` type.
///
/// Binary payload is a signed 64-bit big-endian count of microseconds since
/// 2000-01-01 00:00:00 UTC, with `i64::MAX` and `i64::MIN` reserved for the
/// `infinity` and `-infinity` sentinels. Text decoding accepts the sentinel
/// literals and the three offset-suffix renderings; text encoding always
/// renders in UTC, truncated to microseconds, with the second-precision
/// offset form.
#[derive(Debug)]
pub struct TimestamptzCodec;

impl Codec for TimestamptzCodec {
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
        timestamptz_value(value)?;
        match format {
            FormatCode::Binary => Some(&EncodeTimestamptzBinary),
            FormatCode::Text => Some(&EncodeTimestamptzText),
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
                ScanTarget::TimestamptzValue(_) => Some(&ScanBinaryToTimestamptz),
                ScanTarget::Timestamptz(_) => Some(&ScanBinaryToDateTime),
                _ => None,
            },
            FormatCode::Text => match target {
                ScanTarget::TimestamptzValue(_) => Some(&ScanTextToTimestamptz),
                ScanTarget::Timestamptz(_) => Some(&ScanTextToDateTime),
                _ => None,
            },
        }
    }
}

struct EncodeTimestamptzBinary;

impl EncodePlan for EncodeTimestamptzBinary {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(ts) = timestamptz_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !ts.valid {
            return Ok(IsNull::Yes);
        }
        wire::put_i64(buf, micros_since_y2k(&ts)?);
        Ok(IsNull::No)
    }
}

struct EncodeTimestamptzText;

impl EncodePlan for EncodeTimestamptzText {
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull> {
        let Some(ts) = timestamptz_value(value) else {
            return Err(Error::TargetTypeChanged);
        };
        if !ts.valid {
            return Ok(IsNull::Yes);
        }
        match ts.infinity {
            InfinityModifier::None => {
                let micros = ts.time.nanosecond() / 1000 * 1000;
                let truncated = ts
                    .time
                    .with_nanosecond(micros)
                    .unwrap_or(ts.time);
                buf.extend_from_slice(
                    truncated.format(SECOND_OFFSET_FORMAT).to_string().as_bytes(),
                );
            }
            InfinityModifier::Infinity => buf.extend_from_slice(b"infinity"),
            InfinityModifier::NegativeInfinity => buf.extend_from_slice(b"-infinity"),
        }
        Ok(IsNull::No)
    }
}

struct ScanBinaryToTimestamptz;

impl ScanPlan for ScanBinaryToTimestamptz {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::TimestamptzValue(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Timestamptz::default(),
            Some(src) => **out = decode_binary(src)?,
        }
        Ok(())
    }
}

struct ScanTextToTimestamptz;

impl ScanPlan for ScanTextToTimestamptz {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::TimestamptzValue(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        match src {
            None => **out = Timestamptz::default(),
            Some(src) => **out = parse_text(src)?,
        }
        Ok(())
    }
}

/// Store a decoded timestamp into a bare instant, which can represent
/// neither SQL NULL nor the sentinels.
fn store_datetime(ts: Timestamptz, out: &mut DateTime<Utc>) -> Result<()> {
    if ts.infinity != InfinityModifier::None {
        return Err(Error::lossy_conversion(ts.infinity, "DateTime<Utc>"));
    }
    *out = ts.time;
    Ok(())
}

struct ScanBinaryToDateTime;

impl ScanPlan for ScanBinaryToDateTime {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Timestamptz(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("DateTime<Utc>"))?;
        store_datetime(decode_binary(src)?, out)
    }
}

struct ScanTextToDateTime;

impl ScanPlan for ScanTextToDateTime {
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()> {
        let ScanTarget::Timestamptz(out) = target else {
            return Err(Error::TargetTypeChanged);
        };
        let src = src.ok_or_else(|| Error::null_not_allowed("DateTime<Utc>"))?;
        store_datetime(parse_text(src)?, out)
    }
}
