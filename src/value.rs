//! Value shapes exchanged with the codec layer.
//!
//! The original driver this design follows discovers a parameter's shape by
//! runtime reflection. Here the convertible shapes are a closed sum type:
//! [`Value`] on the encode side and [`ScanTarget`] on the scan side. A codec
//! probes the shape when selecting a plan, and a plan run against a shape it
//! was not selected for fails with
//! [`TargetTypeChanged`](crate::Error::TargetTypeChanged).

use chrono::{DateTime, Utc};

use crate::codec::bool::Bool;
use crate::codec::float8::Float8;
use crate::codec::int8::Int8;
use crate::codec::text::Text;
use crate::codec::timestamptz::Timestamptz;

/// Whether an encode plan produced SQL NULL instead of payload bytes.
///
/// `Yes` corresponds to a wire length prefix of -1 with no payload; the
/// enclosing message writer is responsible for emitting the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsNull {
    /// Payload bytes were appended to the buffer.
    No,
    /// The value is SQL NULL; nothing was appended.
    Yes,
}

/// A parameter value to encode.
///
/// Natives carry the payload directly; the `*Value` variants carry a
/// nullable wrapper, which is how SQL NULL rides through the encode path.
/// `Named` represents one layer of domain-level naming over an inner value
/// (a newtype), and `Ref` one layer of indirection, `None` meaning a nil
/// reference.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// Absent value, encodes as SQL NULL
    Null,
    /// Native boolean
    Bool(bool),
    /// Native 8-byte integer
    Int8(i64),
    /// Native double-precision float
    Float8(f64),
    /// Native string
    Text(&'a str),
    /// Native UTC instant
    Timestamptz(DateTime<Utc>),
    /// Nullable boolean wrapper
    BoolValue(Bool),
    /// Nullable 8-byte integer wrapper
    Int8Value(Int8),
    /// Nullable double wrapper
    Float8Value(Float8),
    /// Nullable string wrapper
    TextValue(&'a Text),
    /// Nullable timestamp-with-time-zone wrapper
    TimestamptzValue(Timestamptz),
    /// One layer of domain-level naming over an inner value
    Named {
        /// Name of the domain-level type, used in error messages
        name: &'a str,
        /// The wrapped value
        value: &'a Value<'a>,
    },
    /// One layer of indirection; `None` is a nil reference
    Ref(Option<&'a Value<'a>>),
}

impl Value<'_> {
    /// Name of this value's shape, for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "i64",
            Value::Float8(_) => "f64",
            Value::Text(_) => "&str",
            Value::Timestamptz(_) => "DateTime<Utc>",
            Value::BoolValue(_) => "Bool",
            Value::Int8Value(_) => "Int8",
            Value::Float8Value(_) => "Float8",
            Value::TextValue(_) => "Text",
            Value::TimestamptzValue(_) => "Timestamptz",
            Value::Named { name, .. } => name,
            Value::Ref(_) => "reference",
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Value::Int8(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Value::Float8(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamptz(value)
    }
}

impl From<Bool> for Value<'_> {
    fn from(value: Bool) -> Self {
        Value::BoolValue(value)
    }
}

impl From<Int8> for Value<'_> {
    fn from(value: Int8) -> Self {
        Value::Int8Value(value)
    }
}

impl From<Float8> for Value<'_> {
    fn from(value: Float8) -> Self {
        Value::Float8Value(value)
    }
}

impl<'a> From<&'a Text> for Value<'a> {
    fn from(value: &'a Text) -> Self {
        Value::TextValue(value)
    }
}

impl From<Timestamptz> for Value<'_> {
    fn from(value: Timestamptz) -> Self {
        Value::TimestamptzValue(value)
    }
}

impl<'a, T> From<Option<T>> for Value<'a>
where
    T: Into<Value<'a>>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A scan destination.
///
/// Natives cannot represent SQL NULL and fail a NULL scan with
/// [`NullNotAllowed`](crate::Error::NullNotAllowed); wrappers become
/// invalid instead. Scan plans mutate the target in place and leave it
/// untouched on error.
#[derive(Debug)]
pub enum ScanTarget<'a> {
    /// Native boolean target
    Bool(&'a mut bool),
    /// Native 8-byte integer target
    Int8(&'a mut i64),
    /// Native double target
    Float8(&'a mut f64),
    /// Native string target
    Text(&'a mut String),
    /// Native UTC instant target
    Timestamptz(&'a mut DateTime<Utc>),
    /// Nullable boolean wrapper target
    BoolValue(&'a mut Bool),
    /// Nullable 8-byte integer wrapper target
    Int8Value(&'a mut Int8),
    /// Nullable double wrapper target
    Float8Value(&'a mut Float8),
    /// Nullable string wrapper target
    TextValue(&'a mut Text),
    /// Nullable timestamp-with-time-zone wrapper target
    TimestamptzValue(&'a mut Timestamptz),
}

impl ScanTarget<'_> {
    /// Name of this target's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScanTarget::Bool(_) => "bool",
            ScanTarget::Int8(_) => "i64",
            ScanTarget::Float8(_) => "f64",
            ScanTarget::Text(_) => "String",
            ScanTarget::Timestamptz(_) => "DateTime<Utc>",
            ScanTarget::BoolValue(_) => "Bool",
            ScanTarget::Int8Value(_) => "Int8",
            ScanTarget::Float8Value(_) => "Float8",
            ScanTarget::TextValue(_) => "Text",
            ScanTarget::TimestamptzValue(_) => "Timestamptz",
        }
    }
}

impl<'a> From<&'a mut bool> for ScanTarget<'a> {
    fn from(target: &'a mut bool) -> Self {
        ScanTarget::Bool(target)
    }
}

impl<'a> From<&'a mut i64> for ScanTarget<'a> {
    fn from(target: &'a mut i64) -> Self {
        ScanTarget::Int8(target)
    }
}

impl<'a> From<&'a mut f64> for ScanTarget<'a> {
    fn from(target: &'a mut f64) -> Self {
        ScanTarget::Float8(target)
    }
}

impl<'a> From<&'a mut String> for ScanTarget<'a> {
    fn from(target: &'a mut String) -> Self {
        ScanTarget::Text(target)
    }
}

impl<'a> From<&'a mut DateTime<Utc>> for ScanTarget<'a> {
    fn from(target: &'a mut DateTime<Utc>) -> Self {
        ScanTarget::Timestamptz(target)
    }
}

impl<'a> From<&'a mut Bool> for ScanTarget<'a> {
    fn from(target: &'a mut Bool) -> Self {
        ScanTarget::BoolValue(target)
    }
}

impl<'a> From<&'a mut Int8> for ScanTarget<'a> {
    fn from(target: &'a mut Int8) -> Self {
        ScanTarget::Int8Value(target)
    }
}

impl<'a> From<&'a mut Float8> for ScanTarget<'a> {
    fn from(target: &'a mut Float8) -> Self {
        ScanTarget::Float8Value(target)
    }
}

impl<'a> From<&'a mut Text> for ScanTarget<'a> {
    fn from(target: &'a mut Text) -> Self {
        ScanTarget::TextValue(target)
    }
}

impl<'a> From<&'a mut Timestamptz> for ScanTarget<'a> {
    fn from(target: &'a mut Timestamptz) -> Self {
        ScanTarget::TimestamptzValue(target)
    }
}

/// A value exchanged with a generic SQL abstraction layer above this crate.
///
/// Every nullable wrapper converts to and from this shape via `TryFrom`,
/// which is how the wrappers interoperate with driver-level row and
/// parameter APIs that do not know the PostgreSQL wire formats.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// 8-byte integer
    Int8(i64),
    /// Double-precision float
    Float8(f64),
    /// String
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// UTC instant
    Timestamptz(DateTime<Utc>),
}

impl DriverValue {
    /// Name of this value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DriverValue::Null => "NULL",
            DriverValue::Bool(_) => "bool",
            DriverValue::Int8(_) => "i64",
            DriverValue::Float8(_) => "f64",
            DriverValue::Text(_) => "String",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Timestamptz(_) => "DateTime<Utc>",
        }
    }
}
