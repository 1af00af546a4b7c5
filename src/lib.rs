//! Client-side value codecs for the PostgreSQL extended-query protocol.
//!
//! # Features
//!
//! - **Type registry**: a [`Map`] resolves a type OID, a wire format, and a
//!   value or target shape to an encode or scan plan
//! - **Per-type codecs**: `bool`, `int8`, `float8`, `text`, `timestamptz`,
//!   each covering the binary and text wire formats in both directions
//! - **Nullable wrappers**: [`Bool`], [`Int8`], [`Float8`], [`Text`],
//!   [`Timestamptz`] carry SQL NULL (and the timestamp infinities) as
//!   first-class values, with JSON and SQL-driver bridges
//! - **Parameter builder**: [`ExtendedQueryBuilder`] accumulates one
//!   message's parameter formats and payloads in a reusable buffer
//!
//! This crate performs no I/O: the enclosing protocol layer supplies a type
//! OID for each bound parameter and a payload for each returned column.
//!
//! # Example
//!
//! ```
//! use pgcodec::{oid, ExtendedQueryBuilder, FormatCode, Map, ScanTarget, Value};
//!
//! let map = Map::new();
//!
//! // Encode parameters for one query.
//! let mut builder = ExtendedQueryBuilder::new();
//! builder.append_param(&map, oid::BOOL, &Value::Bool(true))?;
//! builder.append_param(&map, oid::FLOAT8, &Value::Null)?;
//! builder.append_result_format(FormatCode::Binary);
//! assert_eq!(builder.param_value(0), Some(&[1_u8][..]));
//! assert_eq!(builder.param_value(1), None);
//!
//! // Scan a returned column.
//! let mut count = 0_i64;
//! map.scan(
//!     oid::INT8,
//!     FormatCode::Binary,
//!     Some(&7_i64.to_be_bytes()),
//!     &mut ScanTarget::Int8(&mut count),
//! )?;
//! assert_eq!(count, 7);
//!
//! builder.reset();
//! # Ok::<(), pgcodec::Error>(())
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;
pub mod wire;

pub use builder::{choose_parameter_format_code, ExtendedQueryBuilder};
pub use codec::bool::{Bool, BoolCodec};
pub use codec::float8::{Float8, Float8Codec};
pub use codec::int8::{Int8, Int8Codec};
pub use codec::text::{Text, TextCodec};
pub use codec::timestamptz::{InfinityModifier, Timestamptz, TimestamptzCodec};
pub use codec::{Codec, EncodePlan, ScanPlan};
pub use error::{Error, Result};
pub use registry::{Map, PgType};
pub use types::{oid, FormatCode, Oid};
pub use value::{DriverValue, IsNull, ScanTarget, Value};
