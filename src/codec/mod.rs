//! Per-type codecs and the plan contract they publish.
//!
//! A codec is the strategy for one PostgreSQL type. Given a format and a
//! value or target shape it hands out an [`EncodePlan`] or [`ScanPlan`];
//! the [`Map`](crate::Map) performs the OID dispatch, the codec performs
//! the shape matching. Plans are stateless statics, so plan selection never
//! allocates.

pub mod bool;
pub mod float8;
pub mod int8;
pub mod text;
pub mod timestamptz;

use std::fmt;

use crate::error::Result;
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{IsNull, ScanTarget, Value};

/// The strategy for encoding one value into payload bytes.
///
/// A plan appends the payload to `buf` and reports whether the value was
/// SQL NULL instead ([`IsNull::Yes`], nothing appended). The caller derives
/// the wire length prefix from the buffer growth.
pub trait EncodePlan: Send + Sync {
    /// Append `value`'s payload to `buf`.
    fn encode(&self, value: &Value, buf: &mut Vec<u8>) -> Result<IsNull>;
}

/// The strategy for interpreting one payload into a target.
///
/// `src` of `None` signals SQL NULL; otherwise the slice holds the entire
/// payload. The plan mutates the target in place and must not partially
/// mutate it on error.
pub trait ScanPlan: Send + Sync {
    /// Interpret `src` into `target`.
    fn scan(&self, src: Option<&[u8]>, target: &mut ScanTarget) -> Result<()>;
}

/// The contract every per-type codec satisfies.
///
/// `plan_encode` and `plan_scan` return `None` when no plan exists for the
/// given format and shape; the registry then falls back per its own rules.
/// Within one codec, a native-shape match takes precedence over a
/// wrapper-shape match by match-arm order.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Whether this codec can convert in the given wire format.
    fn format_supported(&self, format: FormatCode) -> bool;

    /// The format this codec favors when the caller is format-agnostic.
    fn preferred_format(&self) -> FormatCode;

    /// Select an encode plan for `value`, or `None` if its shape is not
    /// convertible in `format`.
    fn plan_encode(
        &self,
        map: &Map,
        oid: Oid,
        format: FormatCode,
        value: &Value,
    ) -> Option<&'static dyn EncodePlan>;

    /// Select a scan plan for `target`, or `None` if its shape is not
    /// convertible in `format`.
    fn plan_scan(
        &self,
        map: &Map,
        oid: Oid,
        format: FormatCode,
        target: &ScanTarget,
    ) -> Option<&'static dyn ScanPlan>;
}
