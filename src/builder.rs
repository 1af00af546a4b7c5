//! Parameter accumulator for one extended-query message.

use std::ops::Range;

use crate::error::Result;
use crate::registry::Map;
use crate::types::{FormatCode, Oid};
use crate::value::{IsNull, Value};

/// Capacity retained for the parameter and format sequences across resets.
const MAX_POOLED_PARAMS: usize = 64;
/// Capacity retained for the shared payload buffer across resets.
const MAX_POOLED_VALUE_BYTES: usize = 256;

/// Accumulates the parameter format codes, encoded parameter payloads, and
/// result format codes for one upcoming extended-query message.
///
/// Payloads are appended contiguously into one shared backing buffer and
/// recorded as ranges into it, so a message's parameters stay local in
/// memory and the allocations are reused across queries. The order of
/// [`append_param`](Self::append_param) calls defines each parameter's
/// index in the outgoing message.
#[derive(Debug, Default)]
pub struct ExtendedQueryBuilder {
    param_formats: Vec<FormatCode>,
    param_values: Vec<Option<Range<usize>>>,
    param_value_bytes: Vec<u8>,
    result_formats: Vec<FormatCode>,
}

impl ExtendedQueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `value` as the next parameter.
    ///
    /// The format code is chosen per [`choose_parameter_format_code`] and
    /// recorded alongside the payload. On error nothing is recorded and the
    /// shared buffer is restored, as if the call never happened; the caller
    /// should [`reset`](Self::reset) and rebuild the whole parameter
    /// sequence before retrying the query.
    pub fn append_param(&mut self, map: &Map, oid: Oid, value: &Value) -> Result<()> {
        let format = choose_parameter_format_code(map, oid, value);

        let start = self.param_value_bytes.len();
        match map.encode(oid, format, value, &mut self.param_value_bytes) {
            Ok(IsNull::No) => {
                self.param_formats.push(format);
                self.param_values.push(Some(start..self.param_value_bytes.len()));
                Ok(())
            }
            Ok(IsNull::Yes) => {
                self.param_value_bytes.truncate(start);
                self.param_formats.push(format);
                self.param_values.push(None);
                Ok(())
            }
            Err(err) => {
                self.param_value_bytes.truncate(start);
                Err(err)
            }
        }
    }

    /// Record one result format code.
    pub fn append_result_format(&mut self, format: FormatCode) {
        self.result_formats.push(format);
    }

    /// Ready the builder for the next query.
    ///
    /// Lengths drop to zero. Any sequence whose capacity grew beyond its
    /// threshold is reallocated at the threshold, so a single large query
    /// does not pin its allocations forever; otherwise the existing
    /// allocations are reused.
    pub fn reset(&mut self) {
        self.param_formats.clear();
        self.param_values.clear();
        self.param_value_bytes.clear();
        self.result_formats.clear();

        if self.param_formats.capacity() > MAX_POOLED_PARAMS {
            self.param_formats = Vec::with_capacity(MAX_POOLED_PARAMS);
        }
        if self.param_values.capacity() > MAX_POOLED_PARAMS {
            self.param_values = Vec::with_capacity(MAX_POOLED_PARAMS);
        }
        if self.param_value_bytes.capacity() > MAX_POOLED_VALUE_BYTES {
            self.param_value_bytes = Vec::with_capacity(MAX_POOLED_VALUE_BYTES);
        }
        if self.result_formats.capacity() > MAX_POOLED_PARAMS {
            self.result_formats = Vec::with_capacity(MAX_POOLED_PARAMS);
        }
    }

    /// Number of parameters appended so far.
    pub fn param_count(&self) -> usize {
        self.param_values.len()
    }

    /// The format code of each appended parameter, in order.
    pub fn param_formats(&self) -> &[FormatCode] {
        &self.param_formats
    }

    /// The payload of the parameter at `index`; `None` is SQL NULL.
    ///
    /// The slice borrows the shared buffer and is invalidated by the next
    /// mutating call.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.param_count()`.
    pub fn param_value(&self, index: usize) -> Option<&[u8]> {
        self.param_values[index]
            .as_ref()
            .map(|range| &self.param_value_bytes[range.clone()])
    }

    /// All parameter payloads, in order; `None` is SQL NULL.
    pub fn param_values(&self) -> impl Iterator<Item = Option<&[u8]>> {
        self.param_values
            .iter()
            .map(|v| v.as_ref().map(|range| &self.param_value_bytes[range.clone()]))
    }

    /// The recorded result format codes, in order.
    pub fn result_formats(&self) -> &[FormatCode] {
        &self.result_formats
    }
}

/// Choose the wire format for one parameter.
///
/// Binary when the registered codec prefers binary and recognizes the
/// value's shape in binary format; text otherwise. Text is the safe
/// interoperability format, so an unregistered OID or an unrecognized shape
/// falls back to it.
pub fn choose_parameter_format_code(map: &Map, oid: Oid, value: &Value) -> FormatCode {
    if let Some(ty) = map.type_for_oid(oid) {
        if ty.codec.preferred_format() == FormatCode::Binary
            && ty
                .codec
                .plan_encode(map, oid, FormatCode::Binary, value)
                .is_some()
        {
            return FormatCode::Binary;
        }
    }
    FormatCode::Text
}
