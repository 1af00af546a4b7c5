//! OID-indexed codec registry and the top-level encode and scan entry
//! points.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::codec::bool::BoolCodec;
use crate::codec::float8::Float8Codec;
use crate::codec::int8::Int8Codec;
use crate::codec::text::TextCodec;
use crate::codec::timestamptz::TimestamptzCodec;
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::types::{oid, FormatCode, Oid};
use crate::value::{IsNull, ScanTarget, Value};

/// A registered PostgreSQL type: its OID, its name, and the codec that
/// converts it.
#[derive(Debug)]
pub struct PgType {
    /// The type's OID
    pub oid: Oid,
    /// The type's name, as it appears in `pg_type`
    pub name: String,
    /// The codec handling this type's wire formats
    pub codec: Box<dyn Codec>,
}

impl PgType {
    /// Create a type descriptor.
    pub fn new(oid: Oid, name: impl Into<String>, codec: Box<dyn Codec>) -> Self {
        PgType {
            oid,
            name: name.into(),
            codec,
        }
    }
}

/// The codec registry.
///
/// One `Map` belongs to a session, or is shared by a pool once
/// registration has finished: `register` must only be called during
/// initialization, after which lookups are read-only and data-race-free.
#[derive(Debug)]
pub struct Map {
    types: HashMap<Oid, PgType>,
}

impl Map {
    /// Create a registry with the built-in codecs registered.
    pub fn new() -> Self {
        let mut map = Map {
            types: HashMap::new(),
        };
        map.register(PgType::new(oid::BOOL, "bool", Box::new(BoolCodec)));
        map.register(PgType::new(oid::INT8, "int8", Box::new(Int8Codec)));
        map.register(PgType::new(oid::TEXT, "text", Box::new(TextCodec)));
        map.register(PgType::new(oid::FLOAT8, "float8", Box::new(Float8Codec)));
        map.register(PgType::new(oid::VARCHAR, "varchar", Box::new(TextCodec)));
        map.register(PgType::new(
            oid::TIMESTAMPTZ,
            "timestamptz",
            Box::new(TimestamptzCodec),
        ));
        map
    }

    /// Register a type, replacing any previous registration for its OID.
    pub fn register(&mut self, ty: PgType) {
        debug!(oid = ty.oid, name = %ty.name, "registered codec");
        self.types.insert(ty.oid, ty);
    }

    /// Look up the registered type for an OID.
    pub fn type_for_oid(&self, oid: Oid) -> Option<&PgType> {
        self.types.get(&oid)
    }

    /// Encode `value` as a parameter of the type `oid` in `format`,
    /// appending the payload to `buf`.
    ///
    /// `IsNull::Yes` means the value was SQL NULL and nothing was appended.
    /// A nil reference is NULL; a live reference is dereferenced and
    /// retried. When the registered codec has no plan for the value's
    /// shape, one layer of domain-level naming is stripped and the encode
    /// retried. When no codec is registered at all, a string value (after
    /// stripping any naming) passes through verbatim; anything else fails
    /// with [`Error::Serialization`].
    pub fn encode(
        &self,
        oid: Oid,
        format: FormatCode,
        value: &Value,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        match value {
            Value::Null | Value::Ref(None) => return Ok(IsNull::Yes),
            Value::Ref(Some(inner)) => return self.encode(oid, format, inner, buf),
            _ => {}
        }

        if let Some(ty) = self.type_for_oid(oid) {
            if let Some(plan) = ty.codec.plan_encode(self, oid, format, value) {
                return plan.encode(value, buf);
            }
            if let Value::Named { value: inner, .. } = value {
                return self.encode(oid, format, inner, buf);
            }
            return Err(Error::serialization(value.type_name(), oid));
        }

        let mut stripped = value;
        while let Value::Named { value: inner, .. } = stripped {
            stripped = *inner;
        }
        if let Value::Text(s) = stripped {
            trace!(oid, "no codec registered, passing string through verbatim");
            buf.extend_from_slice(s.as_bytes());
            return Ok(IsNull::No);
        }

        Err(Error::serialization(value.type_name(), oid))
    }

    /// Scan the payload `src` of the type `oid` in `format` into `target`.
    ///
    /// `src` of `None` is SQL NULL. Fails with [`Error::CannotScan`] when no
    /// codec is registered for the OID or the codec has no plan for the
    /// target's shape.
    pub fn scan(
        &self,
        oid: Oid,
        format: FormatCode,
        src: Option<&[u8]>,
        target: &mut ScanTarget,
    ) -> Result<()> {
        let ty = self
            .type_for_oid(oid)
            .ok_or_else(|| Error::cannot_scan(oid, format, target.type_name()))?;
        let plan = ty
            .codec
            .plan_scan(self, oid, format, target)
            .ok_or_else(|| Error::cannot_scan(oid, format, target.type_name()))?;
        plan.scan(src, target)
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}
