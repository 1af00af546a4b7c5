//! Error types for pgcodec.

use thiserror::Error;

use crate::types::{FormatCode, Oid};

/// Result type for pgcodec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for pgcodec.
///
/// Conversion failures are structured so callers can branch on the kind
/// instead of matching message text. All errors propagate to the caller
/// unchanged; nothing is retried inside the codec layer, and a failed scan
/// leaves its target unmodified.
#[derive(Debug, Error)]
pub enum Error {
    /// No codec is registered for the OID (or the codec offered no plan for
    /// this value shape) and the raw string pass-through does not apply.
    #[error("cannot encode {type_name} into oid {oid}")]
    Serialization {
        /// Name of the value shape that could not be encoded
        type_name: String,
        /// Target type OID
        oid: Oid,
    },

    /// No codec or no scan plan exists for this OID/format/target combination.
    #[error("cannot scan oid {oid} in {format:?} format into {target}")]
    CannotScan {
        /// Source type OID
        oid: Oid,
        /// Wire format of the payload
        format: FormatCode,
        /// Name of the target shape
        target: &'static str,
    },

    /// A binary payload did not have the fixed width the type requires.
    #[error("invalid length for {type_name}: {len}")]
    InvalidLength {
        /// PostgreSQL type name
        type_name: &'static str,
        /// Observed payload length
        len: usize,
    },

    /// A text payload failed the type-specific parser.
    #[error("invalid text value for {type_name}: {text:?}")]
    InvalidText {
        /// PostgreSQL type name
        type_name: &'static str,
        /// The offending payload, lossily decoded
        text: String,
    },

    /// A decoded value cannot be represented exactly in the requested target.
    #[error("cannot losslessly convert {value} into {target}")]
    LossyConversion {
        /// Rendering of the decoded value
        value: String,
        /// Name of the target shape
        target: &'static str,
    },

    /// SQL NULL was scanned into a target that cannot represent null.
    #[error("cannot scan NULL into {target}")]
    NullNotAllowed {
        /// Name of the target shape
        target: &'static str,
    },

    /// A plan was run against a value or target of a different shape than
    /// the one used to select it. Indicates a caller bug.
    #[error("value or target type changed between plan selection and execution")]
    TargetTypeChanged,

    /// A driver-level value could not be converted into the requested shape.
    #[error("cannot convert {from} to {to}")]
    Conversion {
        /// Name of the source shape
        from: &'static str,
        /// Name of the destination shape
        to: &'static str,
    },
}

impl Error {
    pub(crate) fn serialization(type_name: impl Into<String>, oid: Oid) -> Self {
        Error::Serialization {
            type_name: type_name.into(),
            oid,
        }
    }

    pub(crate) fn cannot_scan(oid: Oid, format: FormatCode, target: &'static str) -> Self {
        Error::CannotScan {
            oid,
            format,
            target,
        }
    }

    pub(crate) fn invalid_length(type_name: &'static str, len: usize) -> Self {
        Error::InvalidLength { type_name, len }
    }

    pub(crate) fn invalid_text(type_name: &'static str, text: &[u8]) -> Self {
        Error::InvalidText {
            type_name,
            text: String::from_utf8_lossy(text).into_owned(),
        }
    }

    pub(crate) fn lossy_conversion(value: impl ToString, target: &'static str) -> Self {
        Error::LossyConversion {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn null_not_allowed(target: &'static str) -> Self {
        Error::NullNotAllowed { target }
    }

    pub(crate) fn conversion(from: &'static str, to: &'static str) -> Self {
        Error::Conversion { from, to }
    }
}
