//! Parse- and bind-time errors.
//!
//! Both are recoverable and surface before any value is decoded. Decode
//! and encode failures are `codec_core::DecodeError` / `EncodeError`.

use codec_core::{DecodeError, DescriptorKind, EncodeError, Uuid};
use thiserror::Error;

/// Malformed descriptor stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The stream ended early or a node left unread bytes.
    #[error("malformed descriptor: {0}")]
    Malformed(#[from] DecodeError),

    /// A tag below the annotation range that the dialect does not define.
    #[error("unknown descriptor tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("invalid cardinality byte 0x{0:02x}")]
    InvalidCardinality(u8),

    /// A child index that does not point into the already-parsed prefix.
    #[error("descriptor reference {index} out of range ({available} parsed)")]
    InvalidReference { index: u16, available: usize },

    #[error("array descriptor with {0} dimensions")]
    InvalidDimensions(u16),

    #[error("invalid compound operator {0}")]
    InvalidCompoundOp(u8),

    /// The stream held only annotations.
    #[error("descriptor stream has no type node")]
    MissingRoot,

    /// The root node's id differs from the type id the server announced.
    #[error("descriptor announced as {expected} but its root is {found}")]
    IdMismatch { expected: Uuid, found: Uuid },
}

/// A descriptor tree could not be matched against a target shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("unsupported scalar type {0}")]
    UnsupportedScalar(Uuid),

    #[error("at `{path}`: expected {expected}, target is {found}")]
    ShapeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("record `{record}` has no member for field `{field}`")]
    MissingMember { field: String, record: String },

    /// An optional field bound to a member that cannot hold "no value".
    #[error("at `{path}`: field is optional but target {found} is not")]
    Cardinality { path: String, found: String },

    #[error("at `{path}`: tuple element {index} is not a scalar")]
    NonScalarTupleElement { path: String, index: usize },

    #[error("ranges over {0} are not supported")]
    UnsupportedRangeType(String),

    #[error("{0} descriptors cannot be bound to a value")]
    NotBindable(DescriptorKind),
}

/// Any failure from the codec engine, for callers that want a single type.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
