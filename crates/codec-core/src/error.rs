//! Error types for the transcoding primitives.
//!
//! Two families live here:
//! - [`DecodeError`]: the bytes on the wire do not match what the bound codec
//!   expects. This means protocol desync or a prior decode bug, so callers
//!   must treat it as fatal for the connection and never retry.
//! - [`EncodeError`]: a native value could not be written through a codec,
//!   or the writer's length-prefixed regions were used out of order.
//!
//! Parse and bind errors belong to `codec-protocol`.

use thiserror::Error;

/// Protocol corruption detected while decoding.
///
/// None of these are recoverable: the stream position is no longer
/// trustworthy once one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read needed more bytes than remain in the buffer.
    #[error("buffer overread: needed {needed} bytes, {remaining} remaining")]
    Overread { needed: usize, remaining: usize },

    /// A message or element boundary was reached with unread bytes.
    #[error("{remaining} unread bytes at message boundary")]
    TrailingBytes { remaining: usize },

    /// A fixed-width payload had the wrong size.
    #[error("invalid length for {what}: expected {expected}, found {found}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Container element count differs from the bound codec's arity.
    #[error("element count mismatch: expected {expected}, found {found}")]
    ElementCount { expected: usize, found: usize },

    /// Array or set with a dimension count other than 0 or 1.
    #[error("unsupported array dimension count: {0}")]
    InvalidDimensions(u32),

    /// Array bounds that yield a negative element count.
    #[error("invalid array bounds: upper {upper}, lower {lower}")]
    InvalidBounds { upper: i32, lower: i32 },

    /// A required field carried the absent-value marker.
    #[error("required field `{0}` is missing")]
    MissingRequired(String),

    /// Input-shape element index out of range.
    #[error("input shape element index {0} out of range")]
    InvalidIndex(u32),

    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    /// JSON payload with an unknown format marker.
    #[error("unsupported JSON format: {0}")]
    InvalidJsonFormat(u8),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    /// Date/time value outside the representable range.
    #[error("{0} out of range")]
    OutOfRange(&'static str),

    /// `decode_into` was handed storage that does not match the codec.
    #[error("target storage mismatch: expected {0}")]
    StorageMismatch(&'static str),
}

/// Failure while writing a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value variant does not match what the codec writes.
    #[error("cannot encode {found} as {expected}")]
    ValueMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Tuple/record value with the wrong number of elements.
    #[error("element count mismatch: expected {expected}, found {found}")]
    ElementCount { expected: usize, found: usize },

    /// `Null` passed for a required element.
    #[error("required value `{0}` is missing")]
    MissingRequired(String),

    /// A length-prefixed region does not fit in a u32.
    #[error("region of {0} bytes exceeds the u32 length prefix")]
    TooLong(usize),

    /// `end_bytes`/`end_message` without a matching `begin_*`, or a message
    /// closed while a nested region is still open.
    #[error("unbalanced length-prefixed region")]
    UnbalancedRegion,

    /// Date/time value outside the wire range.
    #[error("{0} out of range")]
    OutOfRange(&'static str),
}
