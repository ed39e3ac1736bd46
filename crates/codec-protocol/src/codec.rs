//! The bound codec tree.
//!
//! A [`Codec`] mirrors exactly one descriptor node and is immutable once
//! built by the binder. Decoding and encoding are pure functions of the
//! codec and the buffer; nothing is carried between calls.
//!
//! Every codec works on the *payload* of one value. Containers strip the
//! u32 data length of each element and hand the child a nested reader that
//! must be consumed exactly, see [`decode_element`] / [`encode_element`].

use codec_core::{DecodeError, EncodeError, Reader, Uuid, Value, Writer};

use crate::compound_codec::{ArrayCodec, NamedTupleCodec, ObjectCodec, RangeCodec, TupleCodec};
use crate::scalar_codec::ScalarCodec;
use crate::wire_types::NULL_LENGTH;

#[derive(Debug, Clone, PartialEq)]
pub enum Codec {
    Scalar(ScalarCodec),
    Array(ArrayCodec),
    Set(ArrayCodec),
    Tuple(TupleCodec),
    /// Named tuples and dialect 2 SQL records.
    NamedTuple(NamedTupleCodec),
    /// Output object shapes and input shapes.
    Object(ObjectCodec),
    Range(RangeCodec),
    MultiRange(RangeCodec),
}

impl Codec {
    /// Identity of the descriptor this codec was bound from.
    pub fn id(&self) -> Uuid {
        match self {
            Codec::Scalar(c) => c.id,
            Codec::Array(c) | Codec::Set(c) => c.id,
            Codec::Tuple(c) => c.id,
            Codec::NamedTuple(c) => c.id,
            Codec::Object(c) => c.id,
            Codec::Range(c) | Codec::MultiRange(c) => c.id,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Codec::Scalar(_))
    }

    /// Decode one value payload.
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Value, DecodeError> {
        match self {
            Codec::Scalar(c) => c.decode(r),
            Codec::Array(c) => c.decode(r).map(Value::Array),
            Codec::Set(c) => c.decode(r).map(Value::Set),
            Codec::Tuple(c) => c.decode(r),
            Codec::NamedTuple(c) => c.decode(r),
            Codec::Object(c) => c.decode(r),
            Codec::Range(c) => c.decode_range(r).map(Value::Range),
            Codec::MultiRange(c) => c.decode_multi(r).map(Value::MultiRange),
        }
    }

    /// Decode into existing storage. Record-producing codecs write only the
    /// fields present on the wire; everything else replaces `out`.
    pub fn decode_into(&self, r: &mut Reader<'_>, out: &mut Value) -> Result<(), DecodeError> {
        match self {
            Codec::NamedTuple(c) => c.decode_into(r, out),
            Codec::Object(c) => c.decode_into(r, out),
            _ => {
                *out = self.decode(r)?;
                Ok(())
            }
        }
    }

    /// Append one value payload.
    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        match self {
            Codec::Scalar(c) => c.encode(w, v),
            Codec::Array(c) | Codec::Set(c) => c.encode(w, v),
            Codec::Tuple(c) => c.encode(w, v),
            Codec::NamedTuple(c) => c.encode(w, v),
            Codec::Object(c) => c.encode(w, v),
            Codec::Range(c) => match v {
                Value::Range(range) => c.encode_range(w, range),
                other => Err(mismatch("range", other)),
            },
            Codec::MultiRange(c) => match v {
                Value::MultiRange(ranges) => c.encode_multi(w, ranges),
                other => Err(mismatch("multirange", other)),
            },
        }
    }
}

/// Read a length-prefixed element. `Ok(None)` for the absent marker.
pub fn decode_element(codec: &Codec, r: &mut Reader<'_>) -> Result<Option<Value>, DecodeError> {
    match pop_element(r)? {
        Some(mut payload) => {
            let value = codec.decode(&mut payload)?;
            payload.finish()?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Like [`decode_element`] but the absent marker is an error.
pub fn decode_required(codec: &Codec, r: &mut Reader<'_>, what: &str) -> Result<Value, DecodeError> {
    decode_element(codec, r)?.ok_or_else(|| DecodeError::MissingRequired(what.to_string()))
}

/// Split off one element payload; `None` for the absent marker.
pub(crate) fn pop_element<'a>(r: &mut Reader<'a>) -> Result<Option<Reader<'a>>, DecodeError> {
    let len = r.pop_u32()?;
    if len == NULL_LENGTH {
        return Ok(None);
    }
    r.pop_slice(len as usize).map(Some)
}

/// Write a length-prefixed element; `Value::Null` becomes the absent marker.
pub fn encode_element(codec: &Codec, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
    if v.is_null() {
        w.push_u32(NULL_LENGTH);
        return Ok(());
    }
    w.begin_bytes();
    codec.encode(w, v)?;
    w.end_bytes()
}

/// Like [`encode_element`] but `Value::Null` is rejected.
pub fn encode_required(codec: &Codec, w: &mut Writer, v: &Value, what: &str) -> Result<(), EncodeError> {
    if v.is_null() {
        return Err(EncodeError::MissingRequired(what.to_string()));
    }
    encode_element(codec, w, v)
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> EncodeError {
    EncodeError::ValueMismatch {
        expected,
        found: found.kind_name(),
    }
}
