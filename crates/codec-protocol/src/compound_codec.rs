//! Codecs that compose child codecs.
//!
//! Wire layouts (payload only; the enclosing element length is stripped):
//!
//! ```text
//! Array / Set
//!   dims:u32 (0 or 1)  reserved:u32  reserved:u32
//!   if dims == 1: upper:i32  lower:i32  then n = upper - lower + 1 elements
//!
//! Tuple / NamedTuple / SQL record
//!   count:u32  then per element: reserved:u32  element
//!
//! Object shape (output)
//!   count:u32  then per field: reserved:u32  element | 0xFFFFFFFF (absent)
//!   `__tid__` is skipped as a fixed 20-byte (length + uuid) block
//!
//! Input shape (sparse)
//!   count:u32  then per present field: index:u32  element
//!
//! Range
//!   flags:u8  [lower element]  [upper element]
//!
//! MultiRange
//!   count:u32  then per range: len:u32  range payload
//! ```
//!
//! An "element" is `len:u32` followed by `len` bytes of child payload.

use codec_core::{
    DecodeError, EncodeError, FieldFlags, RangeValue, Reader, Record, StoragePath, Uuid, Value,
    Writer,
};

use crate::codec::{
    decode_required, encode_element, encode_required, mismatch, pop_element, Codec,
};
use crate::wire_types::{range_flags, NULL_LENGTH};

/// Bytes of the `__tid__` element after its reserved word: length + uuid.
const TID_BLOCK_LEN: usize = 20;

/// Upper bound for pre-allocation driven by a wire count.
fn capacity_hint(count: usize, r: &Reader<'_>) -> usize {
    count.min(r.len() / 4)
}

// ============================================================================
// Array / Set
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayCodec {
    pub id: Uuid,
    pub element: Box<Codec>,
}

impl ArrayCodec {
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Vec<Value>, DecodeError> {
        let dims = r.pop_u32()?;
        r.discard(8)?; // reserved

        match dims {
            0 => Ok(Vec::new()),
            1 => {
                let upper = r.pop_i32()?;
                let lower = r.pop_i32()?;
                let n = upper as i64 - lower as i64 + 1;
                if n < 0 {
                    return Err(DecodeError::InvalidBounds { upper, lower });
                }
                let n = n as usize;
                let mut out = Vec::with_capacity(capacity_hint(n, r));
                for _ in 0..n {
                    out.push(decode_required(&self.element, r, "array element")?);
                }
                Ok(out)
            }
            other => Err(DecodeError::InvalidDimensions(other)),
        }
    }

    /// Always one dimension with lower bound 1.
    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        let items = match v {
            Value::Array(items) | Value::Set(items) => items,
            other => return Err(mismatch("array", other)),
        };
        let upper =
            i32::try_from(items.len()).map_err(|_| EncodeError::TooLong(items.len()))?;

        w.push_u32(1);
        w.push_u32(0);
        w.push_u32(0);
        w.push_i32(upper);
        w.push_i32(1);
        for item in items {
            encode_required(&self.element, w, item, "array element")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tuple
// ============================================================================

/// Positional tuple of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleCodec {
    pub id: Uuid,
    pub elements: Vec<Codec>,
}

impl TupleCodec {
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Value, DecodeError> {
        let count = r.pop_u32()? as usize;
        if count != self.elements.len() {
            return Err(DecodeError::ElementCount {
                expected: self.elements.len(),
                found: count,
            });
        }

        let mut out = Vec::with_capacity(count);
        for codec in &self.elements {
            r.discard(4)?; // reserved
            out.push(decode_required(codec, r, "tuple element")?);
        }
        Ok(Value::Tuple(out))
    }

    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        let items = match v {
            Value::Tuple(items) => items,
            other => return Err(mismatch("tuple", other)),
        };
        if items.len() != self.elements.len() {
            return Err(EncodeError::ElementCount {
                expected: self.elements.len(),
                found: items.len(),
            });
        }

        w.push_u32(items.len() as u32);
        for (codec, item) in self.elements.iter().zip(items) {
            w.push_u32(0);
            encode_required(codec, w, item, "tuple element")?;
        }
        Ok(())
    }
}

// ============================================================================
// Named fields (named tuples, SQL records, object shapes)
// ============================================================================

/// Where a named wire field lands in the target record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTarget {
    /// Consumed from the wire and dropped (`__tid__`).
    Skip,
    Slot { path: StoragePath, codec: Codec },
}

fn record_mut(out: &mut Value) -> Result<&mut Record, DecodeError> {
    match out {
        Value::Record(rec) => Ok(rec),
        _ => Err(DecodeError::StorageMismatch("record")),
    }
}

fn store(rec: &mut Record, path: &StoragePath, value: Value) -> Result<(), DecodeError> {
    let slot = rec
        .slot_mut(path.as_slice())
        .ok_or(DecodeError::StorageMismatch("record slot"))?;
    *slot = value;
    Ok(())
}

fn load<'v>(rec: &'v Record, path: &StoragePath, template: &Record) -> Result<&'v Value, EncodeError> {
    rec.slot(path.as_slice()).ok_or(EncodeError::ElementCount {
        expected: template.fields.len(),
        found: rec.fields.len(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTupleField {
    pub name: String,
    pub target: FieldTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTupleCodec {
    pub id: Uuid,
    pub fields: Vec<NamedTupleField>,
    /// Fresh storage for [`NamedTupleCodec::decode`].
    pub template: Record,
}

impl NamedTupleCodec {
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Value, DecodeError> {
        let mut out = Value::Record(self.template.clone());
        self.decode_into(r, &mut out)?;
        Ok(out)
    }

    pub fn decode_into(&self, r: &mut Reader<'_>, out: &mut Value) -> Result<(), DecodeError> {
        let rec = record_mut(out)?;
        let count = r.pop_u32()? as usize;
        if count != self.fields.len() {
            return Err(DecodeError::ElementCount {
                expected: self.fields.len(),
                found: count,
            });
        }

        for field in &self.fields {
            r.discard(4)?; // reserved
            match &field.target {
                FieldTarget::Skip => {
                    pop_element(r)?;
                }
                FieldTarget::Slot { path, codec } => {
                    let value = decode_required(codec, r, &field.name)?;
                    store(rec, path, value)?;
                }
            }
        }
        Ok(())
    }

    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        let rec = match v {
            Value::Record(rec) => rec,
            other => return Err(mismatch("record", other)),
        };

        w.push_u32(self.fields.len() as u32);
        for field in &self.fields {
            w.push_u32(0);
            match &field.target {
                FieldTarget::Skip => w.push_u32(NULL_LENGTH),
                FieldTarget::Slot { path, codec } => {
                    let value = load(rec, path, &self.template)?;
                    encode_required(codec, w, value, &field.name)?;
                }
            }
        }
        Ok(())
    }
}

/// Object shapes are decoded from query output; input shapes carry
/// arguments in sparse form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectLayout {
    Output,
    Input,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub required: bool,
    pub flags: FieldFlags,
    pub target: FieldTarget,
}

impl ObjectField {
    pub fn is_implicit(&self) -> bool {
        self.flags.is_implicit()
    }

    pub fn is_link_property(&self) -> bool {
        self.flags.is_link_property()
    }

    pub fn is_link(&self) -> bool {
        self.flags.is_link()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCodec {
    pub id: Uuid,
    pub layout: ObjectLayout,
    pub fields: Vec<ObjectField>,
    pub template: Record,
}

impl ObjectCodec {
    pub fn decode(&self, r: &mut Reader<'_>) -> Result<Value, DecodeError> {
        let mut out = Value::Record(self.template.clone());
        self.decode_into(r, &mut out)?;
        Ok(out)
    }

    /// Absent optional fields leave `out` untouched.
    pub fn decode_into(&self, r: &mut Reader<'_>, out: &mut Value) -> Result<(), DecodeError> {
        let rec = record_mut(out)?;
        match self.layout {
            ObjectLayout::Output => self.decode_output(r, rec),
            ObjectLayout::Input => self.decode_input(r, rec),
        }
    }

    fn decode_output(&self, r: &mut Reader<'_>, rec: &mut Record) -> Result<(), DecodeError> {
        let count = r.pop_u32()? as usize;
        if count != self.fields.len() {
            return Err(DecodeError::ElementCount {
                expected: self.fields.len(),
                found: count,
            });
        }

        for field in &self.fields {
            r.discard(4)?; // reserved
            match &field.target {
                FieldTarget::Skip => r.discard(TID_BLOCK_LEN)?,
                FieldTarget::Slot { path, codec } => match pop_element(r)? {
                    Some(mut payload) => {
                        let value = codec.decode(&mut payload)?;
                        payload.finish()?;
                        store(rec, path, value)?;
                    }
                    None if field.required => {
                        return Err(DecodeError::MissingRequired(field.name.clone()));
                    }
                    None => {}
                },
            }
        }
        Ok(())
    }

    fn decode_input(&self, r: &mut Reader<'_>, rec: &mut Record) -> Result<(), DecodeError> {
        let count = r.pop_u32()? as usize;
        if count > self.fields.len() {
            return Err(DecodeError::ElementCount {
                expected: self.fields.len(),
                found: count,
            });
        }

        for _ in 0..count {
            let index = r.pop_u32()?;
            let field = self
                .fields
                .get(index as usize)
                .ok_or(DecodeError::InvalidIndex(index))?;
            let payload = pop_element(r)?;
            if let (FieldTarget::Slot { path, codec }, Some(mut payload)) = (&field.target, payload) {
                let value = codec.decode(&mut payload)?;
                payload.finish()?;
                store(rec, path, value)?;
            }
        }
        Ok(())
    }

    pub fn encode(&self, w: &mut Writer, v: &Value) -> Result<(), EncodeError> {
        let rec = match v {
            Value::Record(rec) => rec,
            other => return Err(mismatch("record", other)),
        };
        match self.layout {
            ObjectLayout::Output => self.encode_output(w, rec),
            ObjectLayout::Input => self.encode_input(w, rec),
        }
    }

    fn encode_output(&self, w: &mut Writer, rec: &Record) -> Result<(), EncodeError> {
        w.push_u32(self.fields.len() as u32);
        for field in &self.fields {
            w.push_u32(0);
            match &field.target {
                FieldTarget::Skip => {
                    w.push_u32(16);
                    w.push_uuid(&Uuid::nil());
                }
                FieldTarget::Slot { path, codec } => {
                    let value = load(rec, path, &self.template)?;
                    if field.required {
                        encode_required(codec, w, value, &field.name)?;
                    } else {
                        encode_element(codec, w, value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_input(&self, w: &mut Writer, rec: &Record) -> Result<(), EncodeError> {
        let mut present = Vec::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if let FieldTarget::Slot { path, codec } = &field.target {
                let value = load(rec, path, &self.template)?;
                if value.is_null() {
                    if field.required {
                        return Err(EncodeError::MissingRequired(field.name.clone()));
                    }
                    continue;
                }
                present.push((index as u32, codec, value));
            }
        }

        w.push_u32(present.len() as u32);
        for (index, codec, value) in present {
            w.push_u32(index);
            encode_element(codec, w, value)?;
        }
        Ok(())
    }
}

// ============================================================================
// Range / MultiRange
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RangeCodec {
    pub id: Uuid,
    pub element: Box<Codec>,
}

impl RangeCodec {
    pub fn decode_range(&self, r: &mut Reader<'_>) -> Result<RangeValue, DecodeError> {
        let flags = r.pop_u8()?;
        let empty = flags & range_flags::EMPTY != 0;

        let lower = if !empty && flags & range_flags::LB_INF == 0 {
            Some(Box::new(decode_required(&self.element, r, "range lower bound")?))
        } else {
            None
        };
        let upper = if !empty && flags & range_flags::UB_INF == 0 {
            Some(Box::new(decode_required(&self.element, r, "range upper bound")?))
        } else {
            None
        };

        Ok(RangeValue {
            lower,
            upper,
            inc_lower: flags & range_flags::LB_INC != 0,
            inc_upper: flags & range_flags::UB_INC != 0,
            empty,
        })
    }

    pub fn encode_range(&self, w: &mut Writer, range: &RangeValue) -> Result<(), EncodeError> {
        if range.empty {
            w.push_u8(range_flags::EMPTY);
            return Ok(());
        }

        let mut flags = 0u8;
        if range.inc_lower {
            flags |= range_flags::LB_INC;
        }
        if range.inc_upper {
            flags |= range_flags::UB_INC;
        }
        if range.lower.is_none() {
            flags |= range_flags::LB_INF;
        }
        if range.upper.is_none() {
            flags |= range_flags::UB_INF;
        }
        w.push_u8(flags);

        if let Some(lower) = &range.lower {
            encode_required(&self.element, w, lower, "range lower bound")?;
        }
        if let Some(upper) = &range.upper {
            encode_required(&self.element, w, upper, "range upper bound")?;
        }
        Ok(())
    }

    pub fn decode_multi(&self, r: &mut Reader<'_>) -> Result<Vec<RangeValue>, DecodeError> {
        let count = r.pop_u32()? as usize;
        let mut out = Vec::with_capacity(capacity_hint(count, r));
        for _ in 0..count {
            let mut payload =
                pop_element(r)?.ok_or_else(|| DecodeError::MissingRequired("range".to_string()))?;
            out.push(self.decode_range(&mut payload)?);
            payload.finish()?;
        }
        Ok(out)
    }

    pub fn encode_multi(&self, w: &mut Writer, ranges: &[RangeValue]) -> Result<(), EncodeError> {
        w.push_u32(ranges.len() as u32);
        for range in ranges {
            w.begin_bytes();
            self.encode_range(w, range)?;
            w.end_bytes()?;
        }
        Ok(())
    }
}
