//! Native values produced and consumed by bound codecs.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

/// A decoded value, or an argument to encode.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value present (optional field or element).
    Null,
    Uuid(Uuid),
    Str(String),
    Bytes(Vec<u8>),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    Duration(Duration),
    Json(serde_json::Value),
    Array(Vec<Value>),
    Set(Vec<Value>),
    Tuple(Vec<Value>),
    Record(Record),
    Range(RangeValue),
    MultiRange(Vec<RangeValue>),
}

impl Value {
    /// Variant name, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Uuid(_) => "uuid",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::LocalDateTime(_) => "local_datetime",
            Value::LocalDate(_) => "local_date",
            Value::LocalTime(_) => "local_time",
            Value::Duration(_) => "duration",
            Value::Json(_) => "json",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Range(_) => "range",
            Value::MultiRange(_) => "multirange",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Positional storage for a record shape: `fields[i]` holds member `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub fields: Vec<Value>,
}

impl Record {
    pub fn new(fields: Vec<Value>) -> Self {
        Record { fields }
    }

    /// Follow a storage path through nested (embedded) records.
    pub fn slot(&self, path: &[usize]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let value = self.fields.get(*first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Record(inner) => inner.slot(rest),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, path: &[usize]) -> Option<&mut Value> {
        let (first, rest) = path.split_first()?;
        let value = self.fields.get_mut(*first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Record(inner) => inner.slot_mut(rest),
            _ => None,
        }
    }
}

/// A range over an ordered scalar. `None` bounds are infinite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeValue {
    pub lower: Option<Box<Value>>,
    pub upper: Option<Box<Value>>,
    pub inc_lower: bool,
    pub inc_upper: bool,
    pub empty: bool,
}

impl RangeValue {
    /// `[lower, upper)`, the canonical form for discrete ranges.
    pub fn new(lower: Option<Value>, upper: Option<Value>) -> Self {
        RangeValue {
            inc_lower: lower.is_some(),
            lower: lower.map(Box::new),
            upper: upper.map(Box::new),
            inc_upper: false,
            empty: false,
        }
    }

    pub fn empty() -> Self {
        RangeValue {
            empty: true,
            ..RangeValue::default()
        }
    }
}
