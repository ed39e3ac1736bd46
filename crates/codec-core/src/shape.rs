//! Target value shapes.
//!
//! A [`Shape`] tells the binder what native layout the caller wants a
//! descriptor decoded into. Named members are resolved to a
//! [`StoragePath`] once at bind time; decode then writes through plain
//! index access into [`Record`] slots.
//!
//! Shapes are `Eq + Hash` so they double as the target-shape identity in
//! the binding cache.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::type_id::ScalarType;
use crate::value::{RangeValue, Record, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar(ScalarType),
    /// May be absent (`Value::Null`).
    Optional(Box<Shape>),
    Array(Box<Shape>),
    Set(Box<Shape>),
    Tuple(Vec<Shape>),
    Record(RecordShape),
    Range(Box<Shape>),
    MultiRange(Box<Shape>),
}

/// Member indices leading from a record to one of its (possibly embedded)
/// slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StoragePath(pub Vec<usize>);

impl StoragePath {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordShape {
    pub name: String,
    pub members: Vec<Member>,
}

/// One member of a record shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub name: String,
    /// Name to match on the wire when it differs from `name`.
    pub wire_name: Option<String>,
    pub shape: Shape,
    /// Embedded members are not matched themselves; their own members are
    /// searched instead.
    pub embedded: bool,
}

impl Member {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Member {
            name: name.into(),
            wire_name: None,
            shape,
            embedded: false,
        }
    }

    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

impl RecordShape {
    pub fn new(name: impl Into<String>) -> Self {
        RecordShape {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Builder: append a plain member.
    pub fn member(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.members.push(Member::new(name, shape));
        self
    }

    /// Builder: append a member matched by a different wire name.
    pub fn renamed(mut self, name: impl Into<String>, wire_name: impl Into<String>, shape: Shape) -> Self {
        let mut member = Member::new(name, shape);
        member.wire_name = Some(wire_name.into());
        self.members.push(member);
        self
    }

    /// Builder: append an embedded record whose members are flattened into
    /// this one for name resolution.
    pub fn embed(mut self, name: impl Into<String>, inner: RecordShape) -> Self {
        let mut member = Member::new(name, Shape::Record(inner));
        member.embedded = true;
        self.members.push(member);
        self
    }

    /// Resolve a wire field name to its storage path and member shape.
    ///
    /// Direct members win over embedded ones; embedded records are searched
    /// in declaration order.
    pub fn resolve(&self, wire_name: &str) -> Option<(StoragePath, &Shape)> {
        for (i, m) in self.members.iter().enumerate() {
            if !m.embedded && m.wire_name() == wire_name {
                return Some((StoragePath(vec![i]), &m.shape));
            }
        }
        for (i, m) in self.members.iter().enumerate() {
            if let (true, Shape::Record(inner)) = (m.embedded, &m.shape) {
                if let Some((mut path, shape)) = inner.resolve(wire_name) {
                    path.0.insert(0, i);
                    return Some((path, shape));
                }
            }
        }
        None
    }

    pub fn default_record(&self) -> Record {
        Record::new(self.members.iter().map(|m| m.shape.default_value()).collect())
    }
}

impl Shape {
    pub fn scalar(t: ScalarType) -> Self {
        Shape::Scalar(t)
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn array(inner: Shape) -> Self {
        Shape::Array(Box::new(inner))
    }

    pub fn set(inner: Shape) -> Self {
        Shape::Set(Box::new(inner))
    }

    pub fn range(inner: Shape) -> Self {
        Shape::Range(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// Strip one level of `Optional`.
    pub fn required(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner,
            other => other,
        }
    }

    /// Zero value written into fresh storage before decoding.
    pub fn default_value(&self) -> Value {
        match self {
            Shape::Scalar(t) => scalar_default(*t),
            Shape::Optional(_) => Value::Null,
            Shape::Array(_) => Value::Array(Vec::new()),
            Shape::Set(_) => Value::Set(Vec::new()),
            Shape::Tuple(items) => Value::Tuple(items.iter().map(Shape::default_value).collect()),
            Shape::Record(rec) => Value::Record(rec.default_record()),
            Shape::Range(_) => Value::Range(RangeValue::empty()),
            Shape::MultiRange(_) => Value::MultiRange(Vec::new()),
        }
    }
}

fn scalar_default(t: ScalarType) -> Value {
    match t {
        ScalarType::Uuid => Value::Uuid(Uuid::nil()),
        ScalarType::Str => Value::Str(String::new()),
        ScalarType::Bytes => Value::Bytes(Vec::new()),
        ScalarType::Int16 => Value::Int16(0),
        ScalarType::Int32 => Value::Int32(0),
        ScalarType::Int64 => Value::Int64(0),
        ScalarType::Float32 => Value::Float32(0.0),
        ScalarType::Float64 => Value::Float64(0.0),
        ScalarType::Bool => Value::Bool(false),
        ScalarType::DateTime => Value::DateTime(DateTime::<Utc>::default()),
        ScalarType::LocalDateTime => Value::LocalDateTime(NaiveDateTime::default()),
        ScalarType::LocalDate => Value::LocalDate(NaiveDate::default()),
        ScalarType::LocalTime => Value::LocalTime(NaiveTime::default()),
        ScalarType::Duration => Value::Duration(Duration::zero()),
        ScalarType::Json => Value::Json(serde_json::Value::Null),
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(t) => write!(f, "{}", t),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
            Shape::Array(inner) => write!(f, "array<{}>", inner),
            Shape::Set(inner) => write!(f, "set<{}>", inner),
            Shape::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|s| s.to_string()).collect();
                write!(f, "tuple<{}>", parts.join(", "))
            }
            Shape::Record(rec) => write!(f, "record {}", rec.name),
            Shape::Range(inner) => write!(f, "range<{}>", inner),
            Shape::MultiRange(inner) => write!(f, "multirange<{}>", inner),
        }
    }
}
