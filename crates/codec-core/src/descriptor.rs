//! Descriptor tree types.
//!
//! A [`Descriptor`] describes one wire type. Children are shared through
//! `Arc` because the flat descriptor stream refers to earlier nodes by
//! index, and the same node is commonly referenced more than once.
//!
//! Parsing lives in `codec-protocol`; this module is purely logical.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::type_id::EMPTY_TUPLE_ID;

/// Descriptor kinds across both protocol dialects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Set,
    /// Dialect 1: an output object shape. Dialect 2: an object type node,
    /// which only appears as metadata and carries no value.
    Object,
    BaseScalar,
    Scalar,
    Tuple,
    NamedTuple,
    Array,
    Enum,
    InputShape,
    Range,
    /// Dialect 2 output object shape.
    ObjectShape,
    /// Dialect 2 union/intersection of object types.
    Compound,
    MultiRange,
    SqlRecord,
}

impl DescriptorKind {
    pub fn name(self) -> &'static str {
        match self {
            DescriptorKind::Set => "set",
            DescriptorKind::Object => "object",
            DescriptorKind::BaseScalar => "base scalar",
            DescriptorKind::Scalar => "scalar",
            DescriptorKind::Tuple => "tuple",
            DescriptorKind::NamedTuple => "named tuple",
            DescriptorKind::Array => "array",
            DescriptorKind::Enum => "enum",
            DescriptorKind::InputShape => "input shape",
            DescriptorKind::Range => "range",
            DescriptorKind::ObjectShape => "object shape",
            DescriptorKind::Compound => "compound",
            DescriptorKind::MultiRange => "multirange",
            DescriptorKind::SqlRecord => "sql record",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape element flags as sent by the server.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(pub u32);

impl FieldFlags {
    pub const IMPLICIT: u32 = 1 << 0;
    pub const LINK_PROPERTY: u32 = 1 << 1;
    pub const LINK: u32 = 1 << 2;

    pub fn is_implicit(self) -> bool {
        self.0 & Self::IMPLICIT != 0
    }

    pub fn is_link_property(self) -> bool {
        self.0 & Self::LINK_PROPERTY != 0
    }

    pub fn is_link(self) -> bool {
        self.0 & Self::LINK != 0
    }
}

/// Compound type operator (dialect 2).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompoundOp {
    Union,
    Intersection,
}

/// One child edge of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Element name for shapes and named tuples; the decimal position for
    /// positional tuples; `None` for single-child kinds.
    pub name: Option<String>,
    pub desc: Arc<Descriptor>,
    /// Cardinality: `true` when the field always carries a value.
    pub required: bool,
    /// Set on the components of a union compound.
    pub union: bool,
    pub flags: FieldFlags,
}

impl Field {
    /// Unnamed, required edge (set/array/range element, scalar base).
    pub fn element(desc: Arc<Descriptor>) -> Self {
        Field {
            name: None,
            desc,
            required: true,
            union: false,
            flags: FieldFlags::default(),
        }
    }

    pub fn named(name: impl Into<String>, desc: Arc<Descriptor>, required: bool) -> Self {
        Field {
            name: Some(name.into()),
            desc,
            required,
            union: false,
            flags: FieldFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A node in the descriptor tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub kind: DescriptorKind,
    /// Content-derived identity; stable for a given type shape.
    pub id: Uuid,
    /// Children in wire order.
    pub fields: Vec<Field>,
    /// Dialect 2 type name (e.g. `default::Color`).
    pub name: Option<String>,
    /// Dialect 2: whether the type is defined in the schema.
    pub schema_defined: bool,
    /// Dialect 2 scalar/collection ancestry, nearest first.
    pub ancestors: Vec<Arc<Descriptor>>,
    /// Dialect 2 compound operator.
    pub op: Option<CompoundOp>,
}

impl Descriptor {
    pub fn new(kind: DescriptorKind, id: Uuid, fields: Vec<Field>) -> Self {
        Descriptor {
            kind,
            id,
            fields,
            name: None,
            schema_defined: false,
            ancestors: Vec::new(),
            op: None,
        }
    }

    /// The "no arguments / no result" descriptor.
    pub fn empty_tuple() -> Self {
        Descriptor::new(DescriptorKind::Tuple, EMPTY_TUPLE_ID, Vec::new())
    }

    pub fn is_empty_tuple(&self) -> bool {
        self.kind == DescriptorKind::Tuple && self.id == EMPTY_TUPLE_ID && self.fields.is_empty()
    }

    /// Child descriptor at position `i`.
    pub fn child(&self, i: usize) -> Option<&Arc<Descriptor>> {
        self.fields.get(i).map(|f| &f.desc)
    }

    /// Render the tree with two-space indentation, one node per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0, None);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize, label: Option<&Field>) {
        use fmt::Write as _;

        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}", indent);
        if let Some(field) = label {
            if let Some(name) = &field.name {
                let _ = write!(out, "{}{}: ", name, if field.required { "" } else { "?" });
            }
        }
        let _ = write!(out, "{} {}", self.kind, self.id);
        if let Some(name) = &self.name {
            let _ = write!(out, " ({})", name);
        }
        out.push('\n');
        for field in &self.fields {
            field.desc.write_pretty(out, depth + 1, Some(field));
        }
    }
}
