//! Low-level wire constants.
//!
//! This module defines:
//! - the two descriptor dialects,
//! - descriptor tag ids per dialect,
//! - cardinality bytes,
//! - flag bits used by the compound codecs.
//!
//! The actual parse logic lives in `descriptor_parser`.

use std::fmt;
use std::str::FromStr;

use codec_core::DescriptorKind;

/// Descriptor encoding version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Protocol 1.x: bare nodes, no names or ancestry.
    V1,
    /// Protocol 2.x: length-prefixed nodes with type names, ancestry and
    /// the extra compound/multirange/record kinds.
    V2,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::V1 => f.write_str("v1"),
            Dialect::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "v1" => Ok(Dialect::V1),
            "2" | "v2" => Ok(Dialect::V2),
            other => Err(format!("unknown dialect `{}` (expected v1 or v2)", other)),
        }
    }
}

/// Descriptor tags (first byte of each node).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DescriptorTag {
    Set = 0,
    /// Object in dialect 1, object shape in dialect 2.
    Shape = 1,
    BaseScalar = 2,
    Scalar = 3,
    Tuple = 4,
    NamedTuple = 5,
    Array = 6,
    Enum = 7,
    InputShape = 8,
    Range = 9,
    /// Dialect 2 only from here on.
    ObjectType = 10,
    Compound = 11,
    MultiRange = 12,
    SqlRecord = 13,
}

impl DescriptorTag {
    pub fn from_u8(v: u8, dialect: Dialect) -> Option<Self> {
        let tag = match v {
            0 => DescriptorTag::Set,
            1 => DescriptorTag::Shape,
            2 => DescriptorTag::BaseScalar,
            3 => DescriptorTag::Scalar,
            4 => DescriptorTag::Tuple,
            5 => DescriptorTag::NamedTuple,
            6 => DescriptorTag::Array,
            7 => DescriptorTag::Enum,
            8 => DescriptorTag::InputShape,
            9 => DescriptorTag::Range,
            10 if dialect == Dialect::V2 => DescriptorTag::ObjectType,
            11 if dialect == Dialect::V2 => DescriptorTag::Compound,
            12 if dialect == Dialect::V2 => DescriptorTag::MultiRange,
            13 if dialect == Dialect::V2 => DescriptorTag::SqlRecord,
            _ => return None,
        };
        Some(tag)
    }

    /// Logical kind of the node this tag introduces.
    pub fn kind(self, dialect: Dialect) -> DescriptorKind {
        match self {
            DescriptorTag::Set => DescriptorKind::Set,
            DescriptorTag::Shape => match dialect {
                Dialect::V1 => DescriptorKind::Object,
                Dialect::V2 => DescriptorKind::ObjectShape,
            },
            DescriptorTag::BaseScalar => DescriptorKind::BaseScalar,
            DescriptorTag::Scalar => DescriptorKind::Scalar,
            DescriptorTag::Tuple => DescriptorKind::Tuple,
            DescriptorTag::NamedTuple => DescriptorKind::NamedTuple,
            DescriptorTag::Array => DescriptorKind::Array,
            DescriptorTag::Enum => DescriptorKind::Enum,
            DescriptorTag::InputShape => DescriptorKind::InputShape,
            DescriptorTag::Range => DescriptorKind::Range,
            DescriptorTag::ObjectType => DescriptorKind::Object,
            DescriptorTag::Compound => DescriptorKind::Compound,
            DescriptorTag::MultiRange => DescriptorKind::MultiRange,
            DescriptorTag::SqlRecord => DescriptorKind::SqlRecord,
        }
    }
}

/// Tags at or above this value are type annotations.
pub const ANNOTATION_TAG_MIN: u8 = 0x80;

pub fn is_annotation(tag: u8) -> bool {
    tag >= ANNOTATION_TAG_MIN
}

/// Cardinality bytes carried by shape elements.
pub mod cardinality {
    pub const NO_RESULT: u8 = 0x6e;
    pub const AT_MOST_ONE: u8 = 0x6f;
    pub const ONE: u8 = 0x41;
    pub const MANY: u8 = 0x6d;
    pub const AT_LEAST_ONE: u8 = 0x4d;

    /// Map a cardinality byte to the `required` flag. `None` for bytes that
    /// are not valid on a shape element.
    pub fn required(card: u8) -> Option<bool> {
        match card {
            AT_MOST_ONE | MANY => Some(false),
            ONE | AT_LEAST_ONE => Some(true),
            _ => None,
        }
    }
}

/// Compound operator bytes.
pub const COMPOUND_UNION: u8 = 1;
pub const COMPOUND_INTERSECTION: u8 = 2;

/// Implicit type-id field injected into object shapes.
pub const TID_FIELD: &str = "__tid__";

/// Range flag bits.
pub mod range_flags {
    pub const EMPTY: u8 = 0x01;
    pub const LB_INC: u8 = 0x02;
    pub const UB_INC: u8 = 0x04;
    pub const LB_INF: u8 = 0x08;
    pub const UB_INF: u8 = 0x10;
}

/// Length marker of an absent value.
pub const NULL_LENGTH: u32 = 0xFFFF_FFFF;
