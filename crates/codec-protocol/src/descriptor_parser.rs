//! Descriptor stream parsing.
//!
//! The server sends a flat, dependency-ordered list of nodes; every child
//! reference is a u16 index into the nodes already parsed, and the root is
//! the last node. One forward pass therefore builds the whole tree.
//!
//! Stream layout:
//!
//! ```text
//! Dialect 1 node:  [tag:u8][id:16][kind-specific fields]
//! Dialect 2 node:  [len:u32][tag:u8][id:16][kind-specific fields]
//!
//! Shape element (object / input shape):
//!   flags:u32  cardinality:u8  name:str  type:u16   (+ source_type:u16 in v2 object shapes)
//!
//! Dialect 2 "named" prefix (scalar, tuple, named tuple, array, enum, range, multirange):
//!   name:str  schema_defined:u8  ancestor_count:u16  ancestors:u16[]
//! ```
//!
//! Tags at or above 0x80 are annotations: their single length-prefixed
//! payload is skipped, but they still occupy a position in the index space.

use std::sync::Arc;

use codec_core::{CompoundOp, Descriptor, DescriptorKind, Field, FieldFlags, Reader};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::wire_types::{
    cardinality, is_annotation, DescriptorTag, Dialect, COMPOUND_INTERSECTION, COMPOUND_UNION,
};

/// Parse a descriptor stream and return its root node.
///
/// An empty stream means "no arguments" / "no result" and yields the empty
/// tuple descriptor.
pub fn parse_descriptor(bytes: &[u8], dialect: Dialect) -> Result<Arc<Descriptor>, ParseError> {
    if bytes.is_empty() {
        return Ok(Arc::new(Descriptor::empty_tuple()));
    }

    let mut parser = Parser::new(dialect);
    let mut r = Reader::new(bytes);

    while !r.is_empty() {
        match dialect {
            Dialect::V1 => parser.parse_node(&mut r)?,
            Dialect::V2 => {
                let len = r.pop_u32()? as usize;
                let mut node = r.pop_slice(len)?;
                parser.parse_node(&mut node)?;
                node.finish()?;
            }
        }
    }

    let root = parser.root.ok_or(ParseError::MissingRoot)?;
    debug!(
        %dialect,
        nodes = parser.nodes.len(),
        root = %root.id,
        kind = %root.kind,
        "parsed type descriptor"
    );
    Ok(root)
}

struct Parser {
    dialect: Dialect,
    /// `None` marks an annotation slot.
    nodes: Vec<Option<Arc<Descriptor>>>,
    root: Option<Arc<Descriptor>>,
}

/// Dialect 2 naming/ancestry prefix.
struct TypeInfo {
    name: String,
    schema_defined: bool,
    ancestors: Vec<Arc<Descriptor>>,
}

impl Parser {
    fn new(dialect: Dialect) -> Self {
        Parser {
            dialect,
            nodes: Vec::new(),
            root: None,
        }
    }

    fn parse_node(&mut self, r: &mut Reader<'_>) -> Result<(), ParseError> {
        let raw_tag = r.pop_u8()?;
        let id = r.pop_uuid()?;

        if is_annotation(raw_tag) {
            let payload = r.pop_bytes()?;
            trace!(tag = raw_tag, %id, len = payload.len(), "skipping annotation");
            self.nodes.push(None);
            return Ok(());
        }

        let tag = DescriptorTag::from_u8(raw_tag, self.dialect)
            .ok_or(ParseError::UnknownTag(raw_tag))?;
        let kind = tag.kind(self.dialect);

        let desc = match self.dialect {
            Dialect::V1 => self.parse_v1(tag, kind, id, r)?,
            Dialect::V2 => self.parse_v2(tag, kind, id, r)?,
        };

        trace!(index = self.nodes.len(), %id, %kind, fields = desc.fields.len(), "descriptor node");
        let desc = Arc::new(desc);
        self.nodes.push(Some(desc.clone()));
        self.root = Some(desc);
        Ok(())
    }

    fn parse_v1(
        &self,
        tag: DescriptorTag,
        kind: DescriptorKind,
        id: codec_core::Uuid,
        r: &mut Reader<'_>,
    ) -> Result<Descriptor, ParseError> {
        let fields = match tag {
            DescriptorTag::Set | DescriptorTag::Scalar | DescriptorTag::Range => {
                vec![Field::element(self.pop_ref(r)?)]
            }
            DescriptorTag::Shape | DescriptorTag::InputShape => self.pop_shape_elements(r, false)?,
            DescriptorTag::BaseScalar => Vec::new(),
            DescriptorTag::Tuple => self.pop_tuple_elements(r)?,
            DescriptorTag::NamedTuple => self.pop_named_elements(r)?,
            DescriptorTag::Array => self.pop_array(r)?,
            DescriptorTag::Enum => {
                pop_enum_members(r)?;
                Vec::new()
            }
            DescriptorTag::ObjectType
            | DescriptorTag::Compound
            | DescriptorTag::MultiRange
            | DescriptorTag::SqlRecord => return Err(ParseError::UnknownTag(tag as u8)),
        };
        Ok(Descriptor::new(kind, id, fields))
    }

    fn parse_v2(
        &self,
        tag: DescriptorTag,
        kind: DescriptorKind,
        id: codec_core::Uuid,
        r: &mut Reader<'_>,
    ) -> Result<Descriptor, ParseError> {
        let mut info = None;
        let mut op = None;
        let mut type_name = None;

        let fields = match tag {
            DescriptorTag::Set => vec![Field::element(self.pop_ref(r)?)],
            DescriptorTag::Shape => {
                let _ephemeral_free = r.pop_u8()?;
                let object_type = self.pop_ref(r)?;
                type_name = object_type.name.clone();
                self.pop_shape_elements(r, true)?
            }
            DescriptorTag::InputShape => self.pop_shape_elements(r, false)?,
            DescriptorTag::BaseScalar => Vec::new(),
            DescriptorTag::Scalar => {
                info = Some(self.pop_type_info(r, true)?);
                Vec::new()
            }
            DescriptorTag::Tuple => {
                info = Some(self.pop_type_info(r, true)?);
                self.pop_tuple_elements(r)?
            }
            DescriptorTag::NamedTuple => {
                info = Some(self.pop_type_info(r, true)?);
                self.pop_named_elements(r)?
            }
            DescriptorTag::Array => {
                info = Some(self.pop_type_info(r, true)?);
                self.pop_array(r)?
            }
            DescriptorTag::Enum => {
                info = Some(self.pop_type_info(r, true)?);
                pop_enum_members(r)?;
                Vec::new()
            }
            DescriptorTag::Range | DescriptorTag::MultiRange => {
                info = Some(self.pop_type_info(r, true)?);
                vec![Field::element(self.pop_ref(r)?)]
            }
            DescriptorTag::ObjectType => {
                info = Some(self.pop_type_info(r, false)?);
                Vec::new()
            }
            DescriptorTag::Compound => {
                info = Some(self.pop_type_info(r, false)?);
                let compound = match r.pop_u8()? {
                    COMPOUND_UNION => CompoundOp::Union,
                    COMPOUND_INTERSECTION => CompoundOp::Intersection,
                    other => return Err(ParseError::InvalidCompoundOp(other)),
                };
                op = Some(compound);
                let count = r.pop_u16()?;
                let mut components = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let mut field = Field::element(self.pop_ref(r)?);
                    field.union = compound == CompoundOp::Union;
                    components.push(field);
                }
                components
            }
            DescriptorTag::SqlRecord => self.pop_named_elements(r)?,
        };

        let mut desc = Descriptor::new(kind, id, fields);
        desc.op = op;
        if let Some(info) = info {
            desc.name = Some(info.name);
            desc.schema_defined = info.schema_defined;
            desc.ancestors = info.ancestors;
        } else {
            desc.name = type_name;
        }
        Ok(desc)
    }

    /// Resolve one u16 reference into the already-parsed prefix.
    fn pop_ref(&self, r: &mut Reader<'_>) -> Result<Arc<Descriptor>, ParseError> {
        let index = r.pop_u16()?;
        match self.nodes.get(index as usize) {
            Some(Some(desc)) => Ok(desc.clone()),
            _ => Err(ParseError::InvalidReference {
                index,
                available: self.nodes.len(),
            }),
        }
    }

    fn pop_shape_elements(
        &self,
        r: &mut Reader<'_>,
        has_source_type: bool,
    ) -> Result<Vec<Field>, ParseError> {
        let count = r.pop_u16()?;
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let flags = FieldFlags(r.pop_u32()?);
            let card = r.pop_u8()?;
            let required =
                cardinality::required(card).ok_or(ParseError::InvalidCardinality(card))?;
            let name = r.pop_string()?.to_string();
            let desc = self.pop_ref(r)?;
            if has_source_type {
                let _source_type = r.pop_u16()?;
            }
            fields.push(Field::named(name, desc, required).with_flags(flags));
        }
        Ok(fields)
    }

    /// Positional tuple elements are named by their position.
    fn pop_tuple_elements(&self, r: &mut Reader<'_>) -> Result<Vec<Field>, ParseError> {
        let count = r.pop_u16()?;
        let mut fields = Vec::with_capacity(count as usize);
        for i in 0..count {
            fields.push(Field::named(i.to_string(), self.pop_ref(r)?, true));
        }
        Ok(fields)
    }

    fn pop_named_elements(&self, r: &mut Reader<'_>) -> Result<Vec<Field>, ParseError> {
        let count = r.pop_u16()?;
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = r.pop_string()?.to_string();
            fields.push(Field::named(name, self.pop_ref(r)?, true));
        }
        Ok(fields)
    }

    fn pop_array(&self, r: &mut Reader<'_>) -> Result<Vec<Field>, ParseError> {
        let element = self.pop_ref(r)?;
        let dims = r.pop_u16()?;
        if dims == 0 {
            return Err(ParseError::InvalidDimensions(dims));
        }
        r.discard(4 * dims as usize)?;
        Ok(vec![Field::element(element)])
    }

    fn pop_type_info(&self, r: &mut Reader<'_>, with_ancestors: bool) -> Result<TypeInfo, ParseError> {
        let name = r.pop_string()?.to_string();
        let schema_defined = r.pop_u8()? != 0;
        let mut ancestors = Vec::new();
        if with_ancestors {
            let count = r.pop_u16()?;
            ancestors.reserve(count as usize);
            for _ in 0..count {
                ancestors.push(self.pop_ref(r)?);
            }
        }
        Ok(TypeInfo {
            name,
            schema_defined,
            ancestors,
        })
    }
}

/// Enum members are only needed by the server; values travel as strings.
fn pop_enum_members(r: &mut Reader<'_>) -> Result<(), ParseError> {
    let count = r.pop_u16()?;
    for _ in 0..count {
        r.pop_bytes()?;
    }
    Ok(())
}
