//! Binding: descriptor tree + target shape -> codec tree.
//!
//! The binder walks both trees together, dispatching on the descriptor
//! kind. Every mismatch is reported here, once, before any value is
//! decoded. Named fields are resolved to storage paths at this point so
//! decode only does index access.
//!
//! Cardinality rules for named fields:
//! - optional wire field -> member shape must be `Optional`
//! - required wire field -> member may be optional or not; an optional
//!   member simply never ends up `Null`

use codec_core::{Descriptor, DescriptorKind, RecordShape, ScalarType, Shape};

use crate::codec::Codec;
use crate::compound_codec::{
    ArrayCodec, FieldTarget, NamedTupleCodec, NamedTupleField, ObjectCodec, ObjectField,
    ObjectLayout, RangeCodec, TupleCodec,
};
use crate::error::BindError;
use crate::scalar_codec::ScalarCodec;
use crate::wire_types::TID_FIELD;

/// Build a codec for `desc` that produces values of `shape`.
///
/// `required` is the cardinality of the root: `false` (at most one value)
/// demands an `Optional` root shape.
pub fn bind(desc: &Descriptor, required: bool, shape: &Shape) -> Result<Codec, BindError> {
    let mut binder = Binder { path: Vec::new() };
    let target = match (required, shape) {
        (true, _) => shape.required(),
        (false, Shape::Optional(inner)) => inner.as_ref(),
        (false, other) => {
            return Err(BindError::Cardinality {
                path: binder.path_string(),
                found: other.to_string(),
            })
        }
    };
    binder.build(desc, target)
}

/// Resolve the base scalar kind behind a scalar-like descriptor.
///
/// Dialect 1 custom scalars point at their base through their single
/// child; dialect 2 scalars list their ancestry, furthest last.
pub fn scalar_base(desc: &Descriptor) -> Result<ScalarType, BindError> {
    if let Some(kind) = ScalarType::from_id(&desc.id) {
        return Ok(kind);
    }
    match desc.kind {
        DescriptorKind::Scalar => {
            if let Some(base) = desc.child(0) {
                scalar_base(base)
            } else if let Some(base) = desc.ancestors.last() {
                scalar_base(base)
            } else {
                Err(BindError::UnsupportedScalar(desc.id))
            }
        }
        DescriptorKind::Enum => Ok(ScalarType::Str),
        _ => Err(BindError::UnsupportedScalar(desc.id)),
    }
}

struct Binder {
    /// Field names from the root, for error messages.
    path: Vec<String>,
}

impl Binder {
    fn path_string(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(".")
        }
    }

    fn mismatch(&self, expected: impl Into<String>, found: &Shape) -> BindError {
        BindError::ShapeMismatch {
            path: self.path_string(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    fn build(&mut self, desc: &Descriptor, shape: &Shape) -> Result<Codec, BindError> {
        match desc.kind {
            DescriptorKind::BaseScalar | DescriptorKind::Scalar | DescriptorKind::Enum => {
                let kind = scalar_base(desc)?;
                match shape {
                    Shape::Scalar(t) if *t == kind => Ok(Codec::Scalar(ScalarCodec::new(desc.id, kind))),
                    other => Err(self.mismatch(kind.name(), other)),
                }
            }

            DescriptorKind::Array => {
                let inner = match shape {
                    Shape::Array(inner) => inner,
                    other => return Err(self.mismatch("array", other)),
                };
                Ok(Codec::Array(self.build_array(desc, inner)?))
            }

            // Sets share the array layout on the wire; the target decides
            // which collection value comes out.
            DescriptorKind::Set => match shape {
                Shape::Set(inner) => Ok(Codec::Set(self.build_array(desc, inner)?)),
                Shape::Array(inner) => Ok(Codec::Array(self.build_array(desc, inner)?)),
                other => Err(self.mismatch("set", other)),
            },

            DescriptorKind::Tuple => {
                let items = match shape {
                    Shape::Tuple(items) if items.len() == desc.fields.len() => items,
                    other => {
                        return Err(self.mismatch(format!("tuple of {}", desc.fields.len()), other))
                    }
                };
                let mut elements = Vec::with_capacity(items.len());
                for (index, (field, item)) in desc.fields.iter().zip(items).enumerate() {
                    self.path.push(index.to_string());
                    let codec = self.build(&field.desc, item.required())?;
                    self.path.pop();
                    if !codec.is_scalar() {
                        return Err(BindError::NonScalarTupleElement {
                            path: self.path_string(),
                            index,
                        });
                    }
                    elements.push(codec);
                }
                Ok(Codec::Tuple(TupleCodec {
                    id: desc.id,
                    elements,
                }))
            }

            DescriptorKind::NamedTuple | DescriptorKind::SqlRecord => {
                let rec = self.record_shape(desc, shape)?;
                let mut fields = Vec::with_capacity(desc.fields.len());
                for field in &desc.fields {
                    let name = field.name().to_string();
                    let target = self.field_target(rec, &name, true, &field.desc)?;
                    fields.push(NamedTupleField { name, target });
                }
                Ok(Codec::NamedTuple(NamedTupleCodec {
                    id: desc.id,
                    fields,
                    template: rec.default_record(),
                }))
            }

            DescriptorKind::Object if desc.name.is_some() => {
                // dialect 2 object type nodes: metadata only, no elements
                Err(BindError::NotBindable(desc.kind))
            }

            DescriptorKind::Object | DescriptorKind::ObjectShape | DescriptorKind::InputShape => {
                let rec = self.record_shape(desc, shape)?;
                let layout = if desc.kind == DescriptorKind::InputShape {
                    ObjectLayout::Input
                } else {
                    ObjectLayout::Output
                };
                let mut fields = Vec::with_capacity(desc.fields.len());
                for field in &desc.fields {
                    let name = field.name().to_string();
                    let target = self.field_target(rec, &name, field.required, &field.desc)?;
                    fields.push(ObjectField {
                        name,
                        required: field.required,
                        flags: field.flags,
                        target,
                    });
                }
                Ok(Codec::Object(ObjectCodec {
                    id: desc.id,
                    layout,
                    fields,
                    template: rec.default_record(),
                }))
            }

            DescriptorKind::Range => {
                let inner = match shape {
                    Shape::Range(inner) => inner,
                    other => return Err(self.mismatch("range", other)),
                };
                Ok(Codec::Range(self.build_range(desc, inner)?))
            }

            DescriptorKind::MultiRange => {
                let inner = match shape {
                    Shape::MultiRange(inner) => inner,
                    other => return Err(self.mismatch("multirange", other)),
                };
                Ok(Codec::MultiRange(self.build_range(desc, inner)?))
            }

            DescriptorKind::Compound => Err(BindError::NotBindable(desc.kind)),
        }
    }

    fn build_array(&mut self, desc: &Descriptor, inner: &Shape) -> Result<ArrayCodec, BindError> {
        let element = desc
            .child(0)
            .ok_or(BindError::NotBindable(desc.kind))?;
        self.path.push("[]".to_string());
        let codec = self.build(element, inner)?;
        self.path.pop();
        Ok(ArrayCodec {
            id: desc.id,
            element: Box::new(codec),
        })
    }

    fn build_range(&mut self, desc: &Descriptor, inner: &Shape) -> Result<RangeCodec, BindError> {
        let element = desc
            .child(0)
            .ok_or(BindError::NotBindable(desc.kind))?;
        let kind = scalar_base(element)?;
        if element.kind == DescriptorKind::Enum || !kind.is_range_element() {
            return Err(BindError::UnsupportedRangeType(format!("range<{}>", kind.name())));
        }
        let codec = self.build(element, inner)?;
        Ok(RangeCodec {
            id: desc.id,
            element: Box::new(codec),
        })
    }

    fn record_shape<'s>(&self, desc: &Descriptor, shape: &'s Shape) -> Result<&'s RecordShape, BindError> {
        match shape {
            Shape::Record(rec) => Ok(rec),
            other => Err(self.mismatch(desc.kind.name(), other)),
        }
    }

    /// Resolve one named wire field against the record shape.
    fn field_target(
        &mut self,
        rec: &RecordShape,
        name: &str,
        required: bool,
        child: &Descriptor,
    ) -> Result<FieldTarget, BindError> {
        if name == TID_FIELD {
            return Ok(FieldTarget::Skip);
        }

        let (path, member) = rec.resolve(name).ok_or_else(|| BindError::MissingMember {
            field: name.to_string(),
            record: rec.name.clone(),
        })?;

        self.path.push(name.to_string());
        if !required && !member.is_optional() {
            let err = BindError::Cardinality {
                path: self.path_string(),
                found: member.to_string(),
            };
            self.path.pop();
            return Err(err);
        }
        let codec = self.build(child, member.required())?;
        self.path.pop();

        Ok(FieldTarget::Slot { path, codec })
    }
}
