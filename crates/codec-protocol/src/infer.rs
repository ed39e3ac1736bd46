//! Default target shapes derived from a descriptor.
//!
//! Callers that have no native type of their own (the inspect tool,
//! tests, generic row dumps) can bind against the shape the descriptor
//! itself suggests. Records take their member names from the wire field
//! names; `__tid__` never becomes a member.

use codec_core::{Descriptor, DescriptorKind, RecordShape, Shape};

use crate::binder::scalar_base;
use crate::error::BindError;
use crate::wire_types::TID_FIELD;

/// Shape that `bind(desc, required, &shape)` accepts.
pub fn shape_for(desc: &Descriptor, required: bool) -> Result<Shape, BindError> {
    let shape = infer(desc)?;
    Ok(if required { shape } else { Shape::optional(shape) })
}

fn infer(desc: &Descriptor) -> Result<Shape, BindError> {
    match desc.kind {
        DescriptorKind::BaseScalar | DescriptorKind::Scalar | DescriptorKind::Enum => {
            Ok(Shape::Scalar(scalar_base(desc)?))
        }
        DescriptorKind::Array => Ok(Shape::array(infer(element(desc)?)?)),
        DescriptorKind::Set => Ok(Shape::set(infer(element(desc)?)?)),
        DescriptorKind::Range => Ok(Shape::range(infer(element(desc)?)?)),
        DescriptorKind::MultiRange => Ok(Shape::MultiRange(Box::new(infer(element(desc)?)?))),
        DescriptorKind::Tuple => {
            let items = desc
                .fields
                .iter()
                .map(|f| infer(&f.desc))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Shape::Tuple(items))
        }
        DescriptorKind::Object if desc.name.is_some() => Err(BindError::NotBindable(desc.kind)),
        DescriptorKind::NamedTuple
        | DescriptorKind::SqlRecord
        | DescriptorKind::Object
        | DescriptorKind::ObjectShape
        | DescriptorKind::InputShape => {
            let mut rec = RecordShape::new(record_name(desc));
            for field in desc.fields.iter().filter(|f| f.name() != TID_FIELD) {
                let member = infer(&field.desc)?;
                let member = if field.required { member } else { Shape::optional(member) };
                rec = rec.member(field.name(), member);
            }
            Ok(Shape::Record(rec))
        }
        DescriptorKind::Compound => Err(BindError::NotBindable(desc.kind)),
    }
}

fn element(desc: &Descriptor) -> Result<&Descriptor, BindError> {
    desc.child(0)
        .map(|d| d.as_ref())
        .ok_or(BindError::NotBindable(desc.kind))
}

fn record_name(desc: &Descriptor) -> String {
    desc.name
        .clone()
        .unwrap_or_else(|| format!("{} {}", desc.kind, desc.id))
}
