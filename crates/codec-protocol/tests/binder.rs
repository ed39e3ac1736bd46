// crates/codec-protocol/tests/binder.rs
mod common;

use codec_core::{DescriptorKind, FieldFlags, Reader, RecordShape, ScalarType, Shape, Value};
use codec_protocol::{bind, parse_descriptor, shape_for, BindError, Codec};

use common::{elem, id, Elem, Stream, AT_MOST_ONE, ONE};

fn descriptor(s: Stream) -> std::sync::Arc<codec_core::Descriptor> {
    let dialect = s.dialect;
    parse_descriptor(&s.bytes(), dialect).unwrap()
}

fn user_stream() -> Stream {
    let mut s = Stream::v1();
    let int64 = s.scalar(ScalarType::Int64);
    let text = s.scalar(ScalarType::Str);
    let tags = s.array(id(1), text);
    s.shape(
        id(2),
        0,
        &[
            elem("id", int64, ONE),
            Elem {
                flags: FieldFlags::LINK_PROPERTY,
                ..elem("name", text, AT_MOST_ONE)
            },
            Elem {
                flags: FieldFlags::LINK,
                ..elem("tags", tags, ONE)
            },
        ],
    );
    s
}

fn user_record() -> RecordShape {
    RecordShape::new("User")
        .member("id", Shape::scalar(ScalarType::Int64))
        .member("name", Shape::optional(Shape::scalar(ScalarType::Str)))
        .member("tags", Shape::array(Shape::scalar(ScalarType::Str)))
}

#[test]
fn scalar_kind_mismatch() {
    let mut s = Stream::v1();
    s.scalar(ScalarType::Int64);
    let desc = descriptor(s);

    let err = bind(&desc, true, &Shape::scalar(ScalarType::Str)).unwrap_err();
    assert_eq!(
        err,
        BindError::ShapeMismatch {
            path: "<root>".to_string(),
            expected: "std::int64".to_string(),
            found: "std::str".to_string(),
        }
    );
}

#[test]
fn root_cardinality() {
    let mut s = Stream::v1();
    s.scalar(ScalarType::Int64);
    let desc = descriptor(s);
    let int64 = Shape::scalar(ScalarType::Int64);

    assert!(matches!(
        bind(&desc, false, &int64),
        Err(BindError::Cardinality { .. })
    ));
    assert!(bind(&desc, false, &Shape::optional(int64.clone())).is_ok());
    // a required root may still target an optional shape
    assert!(bind(&desc, true, &Shape::optional(int64)).is_ok());
}

#[test]
fn missing_member_names_the_field() {
    let desc = descriptor(user_stream());
    let shape = Shape::Record(
        RecordShape::new("Thin")
            .member("id", Shape::scalar(ScalarType::Int64))
            .member("name", Shape::optional(Shape::scalar(ScalarType::Str))),
    );

    assert_eq!(
        bind(&desc, true, &shape).unwrap_err(),
        BindError::MissingMember {
            field: "tags".to_string(),
            record: "Thin".to_string(),
        }
    );
}

#[test]
fn optional_field_needs_optional_member() {
    let desc = descriptor(user_stream());
    let shape = Shape::Record(
        RecordShape::new("User")
            .member("id", Shape::scalar(ScalarType::Int64))
            .member("name", Shape::scalar(ScalarType::Str))
            .member("tags", Shape::array(Shape::scalar(ScalarType::Str))),
    );

    assert_eq!(
        bind(&desc, true, &shape).unwrap_err(),
        BindError::Cardinality {
            path: "name".to_string(),
            found: "std::str".to_string(),
        }
    );
}

#[test]
fn required_field_may_target_optional_member() {
    let desc = descriptor(user_stream());
    let shape = Shape::Record(
        RecordShape::new("User")
            .member("id", Shape::optional(Shape::scalar(ScalarType::Int64)))
            .member("name", Shape::optional(Shape::scalar(ScalarType::Str)))
            .member("tags", Shape::array(Shape::scalar(ScalarType::Str))),
    );
    assert!(bind(&desc, true, &shape).is_ok());
}

#[test]
fn nested_mismatch_reports_its_path() {
    let desc = descriptor(user_stream());
    let shape = Shape::Record(
        RecordShape::new("User")
            .member("id", Shape::scalar(ScalarType::Int64))
            .member("name", Shape::optional(Shape::scalar(ScalarType::Str)))
            .member("tags", Shape::array(Shape::scalar(ScalarType::Int32))),
    );

    match bind(&desc, true, &shape).unwrap_err() {
        BindError::ShapeMismatch { path, expected, .. } => {
            assert_eq!(path, "tags.[]");
            assert_eq!(expected, "std::str");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn object_binds_to_object_codec() {
    let desc = descriptor(user_stream());
    let codec = bind(&desc, true, &Shape::Record(user_record())).unwrap();

    match &codec {
        Codec::Object(object) => {
            assert_eq!(object.id, id(2));
            assert_eq!(object.fields.len(), 3);
            assert!(!object.fields[1].required);

            let links: Vec<_> = object
                .fields
                .iter()
                .map(|f| (f.is_implicit(), f.is_link_property(), f.is_link()))
                .collect();
            assert_eq!(
                links,
                vec![(false, false, false), (false, true, false), (false, false, true)]
            );
        }
        other => panic!("expected object codec, got {:?}", other),
    }
}

#[test]
fn tuple_elements_must_be_scalars() {
    let mut s = Stream::v1();
    let int64 = s.scalar(ScalarType::Int64);
    let list = s.array(id(3), int64);
    s.tuple(id(4), &[int64, list]);
    let desc = descriptor(s);

    let shape = Shape::Tuple(vec![
        Shape::scalar(ScalarType::Int64),
        Shape::array(Shape::scalar(ScalarType::Int64)),
    ]);
    assert_eq!(
        bind(&desc, true, &shape).unwrap_err(),
        BindError::NonScalarTupleElement {
            path: "<root>".to_string(),
            index: 1,
        }
    );
}

#[test]
fn tuple_arity_must_match() {
    let mut s = Stream::v1();
    let int64 = s.scalar(ScalarType::Int64);
    s.tuple(id(5), &[int64, int64]);
    let desc = descriptor(s);

    assert!(matches!(
        bind(&desc, true, &Shape::Tuple(vec![Shape::scalar(ScalarType::Int64)])),
        Err(BindError::ShapeMismatch { .. })
    ));
}

#[test]
fn unsupported_range_element() {
    let mut s = Stream::v1();
    let text = s.scalar(ScalarType::Str);
    s.range(id(6), text);
    let desc = descriptor(s);

    assert_eq!(
        bind(&desc, true, &Shape::range(Shape::scalar(ScalarType::Str))).unwrap_err(),
        BindError::UnsupportedRangeType("range<std::str>".to_string())
    );
}

#[test]
fn enum_binds_as_string() {
    let mut s = Stream::v1();
    s.enumeration(id(7), "default::Color", &["Red", "Green"]);
    let desc = descriptor(s);

    let codec = bind(&desc, true, &Shape::scalar(ScalarType::Str)).unwrap();
    let value = codec.decode(&mut Reader::new(b"Red")).unwrap();
    assert_eq!(value, Value::Str("Red".to_string()));
}

#[test]
fn set_binds_to_array_shape_too() {
    let mut s = Stream::v1();
    let int64 = s.scalar(ScalarType::Int64);
    s.set(id(8), int64);
    let desc = descriptor(s);

    let codec = bind(&desc, true, &Shape::array(Shape::scalar(ScalarType::Int64))).unwrap();
    assert!(matches!(codec, Codec::Array(_)));
    assert_eq!(codec.id(), id(8));
}

#[test]
fn unknown_scalar_is_unsupported() {
    let mut s = Stream::v2();
    s.node(3, id(9), |w| {
        w.push_string("default::opaque").unwrap();
        w.push_u8(1);
        w.push_u16(0);
    });
    let desc = descriptor(s);

    assert_eq!(
        bind(&desc, true, &Shape::scalar(ScalarType::Str)).unwrap_err(),
        BindError::UnsupportedScalar(id(9))
    );
}

#[test]
fn object_types_and_compounds_are_not_values() {
    let mut s = Stream::v2();
    let a = s.object_type(id(10), "default::A");
    let b = s.object_type(id(11), "default::B");
    s.compound(id(12), "default::A | default::B", 1, &[a, b]);
    let desc = descriptor(s);
    let record = Shape::Record(RecordShape::new("Any"));

    assert_eq!(
        bind(&desc, true, &record).unwrap_err(),
        BindError::NotBindable(DescriptorKind::Compound)
    );
    assert_eq!(
        bind(desc.child(0).unwrap(), true, &record).unwrap_err(),
        BindError::NotBindable(DescriptorKind::Object)
    );
}

#[test]
fn v2_object_shape_binds_by_field_name() {
    let mut s = Stream::v2();
    let uuid = s.scalar(ScalarType::Uuid);
    let text = s.scalar(ScalarType::Str);
    let user = s.object_type(id(13), "default::User");
    s.shape(
        id(14),
        user,
        &[elem("id", uuid, ONE), elem("email", text, AT_MOST_ONE)],
    );
    let desc = descriptor(s);

    let shape = Shape::Record(
        RecordShape::new("Account")
            .member("email", Shape::optional(Shape::scalar(ScalarType::Str)))
            .member("id", Shape::scalar(ScalarType::Uuid)),
    );
    assert!(matches!(bind(&desc, true, &shape).unwrap(), Codec::Object(_)));
}

#[test]
fn inferred_shape_skips_type_id_and_marks_optionals() {
    let mut s = Stream::v1();
    let uuid = s.scalar(ScalarType::Uuid);
    let text = s.scalar(ScalarType::Str);
    s.shape(
        id(15),
        0,
        &[
            elem("__tid__", uuid, ONE),
            elem("id", uuid, ONE),
            elem("name", text, AT_MOST_ONE),
        ],
    );
    let desc = descriptor(s);

    let shape = shape_for(&desc, true).unwrap();
    let rec = match &shape {
        Shape::Record(rec) => rec,
        other => panic!("expected record, got {}", other),
    };
    let names: Vec<&str> = rec.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["id", "name"]);
    assert!(rec.members[1].shape.is_optional());
    assert!(bind(&desc, true, &shape).is_ok());

    let optional = shape_for(&desc, false).unwrap();
    assert!(optional.is_optional());
    assert!(bind(&desc, false, &optional).is_ok());
}

#[test]
fn inferred_shapes_for_collections() {
    let mut s = Stream::v2();
    let int32 = s.scalar(ScalarType::Int32);
    let range = s.range(id(16), int32);
    let list = s.array(id(17), int32);
    s.tuple(id(18), &[range, list]);
    let desc = descriptor(s);

    assert_eq!(
        shape_for(&desc, true).unwrap(),
        Shape::Tuple(vec![
            Shape::range(Shape::scalar(ScalarType::Int32)),
            Shape::array(Shape::scalar(ScalarType::Int32)),
        ])
    );
    assert_eq!(
        shape_for(desc.child(1).unwrap(), false).unwrap(),
        Shape::optional(Shape::array(Shape::scalar(ScalarType::Int32)))
    );
}
