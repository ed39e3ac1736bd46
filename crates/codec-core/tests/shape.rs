// crates/codec-core/tests/shape.rs
use codec_core::{Record, RecordShape, ScalarType, Shape, StoragePath, Value};

fn audit() -> RecordShape {
    RecordShape::new("Audit")
        .member("created_by", Shape::scalar(ScalarType::Str))
        .member("id", Shape::scalar(ScalarType::Int64))
}

fn user() -> RecordShape {
    RecordShape::new("User")
        .member("id", Shape::scalar(ScalarType::Uuid))
        .renamed("display_name", "name", Shape::optional(Shape::scalar(ScalarType::Str)))
        .embed("audit", audit())
}

#[test]
fn resolves_direct_members_by_wire_name() {
    let shape = user();

    let (path, member) = shape.resolve("name").expect("renamed member");
    assert_eq!(path, StoragePath(vec![1]));
    assert!(member.is_optional());

    assert!(shape.resolve("display_name").is_none(), "only the wire name matches");
}

#[test]
fn resolves_into_embedded_records() {
    let shape = user();

    let (path, member) = shape.resolve("created_by").expect("embedded member");
    assert_eq!(path, StoragePath(vec![2, 0]));
    assert_eq!(member, &Shape::scalar(ScalarType::Str));

    // direct member shadows the embedded one
    let (path, member) = shape.resolve("id").unwrap();
    assert_eq!(path, StoragePath(vec![0]));
    assert_eq!(member, &Shape::scalar(ScalarType::Uuid));

    assert!(shape.resolve("audit").is_none(), "embedded members are not matched themselves");
}

#[test]
fn default_record_follows_member_shapes() {
    let rec = user().default_record();

    assert_eq!(rec.fields.len(), 3);
    assert_eq!(rec.fields[1], Value::Null);
    match &rec.fields[2] {
        Value::Record(inner) => {
            assert_eq!(inner.fields, vec![Value::Str(String::new()), Value::Int64(0)])
        }
        other => panic!("expected embedded record, got {:?}", other),
    }
}

#[test]
fn storage_paths_reach_nested_slots() {
    let mut rec = user().default_record();

    *rec.slot_mut(&[2, 1]).unwrap() = Value::Int64(9);
    assert_eq!(rec.slot(&[2, 1]), Some(&Value::Int64(9)));

    assert!(rec.slot(&[0, 0]).is_none(), "scalars have no children");
    assert!(rec.slot(&[7]).is_none());
    assert!(Record::default().slot(&[]).is_none());
}

#[test]
fn shapes_render_readably() {
    let shape = Shape::optional(Shape::array(Shape::scalar(ScalarType::LocalDate)));
    assert_eq!(shape.to_string(), "optional<array<cal::local_date>>");
    assert_eq!(shape.required().to_string(), "array<cal::local_date>");
    assert_eq!(StoragePath(vec![2, 0]).to_string(), "[2.0]");
}
