// crates/codec-core/tests/buffer.rs
use codec_core::{DecodeError, EncodeError, Reader, Uuid, Writer};

#[test]
fn integers_are_big_endian() {
    let bytes = hex::decode("01000200000003ffffffffffffffff").unwrap();
    let mut r = Reader::new(&bytes);

    assert_eq!(r.pop_u8().unwrap(), 1);
    assert_eq!(r.pop_u16().unwrap(), 2);
    assert_eq!(r.pop_u32().unwrap(), 3);
    assert_eq!(r.pop_i64().unwrap(), -1);
    assert!(r.is_empty());
    r.finish().expect("fully consumed");
}

#[test]
fn overread_fails_without_advancing() {
    let bytes = [0u8, 1, 2];
    let mut r = Reader::new(&bytes);

    let err = r.pop_u32().unwrap_err();
    assert_eq!(err, DecodeError::Overread { needed: 4, remaining: 3 });
    assert_eq!(r.len(), 3, "cursor must not move on failure");

    assert_eq!(r.pop_u16().unwrap(), 1);
    assert!(r.pop_u16().is_err());
    assert_eq!(r.pop_u8().unwrap(), 2);
}

#[test]
fn pop_bytes_checks_declared_length() {
    // declares 5 bytes, carries 2
    let bytes = hex::decode("00000005abcd").unwrap();
    let mut r = Reader::new(&bytes);

    assert!(matches!(r.pop_bytes(), Err(DecodeError::Overread { needed: 5, remaining: 2 })));
    assert_eq!(r.len(), 6, "length prefix must not be consumed on failure");
}

#[test]
fn pop_string_validates_utf8() {
    let good = hex::decode("00000002c3a9").unwrap();
    assert_eq!(Reader::new(&good).pop_string().unwrap(), "é");

    let bad = hex::decode("00000001ff").unwrap();
    let mut r = Reader::new(&bad);
    assert_eq!(r.pop_string().unwrap_err(), DecodeError::InvalidUtf8);
    assert_eq!(r.len(), 5);
}

#[test]
fn nested_reader_is_bounded() {
    let bytes = hex::decode("0000000100000002").unwrap();
    let mut r = Reader::new(&bytes);
    let mut inner = r.pop_slice(4).unwrap();

    assert_eq!(inner.pop_u32().unwrap(), 1);
    assert!(inner.pop_u8().is_err(), "inner reader cannot see past its slice");
    assert_eq!(r.pop_u32().unwrap(), 2);
}

#[test]
fn finish_reports_trailing_bytes() {
    let bytes = [0u8; 3];
    let mut r = Reader::new(&bytes);
    r.discard(1).unwrap();
    assert_eq!(r.finish().unwrap_err(), DecodeError::TrailingBytes { remaining: 2 });
}

#[test]
fn peek_does_not_consume() {
    let bytes = hex::decode("0000002a").unwrap();
    let mut r = Reader::new(&bytes);
    assert_eq!(r.peek_u32().unwrap(), 42);
    assert_eq!(r.pop_u32().unwrap(), 42);
}

#[test]
fn uuid_round_trip() {
    let id = Uuid::from_u128(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10);
    let mut w = Writer::new();
    w.push_uuid(&id);
    let bytes = w.into_bytes().unwrap();
    assert_eq!(hex::encode(&bytes), "0102030405060708090a0b0c0d0e0f10");
    assert_eq!(Reader::new(&bytes).pop_uuid().unwrap(), id);
}

#[test]
fn nested_regions_are_back_patched() {
    let mut w = Writer::new();
    w.begin_bytes();
    w.push_u8(0xaa);
    w.begin_bytes();
    w.push_u16(0xbbcc);
    w.end_bytes().unwrap();
    w.end_bytes().unwrap();

    let bytes = w.into_bytes().unwrap();
    assert_eq!(hex::encode(&bytes), "00000007aa00000002bbcc");
}

#[test]
fn unbalanced_regions_are_rejected() {
    let mut w = Writer::new();
    assert_eq!(w.end_bytes().unwrap_err(), EncodeError::UnbalancedRegion);

    w.begin_message(b'D');
    assert_eq!(
        w.end_bytes().unwrap_err(),
        EncodeError::UnbalancedRegion,
        "closing a bytes region inside a message must fail"
    );

    w.begin_bytes();
    assert_eq!(w.end_message().unwrap_err(), EncodeError::UnbalancedRegion);
    w.end_bytes().unwrap();
    w.end_message().unwrap();
    assert!(w.into_bytes().is_ok());

    let mut open = Writer::new();
    open.begin_bytes();
    assert_eq!(open.into_bytes().unwrap_err(), EncodeError::UnbalancedRegion);
}

#[test]
fn message_framing_round_trip() {
    let mut w = Writer::new();
    w.begin_message(b'D');
    w.push_u16(1);
    w.begin_bytes();
    w.push_i64(7);
    w.end_bytes().unwrap();
    w.end_message().unwrap();
    w.begin_message(b'Z');
    w.end_message().unwrap();
    let bytes = w.into_bytes().unwrap();

    // tag, length counting itself, body
    assert_eq!(&bytes[..5], &[b'D', 0, 0, 0, 18]);

    let mut r = Reader::new(&bytes);
    let data = r.pop_message().unwrap();
    assert_eq!(data.tag, b'D');

    let mut body = Reader::new(data.body);
    assert_eq!(body.pop_u16().unwrap(), 1);
    assert_eq!(body.pop_bytes().unwrap(), &[0, 0, 0, 0, 0, 0, 0, 7]);
    body.finish().unwrap();

    let sync = r.pop_message().unwrap();
    assert_eq!(sync.tag, b'Z');
    assert!(sync.body.is_empty());
    r.finish().unwrap();
}

#[test]
fn message_length_below_header_is_invalid() {
    let bytes = hex::decode("4400000002").unwrap();
    let mut r = Reader::new(&bytes);
    assert!(matches!(
        r.pop_message(),
        Err(DecodeError::InvalidLength { what: "message length", .. })
    ));
    assert_eq!(r.len(), 5);
}

#[test]
fn push_string_is_length_prefixed() {
    let mut w = Writer::new();
    w.push_string("hi").unwrap();
    w.push_bytes(&[]).unwrap();
    assert_eq!(hex::encode(w.as_slice()), "00000002686900000000");
}
