use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::ErrorKind;
use crate::proto::Endianness;
use crate::signature::Signature;
use crate::{signature_of, BodyBuf, Cursor, Decode, Encode, Variant};

fn encode<T: ?Sized + Encode>(value: &T) -> Vec<u8> {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(value).unwrap();
    buf.get().to_vec()
}

fn decode<'de, T: Decode<'de>>(bytes: &'de [u8]) -> T {
    let mut cursor = Cursor::new(bytes, Endianness::LITTLE);
    cursor.read::<T>().unwrap()
}

#[test]
fn number_types() {
    assert_eq!(encode(&0x12u8), [0x12]);
    assert_eq!(encode(&0x1234u16), [0x34, 0x12]);
    assert_eq!(encode(&0x12345678u32), [0x78, 0x56, 0x34, 0x12]);
    assert_eq!(
        encode(&0x123456789abcdef0u64),
        [0xf0, 0xde, 0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12]
    );
    assert_eq!(encode(&-0x1234i16), [0xcc, 0xed]);
    assert_eq!(encode(&-0x12345678i32), [0x88, 0xa9, 0xcb, 0xed]);
    assert_eq!(
        encode(&-0x123456789abcdef0i64),
        [0x10, 0x21, 0x43, 0x65, 0x87, 0xa9, 0xcb, 0xed]
    );
    assert_eq!(
        encode(&1337.42f64),
        [0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0x40]
    );
    assert_eq!(
        encode(&-1337.42f64),
        [0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0xc0]
    );

    assert_eq!(decode::<u8>(&[0x12]), 0x12);
    assert_eq!(decode::<u16>(&[0x34, 0x12]), 0x1234);
    assert_eq!(decode::<u32>(&[0x78, 0x56, 0x34, 0x12]), 0x12345678);
    assert_eq!(
        decode::<u64>(&[0xf0, 0xde, 0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12]),
        0x123456789abcdef0
    );
    assert_eq!(decode::<i16>(&[0xcc, 0xed]), -0x1234);
    assert_eq!(
        decode::<f64>(&[0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0x40]),
        1337.42
    );
}

#[test]
fn big_endian_numbers() {
    let mut buf = BodyBuf::with_endianness(Endianness::BIG);
    buf.store(&0x12345678u32).unwrap();
    assert_eq!(buf.get(), &[0x12, 0x34, 0x56, 0x78]);

    let mut cursor = Cursor::new(&[0x12, 0x34, 0x56, 0x78], Endianness::BIG);
    assert_eq!(cursor.read::<u32>().unwrap(), 0x12345678);
}

#[test]
fn bool_wire_form() {
    assert_eq!(encode(&true), [1, 0, 0, 0]);
    assert_eq!(encode(&false), [0, 0, 0, 0]);

    assert!(decode::<bool>(&[1, 0, 0, 0]));
    assert!(!decode::<bool>(&[0, 0, 0, 0]));
}

#[test]
fn bool_decode_is_permissive() {
    // Only 0 and 1 are valid on the wire; any other nonzero value decodes
    // as true rather than failing the message.
    assert!(decode::<bool>(&[2, 0, 0, 0]));
    assert!(decode::<bool>(&[0, 0, 0, 0x80]));
}

#[test]
fn string_wire_form() {
    let expected = [
        17, 0, 0, 0, b't', b'h', b'i', b's', b' ', b'i', b's', b' ', b'a', b' ', b'm', b'e',
        b's', b's', b'a', b'g', b'e', 0,
    ];

    assert_eq!(encode("this is a message"), expected);
    assert_eq!(decode::<String>(&expected), "this is a message");
    assert_eq!(decode::<&str>(&expected), "this is a message");
}

#[test]
fn string_decode_multibyte() {
    let bytes = [5, 0, 0, 0, 195, 190, b'a', 195, 176, 0];
    assert_eq!(decode::<&str>(&bytes), "það");
}

#[test]
fn string_decode_missing_nul() {
    let bytes = [3, 0, 0, 0, b'a', b'b', b'c', 1];
    let mut cursor = Cursor::new(&bytes, Endianness::LITTLE);
    let error = cursor.read::<&str>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::NotNullTerminated(7)));
}

#[test]
#[ignore = "allocates more than 4 GiB"]
fn string_too_long() {
    let value = "x".repeat(u32::MAX as usize + 10);
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    let error = buf.store(value.as_str()).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::StringTooLong(..)));
}

#[test]
fn signature_wire_form() {
    let signature = Signature::new(b"(ta(st)a(st)s)").unwrap();
    let expected = [
        14, b'(', b't', b'a', b'(', b's', b't', b')', b'a', b'(', b's', b't', b')', b's', b')',
        0,
    ];

    assert_eq!(encode(signature), expected);
    assert_eq!(decode::<&Signature>(&expected), signature);
}

#[test]
fn array_of_u64() {
    let expected = [
        24, 0, 0, 0, // byte length
        0, 0, 0, 0, // padding to the element alignment
        10, 0, 0, 0, 0, 0, 0, 0, // 10
        20, 0, 0, 0, 0, 0, 0, 0, // 20
        30, 0, 0, 0, 0, 0, 0, 0, // 30
    ];

    assert_eq!(encode(&vec![10u64, 20, 30]), expected);
    assert_eq!(encode(&[10u64, 20, 30]), expected);
    assert_eq!(encode(&BTreeSet::from([10u64, 20, 30])), expected);

    assert_eq!(decode::<Vec<u64>>(&expected), [10, 20, 30]);
    assert_eq!(decode::<[u64; 3]>(&expected), [10, 20, 30]);
    assert_eq!(
        decode::<BTreeSet<u64>>(&expected),
        BTreeSet::from([10, 20, 30])
    );
    assert_eq!(
        decode::<HashSet<u64>>(&expected),
        HashSet::from([10, 20, 30])
    );
}

#[test]
fn empty_array_still_pads_to_element_alignment() {
    // The alignment padding for the first element is required even when
    // there is no first element.
    assert_eq!(encode(&Vec::<u64>::new()), [0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(decode::<Vec<u64>>(&[0, 0, 0, 0, 0, 0, 0, 0]), []);

    // A 4-aligned element type needs no padding.
    assert_eq!(encode(&Vec::<u32>::new()), [0, 0, 0, 0]);
}

#[test]
fn array_of_strings() {
    let expected = [
        24, 0, 0, 0, // byte length, no padding for 4-aligned elements
        3, 0, 0, 0, b'b', b'a', b'r', 0, // bar
        3, 0, 0, 0, b'b', b'a', b'z', 0, // baz
        3, 0, 0, 0, b'f', b'o', b'o', 0, // foo
    ];

    let values = vec!["bar".to_owned(), "baz".to_owned(), "foo".to_owned()];
    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<Vec<String>>(&expected), values);
}

#[test]
fn array_of_strings_with_padding() {
    let expected = [
        34, 0, 0, 0, // byte length
        5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o', 0, 0, 0, // hello
        4, 0, 0, 0, b'd', b'b', b'u', b's', 0, 0, 0, 0, // dbus
        5, 0, 0, 0, b'w', b'o', b'r', b'l', b'd', 0, // world
    ];

    let values = vec!["hello".to_owned(), "dbus".to_owned(), "world".to_owned()];
    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<Vec<String>>(&expected), values);
}

#[test]
fn nested_arrays() {
    assert_eq!(encode(&Vec::<Vec<u64>>::new()), [0, 0, 0, 0]);

    let expected = [
        0x34, 0, 0, 0, // outer byte length (52)
        0x10, 0, 0, 0, // first inner byte length (16)
        1, 0, 0, 0, 0, 0, 0, 0, //
        2, 0, 0, 0, 0, 0, 0, 0, //
        0x18, 0, 0, 0, // second inner byte length (24)
        0, 0, 0, 0, // padding to the element alignment
        3, 0, 0, 0, 0, 0, 0, 0, //
        4, 0, 0, 0, 0, 0, 0, 0, //
        5, 0, 0, 0, 0, 0, 0, 0, //
    ];

    let values = vec![vec![1u64, 2], vec![3, 4, 5]];
    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<Vec<Vec<u64>>>(&expected), values);
}

#[test]
fn array_trailing_bytes_mismatch() {
    // The declared span is 6 bytes, which no whole number of u32 elements
    // can consume.
    let bytes = [6, 0, 0, 0, 1, 0, 0, 0, 2, 0, 3, 0];
    let mut cursor = Cursor::new(&bytes, Endianness::LITTLE);
    let error = cursor.read::<Vec<u32>>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::OutOfRange(..)));
}

#[test]
fn array_span_past_end_of_buffer() {
    let bytes = [24, 0, 0, 0, 1, 0, 0, 0];
    let mut cursor = Cursor::new(&bytes, Endianness::LITTLE);
    let error = cursor.read::<Vec<u32>>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::OutOfRange(0)));
}

#[test]
fn fixed_size_array_capacity() {
    let bytes = [8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0];

    assert_eq!(decode::<[u32; 2]>(&bytes), [1, 2]);
    // Missing elements remain default.
    assert_eq!(decode::<[u32; 3]>(&bytes), [1, 2, 0]);

    // Excess elements on the wire fail.
    let mut cursor = Cursor::new(&bytes, Endianness::LITTLE);
    let error = cursor.read::<[u32; 1]>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::OutOfRange(..)));
}

#[test]
fn struct_wire_form() {
    let expected = [
        42, // a
        0, 0, 0, // padding
        4, 0, 0, 0, b'd', b'b', b'u', b's', 0, // b
        0, 0, 0, // padding
        0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0x40, // c
    ];

    let value = (42u8, "dbus".to_owned(), 1337.42f64);
    assert_eq!(encode(&value), expected);
    assert_eq!(decode::<(u8, String, f64)>(&expected), value);
}

#[test]
fn struct_starts_on_8_byte_boundary() {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(&0u8).unwrap();
    buf.store(&(42u8, "dbus".to_owned(), 1337.42f64)).unwrap();

    let expected = [
        0, // previous byte
        0, 0, 0, 0, 0, 0, 0, // padding to the struct boundary
        42, // a
        0, 0, 0, // padding
        4, 0, 0, 0, b'd', b'b', b'u', b's', 0, // b
        0, 0, 0, // padding
        0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0x40, // c
    ];

    assert_eq!(buf.get(), expected);
    assert_eq!(buf.signature(), Signature::new(b"y(ysd)").unwrap());
}

#[test]
fn array_of_structs() {
    let expected = [
        72, 0, 0, 0, // byte length
        0, 0, 0, 0, // padding to the element alignment
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'1', 0, // example1
        0, 0, 0, // padding
        0x32, 0x09, 0x01, 0, 0, 0, 0, 0, // 67890
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'2', 0, // example2
        0, 0, 0, // padding
        0x0b, 0x35, 0, 0, 0, 0, 0, 0, // 13579
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'3', 0, // example3
        0, 0, 0, // padding
        0x68, 0x60, 0, 0, 0, 0, 0, 0, // 24680
    ];

    let values = vec![
        ("example1".to_owned(), 67890u64),
        ("example2".to_owned(), 13579u64),
        ("example3".to_owned(), 24680u64),
    ];

    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<Vec<(String, u64)>>(&expected), values);
}

#[test]
fn struct_of_arrays_of_structs() {
    let value = (
        12345u64,
        vec![("example1".to_owned(), 67890u64), ("example2".to_owned(), 13579u64)],
        vec![("example3".to_owned(), 24680u64)],
        "end".to_owned(),
    );

    let expected = [
        0x39, 0x30, 0, 0, 0, 0, 0, 0, // a = 12345
        48, 0, 0, 0, // bars byte length
        0, 0, 0, 0, // padding
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'1', 0, 0, 0, 0, //
        0x32, 0x09, 0x01, 0, 0, 0, 0, 0, //
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'2', 0, 0, 0, 0, //
        0x0b, 0x35, 0, 0, 0, 0, 0, 0, //
        24, 0, 0, 0, // bars2 byte length
        0, 0, 0, 0, // padding
        8, 0, 0, 0, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'3', 0, 0, 0, 0, //
        0x68, 0x60, 0, 0, 0, 0, 0, 0, //
        3, 0, 0, 0, b'e', b'n', b'd', 0, // b = "end"
    ];

    assert_eq!(encode(&value), expected);
    assert_eq!(
        decode::<(u64, Vec<(String, u64)>, Vec<(String, u64)>, String)>(&expected),
        value
    );
}

#[test]
fn empty_map_still_pads_to_entry_alignment() {
    // Dict entries are 8-aligned, so even an empty dict carries the
    // padding up to the first entry.
    assert_eq!(
        encode(&BTreeMap::<String, u64>::new()),
        [0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn map_wire_form() {
    let expected = [
        48, 0, 0, 0, // byte length
        0, 0, 0, 0, // padding to the entry alignment
        4, 0, 0, 0, b'k', b'e', b'y', b'1', 0, // key1
        0, 0, 0, 0, 0, 0, 0, // padding
        123, 0, 0, 0, 0, 0, 0, 0, // 123
        4, 0, 0, 0, b'k', b'e', b'y', b'2', 0, // key2
        0, 0, 0, 0, 0, 0, 0, // padding
        0xc8, 0x01, 0, 0, 0, 0, 0, 0, // 456
    ];

    let values = BTreeMap::from([("key1".to_owned(), 123u64), ("key2".to_owned(), 456u64)]);
    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<BTreeMap<String, u64>>(&expected), values);

    let hashed: HashMap<String, u64> = decode(&expected);
    assert_eq!(hashed.len(), 2);
    assert_eq!(hashed["key1"], 123);
    assert_eq!(hashed["key2"], 456);
}

#[test]
fn map_of_maps() {
    let expected = [
        48, 0, 0, 0, // outer byte length
        0, 0, 0, 0, // padding
        8, 0, 0, 0, b'o', b'u', b't', b'e', b'r', b'K', b'e', b'y', 0, // outerKey
        0, 0, 0, // padding to the inner length prefix
        24, 0, 0, 0, // inner byte length
        0, 0, 0, 0, // padding
        8, 0, 0, 0, b'i', b'n', b'n', b'e', b'r', b'K', b'e', b'y', 0, // innerKey
        0, 0, 0, // padding
        0x15, 0x03, 0, 0, 0, 0, 0, 0, // 789
    ];

    let values = BTreeMap::from([(
        "outerKey".to_owned(),
        BTreeMap::from([("innerKey".to_owned(), 789u64)]),
    )]);

    assert_eq!(encode(&values), expected);
    assert_eq!(decode::<BTreeMap<String, BTreeMap<String, u64>>>(&expected), values);
}

#[test]
fn variant_string() {
    let expected = [
        1, b's', 0, // signature
        0, // padding to the string length
        7, 0, 0, 0, b'v', b'a', b'r', b'i', b'a', b'n', b't', 0,
    ];

    assert_eq!(encode(&Variant::String("variant")), expected);
    assert_eq!(decode::<Variant<'_>>(&expected), Variant::String("variant"));
}

#[test]
fn variant_i32() {
    let expected = [
        1, b'i', 0, // signature
        0, // padding
        64, 226, 1, 0, // 123456
    ];

    assert_eq!(encode(&Variant::I32(123456)), expected);
    assert_eq!(decode::<Variant<'_>>(&expected), Variant::I32(123456));
}

#[test]
fn variant_f64() {
    let expected = [
        1, b'd', 0, // signature
        0, 0, 0, 0, 0, // padding
        0x48, 0xe1, 0x7a, 0x14, 0xae, 0xe5, 0x94, 0x40,
    ];

    assert_eq!(encode(&Variant::F64(1337.42)), expected);
    assert_eq!(decode::<Variant<'_>>(&expected), Variant::F64(1337.42));
}

#[test]
fn variant_unknown_signature() {
    // An array signature matches no basic alternative.
    let bytes = [2, b'a', b'y', 0, 0, 0, 0, 0];
    let mut cursor = Cursor::new(&bytes, Endianness::LITTLE);
    let error = cursor.read::<Variant<'_>>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::UnexpectedVariant(0)));
}

#[test]
fn labeled_enum_wire_form() {
    crate::labeled_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum EnumAsString {
            A = "a",
            B = "b",
            C = "c",
        }
    }

    assert_eq!(encode(&EnumAsString::B), [1, 0, 0, 0, b'b', 0]);
    assert_eq!(decode::<EnumAsString>(&[1, 0, 0, 0, b'a', 0]), EnumAsString::A);
    assert_eq!(decode::<EnumAsString>(&[1, 0, 0, 0, b'c', 0]), EnumAsString::C);

    let mut cursor = Cursor::new(&[1, 0, 0, 0, b'z', 0], Endianness::LITTLE);
    let error = cursor.read::<EnumAsString>().unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::UnexpectedEnum(0)));
}

#[test]
fn alignment_from_every_offset() {
    for offset in 1..=8usize {
        let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);

        for _ in 0..offset {
            buf.put_u8(0).unwrap();
        }

        buf.store(&0x1234u64).unwrap();

        let padding = (8 - offset % 8) % 8;
        assert_eq!(buf.len(), offset + padding + 8, "offset {offset}");
        // Padding bytes are zero.
        assert!(buf.get()[offset..offset + padding].iter().all(|&b| b == 0));
    }

    for offset in 1..=4usize {
        let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);

        for _ in 0..offset {
            buf.put_u8(0).unwrap();
        }

        buf.store("foo").unwrap();

        let padding = (4 - offset % 4) % 4;
        assert_eq!(buf.len(), offset + padding + 4 + 3 + 1, "offset {offset}");
    }
}

#[test]
fn fixed_capacity_buffer() {
    let mut buf = BodyBuf::fixed(4);
    buf.store(&1u32).unwrap();

    let error = buf.store(&2u32).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::BufferTooSmall(4)));
}

#[test]
fn signature_accumulates_across_stores() {
    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(&10u8).unwrap();
    buf.store(&(10u16, 10u32)).unwrap();
    buf.store(&vec![1u8, 2, 3]).unwrap();
    buf.store("Hello World").unwrap();

    assert_eq!(buf.signature(), Signature::new(b"y(qu)ays").unwrap());
}

#[test]
fn signature_of_matches_encode() {
    let sig = signature_of::<BTreeMap<String, Vec<(u8, u64)>>>().unwrap();
    assert_eq!(&*sig, Signature::new(b"a{sa(yt)}").unwrap());

    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(&BTreeMap::<String, Vec<(u8, u64)>>::new()).unwrap();
    assert_eq!(buf.signature(), &*sig);
}

#[test]
fn round_trip_preserves_order_and_association() {
    let value = (
        vec!["c".to_owned(), "a".to_owned(), "b".to_owned()],
        BTreeMap::from([(1u32, "one".to_owned()), (2u32, "two".to_owned())]),
        Variant::U64(99),
    );

    let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
    buf.store(&value).unwrap();

    let mut cursor = Cursor::new(buf.get(), Endianness::LITTLE);
    let decoded: (Vec<String>, BTreeMap<u32, String>, Variant<'_>) = cursor.read().unwrap();

    assert_eq!(decoded.0, value.0);
    assert_eq!(decoded.1, value.1);
    assert_eq!(decoded.2, Variant::U64(99));
    assert!(cursor.is_empty());
}
