use krait_asn1::wrapper::{IntegerAsn1, SequenceAsn1Container, Utf8StringAsn1};
use krait_asn1_der::{from_bytes, to_vec, Asn1DerError};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Pair {
    number: u32,
    name: Utf8StringAsn1,
}

#[test]
fn truncated_payload() {
    // declared length runs past the available input
    match from_bytes::<Pair>(b"\x30\x09\x02\x01\x07\x0c\x04hi") {
        Err(Asn1DerError::TruncatedData) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn truncated_header() {
    match from_bytes::<u32>(b"\x02") {
        Err(Asn1DerError::TruncatedData) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn indefinite_length_is_rejected() {
    match from_bytes::<Pair>(b"\x30\x80\x02\x01\x07\x0c\x02hi\x00\x00") {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn trailing_bytes_after_root() {
    match from_bytes::<u32>(b"\x02\x01\x07\x00") {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn boolean_tag_is_not_supported() {
    match from_bytes::<u32>(b"\x01\x01\xff") {
        Err(Asn1DerError::UnsupportedTag(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn multi_octet_tag_is_rejected() {
    match from_bytes::<u32>(b"\x1f\x81\x00\x01\x00") {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn charset_violation_is_reported() {
    // '\t' is not a PrintableString character
    #[derive(Deserialize, Debug)]
    struct Labeled {
        name: krait_asn1::wrapper::PrintableStringAsn1,
    }

    match from_bytes::<Labeled>(b"\x30\x03\x13\x01\x09") {
        Err(Asn1DerError::Validation(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn wrong_element_type_is_a_schema_mismatch() {
    match from_bytes::<Pair>(b"\x30\x08\x0c\x02hi\x02\x01\x07") {
        Err(Asn1DerError::SchemaMismatch { expected, .. }) => assert_eq!(expected, "INTEGER"),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn bare_string_field_is_a_schema_mismatch() {
    #[derive(Serialize, Deserialize, Debug)]
    struct Unannotated {
        name: String,
    }

    match to_vec(&Unannotated { name: "hi".to_owned() }) {
        Err(Asn1DerError::SchemaMismatch { .. }) => (),
        result => panic!("unexpected result: {:?}", result),
    }

    match from_bytes::<Unannotated>(b"\x30\x04\x0c\x02hi") {
        Err(Asn1DerError::SchemaMismatch { .. }) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn integer_width_overflow() {
    match from_bytes::<u8>(b"\x02\x02\x01\x00") {
        Err(Asn1DerError::UnsupportedValue(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn negative_integer_into_unsigned() {
    match from_bytes::<u32>(b"\x02\x01\xff") {
        Err(Asn1DerError::UnsupportedValue(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn empty_integer_payload() {
    match from_bytes::<u32>(b"\x02\x00") {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn empty_wrapping_sequence() {
    match from_bytes::<SequenceAsn1Container<u32>>(b"\x30\x00") {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn boolean_value_cannot_be_serialized() {
    match to_vec(&true) {
        Err(Asn1DerError::UnsupportedType(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}

#[test]
fn empty_integer_wrapper_cannot_be_serialized() {
    match to_vec(&IntegerAsn1(Vec::new())) {
        Err(Asn1DerError::Format(_)) => (),
        result => panic!("unexpected result: {:?}", result),
    }
}
