use krait_asn1::wrapper::{
    Asn1SequenceOf, Asn1SetOf, BitStringAsn1Container, BmpStringAsn1, ContextTag0, ContextTag3,
    IntegerAsn1, ObjectIdentifierAsn1, OctetStringAsn1, OctetStringAsn1Container,
    PrintableStringAsn1, SequenceAsn1Container, SetAsn1, T61StringAsn1, UniversalStringAsn1,
    Utf8StringAsn1, UtcTimeAsn1,
};
use krait_asn1::date::UTCTime;
use krait_asn1::restricted_string::{BmpString, T61String, UniversalString};
use krait_asn1_der::{from_bytes, to_vec};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

fn h(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0);
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AlgorithmRecord {
    value: Option<u32>,
    identifier: ObjectIdentifierAsn1,
    value1: Utf8StringAsn1,
    value2: PrintableStringAsn1,
}

fn algorithm_record(value: Option<u32>) -> AlgorithmRecord {
    AlgorithmRecord {
        value,
        identifier: ObjectIdentifierAsn1("1.2.840.113549.1.1.1".parse().unwrap()),
        value1: Utf8StringAsn1::from("Test1"),
        value2: PrintableStringAsn1(krait_asn1::restricted_string::PrintableString::new("Test2").unwrap()),
    }
}

#[test]
fn mixed_record_round_trip() {
    let der = h("301c02010106092a864886f70d0101010c05546573743113055465737432");
    let record = algorithm_record(Some(1));

    assert_eq!(to_vec(&record).unwrap(), der);

    let decoded: AlgorithmRecord = from_bytes(&der).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn absent_optional_occupies_its_position_as_null() {
    let der = h("301b050006092a864886f70d0101010c05546573743113055465737432");
    let record = algorithm_record(None);

    assert_eq!(to_vec(&record).unwrap(), der);

    let decoded: AlgorithmRecord = from_bytes(&der).unwrap();
    assert_eq!(decoded, record);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Counter {
    value: u32,
}

#[test]
fn record_wrapped_into_an_octet_string() {
    let wrapped = OctetStringAsn1Container(Counter { value: 1 });
    let der = h("04053003020101");

    assert_eq!(to_vec(&wrapped).unwrap(), der);

    let decoded: OctetStringAsn1Container<Counter> = from_bytes(&der).unwrap();
    assert_eq!(decoded, wrapped);
}

#[test]
fn record_wrapped_into_an_additional_sequence() {
    let wrapped = SequenceAsn1Container(Counter { value: 1 });
    let der = h("30053003020101");

    assert_eq!(to_vec(&wrapped).unwrap(), der);

    let decoded: SequenceAsn1Container<Counter> = from_bytes(&der).unwrap();
    assert_eq!(decoded, wrapped);
}

#[test]
fn context_tags_carry_one_inner_element() {
    let tagged = ContextTag3(5u32);
    let der = h("a303020105");

    assert_eq!(to_vec(&tagged).unwrap(), der);

    let decoded: ContextTag3<u32> = from_bytes(&der).unwrap();
    assert_eq!(decoded, tagged);
}

#[test]
fn context_tag_number_mismatch_is_a_schema_error() {
    let der = h("a303020105");
    assert!(from_bytes::<ContextTag0<u32>>(&der).is_err());
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SetRecord {
    first: u8,
    second: u8,
}

#[test]
fn record_rendered_as_a_set_keeps_field_order() {
    let set = SetAsn1(SetRecord { first: 2, second: 1 });
    let der = h("3106020102020101");

    assert_eq!(to_vec(&set).unwrap(), der);

    let decoded: SetAsn1<SetRecord> = from_bytes(&der).unwrap();
    assert_eq!(decoded, set);
}

#[test]
fn set_of_preserves_physical_order() {
    // 3, 1, 2: no canonical reordering on either side
    let values = Asn1SetOf(vec![3u8, 1, 2]);
    let der = h("3109020103020101020102");

    assert_eq!(to_vec(&values).unwrap(), der);

    let decoded: Asn1SetOf<u8> = from_bytes(&der).unwrap();
    assert_eq!(decoded, values);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Inventory {
    label: Utf8StringAsn1,
    quantities: Asn1SequenceOf<u16>,
}

#[test]
fn list_field_drains_its_own_container() {
    let inventory = Inventory {
        label: Utf8StringAsn1::from("box"),
        quantities: Asn1SequenceOf(vec![1, 500, 3]),
    };
    let der = h("30110c03626f78300a020101020201f4020103");

    assert_eq!(to_vec(&inventory).unwrap(), der);

    let decoded: Inventory = from_bytes(&der).unwrap();
    assert_eq!(decoded, inventory);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AlgorithmIdentifier {
    algorithm: ObjectIdentifierAsn1,
    parameters: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RsaPublicKey {
    modulus: IntegerAsn1,
    public_exponent: IntegerAsn1,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SubjectPublicKeyInfo {
    algorithm: AlgorithmIdentifier,
    subject_public_key: BitStringAsn1Container<RsaPublicKey>,
}

#[test]
fn public_key_info_shape() {
    let spki = SubjectPublicKeyInfo {
        algorithm: AlgorithmIdentifier {
            algorithm: ObjectIdentifierAsn1("1.2.840.113549.1.1.1".parse().unwrap()),
            parameters: None,
        },
        subject_public_key: BitStringAsn1Container(RsaPublicKey {
            modulus: IntegerAsn1::from_bytes_be_unsigned(vec![0xC3, 0x5B]),
            public_exponent: IntegerAsn1::from_bytes_be_unsigned(vec![0x01, 0x00, 0x01]),
        }),
    };
    let der = h("301e300d06092a864886f70d0101010500030d00300a020300c35b0203010001");

    assert_eq!(to_vec(&spki).unwrap(), der);

    let decoded: SubjectPublicKeyInfo = from_bytes(&der).unwrap();
    assert_eq!(decoded, spki);
    assert!(decoded
        .subject_public_key
        .0
        .modulus
        .is_positive());
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Validity {
    not_before: UtcTimeAsn1,
    not_after: UtcTimeAsn1,
}

#[test]
fn utc_time_fields() {
    let validity = Validity {
        not_before: UtcTimeAsn1(UTCTime::new(2024, 12, 29, 13, 37, 42).unwrap()),
        not_after: UtcTimeAsn1(UTCTime::new(2049, 1, 1, 0, 0, 0).unwrap()),
    };
    let mut der = h("301e");
    der.extend_from_slice(b"\x17\x0D241229133742Z");
    der.extend_from_slice(b"\x17\x0D490101000000Z");

    assert_eq!(to_vec(&validity).unwrap(), der);

    let decoded: Validity = from_bytes(&der).unwrap();
    assert_eq!(decoded, validity);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct LocalizedLabels {
    teletex: T61StringAsn1,
    basic_plane: BmpStringAsn1,
    full_range: UniversalStringAsn1,
}

#[test]
fn wide_string_variants_round_trip() {
    let labels = LocalizedLabels {
        teletex: T61StringAsn1(T61String::new("caf\u{e9}").unwrap()),
        basic_plane: BmpStringAsn1(BmpString::new("\u{82d7}").unwrap()),
        full_range: UniversalStringAsn1(UniversalString::new("\u{1f980}").unwrap()),
    };
    let der = b"\x30\x10\x14\x04caf\xE9\x1E\x02\x82\xD7\x1C\x04\x00\x01\xF9\x80";

    assert_eq!(to_vec(&labels).unwrap(), der.to_vec());

    let decoded: LocalizedLabels = from_bytes(der).unwrap();
    assert_eq!(decoded, labels);
}

#[test]
fn octet_string_bytes_round_trip() {
    let blob = OctetStringAsn1(vec![0xDE, 0xAD, 0xBE, 0xEF]);
    let der = h("0404deadbeef");

    assert_eq!(to_vec(&blob).unwrap(), der);

    let decoded: OctetStringAsn1 = from_bytes(&der).unwrap();
    assert_eq!(decoded, blob);
}
