use krait_asn1::tag::{Tag, TagPeeker};
use krait_asn1::wrapper::{PrintableStringAsn1, Utf8StringAsn1};
use krait_asn1_der::{from_bytes, to_vec};
use pretty_assertions::assert_eq;
use serde::{de, Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Debug, PartialEq)]
enum DirectoryString {
    Utf8(Utf8StringAsn1),
    Printable(PrintableStringAsn1),
}

impl<'de> de::Deserialize<'de> for DirectoryString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = DirectoryString;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a UTF8String or a PrintableString")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let peeked = seq
                    .next_element::<TagPeeker>()?
                    .ok_or_else(|| de::Error::custom("choice element is missing"))?;
                match peeked.next_tag {
                    Tag::UTF8_STRING => Ok(DirectoryString::Utf8(
                        seq.next_element()?
                            .ok_or_else(|| de::Error::custom("choice element is missing"))?,
                    )),
                    Tag::PRINTABLE_STRING => Ok(DirectoryString::Printable(
                        seq.next_element()?
                            .ok_or_else(|| de::Error::custom("choice element is missing"))?,
                    )),
                    tag => Err(de::Error::invalid_value(
                        de::Unexpected::Other(&tag.to_string()),
                        &"a UTF8String or a PrintableString",
                    )),
                }
            }
        }

        deserializer.deserialize_enum("DirectoryString", &["Utf8", "Printable"], Visitor)
    }
}

#[test]
fn choice_decodes_by_tag() {
    let utf8: DirectoryString = from_bytes(b"\x0c\x02hi").unwrap();
    assert_eq!(utf8, DirectoryString::Utf8(Utf8StringAsn1::from("hi")));

    let printable: DirectoryString = from_bytes(b"\x13\x02hi").unwrap();
    match printable {
        DirectoryString::Printable(s) => assert_eq!(s.as_str(), "hi"),
        other => panic!("wrong alternative: {:?}", other),
    }
}

#[test]
fn choice_encodes_transparently() {
    let encoded = to_vec(&DirectoryString::Utf8(Utf8StringAsn1::from("hi"))).unwrap();
    assert_eq!(encoded, b"\x0c\x02hi".to_vec());
}

#[test]
fn choice_rejects_other_alternatives() {
    assert!(from_bytes::<DirectoryString>(b"\x02\x01\x07").is_err());
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Attribute {
    value: DirectoryString,
    weight: u8,
}

#[test]
fn choice_inside_a_record() {
    let attribute = Attribute {
        value: DirectoryString::Utf8(Utf8StringAsn1::from("hi")),
        weight: 3,
    };
    let der = b"\x30\x07\x0c\x02hi\x02\x01\x03";

    assert_eq!(to_vec(&attribute).unwrap(), der.to_vec());

    let decoded: Attribute = from_bytes(der).unwrap();
    assert_eq!(decoded, attribute);
}
