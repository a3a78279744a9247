//! Mapping from serde newtype marker names to field directives.
//!
//! The wrapper types in `krait_asn1::wrapper` (and the payload-carrying base
//! types) announce themselves through `serialize_newtype_struct` /
//! `deserialize_newtype_struct` with a well-known name. This module is the
//! single table translating those names into the directive the codec applies
//! to the value that follows.

use krait_asn1::bit_string::BitString;
use krait_asn1::date::UTCTime;
use krait_asn1::oid::ObjectIdentifier;
use krait_asn1::wrapper::*;
use krait_asn1::Asn1Type;

/// String variant of a text field. There is no implicit default: a text
/// field without one of the string wrappers is a schema error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    Utf8,
    Printable,
    T61,
    Ia5,
    Bmp,
    Universal,
}

impl StringKind {
    pub fn type_name(self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8String",
            StringKind::Printable => "PrintableString",
            StringKind::T61 => "T61String",
            StringKind::Ia5 => "IA5String",
            StringKind::Bmp => "BMPString",
            StringKind::Universal => "UniversalString",
        }
    }
}

/// Interpretation of a byte buffer crossing the serde boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BytesKind {
    OctetString,
    Integer,
    Oid,
    BitString,
    UtcTime,
}

impl BytesKind {
    pub fn type_name(self) -> &'static str {
        match self {
            BytesKind::OctetString => "OCTET STRING",
            BytesKind::Integer => "INTEGER",
            BytesKind::Oid => "OBJECT IDENTIFIER",
            BytesKind::BitString => "BIT STRING",
            BytesKind::UtcTime => "UTCTime",
        }
    }
}

/// Constructed rendering of the next record or list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionKind {
    Sequence,
    Set,
}

impl CollectionKind {
    pub fn type_name(self) -> &'static str {
        match self {
            CollectionKind::Sequence => "SEQUENCE",
            CollectionKind::Set => "SET",
        }
    }
}

pub enum Directive {
    Text(StringKind),
    Bytes(BytesKind),
    Collection(CollectionKind),
    WrapIntoOctetString,
    WrapIntoBitString,
    WrapIntoSequence,
    ContextTag(u8),
}

/// Display names of the sixteen context tag wrappers, indexed by number.
pub const CONTEXT_TAG_NAMES: [&str; 16] = [
    "ContextTag0",
    "ContextTag1",
    "ContextTag2",
    "ContextTag3",
    "ContextTag4",
    "ContextTag5",
    "ContextTag6",
    "ContextTag7",
    "ContextTag8",
    "ContextTag9",
    "ContextTag10",
    "ContextTag11",
    "ContextTag12",
    "ContextTag13",
    "ContextTag14",
    "ContextTag15",
];

pub fn for_marker(name: &str) -> Option<Directive> {
    let directive = match name {
        Utf8StringAsn1::NAME => Directive::Text(StringKind::Utf8),
        PrintableStringAsn1::NAME => Directive::Text(StringKind::Printable),
        T61StringAsn1::NAME => Directive::Text(StringKind::T61),
        IA5StringAsn1::NAME => Directive::Text(StringKind::Ia5),
        BmpStringAsn1::NAME => Directive::Text(StringKind::Bmp),
        UniversalStringAsn1::NAME => Directive::Text(StringKind::Universal),
        OctetStringAsn1::NAME => Directive::Bytes(BytesKind::OctetString),
        IntegerAsn1::NAME => Directive::Bytes(BytesKind::Integer),
        ObjectIdentifier::NAME => Directive::Bytes(BytesKind::Oid),
        BitString::NAME => Directive::Bytes(BytesKind::BitString),
        UTCTime::NAME => Directive::Bytes(BytesKind::UtcTime),
        Asn1SequenceOf::<()>::NAME => Directive::Collection(CollectionKind::Sequence),
        Asn1SetOf::<()>::NAME | SetAsn1::<()>::NAME => Directive::Collection(CollectionKind::Set),
        OctetStringAsn1Container::<()>::NAME => Directive::WrapIntoOctetString,
        BitStringAsn1Container::<()>::NAME => Directive::WrapIntoBitString,
        SequenceAsn1Container::<()>::NAME => Directive::WrapIntoSequence,
        ContextTag0::<()>::NAME => Directive::ContextTag(0),
        ContextTag1::<()>::NAME => Directive::ContextTag(1),
        ContextTag2::<()>::NAME => Directive::ContextTag(2),
        ContextTag3::<()>::NAME => Directive::ContextTag(3),
        ContextTag4::<()>::NAME => Directive::ContextTag(4),
        ContextTag5::<()>::NAME => Directive::ContextTag(5),
        ContextTag6::<()>::NAME => Directive::ContextTag(6),
        ContextTag7::<()>::NAME => Directive::ContextTag(7),
        ContextTag8::<()>::NAME => Directive::ContextTag(8),
        ContextTag9::<()>::NAME => Directive::ContextTag(9),
        ContextTag10::<()>::NAME => Directive::ContextTag(10),
        ContextTag11::<()>::NAME => Directive::ContextTag(11),
        ContextTag12::<()>::NAME => Directive::ContextTag(12),
        ContextTag13::<()>::NAME => Directive::ContextTag(13),
        ContextTag14::<()>::NAME => Directive::ContextTag(14),
        ContextTag15::<()>::NAME => Directive::ContextTag(15),
        _ => return None,
    };
    Some(directive)
}
