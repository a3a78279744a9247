//! The decoded element tree.

use crate::misc::{Length, WriteExt};
use crate::Result;
use krait_asn1::bit_string::BitString;
use krait_asn1::date::UTCTime;
use krait_asn1::oid::ObjectIdentifier;
use krait_asn1::restricted_string::{
    BmpString, IA5String, PrintableString, T61String, UniversalString,
};
use krait_asn1::tag::Tag;
use num_bigint_dig::BigInt;
use std::io::Write;

/// One ASN.1 value, possibly holding nested children.
///
/// Every variant maps to a fixed universal tag except [`ContextSpecific`],
/// whose tag number is schema-supplied. SEQUENCE and SET children keep
/// their physical order on both encode and decode.
///
/// [`ContextSpecific`]: Asn1Element::ContextSpecific
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asn1Element {
    Integer(BigInt),
    BitString(BitString),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Utf8String(String),
    PrintableString(PrintableString),
    T61String(T61String),
    IA5String(IA5String),
    BmpString(BmpString),
    UniversalString(UniversalString),
    UtcTime(UTCTime),
    Sequence(Vec<Asn1Element>),
    Set(Vec<Asn1Element>),
    ContextSpecific { number: u8, inner: Box<Asn1Element> },
}

impl Asn1Element {
    pub fn tag(&self) -> Tag {
        match self {
            Asn1Element::Integer(_) => Tag::INTEGER,
            Asn1Element::BitString(_) => Tag::BIT_STRING,
            Asn1Element::OctetString(_) => Tag::OCTET_STRING,
            Asn1Element::Null => Tag::NULL,
            Asn1Element::ObjectIdentifier(_) => Tag::OID,
            Asn1Element::Utf8String(_) => Tag::UTF8_STRING,
            Asn1Element::PrintableString(_) => Tag::PRINTABLE_STRING,
            Asn1Element::T61String(_) => Tag::T61_STRING,
            Asn1Element::IA5String(_) => Tag::IA5_STRING,
            Asn1Element::BmpString(_) => Tag::BMP_STRING,
            Asn1Element::UniversalString(_) => Tag::UNIVERSAL_STRING,
            Asn1Element::UtcTime(_) => Tag::UTC_TIME,
            Asn1Element::Sequence(_) => Tag::SEQUENCE,
            Asn1Element::Set(_) => Tag::SET,
            Asn1Element::ContextSpecific { number, .. } => Tag::context_specific(*number),
        }
    }

    /// ASN.1 notation name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Asn1Element::Integer(_) => "INTEGER",
            Asn1Element::BitString(_) => "BIT STRING",
            Asn1Element::OctetString(_) => "OCTET STRING",
            Asn1Element::Null => "NULL",
            Asn1Element::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Asn1Element::Utf8String(_) => "UTF8String",
            Asn1Element::PrintableString(_) => "PrintableString",
            Asn1Element::T61String(_) => "T61String",
            Asn1Element::IA5String(_) => "IA5String",
            Asn1Element::BmpString(_) => "BMPString",
            Asn1Element::UniversalString(_) => "UniversalString",
            Asn1Element::UtcTime(_) => "UTCTime",
            Asn1Element::Sequence(_) => "SEQUENCE",
            Asn1Element::Set(_) => "SET",
            Asn1Element::ContextSpecific { .. } => "context-specific",
        }
    }

    /// Children of a SEQUENCE or SET, `None` for any other variant.
    pub fn children(&self) -> Option<&[Asn1Element]> {
        match self {
            Asn1Element::Sequence(children) | Asn1Element::Set(children) => Some(children),
            _ => None,
        }
    }

    /// The content octets, without tag and length.
    pub fn payload(&self) -> Result<Vec<u8>> {
        match self {
            Asn1Element::Integer(value) => Ok(value.to_signed_bytes_be()),
            Asn1Element::BitString(bits) => Ok(bits.to_payload()),
            Asn1Element::OctetString(bytes) => Ok(bytes.clone()),
            Asn1Element::Null => Ok(Vec::new()),
            Asn1Element::ObjectIdentifier(oid) => Ok(oid.to_payload()),
            Asn1Element::Utf8String(s) => Ok(s.as_bytes().to_vec()),
            Asn1Element::PrintableString(s) => Ok(s.as_bytes().to_vec()),
            Asn1Element::IA5String(s) => Ok(s.as_bytes().to_vec()),
            // T61 payloads are one octet per character (Latin-1)
            Asn1Element::T61String(s) => Ok(s.chars().map(|c| c as u8).collect()),
            Asn1Element::BmpString(s) => {
                Ok(s.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect())
            }
            Asn1Element::UniversalString(s) => {
                Ok(s.chars().flat_map(|c| (c as u32).to_be_bytes()).collect())
            }
            Asn1Element::UtcTime(time) => Ok(time.to_payload().to_vec()),
            Asn1Element::Sequence(children) | Asn1Element::Set(children) => {
                let mut out = Vec::new();
                for child in children {
                    child.serialize_into(&mut out)?;
                }
                Ok(out)
            }
            Asn1Element::ContextSpecific { inner, .. } => inner.to_vec(),
        }
    }

    /// Writes the complete TLV encoding and returns the amount of bytes
    /// written.
    pub fn serialize_into(&self, mut writer: impl Write) -> Result<usize> {
        let payload = self.payload()?;
        let mut written = writer.write_one(self.tag().octet())?;
        written += Length::serialize(payload.len(), &mut writer)?;
        written += writer.write_exact(&payload)?;
        Ok(written)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize_into(&mut out)?;
        Ok(out)
    }
}

impl From<BigInt> for Asn1Element {
    fn from(value: BigInt) -> Self {
        Asn1Element::Integer(value)
    }
}

impl From<ObjectIdentifier> for Asn1Element {
    fn from(oid: ObjectIdentifier) -> Self {
        Asn1Element::ObjectIdentifier(oid)
    }
}
