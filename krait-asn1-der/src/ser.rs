use crate::directive::{self, BytesKind, CollectionKind, Directive, StringKind};
use crate::element::Asn1Element;
use crate::{Asn1DerError, Result};
use krait_asn1::bit_string::BitString;
use krait_asn1::date::UTCTime;
use krait_asn1::oid::ObjectIdentifier;
use krait_asn1::restricted_string::{
    BmpString, IA5String, PrintableString, T61String, UniversalString,
};
use num_bigint_dig::BigInt;
use serde::Serialize;
use std::io::Write;
use std::mem;

/// Serializes `value` into its element tree.
pub fn to_element<T: ?Sized + Serialize>(value: &T) -> Result<Asn1Element> {
    debug_log!("serialization using `to_element`");
    let mut serializer = Serializer::new();
    value.serialize(&mut serializer)
}

/// Serializes `value`
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    debug_log!("serialization using `to_vec`");
    to_element(value)?.to_vec()
}

/// Serializes `value` to `writer` and returns the amount of serialized bytes
pub fn to_writer<T: ?Sized + Serialize>(value: &T, writer: impl Write) -> Result<usize> {
    debug_log!("serialization using `to_writer`");
    to_element(value)?.serialize_into(writer)
}

/// A serde serializer assembling one element bottom-up.
///
/// Wrapper markers deposit a directive consumed by the next leaf or
/// collection; encapsulating wrappers recurse first and then wrap the
/// finished element.
pub struct Serializer {
    text_kind: Option<StringKind>,
    bytes_kind: BytesKind,
    collection_kind: CollectionKind,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            text_kind: None,
            bytes_kind: BytesKind::OctetString,
            collection_kind: CollectionKind::Sequence,
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> serde::ser::Serializer for &'a mut Serializer {
    type Ok = Asn1Element;
    type Error = Asn1DerError;

    type SerializeSeq = SequenceSerializer<'a>;
    type SerializeTuple = SequenceSerializer<'a>;
    type SerializeTupleStruct = SequenceSerializer<'a>;
    type SerializeTupleVariant = serde::ser::Impossible<Asn1Element, Asn1DerError>;
    type SerializeMap = serde::ser::Impossible<Asn1Element, Asn1DerError>;
    type SerializeStruct = SequenceSerializer<'a>;
    type SerializeStructVariant = serde::ser::Impossible<Asn1Element, Asn1DerError>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok> {
        debug_log!("serialize_bool: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("BOOLEAN is not part of the supported subset"))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        debug_log!("serialize_i8: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        debug_log!("serialize_i16: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        debug_log!("serialize_i32: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        debug_log!("serialize_i64: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        debug_log!("serialize_i128: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        debug_log!("serialize_u8: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        debug_log!("serialize_u16: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        debug_log!("serialize_u32: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        debug_log!("serialize_u64: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        debug_log!("serialize_u128: {}", v);
        Ok(Asn1Element::Integer(BigInt::from(v)))
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok> {
        debug_log!("serialize_f32: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("floating point values have no ASN.1 mapping here"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok> {
        debug_log!("serialize_f64: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("floating point values have no ASN.1 mapping here"))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        debug_log!("serialize_char: {}", v);
        let mut buf = [0; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        debug_log!("serialize_str: {}", v);
        let kind = self.text_kind.take().ok_or(Asn1DerError::SchemaMismatch {
            expected: "a string-variant wrapper around the text field",
            found: "a bare text value",
        })?;
        let element = match kind {
            StringKind::Utf8 => Asn1Element::Utf8String(v.to_owned()),
            StringKind::Printable => Asn1Element::PrintableString(PrintableString::new(v)?),
            StringKind::T61 => Asn1Element::T61String(T61String::new(v)?),
            StringKind::Ia5 => Asn1Element::IA5String(IA5String::new(v)?),
            StringKind::Bmp => Asn1Element::BmpString(BmpString::new(v)?),
            StringKind::Universal => Asn1Element::UniversalString(UniversalString::new(v)?),
        };
        Ok(element)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        debug_log!("serialize_bytes ({} bytes)", v.len());
        match mem::replace(&mut self.bytes_kind, BytesKind::OctetString) {
            BytesKind::OctetString => Ok(Asn1Element::OctetString(v.to_vec())),
            BytesKind::Integer => {
                if v.is_empty() {
                    return Err(Asn1DerError::Format("INTEGER requires at least one content octet"));
                }
                Ok(Asn1Element::Integer(BigInt::from_signed_bytes_be(v)))
            }
            BytesKind::Oid => ObjectIdentifier::from_payload(v)
                .map(Asn1Element::ObjectIdentifier)
                .map_err(|_| Asn1DerError::Format("invalid OBJECT IDENTIFIER content octets")),
            BytesKind::BitString => BitString::from_payload(v)
                .map(Asn1Element::BitString)
                .ok_or(Asn1DerError::Format("invalid BIT STRING content octets")),
            BytesKind::UtcTime => UTCTime::from_payload(v)
                .map(Asn1Element::UtcTime)
                .ok_or(Asn1DerError::Format("invalid UTCTime content octets")),
        }
    }

    /// An absent optional still occupies its field position as NULL.
    fn serialize_none(self) -> Result<Self::Ok> {
        debug_log!("serialize_none");
        Ok(Asn1Element::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok> {
        debug_log!("serialize_some");
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        debug_log!("serialize_unit");
        Ok(Asn1Element::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        debug_log!("serialize_unit_struct: {}", _name);
        Ok(Asn1Element::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok> {
        debug_log!("serialize_unit_variant: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("unit enum variants have no ASN.1 mapping"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        debug_log!("serialize_newtype_struct: {}", name);
        match directive::for_marker(name) {
            Some(Directive::Text(kind)) => {
                self.text_kind = Some(kind);
                value.serialize(self)
            }
            Some(Directive::Bytes(kind)) => {
                self.bytes_kind = kind;
                value.serialize(self)
            }
            Some(Directive::Collection(kind)) => {
                self.collection_kind = kind;
                value.serialize(self)
            }
            Some(Directive::WrapIntoOctetString) => {
                let inner = value.serialize(&mut *self)?;
                Ok(Asn1Element::OctetString(inner.to_vec()?))
            }
            Some(Directive::WrapIntoBitString) => {
                let inner = value.serialize(&mut *self)?;
                Ok(Asn1Element::BitString(BitString::with_bytes(inner.to_vec()?)))
            }
            Some(Directive::WrapIntoSequence) => {
                let inner = value.serialize(&mut *self)?;
                Ok(Asn1Element::Sequence(vec![inner]))
            }
            Some(Directive::ContextTag(number)) => {
                let inner = value.serialize(&mut *self)?;
                Ok(Asn1Element::ContextSpecific {
                    number,
                    inner: Box::new(inner),
                })
            }
            None => value.serialize(self),
        }
    }

    /// CHOICE alternatives serialize transparently; the tag of the inner
    /// value is the discriminant on the wire.
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        debug_log!("serialize_newtype_variant: {}", _variant);
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        debug_log!("serialize_seq");
        let kind = mem::replace(&mut self.collection_kind, CollectionKind::Sequence);
        Ok(SequenceSerializer {
            ser: self,
            kind,
            children: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        debug_log!("serialize_tuple: {}", len);
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        debug_log!("serialize_tuple_struct: {}({})", _name, len);
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        debug_log!("serialize_tuple_variant: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("tuple enum variants have no ASN.1 mapping"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        debug_log!("serialize_map: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("maps have no ASN.1 mapping"))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        debug_log!("serialize_struct: {}", _name);
        self.serialize_seq(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        debug_log!("serialize_struct_variant: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("struct enum variants have no ASN.1 mapping"))
    }
}

/// Accumulates the children of a SEQUENCE or SET under construction.
pub struct SequenceSerializer<'a> {
    ser: &'a mut Serializer,
    kind: CollectionKind,
    children: Vec<Asn1Element>,
}

impl SequenceSerializer<'_> {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let child = value.serialize(&mut *self.ser)?;
        self.children.push(child);
        Ok(())
    }

    fn finish(self) -> Result<Asn1Element> {
        match self.kind {
            CollectionKind::Sequence => Ok(Asn1Element::Sequence(self.children)),
            CollectionKind::Set => Ok(Asn1Element::Set(self.children)),
        }
    }
}

impl serde::ser::SerializeSeq for SequenceSerializer<'_> {
    type Ok = Asn1Element;
    type Error = Asn1DerError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeTuple for SequenceSerializer<'_> {
    type Ok = Asn1Element;
    type Error = Asn1DerError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleStruct for SequenceSerializer<'_> {
    type Ok = Asn1Element;
    type Error = Asn1DerError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeStruct for SequenceSerializer<'_> {
    type Ok = Asn1Element;
    type Error = Asn1DerError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}
