use crate::directive::{self, BytesKind, CollectionKind, Directive, StringKind, CONTEXT_TAG_NAMES};
use crate::element::Asn1Element;
use crate::parser::{FactoryRegistry, Parser};
use crate::{Asn1DerError, Result};
use krait_asn1::tag::Tag;
use num_traits::ToPrimitive;
use serde::de::{self, Visitor};
use std::mem;

/// Deserializes `T` from `bytes` using the standard registry.
pub fn from_bytes<T: de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    debug_log!("deserialization using `from_bytes`");
    let registry = FactoryRegistry::standard();
    let element = Parser::new(&registry).parse(bytes)?;
    let mut deserializer = Deserializer::new(element, registry);
    T::deserialize(&mut deserializer)
}

/// Deserializes `T` from an already parsed element tree.
pub fn from_element<T: de::DeserializeOwned>(element: Asn1Element) -> Result<T> {
    debug_log!("deserialization using `from_element`");
    let mut deserializer = Deserializer::new(element, FactoryRegistry::standard());
    T::deserialize(&mut deserializer)
}

/// A serde deserializer walking an element tree in field order.
///
/// `pending` is a stack: a SEQUENCE/SET walk pushes the next child right
/// before the field seed consumes it, so a `TagPeeker` can look at the
/// element without taking it.
pub struct Deserializer {
    pending: Vec<Asn1Element>,
    registry: FactoryRegistry,
    text_kind: Option<StringKind>,
    bytes_kind: BytesKind,
    collection_kind: CollectionKind,
}

impl Deserializer {
    pub fn new(root: Asn1Element, registry: FactoryRegistry) -> Self {
        Self {
            pending: vec![root],
            registry,
            text_kind: None,
            bytes_kind: BytesKind::OctetString,
            collection_kind: CollectionKind::Sequence,
        }
    }

    fn next_element(&mut self) -> Result<Asn1Element> {
        self.pending
            .pop()
            .ok_or(Asn1DerError::Format("no element left to read"))
    }

    fn peek_element(&self) -> Result<&Asn1Element> {
        self.pending
            .last()
            .ok_or(Asn1DerError::Format("no element left to read"))
    }

    fn mismatch(expected: &'static str, found: &Asn1Element) -> Asn1DerError {
        Asn1DerError::SchemaMismatch {
            expected,
            found: found.type_name(),
        }
    }

    /// Re-parses encapsulated content octets and queues the inner element.
    fn parse_encapsulated(&mut self, bytes: &[u8]) -> Result<()> {
        let inner = Parser::new(&self.registry).parse(bytes)?;
        self.pending.push(inner);
        Ok(())
    }

    fn h_text(&mut self, visitor_hint: &'static str) -> Result<String> {
        let kind = self.text_kind.take().ok_or(Asn1DerError::SchemaMismatch {
            expected: "a string-variant wrapper around the text field",
            found: visitor_hint,
        })?;
        let element = self.next_element()?;
        match (kind, element) {
            (StringKind::Utf8, Asn1Element::Utf8String(s)) => Ok(s),
            (StringKind::Printable, Asn1Element::PrintableString(s)) => Ok(s.into_string()),
            (StringKind::T61, Asn1Element::T61String(s)) => Ok(s.into_string()),
            (StringKind::Ia5, Asn1Element::IA5String(s)) => Ok(s.into_string()),
            (StringKind::Bmp, Asn1Element::BmpString(s)) => Ok(s.into_string()),
            (StringKind::Universal, Asn1Element::UniversalString(s)) => Ok(s.into_string()),
            (kind, found) => Err(Deserializer::mismatch(kind.type_name(), &found)),
        }
    }

    fn h_walk_children<'de, V: Visitor<'de>>(
        &mut self,
        children: Vec<Asn1Element>,
        visitor: V,
    ) -> Result<V::Value> {
        let base = self.pending.len();
        let value = visitor.visit_seq(SequenceWalker {
            de: &mut *self,
            children: children.into_iter(),
            base,
        })?;
        // drop a peeked-but-unread element so the outer walk stays aligned
        self.pending.truncate(base);
        Ok(value)
    }
}

macro_rules! deserialize_integer {
    ($method:ident, $visit:ident, $to:ident, $expected:literal) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            debug_log!(stringify!($method));
            match self.next_element()? {
                Asn1Element::Integer(value) => visitor.$visit(
                    value
                        .$to()
                        .ok_or(Asn1DerError::UnsupportedValue($expected))?,
                ),
                found => Err(Deserializer::mismatch("INTEGER", &found)),
            }
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer {
    type Error = Asn1DerError;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_any");
        let tag = self.peek_element()?.tag();
        match tag {
            Tag::NULL => self.deserialize_unit(visitor),
            Tag::UTF8_STRING => {
                self.text_kind = Some(StringKind::Utf8);
                self.deserialize_string(visitor)
            }
            Tag::PRINTABLE_STRING => {
                self.text_kind = Some(StringKind::Printable);
                self.deserialize_string(visitor)
            }
            Tag::T61_STRING => {
                self.text_kind = Some(StringKind::T61);
                self.deserialize_string(visitor)
            }
            Tag::IA5_STRING => {
                self.text_kind = Some(StringKind::Ia5);
                self.deserialize_string(visitor)
            }
            Tag::BMP_STRING => {
                self.text_kind = Some(StringKind::Bmp);
                self.deserialize_string(visitor)
            }
            Tag::UNIVERSAL_STRING => {
                self.text_kind = Some(StringKind::Universal);
                self.deserialize_string(visitor)
            }
            Tag::OCTET_STRING => self.deserialize_byte_buf(visitor),
            Tag::OID => {
                self.bytes_kind = BytesKind::Oid;
                self.deserialize_bytes(visitor)
            }
            Tag::BIT_STRING => {
                self.bytes_kind = BytesKind::BitString;
                self.deserialize_bytes(visitor)
            }
            Tag::UTC_TIME => {
                self.bytes_kind = BytesKind::UtcTime;
                self.deserialize_bytes(visitor)
            }
            Tag::SEQUENCE => self.deserialize_seq(visitor),
            Tag::SET => {
                self.collection_kind = CollectionKind::Set;
                self.deserialize_seq(visitor)
            }
            Tag::INTEGER => Err(Asn1DerError::Format(
                "deserialize_any cannot infer an INTEGER width",
            )),
            _ => Err(Asn1DerError::Format(
                "deserialize_any cannot be used on this element",
            )),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_bool: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("BOOLEAN is not part of the supported subset"))
    }

    deserialize_integer!(deserialize_i8, visit_i8, to_i8, "INTEGER does not fit in an i8");
    deserialize_integer!(deserialize_i16, visit_i16, to_i16, "INTEGER does not fit in an i16");
    deserialize_integer!(deserialize_i32, visit_i32, to_i32, "INTEGER does not fit in an i32");
    deserialize_integer!(deserialize_i64, visit_i64, to_i64, "INTEGER does not fit in an i64");
    deserialize_integer!(deserialize_i128, visit_i128, to_i128, "INTEGER does not fit in an i128");
    deserialize_integer!(deserialize_u8, visit_u8, to_u8, "INTEGER does not fit in a u8");
    deserialize_integer!(deserialize_u16, visit_u16, to_u16, "INTEGER does not fit in a u16");
    deserialize_integer!(deserialize_u32, visit_u32, to_u32, "INTEGER does not fit in a u32");
    deserialize_integer!(deserialize_u64, visit_u64, to_u64, "INTEGER does not fit in a u64");
    deserialize_integer!(deserialize_u128, visit_u128, to_u128, "INTEGER does not fit in a u128");

    fn deserialize_f32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_f32: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("floating point values have no ASN.1 mapping here"))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_f64: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("floating point values have no ASN.1 mapping here"))
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_char");
        let text = self.h_text("a char value")?;
        let c = text
            .chars()
            .next()
            .ok_or(Asn1DerError::UnsupportedValue("empty string where a char was expected"))?;
        visitor.visit_char(c)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_str");
        let text = self.h_text("a borrowed text value")?;
        visitor.visit_string(text)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_string");
        let text = self.h_text("an owned text value")?;
        visitor.visit_string(text)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_bytes");
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_byte_buf");
        let kind = mem::replace(&mut self.bytes_kind, BytesKind::OctetString);
        let element = self.next_element()?;
        match (kind, element) {
            (BytesKind::OctetString, Asn1Element::OctetString(bytes)) => {
                visitor.visit_byte_buf(bytes)
            }
            (BytesKind::Integer, Asn1Element::Integer(value)) => {
                visitor.visit_byte_buf(value.to_signed_bytes_be())
            }
            (BytesKind::Oid, Asn1Element::ObjectIdentifier(oid)) => {
                visitor.visit_byte_buf(oid.to_payload())
            }
            (BytesKind::BitString, Asn1Element::BitString(bits)) => {
                visitor.visit_byte_buf(bits.to_payload())
            }
            (BytesKind::UtcTime, Asn1Element::UtcTime(time)) => {
                visitor.visit_byte_buf(time.to_payload().to_vec())
            }
            (kind, found) => Err(Deserializer::mismatch(kind.type_name(), &found)),
        }
    }

    /// NULL in field position reads back as an absent optional.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_option");
        match self.pending.last() {
            Some(Asn1Element::Null) => {
                self.pending.pop();
                visitor.visit_none()
            }
            Some(_) => visitor.visit_some(self),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_unit");
        match self.next_element()? {
            Asn1Element::Null => visitor.visit_unit(),
            found => Err(Deserializer::mismatch("NULL", &found)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        debug_log!("deserialize_unit_struct: {}", _name);
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        debug_log!("deserialize_newtype_struct: {}", name);
        match directive::for_marker(name) {
            Some(Directive::Text(kind)) => self.text_kind = Some(kind),
            Some(Directive::Bytes(kind)) => self.bytes_kind = kind,
            Some(Directive::Collection(kind)) => self.collection_kind = kind,
            Some(Directive::WrapIntoOctetString) => match self.next_element()? {
                Asn1Element::OctetString(bytes) => self.parse_encapsulated(&bytes)?,
                found => return Err(Deserializer::mismatch("an encapsulating OCTET STRING", &found)),
            },
            Some(Directive::WrapIntoBitString) => match self.next_element()? {
                Asn1Element::BitString(bits) => {
                    if bits.unused_bits() != 0 {
                        return Err(Asn1DerError::Format(
                            "encapsulating BIT STRING must not have unused bits",
                        ));
                    }
                    self.parse_encapsulated(bits.data())?;
                }
                found => return Err(Deserializer::mismatch("an encapsulating BIT STRING", &found)),
            },
            Some(Directive::WrapIntoSequence) => match self.next_element()? {
                Asn1Element::Sequence(children) => match children.into_iter().next() {
                    Some(first) => self.pending.push(first),
                    None => {
                        return Err(Asn1DerError::Format("empty wrapping SEQUENCE"));
                    }
                },
                found => return Err(Deserializer::mismatch("a wrapping SEQUENCE", &found)),
            },
            Some(Directive::ContextTag(number)) => match self.next_element()? {
                Asn1Element::ContextSpecific { number: found, inner } if found == number => {
                    self.pending.push(*inner);
                }
                found => {
                    return Err(Deserializer::mismatch(CONTEXT_TAG_NAMES[usize::from(number)], &found));
                }
            },
            None => {}
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_seq");
        let kind = mem::replace(&mut self.collection_kind, CollectionKind::Sequence);
        let element = self.next_element()?;
        match (kind, element) {
            (CollectionKind::Sequence, Asn1Element::Sequence(children))
            | (CollectionKind::Set, Asn1Element::Set(children)) => {
                self.h_walk_children(children, visitor)
            }
            (kind, found) => Err(Deserializer::mismatch(kind.type_name(), &found)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_tuple: {}", _len);
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        debug_log!("deserialize_tuple_struct: {}({})", _name, _len);
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_map: UNSUPPORTED");
        Err(Asn1DerError::UnsupportedType("maps have no ASN.1 mapping"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        debug_log!("deserialize_struct: {}", _name);
        self.deserialize_seq(visitor)
    }

    /// CHOICE: the visitor peeks the next tag with a `TagPeeker`, then reads
    /// the matching alternative; both observe the same queued element.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        debug_log!("deserialize_enum: {}", _name);
        visitor.visit_seq(ChoiceWalker { de: self })
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_identifier: peek next tag");
        let tag = self.peek_element()?.tag();
        visitor.visit_u8(tag.octet())
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        debug_log!("deserialize_ignored_any");
        self.next_element()?;
        visitor.visit_unit()
    }
}

/// Yields the children of one SEQUENCE/SET to the record's field seeds.
struct SequenceWalker<'a> {
    de: &'a mut Deserializer,
    children: std::vec::IntoIter<Asn1Element>,
    base: usize,
}

impl<'de> de::SeqAccess<'de> for SequenceWalker<'_> {
    type Error = Asn1DerError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        // a previous TagPeeker may have left the element queued
        if self.de.pending.len() == self.base {
            match self.children.next() {
                Some(child) => self.de.pending.push(child),
                None => return Ok(None),
            }
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.children.len())
    }
}

/// Exposes the single queued element to a CHOICE visitor: once for the tag
/// peek, once for the actual read.
struct ChoiceWalker<'a> {
    de: &'a mut Deserializer,
}

impl<'de> de::SeqAccess<'de> for ChoiceWalker<'_> {
    type Error = Asn1DerError;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.de.pending.is_empty() {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        None
    }
}
