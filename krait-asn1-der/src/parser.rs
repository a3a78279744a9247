//! TLV parsing with an explicit tag dispatch table.
//!
//! The registry is a plain value handed to the parser per call rather than a
//! process-wide singleton, so decoding stays reentrant and tests can run
//! against a restricted type subset.

use crate::element::Asn1Element;
use crate::misc::{Length, ReadExt};
use crate::{Asn1DerError, Result};
use krait_asn1::bit_string::BitString;
use krait_asn1::date::UTCTime;
use krait_asn1::oid::ObjectIdentifier;
use krait_asn1::tag::{Tag, TagClass};
use krait_asn1::wrapper::{
    BmpStringAsn1, IA5StringAsn1, IntegerAsn1, OctetStringAsn1, PrintableStringAsn1,
    T61StringAsn1, UniversalStringAsn1, Utf8StringAsn1,
};
use krait_asn1::Asn1Type;

/// Default nesting limit, a hardening bound against adversarial input.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Builds one element from the content octets of a TLV whose tag selected
/// this factory. Constructed factories recurse through the parser.
pub type ElementFactory = fn(&Parser<'_>, &[u8], usize) -> Result<Asn1Element>;

/// Tag→factory dispatch table.
pub struct FactoryRegistry {
    entries: Vec<(Tag, ElementFactory)>,
}

impl FactoryRegistry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// A registry covering the whole supported universal-type subset,
    /// keyed by the tags the value types declare.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(IntegerAsn1::TAG, factories::integer);
        registry.register(BitString::TAG, factories::bit_string);
        registry.register(OctetStringAsn1::TAG, factories::octet_string);
        registry.register(Tag::NULL, factories::null);
        registry.register(ObjectIdentifier::TAG, factories::object_identifier);
        registry.register(Utf8StringAsn1::TAG, factories::utf8_string);
        registry.register(PrintableStringAsn1::TAG, factories::printable_string);
        registry.register(T61StringAsn1::TAG, factories::t61_string);
        registry.register(IA5StringAsn1::TAG, factories::ia5_string);
        registry.register(BmpStringAsn1::TAG, factories::bmp_string);
        registry.register(UniversalStringAsn1::TAG, factories::universal_string);
        registry.register(UTCTime::TAG, factories::utc_time);
        registry.register(Tag::SEQUENCE, factories::sequence);
        registry.register(Tag::SET, factories::set);
        registry
    }

    /// Registers `factory` for `tag`, replacing any previous entry.
    pub fn register(&mut self, tag: Tag, factory: ElementFactory) {
        match self.entries.iter_mut().find(|(entry_tag, _)| *entry_tag == tag) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((tag, factory)),
        }
    }

    pub fn lookup(&self, tag: Tag) -> Option<ElementFactory> {
        self.entries
            .iter()
            .find(|(entry_tag, _)| *entry_tag == tag)
            .map(|(_, factory)| *factory)
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parses `input` as exactly one element using the standard registry.
pub fn parse_der(input: &[u8]) -> Result<Asn1Element> {
    Parser::new(&FactoryRegistry::standard()).parse(input)
}

pub struct Parser<'r> {
    registry: &'r FactoryRegistry,
    max_depth: usize,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r FactoryRegistry) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(registry: &'r FactoryRegistry, max_depth: usize) -> Self {
        Self { registry, max_depth }
    }

    /// Parses exactly one element spanning the whole input.
    pub fn parse(&self, mut input: &[u8]) -> Result<Asn1Element> {
        let element = self.parse_next(&mut input, self.max_depth)?;
        if !input.is_empty() {
            return Err(Asn1DerError::Format("trailing bytes after the top-level element"));
        }
        Ok(element)
    }

    /// Reads one complete TLV off the front of `input` and dispatches it.
    pub fn parse_next(&self, input: &mut &[u8], depth: usize) -> Result<Asn1Element> {
        if depth == 0 {
            return Err(Asn1DerError::Format("maximum nesting depth exceeded"));
        }

        let octet = input.read_one()?;
        if octet & 0x1F == 0x1F {
            return Err(Asn1DerError::Format("multi-octet tag numbers are not supported"));
        }
        let tag = Tag::from(octet);

        let len = Length::deserialized(&mut *input)?;
        if len > input.len() {
            debug_log!("parse_next: declared length {} exceeds remaining {}", len, input.len());
            return Err(Asn1DerError::TruncatedData);
        }
        let (payload, rest) = input.split_at(len);
        *input = rest;

        debug_log!("parse_next: {} ({} payload bytes)", tag, len);

        match tag.class() {
            // context-specific payloads hold one complete inner TLV
            TagClass::ContextSpecific => {
                let inner = self.parse_single(payload, depth - 1)?;
                Ok(Asn1Element::ContextSpecific {
                    number: tag.number(),
                    inner: Box::new(inner),
                })
            }
            TagClass::Universal => {
                let factory = self
                    .registry
                    .lookup(tag)
                    .ok_or(Asn1DerError::UnsupportedTag(tag))?;
                factory(self, payload, depth)
            }
            _ => Err(Asn1DerError::UnsupportedTag(tag)),
        }
    }

    /// Parses `payload` as one element with nothing left over.
    pub fn parse_single(&self, mut payload: &[u8], depth: usize) -> Result<Asn1Element> {
        let element = self.parse_next(&mut payload, depth)?;
        if !payload.is_empty() {
            return Err(Asn1DerError::Format("trailing bytes after a complete child element"));
        }
        Ok(element)
    }

    /// Parses `payload` as a back-to-back run of complete child TLVs.
    pub fn parse_children(&self, mut payload: &[u8], depth: usize) -> Result<Vec<Asn1Element>> {
        let mut children = Vec::new();
        while !payload.is_empty() {
            children.push(self.parse_next(&mut payload, depth)?);
        }
        Ok(children)
    }
}

/// The standard factories, one per supported universal type.
pub mod factories {
    use super::*;
    use krait_asn1::bit_string::BitString;
    use krait_asn1::date::UTCTime;
    use krait_asn1::oid::ObjectIdentifier;
    use krait_asn1::restricted_string::{
        BmpString, IA5String, PrintableString, T61String, UniversalString,
    };
    use num_bigint_dig::BigInt;

    pub fn integer(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        if payload.is_empty() {
            return Err(Asn1DerError::Format("INTEGER requires at least one content octet"));
        }
        Ok(Asn1Element::Integer(BigInt::from_signed_bytes_be(payload)))
    }

    pub fn bit_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        BitString::from_payload(payload)
            .map(Asn1Element::BitString)
            .ok_or(Asn1DerError::Format("invalid BIT STRING content octets"))
    }

    pub fn octet_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        Ok(Asn1Element::OctetString(payload.to_vec()))
    }

    pub fn null(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        if !payload.is_empty() {
            return Err(Asn1DerError::Format("NULL must have an empty payload"));
        }
        Ok(Asn1Element::Null)
    }

    pub fn object_identifier(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        ObjectIdentifier::from_payload(payload)
            .map(Asn1Element::ObjectIdentifier)
            .map_err(|_| Asn1DerError::Format("invalid OBJECT IDENTIFIER content octets"))
    }

    pub fn utf8_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Asn1DerError::Format("UTF8String payload is not valid UTF-8"))?;
        Ok(Asn1Element::Utf8String(text.to_owned()))
    }

    pub fn printable_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Asn1DerError::Format("PrintableString payload is not valid ASCII"))?;
        Ok(Asn1Element::PrintableString(PrintableString::new(text)?))
    }

    pub fn t61_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        // one octet per character (Latin-1)
        let text: String = payload.iter().map(|&b| char::from(b)).collect();
        Ok(Asn1Element::T61String(T61String::new(text)?))
    }

    pub fn ia5_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Asn1DerError::Format("IA5String payload is not valid ASCII"))?;
        Ok(Asn1Element::IA5String(IA5String::new(text)?))
    }

    pub fn bmp_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        if payload.len() % 2 != 0 {
            return Err(Asn1DerError::Format("BMPString payload length must be even"));
        }
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        let text = String::from_utf16(&units)
            .map_err(|_| Asn1DerError::Format("BMPString payload is not valid UTF-16"))?;
        Ok(Asn1Element::BmpString(BmpString::new(text)?))
    }

    pub fn universal_string(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        if payload.len() % 4 != 0 {
            return Err(Asn1DerError::Format(
                "UniversalString payload length must be a multiple of four",
            ));
        }
        let text = payload
            .chunks_exact(4)
            .map(|quad| {
                let code = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
                char::from_u32(code)
                    .ok_or(Asn1DerError::Format("UniversalString payload is not valid UTF-32"))
            })
            .collect::<Result<String>>()?;
        Ok(Asn1Element::UniversalString(UniversalString::new(text)?))
    }

    pub fn utc_time(_: &Parser<'_>, payload: &[u8], _: usize) -> Result<Asn1Element> {
        UTCTime::from_payload(payload)
            .map(Asn1Element::UtcTime)
            .ok_or(Asn1DerError::Format("invalid UTCTime content octets"))
    }

    pub fn sequence(parser: &Parser<'_>, payload: &[u8], depth: usize) -> Result<Asn1Element> {
        Ok(Asn1Element::Sequence(parser.parse_children(payload, depth - 1)?))
    }

    pub fn set(parser: &Parser<'_>, payload: &[u8], depth: usize) -> Result<Asn1Element> {
        Ok(Asn1Element::Set(parser.parse_children(payload, depth - 1)?))
    }
}
