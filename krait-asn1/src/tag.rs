use serde::de;
use std::fmt;

/// BER tag class, the top two bits of the identifier octet.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TagClass {
    Universal = 0b00,
    Application = 0b01,
    ContextSpecific = 0b10,
    Private = 0b11,
}

impl TagClass {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => TagClass::Universal,
            0b01 => TagClass::Application,
            0b10 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// A single-octet BER/DER tag: class, constructed bit and tag number.
///
/// Only the low-tag-number form is supported (number 0..31); the parser
/// rejects identifier octets announcing the multi-octet form.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag {
    class: TagClass,
    constructed: bool,
    number: u8,
}

impl Tag {
    pub const INTEGER: Self = Tag::universal(0x02, false);
    pub const BIT_STRING: Self = Tag::universal(0x03, false);
    pub const OCTET_STRING: Self = Tag::universal(0x04, false);
    pub const NULL: Self = Tag::universal(0x05, false);
    pub const OID: Self = Tag::universal(0x06, false);
    pub const UTF8_STRING: Self = Tag::universal(0x0C, false);
    pub const SEQUENCE: Self = Tag::universal(0x10, true);
    pub const SET: Self = Tag::universal(0x11, true);
    pub const PRINTABLE_STRING: Self = Tag::universal(0x13, false);
    pub const T61_STRING: Self = Tag::universal(0x14, false);
    pub const IA5_STRING: Self = Tag::universal(0x16, false);
    pub const UTC_TIME: Self = Tag::universal(0x17, false);
    pub const UNIVERSAL_STRING: Self = Tag::universal(0x1C, false);
    pub const BMP_STRING: Self = Tag::universal(0x1E, false);

    #[inline]
    pub const fn universal(number: u8, constructed: bool) -> Self {
        Tag {
            class: TagClass::Universal,
            constructed,
            number: number & 0x1F,
        }
    }

    #[inline]
    pub const fn application(number: u8, constructed: bool) -> Self {
        Tag {
            class: TagClass::Application,
            constructed,
            number: number & 0x1F,
        }
    }

    /// Context-specific tags are always constructed: their payload holds
    /// one complete inner element.
    #[inline]
    pub const fn context_specific(number: u8) -> Self {
        Tag {
            class: TagClass::ContextSpecific,
            constructed: true,
            number: number & 0x1F,
        }
    }

    #[inline]
    pub const fn class(self) -> TagClass {
        self.class
    }

    #[inline]
    pub const fn is_constructed(self) -> bool {
        self.constructed
    }

    #[inline]
    pub const fn number(self) -> u8 {
        self.number
    }

    /// The identifier octet: `(class << 6) | (constructed << 5) | number`.
    #[inline]
    pub const fn octet(self) -> u8 {
        ((self.class as u8) << 6) | ((self.constructed as u8) << 5) | self.number
    }

    #[inline]
    pub const fn from_octet(octet: u8) -> Self {
        Tag {
            class: TagClass::from_bits(octet >> 6),
            constructed: octet & 0x20 != 0,
            number: octet & 0x1F,
        }
    }

    #[inline]
    pub fn is_context_specific(self) -> bool {
        self.class == TagClass::ContextSpecific
    }
}

impl From<u8> for Tag {
    fn from(octet: u8) -> Self {
        Self::from_octet(octet)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => match *self {
                Tag::INTEGER => write!(f, "INTEGER"),
                Tag::BIT_STRING => write!(f, "BIT STRING"),
                Tag::OCTET_STRING => write!(f, "OCTET STRING"),
                Tag::NULL => write!(f, "NULL"),
                Tag::OID => write!(f, "OBJECT IDENTIFIER"),
                Tag::UTF8_STRING => write!(f, "UTF8String"),
                Tag::SEQUENCE => write!(f, "SEQUENCE"),
                Tag::SET => write!(f, "SET"),
                Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
                Tag::T61_STRING => write!(f, "T61String"),
                Tag::IA5_STRING => write!(f, "IA5String"),
                Tag::UTC_TIME => write!(f, "UTCTime"),
                Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
                Tag::BMP_STRING => write!(f, "BMPString"),
                unknown => write!(f, "UNKNOWN(0x{:02X})", unknown.octet()),
            },
            TagClass::Application => write!(f, "ApplicationTag{}", self.number),
            TagClass::ContextSpecific => write!(f, "ContextTag{}", self.number),
            TagClass::Private => write!(f, "PrivateTag{}", self.number),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({}[0x{:02X}])", self, self.octet())
    }
}

/// Peeks the next element's tag through `Deserializer::deserialize_identifier`
/// without consuming it.
///
/// Can be used to implement ASN.1 CHOICE.
///
/// # Examples
/// ```
/// use krait_asn1::tag::{Tag, TagPeeker};
/// use krait_asn1::wrapper::Utf8StringAsn1;
/// use serde::de;
/// use std::fmt;
///
/// #[derive(Debug, PartialEq)]
/// enum IntOrString {
///     Int(u32),
///     Utf8(String),
/// }
///
/// impl<'de> de::Deserialize<'de> for IntOrString {
///     fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
///     where
///         D: de::Deserializer<'de>,
///     {
///         struct Visitor;
///
///         impl<'de> de::Visitor<'de> for Visitor {
///             type Value = IntOrString;
///
///             fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
///                 formatter.write_str("an INTEGER or a UTF8String")
///             }
///
///             fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
///             where
///                 A: de::SeqAccess<'de>,
///             {
///                 match seq.next_element::<TagPeeker>()?.unwrap().next_tag {
///                     Tag::INTEGER => Ok(IntOrString::Int(seq.next_element()?.unwrap())),
///                     Tag::UTF8_STRING => {
///                         let s: Utf8StringAsn1 = seq.next_element()?.unwrap();
///                         Ok(IntOrString::Utf8(s.0))
///                     }
///                     _ => Err(de::Error::invalid_value(
///                         de::Unexpected::Other("unsupported choice alternative"),
///                         &"an INTEGER or a UTF8String",
///                     )),
///                 }
///             }
///         }
///
///         deserializer.deserialize_enum("IntOrString", &["Int", "Utf8"], Visitor)
///     }
/// }
///
/// let choice: IntOrString = krait_asn1_der::from_bytes(b"\x02\x01\x07").unwrap();
/// assert_eq!(choice, IntOrString::Int(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagPeeker {
    pub next_tag: Tag,
}

impl<'de> de::Deserialize<'de> for TagPeeker {
    fn deserialize<D>(deserializer: D) -> Result<TagPeeker, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = TagPeeker;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid ASN.1 tag octet")
            }

            fn visit_u8<E>(self, v: u8) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(TagPeeker { next_tag: v.into() })
            }
        }

        deserializer.deserialize_identifier(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructed_universal_tags() {
        assert_eq!(Tag::SEQUENCE.octet(), 0x30);
        assert_eq!(Tag::SET.octet(), 0x31);
    }

    #[test]
    fn primitive_universal_tags() {
        assert_eq!(Tag::INTEGER.octet(), 0x02);
        assert_eq!(Tag::NULL.octet(), 0x05);
        assert_eq!(Tag::UTF8_STRING.octet(), 0x0C);
        assert_eq!(Tag::UTC_TIME.octet(), 0x17);
    }

    #[test]
    fn context_specific_tags_are_constructed() {
        let tag = Tag::context_specific(3);
        assert_eq!(tag.octet(), 0xA3);
        assert!(tag.is_constructed());
        assert!(tag.is_context_specific());
    }

    #[test]
    fn octet_round_trip() {
        for octet in 0..=u8::MAX {
            assert_eq!(Tag::from_octet(octet).octet(), octet);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Tag::SEQUENCE.to_string(), "SEQUENCE");
        assert_eq!(Tag::context_specific(0).to_string(), "ContextTag0");
        assert_eq!(Tag::universal(0x0A, false).to_string(), "UNKNOWN(0x0A)");
    }
}
