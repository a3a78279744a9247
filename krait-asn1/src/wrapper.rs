//! Wrappers bridging Rust types to their ASN.1 rendering.
//!
//! Each wrapper is a serde newtype whose marker name tells the DER codec how
//! to render the wrapped value: which restricted string kind a text field
//! uses, SET instead of SEQUENCE for a record, an encapsulating OCTET STRING,
//! BIT STRING or SEQUENCE layer, or an explicit context tag.

use crate::bit_string::BitString;
use crate::date::UTCTime;
use crate::oid::ObjectIdentifier;
use crate::restricted_string::{BmpString, IA5String, PrintableString, T61String, UniversalString};
use crate::tag::Tag;
use crate::Asn1Type;
use serde::{de, ser, Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

macro_rules! asn1_wrapper {
    // The wrapped value already carries its own marker; forward serde to it.
    (auto $(#[$meta:meta])* $name:ident ( $inner:ty )) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl Asn1Type for $name {
            const TAG: Tag = <$inner as Asn1Type>::TAG;
            const NAME: &'static str = <$inner as Asn1Type>::NAME;
        }

        asn1_wrapper!(@plumbing $name ( $inner ));
    };

    // Tags the wrapped value with this wrapper's own marker name.
    (tagged $(#[$meta:meta])* $name:ident ( $inner:ty ), $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub $inner);

        impl Asn1Type for $name {
            const TAG: Tag = $tag;
            const NAME: &'static str = stringify!($name);
        }

        impl ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ser::Serializer,
            {
                serializer.serialize_newtype_struct(Self::NAME, &self.0)
            }
        }

        impl<'de> de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                struct Visitor;

                impl<'de> de::Visitor<'de> for Visitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name)))
                    }

                    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                    where
                        D: de::Deserializer<'de>,
                    {
                        de::Deserialize::deserialize(deserializer).map($name)
                    }
                }

                deserializer.deserialize_newtype_struct(Self::NAME, Visitor)
            }
        }

        asn1_wrapper!(@plumbing $name ( $inner ));
    };

    // Raw content octets carried as a byte buffer.
    (bytes $(#[$meta:meta])* $name:ident, $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub Vec<u8>);

        impl Asn1Type for $name {
            const TAG: Tag = $tag;
            const NAME: &'static str = stringify!($name);
        }

        impl ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ser::Serializer,
            {
                serializer.serialize_newtype_struct(Self::NAME, &serde_bytes::Bytes::new(&self.0))
            }
        }

        impl<'de> de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                struct Visitor;

                impl<'de> de::Visitor<'de> for Visitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name)))
                    }

                    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        Ok($name(v.to_vec()))
                    }

                    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        Ok($name(v))
                    }

                    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                    where
                        D: de::Deserializer<'de>,
                    {
                        deserializer.deserialize_byte_buf(Visitor)
                    }
                }

                deserializer.deserialize_newtype_struct(Self::NAME, Visitor)
            }
        }

        asn1_wrapper!(@plumbing $name ( Vec<u8> ));
    };

    // A homogeneous list rendered as the given constructed type.
    (collection $(#[$meta:meta])* $name:ident, $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name<T>(pub Vec<T>);

        impl<T> Asn1Type for $name<T> {
            const TAG: Tag = $tag;
            const NAME: &'static str = stringify!($name);
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self(Vec::new())
            }
        }

        impl<T: ser::Serialize> ser::Serialize for $name<T> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ser::Serializer,
            {
                serializer.serialize_newtype_struct(Self::NAME, &self.0)
            }
        }

        impl<'de, T: de::Deserialize<'de>> de::Deserialize<'de> for $name<T> {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                struct Visitor<T>(PhantomData<T>);

                impl<'de, T: de::Deserialize<'de>> de::Visitor<'de> for Visitor<T> {
                    type Value = $name<T>;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name)))
                    }

                    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                    where
                        D: de::Deserializer<'de>,
                    {
                        Vec::deserialize(deserializer).map($name)
                    }
                }

                deserializer.deserialize_newtype_struct(<$name<T>>::NAME, Visitor(PhantomData))
            }
        }

        asn1_wrapper!(@plumbing collection $name);
    };

    // A generic wrapper adding one encoding layer around the value it carries.
    (container $(#[$meta:meta])* $name:ident, $tag:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name<T>(pub T);

        impl<T> Asn1Type for $name<T> {
            const TAG: Tag = $tag;
            const NAME: &'static str = stringify!($name);
        }

        impl<T: ser::Serialize> ser::Serialize for $name<T> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ser::Serializer,
            {
                serializer.serialize_newtype_struct(Self::NAME, &self.0)
            }
        }

        impl<'de, T: de::Deserialize<'de>> de::Deserialize<'de> for $name<T> {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                struct Visitor<T>(PhantomData<T>);

                impl<'de, T: de::Deserialize<'de>> de::Visitor<'de> for Visitor<T> {
                    type Value = $name<T>;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name)))
                    }

                    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                    where
                        D: de::Deserializer<'de>,
                    {
                        T::deserialize(deserializer).map($name)
                    }
                }

                deserializer.deserialize_newtype_struct(<$name<T>>::NAME, Visitor(PhantomData))
            }
        }

        asn1_wrapper!(@plumbing generic $name);
    };

    (@plumbing $name:ident ( $inner:ty )) => {
        impl From<$inner> for $name {
            fn from(inner: $inner) -> Self {
                Self(inner)
            }
        }

        impl From<$name> for $inner {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };

    (@plumbing collection $name:ident) => {
        impl<T> From<Vec<T>> for $name<T> {
            fn from(inner: Vec<T>) -> Self {
                Self(inner)
            }
        }

        impl<T> Deref for $name<T> {
            type Target = Vec<T>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };

    (@plumbing generic $name:ident) => {
        impl<T> From<T> for $name<T> {
            fn from(inner: T) -> Self {
                Self(inner)
            }
        }

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T> DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

asn1_wrapper! { auto ObjectIdentifierAsn1(ObjectIdentifier) }
asn1_wrapper! { auto BitStringAsn1(BitString) }
asn1_wrapper! { auto UtcTimeAsn1(UTCTime) }

asn1_wrapper! { tagged Utf8StringAsn1(String), Tag::UTF8_STRING }
asn1_wrapper! { tagged PrintableStringAsn1(PrintableString), Tag::PRINTABLE_STRING }
asn1_wrapper! { tagged T61StringAsn1(T61String), Tag::T61_STRING }
asn1_wrapper! { tagged IA5StringAsn1(IA5String), Tag::IA5_STRING }
asn1_wrapper! { tagged BmpStringAsn1(BmpString), Tag::BMP_STRING }
asn1_wrapper! { tagged UniversalStringAsn1(UniversalString), Tag::UNIVERSAL_STRING }

asn1_wrapper! { bytes
    /// OCTET STRING content octets.
    OctetStringAsn1, Tag::OCTET_STRING
}
asn1_wrapper! { bytes
    /// An INTEGER kept as its big-endian two's-complement content octets.
    ///
    /// Use this instead of a Rust integer primitive when the value may not
    /// fit in 128 bits, e.g. RSA moduli.
    IntegerAsn1, Tag::INTEGER
}

asn1_wrapper! { collection
    /// `SEQUENCE OF T`
    Asn1SequenceOf, Tag::SEQUENCE
}
asn1_wrapper! { collection
    /// `SET OF T`
    ///
    /// Element order is preserved as-is on both encode and decode; no
    /// canonical reordering is applied.
    Asn1SetOf, Tag::SET
}

asn1_wrapper! { container
    /// Renders the fields of the wrapped record as a SET instead of a
    /// SEQUENCE.
    SetAsn1, Tag::SET
}
asn1_wrapper! { container
    /// Encapsulates the encoding of the wrapped value inside an OCTET STRING.
    OctetStringAsn1Container, Tag::OCTET_STRING
}
asn1_wrapper! { container
    /// Encapsulates the encoding of the wrapped value inside a BIT STRING
    /// with no unused bits.
    BitStringAsn1Container, Tag::BIT_STRING
}
asn1_wrapper! { container
    /// Wraps the encoding of the wrapped value in an additional SEQUENCE.
    SequenceAsn1Container, Tag::SEQUENCE
}

asn1_wrapper! { container ContextTag0, Tag::context_specific(0) }
asn1_wrapper! { container ContextTag1, Tag::context_specific(1) }
asn1_wrapper! { container ContextTag2, Tag::context_specific(2) }
asn1_wrapper! { container ContextTag3, Tag::context_specific(3) }
asn1_wrapper! { container ContextTag4, Tag::context_specific(4) }
asn1_wrapper! { container ContextTag5, Tag::context_specific(5) }
asn1_wrapper! { container ContextTag6, Tag::context_specific(6) }
asn1_wrapper! { container ContextTag7, Tag::context_specific(7) }
asn1_wrapper! { container ContextTag8, Tag::context_specific(8) }
asn1_wrapper! { container ContextTag9, Tag::context_specific(9) }
asn1_wrapper! { container ContextTag10, Tag::context_specific(10) }
asn1_wrapper! { container ContextTag11, Tag::context_specific(11) }
asn1_wrapper! { container ContextTag12, Tag::context_specific(12) }
asn1_wrapper! { container ContextTag13, Tag::context_specific(13) }
asn1_wrapper! { container ContextTag14, Tag::context_specific(14) }
asn1_wrapper! { container ContextTag15, Tag::context_specific(15) }

impl IntegerAsn1 {
    /// Content octets taken verbatim as a signed big-endian value.
    pub fn from_bytes_be_signed(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Content octets taken as an unsigned big-endian value; a leading zero
    /// is inserted when the top bit is set so the sign stays positive.
    pub fn from_bytes_be_unsigned(mut bytes: Vec<u8>) -> Self {
        if bytes.first().map_or(true, |b| b & 0x80 != 0) {
            bytes.insert(0, 0x00);
        }
        Self(bytes)
    }

    pub fn is_positive(&self) -> bool {
        self.0.first().map_or(true, |b| b & 0x80 == 0)
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }

    pub fn as_signed_bytes_be(&self) -> &[u8] {
        &self.0
    }

    /// The magnitude bytes, without the sign-padding zero octet if present.
    pub fn as_unsigned_bytes_be(&self) -> &[u8] {
        match self.0.as_slice() {
            [0x00] => &self.0,
            [0x00, rest @ ..] => rest,
            all => all,
        }
    }
}

impl Default for IntegerAsn1 {
    fn default() -> Self {
        Self(vec![0x00])
    }
}

impl Utf8StringAsn1 {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Utf8StringAsn1 {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for Utf8StringAsn1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_unsigned_construction_pads_sign() {
        let int = IntegerAsn1::from_bytes_be_unsigned(vec![0xFF, 0x20]);
        assert_eq!(int.as_signed_bytes_be(), [0x00, 0xFF, 0x20]);
        assert_eq!(int.as_unsigned_bytes_be(), [0xFF, 0x20]);
        assert!(int.is_positive());
    }

    #[test]
    fn integer_signed_construction_is_verbatim() {
        let int = IntegerAsn1::from_bytes_be_signed(vec![0xFF, 0x20]);
        assert_eq!(int.as_signed_bytes_be(), [0xFF, 0x20]);
        assert!(int.is_negative());
    }

    #[test]
    fn integer_zero() {
        let int = IntegerAsn1::from_bytes_be_unsigned(vec![]);
        assert_eq!(int.as_signed_bytes_be(), [0x00]);
        assert_eq!(int.as_unsigned_bytes_be(), [0x00]);
        assert_eq!(int, IntegerAsn1::default());
    }

    #[test]
    fn wrapper_names_are_distinct_markers() {
        assert_eq!(Utf8StringAsn1::NAME, "Utf8StringAsn1");
        assert_eq!(<Asn1SetOf<()>>::NAME, "Asn1SetOf");
        assert_eq!(<ContextTag3<()>>::NAME, "ContextTag3");
        assert_eq!(ObjectIdentifierAsn1::NAME, ObjectIdentifier::NAME);
    }

    #[test]
    fn deref_reaches_the_inner_value() {
        let s = Utf8StringAsn1::from("Test");
        assert_eq!(s.len(), 4);
        let seq = Asn1SequenceOf(vec![1u8, 2, 3]);
        assert_eq!(seq.iter().copied().sum::<u8>(), 6);
    }
}
