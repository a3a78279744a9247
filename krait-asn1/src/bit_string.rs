use crate::tag::Tag;
use crate::Asn1Type;
use serde::{de, ser};
use std::fmt;

/// An ASN.1 BIT STRING: content bytes plus a count of unused trailing bits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    unused_bits: u8,
    data: Vec<u8>,
}

impl BitString {
    /// A bit string made of whole bytes (no unused bits).
    pub fn with_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            unused_bits: 0,
            data: data.into(),
        }
    }

    /// `unused_bits` must be 0..=7 and zero when `data` is empty.
    pub fn new(unused_bits: u8, data: Vec<u8>) -> Option<Self> {
        if unused_bits > 7 || (data.is_empty() && unused_bits != 0) {
            return None;
        }
        Some(Self { unused_bits, data })
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused_bits
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.unused_bits)
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < self.bit_len() && (self.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// DER content octets: the unused-bit count followed by the data bytes.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.data.len() + 1);
        payload.push(self.unused_bits);
        payload.extend_from_slice(&self.data);
        payload
    }

    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let (&unused_bits, data) = payload.split_first()?;
        Self::new(unused_bits, data.to_vec())
    }
}

impl Asn1Type for BitString {
    const TAG: Tag = Tag::BIT_STRING;
    const NAME: &'static str = "BitString";
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({} bits,", self.bit_len())?;
        for byte in &self.data {
            write!(f, " {:02X}", byte)?;
        }
        f.write_str(")")
    }
}

impl ser::Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_newtype_struct(Self::NAME, &serde_bytes::Bytes::new(&self.to_payload()))
    }
}

impl<'de> de::Deserialize<'de> for BitString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = BitString;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a BIT STRING payload (unused-bit count octet followed by data)")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                BitString::from_payload(v).ok_or_else(|| {
                    E::invalid_value(
                        de::Unexpected::Bytes(v),
                        &"a payload starting with an unused-bit count of at most 7",
                    )
                })
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_bytes(Visitor)
            }
        }

        deserializer.deserialize_newtype_struct(Self::NAME, Visitor)
    }
}
