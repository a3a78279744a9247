use crate::tag::Tag;
use crate::Asn1Type;
use serde::{de, ser};
use std::fmt;
use std::str::FromStr;

/// Error building an [`ObjectIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OidError {
    #[error("an object identifier requires at least two components")]
    TooFewComponents,
    #[error("invalid object identifier component")]
    InvalidComponent,
    #[error("truncated object identifier payload")]
    Truncated,
}

/// A dotted-notation object identifier, e.g. `1.2.840.113549.1.1.1`.
///
/// Component values are kept as given; the `c0 <= 2` / `c1 < 40` constraints
/// of X.660 are not enforced so that arbitrary encoded input round-trips.
/// The first two components must still fold into the single leading payload
/// octet, so `c0 * 40 + c1 <= 255`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier(Vec<u64>);

impl ObjectIdentifier {
    pub fn new(components: Vec<u64>) -> Result<Self, OidError> {
        if components.len() < 2 {
            return Err(OidError::TooFewComponents);
        }
        let folded = components[0]
            .checked_mul(40)
            .and_then(|v| v.checked_add(components[1]));
        if !matches!(folded, Some(0..=255)) {
            return Err(OidError::InvalidComponent);
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    /// DER content octets: the first two components folded into a single
    /// octet as `c0 * 40 + c1`, every further component in base-128 groups
    /// with the continuation bit set on all octets but the last.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() + 1);
        // the constructor guarantees the fold fits one octet
        out.push((self.0[0] * 40 + self.0[1]) as u8);
        for &component in &self.0[2..] {
            write_base128(&mut out, component);
        }
        out
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, OidError> {
        let (&first, rest) = payload.split_first().ok_or(OidError::Truncated)?;
        let mut components = vec![u64::from(first / 40), u64::from(first % 40)];

        let mut value = 0u64;
        let mut in_component = false;
        for &byte in rest {
            value = value
                .checked_mul(128)
                .ok_or(OidError::InvalidComponent)?
                | u64::from(byte & 0x7F);
            in_component = true;
            if byte & 0x80 == 0 {
                components.push(value);
                value = 0;
                in_component = false;
            }
        }

        // A dangling continuation bit means the last component was cut off.
        if in_component {
            return Err(OidError::Truncated);
        }

        Ok(Self(components))
    }
}

fn write_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for group in groups[1..count].iter().rev() {
        out.push(group | 0x80);
    }
    out.push(groups[0]);
}

impl Asn1Type for ObjectIdentifier {
    const TAG: Tag = Tag::OID;
    const NAME: &'static str = "ObjectIdentifier";
}

impl FromStr for ObjectIdentifier {
    type Err = OidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| OidError::InvalidComponent))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(components)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, component) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectIdentifier({})", self)
    }
}

impl ser::Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer
                .serialize_newtype_struct(Self::NAME, &serde_bytes::Bytes::new(&self.to_payload()))
        }
    }
}

impl<'de> de::Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = ObjectIdentifier;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a dotted string or DER-encoded object identifier")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                ObjectIdentifier::from_payload(v).map_err(E::custom)
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_bytes(Visitor)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(Visitor)
        } else {
            deserializer.deserialize_newtype_struct(Self::NAME, Visitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_string_round_trip() {
        let oid: ObjectIdentifier = "1.2.840.113549.1.1.1".parse().unwrap();
        assert_eq!(oid.components(), &[1, 2, 840, 113549, 1, 1, 1]);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.1.1");
    }

    #[test]
    fn rsa_encryption_payload() {
        let oid: ObjectIdentifier = "1.2.840.113549.1.1.1".parse().unwrap();
        let payload = oid.to_payload();
        assert_eq!(
            payload,
            [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01]
        );
        assert_eq!(ObjectIdentifier::from_payload(&payload).unwrap(), oid);
    }

    #[test]
    fn single_component_is_rejected() {
        assert_eq!("1".parse::<ObjectIdentifier>(), Err(OidError::TooFewComponents));
    }

    #[test]
    fn first_pair_must_fold_into_one_octet() {
        assert_eq!(
            "2.999".parse::<ObjectIdentifier>(),
            Err(OidError::InvalidComponent)
        );

        // 2 * 40 + 175 = 255, the largest encodable fold
        let oid: ObjectIdentifier = "2.175".parse().unwrap();
        assert_eq!(oid.to_payload(), [0xFF]);

        // the decoded split is first/40, first%40; the payload round-trips
        let decoded = ObjectIdentifier::from_payload(&[0xFF]).unwrap();
        assert_eq!(decoded.components(), &[6, 15]);
        assert_eq!(decoded.to_payload(), [0xFF]);
    }

    #[test]
    fn dangling_continuation_bit() {
        assert_eq!(
            ObjectIdentifier::from_payload(&[0x2A, 0x86]),
            Err(OidError::Truncated)
        );
    }

    #[test]
    fn empty_payload() {
        assert_eq!(ObjectIdentifier::from_payload(&[]), Err(OidError::Truncated));
    }
}
