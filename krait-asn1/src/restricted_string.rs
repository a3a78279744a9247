use serde::{de, ser};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// A character fell outside the repertoire of a restricted string kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid charset for {charset} string")]
pub struct CharSetError {
    pub charset: &'static str,
}

/// Character repertoire of a restricted ASN.1 string kind.
pub trait CharSet {
    const NAME: &'static str;

    fn check(c: char) -> bool;
}

/// A string whose characters are validated against `C` at construction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RestrictedString<C: CharSet> {
    data: String,
    marker: PhantomData<C>,
}

impl<C: CharSet> RestrictedString<C> {
    pub fn new(data: impl Into<String>) -> Result<Self, CharSetError> {
        let data = data.into();
        if data.chars().any(|c| !C::check(c)) {
            return Err(CharSetError { charset: C::NAME });
        }
        Ok(Self {
            data,
            marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn into_string(self) -> String {
        self.data
    }
}

impl<C: CharSet> Deref for RestrictedString<C> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<C: CharSet> From<RestrictedString<C>> for String {
    fn from(s: RestrictedString<C>) -> Self {
        s.data
    }
}

impl<C: CharSet> fmt::Display for RestrictedString<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

impl<C: CharSet> fmt::Debug for RestrictedString<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", C::NAME, self.data)
    }
}

impl<C: CharSet> ser::Serialize for RestrictedString<C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, C: CharSet> de::Deserialize<'de> for RestrictedString<C> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor<C>(PhantomData<C>);

        impl<'de, C: CharSet> de::Visitor<'de> for Visitor<C> {
            type Value = RestrictedString<C>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a valid {} string", C::NAME)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                RestrictedString::new(v).map_err(E::custom)
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                RestrictedString::new(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_string(Visitor::<C>(PhantomData))
    }
}

macro_rules! charset {
    ($name:ident, $display:literal, |$c:ident| $check:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name;

        impl CharSet for $name {
            const NAME: &'static str = $display;

            #[inline]
            fn check($c: char) -> bool {
                $check
            }
        }
    };
}

charset!(PrintableCharSet, "Printable", |c| (' '..='~').contains(&c));
charset!(T61CharSet, "T61", |c| (c as u32) <= 0xFF);
charset!(IA5CharSet, "IA5", |c| c.is_ascii());
charset!(BmpCharSet, "BMP", |c| (c as u32) <= 0xFFFF);
charset!(UniversalCharSet, "Universal", |c| {
    let _ = c;
    true
});

pub type PrintableString = RestrictedString<PrintableCharSet>;
pub type T61String = RestrictedString<T61CharSet>;
pub type IA5String = RestrictedString<IA5CharSet>;
pub type BmpString = RestrictedString<BmpCharSet>;
pub type UniversalString = RestrictedString<UniversalCharSet>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_accepts_visible_ascii() {
        assert!(PrintableString::new("Test2 (parens) '+,-./:=?").is_ok());
    }

    #[test]
    fn printable_rejects_control_and_unicode() {
        assert!(PrintableString::new("tab\there").is_err());
        assert!(PrintableString::new("héllo").is_err());
    }

    #[test]
    fn ia5_is_ascii_only() {
        assert!(IA5String::new("user@example.com\r\n").is_ok());
        assert!(IA5String::new("héllo").is_err());
    }

    #[test]
    fn t61_accepts_latin1() {
        assert!(T61String::new("héllo").is_ok());
        assert!(T61String::new("苗").is_err());
    }

    #[test]
    fn bmp_rejects_supplementary_planes() {
        assert!(BmpString::new("苗字").is_ok());
        assert!(BmpString::new("🦀").is_err());
    }

    #[test]
    fn universal_accepts_anything() {
        assert!(UniversalString::new("🦀 héllo 苗").is_ok());
    }
}
