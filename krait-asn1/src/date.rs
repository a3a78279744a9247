use crate::tag::Tag;
use crate::Asn1Type;
use serde::{de, ser};
use std::fmt;

/// An ASN.1 UTCTime: two-digit year, second precision, `Z` suffix.
///
/// Years are interpreted per RFC 5280: `50..=99` map to 19xx, `00..=49`
/// to 20xx, so the representable range is 1950..=2049.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UTCTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl UTCTime {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if (1950..=2049).contains(&year)
            && (1..=12).contains(&month)
            && (1..=31).contains(&day)
            && hour < 24
            && minute < 60
            && second < 60
        {
            Some(Self {
                year,
                month,
                day,
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// The 13-byte `YYMMDDHHMMSSZ` content octets.
    pub fn to_payload(&self) -> [u8; 13] {
        let mut encoded = [b'0'; 13];
        encoded[12] = b'Z';

        let yy = if self.year >= 2000 {
            self.year - 2000
        } else {
            self.year - 1900
        } as u8;

        for (offset, value) in [
            (0, yy),
            (2, self.month),
            (4, self.day),
            (6, self.hour),
            (8, self.minute),
            (10, self.second),
        ] {
            encoded[offset] |= value / 10;
            encoded[offset + 1] |= value % 10;
        }

        encoded
    }

    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != 13
            || payload[12] != b'Z'
            || !payload[..12].iter().all(u8::is_ascii_digit)
        {
            return None;
        }

        let pair = |offset: usize| (payload[offset] & 0x0F) * 10 + (payload[offset + 1] & 0x0F);

        let yy = u16::from(pair(0));
        let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
        Self::new(year, pair(2), pair(4), pair(6), pair(8), pair(10))
    }
}

impl Asn1Type for UTCTime {
    const TAG: Tag = Tag::UTC_TIME;
    const NAME: &'static str = "UTCTime";
}

impl fmt::Debug for UTCTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UTCTime({:04}-{:02}-{:02} {:02}:{:02}:{:02}Z)",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl ser::Serialize for UTCTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.serialize_newtype_struct(Self::NAME, &serde_bytes::Bytes::new(&self.to_payload()))
    }
}

impl<'de> de::Deserialize<'de> for UTCTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = UTCTime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 13-byte YYMMDDHHMMSSZ UTCTime payload")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                UTCTime::from_payload(v).ok_or_else(|| {
                    E::invalid_value(de::Unexpected::Bytes(v), &"a valid UTCTime payload")
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

#[cfg(feature = "chrono_conversion")]
mod chrono_conversion {
    use super::UTCTime;
    use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

    impl TryFrom<NaiveDateTime> for UTCTime {
        type Error = ();

        fn try_from(d: NaiveDateTime) -> Result<Self, Self::Error> {
            u16::try_from(d.year())
                .ok()
                .and_then(|year| {
                    UTCTime::new(
                        year,
                        d.month() as u8,
                        d.day() as u8,
                        d.hour() as u8,
                        d.minute() as u8,
                        d.second() as u8,
                    )
                })
                .ok_or(())
        }
    }

    impl TryFrom<DateTime<Utc>> for UTCTime {
        type Error = ();

        fn try_from(d: DateTime<Utc>) -> Result<Self, Self::Error> {
            Self::try_from(d.naive_utc())
        }
    }

    impl TryFrom<UTCTime> for NaiveDateTime {
        type Error = ();

        fn try_from(t: UTCTime) -> Result<Self, Self::Error> {
            NaiveDate::from_ymd_opt(i32::from(t.year()), u32::from(t.month()), u32::from(t.day()))
                .and_then(|date| {
                    date.and_hms_opt(
                        u32::from(t.hour()),
                        u32::from(t.minute()),
                        u32::from(t.second()),
                    )
                })
                .ok_or(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trip() {
        let time = UTCTime::new(2024, 12, 29, 13, 37, 42).unwrap();
        assert_eq!(&time.to_payload(), b"241229133742Z");
        assert_eq!(UTCTime::from_payload(b"241229133742Z").unwrap(), time);
    }

    #[test]
    fn two_digit_year_pivot() {
        assert_eq!(UTCTime::from_payload(b"500101000000Z").unwrap().year(), 1950);
        assert_eq!(UTCTime::from_payload(b"490101000000Z").unwrap().year(), 2049);
    }

    #[test]
    fn malformed_payloads() {
        assert!(UTCTime::from_payload(b"241229133742").is_none());
        assert!(UTCTime::from_payload(b"2412291337420").is_none());
        assert!(UTCTime::from_payload(b"241329133742Z").is_none());
        assert!(UTCTime::from_payload(b"24122913374aZ").is_none());
    }

    #[test]
    fn out_of_range_date() {
        assert!(UTCTime::new(2024, 13, 1, 0, 0, 0).is_none());
        assert!(UTCTime::new(1949, 1, 1, 0, 0, 0).is_none());
    }
}
