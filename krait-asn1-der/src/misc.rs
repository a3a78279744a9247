use crate::{Asn1DerError, Result};
use std::io::{ErrorKind, Read, Write};
use std::mem;

fn map_read_error(e: std::io::Error) -> Asn1DerError {
    if e.kind() == ErrorKind::UnexpectedEof {
        Asn1DerError::TruncatedData
    } else {
        Asn1DerError::Io(e)
    }
}

pub trait ReadExt {
    fn read_one(&mut self) -> Result<u8>;
}

impl<R: Read> ReadExt for R {
    fn read_one(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf).map_err(map_read_error)?;
        Ok(buf[0])
    }
}

pub trait WriteExt {
    fn write_one(&mut self, byte: u8) -> Result<usize>;
    fn write_exact(&mut self, data: &[u8]) -> Result<usize>;
}

impl<W: Write> WriteExt for W {
    fn write_one(&mut self, byte: u8) -> Result<usize> {
        self.write_exact(&[byte])
    }

    fn write_exact(&mut self, data: &[u8]) -> Result<usize> {
        self.write_all(data).map_err(Asn1DerError::Io)?;
        Ok(data.len())
    }
}

/// Definite-length octet codec (short and long form).
pub struct Length;

impl Length {
    /// Amount of octets `Self::serialize` produces for `len`.
    pub fn encoded_len(len: usize) -> usize {
        if len > 127 {
            Self::count_octets(len) + 1
        } else {
            1
        }
    }

    fn count_octets(len: usize) -> usize {
        let used_bits = usize::BITS - len.leading_zeros();
        ((used_bits + 7) / 8).max(1) as usize
    }

    pub fn serialize(len: usize, mut writer: impl Write) -> Result<usize> {
        if len < 128 {
            writer.write_one(len as u8)
        } else {
            let octets = Self::count_octets(len);
            let mut written = writer.write_one(0x80 | octets as u8)?;
            for shift in (0..octets).rev() {
                written += writer.write_one((len >> (shift * 8)) as u8)?;
            }
            Ok(written)
        }
    }

    pub fn deserialized(mut reader: impl Read) -> Result<usize> {
        let first = reader.read_one()?;
        if first & 0x80 == 0 {
            return Ok(usize::from(first));
        }

        let octets = usize::from(first & 0x7F);
        if octets == 0 {
            return Err(Asn1DerError::Format("the indefinite length form is not supported"));
        }
        if octets > mem::size_of::<usize>() {
            return Err(Asn1DerError::Format("length exceeds the addressable range"));
        }

        let mut len = 0usize;
        for _ in 0..octets {
            len = (len << 8) | usize::from(reader.read_one()?);
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        Length::serialize(len, &mut buf).unwrap();
        buf
    }

    #[test]
    fn short_form() {
        assert_eq!(encoded(0), [0x00]);
        assert_eq!(encoded(5), [0x05]);
        assert_eq!(encoded(127), [0x7F]);
    }

    #[test]
    fn long_form() {
        assert_eq!(encoded(128), [0x81, 0x80]);
        assert_eq!(encoded(256), [0x82, 0x01, 0x00]);
        assert_eq!(encoded(65536), [0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn round_trip_consumes_exactly_encoded_len() {
        for len in [0usize, 1, 127, 128, 255, 256, 0xFFFF, 0x10000, 0x123456] {
            let buf = encoded(len);
            assert_eq!(buf.len(), Length::encoded_len(len));
            let mut reader = buf.as_slice();
            assert_eq!(Length::deserialized(&mut reader).unwrap(), len);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn indefinite_form_is_rejected() {
        assert!(matches!(
            Length::deserialized([0x80].as_slice()),
            Err(Asn1DerError::Format(_))
        ));
    }

    #[test]
    fn truncated_long_form() {
        assert!(matches!(
            Length::deserialized([0x82, 0x01].as_slice()),
            Err(Asn1DerError::TruncatedData)
        ));
    }
}
