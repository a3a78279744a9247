//! A BER/DER subset codec built around an explicit element tree, with a
//! serde bridge mapping plain Rust records onto SEQUENCE/SET structures.
//!
//! The supported universal types are INTEGER, BIT STRING, OCTET STRING,
//! NULL, OBJECT IDENTIFIER, UTF8String, PrintableString, T61String,
//! IA5String, BMPString, UniversalString, UTCTime, SEQUENCE and SET, plus
//! explicit context-specific tags. Only definite lengths and single-octet
//! tag numbers are handled.
//!
//! Records serialize through the wrapper types of the `krait-asn1` crate,
//! which select the string variant of a text field, SET rendering, an
//! encapsulating OCTET STRING / BIT STRING / SEQUENCE layer, or a context
//! tag:
//!
//! ```
//! use krait_asn1::wrapper::Utf8StringAsn1;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Handshake {
//!     version: u8,
//!     comment: Utf8StringAsn1,
//! }
//!
//! let handshake = Handshake {
//!     version: 3,
//!     comment: Utf8StringAsn1::from("hi"),
//! };
//!
//! let encoded = krait_asn1_der::to_vec(&handshake).unwrap();
//! assert_eq!(encoded, b"\x30\x07\x02\x01\x03\x0c\x02hi");
//!
//! let decoded: Handshake = krait_asn1_der::from_bytes(&encoded).unwrap();
//! assert_eq!(decoded, handshake);
//! ```

#[macro_use]
mod debug_log;

mod de;
mod directive;
mod misc;
mod ser;

pub mod element;
pub mod parser;

pub use crate::de::{from_bytes, from_element, Deserializer};
pub use crate::element::Asn1Element;
pub use crate::parser::{parse_der, FactoryRegistry, Parser, DEFAULT_MAX_DEPTH};
pub use crate::ser::{to_element, to_vec, to_writer, Serializer};

use krait_asn1::restricted_string::CharSetError;
use krait_asn1::tag::Tag;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Asn1DerError>;

#[derive(Debug, thiserror::Error)]
pub enum Asn1DerError {
    /// The input ended before a complete TLV could be read.
    #[error("truncated data")]
    TruncatedData,

    /// Structurally invalid input, e.g. an indefinite length, a multi-octet
    /// tag number or trailing bytes inside a constructed payload.
    #[error("malformed data: {0}")]
    Format(&'static str),

    /// A universal-class tag with no registered factory.
    #[error("no factory registered for tag {0}")]
    UnsupportedTag(Tag),

    /// The decoded element does not match the shape the record expects at
    /// this position.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A string value fell outside its character repertoire.
    #[error(transparent)]
    Validation(#[from] CharSetError),

    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    #[error("unsupported value: {0}")]
    UnsupportedValue(&'static str),

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl serde::ser::Error for Asn1DerError {
    fn custom<T: Display>(msg: T) -> Self {
        Asn1DerError::Message(msg.to_string())
    }
}

impl serde::de::Error for Asn1DerError {
    fn custom<T: Display>(msg: T) -> Self {
        Asn1DerError::Message(msg.to_string())
    }
}
