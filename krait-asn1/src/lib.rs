//! ASN.1 simple types and serde wrappers.
//!
//! This crate provides the value types of the ASN.1 subset handled by the
//! `krait-asn1-der` codec (tags, restricted strings, object identifiers,
//! bit strings, UTCTime) together with the wrapper types used to describe
//! how a plain Rust struct maps onto a DER structure.

pub mod bit_string;
pub mod date;
pub mod oid;
pub mod restricted_string;
pub mod tag;
pub mod wrapper;

use tag::Tag;

/// Rust types mapping to a fixed ASN.1 tag.
///
/// `NAME` is the serde newtype marker the DER codec matches on to learn
/// which ASN.1 type the wrapped value should be rendered as.
pub trait Asn1Type {
    const TAG: Tag;
    const NAME: &'static str;
}
