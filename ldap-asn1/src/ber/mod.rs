//! BER (Basic Encoding Rules) for the LDAP subset of ASN.1
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 for an extended tag
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: `0x80 | n` followed by `n` big-endian length bytes
//!
//! LDAP restricts BER: definite lengths only, primitive OCTET STRINGs, and
//! BOOLEAN TRUE written as `0xFF` (RFC 4511 §5.1).
//!
//! # Modules
//!
//! - [`types`]: tag and length codecs
//! - [`decoder`]: typed value decoders with field constraints
//! - [`encoder`]: exactly-sized output buffer used by the two-pass encoders

pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::IntegerBounds;
pub use encoder::BerEncoder;
pub use types::{BerLength, BerTag, BerTagClass};
