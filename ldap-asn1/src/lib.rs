//! ASN.1 BER processing for the LDAP codec
//!
//! This crate holds everything that is independent of the LDAP message
//! shapes:
//!
//! - [`ber`]: tag/length codecs, typed value decoders and the encoder buffer
//! - [`tlv`]: the byte-level model of one BER unit
//! - [`container`]: the per-decode context driven by a grammar
//! - [`grammar`]: the table-driven `(state, tag) -> action` engine
//! - [`stream`]: the incremental decoder feeding TLVs to a grammar
//!
//! A protocol defines a container type, a state enumeration and a static
//! [`Grammar`]; [`Asn1Decoder`] then decodes arbitrary chunks of input into
//! that container.

pub mod ber;
pub mod container;
pub mod error;
pub mod grammar;
pub mod stream;
pub mod tlv;

pub use ber::{BerEncoder, BerLength, BerTag, BerTagClass, IntegerBounds};
pub use container::{Asn1Container, ContainerCore, OpenTlv};
pub use error::{LdapError, LdapResult};
pub use grammar::{Action, Grammar, GrammarState, Transition};
pub use stream::{Asn1Decoder, DecodeStatus, DecoderConfig};
pub use tlv::{Tlv, TlvState};
