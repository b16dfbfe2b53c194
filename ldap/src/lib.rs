//! ldap - LDAPv3 BER codec
//!
//! This library decodes and encodes LDAPv3 protocol messages as sent over
//! a directory server connection.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ldap-core`: Result codes, distinguished names, error handling
//! - `ldap-asn1`: BER tags, lengths, TLVs and the grammar-driven stream decoder
//! - `ldap-codec`: LDAP messages, filters, controls, grammar and encoder
//!
//! # Usage
//!
//! ```no_run
//! use ldap::{decode_message, encode_message, LdapMessage, ProtocolOp};
//!
//! let bytes = encode_message(&LdapMessage::new(1, ProtocolOp::UnbindRequest))?;
//! let message = decode_message(&bytes)?;
//! assert_eq!(message.op, ProtocolOp::UnbindRequest);
//! # Ok::<(), ldap::LdapError>(())
//! ```

// Re-export core types
pub use ldap_core::{Dn, ErrorResponse, LdapError, LdapResult, Rdn, ResponseType, ResultCode};

// Re-export BER layer
pub mod asn1 {
    pub use ldap_asn1::*;
}

// Re-export message codec
pub mod codec {
    pub use ldap_codec::*;
}

pub use ldap_codec::{
    decode_message, encode_message, Control, Filter, LdapDecoder, LdapMessage, ProtocolOp,
};
