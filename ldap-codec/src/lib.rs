//! LDAPv3 message codec
//!
//! This crate turns bytes into [`LdapMessage`] values and back:
//!
//! - [`message`]: the protocol operations and their fields
//! - [`filter`]: search filter trees
//! - [`controls`]: request and response controls
//! - [`grammar`] and [`container`]: the decode state machine
//! - [`decoder`]: the stream decoder with error recovery
//! - [`encoder`]: the two-pass encoder
//! - [`response`]: negative responses for rejected requests

pub mod container;
pub mod controls;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod grammar;
pub mod message;
pub mod response;

pub use container::LdapMessageContainer;
pub use controls::{Control, ControlValue};
pub use decoder::{decode_message, LdapDecoder};
pub use encoder::{encode_message, Encodable};
pub use error::{LdapError, LdapResult};
pub use filter::Filter;
pub use grammar::LdapState;
pub use message::{LdapMessage, ProtocolOp};
pub use response::{error_response, negative_response, response_message};
