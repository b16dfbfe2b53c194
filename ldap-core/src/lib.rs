//! Core types and utilities for the LDAP BER codec
//!
//! This crate provides the error taxonomy shared by every layer, the LDAP
//! result code table, the distinguished-name types the decoder validates
//! names with, and the negative-response seed carried by
//! response-carrying errors.

pub mod dn;
pub mod error;
pub mod response;
pub mod result_code;

pub use dn::{Dn, Rdn};
pub use error::{LdapError, LdapResult};
pub use response::{ErrorResponse, ResponseType};
pub use result_code::ResultCode;
