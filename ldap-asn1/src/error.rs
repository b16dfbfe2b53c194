//! Error types shared with the rest of the workspace

pub use ldap_core::error::{LdapError, LdapResult};
