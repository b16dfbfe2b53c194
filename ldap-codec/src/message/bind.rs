//! Bind operation

use crate::error::LdapResult;
use crate::message::result::OperationResult;
use ldap_asn1::ber::encoder::{integer_len, octet_string_len};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use ldap_core::Dn;

/// Context tags of the bind operation
pub mod tag {
    pub const SIMPLE: u8 = 0x80;
    pub const SASL: u8 = 0xA3;
    pub const SERVER_SASL_CREDS: u8 = 0x87;
}

/// Protocol version spoken by this codec
pub const LDAP_VERSION3: u8 = 3;

/// ```text
/// AuthenticationChoice ::= CHOICE {
///      simple                  [0] OCTET STRING,
///      sasl                    [3] SaslCredentials,
///      ...  }
///
/// SaslCredentials ::= SEQUENCE {
///      mechanism               LDAPString,
///      credentials             OCTET STRING OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Simple(Vec<u8>),
    Sasl {
        mechanism: String,
        credentials: Option<Vec<u8>>,
    },
}

impl Default for Authentication {
    fn default() -> Self {
        Authentication::Simple(Vec::new())
    }
}

impl Authentication {
    fn sasl_content_len(mechanism: &str, credentials: &Option<Vec<u8>>) -> usize {
        octet_string_len(mechanism.as_bytes())
            + credentials.as_ref().map_or(0, |c| octet_string_len(c))
    }

    fn compute_length(&self) -> usize {
        match self {
            Authentication::Simple(password) => octet_string_len(password),
            Authentication::Sasl {
                mechanism,
                credentials,
            } => tlv_len(Self::sasl_content_len(mechanism, credentials)),
        }
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        match self {
            Authentication::Simple(password) => encoder.encode_octet_string(tag::SIMPLE, password),
            Authentication::Sasl {
                mechanism,
                credentials,
            } => {
                encoder.put_header(tag::SASL, Self::sasl_content_len(mechanism, credentials))?;
                encoder.encode_octet_string(universal::OCTET_STRING, mechanism.as_bytes())?;
                if let Some(credentials) = credentials {
                    encoder.encode_octet_string(universal::OCTET_STRING, credentials)?;
                }
                Ok(())
            }
        }
    }
}

/// ```text
/// BindRequest ::= [APPLICATION 0] SEQUENCE {
///      version                 INTEGER (1 ..  127),
///      name                    LDAPDN,
///      authentication          AuthenticationChoice }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub version: u8,
    pub name: Dn,
    pub authentication: Authentication,
}

impl Default for BindRequest {
    fn default() -> Self {
        Self {
            version: LDAP_VERSION3,
            name: Dn::root(),
            authentication: Authentication::default(),
        }
    }
}

impl BindRequest {
    /// Simple bind with a password
    pub fn simple(name: Dn, password: impl Into<Vec<u8>>) -> Self {
        Self {
            version: LDAP_VERSION3,
            name,
            authentication: Authentication::Simple(password.into()),
        }
    }

    /// SASL bind
    pub fn sasl(name: Dn, mechanism: impl Into<String>, credentials: Option<Vec<u8>>) -> Self {
        Self {
            version: LDAP_VERSION3,
            name,
            authentication: Authentication::Sasl {
                mechanism: mechanism.into(),
                credentials,
            },
        }
    }

    /// Anonymous simple bind
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn content_len(&self) -> usize {
        integer_len(self.version as i64)
            + octet_string_len(self.name.as_bytes())
            + self.authentication.compute_length()
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_integer(self.version as i64)?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.name.as_bytes())?;
        self.authentication.encode(encoder)
    }
}

/// ```text
/// BindResponse ::= [APPLICATION 1] SEQUENCE {
///      COMPONENTS OF LDAPResult,
///      serverSaslCreds    [7] OCTET STRING OPTIONAL }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindResponse {
    pub result: OperationResult,
    pub server_sasl_creds: Option<Vec<u8>>,
}

impl BindResponse {
    pub fn new(result: OperationResult) -> Self {
        Self {
            result,
            server_sasl_creds: None,
        }
    }

    pub(crate) fn content_len(&self) -> usize {
        self.result.components_len()
            + self
                .server_sasl_creds
                .as_ref()
                .map_or(0, |c| octet_string_len(c))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        self.result.encode_components(encoder)?;
        if let Some(credentials) = &self.server_sasl_creds {
            encoder.encode_octet_string(tag::SERVER_SASL_CREDS, credentials)?;
        }
        Ok(())
    }
}
