//! Extended operations and intermediate responses

use crate::error::LdapResult;
use crate::message::result::OperationResult;
use ldap_asn1::ber::encoder::octet_string_len;
use ldap_asn1::BerEncoder;

/// Context tags of extended requests, extended responses and
/// intermediate responses
pub mod tag {
    pub const REQUEST_NAME: u8 = 0x80;
    pub const REQUEST_VALUE: u8 = 0x81;
    pub const RESPONSE_NAME: u8 = 0x8A;
    pub const RESPONSE_VALUE: u8 = 0x8B;
    pub const INTERMEDIATE_NAME: u8 = 0x80;
    pub const INTERMEDIATE_VALUE: u8 = 0x81;
}

fn optional_len(value: Option<&[u8]>) -> usize {
    value.map_or(0, octet_string_len)
}

fn encode_optional(encoder: &mut BerEncoder, tag: u8, value: Option<&[u8]>) -> LdapResult<()> {
    match value {
        Some(value) => encoder.encode_octet_string(tag, value),
        None => Ok(()),
    }
}

/// ```text
/// ExtendedRequest ::= [APPLICATION 23] SEQUENCE {
///      requestName      [0] LDAPOID,
///      requestValue     [1] OCTET STRING OPTIONAL }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedRequest {
    pub request_name: String,
    pub request_value: Option<Vec<u8>>,
}

impl ExtendedRequest {
    pub fn new(request_name: impl Into<String>) -> Self {
        Self {
            request_name: request_name.into(),
            request_value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.request_value = Some(value.into());
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.request_name.as_bytes()) + optional_len(self.request_value.as_deref())
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(tag::REQUEST_NAME, self.request_name.as_bytes())?;
        encode_optional(encoder, tag::REQUEST_VALUE, self.request_value.as_deref())
    }
}

/// ```text
/// ExtendedResponse ::= [APPLICATION 24] SEQUENCE {
///      COMPONENTS OF LDAPResult,
///      responseName     [10] LDAPOID OPTIONAL,
///      responseValue    [11] OCTET STRING OPTIONAL }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedResponse {
    pub result: OperationResult,
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

impl ExtendedResponse {
    pub fn new(result: OperationResult) -> Self {
        Self {
            result,
            response_name: None,
            response_value: None,
        }
    }

    pub(crate) fn content_len(&self) -> usize {
        self.result.components_len()
            + optional_len(self.response_name.as_deref().map(str::as_bytes))
            + optional_len(self.response_value.as_deref())
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        self.result.encode_components(encoder)?;
        encode_optional(
            encoder,
            tag::RESPONSE_NAME,
            self.response_name.as_deref().map(str::as_bytes),
        )?;
        encode_optional(encoder, tag::RESPONSE_VALUE, self.response_value.as_deref())
    }
}

/// ```text
/// IntermediateResponse ::= [APPLICATION 25] SEQUENCE {
///      responseName     [0] LDAPOID OPTIONAL,
///      responseValue    [1] OCTET STRING OPTIONAL }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateResponse {
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

impl IntermediateResponse {
    pub(crate) fn content_len(&self) -> usize {
        optional_len(self.response_name.as_deref().map(str::as_bytes))
            + optional_len(self.response_value.as_deref())
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encode_optional(
            encoder,
            tag::INTERMEDIATE_NAME,
            self.response_name.as_deref().map(str::as_bytes),
        )?;
        encode_optional(encoder, tag::INTERMEDIATE_VALUE, self.response_value.as_deref())
    }
}
