//! LDAPv3 message model (RFC 4511 section 4)
//!
//! ```text
//! LDAPMessage ::= SEQUENCE {
//!      messageID       MessageID,
//!      protocolOp      CHOICE { ... },
//!      controls       [0] Controls OPTIONAL }
//! ```
//!
//! Every type in this module is a plain value: the decoder builds them
//! through their public fields and the encoder reads them back through
//! [`Encodable`].

pub mod attribute;
pub mod bind;
pub mod extended;
pub mod result;
pub mod search;
pub mod update;

pub use attribute::Attribute;
pub use bind::{Authentication, BindRequest, BindResponse, LDAP_VERSION3};
pub use extended::{ExtendedRequest, ExtendedResponse, IntermediateResponse};
pub use result::OperationResult;
pub use search::{DerefAliases, SearchRequest, SearchResultEntry, SearchResultReference, SearchScope};
pub use update::{AddRequest, Change, CompareRequest, ModifyDnRequest, ModifyOperation, ModifyRequest};

use crate::controls::{Control, CONTROLS_TAG};
use crate::encoder::{content_len, Encodable};
use crate::error::LdapResult;
use ldap_asn1::ber::encoder::{integer_len, integer_value_len};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use ldap_core::{Dn, ResponseType};

/// Application tags of the protocol operations
pub mod tag {
    pub const BIND_REQUEST: u8 = 0x60;
    pub const BIND_RESPONSE: u8 = 0x61;
    pub const UNBIND_REQUEST: u8 = 0x42;
    pub const SEARCH_REQUEST: u8 = 0x63;
    pub const SEARCH_RESULT_ENTRY: u8 = 0x64;
    pub const SEARCH_RESULT_DONE: u8 = 0x65;
    pub const SEARCH_RESULT_REFERENCE: u8 = 0x73;
    pub const MODIFY_REQUEST: u8 = 0x66;
    pub const MODIFY_RESPONSE: u8 = 0x67;
    pub const ADD_REQUEST: u8 = 0x68;
    pub const ADD_RESPONSE: u8 = 0x69;
    pub const DEL_REQUEST: u8 = 0x4A;
    pub const DEL_RESPONSE: u8 = 0x6B;
    pub const MODIFY_DN_REQUEST: u8 = 0x6C;
    pub const MODIFY_DN_RESPONSE: u8 = 0x6D;
    pub const COMPARE_REQUEST: u8 = 0x6E;
    pub const COMPARE_RESPONSE: u8 = 0x6F;
    pub const ABANDON_REQUEST: u8 = 0x50;
    pub const EXTENDED_REQUEST: u8 = 0x77;
    pub const EXTENDED_RESPONSE: u8 = 0x78;
    pub const INTERMEDIATE_RESPONSE: u8 = 0x79;
}

/// The `protocolOp` CHOICE
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolOp {
    BindRequest(BindRequest),
    BindResponse(BindResponse),
    UnbindRequest,
    SearchRequest(SearchRequest),
    SearchResultEntry(SearchResultEntry),
    SearchResultDone(OperationResult),
    SearchResultReference(SearchResultReference),
    ModifyRequest(ModifyRequest),
    ModifyResponse(OperationResult),
    AddRequest(AddRequest),
    AddResponse(OperationResult),
    DelRequest(Dn),
    DelResponse(OperationResult),
    ModifyDnRequest(ModifyDnRequest),
    ModifyDnResponse(OperationResult),
    CompareRequest(CompareRequest),
    CompareResponse(OperationResult),
    /// Message id of the operation to abandon
    AbandonRequest(i32),
    ExtendedRequest(ExtendedRequest),
    ExtendedResponse(ExtendedResponse),
    IntermediateResponse(IntermediateResponse),
}

impl ProtocolOp {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolOp::BindRequest(_) => "BindRequest",
            ProtocolOp::BindResponse(_) => "BindResponse",
            ProtocolOp::UnbindRequest => "UnbindRequest",
            ProtocolOp::SearchRequest(_) => "SearchRequest",
            ProtocolOp::SearchResultEntry(_) => "SearchResultEntry",
            ProtocolOp::SearchResultDone(_) => "SearchResultDone",
            ProtocolOp::SearchResultReference(_) => "SearchResultReference",
            ProtocolOp::ModifyRequest(_) => "ModifyRequest",
            ProtocolOp::ModifyResponse(_) => "ModifyResponse",
            ProtocolOp::AddRequest(_) => "AddRequest",
            ProtocolOp::AddResponse(_) => "AddResponse",
            ProtocolOp::DelRequest(_) => "DelRequest",
            ProtocolOp::DelResponse(_) => "DelResponse",
            ProtocolOp::ModifyDnRequest(_) => "ModifyDnRequest",
            ProtocolOp::ModifyDnResponse(_) => "ModifyDnResponse",
            ProtocolOp::CompareRequest(_) => "CompareRequest",
            ProtocolOp::CompareResponse(_) => "CompareResponse",
            ProtocolOp::AbandonRequest(_) => "AbandonRequest",
            ProtocolOp::ExtendedRequest(_) => "ExtendedRequest",
            ProtocolOp::ExtendedResponse(_) => "ExtendedResponse",
            ProtocolOp::IntermediateResponse(_) => "IntermediateResponse",
        }
    }

    /// Application tag byte of the operation
    pub fn tag(&self) -> u8 {
        match self {
            ProtocolOp::BindRequest(_) => tag::BIND_REQUEST,
            ProtocolOp::BindResponse(_) => tag::BIND_RESPONSE,
            ProtocolOp::UnbindRequest => tag::UNBIND_REQUEST,
            ProtocolOp::SearchRequest(_) => tag::SEARCH_REQUEST,
            ProtocolOp::SearchResultEntry(_) => tag::SEARCH_RESULT_ENTRY,
            ProtocolOp::SearchResultDone(_) => tag::SEARCH_RESULT_DONE,
            ProtocolOp::SearchResultReference(_) => tag::SEARCH_RESULT_REFERENCE,
            ProtocolOp::ModifyRequest(_) => tag::MODIFY_REQUEST,
            ProtocolOp::ModifyResponse(_) => tag::MODIFY_RESPONSE,
            ProtocolOp::AddRequest(_) => tag::ADD_REQUEST,
            ProtocolOp::AddResponse(_) => tag::ADD_RESPONSE,
            ProtocolOp::DelRequest(_) => tag::DEL_REQUEST,
            ProtocolOp::DelResponse(_) => tag::DEL_RESPONSE,
            ProtocolOp::ModifyDnRequest(_) => tag::MODIFY_DN_REQUEST,
            ProtocolOp::ModifyDnResponse(_) => tag::MODIFY_DN_RESPONSE,
            ProtocolOp::CompareRequest(_) => tag::COMPARE_REQUEST,
            ProtocolOp::CompareResponse(_) => tag::COMPARE_RESPONSE,
            ProtocolOp::AbandonRequest(_) => tag::ABANDON_REQUEST,
            ProtocolOp::ExtendedRequest(_) => tag::EXTENDED_REQUEST,
            ProtocolOp::ExtendedResponse(_) => tag::EXTENDED_RESPONSE,
            ProtocolOp::IntermediateResponse(_) => tag::INTERMEDIATE_RESPONSE,
        }
    }

    /// Response operation answering this request
    ///
    /// `None` for responses and for requests that are never answered
    /// (unbind, abandon).
    pub fn response_type(&self) -> Option<ResponseType> {
        match self {
            ProtocolOp::BindRequest(_) => Some(ResponseType::BindResponse),
            ProtocolOp::SearchRequest(_) => Some(ResponseType::SearchResultDone),
            ProtocolOp::ModifyRequest(_) => Some(ResponseType::ModifyResponse),
            ProtocolOp::AddRequest(_) => Some(ResponseType::AddResponse),
            ProtocolOp::DelRequest(_) => Some(ResponseType::DelResponse),
            ProtocolOp::ModifyDnRequest(_) => Some(ResponseType::ModifyDnResponse),
            ProtocolOp::CompareRequest(_) => Some(ResponseType::CompareResponse),
            ProtocolOp::ExtendedRequest(_) => Some(ResponseType::ExtendedResponse),
            _ => None,
        }
    }

    /// `LDAPResult` of a response operation
    pub fn result(&self) -> Option<&OperationResult> {
        match self {
            ProtocolOp::BindResponse(response) => Some(&response.result),
            ProtocolOp::ExtendedResponse(response) => Some(&response.result),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => Some(result),
            _ => None,
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut OperationResult> {
        match self {
            ProtocolOp::BindResponse(response) => Some(&mut response.result),
            ProtocolOp::ExtendedResponse(response) => Some(&mut response.result),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => Some(result),
            _ => None,
        }
    }

    /// Size of the operation value, header excluded
    fn content_len(&self) -> usize {
        match self {
            ProtocolOp::BindRequest(request) => request.content_len(),
            ProtocolOp::BindResponse(response) => response.content_len(),
            ProtocolOp::UnbindRequest => 0,
            ProtocolOp::SearchRequest(request) => request.content_len(),
            ProtocolOp::SearchResultEntry(entry) => entry.content_len(),
            ProtocolOp::SearchResultReference(reference) => reference.content_len(),
            ProtocolOp::ModifyRequest(request) => request.content_len(),
            ProtocolOp::AddRequest(request) => request.content_len(),
            ProtocolOp::DelRequest(entry) => entry.as_bytes().len(),
            ProtocolOp::ModifyDnRequest(request) => request.content_len(),
            ProtocolOp::CompareRequest(request) => request.content_len(),
            ProtocolOp::AbandonRequest(id) => integer_value_len(*id as i64),
            ProtocolOp::ExtendedRequest(request) => request.content_len(),
            ProtocolOp::ExtendedResponse(response) => response.content_len(),
            ProtocolOp::IntermediateResponse(response) => response.content_len(),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => result.components_len(),
        }
    }
}

impl Encodable for ProtocolOp {
    fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        match self {
            ProtocolOp::UnbindRequest => return encoder.encode_null(tag::UNBIND_REQUEST),
            ProtocolOp::DelRequest(entry) => {
                return encoder.encode_octet_string(tag::DEL_REQUEST, entry.as_bytes());
            }
            ProtocolOp::AbandonRequest(id) => {
                return encoder.encode_integer_tagged(tag::ABANDON_REQUEST, *id as i64);
            }
            _ => {}
        }

        encoder.put_header(self.tag(), self.content_len())?;
        match self {
            ProtocolOp::BindRequest(request) => request.encode_content(encoder),
            ProtocolOp::BindResponse(response) => response.encode_content(encoder),
            ProtocolOp::SearchRequest(request) => request.encode_content(encoder),
            ProtocolOp::SearchResultEntry(entry) => entry.encode_content(encoder),
            ProtocolOp::SearchResultReference(reference) => reference.encode_content(encoder),
            ProtocolOp::ModifyRequest(request) => request.encode_content(encoder),
            ProtocolOp::AddRequest(request) => request.encode_content(encoder),
            ProtocolOp::ModifyDnRequest(request) => request.encode_content(encoder),
            ProtocolOp::CompareRequest(request) => request.encode_content(encoder),
            ProtocolOp::ExtendedRequest(request) => request.encode_content(encoder),
            ProtocolOp::ExtendedResponse(response) => response.encode_content(encoder),
            ProtocolOp::IntermediateResponse(response) => response.encode_content(encoder),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => result.encode_components(encoder),
            ProtocolOp::UnbindRequest | ProtocolOp::DelRequest(_) | ProtocolOp::AbandonRequest(_) => Ok(()),
        }
    }
}

/// A complete LDAP message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapMessage {
    pub message_id: i32,
    pub op: ProtocolOp,
    pub controls: Vec<Control>,
}

impl LdapMessage {
    pub fn new(message_id: i32, op: ProtocolOp) -> Self {
        Self {
            message_id,
            op,
            controls: Vec::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    /// Find a control by OID
    pub fn control(&self, oid: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.oid == oid)
    }

    fn content_len(&self) -> usize {
        let mut length = integer_len(self.message_id as i64) + self.op.compute_length();
        if !self.controls.is_empty() {
            length += tlv_len(content_len(&self.controls));
        }
        length
    }
}

impl Encodable for LdapMessage {
    fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.put_header(universal::SEQUENCE, self.content_len())?;
        encoder.encode_integer(self.message_id as i64)?;
        self.op.encode(encoder)?;
        if !self.controls.is_empty() {
            encoder.put_header(CONTROLS_TAG, content_len(&self.controls))?;
            for control in &self.controls {
                control.encode(encoder)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_value;
    use ldap_core::ResultCode;

    #[test]
    fn test_del_request() {
        let message = LdapMessage::new(5, ProtocolOp::DelRequest(Dn::parse("cn=a").unwrap()));
        let bytes = encode_value(&message).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x30, 0x09, 0x02, 0x01, 0x05, 0x4A, 0x04, b'c', b'n', b'=', b'a']
        );
    }

    #[test]
    fn test_response_encoding() {
        let message = LdapMessage::new(2, ProtocolOp::AddResponse(OperationResult::success()));
        let bytes = encode_value(&message).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x30, 0x0C, 0x02, 0x01, 0x02, 0x69, 0x07, 0x0A, 0x01, 0x00, 0x04, 0x00, 0x04, 0x00]
        );
    }

    #[test]
    fn test_controls_appended() {
        let message = LdapMessage::new(1, ProtocolOp::UnbindRequest).with_control(Control::subentries(true));
        let bytes = encode_value(&message).unwrap();
        assert_eq!(bytes.len(), message.compute_length());
        assert_eq!(bytes[7], CONTROLS_TAG);
        assert!(message.control(crate::controls::subentries::OID).is_some());
    }

    #[test]
    fn test_result_accessors() {
        let mut op = ProtocolOp::BindResponse(BindResponse::new(OperationResult::success()));
        if let Some(result) = op.result_mut() {
            result.result_code = ResultCode::InvalidCredentials;
        }
        assert_eq!(op.result().map(|r| r.result_code), Some(ResultCode::InvalidCredentials));
        assert!(ProtocolOp::UnbindRequest.result().is_none());
        assert_eq!(
            ProtocolOp::DelRequest(Dn::root()).response_type(),
            Some(ResponseType::DelResponse)
        );
        assert_eq!(ProtocolOp::AbandonRequest(1).response_type(), None);
    }
}
