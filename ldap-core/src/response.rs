//! Negative responses bundled with decode errors

use crate::result_code::ResultCode;
use std::fmt;

/// Response operation a rejected request is answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    BindResponse,
    SearchResultDone,
    ModifyResponse,
    AddResponse,
    DelResponse,
    ModifyDnResponse,
    CompareResponse,
    ExtendedResponse,
}

impl ResponseType {
    /// Application tag byte of the response operation (constructed form)
    pub fn tag(&self) -> u8 {
        match self {
            ResponseType::BindResponse => 0x61,
            ResponseType::SearchResultDone => 0x65,
            ResponseType::ModifyResponse => 0x67,
            ResponseType::AddResponse => 0x69,
            ResponseType::DelResponse => 0x6B,
            ResponseType::ModifyDnResponse => 0x6D,
            ResponseType::CompareResponse => 0x6F,
            ResponseType::ExtendedResponse => 0x78,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseType::BindResponse => "BindResponse",
            ResponseType::SearchResultDone => "SearchResultDone",
            ResponseType::ModifyResponse => "ModifyResponse",
            ResponseType::AddResponse => "AddResponse",
            ResponseType::DelResponse => "DelResponse",
            ResponseType::ModifyDnResponse => "ModifyDnResponse",
            ResponseType::CompareResponse => "CompareResponse",
            ResponseType::ExtendedResponse => "ExtendedResponse",
        };
        f.write_str(name)
    }
}

/// Minimal negative response for a request that failed to decode
///
/// Carries everything needed to build the `LDAPMessage` the server sends
/// back: the id of the offending request, which response operation answers
/// it, and the `LDAPResult` fields. The matched DN is always empty because
/// the request never reached the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message_id: i32,
    pub response_type: ResponseType,
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
}

impl ErrorResponse {
    /// Create a new negative response with an empty matched DN
    pub fn new(
        message_id: i32,
        response_type: ResponseType,
        result_code: ResultCode,
        diagnostic_message: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            response_type,
            result_code,
            matched_dn: String::new(),
            diagnostic_message: diagnostic_message.into(),
        }
    }
}
