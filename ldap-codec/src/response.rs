//! Negative responses
//!
//! A server answers a request it cannot decode or process with the
//! response operation matching the request, carrying a non-success result
//! code. Requests without a response (unbind, abandon) get none.

use crate::error::LdapError;
use crate::message::{BindResponse, ExtendedResponse, LdapMessage, OperationResult, ProtocolOp};
use ldap_core::{ErrorResponse, ResponseType, ResultCode};

/// Build the response message described by an [`ErrorResponse`]
pub fn response_message(response: &ErrorResponse) -> LdapMessage {
    let result = OperationResult::new(response.result_code)
        .with_matched_dn(response.matched_dn.clone())
        .with_diagnostic_message(response.diagnostic_message.clone());

    let op = match response.response_type {
        ResponseType::BindResponse => ProtocolOp::BindResponse(BindResponse::new(result)),
        ResponseType::SearchResultDone => ProtocolOp::SearchResultDone(result),
        ResponseType::ModifyResponse => ProtocolOp::ModifyResponse(result),
        ResponseType::AddResponse => ProtocolOp::AddResponse(result),
        ResponseType::DelResponse => ProtocolOp::DelResponse(result),
        ResponseType::ModifyDnResponse => ProtocolOp::ModifyDnResponse(result),
        ResponseType::CompareResponse => ProtocolOp::CompareResponse(result),
        ResponseType::ExtendedResponse => ProtocolOp::ExtendedResponse(ExtendedResponse::new(result)),
    };
    LdapMessage::new(response.message_id, op)
}

/// Negative response to a decoded request
///
/// # Returns
/// `None` if `request` is not a request that expects a response.
pub fn negative_response(
    request: &LdapMessage,
    result_code: ResultCode,
    diagnostic_message: impl Into<String>,
) -> Option<LdapMessage> {
    let response_type = request.op.response_type()?;
    let response = ErrorResponse::new(
        request.message_id,
        response_type,
        result_code,
        diagnostic_message,
    );
    Some(response_message(&response))
}

/// Response a decode error asks the server to send, if any
pub fn error_response(err: &LdapError) -> Option<LdapMessage> {
    let response = err.response()?;
    log::debug!(
        "answering message {} with {} ({})",
        response.message_id,
        response.response_type,
        response.result_code
    );
    Some(response_message(response))
}
