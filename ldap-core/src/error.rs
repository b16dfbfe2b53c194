use thiserror::Error;

use crate::response::ErrorResponse;
use crate::result_code::ResultCode;

/// Main error type for LDAP codec operations
///
/// Decode failures fall into two groups: plain errors, after which the
/// connection is usually dropped, and [`LdapError::ResponseCarrying`], which
/// bundles a ready-to-send negative response so the peer can be told what
/// went wrong while the connection stays open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LdapError {
    #[error("Malformed length: {0}")]
    MalformedLength(String),

    #[error("Unexpected tag 0x{tag:02X} in state {state}")]
    UnexpectedTag { state: String, tag: u8 },

    #[error("Incomplete message: {0}")]
    IncompleteMessage(String),

    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),

    #[error("Invalid field value: {message}")]
    ResponseCarrying {
        message: String,
        response: Box<ErrorResponse>,
    },

    #[error("Encode buffer too small: need {needed} bytes, {available} available")]
    EncodeBufferTooSmall { needed: usize, available: usize },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("ASN.1 encoding error: {0}")]
    Encoding(String),

    #[error("Stream closed: {0}")]
    StreamClosed(String),
}

impl LdapError {
    /// Build a response-carrying error from a message and a negative response
    pub fn with_response(message: impl Into<String>, response: ErrorResponse) -> Self {
        LdapError::ResponseCarrying {
            message: message.into(),
            response: Box::new(response),
        }
    }

    /// Get the negative response bundled with this error, if any
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            LdapError::ResponseCarrying { response, .. } => Some(response.as_ref()),
            _ => None,
        }
    }

    /// Result code of the bundled response, if any
    pub fn result_code(&self) -> Option<ResultCode> {
        self.response().map(|r| r.result_code)
    }

    /// Check whether this error leaves the byte stream unusable
    ///
    /// Length errors corrupt the bookkeeping needed to find the start of the
    /// next message, so the stream cannot be resynchronised after them.
    pub fn is_fatal_to_stream(&self) -> bool {
        matches!(
            self,
            LdapError::MalformedLength(_) | LdapError::StreamClosed(_)
        )
    }
}

/// Result type alias for LDAP codec operations
pub type LdapResult<T> = Result<T, LdapError>;
