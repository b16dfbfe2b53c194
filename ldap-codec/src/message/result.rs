//! `LDAPResult` components shared by every response

use crate::encoder::{encode_octet_strings, octet_strings_len};
use crate::error::LdapResult;
use ldap_asn1::ber::encoder::{integer_len, octet_string_len};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use ldap_core::ResultCode;

/// Context tag of the optional referral list
pub const REFERRAL_TAG: u8 = 0xA3;

/// ```text
/// LDAPResult ::= SEQUENCE {
///      resultCode         ENUMERATED,
///      matchedDN          LDAPDN,
///      diagnosticMessage  LDAPString,
///      referral           [3] Referral OPTIONAL }
/// ```
///
/// The components are encoded inline in the response operation, never as a
/// SEQUENCE of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    /// Referral URIs, empty when absent
    pub referral: Vec<String>,
}

impl OperationResult {
    pub fn new(result_code: ResultCode) -> Self {
        Self {
            result_code,
            ..Self::default()
        }
    }

    pub fn success() -> Self {
        Self::new(ResultCode::Success)
    }

    pub fn with_matched_dn(mut self, matched_dn: impl Into<String>) -> Self {
        self.matched_dn = matched_dn.into();
        self
    }

    pub fn with_diagnostic_message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic_message = message.into();
        self
    }

    pub fn with_referral(mut self, referral: Vec<String>) -> Self {
        self.referral = referral;
        self
    }

    /// Size of the components, without any enclosing header
    pub fn components_len(&self) -> usize {
        let mut length = integer_len(self.result_code.value() as i64)
            + octet_string_len(self.matched_dn.as_bytes())
            + octet_string_len(self.diagnostic_message.as_bytes());
        if !self.referral.is_empty() {
            length += tlv_len(octet_strings_len(&self.referral));
        }
        length
    }

    pub fn encode_components(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_enumerated(self.result_code.value() as i64)?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.matched_dn.as_bytes())?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.diagnostic_message.as_bytes())?;
        if !self.referral.is_empty() {
            encoder.put_header(REFERRAL_TAG, octet_strings_len(&self.referral))?;
            encode_octet_strings(encoder, &self.referral)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let result = OperationResult::new(ResultCode::NoSuchObject)
            .with_matched_dn("ou=system")
            .with_diagnostic_message("missing");
        assert_eq!(result.components_len(), 3 + 11 + 9);

        let mut encoder = BerEncoder::with_capacity(result.components_len());
        result.encode_components(&mut encoder).unwrap();
        assert_eq!(&encoder.as_bytes()[..5], &[0x0A, 0x01, 0x20, 0x04, 0x09]);
        assert_eq!(encoder.remaining(), 0);
    }

    #[test]
    fn test_referral() {
        let result = OperationResult::new(ResultCode::Referral)
            .with_referral(vec!["ldap://a/".to_string()]);
        let mut encoder = BerEncoder::with_capacity(result.components_len());
        result.encode_components(&mut encoder).unwrap();
        let bytes = encoder.as_bytes();
        assert_eq!(&bytes[7..11], &[0xA3, 0x0B, 0x04, 0x09]);
    }
}
