//! Message controls
//!
//! ```text
//! Control ::= SEQUENCE {
//!      controlType             LDAPOID,
//!      criticality             BOOLEAN DEFAULT FALSE,
//!      controlValue            OCTET STRING OPTIONAL }
//! ```
//!
//! Values of the controls listed below are decoded into typed form; any
//! other control keeps its value as opaque bytes.
//!
//! | Control | OID |
//! |---------|-----|
//! | Paged results | `1.2.840.113556.1.4.319` |
//! | Subentries | `1.3.6.1.4.1.4203.1.10.1` |
//! | ManageDsaIT | `2.16.840.1.113730.3.4.2` (no value) |

pub mod paged_results;
pub mod subentries;

pub use paged_results::PagedResults;

use crate::encoder::Encodable;
use crate::error::{LdapError, LdapResult};
use ldap_asn1::ber::encoder::{octet_string_len, BOOLEAN_LEN};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;

/// ManageDsaIT control OID (RFC 3296)
pub const MANAGE_DSA_IT_OID: &str = "2.16.840.1.113730.3.4.2";

/// Context tag of the controls list in an `LDAPMessage`
pub const CONTROLS_TAG: u8 = 0xA0;

/// Decoded control value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    PagedResults(PagedResults),
    Subentries(bool),
    /// Value of a control without a registered grammar
    Opaque(Vec<u8>),
}

impl ControlValue {
    /// Decode the value of the control named by `oid`
    ///
    /// # Error Handling
    /// - Errors from the control's value grammar
    /// - `LdapError::InvalidFieldValue` for a value on a control that takes none
    pub fn decode(oid: &str, value: &[u8]) -> LdapResult<Self> {
        match oid {
            paged_results::OID => PagedResults::decode(value).map(ControlValue::PagedResults),
            subentries::OID => subentries::decode(value).map(ControlValue::Subentries),
            MANAGE_DSA_IT_OID => Err(LdapError::InvalidFieldValue(
                "ManageDsaIT control must not have a value".to_string(),
            )),
            _ => Ok(ControlValue::Opaque(value.to_vec())),
        }
    }

    /// Size of the encoded value, without the enclosing OCTET STRING header
    fn value_len(&self) -> usize {
        match self {
            ControlValue::PagedResults(paged) => paged.compute_length(),
            ControlValue::Subentries(_) => BOOLEAN_LEN,
            ControlValue::Opaque(bytes) => bytes.len(),
        }
    }

    fn encode_value(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        match self {
            ControlValue::PagedResults(paged) => paged.encode(encoder),
            ControlValue::Subentries(visibility) => encoder.encode_boolean(universal::BOOLEAN, *visibility),
            ControlValue::Opaque(bytes) => encoder.put_bytes(bytes),
        }
    }
}

/// A control attached to a request or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub oid: String,
    pub criticality: bool,
    pub value: Option<ControlValue>,
}

impl Control {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            criticality: false,
            value: None,
        }
    }

    pub fn paged_results(size: i32, cookie: impl Into<Vec<u8>>) -> Self {
        Self::new(paged_results::OID).with_value(ControlValue::PagedResults(PagedResults::new(size, cookie)))
    }

    pub fn subentries(visibility: bool) -> Self {
        Self::new(subentries::OID).with_value(ControlValue::Subentries(visibility))
    }

    pub fn manage_dsa_it() -> Self {
        Self::new(MANAGE_DSA_IT_OID)
    }

    pub fn with_criticality(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn with_value(mut self, value: ControlValue) -> Self {
        self.value = Some(value);
        self
    }

    fn content_len(&self) -> usize {
        let mut length = octet_string_len(self.oid.as_bytes());
        if self.criticality {
            length += BOOLEAN_LEN;
        }
        if let Some(value) = &self.value {
            length += tlv_len(value.value_len());
        }
        length
    }
}

impl Encodable for Control {
    fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.put_header(universal::SEQUENCE, self.content_len())?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.oid.as_bytes())?;
        if self.criticality {
            encoder.encode_boolean(universal::BOOLEAN, true)?;
        }
        if let Some(value) = &self.value {
            encoder.put_header(universal::OCTET_STRING, value.value_len())?;
            value.encode_value(encoder)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_value;

    #[test]
    fn test_default_criticality_omitted() {
        let bytes = encode_value(&Control::manage_dsa_it()).unwrap();
        assert_eq!(bytes.len(), 2 + 2 + MANAGE_DSA_IT_OID.len());
        assert_eq!(bytes[2], 0x04);

        let critical = encode_value(&Control::manage_dsa_it().with_criticality(true)).unwrap();
        assert_eq!(&critical[critical.len() - 3..], &[0x01, 0x01, 0xFF]);
    }

    #[test]
    fn test_encode_subentries() {
        let bytes = encode_value(&Control::subentries(true)).unwrap();
        assert_eq!(&bytes[bytes.len() - 5..], &[0x04, 0x03, 0x01, 0x01, 0xFF]);
    }

    #[test]
    fn test_decode_values() {
        assert_eq!(
            ControlValue::decode(subentries::OID, &[0x01, 0x01, 0x00]).unwrap(),
            ControlValue::Subentries(false)
        );
        assert_eq!(
            ControlValue::decode("1.2.3", &[0xDE, 0xAD]).unwrap(),
            ControlValue::Opaque(vec![0xDE, 0xAD])
        );
        assert!(ControlValue::decode(MANAGE_DSA_IT_OID, &[]).is_err());
    }
}
