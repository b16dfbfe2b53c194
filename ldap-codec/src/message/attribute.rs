//! Attributes carried by add requests, modify requests and search entries

use crate::encoder::{encode_octet_strings, octet_strings_len, Encodable};
use crate::error::LdapResult;
use ldap_asn1::ber::encoder::octet_string_len;
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;

/// ```text
/// PartialAttribute ::= SEQUENCE {
///      type       AttributeDescription,
///      vals       SET OF value AttributeValue }
/// ```
///
/// Also used for `Attribute`, which only differs by requiring at least one
/// value; that constraint is checked by the decoder where it applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub description: String,
    pub values: Vec<Vec<u8>>,
}

impl Attribute {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            values: Vec::new(),
        }
    }

    /// Add a value, builder style
    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.values.push(value.into());
        self
    }

    fn content_len(&self) -> usize {
        octet_string_len(self.description.as_bytes()) + tlv_len(octet_strings_len(&self.values))
    }
}

impl Encodable for Attribute {
    fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.put_header(universal::SEQUENCE, self.content_len())?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.description.as_bytes())?;
        encoder.put_header(universal::SET, octet_strings_len(&self.values))?;
        encode_octet_strings(encoder, &self.values)
    }
}
