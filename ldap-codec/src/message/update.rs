//! Update operations: modify, add and modify DN
//!
//! Delete requests carry nothing but the entry name and are represented
//! directly by a [`Dn`] in [`crate::message::ProtocolOp::DelRequest`].

use crate::encoder::{content_len, Encodable};
use crate::error::{LdapError, LdapResult};
use crate::message::attribute::Attribute;
use ldap_asn1::ber::encoder::{integer_len, octet_string_len, BOOLEAN_LEN};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use ldap_core::{Dn, Rdn};

/// Context tag of `newSuperior`
pub const NEW_SUPERIOR_TAG: u8 = 0x80;

/// Modification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifyOperation {
    Add = 0,
    Delete = 1,
    Replace = 2,
    /// RFC 4525
    Increment = 3,
}

impl ModifyOperation {
    pub fn from_value(value: i64) -> LdapResult<Self> {
        match value {
            0 => Ok(ModifyOperation::Add),
            1 => Ok(ModifyOperation::Delete),
            2 => Ok(ModifyOperation::Replace),
            3 => Ok(ModifyOperation::Increment),
            _ => Err(LdapError::InvalidFieldValue(format!(
                "Invalid modify operation: {}",
                value
            ))),
        }
    }
}

/// One element of `changes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub operation: ModifyOperation,
    pub modification: Attribute,
}

impl Change {
    pub fn new(operation: ModifyOperation, modification: Attribute) -> Self {
        Self {
            operation,
            modification,
        }
    }

    fn content_len(&self) -> usize {
        integer_len(self.operation as i64) + self.modification.compute_length()
    }
}

impl Encodable for Change {
    fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.put_header(universal::SEQUENCE, self.content_len())?;
        encoder.encode_enumerated(self.operation as i64)?;
        self.modification.encode(encoder)
    }
}

/// ```text
/// ModifyRequest ::= [APPLICATION 6] SEQUENCE {
///      object          LDAPDN,
///      changes         SEQUENCE OF change SEQUENCE {
///           operation       ENUMERATED,
///           modification    PartialAttribute } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyRequest {
    pub object: Dn,
    pub changes: Vec<Change>,
}

impl ModifyRequest {
    pub fn new(object: Dn) -> Self {
        Self {
            object,
            changes: Vec::new(),
        }
    }

    pub fn with_change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.object.as_bytes()) + tlv_len(content_len(&self.changes))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.object.as_bytes())?;
        encoder.put_header(universal::SEQUENCE, content_len(&self.changes))?;
        for change in &self.changes {
            change.encode(encoder)?;
        }
        Ok(())
    }
}

/// ```text
/// AddRequest ::= [APPLICATION 8] SEQUENCE {
///      entry           LDAPDN,
///      attributes      AttributeList }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRequest {
    pub entry: Dn,
    pub attributes: Vec<Attribute>,
}

impl AddRequest {
    pub fn new(entry: Dn) -> Self {
        Self {
            entry,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.entry.as_bytes()) + tlv_len(content_len(&self.attributes))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.entry.as_bytes())?;
        encoder.put_header(universal::SEQUENCE, content_len(&self.attributes))?;
        for attribute in &self.attributes {
            attribute.encode(encoder)?;
        }
        Ok(())
    }
}

/// ```text
/// ModifyDNRequest ::= [APPLICATION 12] SEQUENCE {
///      entry           LDAPDN,
///      newrdn          RelativeLDAPDN,
///      deleteoldrdn    BOOLEAN,
///      newSuperior     [0] LDAPDN OPTIONAL }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDnRequest {
    pub entry: Dn,
    pub new_rdn: Rdn,
    pub delete_old_rdn: bool,
    pub new_superior: Option<Dn>,
}

impl ModifyDnRequest {
    pub fn new(entry: Dn, new_rdn: Rdn, delete_old_rdn: bool) -> Self {
        Self {
            entry,
            new_rdn,
            delete_old_rdn,
            new_superior: None,
        }
    }

    pub fn with_new_superior(mut self, new_superior: Dn) -> Self {
        self.new_superior = Some(new_superior);
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.entry.as_bytes())
            + octet_string_len(self.new_rdn.as_str().as_bytes())
            + BOOLEAN_LEN
            + self
                .new_superior
                .as_ref()
                .map_or(0, |dn| octet_string_len(dn.as_bytes()))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.entry.as_bytes())?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.new_rdn.as_str().as_bytes())?;
        encoder.encode_boolean(universal::BOOLEAN, self.delete_old_rdn)?;
        if let Some(new_superior) = &self.new_superior {
            encoder.encode_octet_string(NEW_SUPERIOR_TAG, new_superior.as_bytes())?;
        }
        Ok(())
    }
}

/// ```text
/// CompareRequest ::= [APPLICATION 14] SEQUENCE {
///      entry           LDAPDN,
///      ava             AttributeValueAssertion }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareRequest {
    pub entry: Dn,
    pub attribute_desc: String,
    pub assertion_value: Vec<u8>,
}

impl CompareRequest {
    pub fn new(entry: Dn, attribute_desc: impl Into<String>, assertion_value: impl Into<Vec<u8>>) -> Self {
        Self {
            entry,
            attribute_desc: attribute_desc.into(),
            assertion_value: assertion_value.into(),
        }
    }

    fn ava_len(&self) -> usize {
        octet_string_len(self.attribute_desc.as_bytes()) + octet_string_len(&self.assertion_value)
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.entry.as_bytes()) + tlv_len(self.ava_len())
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.entry.as_bytes())?;
        encoder.put_header(universal::SEQUENCE, self.ava_len())?;
        encoder.encode_octet_string(universal::OCTET_STRING, self.attribute_desc.as_bytes())?;
        encoder.encode_octet_string(universal::OCTET_STRING, &self.assertion_value)
    }
}
