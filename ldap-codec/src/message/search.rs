//! Search operation: request, entries, references

use crate::encoder::{content_len, encode_octet_strings, octet_strings_len, Encodable};
use crate::error::{LdapError, LdapResult};
use crate::filter::Filter;
use crate::message::attribute::Attribute;
use ldap_asn1::ber::encoder::{integer_len, octet_string_len, BOOLEAN_LEN};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use ldap_core::Dn;

/// Search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    BaseObject = 0,
    SingleLevel = 1,
    #[default]
    WholeSubtree = 2,
}

impl SearchScope {
    pub fn from_value(value: i64) -> LdapResult<Self> {
        match value {
            0 => Ok(SearchScope::BaseObject),
            1 => Ok(SearchScope::SingleLevel),
            2 => Ok(SearchScope::WholeSubtree),
            _ => Err(LdapError::InvalidFieldValue(format!(
                "Invalid search scope: {}",
                value
            ))),
        }
    }
}

/// Alias dereferencing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DerefAliases {
    NeverDerefAliases = 0,
    DerefInSearching = 1,
    DerefFindingBaseObj = 2,
    #[default]
    DerefAlways = 3,
}

impl DerefAliases {
    pub fn from_value(value: i64) -> LdapResult<Self> {
        match value {
            0 => Ok(DerefAliases::NeverDerefAliases),
            1 => Ok(DerefAliases::DerefInSearching),
            2 => Ok(DerefAliases::DerefFindingBaseObj),
            3 => Ok(DerefAliases::DerefAlways),
            _ => Err(LdapError::InvalidFieldValue(format!(
                "Invalid alias dereferencing value: {}",
                value
            ))),
        }
    }
}

/// ```text
/// SearchRequest ::= [APPLICATION 3] SEQUENCE {
///      baseObject      LDAPDN,
///      scope           ENUMERATED,
///      derefAliases    ENUMERATED,
///      sizeLimit       INTEGER (0 ..  maxInt),
///      timeLimit       INTEGER (0 ..  maxInt),
///      typesOnly       BOOLEAN,
///      filter          Filter,
///      attributes      AttributeSelection }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: Dn,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    pub size_limit: i32,
    pub time_limit: i32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(Dn::root(), Filter::present("objectClass"))
    }
}

impl SearchRequest {
    /// Subtree search without limits returning all user attributes
    pub fn new(base: Dn, filter: Filter) -> Self {
        Self {
            base,
            scope: SearchScope::default(),
            deref_aliases: DerefAliases::default(),
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter,
            attributes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.base.as_bytes())
            + integer_len(self.scope as i64)
            + integer_len(self.deref_aliases as i64)
            + integer_len(self.size_limit as i64)
            + integer_len(self.time_limit as i64)
            + BOOLEAN_LEN
            + self.filter.compute_length()
            + tlv_len(octet_strings_len(&self.attributes))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.base.as_bytes())?;
        encoder.encode_enumerated(self.scope as i64)?;
        encoder.encode_enumerated(self.deref_aliases as i64)?;
        encoder.encode_integer(self.size_limit as i64)?;
        encoder.encode_integer(self.time_limit as i64)?;
        encoder.encode_boolean(universal::BOOLEAN, self.types_only)?;
        self.filter.encode(encoder)?;
        encoder.put_header(universal::SEQUENCE, octet_strings_len(&self.attributes))?;
        encode_octet_strings(encoder, &self.attributes)
    }
}

/// ```text
/// SearchResultEntry ::= [APPLICATION 4] SEQUENCE {
///      objectName      LDAPDN,
///      attributes      PartialAttributeList }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub object_name: Dn,
    pub attributes: Vec<Attribute>,
}

impl SearchResultEntry {
    pub fn new(object_name: Dn) -> Self {
        Self {
            object_name,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub(crate) fn content_len(&self) -> usize {
        octet_string_len(self.object_name.as_bytes()) + tlv_len(content_len(&self.attributes))
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.object_name.as_bytes())?;
        encoder.put_header(universal::SEQUENCE, content_len(&self.attributes))?;
        for attribute in &self.attributes {
            attribute.encode(encoder)?;
        }
        Ok(())
    }
}

/// `SearchResultReference ::= [APPLICATION 19] SEQUENCE SIZE (1..MAX) OF uri URI`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResultReference {
    pub uris: Vec<String>,
}

impl SearchResultReference {
    pub(crate) fn content_len(&self) -> usize {
        octet_strings_len(&self.uris)
    }

    pub(crate) fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        if self.uris.is_empty() {
            return Err(LdapError::Encoding(
                "A search result reference needs at least one URI".to_string(),
            ));
        }
        encode_octet_strings(encoder, &self.uris)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerations() {
        assert_eq!(SearchScope::from_value(1).unwrap(), SearchScope::SingleLevel);
        assert!(SearchScope::from_value(3).is_err());
        assert_eq!(DerefAliases::from_value(0).unwrap(), DerefAliases::NeverDerefAliases);
        assert!(DerefAliases::from_value(4).is_err());
    }

    #[test]
    fn test_search_request_length() {
        let request = SearchRequest::new(Dn::root(), Filter::present("cn"))
            .with_scope(SearchScope::BaseObject)
            .with_attributes(vec!["*".to_string()]);
        // base 2, scope 3, deref 3, limits 3 + 3, typesOnly 3, filter 4, attributes 5
        assert_eq!(request.content_len(), 26);
    }
}
