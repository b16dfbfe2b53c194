//! Search filter expression tree
//!
//! ```text
//! Filter ::= CHOICE {
//!      and             [0] SET SIZE (1..MAX) OF filter Filter,
//!      or              [1] SET SIZE (1..MAX) OF filter Filter,
//!      not             [2] Filter,
//!      equalityMatch   [3] AttributeValueAssertion,
//!      substrings      [4] SubstringFilter,
//!      greaterOrEqual  [5] AttributeValueAssertion,
//!      lessOrEqual     [6] AttributeValueAssertion,
//!      present         [7] AttributeDescription,
//!      approxMatch     [8] AttributeValueAssertion,
//!      extensibleMatch [9] MatchingRuleAssertion,
//!      ...  }
//! ```
//!
//! # Two-Pass Encoding
//!
//! [`Filter::compute_length`] stores the encoded size of every node it
//! visits; [`Filter::encode`] then writes headers from those cached sizes
//! without recomputing them. Any change to a node goes through `&mut self`
//! and drops that node's cached size, so a stale length can never be used.
//!
//! # Connector Arity
//!
//! `and` and `or` keep their children in insertion order. `not` holds
//! exactly one child: adding a second is an error raised immediately.
//! Empty `and`/`or` sets are accepted (RFC 4526 absolute true/false).

use crate::encoder::Encodable;
use crate::error::{LdapError, LdapResult};
use ldap_asn1::ber::encoder::{octet_string_len, BOOLEAN_LEN};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::BerEncoder;
use std::cell::Cell;
use std::fmt;

/// Filter choice tags
pub mod tag {
    pub const AND: u8 = 0xA0;
    pub const OR: u8 = 0xA1;
    pub const NOT: u8 = 0xA2;
    pub const EQUALITY_MATCH: u8 = 0xA3;
    pub const SUBSTRINGS: u8 = 0xA4;
    pub const GREATER_OR_EQUAL: u8 = 0xA5;
    pub const LESS_OR_EQUAL: u8 = 0xA6;
    pub const PRESENT: u8 = 0x87;
    pub const APPROX_MATCH: u8 = 0xA8;
    pub const EXTENSIBLE_MATCH: u8 = 0xA9;

    /// Every tag a filter can start with
    pub const ALL: [u8; 10] = [
        AND,
        OR,
        NOT,
        EQUALITY_MATCH,
        SUBSTRINGS,
        GREATER_OR_EQUAL,
        LESS_OR_EQUAL,
        PRESENT,
        APPROX_MATCH,
        EXTENSIBLE_MATCH,
    ];

    pub const SUBSTRING_INITIAL: u8 = 0x80;
    pub const SUBSTRING_ANY: u8 = 0x81;
    pub const SUBSTRING_FINAL: u8 = 0x82;

    pub const MATCHING_RULE: u8 = 0x81;
    pub const MATCHING_TYPE: u8 = 0x82;
    pub const MATCH_VALUE: u8 = 0x83;
    pub const DN_ATTRIBUTES: u8 = 0x84;
}

/// Content size of a node, set by the length pass
///
/// Equality ignores the cache so that a decoded filter compares equal to
/// the filter it was encoded from.
#[derive(Debug, Clone, Default)]
struct LengthCache(Cell<Option<usize>>);

impl LengthCache {
    fn get(&self) -> Option<usize> {
        self.0.get()
    }

    fn set(&self, length: usize) {
        self.0.set(Some(length));
    }

    fn clear(&self) {
        self.0.set(None);
    }
}

impl PartialEq for LengthCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for LengthCache {}

/// ```text
/// AttributeValueAssertion ::= SEQUENCE {
///      attributeDesc   AttributeDescription,
///      assertionValue  AssertionValue }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeValueAssertion {
    pub attribute_desc: String,
    pub assertion_value: Vec<u8>,
}

impl AttributeValueAssertion {
    pub fn new(attribute_desc: impl Into<String>, assertion_value: impl Into<Vec<u8>>) -> Self {
        Self {
            attribute_desc: attribute_desc.into(),
            assertion_value: assertion_value.into(),
        }
    }

    fn content_len(&self) -> usize {
        octet_string_len(self.attribute_desc.as_bytes()) + octet_string_len(&self.assertion_value)
    }

    fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.attribute_desc.as_bytes())?;
        encoder.encode_octet_string(universal::OCTET_STRING, &self.assertion_value)
    }
}

/// ```text
/// SubstringFilter ::= SEQUENCE {
///      type           AttributeDescription,
///      substrings     SEQUENCE SIZE (1..MAX) OF substring CHOICE {
///           initial [0] AssertionValue,  -- can occur at most once
///           any     [1] AssertionValue,
///           final   [2] AssertionValue } -- can occur at most once
///      }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringFilter {
    pub attribute_type: String,
    pub initial: Option<Vec<u8>>,
    pub any: Vec<Vec<u8>>,
    pub final_value: Option<Vec<u8>>,
}

impl SubstringFilter {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            ..Self::default()
        }
    }

    pub fn with_initial(mut self, initial: impl Into<Vec<u8>>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub fn with_any(mut self, any: impl Into<Vec<u8>>) -> Self {
        self.any.push(any.into());
        self
    }

    pub fn with_final(mut self, final_value: impl Into<Vec<u8>>) -> Self {
        self.final_value = Some(final_value.into());
        self
    }

    /// Check whether the filter has at least one substring
    pub fn has_substrings(&self) -> bool {
        self.initial.is_some() || !self.any.is_empty() || self.final_value.is_some()
    }

    fn substrings_len(&self) -> usize {
        self.initial.iter().map(|v| tlv_len(v.len())).sum::<usize>()
            + self.any.iter().map(|v| tlv_len(v.len())).sum::<usize>()
            + self.final_value.iter().map(|v| tlv_len(v.len())).sum::<usize>()
    }

    fn content_len(&self) -> usize {
        octet_string_len(self.attribute_type.as_bytes()) + tlv_len(self.substrings_len())
    }

    fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.encode_octet_string(universal::OCTET_STRING, self.attribute_type.as_bytes())?;
        encoder.put_header(universal::SEQUENCE, self.substrings_len())?;
        if let Some(initial) = &self.initial {
            encoder.encode_octet_string(tag::SUBSTRING_INITIAL, initial)?;
        }
        for any in &self.any {
            encoder.encode_octet_string(tag::SUBSTRING_ANY, any)?;
        }
        if let Some(final_value) = &self.final_value {
            encoder.encode_octet_string(tag::SUBSTRING_FINAL, final_value)?;
        }
        Ok(())
    }
}

/// ```text
/// MatchingRuleAssertion ::= SEQUENCE {
///      matchingRule    [1] MatchingRuleId OPTIONAL,
///      type            [2] AttributeDescription OPTIONAL,
///      matchValue      [3] AssertionValue,
///      dnAttributes    [4] BOOLEAN DEFAULT FALSE }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchingRuleAssertion {
    pub matching_rule: Option<String>,
    pub attribute_type: Option<String>,
    pub match_value: Vec<u8>,
    pub dn_attributes: bool,
}

impl MatchingRuleAssertion {
    fn content_len(&self) -> usize {
        self.matching_rule
            .as_ref()
            .map_or(0, |r| octet_string_len(r.as_bytes()))
            + self
                .attribute_type
                .as_ref()
                .map_or(0, |t| octet_string_len(t.as_bytes()))
            + octet_string_len(&self.match_value)
            + if self.dn_attributes { BOOLEAN_LEN } else { 0 }
    }

    fn encode_content(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        if let Some(rule) = &self.matching_rule {
            encoder.encode_octet_string(tag::MATCHING_RULE, rule.as_bytes())?;
        }
        if let Some(attribute_type) = &self.attribute_type {
            encoder.encode_octet_string(tag::MATCHING_TYPE, attribute_type.as_bytes())?;
        }
        encoder.encode_octet_string(tag::MATCH_VALUE, &self.match_value)?;
        if self.dn_attributes {
            encoder.encode_boolean(tag::DN_ATTRIBUTES, true)?;
        }
        Ok(())
    }
}

/// The variant of a filter node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// `None` only while a decoded `not` is waiting for its child
    Not(Option<Box<Filter>>),
    EqualityMatch(AttributeValueAssertion),
    Substrings(SubstringFilter),
    GreaterOrEqual(AttributeValueAssertion),
    LessOrEqual(AttributeValueAssertion),
    Present(String),
    ApproxMatch(AttributeValueAssertion),
    ExtensibleMatch(MatchingRuleAssertion),
}

/// A node of a search filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    kind: FilterKind,
    length: LengthCache,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            length: LengthCache::default(),
        }
    }

    pub fn and(children: Vec<Filter>) -> Self {
        Self::new(FilterKind::And(children))
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Self::new(FilterKind::Or(children))
    }

    pub fn not(child: Filter) -> Self {
        Self::new(FilterKind::Not(Some(Box::new(child))))
    }

    pub fn equality(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(FilterKind::EqualityMatch(AttributeValueAssertion::new(attribute, value)))
    }

    pub fn greater_or_equal(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(FilterKind::GreaterOrEqual(AttributeValueAssertion::new(attribute, value)))
    }

    pub fn less_or_equal(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(FilterKind::LessOrEqual(AttributeValueAssertion::new(attribute, value)))
    }

    pub fn approx(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(FilterKind::ApproxMatch(AttributeValueAssertion::new(attribute, value)))
    }

    pub fn present(attribute: impl Into<String>) -> Self {
        Self::new(FilterKind::Present(attribute.into()))
    }

    pub fn substrings(filter: SubstringFilter) -> Self {
        Self::new(FilterKind::Substrings(filter))
    }

    pub fn extensible(assertion: MatchingRuleAssertion) -> Self {
        Self::new(FilterKind::ExtensibleMatch(assertion))
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Mutable access to the node; drops its cached length
    pub fn kind_mut(&mut self) -> &mut FilterKind {
        self.length.clear();
        &mut self.kind
    }

    pub fn into_kind(self) -> FilterKind {
        self.kind
    }

    /// Tag of the node's TLV
    pub fn tag(&self) -> u8 {
        match &self.kind {
            FilterKind::And(_) => tag::AND,
            FilterKind::Or(_) => tag::OR,
            FilterKind::Not(_) => tag::NOT,
            FilterKind::EqualityMatch(_) => tag::EQUALITY_MATCH,
            FilterKind::Substrings(_) => tag::SUBSTRINGS,
            FilterKind::GreaterOrEqual(_) => tag::GREATER_OR_EQUAL,
            FilterKind::LessOrEqual(_) => tag::LESS_OR_EQUAL,
            FilterKind::Present(_) => tag::PRESENT,
            FilterKind::ApproxMatch(_) => tag::APPROX_MATCH,
            FilterKind::ExtensibleMatch(_) => tag::EXTENSIBLE_MATCH,
        }
    }

    /// Check whether the node is `and`, `or` or `not`
    pub fn is_connector(&self) -> bool {
        matches!(
            self.kind,
            FilterKind::And(_) | FilterKind::Or(_) | FilterKind::Not(_)
        )
    }

    /// Children of a connector, in order; empty for leaves
    pub fn children(&self) -> &[Filter] {
        match &self.kind {
            FilterKind::And(children) | FilterKind::Or(children) => children,
            FilterKind::Not(Some(child)) => std::slice::from_ref(child.as_ref()),
            _ => &[],
        }
    }

    /// Append a child to a connector
    ///
    /// # Error Handling
    /// Returns `LdapError::InvalidFilter` when the node is a leaf, or a
    /// `not` that already has its child.
    pub fn add_child(&mut self, child: Filter) -> LdapResult<()> {
        match self.kind_mut() {
            FilterKind::And(children) | FilterKind::Or(children) => {
                children.push(child);
                Ok(())
            }
            FilterKind::Not(slot @ None) => {
                *slot = Some(Box::new(child));
                Ok(())
            }
            FilterKind::Not(Some(_)) => Err(LdapError::InvalidFilter(
                "A not filter accepts a single child".to_string(),
            )),
            _ => Err(LdapError::InvalidFilter(
                "Only and, or and not filters accept children".to_string(),
            )),
        }
    }

    /// Check the whole tree can be encoded
    ///
    /// # Error Handling
    /// Returns `LdapError::InvalidFilter` for a `not` without a child or a
    /// substring filter without any substring.
    pub fn validate(&self) -> LdapResult<()> {
        match &self.kind {
            FilterKind::Not(None) => Err(LdapError::InvalidFilter(
                "A not filter needs exactly one child".to_string(),
            )),
            FilterKind::Substrings(substrings) if !substrings.has_substrings() => {
                Err(LdapError::InvalidFilter(format!(
                    "Substring filter on '{}' has no substrings",
                    substrings.attribute_type
                )))
            }
            _ => self.children().iter().try_for_each(Filter::validate),
        }
    }

    /// Encoded size cached by the last length pass
    pub fn cached_length(&self) -> Option<usize> {
        self.length.get().map(tlv_len)
    }

    fn content_len(&self) -> usize {
        match &self.kind {
            FilterKind::And(children) | FilterKind::Or(children) => {
                children.iter().map(Filter::compute_length).sum()
            }
            FilterKind::Not(child) => child.as_ref().map_or(0, |c| c.compute_length()),
            FilterKind::EqualityMatch(ava)
            | FilterKind::GreaterOrEqual(ava)
            | FilterKind::LessOrEqual(ava)
            | FilterKind::ApproxMatch(ava) => ava.content_len(),
            FilterKind::Substrings(substrings) => substrings.content_len(),
            FilterKind::Present(attribute) => attribute.len(),
            FilterKind::ExtensibleMatch(assertion) => assertion.content_len(),
        }
    }

    /// Length pass: compute and cache the size of this node and its children
    pub fn compute_length(&self) -> usize {
        let content = match self.length.get() {
            Some(content) => content,
            None => {
                let content = self.content_len();
                self.length.set(content);
                content
            }
        };
        tlv_len(content)
    }

    /// Emission pass
    ///
    /// # Error Handling
    /// - `LdapError::Encoding` if the length pass has not run since the last
    ///   change to this node
    /// - `LdapError::InvalidFilter` for a `not` without a child
    /// - `LdapError::EncodeBufferTooSmall` if the buffer is too small
    pub fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        let content = self.length.get().ok_or_else(|| {
            LdapError::Encoding(format!(
                "Length of filter 0x{:02X} was not computed before encoding",
                self.tag()
            ))
        })?;
        encoder.put_header(self.tag(), content)?;

        match &self.kind {
            FilterKind::And(children) | FilterKind::Or(children) => {
                for child in children {
                    child.encode(encoder)?;
                }
                Ok(())
            }
            FilterKind::Not(Some(child)) => child.encode(encoder),
            FilterKind::Not(None) => Err(LdapError::InvalidFilter(
                "A not filter needs exactly one child".to_string(),
            )),
            FilterKind::EqualityMatch(ava)
            | FilterKind::GreaterOrEqual(ava)
            | FilterKind::LessOrEqual(ava)
            | FilterKind::ApproxMatch(ava) => ava.encode_content(encoder),
            FilterKind::Substrings(substrings) => substrings.encode_content(encoder),
            FilterKind::Present(attribute) => encoder.put_bytes(attribute.as_bytes()),
            FilterKind::ExtensibleMatch(assertion) => assertion.encode_content(encoder),
        }
    }
}

impl Encodable for Filter {
    fn compute_length(&self) -> usize {
        Filter::compute_length(self)
    }

    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        Filter::encode(self, encoder)
    }
}

/// Write an assertion value with RFC 4515 escapes
fn write_value(f: &mut fmt::Formatter<'_>, value: &[u8]) -> fmt::Result {
    match std::str::from_utf8(value) {
        Ok(text) => {
            for c in text.chars() {
                match c {
                    '*' | '(' | ')' | '\\' | '\0' => write!(f, "\\{:02x}", c as u32)?,
                    _ => write!(f, "{}", c)?,
                }
            }
            Ok(())
        }
        Err(_) => {
            for &byte in value {
                if byte.is_ascii_alphanumeric() {
                    write!(f, "{}", byte as char)?;
                } else {
                    write!(f, "\\{:02x}", byte)?;
                }
            }
            Ok(())
        }
    }
}

/// String representation (RFC 4515)
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterKind::And(children) | FilterKind::Or(children) => {
                f.write_str(if matches!(self.kind, FilterKind::And(_)) { "(&" } else { "(|" })?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
            FilterKind::Not(child) => {
                f.write_str("(!")?;
                if let Some(child) = child {
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
            FilterKind::EqualityMatch(ava) => write_assertion(f, ava, "="),
            FilterKind::GreaterOrEqual(ava) => write_assertion(f, ava, ">="),
            FilterKind::LessOrEqual(ava) => write_assertion(f, ava, "<="),
            FilterKind::ApproxMatch(ava) => write_assertion(f, ava, "~="),
            FilterKind::Present(attribute) => write!(f, "({}=*)", attribute),
            FilterKind::Substrings(substrings) => {
                write!(f, "({}=", substrings.attribute_type)?;
                if let Some(initial) = &substrings.initial {
                    write_value(f, initial)?;
                }
                for any in &substrings.any {
                    f.write_str("*")?;
                    write_value(f, any)?;
                }
                f.write_str("*")?;
                if let Some(final_value) = &substrings.final_value {
                    write_value(f, final_value)?;
                }
                f.write_str(")")
            }
            FilterKind::ExtensibleMatch(assertion) => {
                f.write_str("(")?;
                if let Some(attribute_type) = &assertion.attribute_type {
                    f.write_str(attribute_type)?;
                }
                if assertion.dn_attributes {
                    f.write_str(":dn")?;
                }
                if let Some(rule) = &assertion.matching_rule {
                    write!(f, ":{}", rule)?;
                }
                f.write_str(":=")?;
                write_value(f, &assertion.match_value)?;
                f.write_str(")")
            }
        }
    }
}

fn write_assertion(f: &mut fmt::Formatter<'_>, ava: &AttributeValueAssertion, operator: &str) -> fmt::Result {
    write!(f, "({}{}", ava.attribute_desc, operator)?;
    write_value(f, &ava.assertion_value)?;
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(filter: &Filter) -> Vec<u8> {
        let mut encoder = BerEncoder::with_capacity(filter.compute_length());
        filter.encode(&mut encoder).unwrap();
        assert_eq!(encoder.remaining(), 0);
        encoder.as_bytes().to_vec()
    }

    #[test]
    fn test_equality_encoding() {
        let filter = Filter::equality("cn", "test");
        assert_eq!(
            encode(&filter),
            vec![0xA3, 0x0A, 0x04, 0x02, b'c', b'n', 0x04, 0x04, b't', b'e', b's', b't']
        );
    }

    #[test]
    fn test_present_encoding() {
        let filter = Filter::present("objectClass");
        let bytes = encode(&filter);
        assert_eq!(&bytes[..2], &[0x87, 0x0B]);
        assert_eq!(&bytes[2..], b"objectClass");
    }

    #[test]
    fn test_and_keeps_order() {
        let filter = Filter::and(vec![Filter::present("a"), Filter::present("b")]);
        assert_eq!(
            encode(&filter),
            vec![0xA0, 0x06, 0x87, 0x01, b'a', 0x87, 0x01, b'b']
        );
    }

    #[test]
    fn test_empty_and() {
        let filter = Filter::and(Vec::new());
        assert_eq!(encode(&filter), vec![0xA0, 0x00]);
        assert_eq!(filter.to_string(), "(&)");
    }

    #[test]
    fn test_not_arity() {
        let mut not = Filter::new(FilterKind::Not(None));
        assert!(not.validate().is_err());
        not.add_child(Filter::present("cn")).unwrap();
        let err = not.add_child(Filter::present("sn")).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFilter(_)));
        assert_eq!(not.children().len(), 1);
        assert!(not.validate().is_ok());
    }

    #[test]
    fn test_leaf_rejects_children() {
        let mut leaf = Filter::present("cn");
        assert!(leaf.add_child(Filter::present("sn")).is_err());
    }

    #[test]
    fn test_encode_requires_length_pass() {
        let filter = Filter::present("cn");
        let mut encoder = BerEncoder::new();
        let err = filter.encode(&mut encoder).unwrap_err();
        assert!(matches!(err, LdapError::Encoding(_)));
    }

    #[test]
    fn test_add_child_invalidates_length() {
        let mut filter = Filter::or(vec![Filter::present("a")]);
        assert_eq!(filter.compute_length(), 5);
        assert_eq!(filter.cached_length(), Some(5));
        filter.add_child(Filter::present("b")).unwrap();
        assert_eq!(filter.cached_length(), None);
        assert_eq!(filter.compute_length(), 8);
    }

    #[test]
    fn test_substrings_encoding() {
        let filter = Filter::substrings(
            SubstringFilter::new("cn").with_initial("a").with_any("b").with_final("c"),
        );
        assert_eq!(
            encode(&filter),
            vec![
                0xA4, 0x0F, 0x04, 0x02, b'c', b'n', 0x30, 0x09, 0x80, 0x01, b'a', 0x81, 0x01, b'b',
                0x82, 0x01, b'c'
            ]
        );
        assert_eq!(filter.to_string(), "(cn=a*b*c)");
    }

    #[test]
    fn test_empty_substrings_invalid() {
        let filter = Filter::substrings(SubstringFilter::new("cn"));
        assert!(matches!(filter.validate(), Err(LdapError::InvalidFilter(_))));
    }

    #[test]
    fn test_extensible_encoding() {
        let filter = Filter::extensible(MatchingRuleAssertion {
            matching_rule: Some("2.5.13.2".to_string()),
            attribute_type: Some("cn".to_string()),
            match_value: b"x".to_vec(),
            dn_attributes: true,
        });
        let bytes = encode(&filter);
        assert_eq!(bytes[0], 0xA9);
        assert_eq!(bytes[1] as usize, bytes.len() - 2);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x84, 0x01, 0xFF]);
        assert_eq!(filter.to_string(), "(cn:dn:2.5.13.2:=x)");
    }

    #[test]
    fn test_display() {
        let filter = Filter::and(vec![
            Filter::or(vec![
                Filter::equality("cn", "a*b"),
                Filter::greater_or_equal("age", "30"),
            ]),
            Filter::not(Filter::present("mail")),
            Filter::approx("sn", "smith"),
            Filter::less_or_equal("uid", "(x)"),
        ]);
        assert_eq!(
            filter.to_string(),
            "(&(|(cn=a\\2ab)(age>=30))(!(mail=*))(sn~=smith)(uid<=\\28x\\29))"
        );
    }

    #[test]
    fn test_display_binary_value() {
        let filter = Filter::equality("objectGUID", vec![0x01, 0xFF, b'a']);
        assert_eq!(filter.to_string(), "(objectGUID=\\01\\ffa)");
    }

    #[test]
    fn test_equality_ignores_cache() {
        let encoded = Filter::present("cn");
        encoded.compute_length();
        assert_eq!(encoded, Filter::present("cn"));
    }
}
