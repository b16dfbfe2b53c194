//! Distinguished name collaborator types
//!
//! Full DN handling (normalisation, schema-aware comparison) belongs to the
//! directory object model. The codec only needs to know whether the bytes it
//! decoded form a syntactically valid DN or RDN (RFC 4514), so that a
//! malformed name can be rejected with an `invalidDNSyntax` response.

use crate::error::{LdapError, LdapResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `descr` or `numericoid` (RFC 4512 §1.4)
static ATTRIBUTE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9-]*|[0-9]+(?:\.[0-9]+)*)$")
        .expect("attribute type pattern is valid")
});

/// `attributedescription = attributetype options` (RFC 4512 §2.5)
static ATTRIBUTE_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9-]*|[0-9]+(?:\.[0-9]+)*)(?:;[A-Za-z0-9-]+)*$")
        .expect("attribute description pattern is valid")
});

/// Check an attribute type (`cn`, `2.5.4.3`)
pub fn is_valid_attribute_type(s: &str) -> bool {
    ATTRIBUTE_TYPE.is_match(s)
}

/// Check an attribute description (`cn`, `userCertificate;binary`)
pub fn is_valid_attribute_description(s: &str) -> bool {
    ATTRIBUTE_DESCRIPTION.is_match(s)
}

/// Split on a separator that is not escaped with a backslash
fn split_unescaped(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn invalid(name: &str, reason: &str) -> LdapError {
    LdapError::InvalidFieldValue(format!("Invalid DN '{}': {}", name, reason))
}

/// Validate an attribute value string (RFC 4514 §3)
fn validate_value(value: &str, name: &str) -> LdapResult<()> {
    if let Some(hex) = value.strip_prefix('#') {
        if hex.is_empty() || hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(name, "malformed hex string value"));
        }
        return Ok(());
    }

    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) if " \"#+,;<=>\\".contains(next) => {}
                Some(next) if next.is_ascii_hexdigit() => match chars.next() {
                    Some(low) if low.is_ascii_hexdigit() => {}
                    _ => return Err(invalid(name, "truncated hex escape")),
                },
                Some(_) => return Err(invalid(name, "invalid escape sequence")),
                None => return Err(invalid(name, "dangling escape character")),
            },
            '"' | '<' | '>' => return Err(invalid(name, "unescaped special character")),
            _ => {}
        }
    }
    Ok(())
}

/// Relative distinguished name: one or more `type=value` pairs joined by `+`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rdn {
    raw: String,
    types: Vec<String>,
}

impl Rdn {
    /// Parse and validate an RDN
    pub fn parse(s: &str) -> LdapResult<Self> {
        if s.trim().is_empty() {
            return Err(invalid(s, "empty RDN"));
        }

        let mut types = Vec::new();
        for ava in split_unescaped(s, '+') {
            let eq = ava
                .find('=')
                .ok_or_else(|| invalid(s, "missing '=' in attribute value assertion"))?;
            let attribute_type = ava[..eq].trim();
            if !is_valid_attribute_type(attribute_type) {
                return Err(invalid(s, "invalid attribute type"));
            }
            validate_value(ava[eq + 1..].trim_start(), s)?;
            types.push(attribute_type.to_string());
        }

        Ok(Self {
            raw: s.to_string(),
            types,
        })
    }

    /// Attribute types of the RDN, in order of appearance
    pub fn attribute_types(&self) -> &[String] {
        &self.types
    }

    /// Check if the RDN has more than one attribute value assertion
    pub fn is_multi_valued(&self) -> bool {
        self.types.len() > 1
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Distinguished name as it appeared on the wire
///
/// The original string is kept so that re-encoding reproduces the decoded
/// bytes exactly. The empty DN names the root DSE and is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dn {
    raw: String,
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty DN (root DSE)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and validate a DN string
    ///
    /// # Error Handling
    /// Returns `LdapError::InvalidFieldValue` if any RDN is empty, has no
    /// `=`, has an invalid attribute type or an invalid value escape.
    pub fn parse(s: &str) -> LdapResult<Self> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let rdns = split_unescaped(s, ',')
            .into_iter()
            .map(Rdn::parse)
            .collect::<LdapResult<Vec<_>>>()
            .map_err(|_| invalid(s, "malformed RDN"))?;

        Ok(Self {
            raw: s.to_string(),
            rdns,
        })
    }

    /// Construct a DN from decoded OCTET STRING bytes
    pub fn from_bytes(bytes: &[u8]) -> LdapResult<Self> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| LdapError::InvalidFieldValue("DN is not valid UTF-8".to_string()))?;
        Self::parse(s)
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Check if this is the root DSE name
    pub fn is_root(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Dn {
    type Err = LdapError;

    fn from_str(s: &str) -> LdapResult<Self> {
        Dn::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_dn() {
        let dn = Dn::parse("cn=test,ou=system").unwrap();
        assert_eq!(dn.rdns().len(), 2);
        assert_eq!(dn.rdns()[0].attribute_types(), &["cn".to_string()]);
        assert_eq!(dn.to_string(), "cn=test,ou=system");
    }

    #[test]
    fn test_root_dn() {
        let dn = Dn::parse("").unwrap();
        assert!(dn.is_root());
        assert!(dn.rdns().is_empty());
    }

    #[test]
    fn test_escaped_separator() {
        let dn = Dn::parse("cn=Smith\\, John,dc=example,dc=com").unwrap();
        assert_eq!(dn.rdns().len(), 3);
    }

    #[test]
    fn test_multi_valued_rdn() {
        let rdn = Rdn::parse("cn=John+uid=jsmith").unwrap();
        assert!(rdn.is_multi_valued());
        assert_eq!(rdn.attribute_types().len(), 2);
    }

    #[test]
    fn test_invalid_dns() {
        assert!(Dn::parse("cn=test,").is_err());
        assert!(Dn::parse("test").is_err());
        assert!(Dn::parse("=value").is_err());
        assert!(Dn::parse("c n=value").is_err());
        assert!(Dn::parse("cn=a\\").is_err());
        assert!(Dn::parse("cn=#abc").is_err());
        assert!(Dn::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_numeric_oid_and_hex_value() {
        assert!(Dn::parse("2.5.4.3=#04024869").is_ok());
        assert!(Dn::parse("cn=\\41bc").is_ok());
    }

    #[test]
    fn test_attribute_description() {
        assert!(is_valid_attribute_description("userCertificate;binary"));
        assert!(is_valid_attribute_description("2.5.4.3"));
        assert!(!is_valid_attribute_description("bad attr"));
        assert!(!is_valid_attribute_description(""));
    }
}
