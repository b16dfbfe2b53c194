//! Simple paged results control (RFC 2696)
//!
//! ```text
//! realSearchControlValue ::= SEQUENCE {
//!         size            INTEGER (0..maxInt),
//!         cookie          OCTET STRING }
//! ```

use crate::error::LdapResult;
use ldap_asn1::ber::decoder::{decode_integer, IntegerBounds};
use ldap_asn1::ber::encoder::{integer_len, octet_string_len};
use ldap_asn1::ber::types::{tlv_len, universal};
use ldap_asn1::{Asn1Container, Asn1Decoder, BerEncoder, ContainerCore, Grammar, GrammarState};
use once_cell::sync::Lazy;

/// Control OID
pub const OID: &str = "1.2.840.113556.1.4.319";

/// Paged results request or response value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedResults {
    /// Requested page size, or estimated result count in a response
    pub size: i32,
    /// Opaque server cookie, empty on the first request and the last response
    pub cookie: Vec<u8>,
}

impl PagedResults {
    pub fn new(size: i32, cookie: impl Into<Vec<u8>>) -> Self {
        Self {
            size,
            cookie: cookie.into(),
        }
    }

    fn content_len(&self) -> usize {
        integer_len(self.size as i64) + octet_string_len(&self.cookie)
    }

    pub(crate) fn compute_length(&self) -> usize {
        tlv_len(self.content_len())
    }

    pub(crate) fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
        encoder.put_header(universal::SEQUENCE, self.content_len())?;
        encoder.encode_integer(self.size as i64)?;
        encoder.encode_octet_string(universal::OCTET_STRING, &self.cookie)
    }

    /// Decode a control value
    pub fn decode(value: &[u8]) -> LdapResult<Self> {
        let mut container = PagedResultsContainer::new();
        Asn1Decoder::default().decode_complete(value, &mut container)?;
        Ok(container.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagedResultsState {
    Start,
    PagedSearch,
    Size,
    Cookie,
}

impl GrammarState for PagedResultsState {
    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            PagedResultsState::Start => "Start",
            PagedResultsState::PagedSearch => "PagedSearch",
            PagedResultsState::Size => "Size",
            PagedResultsState::Cookie => "Cookie",
        }
    }
}

struct PagedResultsContainer {
    core: ContainerCore<PagedResultsState>,
    value: PagedResults,
}

impl PagedResultsContainer {
    fn new() -> Self {
        Self {
            core: ContainerCore::new(PagedResultsState::Start),
            value: PagedResults::default(),
        }
    }
}

fn store_size(container: &mut PagedResultsContainer) -> LdapResult<()> {
    let size = decode_integer(container.core.value()?, IntegerBounds::NON_NEGATIVE)?;
    container.value.size = size as i32;
    Ok(())
}

fn store_cookie(container: &mut PagedResultsContainer) -> LdapResult<()> {
    container.value.cookie = container.core.value()?.to_vec();
    container.core.set_end_allowed(true);
    Ok(())
}

static PAGED_RESULTS_GRAMMAR: Lazy<Grammar<PagedResultsContainer>> = Lazy::new(|| {
    let mut grammar = Grammar::new("PagedResults");
    grammar.add(
        "paged search",
        PagedResultsState::Start,
        universal::SEQUENCE,
        PagedResultsState::PagedSearch,
        None,
    );
    grammar.add(
        "size",
        PagedResultsState::PagedSearch,
        universal::INTEGER,
        PagedResultsState::Size,
        Some(store_size),
    );
    grammar.add(
        "cookie",
        PagedResultsState::Size,
        universal::OCTET_STRING,
        PagedResultsState::Cookie,
        Some(store_cookie),
    );
    grammar
});

impl Asn1Container for PagedResultsContainer {
    type State = PagedResultsState;

    fn core(&self) -> &ContainerCore<PagedResultsState> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore<PagedResultsState> {
        &mut self.core
    }

    fn grammar() -> &'static Grammar<Self> {
        &PAGED_RESULTS_GRAMMAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_core::LdapError;

    #[test]
    fn test_decode() {
        let value = PagedResults::decode(&[0x30, 0x07, 0x02, 0x01, 0x0A, 0x04, 0x02, 0xAB, 0xCD]).unwrap();
        assert_eq!(value, PagedResults::new(10, vec![0xAB, 0xCD]));
    }

    #[test]
    fn test_empty_cookie() {
        let value = PagedResults::decode(&[0x30, 0x05, 0x02, 0x01, 0x64, 0x04, 0x00]).unwrap();
        assert_eq!(value.size, 100);
        assert!(value.cookie.is_empty());
    }

    #[test]
    fn test_missing_cookie() {
        let err = PagedResults::decode(&[0x30, 0x03, 0x02, 0x01, 0x0A]).unwrap_err();
        assert!(matches!(err, LdapError::IncompleteMessage(_)));
    }

    #[test]
    fn test_negative_size() {
        let err = PagedResults::decode(&[0x30, 0x05, 0x02, 0x01, 0xFF, 0x04, 0x00]).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFieldValue(_)));
    }

    #[test]
    fn test_encode() {
        let value = PagedResults::new(10, vec![0xAB, 0xCD]);
        let mut encoder = BerEncoder::with_capacity(value.compute_length());
        value.encode(&mut encoder).unwrap();
        assert_eq!(
            encoder.as_bytes(),
            &[0x30, 0x07, 0x02, 0x01, 0x0A, 0x04, 0x02, 0xAB, 0xCD]
        );
    }
}
