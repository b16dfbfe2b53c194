//! Subentries control (RFC 3672)
//!
//! The value is a bare `BOOLEAN`: TRUE makes subentries visible to the
//! search, FALSE makes only normal entries visible.

use crate::error::LdapResult;
use ldap_asn1::ber::decoder::decode_boolean;
use ldap_asn1::ber::types::universal;
use ldap_asn1::{Asn1Container, Asn1Decoder, ContainerCore, Grammar, GrammarState};
use once_cell::sync::Lazy;

/// Control OID
pub const OID: &str = "1.3.6.1.4.1.4203.1.10.1";

/// Decode a subentries control value
pub fn decode(value: &[u8]) -> LdapResult<bool> {
    let mut container = SubentriesContainer {
        core: ContainerCore::new(SubentriesState::Start),
        visibility: false,
    };
    Asn1Decoder::default().decode_complete(value, &mut container)?;
    Ok(container.visibility)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubentriesState {
    Start,
    Visibility,
}

impl GrammarState for SubentriesState {
    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            SubentriesState::Start => "Start",
            SubentriesState::Visibility => "Visibility",
        }
    }
}

struct SubentriesContainer {
    core: ContainerCore<SubentriesState>,
    visibility: bool,
}

fn store_visibility(container: &mut SubentriesContainer) -> LdapResult<()> {
    container.visibility = decode_boolean(container.core.value()?)?;
    container.core.set_end_allowed(true);
    Ok(())
}

static SUBENTRIES_GRAMMAR: Lazy<Grammar<SubentriesContainer>> = Lazy::new(|| {
    let mut grammar = Grammar::new("Subentries");
    grammar.add(
        "visibility",
        SubentriesState::Start,
        universal::BOOLEAN,
        SubentriesState::Visibility,
        Some(store_visibility),
    );
    grammar
});

impl Asn1Container for SubentriesContainer {
    type State = SubentriesState;

    fn core(&self) -> &ContainerCore<SubentriesState> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore<SubentriesState> {
        &mut self.core
    }

    fn grammar() -> &'static Grammar<Self> {
        &SUBENTRIES_GRAMMAR
    }
}
