//! Table-driven grammar engine
//!
//! A grammar is a set of transitions `(current state, tag) -> (next state,
//! action)`. The transitions are indexed in a dense table with one row per
//! state and one column per tag byte, so dispatching a TLV is a single
//! lookup. Grammars are built once, never mutated afterwards, and shared by
//! every decode through a `static`.
//!
//! # Dispatch
//!
//! For each TLV handed over by the stream decoder:
//! 1. Look up `(container state, tag byte)`; no entry is an
//!    `LdapError::UnexpectedTag` naming both.
//! 2. Move the container to the next state and clear its end-allowed flag.
//! 3. Run the action, if any. Actions validate and store the TLV and set
//!    end-allowed when the message may legally stop here.

use crate::ber::types::BerTag;
use crate::container::Asn1Container;
use crate::error::{LdapError, LdapResult};
use std::fmt;

/// A state of a grammar
pub trait GrammarState: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Row of the state in the transition table
    fn ordinal(self) -> usize;

    /// Name used in error messages and traces
    fn name(self) -> &'static str;
}

/// Action run when a transition fires
pub type Action<C> = fn(&mut C) -> LdapResult<()>;

/// One grammar transition
pub struct Transition<C: Asn1Container> {
    name: &'static str,
    current: C::State,
    next: C::State,
    tag: u8,
    action: Option<Action<C>>,
}

impl<C: Asn1Container> Transition<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn current(&self) -> C::State {
        self.current
    }

    pub fn next(&self) -> C::State {
        self.next
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }
}

impl<C: Asn1Container> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} --0x{:02X}--> {})",
            self.name,
            self.current.name(),
            self.tag,
            self.next.name()
        )
    }
}

/// Immutable (state, tag) transition table for one container type
pub struct Grammar<C: Asn1Container> {
    name: &'static str,
    transitions: Vec<Transition<C>>,
    table: Vec<[Option<u16>; 256]>,
}

impl<C: Asn1Container> Grammar<C> {
    /// Create an empty grammar
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            transitions: Vec::new(),
            table: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a transition
    ///
    /// Registering the same `(current, tag)` pair twice replaces the earlier
    /// transition; grammars are expected not to do that.
    pub fn add(
        &mut self,
        name: &'static str,
        current: C::State,
        tag: u8,
        next: C::State,
        action: Option<Action<C>>,
    ) {
        let row = current.ordinal();
        if self.table.len() <= row {
            self.table.resize(row + 1, [None; 256]);
        }
        debug_assert!(
            self.table[row][tag as usize].is_none(),
            "duplicate transition {} on 0x{:02X} in {}",
            current.name(),
            tag,
            self.name
        );
        self.table[row][tag as usize] = Some(self.transitions.len() as u16);
        self.transitions.push(Transition {
            name,
            current,
            next,
            tag,
            action,
        });
    }

    /// Register the same transition for several tags
    pub fn add_tags(
        &mut self,
        name: &'static str,
        current: C::State,
        tags: &[u8],
        next: C::State,
        action: Option<Action<C>>,
    ) {
        for &tag in tags {
            self.add(name, current, tag, next, action);
        }
    }

    /// Find the transition for `(state, tag)`
    pub fn lookup(&self, state: C::State, tag: u8) -> Option<&Transition<C>> {
        self.table
            .get(state.ordinal())
            .and_then(|row| row[tag as usize])
            .map(|index| &self.transitions[index as usize])
    }

    /// Number of registered transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Dispatch the container's current TLV
    ///
    /// # Error Handling
    /// - `LdapError::UnexpectedTag` if no transition exists; extended tags
    ///   never match and are reported with their leading byte
    /// - Whatever error the action returns
    pub fn execute(&self, container: &mut C, tag: BerTag) -> LdapResult<()> {
        let state = container.core().state();
        let transition = tag
            .to_byte()
            .and_then(|byte| self.lookup(state, byte))
            .ok_or_else(|| LdapError::UnexpectedTag {
                state: state.name().to_string(),
                tag: tag.leading_byte(),
            })?;

        log::trace!("{}: {:?}", self.name, transition);

        let core = container.core_mut();
        core.set_state(transition.next);
        core.set_end_allowed(false);

        match transition.action {
            Some(action) => action(container),
            None => Ok(()),
        }
    }
}

impl<C: Asn1Container> fmt::Debug for Grammar<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
