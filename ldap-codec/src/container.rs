//! Decode context of one LDAP message
//!
//! The container owns everything the grammar actions touch while a message
//! is being decoded: the engine state, the message under construction and
//! the stack of search filters whose TLVs are still open.

use crate::controls::Control;
use crate::error::{LdapError, LdapResult};
use crate::filter::Filter;
use crate::grammar::{LdapState, LDAP_MESSAGE_GRAMMAR};
use crate::message::{LdapMessage, ProtocolOp};
use ldap_asn1::{Asn1Container, ContainerCore, Grammar};
use ldap_core::Dn;

/// Container for [`LdapMessage`] decoding
#[derive(Debug)]
pub struct LdapMessageContainer {
    pub(crate) core: ContainerCore<LdapState>,
    pub(crate) message_id: i32,
    pub(crate) op: Option<ProtocolOp>,
    pub(crate) controls: Vec<Control>,
    /// Filters being built, each with the id of the TLV it was decoded from
    filters: Vec<(Filter, usize)>,
    filter_root: Option<Filter>,
    /// Modify DN entry, held until the new RDN completes the request
    pub(crate) pending_entry: Option<Dn>,
}

impl Default for LdapMessageContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl LdapMessageContainer {
    pub fn new() -> Self {
        Self {
            core: ContainerCore::new(LdapState::Start),
            message_id: 0,
            op: None,
            controls: Vec::new(),
            filters: Vec::new(),
            filter_root: None,
            pending_entry: None,
        }
    }

    /// Clear all state so the next message can be decoded
    pub fn reset(&mut self) {
        self.core.reset();
        self.message_id = 0;
        self.op = None;
        self.controls.clear();
        self.filters.clear();
        self.filter_root = None;
        self.pending_entry = None;
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    /// Operation decoded so far
    pub fn op(&self) -> Option<&ProtocolOp> {
        self.op.as_ref()
    }

    /// Take the decoded message and reset the container
    ///
    /// # Error Handling
    /// Returns `LdapError::IncompleteMessage` if no operation was decoded.
    pub fn take_message(&mut self) -> LdapResult<LdapMessage> {
        let op = self.op.take().ok_or_else(|| {
            LdapError::IncompleteMessage(format!("Message {} has no operation", self.message_id))
        })?;
        let message = LdapMessage {
            message_id: self.message_id,
            op,
            controls: std::mem::take(&mut self.controls),
        };
        self.reset();
        Ok(message)
    }

    /// Add a filter decoded from the current TLV
    ///
    /// And, or, not, and the constructed leaves stay on the stack while their
    /// TLV is open; a present filter is attached at once.
    pub(crate) fn push_filter(&mut self, filter: Filter) -> LdapResult<()> {
        self.unstack_closed_filters()?;
        let tlv = self.core.tlv()?;
        if tlv.is_constructed() {
            let id = tlv.id();
            self.filters.push((filter, id));
            Ok(())
        } else {
            self.attach_filter(filter)
        }
    }

    /// Innermost filter still being built
    pub(crate) fn current_filter_mut(&mut self) -> LdapResult<&mut Filter> {
        self.filters
            .last_mut()
            .map(|(filter, _)| filter)
            .ok_or_else(|| LdapError::InvalidFieldValue("No filter under construction".to_string()))
    }

    /// Check whether the TLV of the innermost filter under construction is
    /// still open
    pub(crate) fn current_filter_open(&self) -> bool {
        self.filters
            .last()
            .is_some_and(|&(_, id)| self.core.is_open(id))
    }

    /// Complete the filter tree once the attribute selection starts
    ///
    /// # Error Handling
    /// Returns `LdapError::InvalidFieldValue` if a filter TLV is still open,
    /// no filter was decoded, or the tree is not valid (a not without its
    /// child, a substring filter without substrings).
    pub(crate) fn finish_filter(&mut self) -> LdapResult<Filter> {
        self.unstack_closed_filters()?;
        if !self.filters.is_empty() {
            return Err(LdapError::InvalidFieldValue(
                "Attribute selection inside a filter".to_string(),
            ));
        }
        let root = self
            .filter_root
            .take()
            .ok_or_else(|| LdapError::InvalidFieldValue("Search request without filter".to_string()))?;
        root.validate()
            .map_err(|e| LdapError::InvalidFieldValue(e.to_string()))?;
        Ok(root)
    }

    fn unstack_closed_filters(&mut self) -> LdapResult<()> {
        while let Some(&(_, id)) = self.filters.last() {
            if self.core.is_open(id) {
                break;
            }
            if let Some((filter, _)) = self.filters.pop() {
                self.attach_filter(filter)?;
            }
        }
        Ok(())
    }

    fn attach_filter(&mut self, filter: Filter) -> LdapResult<()> {
        match self.filters.last_mut() {
            Some((parent, _)) => parent
                .add_child(filter)
                .map_err(|e| LdapError::InvalidFieldValue(e.to_string())),
            None if self.filter_root.is_none() => {
                self.filter_root = Some(filter);
                Ok(())
            }
            None => Err(LdapError::InvalidFieldValue(
                "Search request holds more than one filter".to_string(),
            )),
        }
    }
}

impl Asn1Container for LdapMessageContainer {
    type State = LdapState;

    fn core(&self) -> &ContainerCore<LdapState> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ContainerCore<LdapState> {
        &mut self.core
    }

    fn grammar() -> &'static Grammar<Self> {
        &LDAP_MESSAGE_GRAMMAR
    }
}
