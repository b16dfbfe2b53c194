//! Decode container
//!
//! Every decode owns a container: the grammar state, the TLV being read,
//! the stack of open constructed TLVs and the object under construction.
//! The generic part lives in [`ContainerCore`]; protocol containers embed
//! one and expose it through the [`Asn1Container`] trait so the stream
//! decoder and the grammar engine can drive them.

use crate::error::{LdapError, LdapResult};
use crate::grammar::{Grammar, GrammarState};
use crate::tlv::{Tlv, TlvState};

/// A constructed TLV whose content is still being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTlv {
    /// Identifier of the TLV
    pub id: usize,
    /// Single-byte tag
    pub tag: u8,
    /// Content bytes not yet consumed by children
    pub remaining: usize,
}

/// State shared by every decode container
#[derive(Debug, Clone)]
pub struct ContainerCore<S: GrammarState> {
    start: S,
    state: S,
    end_allowed: bool,
    tlv_state: TlvState,
    header: Vec<u8>,
    current: Option<Tlv>,
    parents: Vec<OpenTlv>,
    next_tlv_id: usize,
    pdu_length: Option<usize>,
    consumed: usize,
}

impl<S: GrammarState> ContainerCore<S> {
    /// Create a core positioned on the grammar's start state
    pub fn new(start: S) -> Self {
        Self {
            start,
            state: start,
            end_allowed: false,
            tlv_state: TlvState::Tag,
            header: Vec::with_capacity(10),
            current: None,
            parents: Vec::new(),
            next_tlv_id: 0,
            pdu_length: None,
            consumed: 0,
        }
    }

    /// Forget everything about the current message
    pub fn reset(&mut self) {
        self.state = self.start;
        self.end_allowed = false;
        self.tlv_state = TlvState::Tag;
        self.header.clear();
        self.current = None;
        self.parents.clear();
        self.next_tlv_id = 0;
        self.pdu_length = None;
        self.consumed = 0;
    }

    pub fn state(&self) -> S {
        self.state
    }

    pub fn set_state(&mut self, state: S) {
        self.state = state;
    }

    /// Whether the message may legally end at this point
    pub fn is_end_allowed(&self) -> bool {
        self.end_allowed
    }

    pub fn set_end_allowed(&mut self, end_allowed: bool) {
        self.end_allowed = end_allowed;
    }

    pub fn tlv_state(&self) -> TlvState {
        self.tlv_state
    }

    pub(crate) fn set_tlv_state(&mut self, tlv_state: TlvState) {
        self.tlv_state = tlv_state;
    }

    pub(crate) fn header(&self) -> &[u8] {
        &self.header
    }

    pub(crate) fn push_header_byte(&mut self, byte: u8) {
        self.header.push(byte);
        self.consumed += 1;
    }

    pub(crate) fn clear_header(&mut self) {
        self.header.clear();
    }

    /// TLV the current grammar action is working on
    pub fn current_tlv(&self) -> Option<&Tlv> {
        self.current.as_ref()
    }

    pub(crate) fn current_tlv_mut(&mut self) -> Option<&mut Tlv> {
        self.current.as_mut()
    }

    pub(crate) fn set_current_tlv(&mut self, tlv: Tlv) {
        self.current = Some(tlv);
    }

    /// Current TLV, or an error naming the state if there is none
    pub fn tlv(&self) -> LdapResult<&Tlv> {
        self.current.as_ref().ok_or_else(|| {
            LdapError::IncompleteMessage(format!("No TLV available in state {}", self.state.name()))
        })
    }

    /// Value bytes of the current TLV
    pub fn value(&self) -> LdapResult<&[u8]> {
        self.tlv().map(Tlv::value)
    }

    pub(crate) fn allocate_tlv_id(&mut self) -> usize {
        let id = self.next_tlv_id;
        self.next_tlv_id += 1;
        id
    }

    /// Number of open constructed TLVs enclosing the current one
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Innermost open constructed TLV
    pub fn parent(&self) -> Option<&OpenTlv> {
        self.parents.last()
    }

    /// Tag of the innermost open constructed TLV
    pub fn parent_tag(&self) -> Option<u8> {
        self.parents.last().map(|p| p.tag)
    }

    /// Check whether the constructed TLV `tlv_id` still has content to decode
    pub fn is_open(&self, tlv_id: usize) -> bool {
        self.parents.iter().any(|p| p.id == tlv_id)
    }

    pub(crate) fn parent_mut(&mut self) -> Option<&mut OpenTlv> {
        self.parents.last_mut()
    }

    pub(crate) fn push_parent(&mut self, open: OpenTlv) {
        self.parents.push(open);
    }

    pub(crate) fn pop_parent(&mut self) -> Option<OpenTlv> {
        self.parents.pop()
    }

    /// Total size of the message being decoded, once its header is known
    pub fn pdu_length(&self) -> Option<usize> {
        self.pdu_length
    }

    pub(crate) fn set_pdu_length(&mut self, length: usize) {
        self.pdu_length = Some(length);
    }

    /// Bytes of the current message consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn add_consumed(&mut self, count: usize) {
        self.consumed += count;
    }

    /// Bytes of the current message not consumed yet, if the size is known
    pub fn pdu_remaining(&self) -> Option<usize> {
        self.pdu_length.map(|length| length.saturating_sub(self.consumed))
    }
}

/// A container the grammar engine can drive
pub trait Asn1Container: Sized + 'static {
    /// Grammar states of this container
    type State: GrammarState;

    fn core(&self) -> &ContainerCore<Self::State>;

    fn core_mut(&mut self) -> &mut ContainerCore<Self::State>;

    /// Grammar decoding into this container
    fn grammar() -> &'static Grammar<Self>;
}
