//! Incremental stream decoder
//!
//! [`Asn1Decoder`] turns a byte stream into grammar dispatches. It consumes
//! whatever is buffered, keeps its progress in the container, and returns
//! [`DecodeStatus::NeedMoreData`] when the bytes run out, so the caller can
//! feed the next chunk whenever it arrives.
//!
//! # TLV Handling
//!
//! - Constructed TLVs are dispatched as soon as their tag and length are
//!   known, then pushed on the container's stack of open TLVs.
//! - Primitive TLVs are dispatched once their value is fully buffered.
//! - Every TLV's total size is charged to its enclosing TLV when its header
//!   is read; a child larger than what is left of its parent is rejected
//!   before any value byte is buffered.
//! - When the top-level TLV is exhausted the message is complete, provided
//!   the grammar flagged that ending here is legal.

use crate::ber::types::{BerLength, BerTag, DEFAULT_MAX_LENGTH};
use crate::container::{Asn1Container, OpenTlv};
use crate::error::{LdapError, LdapResult};
use crate::grammar::GrammarState;
use crate::tlv::{Tlv, TlvState};
use bytes::Buf;

/// Decoder limits
///
/// # Default Values
/// - `max_pdu_size`: 2 MiB
/// - `max_depth`: 128 nested constructed TLVs
/// - `strict_length_encoding`: true (non-minimal long form lengths rejected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest accepted message, header excluded
    pub max_pdu_size: usize,
    /// Largest number of nested open constructed TLVs
    pub max_depth: usize,
    /// Reject long form lengths that a shorter form could express
    pub strict_length_encoding: bool,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pdu_size(mut self, max_pdu_size: usize) -> Self {
        self.max_pdu_size = max_pdu_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_length_encoding(mut self, strict: bool) -> Self {
        self.strict_length_encoding = strict;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_LENGTH,
            max_depth: 128,
            strict_length_encoding: true,
        }
    }
}

/// Outcome of one [`Asn1Decoder::decode`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// All buffered bytes were consumed and the message is not finished
    NeedMoreData,
    /// A whole top-level TLV was decoded; bytes after it are left in the buffer
    Done,
}

/// Incremental BER decoder driving a grammar
#[derive(Debug, Clone, Default)]
pub struct Asn1Decoder {
    config: DecoderConfig,
}

impl Asn1Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode as much of one message as `buf` holds
    ///
    /// # Arguments
    /// * `buf` - Input bytes; consumed bytes are advanced past
    /// * `container` - Decode context, carried over between calls
    ///
    /// # Returns
    /// `DecodeStatus::Done` once the top-level TLV is complete, otherwise
    /// `DecodeStatus::NeedMoreData` with `buf` fully consumed.
    ///
    /// # Error Handling
    /// - `LdapError::MalformedLength` for invalid, oversized or overflowing lengths
    /// - `LdapError::IncompleteMessage` if the message ends where the grammar
    ///   does not allow it
    /// - Any error raised by the grammar or its actions
    ///
    /// After an error the container must be reset before it is reused.
    pub fn decode<C: Asn1Container, B: Buf>(
        &self,
        buf: &mut B,
        container: &mut C,
    ) -> LdapResult<DecodeStatus> {
        loop {
            match container.core().tlv_state() {
                TlvState::Tag => {
                    if !self.read_tag(buf, container)? {
                        return Ok(DecodeStatus::NeedMoreData);
                    }
                }
                TlvState::Length => {
                    if !self.read_length(buf, container)? {
                        return Ok(DecodeStatus::NeedMoreData);
                    }
                }
                TlvState::Value => {
                    if !self.read_value(buf, container)? {
                        return Ok(DecodeStatus::NeedMoreData);
                    }
                }
            }

            if container.core().tlv_state() == TlvState::Tag && self.close_exhausted(container)? {
                return Ok(DecodeStatus::Done);
            }
        }
    }

    /// Decode a buffer that must hold exactly one complete TLV
    ///
    /// Used for values embedded in an OCTET STRING, such as control values.
    pub fn decode_complete<C: Asn1Container>(&self, bytes: &[u8], container: &mut C) -> LdapResult<()> {
        let mut buf = bytes;
        match self.decode(&mut buf, container)? {
            DecodeStatus::NeedMoreData => Err(LdapError::IncompleteMessage(format!(
                "Truncated value, {} bytes available",
                bytes.len()
            ))),
            DecodeStatus::Done if buf.has_remaining() => Err(LdapError::InvalidFieldValue(format!(
                "{} trailing bytes after value",
                buf.remaining()
            ))),
            DecodeStatus::Done => Ok(()),
        }
    }

    fn read_tag<C: Asn1Container, B: Buf>(&self, buf: &mut B, container: &mut C) -> LdapResult<bool> {
        let core = container.core_mut();
        while buf.has_remaining() {
            core.push_header_byte(buf.get_u8());
            if BerTag::decode(core.header())?.is_some() {
                core.set_tlv_state(TlvState::Length);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_length<C: Asn1Container, B: Buf>(&self, buf: &mut B, container: &mut C) -> LdapResult<bool> {
        let header = loop {
            let core = container.core_mut();
            if let Some((tag, tag_len)) = BerTag::decode(core.header())? {
                let length = BerLength::decode(
                    &core.header()[tag_len..],
                    self.config.max_pdu_size,
                    self.config.strict_length_encoding,
                )?;
                if let Some((length, length_len)) = length {
                    break (tag, length.value(), tag_len + length_len);
                }
            }
            if !buf.has_remaining() {
                return Ok(false);
            }
            core.push_header_byte(buf.get_u8());
        };

        let (tag, length, header_len) = header;
        let total = header_len + length;
        let max_depth = self.config.max_depth;
        let core = container.core_mut();
        core.clear_header();

        match core.parent_mut() {
            Some(parent) => {
                if total > parent.remaining {
                    return Err(LdapError::MalformedLength(format!(
                        "TLV {} of {} bytes overflows its parent 0x{:02X} with {} bytes left",
                        tag, total, parent.tag, parent.remaining
                    )));
                }
                parent.remaining -= total;
            }
            None => core.set_pdu_length(total),
        }
        if tag.is_constructed() && core.depth() >= max_depth {
            return Err(LdapError::InvalidFieldValue(format!(
                "TLV nesting deeper than {}",
                max_depth
            )));
        }

        let id = core.allocate_tlv_id();
        let tlv = Tlv::new(id, tag, length, header_len);
        log::trace!("header {} in state {}", tlv, core.state().name());
        core.set_current_tlv(tlv);

        if tag.is_constructed() {
            C::grammar().execute(container, tag)?;
            let core = container.core_mut();
            if let Some(byte) = tag.to_byte() {
                core.push_parent(OpenTlv {
                    id,
                    tag: byte,
                    remaining: length,
                });
            }
            core.set_tlv_state(TlvState::Tag);
        } else if length == 0 {
            C::grammar().execute(container, tag)?;
            container.core_mut().set_tlv_state(TlvState::Tag);
        } else {
            core.set_tlv_state(TlvState::Value);
        }
        Ok(true)
    }

    fn read_value<C: Asn1Container, B: Buf>(&self, buf: &mut B, container: &mut C) -> LdapResult<bool> {
        let core = container.core_mut();
        let Some(tlv) = core.current_tlv_mut() else {
            return Err(LdapError::IncompleteMessage(
                "Value bytes without a TLV header".to_string(),
            ));
        };

        let mut taken = 0;
        while !tlv.is_complete() && buf.has_remaining() {
            let count = tlv.append(buf.chunk());
            buf.advance(count);
            taken += count;
        }
        let tag = tlv.tag();
        let complete = tlv.is_complete();
        core.add_consumed(taken);
        if !complete {
            return Ok(false);
        }

        C::grammar().execute(container, tag)?;
        container.core_mut().set_tlv_state(TlvState::Tag);
        Ok(true)
    }

    /// Pop exhausted TLVs; returns true when the whole message is done
    fn close_exhausted<C: Asn1Container>(&self, container: &mut C) -> LdapResult<bool> {
        let core = container.core_mut();
        while core.parent().is_some_and(|p| p.remaining == 0) {
            if let Some(closed) = core.pop_parent() {
                log::trace!("closed TLV[{}] 0x{:02X}", closed.id, closed.tag);
            }
        }

        if core.depth() > 0 || core.pdu_length().is_none() {
            return Ok(false);
        }

        if !core.is_end_allowed() {
            return Err(LdapError::IncompleteMessage(format!(
                "Message ended in state {}",
                core.state().name()
            )));
        }
        Ok(true)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerCore;
    use crate::grammar::Grammar;
    use once_cell::sync::Lazy;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ListState {
        Start,
        List,
    }

    impl GrammarState for ListState {
        fn ordinal(self) -> usize {
            self as usize
        }

        fn name(self) -> &'static str {
            match self {
                ListState::Start => "Start",
                ListState::List => "List",
            }
        }
    }

    /// SEQUENCE of INTEGER, OCTET STRING and nested SEQUENCE elements
    struct ListContainer {
        core: ContainerCore<ListState>,
        values: Vec<Vec<u8>>,
        nested: usize,
    }

    impl ListContainer {
        fn new() -> Self {
            Self {
                core: ContainerCore::new(ListState::Start),
                values: Vec::new(),
                nested: 0,
            }
        }
    }

    fn store_value(container: &mut ListContainer) -> LdapResult<()> {
        let value = container.core().value()?.to_vec();
        container.values.push(value);
        container.core_mut().set_end_allowed(true);
        Ok(())
    }

    fn open_nested(container: &mut ListContainer) -> LdapResult<()> {
        container.nested += 1;
        container.core_mut().set_end_allowed(true);
        Ok(())
    }

    static LIST_GRAMMAR: Lazy<Grammar<ListContainer>> = Lazy::new(|| {
        let mut grammar = Grammar::new("List");
        grammar.add("list", ListState::Start, 0x30, ListState::List, None);
        grammar.add_tags("element", ListState::List, &[0x02, 0x04], ListState::List, Some(store_value));
        grammar.add("nested", ListState::List, 0x30, ListState::List, Some(open_nested));
        grammar
    });

    impl Asn1Container for ListContainer {
        type State = ListState;

        fn core(&self) -> &ContainerCore<ListState> {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ContainerCore<ListState> {
            &mut self.core
        }

        fn grammar() -> &'static Grammar<Self> {
            &LIST_GRAMMAR
        }
    }

    const LIST: [u8; 12] = [
        0x30, 0x0A, 0x02, 0x01, 0x05, 0x30, 0x05, 0x04, 0x03, b'a', b'b', b'c',
    ];

    #[test]
    fn test_decode_whole_buffer() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        let mut buf = &LIST[..];
        assert_eq!(decoder.decode(&mut buf, &mut container).unwrap(), DecodeStatus::Done);
        assert!(buf.is_empty());
        assert_eq!(container.values, vec![vec![0x05], b"abc".to_vec()]);
        assert_eq!(container.nested, 1);
        assert_eq!(container.core().pdu_remaining(), Some(0));
    }

    #[test]
    fn test_decode_one_byte_chunks() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        for (i, byte) in LIST.iter().enumerate() {
            let mut chunk = std::slice::from_ref(byte);
            let status = decoder.decode(&mut chunk, &mut container).unwrap();
            if i + 1 < LIST.len() {
                assert_eq!(status, DecodeStatus::NeedMoreData);
            } else {
                assert_eq!(status, DecodeStatus::Done);
            }
        }
        assert_eq!(container.values, vec![vec![0x05], b"abc".to_vec()]);
    }

    #[test]
    fn test_trailing_bytes_left_in_buffer() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x03, 0x02, 0x01, 0x05, 0x30][..];
        assert_eq!(decoder.decode(&mut buf, &mut container).unwrap(), DecodeStatus::Done);
        assert_eq!(buf, &[0x30]);
    }

    #[test]
    fn test_child_overflows_parent() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x03, 0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05][..];
        let err = decoder.decode(&mut buf, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::MalformedLength(_)));
    }

    #[test]
    fn test_nested_child_overflows_parent() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x07, 0x30, 0x05, 0x02, 0x04, 0x01, 0x02, 0x03][..];
        let err = decoder.decode(&mut buf, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::MalformedLength(_)));
        assert_eq!(container.core().pdu_remaining(), Some(3));
    }

    #[test]
    fn test_end_not_allowed() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x00][..];
        let err = decoder.decode(&mut buf, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::IncompleteMessage(_)));
    }

    #[test]
    fn test_max_pdu_size() {
        let decoder = Asn1Decoder::new(DecoderConfig::new().with_max_pdu_size(4));
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x05, 0x04, 0x03, b'a', b'b', b'c'][..];
        let err = decoder.decode(&mut buf, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::MalformedLength(_)));
        assert_eq!(container.core().pdu_length(), None);
    }

    #[test]
    fn test_max_depth() {
        let decoder = Asn1Decoder::new(DecoderConfig::new().with_max_depth(1));
        let mut container = ListContainer::new();
        let mut buf = &[0x30, 0x02, 0x30, 0x00][..];
        let err = decoder.decode(&mut buf, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFieldValue(_)));
    }

    #[test]
    fn test_relaxed_length_encoding() {
        let bytes = [0x30, 0x81, 0x03, 0x02, 0x01, 0x07];
        let strict = Asn1Decoder::default();
        let mut container = ListContainer::new();
        assert!(strict.decode(&mut &bytes[..], &mut container).is_err());

        let relaxed = Asn1Decoder::new(DecoderConfig::new().with_strict_length_encoding(false));
        let mut container = ListContainer::new();
        assert_eq!(
            relaxed.decode(&mut &bytes[..], &mut container).unwrap(),
            DecodeStatus::Done
        );
        assert_eq!(container.values, vec![vec![0x07]]);
    }

    #[test]
    fn test_decode_complete() {
        let decoder = Asn1Decoder::default();
        let mut container = ListContainer::new();
        assert!(decoder.decode_complete(&LIST, &mut container).is_ok());

        let mut container = ListContainer::new();
        let err = decoder.decode_complete(&LIST[..6], &mut container).unwrap_err();
        assert!(matches!(err, LdapError::IncompleteMessage(_)));

        let mut trailing = LIST.to_vec();
        trailing.push(0x00);
        let mut container = ListContainer::new();
        let err = decoder.decode_complete(&trailing, &mut container).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFieldValue(_)));
    }
}
