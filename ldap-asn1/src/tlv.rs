//! TLV (Tag-Length-Value) model
//!
//! A [`Tlv`] is created by the stream decoder once its tag and length are
//! known. Primitive TLVs then accumulate value bytes until the declared
//! length is reached; constructed TLVs never hold value bytes themselves,
//! their content is decoded as child TLVs.

use crate::ber::types::BerTag;
use std::fmt;

/// Decoding phase of the TLV currently being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlvState {
    /// Waiting for (the rest of) the tag
    #[default]
    Tag,
    /// Tag complete, waiting for (the rest of) the length
    Length,
    /// Header complete, waiting for value bytes of a primitive TLV
    Value,
}

/// One BER unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    id: usize,
    tag: BerTag,
    length: usize,
    header_len: usize,
    value: Vec<u8>,
}

impl Tlv {
    /// Create a TLV from a decoded header
    ///
    /// # Arguments
    /// * `id` - Identifier unique within the current message
    /// * `tag` - Decoded tag
    /// * `length` - Declared value length
    /// * `header_len` - Number of bytes used by tag and length
    pub fn new(id: usize, tag: BerTag, length: usize, header_len: usize) -> Self {
        let capacity = if tag.is_constructed() { 0 } else { length };
        Self {
            id,
            tag,
            length,
            header_len,
            value: Vec::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn tag(&self) -> BerTag {
        self.tag
    }

    /// Declared length of the value
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Header plus value
    pub fn total_len(&self) -> usize {
        self.header_len + self.length
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.is_constructed()
    }

    /// Value bytes read so far (always empty for constructed TLVs)
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Number of value bytes still expected
    pub fn remaining(&self) -> usize {
        if self.is_constructed() {
            0
        } else {
            self.length - self.value.len()
        }
    }

    /// Check whether all declared value bytes have been read
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Append value bytes, returning how many were taken
    ///
    /// Never takes more than [`Tlv::remaining`] bytes.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.remaining());
        self.value.extend_from_slice(&bytes[..count]);
        count
    }
}

impl fmt::Display for Tlv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TLV[{}] tag {} length {}",
            self.id, self.tag, self.length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_value_accumulation() {
        let mut tlv = Tlv::new(0, BerTag::from_byte(0x04), 5, 2);
        assert_eq!(tlv.total_len(), 7);
        assert_eq!(tlv.append(b"Hel"), 3);
        assert!(!tlv.is_complete());
        assert_eq!(tlv.append(b"lo, world"), 2);
        assert!(tlv.is_complete());
        assert_eq!(tlv.value(), b"Hello");
    }

    #[test]
    fn test_constructed_holds_no_value() {
        let mut tlv = Tlv::new(3, BerTag::from_byte(0x30), 12, 2);
        assert!(tlv.is_constructed());
        assert!(tlv.is_complete());
        assert_eq!(tlv.append(&[0x02, 0x01]), 0);
        assert_eq!(tlv.to_string(), "TLV[3] tag 0x30 length 12");
    }
}
