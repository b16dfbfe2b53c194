//! BER encoder buffer
//!
//! Encoding is done in two passes. The first pass computes the total size of
//! the structure; the caller then creates a [`BerEncoder`] with exactly that
//! capacity and the second pass writes tag, length and value bytes into it.
//! Writing past the capacity means the two passes disagree, which is
//! reported as `LdapError::EncodeBufferTooSmall` instead of silently growing
//! the buffer.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ldap_asn1::ber::encoder::{integer_len, BerEncoder};
//!
//! let mut encoder = BerEncoder::with_capacity(integer_len(12345));
//! encoder.encode_integer(12345)?;
//! let bytes = encoder.into_bytes();
//! # Ok::<(), ldap_asn1::LdapError>(())
//! ```

use crate::ber::types::{universal, BerLength};
use crate::error::{LdapError, LdapResult};
use bytes::{BufMut, Bytes, BytesMut};

/// Byte range of the minimal two's complement encoding of `value`
fn integer_start(bytes: &[u8; 8]) -> usize {
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    start
}

/// Number of value bytes of the minimal INTEGER encoding of `value`
pub fn integer_value_len(value: i64) -> usize {
    8 - integer_start(&value.to_be_bytes())
}

/// Total TLV size of an INTEGER or ENUMERATED
pub fn integer_len(value: i64) -> usize {
    let value_len = integer_value_len(value);
    1 + BerLength::encoded_len(value_len) + value_len
}

/// Total TLV size of an OCTET STRING (or any primitive with a one-byte tag)
pub fn octet_string_len(value: &[u8]) -> usize {
    1 + BerLength::encoded_len(value.len()) + value.len()
}

/// Total TLV size of a BOOLEAN
pub const BOOLEAN_LEN: usize = 3;

/// BER encoder writing into a fixed-capacity buffer
pub struct BerEncoder {
    buffer: BytesMut,
    limit: usize,
}

impl BerEncoder {
    /// Create an encoder without a size limit
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            limit: usize::MAX,
        }
    }

    /// Create an encoder holding exactly `capacity` bytes
    ///
    /// # Arguments
    /// * `capacity` - Size computed by the length pass
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            limit: capacity,
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes that can still be written before the limit is hit
    pub fn remaining(&self) -> usize {
        self.limit - self.buffer.len()
    }

    fn reserve(&self, count: usize) -> LdapResult<()> {
        if count > self.remaining() {
            return Err(LdapError::EncodeBufferTooSmall {
                needed: self.buffer.len() + count,
                available: self.limit,
            });
        }
        Ok(())
    }

    /// Append raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> LdapResult<()> {
        self.reserve(bytes.len())?;
        self.buffer.put_slice(bytes);
        Ok(())
    }

    /// Append a one-byte tag
    pub fn put_tag(&mut self, tag: u8) -> LdapResult<()> {
        self.reserve(1)?;
        self.buffer.put_u8(tag);
        Ok(())
    }

    /// Append a length field in its shortest form
    pub fn put_length(&mut self, length: usize) -> LdapResult<()> {
        self.put_bytes(&BerLength::new(length).encode())
    }

    /// Append the tag and length of a constructed TLV whose content follows
    pub fn put_header(&mut self, tag: u8, length: usize) -> LdapResult<()> {
        self.put_tag(tag)?;
        self.put_length(length)
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    pub fn encode_tlv(&mut self, tag: u8, value: &[u8]) -> LdapResult<()> {
        self.put_header(tag, value.len())?;
        self.put_bytes(value)
    }

    /// Encode an INTEGER with the universal tag
    pub fn encode_integer(&mut self, value: i64) -> LdapResult<()> {
        self.encode_integer_tagged(universal::INTEGER, value)
    }

    /// Encode an ENUMERATED with the universal tag
    pub fn encode_enumerated(&mut self, value: i64) -> LdapResult<()> {
        self.encode_integer_tagged(universal::ENUMERATED, value)
    }

    /// Encode an integer value under an arbitrary (implicit) tag
    ///
    /// # Minimal Encoding
    /// BER requires the minimum number of bytes: 127 is `0x7F`, 128 is
    /// `0x00 0x80`, -1 is `0xFF`.
    pub fn encode_integer_tagged(&mut self, tag: u8, value: i64) -> LdapResult<()> {
        let bytes = value.to_be_bytes();
        let start = integer_start(&bytes);
        self.encode_tlv(tag, &bytes[start..])
    }

    /// Encode a BOOLEAN; TRUE is always written as `0xFF`
    pub fn encode_boolean(&mut self, tag: u8, value: bool) -> LdapResult<()> {
        self.encode_tlv(tag, &[if value { 0xFF } else { 0x00 }])
    }

    /// Encode an OCTET STRING under `tag`
    pub fn encode_octet_string(&mut self, tag: u8, value: &[u8]) -> LdapResult<()> {
        self.encode_tlv(tag, value)
    }

    /// Encode a 32-bit flag BIT STRING (5 value bytes)
    pub fn encode_bit_string(&mut self, flags: u32) -> LdapResult<()> {
        let [a, b, c, d] = flags.to_be_bytes();
        self.encode_tlv(universal::BIT_STRING, &[0x00, a, b, c, d])
    }

    /// Encode a NULL under `tag`
    pub fn encode_null(&mut self, tag: u8) -> LdapResult<()> {
        self.encode_tlv(tag, &[])
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_integer() {
        let mut encoder = BerEncoder::new();
        encoder.encode_integer(12345).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x02, 0x02, 0x30, 0x39]);
    }

    #[test]
    fn test_integer_minimal_forms() {
        assert_eq!(integer_value_len(0), 1);
        assert_eq!(integer_value_len(127), 1);
        assert_eq!(integer_value_len(128), 2);
        assert_eq!(integer_value_len(-1), 1);
        assert_eq!(integer_value_len(-128), 1);
        assert_eq!(integer_value_len(-129), 2);
        assert_eq!(integer_value_len(i32::MAX as i64), 4);

        let mut encoder = BerEncoder::new();
        encoder.encode_integer(-129).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x02, 0x02, 0xFF, 0x7F]);
    }

    #[test]
    fn test_encode_octet_string() {
        let mut encoder = BerEncoder::with_capacity(octet_string_len(b"Hello"));
        encoder.encode_octet_string(universal::OCTET_STRING, b"Hello").unwrap();
        assert_eq!(encoder.remaining(), 0);
        assert_eq!(&encoder.into_bytes()[..], b"\x04\x05Hello");
    }

    #[test]
    fn test_encode_boolean() {
        let mut encoder = BerEncoder::with_capacity(BOOLEAN_LEN);
        encoder.encode_boolean(universal::BOOLEAN, true).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x01, 0x01, 0xFF]);
    }

    #[test]
    fn test_encode_bit_string() {
        let mut encoder = BerEncoder::new();
        encoder.encode_bit_string(0x8000_0001).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x03, 0x05, 0x00, 0x80, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut encoder = BerEncoder::with_capacity(4);
        let result = encoder.encode_octet_string(universal::OCTET_STRING, b"Hello");
        assert_eq!(
            result,
            Err(LdapError::EncodeBufferTooSmall {
                needed: 7,
                available: 4
            })
        );
    }

    #[test]
    fn test_long_form_header() {
        let value = vec![0xAB; 200];
        let mut encoder = BerEncoder::with_capacity(octet_string_len(&value));
        encoder.encode_octet_string(universal::OCTET_STRING, &value).unwrap();
        assert_eq!(&encoder.as_bytes()[..3], &[0x04, 0x81, 0xC8]);
        assert_eq!(encoder.len(), 203);
    }
}
