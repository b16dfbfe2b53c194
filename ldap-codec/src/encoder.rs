//! Two-pass message encoder
//!
//! Encoding an LDAP message never reallocates and never patches lengths
//! afterwards:
//!
//! 1. **Length pass**: [`Encodable::compute_length`] walks the message and
//!    returns the exact size of its TLV. Filters cache the size of every
//!    node during this pass.
//! 2. **Emission pass**: a [`BerEncoder`] of exactly that capacity is
//!    filled by [`Encodable::encode`], which writes each header from the
//!    lengths computed in the first pass.
//!
//! The message must not be modified between the two passes.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ldap_codec::encoder::encode_message;
//! use ldap_codec::message::{LdapMessage, ProtocolOp};
//!
//! let unbind = LdapMessage::new(3, ProtocolOp::UnbindRequest);
//! let bytes = encode_message(&unbind)?;
//! assert_eq!(&bytes[..], &[0x30, 0x05, 0x02, 0x01, 0x03, 0x42, 0x00]);
//! # Ok::<(), ldap_codec::LdapError>(())
//! ```

use crate::error::{LdapError, LdapResult};
use crate::message::LdapMessage;
use bytes::{BufMut, Bytes, BytesMut};
use ldap_asn1::ber::types::tlv_len;
use ldap_asn1::BerEncoder;

/// A value that can be encoded in two passes
pub trait Encodable {
    /// Total size of the encoded TLV, tag and length included
    fn compute_length(&self) -> usize;

    /// Write the TLV into `encoder`
    ///
    /// `compute_length` must have been called since the last modification.
    fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()>;
}

/// Total size of the given elements
pub(crate) fn content_len<'a, T: Encodable + 'a>(elements: impl IntoIterator<Item = &'a T>) -> usize {
    elements.into_iter().map(Encodable::compute_length).sum()
}

/// Size of a SEQUENCE (or SET) OF OCTET STRING
pub(crate) fn octet_strings_len<T: AsRef<[u8]>>(values: &[T]) -> usize {
    values.iter().map(|v| tlv_len(v.as_ref().len())).sum()
}

/// Write every value as an OCTET STRING
pub(crate) fn encode_octet_strings<T: AsRef<[u8]>>(encoder: &mut BerEncoder, values: &[T]) -> LdapResult<()> {
    for value in values {
        encoder.encode_octet_string(ldap_asn1::ber::types::universal::OCTET_STRING, value.as_ref())?;
    }
    Ok(())
}

/// Encode a value into an exactly-sized buffer
///
/// # Error Handling
/// Returns `LdapError::Encoding` if the emission pass wrote fewer bytes
/// than the length pass announced; writing more is reported by the encoder
/// buffer as `LdapError::EncodeBufferTooSmall`.
pub fn encode_value<T: Encodable + ?Sized>(value: &T) -> LdapResult<Bytes> {
    let length = value.compute_length();
    let mut encoder = BerEncoder::with_capacity(length);
    value.encode(&mut encoder)?;
    if encoder.remaining() != 0 {
        return Err(LdapError::Encoding(format!(
            "Length pass announced {} bytes, {} written",
            length,
            encoder.len()
        )));
    }
    Ok(encoder.into_bytes())
}

/// Encode an LDAP message
pub fn encode_message(message: &LdapMessage) -> LdapResult<Bytes> {
    let bytes = encode_value(message)?;
    log::trace!(
        "encoded message {} ({}): {} bytes",
        message.message_id,
        message.op.name(),
        bytes.len()
    );
    Ok(bytes)
}

/// Append an encoded LDAP message to an output buffer
pub fn encode_message_into(message: &LdapMessage, out: &mut BytesMut) -> LdapResult<()> {
    let bytes = encode_message(message)?;
    out.put_slice(&bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::message::{ProtocolOp, SearchRequest};
    use ldap_core::Dn;

    struct Lying;

    impl Encodable for Lying {
        fn compute_length(&self) -> usize {
            4
        }

        fn encode(&self, encoder: &mut BerEncoder) -> LdapResult<()> {
            encoder.encode_octet_string(0x04, b"")
        }
    }

    #[test]
    fn test_unbind_request() {
        let bytes = encode_message(&LdapMessage::new(3, ProtocolOp::UnbindRequest)).unwrap();
        assert_eq!(&bytes[..], &[0x30, 0x05, 0x02, 0x01, 0x03, 0x42, 0x00]);
    }

    #[test]
    fn test_length_mismatch_detected() {
        let err = encode_value(&Lying).unwrap_err();
        assert!(matches!(err, LdapError::Encoding(_)));
    }

    #[test]
    fn test_search_request_exact_size() {
        let request = SearchRequest::new(
            Dn::parse("ou=system").unwrap(),
            Filter::and(vec![
                Filter::equality("objectClass", "person"),
                Filter::present("cn"),
            ]),
        );
        let message = LdapMessage::new(2, ProtocolOp::SearchRequest(request));
        let length = message.compute_length();
        let bytes = encode_message(&message).unwrap();
        assert_eq!(bytes.len(), length);
        assert_eq!(bytes[0], 0x30);
    }

    #[test]
    fn test_encode_message_into() {
        let mut out = BytesMut::from(&b"xx"[..]);
        encode_message_into(&LdapMessage::new(1, ProtocolOp::AbandonRequest(7)), &mut out).unwrap();
        assert_eq!(&out[..], &[b'x', b'x', 0x30, 0x06, 0x02, 0x01, 0x01, 0x50, 0x01, 0x07]);
    }
}
