//! Typed BER value decoders
//!
//! These functions operate on the value bytes of a fully buffered primitive
//! TLV. Each decoder validates the shape of the encoding and, where the call
//! site supplies them, the range of the decoded value. Grammar actions call
//! them with the field-specific constraints, e.g.:
//!
//! ```rust,no_run
//! use ldap_asn1::ber::decoder::{decode_integer, IntegerBounds};
//!
//! let version = decode_integer(&[0x03], IntegerBounds::PROTOCOL_VERSION)?;
//! # Ok::<(), ldap_asn1::LdapError>(())
//! ```

use crate::error::{LdapError, LdapResult};

/// Inclusive range accepted for an INTEGER or ENUMERATED field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerBounds {
    pub min: i64,
    pub max: i64,
}

impl IntegerBounds {
    /// `version INTEGER (1 .. 127)` of a BindRequest
    pub const PROTOCOL_VERSION: Self = Self::new(1, 127);
    /// `MessageID ::= INTEGER (0 .. maxInt)`
    pub const MESSAGE_ID: Self = Self::new(0, i32::MAX as i64);
    /// Any `INTEGER (0 .. maxInt)` such as size and time limits
    pub const NON_NEGATIVE: Self = Self::new(0, i32::MAX as i64);

    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Decode an INTEGER (or ENUMERATED) value
///
/// # Decoding Format
/// Big-endian two's complement, 1 to 8 bytes.
///
/// # Error Handling
/// Returns `LdapError::InvalidFieldValue` if:
/// - The value is empty
/// - The value is longer than 8 bytes
/// - The decoded value is outside `bounds`
pub fn decode_integer(value: &[u8], bounds: IntegerBounds) -> LdapResult<i64> {
    if value.is_empty() {
        return Err(LdapError::InvalidFieldValue(
            "Zero-length integer encoding".to_string(),
        ));
    }
    if value.len() > 8 {
        return Err(LdapError::InvalidFieldValue(format!(
            "Integer too large: {} bytes (max 8)",
            value.len()
        )));
    }

    let sign = if value[0] & 0x80 != 0 { -1i64 } else { 0i64 };
    let decoded = value.iter().fold(sign, |acc, &b| (acc << 8) | b as i64);

    if !bounds.contains(decoded) {
        return Err(LdapError::InvalidFieldValue(format!(
            "Integer {} out of range [{}, {}]",
            decoded, bounds.min, bounds.max
        )));
    }

    Ok(decoded)
}

/// Decode a BOOLEAN value
///
/// Exactly one content byte is required; any non-zero byte is TRUE.
pub fn decode_boolean(value: &[u8]) -> LdapResult<bool> {
    match value {
        [byte] => Ok(*byte != 0),
        _ => Err(LdapError::InvalidFieldValue(format!(
            "Boolean must be 1 byte long, got {}",
            value.len()
        ))),
    }
}

/// Decode an OCTET STRING value
///
/// # Arguments
/// * `value` - Value bytes
/// * `allow_empty` - Whether a zero-length value is legal for this field
pub fn decode_octet_string(value: &[u8], allow_empty: bool) -> LdapResult<&[u8]> {
    if value.is_empty() && !allow_empty {
        return Err(LdapError::InvalidFieldValue(
            "Empty octet string not allowed here".to_string(),
        ));
    }
    Ok(value)
}

/// Decode an OCTET STRING holding UTF-8 text (`LDAPString`, `LDAPOID`)
pub fn decode_utf8(value: &[u8], allow_empty: bool) -> LdapResult<String> {
    let bytes = decode_octet_string(value, allow_empty)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| LdapError::InvalidFieldValue("String is not valid UTF-8".to_string()))
}

/// Expected length of a bit string flag field
pub const BIT_STRING_LENGTH: usize = 5;

/// Decode a 32-bit flag BIT STRING
///
/// # Decoding Format
/// Exactly 5 bytes: the unused-bits count (0-7) followed by four payload
/// bytes, most significant first.
///
/// # Error Handling
/// Returns `LdapError::InvalidFieldValue` for any other length or an unused
/// bits count above 7.
pub fn decode_bit_string(value: &[u8]) -> LdapResult<u32> {
    if value.len() != BIT_STRING_LENGTH {
        return Err(LdapError::InvalidFieldValue(format!(
            "Bit string must be {} bytes long, got {}",
            BIT_STRING_LENGTH,
            value.len()
        )));
    }
    if value[0] > 7 {
        return Err(LdapError::InvalidFieldValue(format!(
            "Invalid unused bits: {} (must be 0-7)",
            value[0]
        )));
    }
    Ok(u32::from_be_bytes([value[1], value[2], value[3], value[4]]))
}

/// Decode a NULL value, which must be empty
pub fn decode_null(value: &[u8]) -> LdapResult<()> {
    if value.is_empty() {
        Ok(())
    } else {
        Err(LdapError::InvalidFieldValue(format!(
            "NULL must be empty, got {} bytes",
            value.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        let bounds = IntegerBounds::new(i64::MIN, i64::MAX);
        assert_eq!(decode_integer(&[0x30, 0x39], bounds).unwrap(), 12345);
        assert_eq!(decode_integer(&[0xFF], bounds).unwrap(), -1);
        assert_eq!(decode_integer(&[0x00, 0x80], bounds).unwrap(), 128);
        assert_eq!(decode_integer(&[0xFF, 0x7F], bounds).unwrap(), -129);
    }

    #[test]
    fn test_decode_integer_empty() {
        let result = decode_integer(&[], IntegerBounds::MESSAGE_ID);
        assert!(matches!(result, Err(LdapError::InvalidFieldValue(_))));
    }

    #[test]
    fn test_decode_version_bounds() {
        assert!(decode_integer(&[0x00], IntegerBounds::PROTOCOL_VERSION).is_err());
        assert!(decode_integer(&[0x00, 0x80], IntegerBounds::PROTOCOL_VERSION).is_err());
        for version in 1u8..=127 {
            assert_eq!(
                decode_integer(&[version], IntegerBounds::PROTOCOL_VERSION).unwrap(),
                version as i64
            );
        }
    }

    #[test]
    fn test_decode_integer_too_long() {
        let nine = [0x01; 9];
        assert!(decode_integer(&nine, IntegerBounds::new(i64::MIN, i64::MAX)).is_err());
    }

    #[test]
    fn test_decode_message_id_negative() {
        assert!(decode_integer(&[0x80], IntegerBounds::MESSAGE_ID).is_err());
    }

    #[test]
    fn test_decode_boolean() {
        assert!(decode_boolean(&[0xFF]).unwrap());
        assert!(decode_boolean(&[0x01]).unwrap());
        assert!(!decode_boolean(&[0x00]).unwrap());
        assert!(decode_boolean(&[]).is_err());
        assert!(decode_boolean(&[0xFF, 0xFF]).is_err());
    }

    #[test]
    fn test_decode_octet_string() {
        assert_eq!(decode_octet_string(b"Hello", false).unwrap(), b"Hello");
        assert!(decode_octet_string(b"", true).unwrap().is_empty());
        assert!(decode_octet_string(b"", false).is_err());
        assert!(decode_utf8(&[0xC3, 0x28], true).is_err());
    }

    #[test]
    fn test_decode_bit_string() {
        let flags = decode_bit_string(&[0x00, 0x80, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(flags, 0x8000_0001);
    }

    #[test]
    fn test_decode_bit_string_wrong_length() {
        let err = decode_bit_string(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
        match err {
            LdapError::InvalidFieldValue(message) => assert!(message.contains('5')),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(decode_bit_string(&[0x08, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_null() {
        assert!(decode_null(&[]).is_ok());
        assert!(decode_null(&[0x00]).is_err());
    }
}
