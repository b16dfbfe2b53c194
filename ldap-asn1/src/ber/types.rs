//! BER encoding types (Tag, Length)

use crate::error::{LdapError, LdapResult};
use std::fmt;

/// Universal class tag bytes used by LDAP (X.690 §8)
pub mod universal {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const ENUMERATED: u8 = 0x0A;
    /// SEQUENCE and SEQUENCE OF, always constructed
    pub const SEQUENCE: u8 = 0x30;
    /// SET and SET OF, always constructed
    pub const SET: u8 = 0x31;
}

/// Constructed bit (bit 6) of the first tag byte
pub const CONSTRUCTED: u8 = 0x20;

/// Default upper bound on a single PDU, used when no configuration is given
pub const DEFAULT_MAX_LENGTH: usize = 0x20_0000;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: LDAP protocol operations (`[APPLICATION 0]` BindRequest, ...)
/// - **Context-specific**: Fields inside a SEQUENCE or alternatives of a CHOICE
/// - **Private**: Never used by LDAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits 8-7 of the first tag byte
    pub fn from_bits(byte: u8) -> Self {
        match (byte >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// BER Tag
///
/// # Encoding Format
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// Extended form (tag number > 30):
/// ```text
/// First byte:  C C P 1 1 1 1 1
/// Following bytes: 1 T T T T T T T ... 0 T T T T T T T
/// ```
///
/// LDAP only uses single-byte tags, so every grammar transition is keyed by
/// [`BerTag::to_byte`]. Extended tags are still decoded so that they can be
/// reported precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u32,
}

impl BerTag {
    /// Create a new BER tag
    pub fn new(class: BerTagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    /// Create a Universal class tag
    pub fn universal(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Universal, constructed, number)
    }

    /// Create an Application class tag
    pub fn application(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Application, constructed, number)
    }

    /// Create a Context-specific class tag
    pub fn context_specific(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::ContextSpecific, constructed, number)
    }

    /// Build a tag from a single-byte (short form) encoding
    pub fn from_byte(byte: u8) -> Self {
        Self::new(
            BerTagClass::from_bits(byte),
            byte & CONSTRUCTED != 0,
            (byte & 0x1F) as u32,
        )
    }

    /// Get tag class
    pub fn class(&self) -> BerTagClass {
        self.class
    }

    /// Check if tag is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Single-byte form of the tag, `None` for extended tags
    pub fn to_byte(&self) -> Option<u8> {
        if self.number <= 30 {
            let constructed_bit = if self.constructed { CONSTRUCTED } else { 0 };
            Some(self.class.to_bits() | constructed_bit | self.number as u8)
        } else {
            None
        }
    }

    /// First byte of the encoded tag
    ///
    /// Equal to [`BerTag::to_byte`] for short tags; for extended tags this
    /// is the `C C P 1 1 1 1 1` leader byte.
    pub fn leading_byte(&self) -> u8 {
        match self.to_byte() {
            Some(byte) => byte,
            None => {
                let constructed_bit = if self.constructed { CONSTRUCTED } else { 0 };
                self.class.to_bits() | constructed_bit | 0x1F
            }
        }
    }

    /// Number of bytes the encoded tag occupies
    pub fn encoded_len(&self) -> usize {
        if self.number <= 30 {
            1
        } else {
            let mut remaining = self.number;
            let mut count = 1;
            while remaining > 0 {
                count += 1;
                remaining >>= 7;
            }
            count
        }
    }

    /// Encode tag to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.encoded_len());
        result.push(self.leading_byte());

        if self.number > 30 {
            let mut remaining = self.number;
            let mut bytes = Vec::new();
            while remaining > 0 {
                bytes.push((remaining & 0x7F) as u8);
                remaining >>= 7;
            }

            // Continuation bit on all but the last byte
            for (i, &byte) in bytes.iter().rev().enumerate() {
                if i < bytes.len() - 1 {
                    result.push(byte | 0x80);
                } else {
                    result.push(byte);
                }
            }
        }

        result
    }

    /// Decode tag from bytes
    ///
    /// # Returns
    /// `Ok(Some((tag, bytes_consumed)))` once the tag is complete,
    /// `Ok(None)` if `data` ends in the middle of an extended tag.
    ///
    /// # Error Handling
    /// Returns `LdapError::InvalidFieldValue` if an extended tag number does
    /// not fit in 28 bits.
    pub fn decode(data: &[u8]) -> LdapResult<Option<(Self, usize)>> {
        let Some(&first_byte) = data.first() else {
            return Ok(None);
        };

        let class = BerTagClass::from_bits(first_byte);
        let constructed = (first_byte & CONSTRUCTED) != 0;
        let tag_bits = first_byte & 0x1F;

        if tag_bits < 31 {
            return Ok(Some((Self::new(class, constructed, tag_bits as u32), 1)));
        }

        let mut tag_number = 0u32;
        for (i, &byte) in data.iter().enumerate().skip(1) {
            if i > 4 {
                return Err(LdapError::InvalidFieldValue(
                    "Tag number too large or invalid encoding".to_string(),
                ));
            }
            tag_number = (tag_number << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                return Ok(Some((Self::new(class, constructed, tag_number), i + 1)));
            }
        }

        Ok(None)
    }
}

impl fmt::Display for BerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_byte() {
            Some(byte) => write!(f, "0x{:02X}", byte),
            None => write!(
                f,
                "{:?}[{}]{}",
                self.class,
                self.number,
                if self.constructed { " constructed" } else { "" }
            ),
        }
    }
}

/// BER Length encoding
///
/// # Encoding Format
///
/// Short form:
/// ```text
/// Byte: 0 L L L L L L L
/// ```
///
/// Long form:
/// ```text
/// First byte:  1 N N N N N N N  (N = number of length bytes, 1-4)
/// Following bytes: L L L L L L L L  (big-endian length value)
/// ```
///
/// The indefinite form (`0x80`) is never accepted: LDAP requires definite
/// lengths (RFC 4511 §5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length > 127, encoded with length-of-length
    Long(usize),
}

impl BerLength {
    /// Create a new BER length using the shortest legal form
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    /// Number of bytes needed to encode `length` in its shortest form
    pub fn encoded_len(length: usize) -> usize {
        if length < 128 {
            1
        } else {
            let mut num_bytes = 0;
            let mut temp = length;
            while temp > 0 {
                num_bytes += 1;
                temp >>= 8;
            }
            1 + num_bytes
        }
    }

    /// Encode length to bytes
    pub fn encode(&self) -> Vec<u8> {
        match self {
            BerLength::Short(length) => vec![*length],
            BerLength::Long(length) => {
                let num_bytes = Self::encoded_len(*length) - 1;
                let mut result = Vec::with_capacity(1 + num_bytes);
                result.push(0x80 | num_bytes as u8);
                for i in (0..num_bytes).rev() {
                    result.push(((*length >> (i * 8)) & 0xFF) as u8);
                }
                result
            }
        }
    }

    /// Decode length from bytes
    ///
    /// # Arguments
    /// * `data` - Bytes starting at the length field
    /// * `max_length` - Largest length accepted
    /// * `strict` - Reject long forms that a shorter encoding could express
    ///
    /// # Returns
    /// `Ok(Some((length, bytes_consumed)))` once the field is complete,
    /// `Ok(None)` if more bytes are needed.
    ///
    /// # Error Handling
    /// Returns `LdapError::MalformedLength` for the indefinite form, more than
    /// four length bytes, a value above `max_length`, or (when `strict`) a
    /// non-minimal long form.
    pub fn decode(data: &[u8], max_length: usize, strict: bool) -> LdapResult<Option<(Self, usize)>> {
        let Some(&first_byte) = data.first() else {
            return Ok(None);
        };

        if first_byte & 0x80 == 0 {
            if first_byte as usize > max_length {
                return Err(LdapError::MalformedLength(format!(
                    "Length {} exceeds the maximum of {}",
                    first_byte, max_length
                )));
            }
            return Ok(Some((BerLength::Short(first_byte), 1)));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if num_bytes == 0 {
            return Err(LdapError::MalformedLength(
                "Indefinite length encoding not supported".to_string(),
            ));
        }
        if num_bytes > 4 {
            return Err(LdapError::MalformedLength(format!(
                "Length encoding too large: {} bytes (max 4)",
                num_bytes
            )));
        }
        if data.len() < 1 + num_bytes {
            return Ok(None);
        }

        let length = data[1..=num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);

        if strict && (length < 128 || data[1] == 0) {
            return Err(LdapError::MalformedLength(format!(
                "Non-minimal length encoding: {} encoded on {} bytes",
                length,
                1 + num_bytes
            )));
        }
        if length > max_length {
            return Err(LdapError::MalformedLength(format!(
                "Length {} exceeds the maximum of {}",
                length, max_length
            )));
        }

        Ok(Some((BerLength::Long(length), 1 + num_bytes)))
    }
}

/// Total size of a TLV whose tag fits in one byte
pub fn tlv_len(value_len: usize) -> usize {
    1 + BerLength::encoded_len(value_len) + value_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_tag_short_form() {
        let tag = BerTag::universal(false, 2);
        let encoded = tag.encode();
        assert_eq!(encoded, vec![universal::INTEGER]);
    }

    #[test]
    fn test_ber_tag_constructed() {
        let tag = BerTag::application(true, 14);
        assert_eq!(tag.to_byte(), Some(0x6E));
        assert_eq!(BerTag::from_byte(0x6E), tag);
    }

    #[test]
    fn test_ber_tag_decode() {
        let (tag, consumed) = BerTag::decode(&[0x87]).unwrap().unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(tag.class(), BerTagClass::ContextSpecific);
        assert!(!tag.is_constructed());
        assert_eq!(tag.number(), 7);
    }

    #[test]
    fn test_ber_tag_extended() {
        let tag = BerTag::context_specific(true, 200);
        let encoded = tag.encode();
        assert_eq!(encoded, vec![0xBF, 0x81, 0x48]);
        assert_eq!(tag.encoded_len(), 3);
        assert_eq!(tag.to_byte(), None);

        assert_eq!(BerTag::decode(&encoded[..2]).unwrap(), None);
        let (decoded, consumed) = BerTag::decode(&encoded).unwrap().unwrap();
        assert_eq!(decoded, tag);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_ber_tag_extended_too_large() {
        let data = [0x1F, 0x81, 0x81, 0x81, 0x81, 0x01];
        assert!(BerTag::decode(&data).is_err());
    }

    #[test]
    fn test_ber_length_short() {
        let length = BerLength::new(100);
        assert_eq!(length.encode(), vec![100]);
        assert_eq!(BerLength::encoded_len(127), 1);
    }

    #[test]
    fn test_ber_length_long() {
        assert_eq!(BerLength::new(128).encode(), vec![0x81, 0x80]);
        assert_eq!(BerLength::new(1000).encode(), vec![0x82, 0x03, 0xE8]);
        assert_eq!(BerLength::encoded_len(0x1_0000), 4);
    }

    #[test]
    fn test_ber_length_decode() {
        let (length, consumed) = BerLength::decode(&[0x82, 0x01, 0x00], 1 << 20, true)
            .unwrap()
            .unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(length.value(), 256);
    }

    #[test]
    fn test_ber_length_incomplete() {
        assert_eq!(BerLength::decode(&[], 100, true).unwrap(), None);
        assert_eq!(BerLength::decode(&[0x82, 0x01], 1 << 20, true).unwrap(), None);
    }

    #[test]
    fn test_ber_length_rejections() {
        let indefinite = BerLength::decode(&[0x80], 100, true);
        assert!(matches!(indefinite, Err(LdapError::MalformedLength(_))));

        let too_many = BerLength::decode(&[0x85, 0, 0, 0, 0, 1], usize::MAX, true);
        assert!(matches!(too_many, Err(LdapError::MalformedLength(_))));

        let too_big = BerLength::decode(&[0x82, 0x10, 0x00], 1000, true);
        assert!(matches!(too_big, Err(LdapError::MalformedLength(_))));
    }

    #[test]
    fn test_ber_length_non_minimal() {
        let data = [0x81, 0x05];
        assert!(matches!(
            BerLength::decode(&data, 100, true),
            Err(LdapError::MalformedLength(_))
        ));
        let (length, consumed) = BerLength::decode(&data, 100, false).unwrap().unwrap();
        assert_eq!((length.value(), consumed), (5, 2));

        let leading_zero = [0x82, 0x00, 0x90];
        assert!(BerLength::decode(&leading_zero, 1000, true).is_err());
    }

    #[test]
    fn test_tlv_len() {
        assert_eq!(tlv_len(0), 2);
        assert_eq!(tlv_len(127), 129);
        assert_eq!(tlv_len(128), 131);
    }
}
