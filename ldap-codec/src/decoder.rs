//! LDAP message stream decoder
//!
//! [`LdapDecoder`] is fed the bytes read from a connection and returns one
//! [`LdapMessage`] at a time. Partial input is kept in the decoder between
//! calls, so chunks can be of any size.
//!
//! # Error Recovery
//!
//! A message that fails to decode is abandoned. If the length of the
//! failed message is known and was not itself the problem, the decoder
//! skips its remaining bytes and the next call starts with the following
//! message. Otherwise the byte stream cannot be resynchronised and every
//! further call fails with `LdapError::StreamClosed` until [`LdapDecoder::reset`].
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use bytes::BytesMut;
//! use ldap_codec::decoder::LdapDecoder;
//!
//! let mut decoder = LdapDecoder::new();
//! let mut input = BytesMut::from(&[0x30, 0x05, 0x02, 0x01, 0x03, 0x42, 0x00][..]);
//! while let Some(message) = decoder.decode(&mut input)? {
//!     println!("{} {}", message.message_id, message.op.name());
//! }
//! # Ok::<(), ldap_codec::LdapError>(())
//! ```

use crate::container::LdapMessageContainer;
use crate::error::{LdapError, LdapResult};
use crate::message::LdapMessage;
use bytes::{Buf, BytesMut};
use ldap_asn1::{Asn1Container, Asn1Decoder, DecodeStatus, DecoderConfig};

/// Incremental decoder for a stream of LDAP messages
#[derive(Debug)]
pub struct LdapDecoder {
    decoder: Asn1Decoder,
    container: LdapMessageContainer,
    /// Bytes of a rejected message still to be discarded
    skip: usize,
    closed: bool,
}

impl Default for LdapDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LdapDecoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: Asn1Decoder::new(config),
            container: LdapMessageContainer::new(),
            skip: 0,
            closed: false,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        self.decoder.config()
    }

    /// Check whether the stream was closed by an unrecoverable error
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Decode the next message from `buf`
    ///
    /// # Arguments
    /// * `buf` - Received bytes; consumed bytes are removed from the front
    ///
    /// # Returns
    /// `Some(message)` once a whole message was decoded, with any following
    /// bytes left in `buf`; `None` if more input is needed.
    ///
    /// # Error Handling
    /// Returns the decode error of the failed message. When the error
    /// carries a negative response (`LdapError::ResponseCarrying`) the peer
    /// should be sent that response; see [`crate::response::error_response`].
    pub fn decode(&mut self, buf: &mut BytesMut) -> LdapResult<Option<LdapMessage>> {
        if self.closed {
            return Err(LdapError::StreamClosed(
                "Decoder stopped after an unrecoverable error".to_string(),
            ));
        }

        if self.skip > 0 {
            let count = self.skip.min(buf.len());
            buf.advance(count);
            self.skip -= count;
            if self.skip > 0 {
                return Ok(None);
            }
        }

        let result = self
            .decoder
            .decode(buf, &mut self.container)
            .and_then(|status| match status {
                DecodeStatus::Done => self.container.take_message().map(Some),
                DecodeStatus::NeedMoreData => Ok(None),
            });

        match result {
            Ok(Some(message)) => {
                log::debug!("decoded message {} ({})", message.message_id, message.op.name());
                Ok(Some(message))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.recover(buf, &err);
                Err(err)
            }
        }
    }

    /// Discard the rest of a failed message, or close the stream
    fn recover(&mut self, buf: &mut BytesMut, err: &LdapError) {
        let message_id = self.container.message_id();
        let remaining = self.container.core().pdu_remaining();
        self.container.reset();

        match remaining {
            Some(remaining) if !err.is_fatal_to_stream() => {
                let count = remaining.min(buf.len());
                buf.advance(count);
                self.skip = remaining - count;
                log::debug!(
                    "message {} rejected, skipping {} bytes: {}",
                    message_id,
                    remaining,
                    err
                );
            }
            _ => {
                self.closed = true;
                log::debug!("closing LDAP stream: {}", err);
            }
        }
    }

    /// Drop any partial message and reopen a closed stream
    pub fn reset(&mut self) {
        self.container.reset();
        self.skip = 0;
        self.closed = false;
    }
}

/// Decode a buffer holding exactly one LDAP message
///
/// # Error Handling
/// - Any decode error of the message
/// - `LdapError::IncompleteMessage` if the buffer ends inside the message
/// - `LdapError::InvalidFieldValue` if bytes follow the message
pub fn decode_message(bytes: &[u8]) -> LdapResult<LdapMessage> {
    let mut container = LdapMessageContainer::new();
    Asn1Decoder::default().decode_complete(bytes, &mut container)?;
    container.take_message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Control, ControlValue, PagedResults};
    use crate::encoder::encode_message;
    use crate::filter::{Filter, MatchingRuleAssertion, SubstringFilter};
    use crate::message::*;
    use ldap_core::{Dn, Rdn, ResponseType, ResultCode};

    const COMPARE: [u8; 41] = [
        0x30, 0x27, 0x02, 0x01, 0x01, 0x6E, 0x22, 0x04, 0x11, b'c', b'n', b'=', b't', b'e', b's',
        b't', b',', b'o', b'u', b'=', b's', b'y', b's', b't', b'e', b'm', 0x30, 0x0D, 0x04, 0x04,
        b't', b'e', b's', b't', 0x04, 0x05, b'v', b'a', b'l', b'u', b'e',
    ];

    const UNBIND: [u8; 7] = [0x30, 0x05, 0x02, 0x01, 0x03, 0x42, 0x00];

    fn dn(s: &str) -> Dn {
        Dn::parse(s).unwrap()
    }

    fn round_trip(message: LdapMessage) {
        let bytes = encode_message(&message).unwrap();
        let decoded = decode_message(&bytes).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(encode_message(&decoded).unwrap(), bytes);
    }

    fn bind_with_version(version: &[u8]) -> Vec<u8> {
        let mut body = vec![0x02, version.len() as u8];
        body.extend_from_slice(version);
        body.extend_from_slice(&[0x04, 0x00, 0x80, 0x00]);
        let mut op = vec![0x60, body.len() as u8];
        op.extend(body);
        let mut message = vec![0x30, (op.len() + 3) as u8, 0x02, 0x01, 0x01];
        message.extend(op);
        message
    }

    #[test]
    fn test_empty_compare_request_rejected() {
        let err = decode_message(&[0x30, 0x05, 0x02, 0x01, 0x01, 0x6E, 0x00]).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFieldValue(_)));
    }

    #[test]
    fn test_compare_request_byte_identical() {
        let message = decode_message(&COMPARE).unwrap();
        assert_eq!(message.message_id, 1);
        let ProtocolOp::CompareRequest(request) = &message.op else {
            panic!("expected a compare request, got {}", message.op.name());
        };
        assert_eq!(request.entry.as_str(), "cn=test,ou=system");
        assert_eq!(request.attribute_desc, "test");
        assert_eq!(request.assertion_value, b"value");
        assert_eq!(&encode_message(&message).unwrap()[..], &COMPARE[..]);
    }

    #[test]
    fn test_one_byte_chunks() {
        let mut decoder = LdapDecoder::new();
        let mut input = BytesMut::new();
        for (i, byte) in COMPARE.iter().enumerate() {
            input.extend_from_slice(&[*byte]);
            let decoded = decoder.decode(&mut input).unwrap();
            if i + 1 < COMPARE.len() {
                assert!(decoded.is_none());
            } else {
                assert_eq!(decoded.unwrap(), decode_message(&COMPARE).unwrap());
            }
        }
        assert!(input.is_empty());
    }

    #[test]
    fn test_consecutive_messages() {
        let mut decoder = LdapDecoder::new();
        let mut input = BytesMut::from(&COMPARE[..]);
        input.extend_from_slice(&UNBIND);
        assert!(matches!(
            decoder.decode(&mut input).unwrap().map(|m| m.op),
            Some(ProtocolOp::CompareRequest(_))
        ));
        assert_eq!(
            decoder.decode(&mut input).unwrap().map(|m| m.op),
            Some(ProtocolOp::UnbindRequest)
        );
        assert_eq!(decoder.decode(&mut input).unwrap(), None);
    }

    #[test]
    fn test_invalid_modify_dn_entry() {
        let bytes = [
            0x30, 0x16, 0x02, 0x01, 0x02, 0x6C, 0x11, 0x04, 0x06, b'n', b'o', b't', b'a', b'd',
            b'n', 0x04, 0x04, b'c', b'n', b'=', b'b', 0x01, 0x01, 0xFF,
        ];
        let err = decode_message(&bytes).unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::InvalidDnSyntax));
        let response = err.response().unwrap();
        assert_eq!(response.message_id, 2);
        assert_eq!(response.response_type, ResponseType::ModifyDnResponse);
        assert!(response.matched_dn.is_empty());
    }

    #[test]
    fn test_recovery_after_rejected_message() {
        let mut input = BytesMut::from(
            &[
                0x30, 0x16, 0x02, 0x01, 0x02, 0x6C, 0x11, 0x04, 0x06, b'n', b'o', b't', b'a',
                b'd', b'n', 0x04, 0x04, b'c', b'n', b'=', b'b', 0x01, 0x01, 0xFF,
            ][..],
        );
        input.extend_from_slice(&UNBIND);

        let mut decoder = LdapDecoder::new();
        assert!(decoder.decode(&mut input).is_err());
        assert!(!decoder.is_closed());
        let message = decoder.decode(&mut input).unwrap().unwrap();
        assert_eq!(message.message_id, 3);
        assert_eq!(message.op, ProtocolOp::UnbindRequest);
    }

    #[test]
    fn test_skip_spans_chunks() {
        let rejected = [0x30, 0x05, 0x02, 0x01, 0x01, 0x6E, 0x00];
        let mut decoder = LdapDecoder::new();
        // the compare request header is rejected before its parent is exhausted
        let mut input = BytesMut::from(&[0x30, 0x07, 0x02, 0x01, 0x01, 0x6E, 0x00][..]);
        assert!(decoder.decode(&mut input).is_err());
        assert!(input.is_empty());

        input.extend_from_slice(&[0xAA, 0xBB]);
        input.extend_from_slice(&UNBIND);
        assert_eq!(
            decoder.decode(&mut input).unwrap().map(|m| m.message_id),
            Some(3)
        );

        let mut input = BytesMut::from(&rejected[..]);
        assert!(decoder.decode(&mut input).is_err());
        assert!(!decoder.is_closed());
    }

    #[test]
    fn test_length_overflow_closes_stream() {
        // the AVA sequence claims more bytes than the compare request holds
        let mut bytes = COMPARE;
        bytes[27] = 0x20;
        let mut input = BytesMut::from(&bytes[..]);
        let mut decoder = LdapDecoder::new();
        let err = decoder.decode(&mut input).unwrap_err();
        assert!(matches!(err, LdapError::MalformedLength(_)));
        assert!(decoder.is_closed());

        let mut input = BytesMut::from(&UNBIND[..]);
        assert!(matches!(
            decoder.decode(&mut input),
            Err(LdapError::StreamClosed(_))
        ));
        decoder.reset();
        assert!(decoder.decode(&mut input).unwrap().is_some());
    }

    #[test]
    fn test_bind_version_bounds() {
        assert!(matches!(
            decode_message(&bind_with_version(&[0x00])),
            Err(LdapError::InvalidFieldValue(_))
        ));
        assert!(matches!(
            decode_message(&bind_with_version(&[0x00, 0x80])),
            Err(LdapError::InvalidFieldValue(_))
        ));
        assert!(matches!(
            decode_message(&bind_with_version(&[])),
            Err(LdapError::InvalidFieldValue(_))
        ));
        for version in [1u8, 3, 127] {
            let message = decode_message(&bind_with_version(&[version])).unwrap();
            let ProtocolOp::BindRequest(request) = message.op else {
                panic!("expected a bind request");
            };
            assert_eq!(request.version, version);
        }
    }

    #[test]
    fn test_invalid_bind_name() {
        let message = LdapMessage::new(
            4,
            ProtocolOp::BindRequest(BindRequest::simple(Dn::root(), "secret")),
        );
        let mut bytes = encode_message(&message).unwrap().to_vec();
        // replace the empty name with "x"
        bytes.splice(10..12, [0x04, 0x01, b'x']);
        bytes[1] += 1;
        bytes[6] += 1;
        let err = decode_message(&bytes).unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::InvalidCredentials));
        assert_eq!(err.response().unwrap().response_type, ResponseType::BindResponse);
    }

    #[test]
    fn test_not_filter_with_two_children() {
        let bytes = [
            0x30, 0x22, 0x02, 0x01, 0x01, 0x63, 0x1D, 0x04, 0x00, 0x0A, 0x01, 0x00, 0x0A, 0x01,
            0x00, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x01, 0x01, 0x00, 0xA2, 0x08, 0x87, 0x02,
            b'c', b'n', 0x87, 0x02, b's', b'n', 0x30, 0x00,
        ];
        let err = decode_message(&bytes).unwrap_err();
        assert!(matches!(err, LdapError::InvalidFieldValue(_)));

        let mut single = bytes.to_vec();
        single.drain(30..34);
        single[1] -= 4;
        single[6] -= 4;
        single[25] -= 4;
        let message = decode_message(&single).unwrap();
        let ProtocolOp::SearchRequest(request) = message.op else {
            panic!("expected a search request");
        };
        assert_eq!(request.filter, Filter::not(Filter::present("cn")));
        assert_eq!(request.filter.to_string(), "(!(cn=*))");
    }

    #[test]
    fn test_unexpected_tag() {
        let err = decode_message(&[0x30, 0x05, 0x02, 0x01, 0x01, 0x04, 0x00]).unwrap_err();
        assert_eq!(
            err,
            LdapError::UnexpectedTag {
                state: "MessageId".to_string(),
                tag: 0x04
            }
        );
    }

    #[test]
    fn test_round_trip_bind() {
        round_trip(LdapMessage::new(
            1,
            ProtocolOp::BindRequest(BindRequest::simple(dn("uid=admin,ou=system"), "secret")),
        ));
        round_trip(LdapMessage::new(
            2,
            ProtocolOp::BindRequest(BindRequest::sasl(Dn::root(), "EXTERNAL", None)),
        ));
        round_trip(LdapMessage::new(
            3,
            ProtocolOp::BindRequest(BindRequest::sasl(
                Dn::root(),
                "DIGEST-MD5",
                Some(b"response".to_vec()),
            )),
        ));
        let mut response = BindResponse::new(OperationResult::new(ResultCode::SaslBindInProgress));
        response.server_sasl_creds = Some(b"challenge".to_vec());
        round_trip(LdapMessage::new(3, ProtocolOp::BindResponse(response)));
    }

    #[test]
    fn test_round_trip_search() {
        let filter = Filter::and(vec![
            Filter::equality("objectClass", "person"),
            Filter::or(vec![
                Filter::present("mail"),
                Filter::substrings(
                    SubstringFilter::new("cn")
                        .with_initial("Jo")
                        .with_any("h")
                        .with_any("n")
                        .with_final("son"),
                ),
            ]),
            Filter::not(Filter::greater_or_equal("age", "18")),
            Filter::less_or_equal("age", "65"),
            Filter::approx("sn", "smith"),
            Filter::extensible(MatchingRuleAssertion {
                matching_rule: Some("2.5.13.2".to_string()),
                attribute_type: Some("cn".to_string()),
                match_value: b"x".to_vec(),
                dn_attributes: true,
            }),
            Filter::and(Vec::new()),
        ]);
        let mut request = SearchRequest::new(dn("ou=people,dc=example,dc=com"), filter)
            .with_scope(SearchScope::SingleLevel)
            .with_attributes(vec!["cn".to_string(), "mail".to_string()]);
        request.size_limit = 1000;
        request.time_limit = 30;
        request.types_only = true;
        request.deref_aliases = DerefAliases::NeverDerefAliases;
        round_trip(LdapMessage::new(7, ProtocolOp::SearchRequest(request)));

        round_trip(LdapMessage::new(
            8,
            ProtocolOp::SearchRequest(SearchRequest::new(Dn::root(), Filter::present("objectClass"))),
        ));
    }

    #[test]
    fn test_round_trip_search_results() {
        let entry = SearchResultEntry::new(dn("cn=a,ou=system"))
            .with_attribute(Attribute::new("cn").with_value("a"))
            .with_attribute(Attribute::new("objectClass").with_value("top").with_value("person"))
            .with_attribute(Attribute::new("empty"));
        round_trip(LdapMessage::new(7, ProtocolOp::SearchResultEntry(entry)));
        round_trip(LdapMessage::new(
            7,
            ProtocolOp::SearchResultEntry(SearchResultEntry::new(Dn::root())),
        ));
        round_trip(LdapMessage::new(
            7,
            ProtocolOp::SearchResultReference(SearchResultReference {
                uris: vec!["ldap://a/".to_string(), "ldap://b/".to_string()],
            }),
        ));
        round_trip(LdapMessage::new(
            7,
            ProtocolOp::SearchResultDone(
                OperationResult::new(ResultCode::Referral)
                    .with_diagnostic_message("see elsewhere")
                    .with_referral(vec!["ldap://c/".to_string()]),
            ),
        ));
    }

    #[test]
    fn test_round_trip_updates() {
        let modify = ModifyRequest::new(dn("cn=a,ou=system"))
            .with_change(Change::new(
                ModifyOperation::Replace,
                Attribute::new("sn").with_value("b"),
            ))
            .with_change(Change::new(ModifyOperation::Delete, Attribute::new("mail")))
            .with_change(Change::new(
                ModifyOperation::Increment,
                Attribute::new("uidNumber").with_value("1"),
            ));
        round_trip(LdapMessage::new(2, ProtocolOp::ModifyRequest(modify)));

        let add = AddRequest::new(dn("cn=b,ou=system"))
            .with_attribute(Attribute::new("objectClass").with_value("top").with_value("person"))
            .with_attribute(Attribute::new("cn").with_value("b"));
        round_trip(LdapMessage::new(3, ProtocolOp::AddRequest(add)));

        round_trip(LdapMessage::new(4, ProtocolOp::DelRequest(dn("cn=b,ou=system"))));

        let modify_dn = ModifyDnRequest::new(dn("cn=a,ou=system"), Rdn::parse("cn=c").unwrap(), true)
            .with_new_superior(dn("ou=people"));
        round_trip(LdapMessage::new(5, ProtocolOp::ModifyDnRequest(modify_dn)));
        round_trip(LdapMessage::new(
            5,
            ProtocolOp::ModifyDnRequest(ModifyDnRequest::new(
                dn("cn=a,ou=system"),
                Rdn::parse("cn=c").unwrap(),
                false,
            )),
        ));

        for op in [
            ProtocolOp::ModifyResponse(OperationResult::success()),
            ProtocolOp::AddResponse(OperationResult::new(ResultCode::EntryAlreadyExists)),
            ProtocolOp::DelResponse(OperationResult::new(ResultCode::NoSuchObject).with_matched_dn("ou=system")),
            ProtocolOp::ModifyDnResponse(OperationResult::success()),
            ProtocolOp::CompareResponse(OperationResult::new(ResultCode::CompareTrue)),
        ] {
            round_trip(LdapMessage::new(6, op));
        }
    }

    #[test]
    fn test_round_trip_misc_operations() {
        round_trip(LdapMessage::new(9, ProtocolOp::AbandonRequest(300)));
        round_trip(LdapMessage::new(9, ProtocolOp::UnbindRequest));
        round_trip(LdapMessage::new(
            10,
            ProtocolOp::ExtendedRequest(ExtendedRequest::new("1.3.6.1.4.1.1466.20037")),
        ));
        round_trip(LdapMessage::new(
            10,
            ProtocolOp::ExtendedRequest(ExtendedRequest::new("1.3.6.1.4.1.4203.1.11.1").with_value(vec![0x30, 0x00])),
        ));
        let mut extended = ExtendedResponse::new(OperationResult::success());
        extended.response_name = Some("1.3.6.1.4.1.1466.20037".to_string());
        extended.response_value = Some(Vec::new());
        round_trip(LdapMessage::new(10, ProtocolOp::ExtendedResponse(extended)));
        round_trip(LdapMessage::new(
            11,
            ProtocolOp::IntermediateResponse(IntermediateResponse::default()),
        ));
        round_trip(LdapMessage::new(
            11,
            ProtocolOp::IntermediateResponse(IntermediateResponse {
                response_name: None,
                response_value: Some(b"sync".to_vec()),
            }),
        ));
    }

    #[test]
    fn test_round_trip_controls() {
        let message = LdapMessage::new(
            12,
            ProtocolOp::SearchRequest(SearchRequest::new(Dn::root(), Filter::present("cn"))),
        )
        .with_control(Control::paged_results(50, b"cookie".to_vec()).with_criticality(true))
        .with_control(Control::subentries(true))
        .with_control(Control::manage_dsa_it())
        .with_control(Control::new("1.2.3.4").with_value(ControlValue::Opaque(vec![0x01, 0x02])));
        round_trip(message.clone());

        let decoded = decode_message(&encode_message(&message).unwrap()).unwrap();
        let paged = decoded.control(crate::controls::paged_results::OID).unwrap();
        assert!(paged.criticality);
        assert_eq!(
            paged.value,
            Some(ControlValue::PagedResults(PagedResults::new(50, b"cookie".to_vec())))
        );

        round_trip(LdapMessage::new(13, ProtocolOp::DelRequest(dn("cn=x"))).with_control(Control::manage_dsa_it()));
    }

    #[test]
    fn test_add_attribute_without_value() {
        let add = AddRequest::new(dn("cn=b,ou=system")).with_attribute(Attribute::new("cn"));
        let bytes = encode_message(&LdapMessage::new(3, ProtocolOp::AddRequest(add))).unwrap();
        assert!(decode_message(&bytes).is_err());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = UNBIND.to_vec();
        bytes.push(0x30);
        assert!(matches!(
            decode_message(&bytes),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    /// Short form TLV
    fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        assert!(content.len() < 0x80);
        let mut bytes = vec![tag, content.len() as u8];
        bytes.extend_from_slice(content);
        bytes
    }

    /// LDAPMessage with id 7 around the given operation bytes
    fn message(op: &[u8]) -> Vec<u8> {
        let mut content = vec![0x02, 0x01, 0x07];
        content.extend_from_slice(op);
        tlv(0x30, &content)
    }

    /// Search request fields from the scope up to typesOnly
    const SEARCH_FIELDS: [u8; 15] = [
        0x0A, 0x01, 0x00, 0x0A, 0x01, 0x00, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x01, 0x01, 0x00,
    ];

    fn search_request(filter: &[u8], selection: &[u8]) -> Vec<u8> {
        let mut content = tlv(0x04, b"");
        content.extend_from_slice(&SEARCH_FIELDS);
        content.extend_from_slice(filter);
        content.extend_from_slice(selection);
        tlv(0x63, &content)
    }

    fn assert_rejected(bytes: &[u8], result_code: ResultCode, response_type: ResponseType) {
        let err = decode_message(bytes).unwrap_err();
        assert_eq!(err.result_code(), Some(result_code), "{}", err);
        let response = err.response().unwrap();
        assert_eq!(response.response_type, response_type);
        assert_eq!(response.message_id, 7);
    }

    #[test]
    fn test_selected_attribute_outside_search_request() {
        let present = tlv(0x87, b"cn");
        let inside = message(&search_request(&present, &tlv(0x30, &tlv(0x04, b"foo"))));
        let ProtocolOp::SearchRequest(request) = decode_message(&inside).unwrap().op else {
            panic!("expected a search request");
        };
        assert_eq!(request.attributes, vec!["foo".to_string()]);

        let mut op = search_request(&present, &tlv(0x30, &[]));
        op.extend(tlv(0x04, b"foo"));
        assert!(matches!(
            decode_message(&message(&op)),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_empty_selected_attribute() {
        let bytes = message(&search_request(&tlv(0x87, b"cn"), &tlv(0x30, &tlv(0x04, b""))));
        let decoded = decode_message(&bytes).unwrap();
        let ProtocolOp::SearchRequest(request) = &decoded.op else {
            panic!("expected a search request");
        };
        assert_eq!(request.attributes, vec![String::new()]);
        assert_eq!(&encode_message(&decoded).unwrap()[..], &bytes[..]);
    }

    #[test]
    fn test_substring_outside_filter() {
        let substrings = tlv(0xA4, &[tlv(0x04, b"cn"), tlv(0x30, &tlv(0x80, b"a"))].concat());
        let mut op = search_request(&substrings, &[]);
        op.extend(tlv(0x81, b"b"));
        assert!(matches!(
            decode_message(&message(&op)),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_compare_value_outside_assertion() {
        let mut op = tlv(
            0x6E,
            &[tlv(0x04, b"cn=a"), tlv(0x30, &tlv(0x04, b"test"))].concat(),
        );
        op.extend(tlv(0x04, b"v"));
        assert!(matches!(
            decode_message(&message(&op)),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_modification_outside_change() {
        let changes = tlv(
            0x30,
            &[
                tlv(0x30, &tlv(0x0A, &[0x00])),
                tlv(0x30, &[tlv(0x04, b"sn"), tlv(0x31, &[])].concat()),
            ]
            .concat(),
        );
        let op = tlv(0x66, &[tlv(0x04, b"cn=a"), changes].concat());
        assert!(matches!(
            decode_message(&message(&op)),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_attribute_type_outside_attribute() {
        let list = tlv(
            0x30,
            &[tlv(0x30, &[]), tlv(0x04, b"cn"), tlv(0x31, &tlv(0x04, b"a"))].concat(),
        );
        let op = tlv(0x68, &[tlv(0x04, b"cn=a"), list].concat());
        assert!(matches!(
            decode_message(&message(&op)),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_control_field_outside_control() {
        let controls = tlv(0xA0, &tlv(0x30, &tlv(0x04, b"1.2.3")));
        let valid = message(&[vec![0x42, 0x00], controls.clone()].concat());
        assert_eq!(decode_message(&valid).unwrap().controls.len(), 1);

        let bytes = message(&[vec![0x42, 0x00], controls, tlv(0x01, &[0xFF])].concat());
        assert!(matches!(
            decode_message(&bytes),
            Err(LdapError::InvalidFieldValue(_))
        ));
    }

    #[test]
    fn test_invalid_search_base() {
        assert_rejected(
            &message(&tlv(0x63, &tlv(0x04, b"x"))),
            ResultCode::InvalidDnSyntax,
            ResponseType::SearchResultDone,
        );
    }

    #[test]
    fn test_invalid_add_entry() {
        assert_rejected(
            &message(&tlv(0x68, &tlv(0x04, b"x"))),
            ResultCode::InvalidDnSyntax,
            ResponseType::AddResponse,
        );
    }

    #[test]
    fn test_invalid_del_entry() {
        assert_rejected(
            &message(&tlv(0x4A, b"x")),
            ResultCode::InvalidDnSyntax,
            ResponseType::DelResponse,
        );
    }

    #[test]
    fn test_invalid_modify_object() {
        assert_rejected(
            &message(&tlv(0x66, &tlv(0x04, b"x"))),
            ResultCode::InvalidDnSyntax,
            ResponseType::ModifyResponse,
        );
    }

    #[test]
    fn test_invalid_compare_entry() {
        assert_rejected(
            &message(&tlv(0x6E, &tlv(0x04, b"x"))),
            ResultCode::InvalidDnSyntax,
            ResponseType::CompareResponse,
        );
    }

    #[test]
    fn test_invalid_new_rdn() {
        assert_rejected(
            &message(&tlv(0x6C, &[tlv(0x04, b"cn=a"), tlv(0x04, b"x")].concat())),
            ResultCode::InvalidDnSyntax,
            ResponseType::ModifyDnResponse,
        );
    }

    #[test]
    fn test_invalid_new_superior() {
        let op = tlv(
            0x6C,
            &[
                tlv(0x04, b"cn=a"),
                tlv(0x04, b"cn=b"),
                tlv(0x01, &[0xFF]),
                tlv(0x80, b"x"),
            ]
            .concat(),
        );
        assert_rejected(&message(&op), ResultCode::InvalidDnSyntax, ResponseType::ModifyDnResponse);
    }

    #[test]
    fn test_invalid_compare_attribute() {
        let op = tlv(
            0x6E,
            &[tlv(0x04, b"cn=a"), tlv(0x30, &tlv(0x04, b"c n"))].concat(),
        );
        assert_rejected(
            &message(&op),
            ResultCode::InvalidAttributeSyntax,
            ResponseType::CompareResponse,
        );
    }

    #[test]
    fn test_root_entry_rejected() {
        let cases = [
            (tlv(0x68, &tlv(0x04, b"")), ResponseType::AddResponse),
            (tlv(0x4A, b""), ResponseType::DelResponse),
            (tlv(0x66, &tlv(0x04, b"")), ResponseType::ModifyResponse),
            (tlv(0x6C, &tlv(0x04, b"")), ResponseType::ModifyDnResponse),
            (tlv(0x6E, &tlv(0x04, b"")), ResponseType::CompareResponse),
        ];
        for (op, response_type) in cases {
            assert_rejected(&message(&op), ResultCode::InvalidDnSyntax, response_type);
        }
    }
}
