//! Grammar actions
//!
//! Each action runs once the transition that names it has been taken, and
//! reads the current TLV from the container. Primitive values are fully
//! buffered at that point; for a constructed TLV only the header is known.

use crate::container::LdapMessageContainer;
use crate::controls::{Control, ControlValue, CONTROLS_TAG};
use crate::error::{LdapError, LdapResult};
use crate::filter::{
    AttributeValueAssertion, Filter, FilterKind, MatchingRuleAssertion, SubstringFilter,
};
use crate::message::bind::tag as bind_tag;
use crate::message::result::REFERRAL_TAG;
use crate::message::tag as op_tag;
use crate::message::{
    AddRequest, Attribute, Authentication, BindRequest, BindResponse, Change, CompareRequest,
    DerefAliases, ExtendedRequest, ExtendedResponse, IntermediateResponse, ModifyDnRequest,
    ModifyOperation, ModifyRequest, OperationResult, ProtocolOp, SearchRequest, SearchResultEntry,
    SearchResultReference, SearchScope,
};
use ldap_asn1::ber::decoder::{
    decode_boolean, decode_integer, decode_null, decode_octet_string, decode_utf8, IntegerBounds,
};
use ldap_asn1::ber::types::universal;
use ldap_core::dn::is_valid_attribute_description;
use ldap_core::{Dn, ErrorResponse, Rdn, ResponseType, ResultCode};

fn value(c: &LdapMessageContainer) -> LdapResult<&[u8]> {
    c.core.value()
}

fn expect_parent(c: &LdapMessageContainer, tag: u8, element: &str) -> LdapResult<()> {
    match c.core.parent_tag() {
        Some(parent) if parent == tag => Ok(()),
        Some(parent) => Err(LdapError::InvalidFieldValue(format!(
            "{} found in 0x{:02X}, expected in 0x{:02X}",
            element, parent, tag
        ))),
        None => Err(LdapError::InvalidFieldValue(format!(
            "{} found outside the message",
            element
        ))),
    }
}

fn expect_depth(c: &LdapMessageContainer, depth: usize, element: &str) -> LdapResult<()> {
    if c.core.depth() == depth {
        Ok(())
    } else {
        Err(LdapError::InvalidFieldValue(format!(
            "{} found at nesting level {}, expected {}",
            element,
            c.core.depth(),
            depth
        )))
    }
}

/// The element must sit at `depth` directly under a `tag` TLV
///
/// Several enclosing TLVs share the SEQUENCE tag, so the parent tag alone
/// does not say which one holds the element.
fn expect_nested(c: &LdapMessageContainer, tag: u8, depth: usize, element: &str) -> LdapResult<()> {
    expect_parent(c, tag, element)?;
    expect_depth(c, depth, element)
}

/// The element must be a direct child of the operation being decoded
fn expect_op_parent(c: &LdapMessageContainer, element: &str) -> LdapResult<()> {
    match c.op.as_ref().map(ProtocolOp::tag) {
        Some(tag) => expect_parent(c, tag, element),
        None => Err(LdapError::InvalidFieldValue(format!(
            "{} found before the operation",
            element
        ))),
    }
}

fn reject_empty(c: &LdapMessageContainer, element: &str) -> LdapResult<()> {
    if c.core.tlv()?.length() == 0 {
        return Err(LdapError::InvalidFieldValue(format!("Empty {}", element)));
    }
    Ok(())
}

fn set_end_allowed(c: &mut LdapMessageContainer) {
    c.core.set_end_allowed(true);
}

/// Build the error for a request field that can be answered with a
/// negative response
fn rejected(
    c: &LdapMessageContainer,
    response_type: ResponseType,
    result_code: ResultCode,
    message: String,
) -> LdapError {
    let response = ErrorResponse::new(c.message_id, response_type, result_code, message.clone());
    LdapError::with_response(message, response)
}

/// Decode a DN, answering a malformed one with `result_code`
fn decode_name(
    c: &LdapMessageContainer,
    response_type: ResponseType,
    result_code: ResultCode,
    element: &str,
) -> LdapResult<Dn> {
    let bytes = value(c)?;
    Dn::from_bytes(bytes).map_err(|_| {
        rejected(
            c,
            response_type,
            result_code,
            format!("Invalid {} '{}'", element, String::from_utf8_lossy(bytes)),
        )
    })
}

/// Decode the DN of the entry an update targets, which cannot be the root
fn decode_entry_name(c: &LdapMessageContainer, response_type: ResponseType) -> LdapResult<Dn> {
    let dn = decode_name(c, response_type, ResultCode::InvalidDnSyntax, "entry")?;
    if dn.is_root() {
        return Err(rejected(
            c,
            response_type,
            ResultCode::InvalidDnSyntax,
            "Empty entry name".to_string(),
        ));
    }
    Ok(dn)
}

fn wrong_op(element: &str) -> LdapError {
    LdapError::InvalidFieldValue(format!("Element not valid in this operation: {}", element))
}

macro_rules! op_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(c: &mut LdapMessageContainer) -> LdapResult<&mut $ty> {
            match c.op.as_mut() {
                Some(ProtocolOp::$variant(inner)) => Ok(inner),
                _ => Err(wrong_op(stringify!($variant))),
            }
        }
    };
}

op_accessor!(bind_request, BindRequest, BindRequest);
op_accessor!(bind_response, BindResponse, BindResponse);
op_accessor!(search_request, SearchRequest, SearchRequest);
op_accessor!(search_result_reference, SearchResultReference, SearchResultReference);
op_accessor!(modify_request, ModifyRequest, ModifyRequest);
op_accessor!(modify_dn_request, ModifyDnRequest, ModifyDnRequest);
op_accessor!(compare_request, CompareRequest, CompareRequest);
op_accessor!(extended_request, ExtendedRequest, ExtendedRequest);
op_accessor!(extended_response, ExtendedResponse, ExtendedResponse);
op_accessor!(intermediate_response, IntermediateResponse, IntermediateResponse);

fn operation_result(c: &mut LdapMessageContainer) -> LdapResult<&mut OperationResult> {
    c.op
        .as_mut()
        .and_then(ProtocolOp::result_mut)
        .ok_or_else(|| wrong_op("LDAPResult"))
}

/// Attribute list of a search result entry or an add request
fn attributes(c: &mut LdapMessageContainer) -> LdapResult<&mut Vec<Attribute>> {
    match c.op.as_mut() {
        Some(ProtocolOp::SearchResultEntry(entry)) => Ok(&mut entry.attributes),
        Some(ProtocolOp::AddRequest(request)) => Ok(&mut request.attributes),
        _ => Err(wrong_op("AttributeList")),
    }
}

fn last_attribute(c: &mut LdapMessageContainer) -> LdapResult<&mut Attribute> {
    attributes(c)?
        .last_mut()
        .ok_or_else(|| LdapError::InvalidFieldValue("Attribute element before its attribute".to_string()))
}

fn last_change(c: &mut LdapMessageContainer) -> LdapResult<&mut Change> {
    modify_request(c)?
        .changes
        .last_mut()
        .ok_or_else(|| LdapError::InvalidFieldValue("Change element before its change".to_string()))
}

fn last_control(c: &mut LdapMessageContainer) -> LdapResult<&mut Control> {
    c.controls
        .last_mut()
        .ok_or_else(|| LdapError::InvalidFieldValue("Control element before its control".to_string()))
}

/// Every attribute of an add request needs at least one value
fn check_add_values(c: &LdapMessageContainer) -> LdapResult<()> {
    if let Some(ProtocolOp::AddRequest(request)) = &c.op {
        if let Some(attribute) = request.attributes.last() {
            if attribute.values.is_empty() {
                return Err(LdapError::InvalidFieldValue(format!(
                    "Attribute '{}' of an add request has no value",
                    attribute.description
                )));
            }
        }
    }
    Ok(())
}

// LDAPMessage

pub(super) fn init_message(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "LDAPMessage")
}

pub(super) fn store_message_id(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let id = decode_integer(value(c)?, IntegerBounds::MESSAGE_ID)?;
    c.message_id = id as i32;
    log::trace!("message id {}", id);
    Ok(())
}

// BindRequest

pub(super) fn init_bind_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "BindRequest")?;
    c.op = Some(ProtocolOp::BindRequest(BindRequest::default()));
    Ok(())
}

pub(super) fn store_bind_version(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::BIND_REQUEST, "Bind version")?;
    let version = decode_integer(value(c)?, IntegerBounds::PROTOCOL_VERSION)?;
    bind_request(c)?.version = version as u8;
    Ok(())
}

pub(super) fn store_bind_name(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::BIND_REQUEST, "Bind name")?;
    let name = decode_name(
        c,
        ResponseType::BindResponse,
        ResultCode::InvalidCredentials,
        "bind name",
    )?;
    bind_request(c)?.name = name;
    Ok(())
}

pub(super) fn store_simple_credentials(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::BIND_REQUEST, "Simple credentials")?;
    let password = value(c)?.to_vec();
    bind_request(c)?.authentication = Authentication::Simple(password);
    set_end_allowed(c);
    Ok(())
}

pub(super) fn init_sasl(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::BIND_REQUEST, "SASL credentials")?;
    bind_request(c)?.authentication = Authentication::Sasl {
        mechanism: String::new(),
        credentials: None,
    };
    Ok(())
}

pub(super) fn store_sasl_mechanism(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, bind_tag::SASL, "SASL mechanism")?;
    let decoded = decode_utf8(value(c)?, false)?;
    if let Authentication::Sasl { mechanism, .. } = &mut bind_request(c)?.authentication {
        *mechanism = decoded;
    }
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_sasl_credentials(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, bind_tag::SASL, "SASL credentials")?;
    let decoded = value(c)?.to_vec();
    if let Authentication::Sasl { credentials, .. } = &mut bind_request(c)?.authentication {
        *credentials = Some(decoded);
    }
    set_end_allowed(c);
    Ok(())
}

// LDAPResult

pub(super) fn init_response(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let tag = c.core.tlv()?.tag().to_byte();
    reject_empty(c, "response")?;
    let op = match tag {
        Some(op_tag::BIND_RESPONSE) => ProtocolOp::BindResponse(BindResponse::default()),
        Some(op_tag::SEARCH_RESULT_DONE) => ProtocolOp::SearchResultDone(OperationResult::default()),
        Some(op_tag::MODIFY_RESPONSE) => ProtocolOp::ModifyResponse(OperationResult::default()),
        Some(op_tag::ADD_RESPONSE) => ProtocolOp::AddResponse(OperationResult::default()),
        Some(op_tag::DEL_RESPONSE) => ProtocolOp::DelResponse(OperationResult::default()),
        Some(op_tag::MODIFY_DN_RESPONSE) => ProtocolOp::ModifyDnResponse(OperationResult::default()),
        Some(op_tag::COMPARE_RESPONSE) => ProtocolOp::CompareResponse(OperationResult::default()),
        Some(op_tag::EXTENDED_RESPONSE) => ProtocolOp::ExtendedResponse(ExtendedResponse::default()),
        _ => return Err(wrong_op("response")),
    };
    c.op = Some(op);
    Ok(())
}

pub(super) fn store_result_code(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Result code")?;
    let code = decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?;
    operation_result(c)?.result_code = ResultCode::from_u32(code as u32);
    Ok(())
}

pub(super) fn store_matched_dn(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Matched DN")?;
    let matched_dn = decode_utf8(value(c)?, true)?;
    operation_result(c)?.matched_dn = matched_dn;
    Ok(())
}

pub(super) fn store_diagnostic_message(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Diagnostic message")?;
    let message = decode_utf8(value(c)?, true)?;
    operation_result(c)?.diagnostic_message = message;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn init_referral(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Referral")?;
    reject_empty(c, "referral")
}

pub(super) fn store_referral_uri(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, REFERRAL_TAG, "Referral URI")?;
    let uri = decode_utf8(value(c)?, false)?;
    operation_result(c)?.referral.push(uri);
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_server_sasl_creds(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Server SASL credentials")?;
    let credentials = value(c)?.to_vec();
    bind_response(c)?.server_sasl_creds = Some(credentials);
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_extended_response_name(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Extended response name")?;
    let name = decode_utf8(value(c)?, false)?;
    extended_response(c)?.response_name = Some(name);
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_extended_response_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Extended response value")?;
    let response_value = value(c)?.to_vec();
    extended_response(c)?.response_value = Some(response_value);
    set_end_allowed(c);
    Ok(())
}

// UnbindRequest

pub(super) fn store_unbind_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    decode_null(value(c)?)?;
    c.op = Some(ProtocolOp::UnbindRequest);
    set_end_allowed(c);
    Ok(())
}

// SearchRequest

pub(super) fn init_search_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "SearchRequest")?;
    c.op = Some(ProtocolOp::SearchRequest(SearchRequest::default()));
    Ok(())
}

pub(super) fn store_search_base(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Search base")?;
    let base = decode_name(
        c,
        ResponseType::SearchResultDone,
        ResultCode::InvalidDnSyntax,
        "search base",
    )?;
    search_request(c)?.base = base;
    Ok(())
}

pub(super) fn store_search_scope(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Search scope")?;
    let scope = SearchScope::from_value(decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?)?;
    search_request(c)?.scope = scope;
    Ok(())
}

pub(super) fn store_deref_aliases(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Alias dereferencing")?;
    let deref = DerefAliases::from_value(decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?)?;
    search_request(c)?.deref_aliases = deref;
    Ok(())
}

pub(super) fn store_size_limit(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Size limit")?;
    let limit = decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?;
    search_request(c)?.size_limit = limit as i32;
    Ok(())
}

pub(super) fn store_time_limit(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Time limit")?;
    let limit = decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?;
    search_request(c)?.time_limit = limit as i32;
    Ok(())
}

pub(super) fn store_types_only(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Types only")?;
    let types_only = decode_boolean(value(c)?)?;
    search_request(c)?.types_only = types_only;
    Ok(())
}

pub(super) fn init_search_attributes(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_REQUEST, "Attribute selection")?;
    let filter = c.finish_filter()?;
    log::trace!("search filter {}", filter);
    search_request(c)?.filter = filter;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_search_attribute(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Selected attribute")?;
    let attribute = decode_utf8(value(c)?, true)?;
    search_request(c)?.attributes.push(attribute);
    set_end_allowed(c);
    Ok(())
}

// Filters

pub(super) fn init_and_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::and(Vec::new()))
}

pub(super) fn init_or_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::or(Vec::new()))
}

pub(super) fn init_not_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::Not(None)))
}

pub(super) fn init_equality_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::EqualityMatch(AttributeValueAssertion::default())))
}

pub(super) fn init_greater_or_equal_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::GreaterOrEqual(AttributeValueAssertion::default())))
}

pub(super) fn init_less_or_equal_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::LessOrEqual(AttributeValueAssertion::default())))
}

pub(super) fn init_approx_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::ApproxMatch(AttributeValueAssertion::default())))
}

pub(super) fn store_present_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let attribute = decode_utf8(value(c)?, false)?;
    c.push_filter(Filter::present(attribute))
}

pub(super) fn init_substrings_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::Substrings(SubstringFilter::default())))
}

pub(super) fn init_extensible_filter(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.push_filter(Filter::new(FilterKind::ExtensibleMatch(MatchingRuleAssertion::default())))
}

/// The element must belong to the innermost filter under construction
fn expect_filter_parent(c: &mut LdapMessageContainer, element: &str) -> LdapResult<()> {
    let tag = c.current_filter_mut()?.tag();
    expect_open_filter(c, element)?;
    expect_parent(c, tag, element)
}

fn expect_open_filter(c: &LdapMessageContainer, element: &str) -> LdapResult<()> {
    if c.current_filter_open() {
        Ok(())
    } else {
        Err(LdapError::InvalidFieldValue(format!(
            "{} found outside its filter",
            element
        )))
    }
}

fn ava(c: &mut LdapMessageContainer) -> LdapResult<&mut AttributeValueAssertion> {
    match c.current_filter_mut()?.kind_mut() {
        FilterKind::EqualityMatch(ava)
        | FilterKind::GreaterOrEqual(ava)
        | FilterKind::LessOrEqual(ava)
        | FilterKind::ApproxMatch(ava) => Ok(ava),
        _ => Err(wrong_op("AttributeValueAssertion")),
    }
}

fn substrings(c: &mut LdapMessageContainer) -> LdapResult<&mut SubstringFilter> {
    match c.current_filter_mut()?.kind_mut() {
        FilterKind::Substrings(substrings) => Ok(substrings),
        _ => Err(wrong_op("SubstringFilter")),
    }
}

fn matching_rule_assertion(c: &mut LdapMessageContainer) -> LdapResult<&mut MatchingRuleAssertion> {
    match c.current_filter_mut()?.kind_mut() {
        FilterKind::ExtensibleMatch(assertion) => Ok(assertion),
        _ => Err(wrong_op("MatchingRuleAssertion")),
    }
}

pub(super) fn store_ava_desc(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Assertion attribute")?;
    let desc = decode_utf8(value(c)?, false)?;
    ava(c)?.attribute_desc = desc;
    Ok(())
}

pub(super) fn store_ava_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Assertion value")?;
    let assertion_value = value(c)?.to_vec();
    ava(c)?.assertion_value = assertion_value;
    Ok(())
}

pub(super) fn store_substrings_type(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Substrings type")?;
    let attribute_type = decode_utf8(value(c)?, false)?;
    substrings(c)?.attribute_type = attribute_type;
    Ok(())
}

pub(super) fn init_substrings_list(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Substrings")?;
    reject_empty(c, "substring list")
}

/// Substring elements sit in the SEQUENCE of the innermost open filter
fn substring_value(c: &LdapMessageContainer, element: &str) -> LdapResult<Vec<u8>> {
    expect_open_filter(c, element)?;
    expect_parent(c, universal::SEQUENCE, element)?;
    Ok(decode_octet_string(value(c)?, false)?.to_vec())
}

pub(super) fn store_substring_initial(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let initial = substring_value(c, "Initial substring")?;
    substrings(c)?.initial = Some(initial);
    Ok(())
}

pub(super) fn store_substring_any(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let any = substring_value(c, "Any substring")?;
    substrings(c)?.any.push(any);
    Ok(())
}

pub(super) fn store_substring_final(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let final_value = substring_value(c, "Final substring")?;
    substrings(c)?.final_value = Some(final_value);
    Ok(())
}

pub(super) fn store_matching_rule(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Matching rule")?;
    let rule = decode_utf8(value(c)?, false)?;
    matching_rule_assertion(c)?.matching_rule = Some(rule);
    Ok(())
}

pub(super) fn store_matching_type(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Matching type")?;
    let attribute_type = decode_utf8(value(c)?, false)?;
    matching_rule_assertion(c)?.attribute_type = Some(attribute_type);
    Ok(())
}

pub(super) fn store_match_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "Match value")?;
    let match_value = value(c)?.to_vec();
    let assertion = matching_rule_assertion(c)?;
    if assertion.matching_rule.is_none() && assertion.attribute_type.is_none() {
        return Err(LdapError::InvalidFieldValue(
            "Extensible match needs a matching rule or an attribute type".to_string(),
        ));
    }
    assertion.match_value = match_value;
    Ok(())
}

pub(super) fn store_dn_attributes(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_filter_parent(c, "DN attributes")?;
    let dn_attributes = decode_boolean(value(c)?)?;
    matching_rule_assertion(c)?.dn_attributes = dn_attributes;
    Ok(())
}

// SearchResultEntry, AddRequest

pub(super) fn init_search_result_entry(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "SearchResultEntry")?;
    c.op = Some(ProtocolOp::SearchResultEntry(SearchResultEntry::default()));
    Ok(())
}

pub(super) fn store_object_name(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_RESULT_ENTRY, "Object name")?;
    let object_name = Dn::from_bytes(value(c)?)?;
    if let Some(ProtocolOp::SearchResultEntry(entry)) = c.op.as_mut() {
        entry.object_name = object_name;
    }
    Ok(())
}

pub(super) fn init_add_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "AddRequest")?;
    c.op = Some(ProtocolOp::AddRequest(AddRequest::default()));
    Ok(())
}

pub(super) fn store_add_entry(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::ADD_REQUEST, "Add entry")?;
    let entry = decode_entry_name(c, ResponseType::AddResponse)?;
    if let Some(ProtocolOp::AddRequest(request)) = c.op.as_mut() {
        request.entry = entry;
    }
    Ok(())
}

fn is_search_result_entry(c: &LdapMessageContainer) -> bool {
    matches!(c.op, Some(ProtocolOp::SearchResultEntry(_)))
}

pub(super) fn init_attribute_list(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_op_parent(c, "Attribute list")?;
    let end_allowed = is_search_result_entry(c);
    c.core.set_end_allowed(end_allowed);
    Ok(())
}

pub(super) fn init_attribute(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Attribute")?;
    check_add_values(c)?;
    attributes(c)?.push(Attribute::default());
    Ok(())
}

pub(super) fn store_attribute_type(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 4, "Attribute type")?;
    let description = decode_utf8(value(c)?, false)?;
    last_attribute(c)?.description = description;
    Ok(())
}

pub(super) fn init_attribute_values(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 4, "Attribute values")?;
    let end_allowed = is_search_result_entry(c);
    c.core.set_end_allowed(end_allowed);
    Ok(())
}

pub(super) fn store_attribute_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SET, 5, "Attribute value")?;
    let attribute_value = value(c)?.to_vec();
    last_attribute(c)?.values.push(attribute_value);
    set_end_allowed(c);
    Ok(())
}

// SearchResultReference

pub(super) fn init_search_result_reference(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "SearchResultReference")?;
    c.op = Some(ProtocolOp::SearchResultReference(SearchResultReference::default()));
    Ok(())
}

pub(super) fn store_reference_uri(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::SEARCH_RESULT_REFERENCE, "Reference URI")?;
    let uri = decode_utf8(value(c)?, false)?;
    search_result_reference(c)?.uris.push(uri);
    set_end_allowed(c);
    Ok(())
}

// ModifyRequest

pub(super) fn init_modify_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "ModifyRequest")?;
    c.op = Some(ProtocolOp::ModifyRequest(ModifyRequest::default()));
    Ok(())
}

pub(super) fn store_modify_object(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_REQUEST, "Modify object")?;
    let object = decode_entry_name(c, ResponseType::ModifyResponse)?;
    modify_request(c)?.object = object;
    Ok(())
}

pub(super) fn init_changes(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_REQUEST, "Changes")?;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn init_change(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Change")?;
    modify_request(c)?
        .changes
        .push(Change::new(ModifyOperation::Add, Attribute::default()));
    Ok(())
}

pub(super) fn store_modify_operation(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 4, "Modify operation")?;
    let operation = ModifyOperation::from_value(decode_integer(value(c)?, IntegerBounds::NON_NEGATIVE)?)?;
    last_change(c)?.operation = operation;
    Ok(())
}

pub(super) fn init_modification(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 4, "Modification")
}

pub(super) fn store_modification_type(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 5, "Modification type")?;
    let description = decode_utf8(value(c)?, false)?;
    last_change(c)?.modification.description = description;
    Ok(())
}

pub(super) fn init_modification_values(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 5, "Modification values")?;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_modification_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SET, 6, "Modification value")?;
    let modification_value = value(c)?.to_vec();
    last_change(c)?.modification.values.push(modification_value);
    set_end_allowed(c);
    Ok(())
}

// DelRequest

pub(super) fn store_del_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let entry = decode_entry_name(c, ResponseType::DelResponse)?;
    c.op = Some(ProtocolOp::DelRequest(entry));
    set_end_allowed(c);
    Ok(())
}

// ModifyDnRequest

pub(super) fn init_modify_dn_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "ModifyDnRequest")?;
    c.pending_entry = None;
    Ok(())
}

pub(super) fn store_modify_dn_entry(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_DN_REQUEST, "Modify DN entry")?;
    let entry = decode_entry_name(c, ResponseType::ModifyDnResponse)?;
    c.pending_entry = Some(entry);
    Ok(())
}

pub(super) fn store_new_rdn(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_DN_REQUEST, "New RDN")?;
    let bytes = value(c)?;
    let new_rdn = std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| Rdn::parse(s).ok())
        .ok_or_else(|| {
            rejected(
                c,
                ResponseType::ModifyDnResponse,
                ResultCode::InvalidDnSyntax,
                format!("Invalid new RDN '{}'", String::from_utf8_lossy(bytes)),
            )
        })?;
    let entry = c
        .pending_entry
        .take()
        .ok_or_else(|| LdapError::InvalidFieldValue("New RDN before the entry".to_string()))?;
    c.op = Some(ProtocolOp::ModifyDnRequest(ModifyDnRequest::new(entry, new_rdn, false)));
    Ok(())
}

pub(super) fn store_delete_old_rdn(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_DN_REQUEST, "Delete old RDN")?;
    let bytes = value(c)?;
    let delete_old_rdn = decode_boolean(bytes)?;
    if bytes[0] != 0x00 && bytes[0] != 0xFF {
        log::warn!(
            "deleteOldRdn encoded as 0x{:02X} in message {}, read as TRUE",
            bytes[0],
            c.message_id
        );
    }
    modify_dn_request(c)?.delete_old_rdn = delete_old_rdn;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_new_superior(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::MODIFY_DN_REQUEST, "New superior")?;
    let new_superior = decode_name(
        c,
        ResponseType::ModifyDnResponse,
        ResultCode::InvalidDnSyntax,
        "new superior",
    )?;
    modify_dn_request(c)?.new_superior = Some(new_superior);
    set_end_allowed(c);
    Ok(())
}

// CompareRequest

pub(super) fn init_compare_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "CompareRequest")?;
    c.op = Some(ProtocolOp::CompareRequest(CompareRequest::default()));
    Ok(())
}

pub(super) fn store_compare_entry(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::COMPARE_REQUEST, "Compare entry")?;
    let entry = decode_entry_name(c, ResponseType::CompareResponse)?;
    compare_request(c)?.entry = entry;
    Ok(())
}

pub(super) fn init_compare_ava(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::COMPARE_REQUEST, "Compare assertion")
}

pub(super) fn store_compare_attribute_desc(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Compare attribute")?;
    let desc = decode_utf8(value(c)?, false)?;
    if !is_valid_attribute_description(&desc) {
        return Err(rejected(
            c,
            ResponseType::CompareResponse,
            ResultCode::InvalidAttributeSyntax,
            format!("Invalid attribute description '{}'", desc),
        ));
    }
    compare_request(c)?.attribute_desc = desc;
    Ok(())
}

pub(super) fn store_compare_assertion_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Compare value")?;
    let assertion_value = value(c)?.to_vec();
    compare_request(c)?.assertion_value = assertion_value;
    set_end_allowed(c);
    Ok(())
}

// AbandonRequest

pub(super) fn store_abandon_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    let id = decode_integer(value(c)?, IntegerBounds::MESSAGE_ID)?;
    c.op = Some(ProtocolOp::AbandonRequest(id as i32));
    set_end_allowed(c);
    Ok(())
}

// ExtendedRequest

pub(super) fn init_extended_request(c: &mut LdapMessageContainer) -> LdapResult<()> {
    reject_empty(c, "ExtendedRequest")?;
    c.op = Some(ProtocolOp::ExtendedRequest(ExtendedRequest::default()));
    Ok(())
}

pub(super) fn store_extended_request_name(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::EXTENDED_REQUEST, "Extended request name")?;
    let name = decode_utf8(value(c)?, false)?;
    extended_request(c)?.request_name = name;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_extended_request_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::EXTENDED_REQUEST, "Extended request value")?;
    let request_value = value(c)?.to_vec();
    extended_request(c)?.request_value = Some(request_value);
    set_end_allowed(c);
    Ok(())
}

// IntermediateResponse

pub(super) fn init_intermediate_response(c: &mut LdapMessageContainer) -> LdapResult<()> {
    c.op = Some(ProtocolOp::IntermediateResponse(IntermediateResponse::default()));
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_intermediate_name(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::INTERMEDIATE_RESPONSE, "Intermediate response name")?;
    let name = decode_utf8(value(c)?, false)?;
    intermediate_response(c)?.response_name = Some(name);
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_intermediate_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_parent(c, op_tag::INTERMEDIATE_RESPONSE, "Intermediate response value")?;
    let response_value = value(c)?.to_vec();
    intermediate_response(c)?.response_value = Some(response_value);
    set_end_allowed(c);
    Ok(())
}

// Controls

pub(super) fn init_controls(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 1, "Controls")?;
    check_add_values(c)?;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn init_control(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, CONTROLS_TAG, 2, "Control")?;
    c.controls.push(Control::new(String::new()));
    Ok(())
}

pub(super) fn store_control_type(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Control type")?;
    let oid = decode_utf8(value(c)?, false)?;
    last_control(c)?.oid = oid;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_control_criticality(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Control criticality")?;
    let criticality = decode_boolean(value(c)?)?;
    last_control(c)?.criticality = criticality;
    set_end_allowed(c);
    Ok(())
}

pub(super) fn store_control_value(c: &mut LdapMessageContainer) -> LdapResult<()> {
    expect_nested(c, universal::SEQUENCE, 3, "Control value")?;
    let bytes = value(c)?.to_vec();
    let control = last_control(c)?;
    control.value = Some(ControlValue::decode(&control.oid, &bytes)?);
    set_end_allowed(c);
    Ok(())
}
