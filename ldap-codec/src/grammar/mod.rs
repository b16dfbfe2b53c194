//! LDAPv3 message grammar
//!
//! One state machine covers every `LDAPMessage`. States are named after
//! the element that was just decoded; a transition consumes the next TLV
//! header (constructed) or TLV (primitive) and its action stores the
//! decoded value in the [`LdapMessageContainer`].
//!
//! Several elements are optional or repeated. When the grammar cannot tell
//! from the tag alone whether a TLV continues a list or starts the element
//! after it, the action checks which TLV is the enclosing one.

mod actions;

use crate::container::LdapMessageContainer;
use crate::controls::CONTROLS_TAG;
use crate::filter::tag as filter_tag;
use crate::message::bind::tag as bind_tag;
use crate::message::extended::tag as extended_tag;
use crate::message::result::REFERRAL_TAG;
use crate::message::tag as op_tag;
use crate::message::update::NEW_SUPERIOR_TAG;
use ldap_asn1::ber::types::universal;
use ldap_asn1::{Grammar, GrammarState};
use once_cell::sync::Lazy;

use actions::*;

macro_rules! ldap_states {
    ($($state:ident,)+) => {
        /// States of the LDAP message grammar
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum LdapState {
            $($state,)+
        }

        impl GrammarState for LdapState {
            fn ordinal(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(LdapState::$state => stringify!($state),)+
                }
            }
        }
    };
}

ldap_states! {
    Start,
    LdapMessage,
    MessageId,
    // bind
    BindRequest,
    BindVersion,
    BindName,
    BindSimple,
    BindSasl,
    BindSaslMechanism,
    BindSaslCredentials,
    // LDAPResult and response extensions
    Response,
    ResultCode,
    MatchedDn,
    DiagnosticMessage,
    Referral,
    ReferralUri,
    ServerSaslCreds,
    ExtendedResponseName,
    ExtendedResponseValue,
    UnbindRequest,
    // search request
    SearchRequest,
    SearchBase,
    SearchScope,
    SearchDerefAliases,
    SearchSizeLimit,
    SearchTimeLimit,
    SearchTypesOnly,
    FilterNext,
    FilterAva,
    FilterAvaDesc,
    FilterSubstrings,
    FilterSubstringsType,
    FilterSubstringsList,
    FilterSubstringInitial,
    FilterSubstringAny,
    FilterSubstringFinal,
    FilterExtensible,
    FilterExtensibleRule,
    FilterExtensibleType,
    FilterExtensibleValue,
    FilterExtensibleDnAttributes,
    SearchAttributes,
    SearchAttribute,
    // search result entry and add request
    SearchResultEntry,
    EntryObjectName,
    AddRequest,
    AddEntry,
    AttributeList,
    Attribute,
    AttributeType,
    AttributeValues,
    AttributeValue,
    SearchResultReference,
    ReferenceUri,
    // modify
    ModifyRequest,
    ModifyObject,
    ModifyChanges,
    ModifyChange,
    ModifyOperation,
    ModifyAttribute,
    ModifyAttributeType,
    ModifyValues,
    ModifyValue,
    DelRequest,
    // modify DN
    ModifyDnRequest,
    ModifyDnEntry,
    ModifyDnNewRdn,
    ModifyDnDeleteOldRdn,
    ModifyDnNewSuperior,
    // compare
    CompareRequest,
    CompareEntry,
    CompareAva,
    CompareAttributeDesc,
    CompareAssertionValue,
    AbandonRequest,
    // extended and intermediate
    ExtendedRequest,
    ExtendedRequestName,
    ExtendedRequestValue,
    IntermediateResponse,
    IntermediateResponseName,
    IntermediateResponseValue,
    // controls
    Controls,
    Control,
    ControlType,
    ControlCriticality,
    ControlValue,
}

/// Response operations sharing the `LDAPResult` states
const RESPONSE_TAGS: [u8; 8] = [
    op_tag::BIND_RESPONSE,
    op_tag::SEARCH_RESULT_DONE,
    op_tag::MODIFY_RESPONSE,
    op_tag::ADD_RESPONSE,
    op_tag::DEL_RESPONSE,
    op_tag::MODIFY_DN_RESPONSE,
    op_tag::COMPARE_RESPONSE,
    op_tag::EXTENDED_RESPONSE,
];

/// States after which a message may carry its controls
const CONTROLS_FROM: [LdapState; 28] = [
    LdapState::BindSimple,
    LdapState::BindSaslMechanism,
    LdapState::BindSaslCredentials,
    LdapState::DiagnosticMessage,
    LdapState::ReferralUri,
    LdapState::ServerSaslCreds,
    LdapState::ExtendedResponseName,
    LdapState::ExtendedResponseValue,
    LdapState::UnbindRequest,
    LdapState::SearchAttributes,
    LdapState::SearchAttribute,
    LdapState::AttributeList,
    LdapState::AttributeValues,
    LdapState::AttributeValue,
    LdapState::ReferenceUri,
    LdapState::ModifyChanges,
    LdapState::ModifyValues,
    LdapState::ModifyValue,
    LdapState::DelRequest,
    LdapState::ModifyDnDeleteOldRdn,
    LdapState::ModifyDnNewSuperior,
    LdapState::CompareAssertionValue,
    LdapState::AbandonRequest,
    LdapState::ExtendedRequestName,
    LdapState::ExtendedRequestValue,
    LdapState::IntermediateResponse,
    LdapState::IntermediateResponseName,
    LdapState::IntermediateResponseValue,
];

/// States after which a complete filter may be followed by a sibling
/// filter or by the attribute selection
const FILTER_COMPLETE: [LdapState; 6] = [
    LdapState::FilterNext,
    LdapState::FilterSubstringInitial,
    LdapState::FilterSubstringAny,
    LdapState::FilterSubstringFinal,
    LdapState::FilterExtensibleValue,
    LdapState::FilterExtensibleDnAttributes,
];

fn add_filter_transitions(grammar: &mut Grammar<LdapMessageContainer>, from: LdapState) {
    grammar.add("and", from, filter_tag::AND, LdapState::FilterNext, Some(init_and_filter));
    grammar.add("or", from, filter_tag::OR, LdapState::FilterNext, Some(init_or_filter));
    grammar.add("not", from, filter_tag::NOT, LdapState::FilterNext, Some(init_not_filter));
    grammar.add(
        "equality match",
        from,
        filter_tag::EQUALITY_MATCH,
        LdapState::FilterAva,
        Some(init_equality_filter),
    );
    grammar.add(
        "greater or equal",
        from,
        filter_tag::GREATER_OR_EQUAL,
        LdapState::FilterAva,
        Some(init_greater_or_equal_filter),
    );
    grammar.add(
        "less or equal",
        from,
        filter_tag::LESS_OR_EQUAL,
        LdapState::FilterAva,
        Some(init_less_or_equal_filter),
    );
    grammar.add(
        "approx match",
        from,
        filter_tag::APPROX_MATCH,
        LdapState::FilterAva,
        Some(init_approx_filter),
    );
    grammar.add("present", from, filter_tag::PRESENT, LdapState::FilterNext, Some(store_present_filter));
    grammar.add(
        "substrings",
        from,
        filter_tag::SUBSTRINGS,
        LdapState::FilterSubstrings,
        Some(init_substrings_filter),
    );
    grammar.add(
        "extensible match",
        from,
        filter_tag::EXTENSIBLE_MATCH,
        LdapState::FilterExtensible,
        Some(init_extensible_filter),
    );
}

fn build_grammar() -> Grammar<LdapMessageContainer> {
    let mut g = Grammar::new("LdapMessage");

    g.add("message", LdapState::Start, universal::SEQUENCE, LdapState::LdapMessage, Some(init_message));
    g.add(
        "message id",
        LdapState::LdapMessage,
        universal::INTEGER,
        LdapState::MessageId,
        Some(store_message_id),
    );

    // BindRequest
    g.add(
        "bind request",
        LdapState::MessageId,
        op_tag::BIND_REQUEST,
        LdapState::BindRequest,
        Some(init_bind_request),
    );
    g.add(
        "bind version",
        LdapState::BindRequest,
        universal::INTEGER,
        LdapState::BindVersion,
        Some(store_bind_version),
    );
    g.add(
        "bind name",
        LdapState::BindVersion,
        universal::OCTET_STRING,
        LdapState::BindName,
        Some(store_bind_name),
    );
    g.add(
        "simple authentication",
        LdapState::BindName,
        bind_tag::SIMPLE,
        LdapState::BindSimple,
        Some(store_simple_credentials),
    );
    g.add("sasl authentication", LdapState::BindName, bind_tag::SASL, LdapState::BindSasl, Some(init_sasl));
    g.add(
        "sasl mechanism",
        LdapState::BindSasl,
        universal::OCTET_STRING,
        LdapState::BindSaslMechanism,
        Some(store_sasl_mechanism),
    );
    g.add(
        "sasl credentials",
        LdapState::BindSaslMechanism,
        universal::OCTET_STRING,
        LdapState::BindSaslCredentials,
        Some(store_sasl_credentials),
    );

    // Responses
    g.add_tags("response", LdapState::MessageId, &RESPONSE_TAGS, LdapState::Response, Some(init_response));
    g.add(
        "result code",
        LdapState::Response,
        universal::ENUMERATED,
        LdapState::ResultCode,
        Some(store_result_code),
    );
    g.add(
        "matched dn",
        LdapState::ResultCode,
        universal::OCTET_STRING,
        LdapState::MatchedDn,
        Some(store_matched_dn),
    );
    g.add(
        "diagnostic message",
        LdapState::MatchedDn,
        universal::OCTET_STRING,
        LdapState::DiagnosticMessage,
        Some(store_diagnostic_message),
    );
    g.add("referral", LdapState::DiagnosticMessage, REFERRAL_TAG, LdapState::Referral, Some(init_referral));
    g.add(
        "referral uri",
        LdapState::Referral,
        universal::OCTET_STRING,
        LdapState::ReferralUri,
        Some(store_referral_uri),
    );
    g.add(
        "referral uri",
        LdapState::ReferralUri,
        universal::OCTET_STRING,
        LdapState::ReferralUri,
        Some(store_referral_uri),
    );
    for from in [LdapState::DiagnosticMessage, LdapState::ReferralUri] {
        g.add(
            "server sasl credentials",
            from,
            bind_tag::SERVER_SASL_CREDS,
            LdapState::ServerSaslCreds,
            Some(store_server_sasl_creds),
        );
        g.add(
            "extended response name",
            from,
            extended_tag::RESPONSE_NAME,
            LdapState::ExtendedResponseName,
            Some(store_extended_response_name),
        );
    }
    for from in [
        LdapState::DiagnosticMessage,
        LdapState::ReferralUri,
        LdapState::ExtendedResponseName,
    ] {
        g.add(
            "extended response value",
            from,
            extended_tag::RESPONSE_VALUE,
            LdapState::ExtendedResponseValue,
            Some(store_extended_response_value),
        );
    }

    // UnbindRequest
    g.add(
        "unbind request",
        LdapState::MessageId,
        op_tag::UNBIND_REQUEST,
        LdapState::UnbindRequest,
        Some(store_unbind_request),
    );

    // SearchRequest
    g.add(
        "search request",
        LdapState::MessageId,
        op_tag::SEARCH_REQUEST,
        LdapState::SearchRequest,
        Some(init_search_request),
    );
    g.add(
        "search base",
        LdapState::SearchRequest,
        universal::OCTET_STRING,
        LdapState::SearchBase,
        Some(store_search_base),
    );
    g.add(
        "search scope",
        LdapState::SearchBase,
        universal::ENUMERATED,
        LdapState::SearchScope,
        Some(store_search_scope),
    );
    g.add(
        "deref aliases",
        LdapState::SearchScope,
        universal::ENUMERATED,
        LdapState::SearchDerefAliases,
        Some(store_deref_aliases),
    );
    g.add(
        "size limit",
        LdapState::SearchDerefAliases,
        universal::INTEGER,
        LdapState::SearchSizeLimit,
        Some(store_size_limit),
    );
    g.add(
        "time limit",
        LdapState::SearchSizeLimit,
        universal::INTEGER,
        LdapState::SearchTimeLimit,
        Some(store_time_limit),
    );
    g.add(
        "types only",
        LdapState::SearchTimeLimit,
        universal::BOOLEAN,
        LdapState::SearchTypesOnly,
        Some(store_types_only),
    );

    // Filters
    add_filter_transitions(&mut g, LdapState::SearchTypesOnly);
    for from in FILTER_COMPLETE {
        add_filter_transitions(&mut g, from);
        g.add(
            "attribute selection",
            from,
            universal::SEQUENCE,
            LdapState::SearchAttributes,
            Some(init_search_attributes),
        );
    }
    g.add(
        "assertion attribute",
        LdapState::FilterAva,
        universal::OCTET_STRING,
        LdapState::FilterAvaDesc,
        Some(store_ava_desc),
    );
    g.add(
        "assertion value",
        LdapState::FilterAvaDesc,
        universal::OCTET_STRING,
        LdapState::FilterNext,
        Some(store_ava_value),
    );
    g.add(
        "substrings type",
        LdapState::FilterSubstrings,
        universal::OCTET_STRING,
        LdapState::FilterSubstringsType,
        Some(store_substrings_type),
    );
    g.add(
        "substrings",
        LdapState::FilterSubstringsType,
        universal::SEQUENCE,
        LdapState::FilterSubstringsList,
        Some(init_substrings_list),
    );
    g.add(
        "initial substring",
        LdapState::FilterSubstringsList,
        filter_tag::SUBSTRING_INITIAL,
        LdapState::FilterSubstringInitial,
        Some(store_substring_initial),
    );
    for from in [
        LdapState::FilterSubstringsList,
        LdapState::FilterSubstringInitial,
        LdapState::FilterSubstringAny,
    ] {
        g.add(
            "any substring",
            from,
            filter_tag::SUBSTRING_ANY,
            LdapState::FilterSubstringAny,
            Some(store_substring_any),
        );
        g.add(
            "final substring",
            from,
            filter_tag::SUBSTRING_FINAL,
            LdapState::FilterSubstringFinal,
            Some(store_substring_final),
        );
    }
    g.add(
        "matching rule",
        LdapState::FilterExtensible,
        filter_tag::MATCHING_RULE,
        LdapState::FilterExtensibleRule,
        Some(store_matching_rule),
    );
    for from in [LdapState::FilterExtensible, LdapState::FilterExtensibleRule] {
        g.add(
            "matching type",
            from,
            filter_tag::MATCHING_TYPE,
            LdapState::FilterExtensibleType,
            Some(store_matching_type),
        );
    }
    for from in [
        LdapState::FilterExtensible,
        LdapState::FilterExtensibleRule,
        LdapState::FilterExtensibleType,
    ] {
        g.add(
            "match value",
            from,
            filter_tag::MATCH_VALUE,
            LdapState::FilterExtensibleValue,
            Some(store_match_value),
        );
    }
    g.add(
        "dn attributes",
        LdapState::FilterExtensibleValue,
        filter_tag::DN_ATTRIBUTES,
        LdapState::FilterExtensibleDnAttributes,
        Some(store_dn_attributes),
    );

    // Attribute selection
    for from in [LdapState::SearchAttributes, LdapState::SearchAttribute] {
        g.add(
            "selected attribute",
            from,
            universal::OCTET_STRING,
            LdapState::SearchAttribute,
            Some(store_search_attribute),
        );
    }

    // SearchResultEntry and AddRequest
    g.add(
        "search result entry",
        LdapState::MessageId,
        op_tag::SEARCH_RESULT_ENTRY,
        LdapState::SearchResultEntry,
        Some(init_search_result_entry),
    );
    g.add(
        "object name",
        LdapState::SearchResultEntry,
        universal::OCTET_STRING,
        LdapState::EntryObjectName,
        Some(store_object_name),
    );
    g.add(
        "add request",
        LdapState::MessageId,
        op_tag::ADD_REQUEST,
        LdapState::AddRequest,
        Some(init_add_request),
    );
    g.add(
        "add entry",
        LdapState::AddRequest,
        universal::OCTET_STRING,
        LdapState::AddEntry,
        Some(store_add_entry),
    );
    for from in [LdapState::EntryObjectName, LdapState::AddEntry] {
        g.add(
            "attribute list",
            from,
            universal::SEQUENCE,
            LdapState::AttributeList,
            Some(init_attribute_list),
        );
    }
    for from in [
        LdapState::AttributeList,
        LdapState::AttributeValues,
        LdapState::AttributeValue,
    ] {
        g.add("attribute", from, universal::SEQUENCE, LdapState::Attribute, Some(init_attribute));
    }
    g.add(
        "attribute type",
        LdapState::Attribute,
        universal::OCTET_STRING,
        LdapState::AttributeType,
        Some(store_attribute_type),
    );
    g.add(
        "attribute values",
        LdapState::AttributeType,
        universal::SET,
        LdapState::AttributeValues,
        Some(init_attribute_values),
    );
    for from in [LdapState::AttributeValues, LdapState::AttributeValue] {
        g.add(
            "attribute value",
            from,
            universal::OCTET_STRING,
            LdapState::AttributeValue,
            Some(store_attribute_value),
        );
    }

    // SearchResultReference
    g.add(
        "search result reference",
        LdapState::MessageId,
        op_tag::SEARCH_RESULT_REFERENCE,
        LdapState::SearchResultReference,
        Some(init_search_result_reference),
    );
    for from in [LdapState::SearchResultReference, LdapState::ReferenceUri] {
        g.add(
            "reference uri",
            from,
            universal::OCTET_STRING,
            LdapState::ReferenceUri,
            Some(store_reference_uri),
        );
    }

    // ModifyRequest
    g.add(
        "modify request",
        LdapState::MessageId,
        op_tag::MODIFY_REQUEST,
        LdapState::ModifyRequest,
        Some(init_modify_request),
    );
    g.add(
        "modify object",
        LdapState::ModifyRequest,
        universal::OCTET_STRING,
        LdapState::ModifyObject,
        Some(store_modify_object),
    );
    g.add(
        "changes",
        LdapState::ModifyObject,
        universal::SEQUENCE,
        LdapState::ModifyChanges,
        Some(init_changes),
    );
    for from in [
        LdapState::ModifyChanges,
        LdapState::ModifyValues,
        LdapState::ModifyValue,
    ] {
        g.add("change", from, universal::SEQUENCE, LdapState::ModifyChange, Some(init_change));
    }
    g.add(
        "operation",
        LdapState::ModifyChange,
        universal::ENUMERATED,
        LdapState::ModifyOperation,
        Some(store_modify_operation),
    );
    g.add(
        "modification",
        LdapState::ModifyOperation,
        universal::SEQUENCE,
        LdapState::ModifyAttribute,
        Some(init_modification),
    );
    g.add(
        "modification type",
        LdapState::ModifyAttribute,
        universal::OCTET_STRING,
        LdapState::ModifyAttributeType,
        Some(store_modification_type),
    );
    g.add(
        "modification values",
        LdapState::ModifyAttributeType,
        universal::SET,
        LdapState::ModifyValues,
        Some(init_modification_values),
    );
    for from in [LdapState::ModifyValues, LdapState::ModifyValue] {
        g.add(
            "modification value",
            from,
            universal::OCTET_STRING,
            LdapState::ModifyValue,
            Some(store_modification_value),
        );
    }

    // DelRequest
    g.add(
        "del request",
        LdapState::MessageId,
        op_tag::DEL_REQUEST,
        LdapState::DelRequest,
        Some(store_del_request),
    );

    // ModifyDnRequest
    g.add(
        "modify dn request",
        LdapState::MessageId,
        op_tag::MODIFY_DN_REQUEST,
        LdapState::ModifyDnRequest,
        Some(init_modify_dn_request),
    );
    g.add(
        "modify dn entry",
        LdapState::ModifyDnRequest,
        universal::OCTET_STRING,
        LdapState::ModifyDnEntry,
        Some(store_modify_dn_entry),
    );
    g.add(
        "new rdn",
        LdapState::ModifyDnEntry,
        universal::OCTET_STRING,
        LdapState::ModifyDnNewRdn,
        Some(store_new_rdn),
    );
    g.add(
        "delete old rdn",
        LdapState::ModifyDnNewRdn,
        universal::BOOLEAN,
        LdapState::ModifyDnDeleteOldRdn,
        Some(store_delete_old_rdn),
    );
    g.add(
        "new superior",
        LdapState::ModifyDnDeleteOldRdn,
        NEW_SUPERIOR_TAG,
        LdapState::ModifyDnNewSuperior,
        Some(store_new_superior),
    );

    // CompareRequest
    g.add(
        "compare request",
        LdapState::MessageId,
        op_tag::COMPARE_REQUEST,
        LdapState::CompareRequest,
        Some(init_compare_request),
    );
    g.add(
        "compare entry",
        LdapState::CompareRequest,
        universal::OCTET_STRING,
        LdapState::CompareEntry,
        Some(store_compare_entry),
    );
    g.add(
        "compare assertion",
        LdapState::CompareEntry,
        universal::SEQUENCE,
        LdapState::CompareAva,
        Some(init_compare_ava),
    );
    g.add(
        "compare attribute",
        LdapState::CompareAva,
        universal::OCTET_STRING,
        LdapState::CompareAttributeDesc,
        Some(store_compare_attribute_desc),
    );
    g.add(
        "compare value",
        LdapState::CompareAttributeDesc,
        universal::OCTET_STRING,
        LdapState::CompareAssertionValue,
        Some(store_compare_assertion_value),
    );

    // AbandonRequest
    g.add(
        "abandon request",
        LdapState::MessageId,
        op_tag::ABANDON_REQUEST,
        LdapState::AbandonRequest,
        Some(store_abandon_request),
    );

    // ExtendedRequest
    g.add(
        "extended request",
        LdapState::MessageId,
        op_tag::EXTENDED_REQUEST,
        LdapState::ExtendedRequest,
        Some(init_extended_request),
    );
    g.add(
        "extended request name",
        LdapState::ExtendedRequest,
        extended_tag::REQUEST_NAME,
        LdapState::ExtendedRequestName,
        Some(store_extended_request_name),
    );
    g.add(
        "extended request value",
        LdapState::ExtendedRequestName,
        extended_tag::REQUEST_VALUE,
        LdapState::ExtendedRequestValue,
        Some(store_extended_request_value),
    );

    // IntermediateResponse
    g.add(
        "intermediate response",
        LdapState::MessageId,
        op_tag::INTERMEDIATE_RESPONSE,
        LdapState::IntermediateResponse,
        Some(init_intermediate_response),
    );
    g.add(
        "intermediate response name",
        LdapState::IntermediateResponse,
        extended_tag::INTERMEDIATE_NAME,
        LdapState::IntermediateResponseName,
        Some(store_intermediate_name),
    );
    for from in [
        LdapState::IntermediateResponse,
        LdapState::IntermediateResponseName,
    ] {
        g.add(
            "intermediate response value",
            from,
            extended_tag::INTERMEDIATE_VALUE,
            LdapState::IntermediateResponseValue,
            Some(store_intermediate_value),
        );
    }

    // Controls
    for from in CONTROLS_FROM {
        g.add("controls", from, CONTROLS_TAG, LdapState::Controls, Some(init_controls));
    }
    for from in [
        LdapState::Controls,
        LdapState::ControlType,
        LdapState::ControlCriticality,
        LdapState::ControlValue,
    ] {
        g.add("control", from, universal::SEQUENCE, LdapState::Control, Some(init_control));
    }
    g.add(
        "control type",
        LdapState::Control,
        universal::OCTET_STRING,
        LdapState::ControlType,
        Some(store_control_type),
    );
    g.add(
        "criticality",
        LdapState::ControlType,
        universal::BOOLEAN,
        LdapState::ControlCriticality,
        Some(store_control_criticality),
    );
    for from in [LdapState::ControlType, LdapState::ControlCriticality] {
        g.add(
            "control value",
            from,
            universal::OCTET_STRING,
            LdapState::ControlValue,
            Some(store_control_value),
        );
    }

    g
}

/// The grammar shared by every [`LdapMessageContainer`]
pub(crate) static LDAP_MESSAGE_GRAMMAR: Lazy<Grammar<LdapMessageContainer>> = Lazy::new(build_grammar);
