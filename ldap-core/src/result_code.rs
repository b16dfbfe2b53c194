//! LDAP result codes (RFC 4511 Appendix A plus registered extensions)

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! result_codes {
    ($($variant:ident = $value:expr => $name:expr,)+) => {
        /// LDAP result code carried in every `LDAPResult`
        ///
        /// Codes not in the table are kept verbatim in [`ResultCode::Other`]
        /// so that a response from a newer server can be re-encoded
        /// unchanged.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ResultCode {
            $($variant,)+
            /// Any code not defined above
            Other(u32),
        }

        impl ResultCode {
            /// Map a wire value to a result code
            pub fn from_u32(value: u32) -> Self {
                match value {
                    $($value => ResultCode::$variant,)+
                    other => ResultCode::Other(other),
                }
            }

            /// Wire value of this result code
            pub fn value(&self) -> u32 {
                match self {
                    $(ResultCode::$variant => $value,)+
                    ResultCode::Other(other) => *other,
                }
            }

            /// Name as written in RFC 4511
            pub fn name(&self) -> &'static str {
                match self {
                    $(ResultCode::$variant => $name,)+
                    ResultCode::Other(_) => "unknown",
                }
            }
        }
    };
}

result_codes! {
    Success = 0 => "success",
    OperationsError = 1 => "operationsError",
    ProtocolError = 2 => "protocolError",
    TimeLimitExceeded = 3 => "timeLimitExceeded",
    SizeLimitExceeded = 4 => "sizeLimitExceeded",
    CompareFalse = 5 => "compareFalse",
    CompareTrue = 6 => "compareTrue",
    AuthMethodNotSupported = 7 => "authMethodNotSupported",
    StrongerAuthRequired = 8 => "strongerAuthRequired",
    Referral = 10 => "referral",
    AdminLimitExceeded = 11 => "adminLimitExceeded",
    UnavailableCriticalExtension = 12 => "unavailableCriticalExtension",
    ConfidentialityRequired = 13 => "confidentialityRequired",
    SaslBindInProgress = 14 => "saslBindInProgress",
    NoSuchAttribute = 16 => "noSuchAttribute",
    UndefinedAttributeType = 17 => "undefinedAttributeType",
    InappropriateMatching = 18 => "inappropriateMatching",
    ConstraintViolation = 19 => "constraintViolation",
    AttributeOrValueExists = 20 => "attributeOrValueExists",
    InvalidAttributeSyntax = 21 => "invalidAttributeSyntax",
    NoSuchObject = 32 => "noSuchObject",
    AliasProblem = 33 => "aliasProblem",
    InvalidDnSyntax = 34 => "invalidDNSyntax",
    AliasDereferencingProblem = 36 => "aliasDereferencingProblem",
    InappropriateAuthentication = 48 => "inappropriateAuthentication",
    InvalidCredentials = 49 => "invalidCredentials",
    InsufficientAccessRights = 50 => "insufficientAccessRights",
    Busy = 51 => "busy",
    Unavailable = 52 => "unavailable",
    UnwillingToPerform = 53 => "unwillingToPerform",
    LoopDetect = 54 => "loopDetect",
    NamingViolation = 64 => "namingViolation",
    ObjectClassViolation = 65 => "objectClassViolation",
    NotAllowedOnNonLeaf = 66 => "notAllowedOnNonLeaf",
    NotAllowedOnRdn = 67 => "notAllowedOnRDN",
    EntryAlreadyExists = 68 => "entryAlreadyExists",
    ObjectClassModsProhibited = 69 => "objectClassModsProhibited",
    AffectsMultipleDsas = 71 => "affectsMultipleDSAs",
    OtherError = 80 => "other",
    Canceled = 118 => "canceled",
    NoSuchOperation = 119 => "noSuchOperation",
    TooLate = 120 => "tooLate",
    CannotCancel = 121 => "cannotCancel",
    AssertionFailed = 122 => "assertionFailed",
    AuthorizationDenied = 123 => "authorizationDenied",
    SyncRefreshRequired = 4096 => "e-syncRefreshRequired",
}

impl ResultCode {
    /// Check whether the code reports a successful operation
    ///
    /// `compareFalse`, `compareTrue`, `referral` and `saslBindInProgress`
    /// are not errors either (RFC 4511 Appendix A.1).
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ResultCode::Success
                | ResultCode::CompareFalse
                | ResultCode::CompareTrue
                | ResultCode::Referral
                | ResultCode::SaslBindInProgress
        )
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        ResultCode::Success
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_mapping() {
        assert_eq!(ResultCode::from_u32(34), ResultCode::InvalidDnSyntax);
        assert_eq!(ResultCode::InvalidCredentials.value(), 49);
        assert_eq!(ResultCode::from_u32(4096), ResultCode::SyncRefreshRequired);
    }

    #[test]
    fn test_unknown_code_preserved() {
        let code = ResultCode::from_u32(999);
        assert_eq!(code, ResultCode::Other(999));
        assert_eq!(code.value(), 999);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResultCode::InvalidDnSyntax.to_string(), "invalidDNSyntax (34)");
        assert!(ResultCode::CompareTrue.is_success());
        assert!(!ResultCode::ProtocolError.is_success());
    }
}
