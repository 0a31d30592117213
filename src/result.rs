//! Error types and result code helpers.
//!
//! Two layers of errors exist. [`DirectoryError`](enum.DirectoryError.html) is what a
//! single directory operation returns; it never escapes the credential-checking path of
//! the authenticator, which turns it into a failed login. [`AuthError`](enum.AuthError.html)
//! is returned when an authenticator can't be constructed at all.

use std::fmt;

use thiserror::Error;

/// Type alias for the result of constructing an authenticator.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Directory operation in which an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Bind,
    Search,
    Unbind,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Connect => "connect",
            Operation::Bind => "bind",
            Operation::Search => "search",
            Operation::Unbind => "unbind",
        })
    }
}

/// Error from a single directory operation.
///
/// This is the structured form of whatever the directory library reports: the operation
/// it came from, the result code when the server sent one, and the message.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The server completed the operation with a non-success result code.
    #[error("{op}: rc={rc} ({}), text: \"{text}\"", rc_name(.rc.to_owned()))]
    Result { op: Operation, rc: u32, text: String },

    /// Transport or protocol failure reported by the LDAP library.
    #[error("{op}: {source}")]
    Protocol {
        op: Operation,
        #[source]
        source: ldap3::LdapError,
    },

    /// A connection option the directory can't honor.
    #[error("unsupported connection option: {0}")]
    Unsupported(String),

    /// The connection was already closed.
    #[error("{0}: connection closed")]
    Closed(Operation),
}

impl DirectoryError {
    /// Operation in which the error originated, if there was one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            DirectoryError::Result { op, .. } | DirectoryError::Protocol { op, .. } => Some(*op),
            DirectoryError::Closed(op) => Some(*op),
            DirectoryError::Unsupported(_) => None,
        }
    }

    /// Result code sent by the server, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            DirectoryError::Result { rc, .. } => Some(*rc),
            _ => None,
        }
    }
}

/// Error returned when an authenticator can't be constructed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Configuration is unusable, e.g. the server host is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connecting to the directory server failed.
    #[error("unable to connect to the LDAP server: {0}")]
    Connect(#[source] DirectoryError),
}

/// Name of an LDAP result code, per
/// [Section A.1 of RFC 4511](https://tools.ietf.org/html/rfc4511#appendix-A.1).
pub fn rc_name(rc: u32) -> &'static str {
    match rc {
        0 => "success",
        1 => "operationsError",
        2 => "protocolError",
        3 => "timeLimitExceeded",
        4 => "sizeLimitExceeded",
        5 => "compareFalse",
        6 => "compareTrue",
        7 => "authMethodNotSupported",
        8 => "strongerAuthRequired",
        10 => "referral",
        11 => "adminLimitExceeded",
        12 => "unavailableCriticalExtension",
        13 => "confidentialityRequired",
        14 => "saslBindInProgress",
        16 => "noSuchAttribute",
        17 => "undefinedAttributeType",
        18 => "inappropriateMatching",
        19 => "constraintViolation",
        20 => "attributeOrValueExists",
        21 => "invalidAttributeSyntax",
        32 => "noSuchObject",
        33 => "aliasProblem",
        34 => "invalidDNSyntax",
        36 => "aliasDereferencingProblem",
        48 => "inappropriateAuthentication",
        49 => "invalidCredentials",
        50 => "insufficientAccessRights",
        51 => "busy",
        52 => "unavailable",
        53 => "unwillingToPerform",
        54 => "loopDetect",
        64 => "namingViolation",
        65 => "objectClassViolation",
        66 => "notAllowedOnNonLeaf",
        67 => "notAllowedOnRDN",
        68 => "entryAlreadyExists",
        69 => "objectClassModsProhibited",
        71 => "affectsMultipleDSAs",
        80 => "other",
        88 => "abandoned",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_error_display_names_code() {
        let err = DirectoryError::Result {
            op: Operation::Bind,
            rc: 49,
            text: "80090308: LdapErr: DSID-0C09042A, data 52e, v3839".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "bind: rc=49 (invalidCredentials), text: \"80090308: LdapErr: DSID-0C09042A, data 52e, v3839\""
        );
        assert_eq!(err.code(), Some(49));
        assert_eq!(err.operation(), Some(Operation::Bind));
    }

    #[test]
    fn unknown_code() {
        assert_eq!(rc_name(9), "unknown");
        assert_eq!(rc_name(53), "unwillingToPerform");
    }
}
