//! Driver Error Types

use std::io;

use thiserror::Error;

use crate::bolt::{BoltError, HandshakeError, PackStreamError};

// ============================================================================
// DriverError
// ============================================================================

/// Session-level error.
///
/// `Transport` wraps every wire failure and always leaves the session
/// defunct. `QueryFailed` is the recoverable case: the server rejected a
/// statement and the session waits for [`ack_failure`](super::Session::ack_failure).
#[derive(Error, Debug)]
pub enum DriverError {
    /// I/O, framing or decoding failure
    #[error("Transport error: {0}")]
    Transport(#[from] BoltError),

    /// Version negotiation failed
    #[error("Handshake failed: {0}")]
    HandshakeFailed(HandshakeError),

    /// Server rejected INIT
    #[error("INIT failed: {code} - {message}")]
    InitFailed {
        /// Server error code
        code: String,
        /// Server error message
        message: String,
    },

    /// Server answered a statement with FAILURE
    #[error("Query failed: {code} - {message}")]
    QueryFailed {
        /// Server error code
        code: String,
        /// Server error message
        message: String,
    },

    /// A request parameter cannot be encoded; nothing was sent
    #[error("Unsupported value: {0}")]
    UnsupportedValue(#[source] PackStreamError),

    /// Server skipped the request
    #[error("Request ignored by server")]
    Ignored,

    /// Operation not allowed in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Result field is a structure kind that is not interpreted
    #[error("Unsupported structure tag: 0x{0:02X}")]
    UnsupportedStructureTag(u8),

    /// Result row does not match the declared fields
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Session is closed or defunct
    #[error("Session closed")]
    SessionClosed,
}

impl DriverError {
    /// Create a query failure.
    pub fn query(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Whether the error came from the transport or wire decoding.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the server reported a statement failure.
    pub fn is_query_failure(&self) -> bool {
        matches!(self, Self::QueryFailed { .. })
    }

    /// Server error code, for INIT and query failures.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::InitFailed { code, .. } | Self::QueryFailed { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(err: io::Error) -> Self {
        Self::Transport(BoltError::Io(err))
    }
}

impl From<HandshakeError> for DriverError {
    fn from(err: HandshakeError) -> Self {
        Self::HandshakeFailed(err)
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// Driver result type.
pub type DriverResult<T> = Result<T, DriverError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error() {
        let err = DriverError::query("Neo.ClientError.Statement.SyntaxError", "Invalid syntax");
        assert!(err.is_query_failure());
        assert!(!err.is_transport());
        assert_eq!(err.code(), Some("Neo.ClientError.Statement.SyntaxError"));
        assert_eq!(
            err.to_string(),
            "Query failed: Neo.ClientError.Statement.SyntaxError - Invalid syntax"
        );
    }

    #[test]
    fn test_transport_from_bolt() {
        let err: DriverError = BoltError::ConnectionClosed.into();
        assert!(err.is_transport());
        assert!(err.code().is_none());
    }

    #[test]
    fn test_transport_from_io() {
        let err: DriverError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        assert!(matches!(err, DriverError::Transport(BoltError::Io(_))));
    }

    #[test]
    fn test_handshake_error() {
        let err: DriverError = HandshakeError::NoCompatibleVersion.into();
        assert!(matches!(
            err,
            DriverError::HandshakeFailed(HandshakeError::NoCompatibleVersion)
        ));
        assert!(err.to_string().starts_with("Handshake failed"));
    }

    #[test]
    fn test_unsupported_value_is_not_transport() {
        let err = DriverError::UnsupportedValue(PackStreamError::UnsupportedValue("Float"));
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Unsupported value: Cannot encode Float values");
    }

    #[test]
    fn test_unsupported_tag_display() {
        assert_eq!(
            DriverError::UnsupportedStructureTag(0x02).to_string(),
            "Unsupported structure tag: 0x02"
        );
    }
}
