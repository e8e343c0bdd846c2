//! Bolt protocol error types.

use std::fmt;
use std::io;

use super::packstream::PackStreamError;

/// Result type for Bolt operations.
pub type BoltResult<T> = Result<T, BoltError>;

/// Bolt protocol errors.
///
/// Every variant is fatal to the read or write that produced it: after a
/// framing or decoding error the stream position can no longer be trusted.
#[derive(Debug)]
pub enum BoltError {
    /// I/O error
    Io(io::Error),

    /// Handshake error
    Handshake(HandshakeError),

    /// PackStream serialization error
    PackStream(PackStreamError),

    /// Stream ended inside a chunk or between the chunks of one message
    TruncatedFrame {
        /// Bytes left in the buffer
        buffered: usize,
    },

    /// Stream ended cleanly between messages
    ConnectionClosed,

    /// Message code outside the protocol table
    InvalidMessageType(u8),

    /// Protocol error (invalid message format, etc.)
    Protocol(String),

    /// Message too large
    MessageTooLarge {
        /// Size the message would reach
        size: usize,
        /// Configured limit
        max: usize,
    },
}

impl fmt::Display for BoltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoltError::Io(e) => write!(f, "I/O error: {}", e),
            BoltError::Handshake(e) => write!(f, "Handshake error: {}", e),
            BoltError::PackStream(e) => write!(f, "PackStream error: {}", e),
            BoltError::TruncatedFrame { buffered } => {
                write!(f, "Connection closed mid-message ({} bytes buffered)", buffered)
            }
            BoltError::ConnectionClosed => write!(f, "Connection closed"),
            BoltError::InvalidMessageType(code) => {
                write!(f, "Invalid message type: 0x{:02X}", code)
            }
            BoltError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            BoltError::MessageTooLarge { size, max } => {
                write!(f, "Message too large: {} bytes (max: {})", size, max)
            }
        }
    }
}

impl std::error::Error for BoltError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoltError::Io(e) => Some(e),
            BoltError::Handshake(e) => Some(e),
            BoltError::PackStream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BoltError {
    fn from(err: io::Error) -> Self {
        BoltError::Io(err)
    }
}

impl From<HandshakeError> for BoltError {
    fn from(err: HandshakeError) -> Self {
        BoltError::Handshake(err)
    }
}

impl From<PackStreamError> for BoltError {
    fn from(err: PackStreamError) -> Self {
        BoltError::PackStream(err)
    }
}

/// Handshake-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// Server answered with the all-zero version
    NoCompatibleVersion,

    /// More versions proposed than the handshake has slots for
    TooManyProposals(usize),

    /// Nothing to propose
    NoProposals,

    /// Connection closed during handshake
    ConnectionClosed,
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::NoCompatibleVersion => {
                write!(f, "No compatible protocol version found")
            }
            HandshakeError::TooManyProposals(n) => {
                write!(f, "At most 4 versions can be proposed, got {}", n)
            }
            HandshakeError::NoProposals => write!(f, "No protocol versions to propose"),
            HandshakeError::ConnectionClosed => {
                write!(f, "Connection closed during handshake")
            }
        }
    }
}

impl std::error::Error for HandshakeError {}
