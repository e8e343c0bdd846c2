//! Bolt protocol message types.
//!
//! A message travels as a PackStream structure whose tag is the message code
//! and whose fields are the message arguments, in order.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

use std::fmt;

use bytes::BytesMut;

use super::packstream::{encode, PackStreamDecoder, Structure, Value};
use super::{BoltError, BoltResult};

/// Bolt message codes.
pub mod tag {
    /// INIT request code (0x01)
    pub const INIT: u8 = 0x01;
    /// ACK_FAILURE request code (0x0F)
    pub const ACK_FAILURE: u8 = 0x0F;
    /// RUN request code (0x10)
    pub const RUN: u8 = 0x10;
    /// DISCARD_ALL request code (0x2F)
    pub const DISCARD_ALL: u8 = 0x2F;
    /// PULL_ALL request code (0x3F)
    pub const PULL_ALL: u8 = 0x3F;

    /// SUCCESS response code (0x70)
    pub const SUCCESS: u8 = 0x70;
    /// RECORD response code (0x71)
    pub const RECORD: u8 = 0x71;
    /// IGNORED response code (0x7E)
    pub const IGNORED: u8 = 0x7E;
    /// FAILURE response code (0x7F)
    pub const FAILURE: u8 = 0x7F;
}

/// Every message kind in the protocol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// INIT - Initialize the session
    Init,
    /// ACK_FAILURE - Acknowledge a failure and leave the failed state
    AckFailure,
    /// RUN - Execute a statement
    Run,
    /// DISCARD_ALL - Drop the pending result stream
    DiscardAll,
    /// PULL_ALL - Stream the pending result
    PullAll,
    /// SUCCESS - Request completed
    Success,
    /// RECORD - One result row
    Record,
    /// IGNORED - Request skipped by the server
    Ignored,
    /// FAILURE - Request failed
    Failure,
}

impl MessageType {
    /// Look up a message kind by its code.
    pub fn from_code(code: u8) -> BoltResult<Self> {
        match code {
            tag::INIT => Ok(MessageType::Init),
            tag::ACK_FAILURE => Ok(MessageType::AckFailure),
            tag::RUN => Ok(MessageType::Run),
            tag::DISCARD_ALL => Ok(MessageType::DiscardAll),
            tag::PULL_ALL => Ok(MessageType::PullAll),
            tag::SUCCESS => Ok(MessageType::Success),
            tag::RECORD => Ok(MessageType::Record),
            tag::IGNORED => Ok(MessageType::Ignored),
            tag::FAILURE => Ok(MessageType::Failure),
            other => Err(BoltError::InvalidMessageType(other)),
        }
    }

    /// Get the message code.
    pub fn code(self) -> u8 {
        match self {
            MessageType::Init => tag::INIT,
            MessageType::AckFailure => tag::ACK_FAILURE,
            MessageType::Run => tag::RUN,
            MessageType::DiscardAll => tag::DISCARD_ALL,
            MessageType::PullAll => tag::PULL_ALL,
            MessageType::Success => tag::SUCCESS,
            MessageType::Record => tag::RECORD,
            MessageType::Ignored => tag::IGNORED,
            MessageType::Failure => tag::FAILURE,
        }
    }

    /// Get message name for logging.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Init => "INIT",
            MessageType::AckFailure => "ACK_FAILURE",
            MessageType::Run => "RUN",
            MessageType::DiscardAll => "DISCARD_ALL",
            MessageType::PullAll => "PULL_ALL",
            MessageType::Success => "SUCCESS",
            MessageType::Record => "RECORD",
            MessageType::Ignored => "IGNORED",
            MessageType::Failure => "FAILURE",
        }
    }

    /// Whether the client sends this kind.
    pub fn is_request(self) -> bool {
        self.code() < tag::SUCCESS
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol message: a kind plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageType,
    args: Vec<Value>,
}

impl Message {
    /// Create a message of a known kind.
    pub fn new(kind: MessageType, args: Vec<Value>) -> Self {
        Self { kind, args }
    }

    /// Create a message from a raw code. Fails for codes outside the table.
    pub fn from_code(code: u8, args: Vec<Value>) -> BoltResult<Self> {
        Ok(Self::new(MessageType::from_code(code)?, args))
    }

    /// Message kind.
    pub fn kind(&self) -> MessageType {
        self.kind
    }

    /// Message code.
    pub fn code(&self) -> u8 {
        self.kind.code()
    }

    /// Message arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Take the arguments.
    pub fn into_args(self) -> Vec<Value> {
        self.args
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> Structure {
        Structure::new(self.code(), self.args.clone())
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: Structure) -> BoltResult<Self> {
        Self::from_code(s.tag, s.fields)
    }

    /// Encode to PackStream bytes (before chunking).
    pub fn encode(&self) -> BoltResult<BytesMut> {
        Ok(encode(&Value::Structure(self.to_structure()))?)
    }

    /// Decode one message from a reassembled payload. The payload must hold
    /// exactly one structure value.
    pub fn decode(payload: &[u8]) -> BoltResult<Self> {
        let mut decoder = PackStreamDecoder::new(payload);
        let value = decoder.decode_one()?;
        if !decoder.is_empty() {
            return Err(BoltError::Protocol(format!(
                "{} trailing bytes after message",
                decoder.remaining()
            )));
        }
        let kind = value.type_name();
        match value.into_structure() {
            Some(s) => Self::from_structure(s),
            None => Err(BoltError::Protocol(format!(
                "Expected structure, got {}",
                kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        let table = [
            (MessageType::Init, 0x01),
            (MessageType::AckFailure, 0x0F),
            (MessageType::Run, 0x10),
            (MessageType::DiscardAll, 0x2F),
            (MessageType::PullAll, 0x3F),
            (MessageType::Success, 0x70),
            (MessageType::Record, 0x71),
            (MessageType::Ignored, 0x7E),
            (MessageType::Failure, 0x7F),
        ];
        for (kind, code) in table {
            assert_eq!(kind.code(), code);
            assert_eq!(MessageType::from_code(code).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_code() {
        for code in [0x00, 0x02, 0x11, 0x66, 0x72, 0xFF] {
            assert!(matches!(
                Message::from_code(code, vec![]),
                Err(BoltError::InvalidMessageType(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_request_classification() {
        assert!(MessageType::Run.is_request());
        assert!(MessageType::AckFailure.is_request());
        assert!(!MessageType::Record.is_request());
        assert_eq!(MessageType::PullAll.to_string(), "PULL_ALL");
    }

    #[test]
    fn test_message_structure_roundtrip() {
        let msg = Message::from_code(0x71, vec![Value::List(vec![Value::Integer(1)])]).unwrap();
        let s = msg.to_structure();
        assert_eq!(s.tag, 0x71);
        assert_eq!(Message::from_structure(s).unwrap(), msg);
    }

    #[test]
    fn test_message_decode() {
        // RECORD [1]
        let msg = Message::decode(&[0xB1, 0x71, 0x91, 0x01]).unwrap();
        assert_eq!(msg.kind(), MessageType::Record);
        assert_eq!(msg.args(), &[Value::List(vec![Value::Integer(1)])]);
    }

    #[test]
    fn test_message_decode_rejects_trailing_bytes() {
        assert!(matches!(
            Message::decode(&[0xB0, 0x7E, 0x00]),
            Err(BoltError::Protocol(_))
        ));
    }

    #[test]
    fn test_message_decode_unknown_code() {
        assert!(matches!(
            Message::decode(&[0xB0, 0x55]),
            Err(BoltError::InvalidMessageType(0x55))
        ));
    }

    #[test]
    fn test_message_decode_truncated() {
        assert!(matches!(
            Message::decode(&[0xB1, 0x71]),
            Err(BoltError::PackStream(_))
        ));
        assert!(matches!(Message::decode(&[]), Err(BoltError::PackStream(_))));
    }
}
