//! Bolt protocol response messages.
//!
//! Response messages are sent from the server to the client.

use std::collections::BTreeMap;

use super::{Message, MessageType};
use crate::bolt::packstream::Value;
use crate::bolt::{BoltError, BoltResult};

/// All Bolt response messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// SUCCESS - Operation completed successfully
    Success(SuccessMessage),
    /// RECORD - Query result record
    Record(RecordMessage),
    /// FAILURE - Operation failed
    Failure(FailureMessage),
    /// IGNORED - Message was ignored (session in FAILED state)
    Ignored,
}

impl Response {
    /// Get message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Response::Success(_) => "SUCCESS",
            Response::Record(_) => "RECORD",
            Response::Failure(_) => "FAILURE",
            Response::Ignored => "IGNORED",
        }
    }

    /// Whether this response ends the exchange for its request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Response::Record(_))
    }
}

impl TryFrom<Message> for Response {
    type Error = BoltError;

    fn try_from(message: Message) -> BoltResult<Self> {
        let kind = message.kind();
        let mut args = message.into_args().into_iter();
        match kind {
            MessageType::Success => Ok(Response::Success(SuccessMessage::from_arg(args.next()))),
            MessageType::Record => {
                let arg = args.next();
                let kind = arg.as_ref().map_or("nothing", Value::type_name);
                let fields = arg.and_then(|v| match v.as_structure() {
                    Some(_) => v.into_structure().map(|s| s.fields),
                    None => v.into_list(),
                });
                match fields {
                    Some(fields) => Ok(Response::Record(RecordMessage { fields })),
                    None => Err(BoltError::Protocol(format!(
                        "RECORD expects a field list, got {}",
                        kind
                    ))),
                }
            }
            MessageType::Failure => Ok(Response::Failure(FailureMessage::from_arg(args.next()))),
            MessageType::Ignored => Ok(Response::Ignored),
            request => Err(BoltError::Protocol(format!(
                "Unexpected {} message from server",
                request
            ))),
        }
    }
}

/// SUCCESS message - Operation completed successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessMessage {
    /// Response metadata
    pub metadata: BTreeMap<String, Value>,
}

impl SuccessMessage {
    /// Create a SUCCESS message with metadata.
    pub fn with_metadata(metadata: BTreeMap<String, Value>) -> Self {
        Self { metadata }
    }

    fn from_arg(arg: Option<Value>) -> Self {
        Self::with_metadata(text_keyed(arg))
    }

    /// Get metadata entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Get field names from RUN success.
    pub fn fields(&self) -> Option<Vec<String>> {
        self.metadata.get("fields").and_then(|v| {
            v.as_list().map(|list| {
                list.iter()
                    .filter_map(|item| item.as_str().map(|s| s.to_string()))
                    .collect()
            })
        })
    }

    /// Get server name from INIT success.
    pub fn server(&self) -> Option<&str> {
        self.metadata.get("server").and_then(|v| v.as_str())
    }

    /// Convert to a message.
    pub fn to_message(&self) -> Message {
        Message::new(MessageType::Success, vec![Value::from(self.metadata.clone())])
    }
}

/// RECORD message - one row, one value per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMessage {
    /// Field values, positionally matching the field names
    pub fields: Vec<Value>,
}

impl RecordMessage {
    /// Convert to a message.
    pub fn to_message(&self) -> Message {
        Message::new(MessageType::Record, vec![Value::List(self.fields.clone())])
    }
}

/// FAILURE message - Operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessage {
    /// Error code (e.g., "Neo.ClientError.Statement.SyntaxError")
    pub code: String,
    /// Error message
    pub message: String,
}

impl FailureMessage {
    /// Create a new FAILURE message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    fn from_arg(arg: Option<Value>) -> Self {
        let metadata = text_keyed(arg);
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        Self::new(text("code"), text("message"))
    }

    /// Convert to a message.
    pub fn to_message(&self) -> Message {
        let mut metadata = BTreeMap::new();
        metadata.insert("code".to_string(), Value::from(self.code.as_str()));
        metadata.insert("message".to_string(), Value::from(self.message.as_str()));
        Message::new(MessageType::Failure, vec![Value::from(metadata)])
    }
}

/// Keep the text-keyed entries of a metadata map; anything else is dropped.
fn text_keyed(arg: Option<Value>) -> BTreeMap<String, Value> {
    arg.and_then(Value::into_map)
        .map(|map| {
            map.into_iter()
                .filter_map(|(k, v)| k.into_text().map(|k| (k, v)))
                .collect()
        })
        .unwrap_or_default()
}
