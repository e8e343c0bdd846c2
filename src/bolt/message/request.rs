//! Bolt protocol request messages.
//!
//! Request messages are sent from the client to the server.

use std::collections::BTreeMap;

use super::{Message, MessageType};
use crate::bolt::packstream::Value;

/// Authentication token appended to INIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Authentication scheme (e.g., "basic", "none")
    pub scheme: String,
    /// Principal (username)
    pub principal: Option<String>,
    /// Credentials (password)
    pub credentials: Option<String>,
}

impl AuthToken {
    /// Create a basic auth token.
    pub fn basic(principal: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            scheme: "basic".to_string(),
            principal: Some(principal.into()),
            credentials: Some(credentials.into()),
        }
    }

    /// Create an anonymous auth token (no auth).
    pub fn none() -> Self {
        Self {
            scheme: "none".to_string(),
            principal: None,
            credentials: None,
        }
    }

    /// Convert to PackStream map.
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("scheme".to_string(), Value::from(self.scheme.as_str()));
        if let Some(ref p) = self.principal {
            map.insert("principal".to_string(), Value::from(p.as_str()));
        }
        if let Some(ref c) = self.credentials {
            map.insert("credentials".to_string(), Value::from(c.as_str()));
        }
        Value::from(map)
    }
}

impl Message {
    /// INIT(user_agent[, auth_token])
    pub fn init(user_agent: &str, auth: Option<&AuthToken>) -> Self {
        let mut args = vec![Value::from(user_agent)];
        if let Some(auth) = auth {
            args.push(auth.to_value());
        }
        Message::new(MessageType::Init, args)
    }

    /// RUN(statement, parameters)
    pub fn run(statement: &str, parameters: BTreeMap<String, Value>) -> Self {
        Message::new(
            MessageType::Run,
            vec![Value::from(statement), Value::from(parameters)],
        )
    }

    /// PULL_ALL
    pub fn pull_all() -> Self {
        Message::new(MessageType::PullAll, vec![])
    }

    /// DISCARD_ALL
    pub fn discard_all() -> Self {
        Message::new(MessageType::DiscardAll, vec![])
    }

    /// ACK_FAILURE
    pub fn ack_failure() -> Self {
        Message::new(MessageType::AckFailure, vec![])
    }
}
