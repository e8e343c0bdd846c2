//! # Bolt Protocol Implementation
//!
//! Wire-level pieces of the client: value serialization, chunk framing,
//! version negotiation and the message table.
//!
//! ## Submodules
//!
//! - [`packstream`] - Binary serialization/deserialization
//! - [`message`] - Bolt message types (INIT, RUN, PULL_ALL, etc.)
//! - [`handshake`] - Version negotiation
//! - [`codec`] - Chunk framing as `tokio_util` codecs
//! - [`error`] - Protocol error types
//!
//! ## Note
//!
//! Most users should use the high-level [`crate::driver`] module instead of
//! interacting with the Bolt protocol directly.

pub mod codec;
pub mod error;
pub mod handshake;
pub mod message;
pub mod packstream;

pub use codec::{ChunkCodec, MessageCodec};
pub use error::{BoltError, BoltResult, HandshakeError};
pub use handshake::{BoltVersion, Handshake, BOLT_MAGIC, HANDSHAKE_RESPONSE_SIZE};
pub use message::{
    AuthToken, FailureMessage, Message, MessageType, RecordMessage, Response, SuccessMessage,
};
pub use packstream::{
    Node, PackStreamDecoder, PackStreamEncoder, PackStreamError, Structure, Value,
};
