//! PackStream serialization format.
//!
//! PackStream is the binary serialization format used by the Bolt protocol
//! to encode values for transmission between client and server.
//!
//! # Supported Types
//!
//! - **Null**: Single byte marker
//! - **Boolean**: True/False markers
//! - **Integer**: Narrowest of tiny, 8, 16, 32 or 64-bit big-endian
//! - **Float**: Marker reserved, encoding rejected
//! - **Text**: UTF-8 encoded, tiny or 8/16/32-bit size prefix
//! - **Bytes**: Raw bytes, 8/16/32-bit size prefix
//! - **List**: Heterogeneous collections
//! - **Map**: Arbitrary keys to arbitrary values
//! - **Structure**: Tag byte plus fields, for messages and graph entities

pub mod decoder;
pub mod encoder;
pub mod marker;
pub mod structures;
pub mod types;

pub use decoder::{decode, PackStreamDecoder};
pub use encoder::{encode, PackStreamEncoder};
pub use marker::*;
pub use structures::Node;
pub use types::{Structure, Value};

use std::fmt;

/// PackStream errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackStreamError {
    /// Input ended in the middle of a value
    TruncatedStream {
        /// Bytes the value needs
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },
    /// Unknown marker byte
    UnknownMarker(u8),
    /// The encoder cannot serialize this kind of value
    UnsupportedValue(&'static str),
    /// Invalid UTF-8 in text
    InvalidUtf8(String),
    /// Value too large to encode
    ValueTooLarge(&'static str, usize),
    /// Invalid structure format
    InvalidStructure(String),
}

impl fmt::Display for PackStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackStreamError::TruncatedStream { needed, available } => write!(
                f,
                "Truncated PackStream data: need {} bytes, have {}",
                needed, available
            ),
            PackStreamError::UnknownMarker(m) => write!(f, "Unknown PackStream marker: 0x{:02X}", m),
            PackStreamError::UnsupportedValue(t) => write!(f, "Cannot encode {} values", t),
            PackStreamError::InvalidUtf8(e) => write!(f, "Invalid UTF-8 in text: {}", e),
            PackStreamError::ValueTooLarge(t, s) => write!(f, "{} too large: {} elements", t, s),
            PackStreamError::InvalidStructure(msg) => write!(f, "Invalid structure: {}", msg),
        }
    }
}

impl std::error::Error for PackStreamError {}
