//! Bolt protocol version numbers.

use std::fmt;

/// A protocol version as carried in the handshake: one 4-byte big-endian
/// unsigned integer. Zero is reserved for "no version".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoltVersion(u32);

impl BoltVersion {
    /// The all-zero sentinel: an empty proposal slot, or the server's
    /// "no compatible version" answer.
    pub const NONE: BoltVersion = BoltVersion(0);

    /// Bolt version 1.
    pub const V1: BoltVersion = BoltVersion(1);

    /// Create a BoltVersion from a raw u32 value.
    pub const fn new(value: u32) -> Self {
        BoltVersion(value)
    }

    /// Get the raw u32 value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Whether this is the zero sentinel.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Convert to big-endian bytes.
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse from big-endian bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        BoltVersion(u32::from_be_bytes(bytes))
    }
}

impl Default for BoltVersion {
    fn default() -> Self {
        BoltVersion::V1
    }
}

impl From<u32> for BoltVersion {
    fn from(value: u32) -> Self {
        BoltVersion(value)
    }
}

impl fmt::Display for BoltVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
