//! Bolt protocol handshake implementation.
//!
//! The Bolt handshake consists of:
//! 1. Client sends 4 x 4-byte version proposals (most preferred first),
//!    optionally preceded by the 4-byte magic number (0x6060B017)
//! 2. Server responds with 4-byte agreed version (or 0 if none)

mod negotiation;
mod version;

pub use negotiation::Handshake;
pub use version::BoltVersion;

// Re-export error from parent module
pub use super::error::HandshakeError;

/// Bolt identification preamble: 0x6060B017
pub const BOLT_MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// Number of version slots in a proposal
pub const PROPOSAL_COUNT: usize = 4;

/// Size of the version proposals sent by the client
pub const HANDSHAKE_SIZE: usize = PROPOSAL_COUNT * 4;

/// Size of server response (negotiated version)
pub const HANDSHAKE_RESPONSE_SIZE: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_constant() {
        assert_eq!(BOLT_MAGIC, [0x60, 0x60, 0xB0, 0x17]);
    }

    #[test]
    fn test_handshake_sizes() {
        assert_eq!(HANDSHAKE_SIZE, 16);
        assert_eq!(HANDSHAKE_RESPONSE_SIZE, 4);
    }
}
