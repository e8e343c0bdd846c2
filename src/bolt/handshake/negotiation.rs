//! Client side of the version handshake.

use super::{BoltVersion, HandshakeError, BOLT_MAGIC, HANDSHAKE_SIZE, PROPOSAL_COUNT};

/// Bolt handshake proposal.
///
/// The handshake process:
/// 1. Client optionally sends the 4-byte identification preamble
/// 2. Client sends 4 x 4-byte version proposals, in order of preference,
///    zero-padded when fewer are proposed
/// 3. Server responds with 4-byte agreed version (or 0x00000000 if none)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Proposed versions (ordered by preference, zero-padded)
    proposals: [BoltVersion; PROPOSAL_COUNT],
    /// Whether to prefix the proposals with the identification preamble
    preamble: bool,
}

impl Handshake {
    /// Create a proposal from up to four versions.
    pub fn new(versions: &[BoltVersion]) -> Result<Self, HandshakeError> {
        if versions.len() > PROPOSAL_COUNT {
            return Err(HandshakeError::TooManyProposals(versions.len()));
        }
        if versions.iter().all(|v| v.is_none()) {
            return Err(HandshakeError::NoProposals);
        }

        let mut proposals = [BoltVersion::NONE; PROPOSAL_COUNT];
        proposals[..versions.len()].copy_from_slice(versions);

        Ok(Self {
            proposals,
            preamble: false,
        })
    }

    /// Send the identification preamble before the proposals.
    pub fn with_preamble(mut self, preamble: bool) -> Self {
        self.preamble = preamble;
        self
    }

    /// The proposed versions, including zero padding.
    pub fn proposals(&self) -> &[BoltVersion; PROPOSAL_COUNT] {
        &self.proposals
    }

    /// Bytes the client writes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BOLT_MAGIC.len() + HANDSHAKE_SIZE);
        if self.preamble {
            buf.extend_from_slice(&BOLT_MAGIC);
        }
        for version in &self.proposals {
            buf.extend_from_slice(&version.to_bytes());
        }
        buf
    }

    /// Interpret the server's 4-byte answer.
    ///
    /// Zero means no agreement. Any other value is accepted, even one that
    /// was never proposed.
    pub fn negotiate(&self, response: [u8; 4]) -> Result<BoltVersion, HandshakeError> {
        let agreed = BoltVersion::from_bytes(response);
        if agreed.is_none() {
            return Err(HandshakeError::NoCompatibleVersion);
        }
        if !self.proposals.contains(&agreed) {
            tracing::warn!(%agreed, "server agreed a version that was not proposed");
        }
        Ok(agreed)
    }
}

impl Default for Handshake {
    fn default() -> Self {
        let mut proposals = [BoltVersion::NONE; PROPOSAL_COUNT];
        proposals[0] = BoltVersion::V1;
        Self {
            proposals,
            preamble: false,
        }
    }
}
