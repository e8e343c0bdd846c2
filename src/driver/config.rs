//! Session configuration.

use std::time::Duration;

use crate::bolt::codec::DEFAULT_MAX_MESSAGE_SIZE;
use crate::bolt::{AuthToken, BoltVersion, Handshake, HandshakeError};

/// Default user agent sent in INIT.
pub const DEFAULT_USER_AGENT: &str = concat!("packbolt/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SessionConfig
// ============================================================================

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// User agent sent in INIT
    pub user_agent: String,
    /// Proposed protocol versions, most preferred first
    pub versions: Vec<BoltVersion>,
    /// Authentication token appended to INIT
    pub auth: Option<AuthToken>,
    /// Send the 4-byte identification preamble before the proposals
    pub magic_preamble: bool,
    /// Cap on a reassembled message
    pub max_message_size: usize,
    /// TCP connect timeout
    pub connect_timeout: Option<Duration>,
    /// Socket read timeout
    pub read_timeout: Option<Duration>,
    /// Socket write timeout
    pub write_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Build the handshake for the configured proposals.
    pub fn handshake(&self) -> Result<Handshake, HandshakeError> {
        Ok(Handshake::new(&self.versions)?.with_preamble(self.magic_preamble))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            versions: vec![BoltVersion::V1],
            auth: None,
            magic_preamble: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

// ============================================================================
// SessionConfigBuilder
// ============================================================================

/// Builder for [`SessionConfig`].
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the proposed versions. At most four are allowed.
    pub fn with_versions(mut self, versions: Vec<BoltVersion>) -> Self {
        self.config.versions = versions;
        self
    }

    /// Set the authentication token.
    pub fn with_auth(mut self, auth: AuthToken) -> Self {
        self.config.auth = Some(auth);
        self
    }

    /// Basic authentication.
    pub fn with_basic_auth(self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_auth(AuthToken::basic(user, password))
    }

    /// Send the identification preamble.
    pub fn with_magic_preamble(mut self, enabled: bool) -> Self {
        self.config.magic_preamble = enabled;
        self
    }

    /// Set the message size cap.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Set the write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    /// Build.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert!(config.user_agent.starts_with("packbolt/"));
        assert_eq!(config.versions, vec![BoltVersion::V1]);
        assert!(config.auth.is_none());
        assert!(!config.magic_preamble);
        assert_eq!(config.max_message_size, 16 * 1024 * 1024);
        assert!(config.read_timeout.is_none());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::builder()
            .with_user_agent("cli/1.0")
            .with_basic_auth("neo4j", "secret")
            .with_magic_preamble(true)
            .with_read_timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.user_agent, "cli/1.0");
        assert_eq!(config.auth, Some(AuthToken::basic("neo4j", "secret")));
        assert!(config.magic_preamble);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_handshake_from_config() {
        let hs = SessionConfig::default().handshake().unwrap();
        assert_eq!(hs.to_bytes(), vec![0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let hs = SessionConfig::builder()
            .with_magic_preamble(true)
            .build()
            .handshake()
            .unwrap();
        assert_eq!(&hs.to_bytes()[..4], &[0x60, 0x60, 0xB0, 0x17]);
    }

    #[test]
    fn test_too_many_versions() {
        let config = SessionConfig::builder()
            .with_versions((1..=5).map(BoltVersion::new).collect())
            .build();
        assert_eq!(
            config.handshake().unwrap_err(),
            HandshakeError::TooManyProposals(5)
        );
    }
}
