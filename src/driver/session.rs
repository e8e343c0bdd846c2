//! Session - one connection, one query at a time
//!
//! ```text
//! Disconnected -> Handshaking -> Ready -> AwaitingResult -> Ready
//!                                  ^                     \-> Failed
//!                                  '------ ACK_FAILURE ------'
//! ```
//!
//! Any I/O or decoding error makes the session `Defunct` and shuts the
//! transport down. There is no reconnect. A parameter the encoder rejects is
//! not a wire error: the request is dropped before anything is written.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};

use super::config::SessionConfig;
use super::connection::{Connection, Transport};
use super::error::{DriverError, DriverResult};
use super::record::Record;
use crate::bolt::{BoltError, BoltVersion, Message, Response, SuccessMessage, Value};

// ============================================================================
// SessionState
// ============================================================================

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport yet
    Disconnected,
    /// Version negotiation and INIT in progress
    Handshaking,
    /// Idle, accepting queries
    Ready,
    /// Request sent, responses outstanding
    AwaitingResult,
    /// Server reported FAILURE; waiting for ACK_FAILURE
    Failed,
    /// Transport broken; unusable
    Defunct,
    /// Closed by the caller
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "DISCONNECTED",
            SessionState::Handshaking => "HANDSHAKING",
            SessionState::Ready => "READY",
            SessionState::AwaitingResult => "AWAITING_RESULT",
            SessionState::Failed => "FAILED",
            SessionState::Defunct => "DEFUNCT",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Blocking protocol session over a single transport.
pub struct Session<T: Transport = TcpStream> {
    connection: Connection<T>,
    config: SessionConfig,
    state: SessionState,
    version: BoltVersion,
    server: Option<String>,
}

impl Session<TcpStream> {
    /// Connect over TCP with default settings.
    pub fn open(host: &str, port: u16) -> DriverResult<Self> {
        Self::open_with_config(host, port, SessionConfig::default())
    }

    /// Connect over TCP.
    pub fn open_with_config(host: &str, port: u16, config: SessionConfig) -> DriverResult<Self> {
        let stream = connect_tcp(host, port, &config)?;
        Session::start(stream, config)
    }
}

fn connect_tcp(host: &str, port: u16, config: &SessionConfig) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        let attempt = match config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                stream.set_read_timeout(config.read_timeout)?;
                stream.set_write_timeout(config.write_timeout)?;
                stream.set_nodelay(true).ok();
                tracing::debug!(%addr, "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connect failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{}:{} did not resolve", host, port),
        )
    }))
}

impl<T: Transport> Session<T> {
    /// Run the handshake and INIT over an already open transport.
    ///
    /// On any failure the transport is shut down before the error returns.
    pub fn start(transport: T, config: SessionConfig) -> DriverResult<Self> {
        let mut session = Self {
            connection: Connection::new(transport, config.max_message_size),
            config,
            state: SessionState::Disconnected,
            version: BoltVersion::NONE,
            server: None,
        };
        session.handshake()?;
        session.init()?;
        Ok(session)
    }

    fn handshake(&mut self) -> DriverResult<()> {
        self.transition(SessionState::Handshaking);

        let handshake = match self.config.handshake() {
            Ok(h) => h,
            Err(e) => {
                self.defunct();
                return Err(DriverError::HandshakeFailed(e));
            }
        };

        match self.connection.handshake(&handshake) {
            Ok(version) => {
                self.version = version;
                Ok(())
            }
            Err(BoltError::Handshake(e)) => {
                self.defunct();
                Err(DriverError::HandshakeFailed(e))
            }
            Err(e) => Err(self.fatal(e)),
        }
    }

    fn init(&mut self) -> DriverResult<()> {
        let init = Message::init(&self.config.user_agent, self.config.auth.as_ref());
        self.send(&[init])?;

        match self.recv()? {
            Response::Success(success) => {
                self.server = success.server().map(String::from);
                tracing::debug!(server = ?self.server, "session initialised");
                self.transition(SessionState::Ready);
                Ok(())
            }
            Response::Failure(failure) => {
                self.defunct();
                Err(DriverError::InitFailed {
                    code: failure.code,
                    message: failure.message,
                })
            }
            other => {
                self.defunct();
                Err(DriverError::InitFailed {
                    code: String::new(),
                    message: format!("unexpected {} response to INIT", other.name()),
                })
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Run a statement and collect every row.
    ///
    /// RUN and PULL_ALL are written back to back. Rows are returned only
    /// after the closing SUCCESS.
    pub fn query(
        &mut self,
        statement: &str,
        parameters: BTreeMap<String, Value>,
    ) -> DriverResult<Vec<Record>> {
        let keys = self.run(statement, parameters, Message::pull_all())?;

        let mut records = Vec::new();
        let mut row_error = None;
        self.finish(|row| {
            if row_error.is_some() {
                return;
            }
            match Record::from_row(&keys, row) {
                Ok(record) => records.push(record),
                Err(e) => row_error = Some(e),
            }
        })?;

        match row_error {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    /// Run a statement and discard its rows, returning the closing metadata.
    pub fn execute(
        &mut self,
        statement: &str,
        parameters: BTreeMap<String, Value>,
    ) -> DriverResult<BTreeMap<String, Value>> {
        self.run(statement, parameters, Message::discard_all())?;
        let summary = self.finish(|_| tracing::trace!("row ignored after DISCARD_ALL"))?;
        Ok(summary.metadata)
    }

    /// Leave the failed state.
    pub fn ack_failure(&mut self) -> DriverResult<()> {
        match self.state {
            SessionState::Failed => {}
            SessionState::Defunct | SessionState::Closed => return Err(DriverError::SessionClosed),
            _ => return Err(self.not_allowed("ACK_FAILURE")),
        }
        self.send(&[Message::ack_failure()])?;

        match self.recv()? {
            Response::Success(_) => {
                self.transition(SessionState::Ready);
                Ok(())
            }
            Response::Failure(failure) => {
                self.defunct();
                Err(DriverError::query(failure.code, failure.message))
            }
            other => Err(self.fatal(BoltError::Protocol(format!(
                "unexpected {} response to ACK_FAILURE",
                other.name()
            )))),
        }
    }

    /// Send RUN plus `tail` and read the RUN response. Returns the field names.
    fn run(
        &mut self,
        statement: &str,
        parameters: BTreeMap<String, Value>,
        tail: Message,
    ) -> DriverResult<Vec<String>> {
        self.ensure_ready()?;
        self.send(&[Message::run(statement, parameters), tail])?;
        self.transition(SessionState::AwaitingResult);

        match self.recv()? {
            Response::Success(success) => Ok(success.fields().unwrap_or_default()),
            Response::Failure(failure) => {
                self.drain()?;
                self.transition(SessionState::Failed);
                Err(DriverError::query(failure.code, failure.message))
            }
            Response::Ignored => {
                self.drain()?;
                self.transition(SessionState::Ready);
                Err(DriverError::Ignored)
            }
            Response::Record(_) => Err(self.fatal(BoltError::Protocol(
                "RECORD before RUN was answered".to_string(),
            ))),
        }
    }

    /// Read rows until the terminal response to the second request.
    fn finish(&mut self, mut on_row: impl FnMut(Vec<Value>)) -> DriverResult<SuccessMessage> {
        loop {
            match self.recv()? {
                Response::Record(record) => on_row(record.fields),
                Response::Success(success) => {
                    self.transition(SessionState::Ready);
                    return Ok(success);
                }
                Response::Failure(failure) => {
                    self.transition(SessionState::Failed);
                    return Err(DriverError::query(failure.code, failure.message));
                }
                Response::Ignored => {
                    self.transition(SessionState::Ready);
                    return Err(DriverError::Ignored);
                }
            }
        }
    }

    /// Consume the response to a request whose predecessor already failed.
    fn drain(&mut self) -> DriverResult<()> {
        while !self.recv()?.is_terminal() {}
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Shut the transport down. Closing twice is fine.
    pub fn close(&mut self) -> DriverResult<()> {
        if self.state != SessionState::Closed {
            self.connection.shutdown();
            self.transition(SessionState::Closed);
        }
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Agreed protocol version.
    pub fn version(&self) -> BoltVersion {
        self.version
    }

    /// Server identification from the INIT response.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Settings the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether queries can be issued.
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn ensure_ready(&self) -> DriverResult<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Defunct | SessionState::Closed => Err(DriverError::SessionClosed),
            _ => Err(self.not_allowed("RUN")),
        }
    }

    fn not_allowed(&self, request: &str) -> DriverError {
        let hint = if self.state == SessionState::Failed {
            "; acknowledge the failure first"
        } else {
            ""
        };
        DriverError::invalid_state(format!("cannot send {} in state {}{}", request, self.state, hint))
    }

    /// Queue and write a request batch. A parameter the encoder rejects is
    /// reported before anything is queued and leaves the state as it was.
    fn send(&mut self, messages: &[Message]) -> DriverResult<()> {
        match self.connection.send(messages) {
            Ok(()) => {}
            Err(BoltError::PackStream(e)) => {
                tracing::debug!(error = %e, "request not sent");
                return Err(DriverError::UnsupportedValue(e));
            }
            Err(e) => return Err(self.fatal(e)),
        }
        self.connection.flush().map_err(|e| self.fatal(e))
    }

    fn recv(&mut self) -> DriverResult<Response> {
        match self.connection.recv() {
            Ok(response) => Ok(response),
            Err(e) => Err(self.fatal(e)),
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "session state");
            self.state = next;
        }
    }

    fn defunct(&mut self) {
        self.transition(SessionState::Defunct);
        self.connection.shutdown();
    }

    fn fatal(&mut self, err: BoltError) -> DriverError {
        tracing::warn!(error = %err, "session defunct");
        self.defunct();
        DriverError::Transport(err)
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.connection.shutdown();
    }
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("server", &self.server)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
