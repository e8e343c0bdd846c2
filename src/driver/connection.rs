//! Blocking Bolt connection.
//!
//! Owns the transport, performs the handshake and moves framed messages in
//! and out of it. Writes are buffered until [`Connection::flush`] so that
//! pipelined requests leave in one write.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::bolt::handshake::HANDSHAKE_RESPONSE_SIZE;
use crate::bolt::{
    BoltError, BoltResult, BoltVersion, Handshake, HandshakeError, Message, MessageCodec,
    Response,
};

/// Size of a single socket read
const READ_CHUNK_SIZE: usize = 8192;

/// Byte stream a session runs over.
pub trait Transport: Read + Write {
    /// Close both directions of the stream.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Client-side Bolt connection.
pub struct Connection<T: Transport> {
    /// Underlying stream
    transport: T,
    /// Message codec (chunk framing + PackStream)
    codec: MessageCodec,
    /// Read buffer
    read_buffer: BytesMut,
    /// Write buffer
    write_buffer: BytesMut,
    /// Whether the transport is still open
    open: bool,
}

impl<T: Transport> Connection<T> {
    /// Wrap a transport.
    pub fn new(transport: T, max_message_size: usize) -> Self {
        Self {
            transport,
            codec: MessageCodec::with_max_size(max_message_size),
            read_buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            write_buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            open: true,
        }
    }

    /// Whether the transport has not been shut down.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Write the proposals and read the agreed version.
    pub fn handshake(&mut self, handshake: &Handshake) -> BoltResult<BoltVersion> {
        self.transport.write_all(&handshake.to_bytes())?;
        self.transport.flush()?;

        let mut response = [0u8; HANDSHAKE_RESPONSE_SIZE];
        self.transport.read_exact(&mut response).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                BoltError::Handshake(HandshakeError::ConnectionClosed)
            } else {
                BoltError::Io(e)
            }
        })?;

        let version = handshake.negotiate(response)?;
        tracing::debug!(%version, "protocol version agreed");
        Ok(version)
    }

    /// Queue messages. Nothing is written until [`flush`](Self::flush).
    ///
    /// The batch is encoded as a whole first; if any message fails to encode
    /// nothing is queued.
    pub fn send(&mut self, messages: &[Message]) -> BoltResult<()> {
        let mut framed = BytesMut::new();
        for message in messages {
            self.codec.encode(message, &mut framed)?;
        }
        for message in messages {
            tracing::debug!("C: {}", message.kind());
        }
        self.write_buffer.extend_from_slice(&framed);
        Ok(())
    }

    /// Write every queued message.
    pub fn flush(&mut self) -> BoltResult<()> {
        if !self.write_buffer.is_empty() {
            tracing::trace!(bytes = self.write_buffer.len(), "flushing");
            self.transport.write_all(&self.write_buffer)?;
            self.write_buffer.clear();
        }
        self.transport.flush()?;
        Ok(())
    }

    /// Block until the next response message is complete.
    pub fn recv(&mut self) -> BoltResult<Response> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(message) = self.codec.decode(&mut self.read_buffer)? {
                return to_response(message);
            }

            let n = match self.transport.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                return match self.codec.decode_eof(&mut self.read_buffer)? {
                    Some(message) => to_response(message),
                    None => Err(BoltError::ConnectionClosed),
                };
            }
            self.read_buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Shut the transport down. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.transport.shutdown() {
            tracing::trace!(error = %e, "transport shutdown failed");
        }
    }
}

fn to_response(message: Message) -> BoltResult<Response> {
    let response = Response::try_from(message)?;
    tracing::debug!("S: {}", response.name());
    Ok(response)
}

/// Scripted in-memory transport for tests.
#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;
    use std::io::{self, Read, Write};
    use std::rc::Rc;

    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    use super::Transport;
    use crate::bolt::{Message, MessageCodec};

    #[derive(Debug, Default)]
    struct MockState {
        input: Vec<u8>,
        position: usize,
        output: Vec<u8>,
        shut_down: bool,
    }

    /// Replays scripted input and records everything written. Clones share
    /// state, so a test can keep a handle after moving one into a session.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockTransport {
        state: Rc<RefCell<MockState>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn push_bytes(&self, bytes: &[u8]) -> &Self {
            self.state.borrow_mut().input.extend_from_slice(bytes);
            self
        }

        pub(crate) fn push_version(&self, version: u32) -> &Self {
            self.push_bytes(&version.to_be_bytes())
        }

        pub(crate) fn push_message(&self, message: &Message) -> &Self {
            let mut buf = BytesMut::new();
            MessageCodec::new().encode(message, &mut buf).unwrap();
            self.push_bytes(&buf)
        }

        pub(crate) fn written(&self) -> Vec<u8> {
            self.state.borrow().output.clone()
        }

        /// Messages written after the first `skip` bytes.
        pub(crate) fn written_messages(&self, skip: usize) -> Vec<Message> {
            let mut buf = BytesMut::from(&self.written()[skip..]);
            let mut codec = MessageCodec::new();
            let mut messages = Vec::new();
            while let Some(message) = codec.decode(&mut buf).unwrap() {
                messages.push(message);
            }
            messages
        }

        pub(crate) fn is_shut_down(&self) -> bool {
            self.state.borrow().shut_down
        }
    }

    impl Read for MockTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut state = self.state.borrow_mut();
            if state.shut_down {
                return Ok(0);
            }
            let start = state.position;
            let n = buf.len().min(state.input.len() - start);
            buf[..n].copy_from_slice(&state.input[start..start + n]);
            state.position += n;
            Ok(n)
        }
    }

    impl Write for MockTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut state = self.state.borrow_mut();
            if state.shut_down {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "shut down"));
            }
            state.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockTransport {
        fn shutdown(&mut self) -> io::Result<()> {
            self.state.borrow_mut().shut_down = true;
            Ok(())
        }
    }
}
