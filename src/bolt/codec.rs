//! Bolt chunk framing for tokio_util codecs.
//!
//! A message travels as one or more chunks, each a 2-byte big-endian length
//! followed by that many bytes. A zero-length chunk ends the message. The
//! codecs here are plain `Decoder`/`Encoder` implementations over `BytesMut`
//! and are driven synchronously by the session's blocking read loop.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::message::Message;
use super::BoltError;

/// Maximum chunk payload size
pub const MAX_CHUNK_SIZE: usize = 0xFFFF;

/// Size of a chunk header
pub const CHUNK_HEADER_SIZE: usize = 2;

/// End of message marker (0x00 0x00)
pub const END_MARKER: [u8; 2] = [0x00, 0x00];

/// Default cap on a reassembled message (16MB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Chunk framing codec. Yields one reassembled message payload per
/// end-of-message marker.
#[derive(Debug)]
pub struct ChunkCodec {
    /// Maximum message size
    max_message_size: usize,
    /// Buffer for accumulating chunks
    message_buffer: BytesMut,
    /// Are we in the middle of a message?
    in_message: bool,
}

impl ChunkCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a codec with custom max message size.
    pub fn with_max_size(max_message_size: usize) -> Self {
        Self {
            max_message_size,
            message_buffer: BytesMut::with_capacity(4096),
            in_message: false,
        }
    }

    /// Whether part of a message has been consumed without its terminator.
    pub fn in_message(&self) -> bool {
        self.in_message
    }

    /// Split `data` into chunks and append them, plus the terminator, to `dst`.
    fn encode_chunked(&self, data: &[u8], dst: &mut BytesMut) {
        dst.reserve(data.len() + (data.len() / MAX_CHUNK_SIZE + 2) * CHUNK_HEADER_SIZE);
        for chunk in data.chunks(MAX_CHUNK_SIZE) {
            dst.put_u16(chunk.len() as u16);
            dst.put_slice(chunk);
        }
        dst.put_slice(&END_MARKER);
    }
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkCodec {
    type Item = Bytes;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // Need at least 2 bytes for chunk header
            if src.len() < CHUNK_HEADER_SIZE {
                return Ok(None);
            }

            let chunk_size = u16::from_be_bytes([src[0], src[1]]) as usize;

            if chunk_size == 0 {
                src.advance(CHUNK_HEADER_SIZE);
                self.in_message = false;
                tracing::trace!(size = self.message_buffer.len(), "message reassembled");
                return Ok(Some(self.message_buffer.split().freeze()));
            }

            if src.len() < CHUNK_HEADER_SIZE + chunk_size {
                // Partial chunk; the header stays in place until the body arrives.
                src.reserve(CHUNK_HEADER_SIZE + chunk_size - src.len());
                self.in_message = true;
                return Ok(None);
            }

            if self.message_buffer.len() + chunk_size > self.max_message_size {
                return Err(BoltError::MessageTooLarge {
                    size: self.message_buffer.len() + chunk_size,
                    max: self.max_message_size,
                });
            }

            src.advance(CHUNK_HEADER_SIZE);
            self.message_buffer.extend_from_slice(&src[..chunk_size]);
            src.advance(chunk_size);
            self.in_message = true;
            tracing::trace!(chunk_size, "chunk received");
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        if src.is_empty() && !self.in_message {
            return Ok(None);
        }
        Err(BoltError::TruncatedFrame {
            buffered: self.message_buffer.len() + src.len(),
        })
    }
}

impl Encoder<&[u8]> for ChunkCodec {
    type Error = BoltError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode_chunked(item, dst);
        Ok(())
    }
}

/// Codec for whole protocol messages on top of chunk framing.
#[derive(Debug, Default)]
pub struct MessageCodec {
    inner: ChunkCodec,
}

impl MessageCodec {
    /// Create a new message codec.
    pub fn new() -> Self {
        Self {
            inner: ChunkCodec::new(),
        }
    }

    /// Create a message codec with a custom max message size.
    pub fn with_max_size(max_message_size: usize) -> Self {
        Self {
            inner: ChunkCodec::with_max_size(max_message_size),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some(payload) => Message::decode(&payload).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode_eof(src)? {
            Some(payload) => Message::decode(&payload).map(Some),
            None => Ok(None),
        }
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = BoltError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.encode()?;
        self.inner.encode(&payload[..], dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        ChunkCodec::new().encode(payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_chunk_roundtrip_sizes() {
        for n in [0usize, 1, 65535, 65536] {
            let payload: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
            let mut buf = frame(&payload);
            let decoded = ChunkCodec::new().decode(&mut buf).unwrap().unwrap();
            assert_eq!(&decoded[..], &payload[..], "size {}", n);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_chunk_layout() {
        assert_eq!(&frame(&[])[..], &[0x00, 0x00]);
        assert_eq!(&frame(&[0xC0])[..], &[0x00, 0x01, 0xC0, 0x00, 0x00]);

        let buf = frame(&vec![7u8; 65536]);
        assert_eq!(&buf[..2], &[0xFF, 0xFF]);
        assert_eq!(&buf[2 + 65535..2 + 65535 + 3], &[0x00, 0x01, 7]);
        assert_eq!(&buf[buf.len() - 2..], &END_MARKER);
        assert_eq!(buf.len(), 65536 + 3 * CHUNK_HEADER_SIZE);
    }

    #[test]
    fn test_multi_chunk_message_from_peer() {
        // A peer may split arbitrarily; chunks concatenate.
        let mut buf = BytesMut::from(&[0x00, 0x02, 0x91, 0x01, 0x00, 0x01, 0x02, 0x00, 0x00][..]);
        let payload = ChunkCodec::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(&payload[..], &[0x91, 0x01, 0x02]);
    }

    #[test]
    fn test_partial_chunk() {
        let full = frame(b"hello");
        let mut codec = ChunkCodec::new();

        let mut partial = BytesMut::from(&full[..4]);
        assert!(codec.decode(&mut partial).unwrap().is_none());
        assert!(codec.in_message());

        partial.extend_from_slice(&full[4..]);
        let decoded = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(&decoded[..], b"hello");
        assert!(!codec.in_message());
    }

    #[test]
    fn test_eof_mid_chunk_is_truncated_frame() {
        let full = frame(b"hello");
        let mut codec = ChunkCodec::new();
        let mut partial = BytesMut::from(&full[..4]);
        let err = codec.decode_eof(&mut partial).unwrap_err();
        assert!(matches!(err, BoltError::TruncatedFrame { .. }));
    }

    #[test]
    fn test_eof_mid_header_is_truncated_frame() {
        let mut codec = ChunkCodec::new();
        let mut partial = BytesMut::from(&[0x00][..]);
        assert!(matches!(
            codec.decode_eof(&mut partial),
            Err(BoltError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn test_eof_before_terminator_is_truncated_frame() {
        let full = frame(b"hello");
        let mut codec = ChunkCodec::new();
        let mut body = BytesMut::from(&full[..full.len() - 2]);
        assert!(codec.decode(&mut body).unwrap().is_none());
        assert!(matches!(
            codec.decode_eof(&mut body),
            Err(BoltError::TruncatedFrame { buffered: 5 })
        ));
    }

    #[test]
    fn test_eof_between_messages_is_clean() {
        let mut codec = ChunkCodec::new();
        let mut empty = BytesMut::new();
        assert!(codec.decode_eof(&mut empty).unwrap().is_none());
    }

    #[test]
    fn test_message_too_large() {
        let mut codec = ChunkCodec::with_max_size(100);
        let mut buf = BytesMut::new();
        buf.put_u16(200);
        buf.extend_from_slice(&[0u8; 200]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(BoltError::MessageTooLarge { size: 200, max: 100 })
        ));
    }

    #[test]
    fn test_multiple_messages() {
        let mut codec = MessageCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(&Message::pull_all(), &mut buf).unwrap();
        codec.encode(&Message::ack_failure(), &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), Message::pull_all());
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), Message::ack_failure());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_message_codec_wire_bytes() {
        let mut buf = BytesMut::new();
        MessageCodec::new().encode(&Message::pull_all(), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x00, 0x02, 0xB0, 0x3F, 0x00, 0x00]);
    }

    #[test]
    fn test_message_codec_rejects_non_structure() {
        let mut buf = frame(&[0x2A]);
        assert!(matches!(
            MessageCodec::new().decode(&mut buf),
            Err(BoltError::Protocol(_))
        ));
    }
}
