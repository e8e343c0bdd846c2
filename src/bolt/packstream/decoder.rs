//! PackStream decoder.

use std::collections::BTreeMap;

use bytes::Buf;

use super::marker::*;
use super::types::{Structure, Value};
use super::PackStreamError;

/// PackStream decoder that reads values from a byte buffer.
///
/// Each call to [`decode_one`](Self::decode_one) consumes exactly one value.
/// After an error the read position is no longer meaningful.
pub struct PackStreamDecoder<'a> {
    data: &'a [u8],
    total: usize,
}

impl<'a> PackStreamDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            total: data.len(),
        }
    }

    /// Get the current position.
    pub fn position(&self) -> usize {
        self.total - self.data.len()
    }

    /// Get remaining bytes count.
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    /// Check if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next value.
    ///
    /// Composite values are assembled on an explicit stack of open frames,
    /// so nesting depth is limited by the input, not the thread stack.
    pub fn decode_one(&mut self) -> Result<Value, PackStreamError> {
        let mut open: Vec<Frame> = Vec::new();
        loop {
            let mut value = match self.read_head()? {
                Head::Value(value) => value,
                Head::Open(frame) if frame.is_complete() => frame.finish(),
                Head::Open(frame) => {
                    open.push(frame);
                    continue;
                }
            };

            // Hand the value to its parent, closing every frame it completes.
            loop {
                match open.pop() {
                    None => return Ok(value),
                    Some(mut frame) => {
                        frame.push(value);
                        if !frame.is_complete() {
                            open.push(frame);
                            break;
                        }
                        value = frame.finish();
                    }
                }
            }
        }
    }

    /// Read one marker and whatever follows it up to the first child.
    fn read_head(&mut self) -> Result<Head, PackStreamError> {
        let marker = self.read_u8()?;

        let value = match marker {
            0x00..=0x7F | 0xF0..=0xFF => Value::Integer(decode_tiny_int(marker)),
            NULL => Value::Null,
            FALSE => Value::Boolean(false),
            TRUE => Value::Boolean(true),
            INT_8 => Value::Integer(self.read_i8()? as i64),
            INT_16 => Value::Integer(self.read_i16()? as i64),
            INT_32 => Value::Integer(self.read_i32()? as i64),
            INT_64 => Value::Integer(self.read_i64()?),

            0x80..=0x8F => self.read_text_data(tiny_size(marker))?,
            0x90..=0x9F => return Ok(Head::Open(Frame::list(tiny_size(marker)))),
            0xA0..=0xAF => return Ok(Head::Open(Frame::map(tiny_size(marker)))),
            0xB0..=0xBF => return self.open_struct(tiny_size(marker)),

            BYTES_8..=BYTES_32 => {
                let len = self.read_size(size_width(marker, BYTES_8))?;
                self.read_bytes_data(len)?
            }
            TEXT_8..=TEXT_32 => {
                let len = self.read_size(size_width(marker, TEXT_8))?;
                self.read_text_data(len)?
            }
            LIST_8..=LIST_32 => {
                let len = self.read_size(size_width(marker, LIST_8))?;
                return Ok(Head::Open(Frame::list(len)));
            }
            MAP_8..=MAP_32 => {
                let len = self.read_size(size_width(marker, MAP_8))?;
                return Ok(Head::Open(Frame::map(len)));
            }
            STRUCT_8..=STRUCT_32 => {
                let len = self.read_size(size_width(marker, STRUCT_8))?;
                return self.open_struct(len);
            }

            _ => return Err(PackStreamError::UnknownMarker(marker)),
        };
        Ok(Head::Value(value))
    }

    fn read_bytes_data(&mut self, len: usize) -> Result<Value, PackStreamError> {
        let bytes = self.read_bytes(len)?;
        Ok(Value::Bytes(bytes.to_vec()))
    }

    fn read_text_data(&mut self, len: usize) -> Result<Value, PackStreamError> {
        let bytes = self.read_bytes(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| PackStreamError::InvalidUtf8(e.to_string()))?;
        Ok(Value::Text(s.to_string()))
    }

    fn open_struct(&mut self, field_count: usize) -> Result<Head, PackStreamError> {
        let tag = self.read_u8()?;
        Ok(Head::Open(Frame::Structure {
            tag,
            // A declared size is untrusted until the fields actually arrive.
            fields: Vec::with_capacity(field_count.min(64)),
            remaining: field_count,
        }))
    }

    // Low-level read methods

    fn ensure(&self, len: usize) -> Result<(), PackStreamError> {
        if self.data.remaining() < len {
            return Err(PackStreamError::TruncatedStream {
                needed: len,
                available: self.data.remaining(),
            });
        }
        Ok(())
    }

    fn read_size(&mut self, width: usize) -> Result<usize, PackStreamError> {
        match width {
            1 => Ok(self.read_u8()? as usize),
            2 => {
                self.ensure(2)?;
                Ok(self.data.get_u16() as usize)
            }
            _ => {
                self.ensure(4)?;
                Ok(self.data.get_u32() as usize)
            }
        }
    }

    fn read_u8(&mut self) -> Result<u8, PackStreamError> {
        self.ensure(1)?;
        Ok(self.data.get_u8())
    }

    fn read_i8(&mut self) -> Result<i8, PackStreamError> {
        self.ensure(1)?;
        Ok(self.data.get_i8())
    }

    fn read_i16(&mut self) -> Result<i16, PackStreamError> {
        self.ensure(2)?;
        Ok(self.data.get_i16())
    }

    fn read_i32(&mut self) -> Result<i32, PackStreamError> {
        self.ensure(4)?;
        Ok(self.data.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64, PackStreamError> {
        self.ensure(8)?;
        Ok(self.data.get_i64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PackStreamError> {
        self.ensure(len)?;
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }
}

/// Result of reading one marker.
enum Head {
    /// A complete scalar or text/bytes value
    Value(Value),
    /// A composite whose children follow
    Open(Frame),
}

/// A composite value still waiting for children.
enum Frame {
    List {
        items: Vec<Value>,
        remaining: usize,
    },
    Map {
        map: BTreeMap<Value, Value>,
        key: Option<Value>,
        remaining: usize,
    },
    Structure {
        tag: u8,
        fields: Vec<Value>,
        remaining: usize,
    },
}

impl Frame {
    fn list(len: usize) -> Self {
        Frame::List {
            items: Vec::with_capacity(len.min(1024)),
            remaining: len,
        }
    }

    fn map(len: usize) -> Self {
        Frame::Map {
            map: BTreeMap::new(),
            key: None,
            remaining: len,
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Frame::List { remaining, .. }
            | Frame::Map { remaining, .. }
            | Frame::Structure { remaining, .. } => *remaining == 0,
        }
    }

    fn push(&mut self, value: Value) {
        match self {
            Frame::List { items, remaining } => {
                items.push(value);
                *remaining -= 1;
            }
            Frame::Structure { fields, remaining, .. } => {
                fields.push(value);
                *remaining -= 1;
            }
            Frame::Map { map, key, remaining } => match key.take() {
                Some(k) => {
                    // last write wins
                    map.insert(k, value);
                    *remaining -= 1;
                }
                None => *key = Some(value),
            },
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::List { items, .. } => Value::List(items),
            Frame::Map { map, .. } => Value::Map(map),
            Frame::Structure { tag, fields, .. } => Value::Structure(Structure::new(tag, fields)),
        }
    }
}

/// Convenience function to decode a single value from bytes.
///
/// Trailing bytes after the first value are ignored.
pub fn decode(data: &[u8]) -> Result<Value, PackStreamError> {
    let mut decoder = PackStreamDecoder::new(data);
    decoder.decode_one()
}
