//! PackStream encoder.

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};

use super::marker::*;
use super::types::{Structure, Value};
use super::PackStreamError;

/// PackStream encoder that writes values to a byte buffer.
pub struct PackStreamEncoder {
    buffer: BytesMut,
}

impl PackStreamEncoder {
    /// Create a new encoder with default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new encoder with specified buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Consume the encoder and return the bytes.
    pub fn into_bytes(self) -> BytesMut {
        self.buffer
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Encode a value.
    pub fn encode(&mut self, value: &Value) -> Result<(), PackStreamError> {
        match value {
            Value::Null => {
                self.encode_null();
                Ok(())
            }
            Value::Boolean(b) => {
                self.encode_bool(*b);
                Ok(())
            }
            Value::Integer(i) => {
                self.encode_int(*i);
                Ok(())
            }
            Value::Float(_) => Err(PackStreamError::UnsupportedValue("Float")),
            Value::Bytes(b) => self.encode_bytes(b),
            Value::Text(s) => self.encode_text(s),
            Value::List(l) => self.encode_list(l),
            Value::Map(m) => self.encode_map(m),
            Value::Structure(s) => self.encode_structure(s),
        }
    }

    /// Encode null.
    pub fn encode_null(&mut self) {
        self.buffer.put_u8(NULL);
    }

    /// Encode a boolean.
    pub fn encode_bool(&mut self, value: bool) {
        self.buffer.put_u8(if value { TRUE } else { FALSE });
    }

    /// Encode an integer using the smallest representation.
    pub fn encode_int(&mut self, value: i64) {
        if can_encode_tiny_int(value) {
            self.buffer.put_u8(value as u8);
        } else if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
            // Only [-128, -17) lands here: positive i8 values are tiny.
            self.buffer.put_u8(INT_8);
            self.buffer.put_i8(value as i8);
        } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
            self.buffer.put_u8(INT_16);
            self.buffer.put_i16(value as i16);
        } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            self.buffer.put_u8(INT_32);
            self.buffer.put_i32(value as i32);
        } else {
            self.buffer.put_u8(INT_64);
            self.buffer.put_i64(value);
        }
    }

    /// Encode a byte array.
    pub fn encode_bytes(&mut self, value: &[u8]) -> Result<(), PackStreamError> {
        let len = value.len();
        if len <= u8::MAX as usize {
            self.buffer.put_u8(BYTES_8);
            self.buffer.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.put_u8(BYTES_16);
            self.buffer.put_u16(len as u16);
        } else if len <= u32::MAX as usize {
            self.buffer.put_u8(BYTES_32);
            self.buffer.put_u32(len as u32);
        } else {
            return Err(PackStreamError::ValueTooLarge("bytes", len));
        }

        self.buffer.put_slice(value);
        Ok(())
    }

    /// Encode text. The size counts UTF-8 bytes, not characters.
    pub fn encode_text(&mut self, value: &str) -> Result<(), PackStreamError> {
        let bytes = value.as_bytes();
        self.put_header(TINY_TEXT_BASE, TEXT_8, bytes.len(), "text")?;
        self.buffer.put_slice(bytes);
        Ok(())
    }

    /// Encode a list.
    pub fn encode_list(&mut self, values: &[Value]) -> Result<(), PackStreamError> {
        self.put_header(TINY_LIST_BASE, LIST_8, values.len(), "list")?;
        for value in values {
            self.encode(value)?;
        }
        Ok(())
    }

    /// Encode a map as interleaved key/value pairs in iteration order.
    pub fn encode_map(&mut self, map: &BTreeMap<Value, Value>) -> Result<(), PackStreamError> {
        self.put_header(TINY_MAP_BASE, MAP_8, map.len(), "map")?;
        for (key, value) in map {
            self.encode(key)?;
            self.encode(value)?;
        }
        Ok(())
    }

    /// Encode a structure: header, tag byte, then fields.
    pub fn encode_structure(&mut self, s: &Structure) -> Result<(), PackStreamError> {
        self.put_header(TINY_STRUCT_BASE, STRUCT_8, s.fields.len(), "structure")?;
        self.buffer.put_u8(s.tag);
        for field in &s.fields {
            self.encode(field)?;
        }
        Ok(())
    }

    /// Write the marker (and size field) shared by text, list, map and
    /// structure. `sized_base` is the 8-bit form; 16- and 32-bit follow it.
    fn put_header(
        &mut self,
        tiny_base: u8,
        sized_base: u8,
        size: usize,
        kind: &'static str,
    ) -> Result<(), PackStreamError> {
        if size < TINY_SIZE_LIMIT {
            self.buffer.put_u8(tiny_base | size as u8);
        } else if size <= u8::MAX as usize {
            self.buffer.put_u8(sized_base);
            self.buffer.put_u8(size as u8);
        } else if size <= u16::MAX as usize {
            self.buffer.put_u8(sized_base + 1);
            self.buffer.put_u16(size as u16);
        } else if size <= u32::MAX as usize {
            self.buffer.put_u8(sized_base + 2);
            self.buffer.put_u32(size as u32);
        } else {
            return Err(PackStreamError::ValueTooLarge(kind, size));
        }
        Ok(())
    }
}

impl Default for PackStreamEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode a single value.
pub fn encode(value: &Value) -> Result<BytesMut, PackStreamError> {
    let mut encoder = PackStreamEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(n: usize) -> Value {
        Value::List(vec![Value::Null; n])
    }

    fn map_of(n: usize) -> Value {
        Value::Map((0..n as i64).map(|i| (Value::Integer(i), Value::Null)).collect())
    }

    fn struct_of(n: usize) -> Value {
        Value::Structure(Structure::new(0x7F, vec![Value::Null; n]))
    }

    #[test]
    fn test_encode_null() {
        assert_eq!(&encode(&Value::Null).unwrap()[..], &[0xC0]);
    }

    #[test]
    fn test_encode_bool() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_bool(true);
        enc.encode_bool(false);
        assert_eq!(enc.as_bytes(), &[0xC3, 0xC2]);
    }

    #[test]
    fn test_encode_tiny_int() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_int(0);
        enc.encode_int(42);
        enc.encode_int(127);
        enc.encode_int(-16);
        enc.encode_int(-1);
        assert_eq!(enc.as_bytes(), &[0x00, 0x2A, 0x7F, 0xF0, 0xFF]);
    }

    #[test]
    fn test_encode_int8() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_int(-17);
        enc.encode_int(-128);
        assert_eq!(enc.as_bytes(), &[0xC8, 0xEF, 0xC8, 0x80]);
    }

    #[test]
    fn test_encode_int16() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_int(128);
        enc.encode_int(-129);
        assert_eq!(enc.as_bytes(), &[0xC9, 0x00, 0x80, 0xC9, 0xFF, 0x7F]);
    }

    #[test]
    fn test_encode_int32() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_int(100000);
        assert_eq!(enc.as_bytes(), &[0xCA, 0x00, 0x01, 0x86, 0xA0]);
    }

    #[test]
    fn test_encode_int64() {
        let bytes = encode(&Value::Integer(2_147_483_648)).unwrap();
        assert_eq!(&bytes[..], &[0xCB, 0, 0, 0, 0, 0x80, 0, 0, 0]);
    }

    #[test]
    fn test_integer_width_table() {
        let cases: [(i64, u8, usize); 14] = [
            (i64::MIN, INT_64, 9),
            (-32769, INT_32, 5),
            (-129, INT_16, 3),
            (-17, INT_8, 2),
            (-1, 0xFF, 1),
            (0, 0x00, 1),
            (42, 0x2A, 1),
            (127, 0x7F, 1),
            (128, INT_16, 3),
            (32767, INT_16, 3),
            (32768, INT_32, 5),
            (2147483647, INT_32, 5),
            (2147483648, INT_64, 9),
            (i64::MAX, INT_64, 9),
        ];
        for (v, marker, len) in cases {
            let bytes = encode(&Value::Integer(v)).unwrap();
            assert_eq!(bytes[0], marker, "marker for {}", v);
            assert_eq!(bytes.len(), len, "length for {}", v);
        }
    }

    #[test]
    fn test_encode_float_unsupported() {
        let err = encode(&Value::Float(1.5)).unwrap_err();
        assert!(matches!(err, PackStreamError::UnsupportedValue("Float")));
    }

    #[test]
    fn test_encode_float_nested_unsupported() {
        let value = Value::List(vec![Value::Integer(1), Value::Float(0.0)]);
        assert!(encode(&value).is_err());
    }

    #[test]
    fn test_encode_tiny_text() {
        let bytes = encode(&Value::from("Hello")).unwrap();
        assert_eq!(&bytes[..], &[0x85, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_encode_empty_text() {
        assert_eq!(&encode(&Value::from("")).unwrap()[..], &[0x80]);
    }

    #[test]
    fn test_encode_text_counts_utf8_bytes() {
        // 2 characters, 4 bytes
        let bytes = encode(&Value::from("éé")).unwrap();
        assert_eq!(bytes[0], 0x84);
    }

    #[test]
    fn test_text_size_boundaries() {
        let bytes = encode(&Value::Text("a".repeat(15))).unwrap();
        assert_eq!(bytes[0], 0x8F);

        let bytes = encode(&Value::Text("a".repeat(16))).unwrap();
        assert_eq!(&bytes[..2], &[TEXT_8, 0x10]);

        let bytes = encode(&Value::Text("a".repeat(255))).unwrap();
        assert_eq!(&bytes[..2], &[TEXT_8, 0xFF]);

        let bytes = encode(&Value::Text("a".repeat(256))).unwrap();
        assert_eq!(&bytes[..3], &[TEXT_16, 0x01, 0x00]);

        let bytes = encode(&Value::Text("a".repeat(65536))).unwrap();
        assert_eq!(&bytes[..5], &[TEXT_32, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_list_size_boundaries() {
        assert_eq!(encode(&list_of(15)).unwrap()[0], 0x9F);
        assert_eq!(&encode(&list_of(16)).unwrap()[..2], &[LIST_8, 0x10]);
        assert_eq!(&encode(&list_of(255)).unwrap()[..2], &[LIST_8, 0xFF]);
        assert_eq!(&encode(&list_of(256)).unwrap()[..3], &[LIST_16, 0x01, 0x00]);
    }

    #[test]
    fn test_map_size_boundaries() {
        assert_eq!(encode(&map_of(15)).unwrap()[0], 0xAF);
        assert_eq!(&encode(&map_of(16)).unwrap()[..2], &[MAP_8, 0x10]);
        assert_eq!(&encode(&map_of(255)).unwrap()[..2], &[MAP_8, 0xFF]);
        assert_eq!(&encode(&map_of(256)).unwrap()[..3], &[MAP_16, 0x01, 0x00]);
    }

    #[test]
    fn test_structure_size_boundaries() {
        assert_eq!(&encode(&struct_of(15)).unwrap()[..2], &[0xBF, 0x7F]);
        assert_eq!(&encode(&struct_of(16)).unwrap()[..3], &[STRUCT_8, 0x10, 0x7F]);
        assert_eq!(&encode(&struct_of(255)).unwrap()[..3], &[STRUCT_8, 0xFF, 0x7F]);
        assert_eq!(
            &encode(&struct_of(256)).unwrap()[..4],
            &[STRUCT_16, 0x01, 0x00, 0x7F]
        );
    }

    #[test]
    fn test_encode_bytes() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(enc.as_bytes(), &[0xCC, 0x03, 1, 2, 3]);
    }

    #[test]
    fn test_encode_tiny_list() {
        let list = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)];
        let mut enc = PackStreamEncoder::new();
        enc.encode_list(&list).unwrap();
        assert_eq!(enc.as_bytes(), &[0x93, 1, 2, 3]);
    }

    #[test]
    fn test_encode_tiny_map() {
        let mut map = BTreeMap::new();
        map.insert(Value::Integer(42), Value::Boolean(false));
        map.insert(Value::from("Hello"), Value::Boolean(true));
        let bytes = encode(&Value::Map(map)).unwrap();
        assert_eq!(
            &bytes[..],
            &[0xA2, 0x2A, 0xC2, 0x85, b'H', b'e', b'l', b'l', b'o', 0xC3]
        );
    }

    #[test]
    fn test_encode_structure() {
        let s = Structure::new(0x70, vec![Value::Integer(1)]);
        let mut enc = PackStreamEncoder::new();
        enc.encode_structure(&s).unwrap();
        assert_eq!(enc.as_bytes(), &[0xB1, 0x70, 0x01]);
    }

    #[test]
    fn test_encoder_clear() {
        let mut enc = PackStreamEncoder::new();
        enc.encode_null();
        assert_eq!(enc.len(), 1);
        enc.clear();
        assert!(enc.is_empty());
    }
}
