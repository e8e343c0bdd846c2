//! PackStream type markers.
//!
//! Each encoded value starts with a marker byte that names its type and, for
//! the tiny encodings, carries the value or the size in its low bits.

/// Null marker
pub const NULL: u8 = 0xC0;

/// Float marker (64-bit IEEE 754). Reserved; not produced or accepted.
pub const FLOAT_64: u8 = 0xC1;

/// Boolean false
pub const FALSE: u8 = 0xC2;
/// Boolean true
pub const TRUE: u8 = 0xC3;

/// Smallest integer encoded inline in the marker byte
pub const TINY_INT_MIN: i64 = -16;
/// Largest integer encoded inline in the marker byte
pub const TINY_INT_MAX: i64 = 127;
/// Integer with a 1-byte payload
pub const INT_8: u8 = 0xC8;
/// Integer with a 2-byte payload
pub const INT_16: u8 = 0xC9;
/// Integer with a 4-byte payload
pub const INT_32: u8 = 0xCA;
/// Integer with an 8-byte payload
pub const INT_64: u8 = 0xCB;

/// Byte array, u8 length (no tiny form)
pub const BYTES_8: u8 = 0xCC;
/// Byte array, u16 length
pub const BYTES_16: u8 = 0xCD;
/// Byte array, u32 length
pub const BYTES_32: u8 = 0xCE;

/// Tiny text (0-15 bytes) uses 0x80-0x8F
pub const TINY_TEXT_BASE: u8 = 0x80;
/// Text, u8 length
pub const TEXT_8: u8 = 0xD0;
/// Text, u16 length
pub const TEXT_16: u8 = 0xD1;
/// Text, u32 length
pub const TEXT_32: u8 = 0xD2;

/// Tiny lists (0-15 elements) use 0x90-0x9F
pub const TINY_LIST_BASE: u8 = 0x90;
/// List, u8 length
pub const LIST_8: u8 = 0xD4;
/// List, u16 length
pub const LIST_16: u8 = 0xD5;
/// List, u32 length
pub const LIST_32: u8 = 0xD6;

/// Tiny maps (0-15 entries) use 0xA0-0xAF
pub const TINY_MAP_BASE: u8 = 0xA0;
/// Map, u8 entry count
pub const MAP_8: u8 = 0xD8;
/// Map, u16 entry count
pub const MAP_16: u8 = 0xD9;
/// Map, u32 entry count
pub const MAP_32: u8 = 0xDA;

/// Tiny structures (0-15 fields) use 0xB0-0xBF
pub const TINY_STRUCT_BASE: u8 = 0xB0;
/// Structure, u8 field count
pub const STRUCT_8: u8 = 0xDC;
/// Structure, u16 field count
pub const STRUCT_16: u8 = 0xDD;
/// Structure, u32 field count
pub const STRUCT_32: u8 = 0xDE;

/// Sizes strictly below this use the tiny marker form.
pub const TINY_SIZE_LIMIT: usize = 0x10;

/// Structure tag the session interprets as a graph node.
pub const NODE_TAG: u8 = 0x01;
/// Reserved for relationships; layout not defined yet.
pub const RELATIONSHIP_TAG: u8 = 0x02;
/// Reserved for paths; layout not defined yet.
pub const PATH_TAG: u8 = 0x03;

/// Check if an integer can be encoded as a tiny int
#[inline]
pub fn can_encode_tiny_int(value: i64) -> bool {
    (TINY_INT_MIN..=TINY_INT_MAX).contains(&value)
}

/// Decode a tiny integer from its marker byte
#[inline]
pub fn decode_tiny_int(marker: u8) -> i64 {
    marker as i8 as i64
}

/// Size embedded in a tiny composite marker.
#[inline]
pub fn tiny_size(marker: u8) -> usize {
    (marker & 0x0F) as usize
}

/// Width in bytes of the size field that follows a sized marker.
///
/// Sized markers come in runs of three (8/16/32-bit) starting at the base.
#[inline]
pub fn size_width(marker: u8, sized_base: u8) -> usize {
    match marker - sized_base {
        0 => 1,
        1 => 2,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_encode_tiny_int() {
        assert!(can_encode_tiny_int(0));
        assert!(can_encode_tiny_int(127));
        assert!(can_encode_tiny_int(-16));
        assert!(can_encode_tiny_int(-1));
        assert!(!can_encode_tiny_int(128));
        assert!(!can_encode_tiny_int(-17));
    }

    #[test]
    fn test_tiny_int_decode() {
        assert_eq!(decode_tiny_int(0x00), 0);
        assert_eq!(decode_tiny_int(0x7F), 127);
        assert_eq!(decode_tiny_int(0xF0), -16);
        assert_eq!(decode_tiny_int(0xFF), -1);
    }

    #[test]
    fn test_tiny_size() {
        assert_eq!(tiny_size(0x80), 0);
        assert_eq!(tiny_size(0x95), 5);
        assert_eq!(tiny_size(0xAF), 15);
        assert_eq!(tiny_size(0xB3), 3);
    }

    #[test]
    fn test_size_width() {
        assert_eq!(size_width(TEXT_8, TEXT_8), 1);
        assert_eq!(size_width(LIST_16, LIST_8), 2);
        assert_eq!(size_width(STRUCT_32, STRUCT_8), 4);
        assert_eq!(size_width(BYTES_32, BYTES_8), 4);
    }

    #[test]
    fn test_marker_ranges_do_not_overlap() {
        assert!(TINY_TEXT_BASE < TINY_LIST_BASE);
        assert!(TINY_LIST_BASE < TINY_MAP_BASE);
        assert!(TINY_MAP_BASE < TINY_STRUCT_BASE);
        assert!(TINY_STRUCT_BASE + 0x0F < NULL);
    }
}
