//! GUID storage formats.
//!
//! Binary formats differ only in byte order. `Binary16` keeps the RFC 4122
//! order, `TimeSwapBinary16` moves the time-high and time-mid groups to the
//! front so values sort by time, and `LittleEndianBinary16` reverses each of
//! the first three groups.

use mysqlkit_core::{Error, GuidFormat, Result, Value};
use uuid::Uuid;

/// Source byte index for each position of the time-swapped layout.
const TIME_SWAP_ORDER: [usize; 16] = [6, 7, 4, 5, 0, 1, 2, 3, 8, 9, 10, 11, 12, 13, 14, 15];

/// Source byte index for each position of the little-endian layout.
const LITTLE_ENDIAN_ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

fn reorder(bytes: &[u8; 16], order: &[usize; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (dst, &src) in out.iter_mut().zip(order) {
        *dst = bytes[src];
    }
    out
}

fn unusable_format(format: GuidFormat) -> Error {
    Error::config(format!(
        "GUID format {format:?} has no storage representation; resolve it before use"
    ))
}

/// Store type name for a GUID format.
pub fn store_type_name(format: GuidFormat) -> Option<&'static str> {
    match format {
        GuidFormat::Char36 => Some("char(36)"),
        GuidFormat::Char32 => Some("char(32)"),
        GuidFormat::Binary16 | GuidFormat::TimeSwapBinary16 | GuidFormat::LittleEndianBinary16 => {
            Some("binary(16)")
        }
        GuidFormat::Default | GuidFormat::None => None,
    }
}

/// Check that a format can be stored.
pub fn is_valid_format(format: GuidFormat) -> bool {
    store_type_name(format).is_some()
}

/// Stored bytes of `guid` under a binary format.
pub fn to_bytes(guid: &Uuid, format: GuidFormat) -> Result<[u8; 16]> {
    let bytes = guid.as_bytes();
    match format {
        GuidFormat::Binary16 => Ok(*bytes),
        GuidFormat::TimeSwapBinary16 => Ok(reorder(bytes, &TIME_SWAP_ORDER)),
        GuidFormat::LittleEndianBinary16 => Ok(reorder(bytes, &LITTLE_ENDIAN_ORDER)),
        GuidFormat::Char36 | GuidFormat::Char32 => Err(Error::config(format!(
            "GUID format {format:?} is not a binary format"
        ))),
        GuidFormat::Default | GuidFormat::None => Err(unusable_format(format)),
    }
}

/// Recover a GUID from stored bytes under a binary format.
pub fn from_bytes(bytes: &[u8], format: GuidFormat) -> Result<Uuid> {
    let stored: [u8; 16] = bytes.try_into().map_err(|_| {
        Error::protocol(format!("GUID needs 16 bytes, got {}", bytes.len()))
    })?;
    let mut out = [0u8; 16];
    let order = match format {
        GuidFormat::Binary16 => return Ok(Uuid::from_bytes(stored)),
        GuidFormat::TimeSwapBinary16 => &TIME_SWAP_ORDER,
        GuidFormat::LittleEndianBinary16 => &LITTLE_ENDIAN_ORDER,
        _ => return Err(unusable_format(format)),
    };
    for (i, &src) in order.iter().enumerate() {
        out[src] = stored[i];
    }
    Ok(Uuid::from_bytes(out))
}

/// The value a GUID is stored as.
pub fn to_store_value(guid: &Uuid, format: GuidFormat) -> Result<Value> {
    match format {
        GuidFormat::Char36 => Ok(Value::Text(guid.hyphenated().to_string())),
        GuidFormat::Char32 => Ok(Value::Text(guid.simple().to_string())),
        GuidFormat::Default | GuidFormat::None => Err(unusable_format(format)),
        _ => Ok(Value::Bytes(to_bytes(guid, format)?.to_vec())),
    }
}

/// SQL literal for a GUID.
pub fn literal(guid: &Uuid, format: GuidFormat) -> Result<String> {
    match format {
        GuidFormat::Char36 => Ok(format!("'{}'", guid.hyphenated())),
        GuidFormat::Char32 => Ok(format!("'{}'", guid.simple())),
        GuidFormat::Default | GuidFormat::None => Err(unusable_format(format)),
        _ => Ok(crate::literal::bytes_literal(&to_bytes(guid, format)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Uuid {
        Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap()
    }

    #[test]
    fn test_store_type_names() {
        assert_eq!(store_type_name(GuidFormat::Char36), Some("char(36)"));
        assert_eq!(store_type_name(GuidFormat::Char32), Some("char(32)"));
        assert_eq!(store_type_name(GuidFormat::TimeSwapBinary16), Some("binary(16)"));
        assert_eq!(store_type_name(GuidFormat::None), None);
        assert!(!is_valid_format(GuidFormat::Default));
    }

    #[test]
    fn test_binary_orders() {
        let guid = sample();
        assert_eq!(
            to_bytes(&guid, GuidFormat::Binary16).unwrap(),
            [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]
        );
        assert_eq!(
            to_bytes(&guid, GuidFormat::TimeSwapBinary16).unwrap(),
            [0x66, 0x77, 0x44, 0x55, 0x00, 0x11, 0x22, 0x33, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]
        );
        assert_eq!(
            to_bytes(&guid, GuidFormat::LittleEndianBinary16).unwrap(),
            [0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]
        );
    }

    #[test]
    fn test_bytes_round_trip() {
        let guid = sample();
        for format in [
            GuidFormat::Binary16,
            GuidFormat::TimeSwapBinary16,
            GuidFormat::LittleEndianBinary16,
        ] {
            let stored = to_bytes(&guid, format).unwrap();
            assert_eq!(from_bytes(&stored, format).unwrap(), guid, "{format:?}");
        }
        assert!(from_bytes(&[0u8; 15], GuidFormat::Binary16).unwrap_err().is_protocol_error());
    }

    #[test]
    fn test_text_literals() {
        let guid = sample();
        assert_eq!(
            literal(&guid, GuidFormat::Char36).unwrap(),
            "'00112233-4455-6677-8899-aabbccddeeff'"
        );
        assert_eq!(
            literal(&guid, GuidFormat::Char32).unwrap(),
            "'00112233445566778899aabbccddeeff'"
        );
    }

    #[test]
    fn test_binary_literal() {
        assert_eq!(
            literal(&sample(), GuidFormat::TimeSwapBinary16).unwrap(),
            "X'66774455001122338899AABBCCDDEEFF'"
        );
    }

    #[test]
    fn test_unresolved_format_is_config_error() {
        let guid = sample();
        assert!(literal(&guid, GuidFormat::Default).unwrap_err().is_config_error());
        assert!(literal(&guid, GuidFormat::None).unwrap_err().is_config_error());
        assert!(to_store_value(&guid, GuidFormat::None).unwrap_err().is_config_error());
    }
}
