//! BYTES, ENUM and SET decoders.

use mysqlkit_core::{NativeType, Result, TextEncoding, Value, is_binary_collation};

use super::truncated;
use crate::column::{ColumnDescriptor, ContentType};
use crate::wire::WireReader;

/// How a BYTES column is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesMode {
    /// Character string in the column's charset
    Text(TextEncoding),
    /// ENUM member name
    Enum(TextEncoding),
    /// XML document text
    Xml(TextEncoding),
    /// Raw binary string
    Bytes,
    /// Server geometry blob
    Geometry,
    /// JSON document
    Json,
}

/// Decoder for BYTES and ENUM columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesDecoder {
    is_enum: bool,
    mode: BytesMode,
}

impl BytesDecoder {
    pub fn new(is_enum: bool) -> Self {
        let mode = if is_enum {
            BytesMode::Enum(TextEncoding::Utf8)
        } else {
            BytesMode::Bytes
        };
        Self { is_enum, mode }
    }

    /// The selected decoding mode.
    pub fn mode(&self) -> BytesMode {
        self.mode
    }

    /// Classify the column: enum, then content type, then binary
    /// collation, else character string.
    pub(crate) fn set_metadata(&mut self, column: &ColumnDescriptor) -> Result<()> {
        self.mode = if self.is_enum {
            BytesMode::Enum(encoding_for(column)?)
        } else {
            match column.content_type {
                ContentType::Geometry => BytesMode::Geometry,
                ContentType::Json => BytesMode::Json,
                ContentType::Xml => BytesMode::Xml(encoding_for(column)?),
                ContentType::Plain if column.collation_id == 0 => {
                    BytesMode::Text(TextEncoding::Utf8)
                }
                // Unknown collation ids keep no name and fall back to raw bytes
                ContentType::Plain
                    if column.collation_name.is_empty()
                        || is_binary_collation(&column.collation_name) =>
                {
                    BytesMode::Bytes
                }
                ContentType::Plain => {
                    BytesMode::Text(TextEncoding::for_charset(&column.charset_name)?)
                }
            }
        };
        Ok(())
    }

    pub fn native_type(&self) -> NativeType {
        match self.mode {
            BytesMode::Text(_) | BytesMode::Enum(_) | BytesMode::Xml(_) => NativeType::String,
            BytesMode::Bytes => NativeType::Bytes,
            BytesMode::Geometry => NativeType::Geometry,
            BytesMode::Json => NativeType::Json,
        }
    }

    /// Decode a value; every BYTES value carries one trailing pad byte.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let payload = strip_terminator(bytes);
        Ok(match self.mode {
            BytesMode::Text(enc) | BytesMode::Enum(enc) | BytesMode::Xml(enc) => {
                Value::Text(enc.decode(payload)?)
            }
            BytesMode::Bytes => Value::Bytes(payload.to_vec()),
            BytesMode::Geometry => Value::Geometry(payload.to_vec()),
            BytesMode::Json => Value::Json(serde_json::from_slice(payload)?),
        })
    }
}

/// Decoder for SET columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDecoder {
    encoding: TextEncoding,
}

impl Default for SetDecoder {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
        }
    }
}

impl SetDecoder {
    pub(crate) fn set_metadata(&mut self, column: &ColumnDescriptor) -> Result<()> {
        self.encoding = encoding_for(column)?;
        Ok(())
    }

    /// Decode length-prefixed members into a comma-joined string.
    ///
    /// A lone `0x00` or `0x01` byte both decode to the empty string.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if matches!(bytes, [0x00] | [0x01]) {
            return Ok(Value::Text(String::new()));
        }

        let mut reader = WireReader::new(bytes);
        let mut members = Vec::new();
        while !reader.is_empty() {
            let len = reader
                .read_varint()
                .and_then(|len| usize::try_from(len).ok())
                .ok_or_else(|| truncated("set", bytes))?;
            let member = reader
                .read_bytes(len)
                .ok_or_else(|| truncated("set", bytes))?;
            members.push(self.encoding.decode(member)?);
        }
        Ok(Value::Text(members.join(",")))
    }
}

/// Text encoding of a column; columns without a charset read as UTF-8.
fn encoding_for(column: &ColumnDescriptor) -> Result<TextEncoding> {
    if column.charset_name.is_empty() {
        Ok(TextEncoding::Utf8)
    } else {
        TextEncoding::for_charset(&column.charset_name)
    }
}

fn strip_terminator(bytes: &[u8]) -> &[u8] {
    bytes.split_last().map_or(bytes, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use mysqlkit_core::Error;

    fn bytes_column(collation: &str, content_type: ContentType) -> ColumnDescriptor {
        let mut col = ColumnDescriptor::new(ColumnType::Bytes);
        col.collation_id = (1..=1023)
            .find(|&id| mysqlkit_core::collation_name(id) == Some(collation))
            .map_or(u64::MAX, u64::from);
        col.collation_name = collation.to_string();
        col.charset_name = mysqlkit_core::charset_of(collation).to_string();
        col.content_type = content_type;
        col
    }

    fn configured(is_enum: bool, column: &ColumnDescriptor) -> BytesDecoder {
        let mut decoder = BytesDecoder::new(is_enum);
        decoder.set_metadata(column).unwrap();
        decoder
    }

    // ==================== Classification ====================

    #[test]
    fn test_text_column() {
        let decoder = configured(false, &bytes_column("utf8mb4_general_ci", ContentType::Plain));
        assert_eq!(decoder.mode(), BytesMode::Text(TextEncoding::Utf8));
        assert_eq!(decoder.native_type(), NativeType::String);
        assert_eq!(
            decoder.decode(b"h\xC3\xA9llo\0").unwrap(),
            Value::Text("héllo".to_string())
        );
    }

    #[test]
    fn test_binary_collation_is_bytes() {
        let decoder = configured(false, &bytes_column("utf8mb4_bin", ContentType::Plain));
        assert_eq!(decoder.native_type(), NativeType::Bytes);
        assert_eq!(decoder.decode(&[1, 2, 3, 0]).unwrap(), Value::Bytes(vec![1, 2, 3]));

        let decoder = configured(false, &bytes_column("binary", ContentType::Plain));
        assert_eq!(decoder.mode(), BytesMode::Bytes);
    }

    #[test]
    fn test_missing_collation_is_utf8_text() {
        let decoder = configured(false, &ColumnDescriptor::new(ColumnType::Bytes));
        assert_eq!(decoder.mode(), BytesMode::Text(TextEncoding::Utf8));
        assert_eq!(decoder.native_type(), NativeType::String);
        assert_eq!(
            decoder.decode("h\u{e9}llo\0".as_bytes()).unwrap(),
            Value::Text("h\u{e9}llo".to_string())
        );
    }

    #[test]
    fn test_unknown_collation_id_is_bytes() {
        let mut col = ColumnDescriptor::new(ColumnType::Bytes);
        col.collation_id = 4000;
        let decoder = configured(false, &col);
        assert_eq!(decoder.mode(), BytesMode::Bytes);
    }

    #[test]
    fn test_content_type_overrides_collation() {
        let decoder = configured(false, &bytes_column("binary", ContentType::Json));
        assert_eq!(decoder.native_type(), NativeType::Json);
        assert_eq!(
            decoder.decode(b"{\"a\":[1,2]}\0").unwrap(),
            Value::Json(serde_json::json!({"a": [1, 2]}))
        );

        let decoder = configured(false, &bytes_column("binary", ContentType::Geometry));
        assert_eq!(decoder.decode(&[9, 8, 0]).unwrap(), Value::Geometry(vec![9, 8]));
    }

    #[test]
    fn test_enum_flag_wins() {
        let decoder = configured(true, &bytes_column("utf8mb4_bin", ContentType::Json));
        assert_eq!(decoder.mode(), BytesMode::Enum(TextEncoding::Utf8));
        assert_eq!(decoder.decode(b"small\0").unwrap(), Value::Text("small".to_string()));
    }

    #[test]
    fn test_latin1_text() {
        let decoder = configured(false, &bytes_column("latin1_swedish_ci", ContentType::Plain));
        assert_eq!(
            decoder.decode(&[0x63, 0x61, 0x66, 0xE9, 0x00]).unwrap(),
            Value::Text("café".to_string())
        );
    }

    #[test]
    fn test_unsupported_charset_fails_at_setup() {
        let mut decoder = BytesDecoder::new(false);
        let err = decoder
            .set_metadata(&bytes_column("sjis_japanese_ci", ContentType::Plain))
            .unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }

    #[test]
    fn test_bad_json_is_serde_error() {
        let decoder = configured(false, &bytes_column("binary", ContentType::Json));
        assert!(matches!(decoder.decode(b"{nope\0"), Err(Error::Serde(_))));
    }

    #[test]
    fn test_empty_string_value() {
        let decoder = configured(false, &bytes_column("utf8_general_ci", ContentType::Plain));
        assert_eq!(decoder.decode(&[0]).unwrap(), Value::Text(String::new()));
    }

    // ==================== Set ====================

    #[test]
    fn test_set_members() {
        let decoder = SetDecoder::default();
        let payload = [0x01, b'a', 0x03, b'b', b'c', b'd'];
        assert_eq!(decoder.decode(&payload).unwrap(), Value::Text("a,bcd".to_string()));
    }

    #[test]
    fn test_set_single_byte_payloads() {
        let decoder = SetDecoder::default();
        assert_eq!(decoder.decode(&[0x00]).unwrap(), Value::Text(String::new()));
        assert_eq!(decoder.decode(&[0x01]).unwrap(), Value::Text(String::new()));
    }

    #[test]
    fn test_set_truncated() {
        let decoder = SetDecoder::default();
        let err = decoder.decode(&[0x05, b'a', b'b']).unwrap_err();
        assert!(err.is_protocol_error());
    }
}
