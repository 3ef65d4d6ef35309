//! Column metadata decoding.
//!
//! Column metadata arrives with every field optional. Decoding picks the
//! decoder from the type code, copies the fields that are present into a
//! [`ColumnDescriptor`], then lets the decoder refine itself from the
//! populated descriptor: strings, binary strings, enums and JSON all share
//! one type code and are told apart by collation and content type.

use mysqlkit_core::{Error, ProtocolError, Result, Value, charset_of, collation_name};
use serde::{Deserialize, Serialize};

use crate::column::{ColumnDescriptor, ColumnType, ContentType};
use crate::decode::ScalarDecoder;

/// Column metadata as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMetaData {
    pub type_code: Option<u32>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub table: Option<String>,
    pub original_table: Option<String>,
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub collation: Option<u64>,
    pub fractional_digits: Option<u32>,
    pub length: Option<u32>,
    pub flags: Option<u32>,
    pub content_type: Option<u32>,
}

impl ColumnMetaData {
    /// Create metadata with only a type code.
    pub fn new(type_code: u32) -> Self {
        Self {
            type_code: Some(type_code),
            ..Self::default()
        }
    }

    /// Set the column name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the schema name.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the collation id.
    pub fn collation(mut self, collation: u64) -> Self {
        self.collation = Some(collation);
        self
    }

    /// Set the declared length.
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the fractional digits.
    pub fn fractional_digits(mut self, digits: u32) -> Self {
        self.fractional_digits = Some(digits);
        self
    }

    /// Set the column flags.
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Set the content type code.
    pub fn content_type(mut self, content_type: u32) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// Decode one column's metadata into a descriptor and a configured decoder.
pub fn decode_column(meta: &ColumnMetaData) -> Result<(ColumnDescriptor, ScalarDecoder)> {
    let code = meta
        .type_code
        .ok_or_else(|| Error::protocol("column metadata without a type"))?;
    let Some(column_type) = ColumnType::from_code(code) else {
        tracing::warn!(type_code = code, "Unknown column type code");
        return Err(Error::Protocol(ProtocolError::new(format!(
            "unknown column type code {code}"
        ))));
    };

    let mut decoder = ScalarDecoder::for_type(column_type);
    let mut column = ColumnDescriptor::new(column_type);

    copy_text(&mut column.name, meta.name.as_ref());
    copy_text(&mut column.original_name, meta.original_name.as_ref());
    copy_text(&mut column.table, meta.table.as_ref());
    copy_text(&mut column.original_table, meta.original_table.as_ref());
    copy_text(&mut column.schema, meta.schema.as_ref());
    copy_text(&mut column.catalog, meta.catalog.as_ref());

    if let Some(id) = meta.collation.filter(|&id| id > 0) {
        column.collation_id = id;
        match u32::try_from(id).ok().and_then(collation_name) {
            Some(name) => {
                column.collation_name = name.to_string();
                column.charset_name = charset_of(name).to_string();
            }
            None => {
                tracing::warn!(
                    collation = id,
                    column = %column.name,
                    "Unknown collation id, column will decode as binary"
                );
            }
        }
    }
    if let Some(digits) = meta.fractional_digits {
        column.fractional_digits = digits;
    }
    if let Some(length) = meta.length {
        column.length = length;
    }
    if let Some(flags) = meta.flags {
        column.flags = flags;
    }
    if let Some(content_type) = meta.content_type {
        column.content_type = ContentType::from_code(content_type);
    }

    let native = decoder.set_metadata(&column).map_err(|e| with_column(e, &column.name))?;
    tracing::trace!(
        column = %column.name,
        column_type = column_type.name(),
        native = native.name(),
        "Selected decoder"
    );
    Ok((column, decoder))
}

/// Decode the metadata of a whole result set.
#[tracing::instrument(level = "debug", skip(columns), fields(count = columns.len()))]
pub fn decode_columns(columns: &[ColumnMetaData]) -> Result<Vec<(ColumnDescriptor, ScalarDecoder)>> {
    columns.iter().map(decode_column).collect()
}

/// Decode one row; `None` entries are SQL NULL.
pub fn decode_row(
    columns: &[(ColumnDescriptor, ScalarDecoder)],
    row: &[Option<&[u8]>],
) -> Result<Vec<Value>> {
    if columns.len() != row.len() {
        return Err(Error::protocol(format!(
            "row has {} fields, result set has {} columns",
            row.len(),
            columns.len()
        )));
    }

    columns
        .iter()
        .zip(row)
        .map(|((column, decoder), field)| match field {
            None => Ok(Value::Null),
            Some(bytes) => decoder
                .decode(bytes)
                .map_err(|e| with_column(e, &column.name)),
        })
        .collect()
}

fn copy_text(target: &mut String, source: Option<&String>) {
    if let Some(text) = source.filter(|s| !s.is_empty()) {
        target.clone_from(text);
    }
}

/// Attach the column name to type errors.
fn with_column(err: Error, column: &str) -> Error {
    match err {
        Error::Type(mut e) if e.column.is_none() && !column.is_empty() => {
            e.column = Some(column.to_string());
            Error::Type(e)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::column_flags;
    use mysqlkit_core::NativeType;

    #[test]
    fn test_missing_type_code() {
        let err = decode_column(&ColumnMetaData::default()).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_unknown_type_code() {
        let err = decode_column(&ColumnMetaData::new(99)).unwrap_err();
        assert!(err.is_protocol_error());
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_fields_copied_when_present() {
        let meta = ColumnMetaData::new(1)
            .name("id")
            .table("users")
            .schema("")
            .length(11)
            .flags(column_flags::PRIMARY_KEY);
        let (column, decoder) = decode_column(&meta).unwrap();
        assert_eq!(column.name, "id");
        assert_eq!(column.table, "users");
        assert_eq!(column.schema, "");
        assert_eq!(column.length, 11);
        assert!(column.is_primary_key());
        assert_eq!(decoder.native_type(), NativeType::I32);
    }

    #[test]
    fn test_collation_resolution() {
        let meta = ColumnMetaData::new(7).collation(45);
        let (column, decoder) = decode_column(&meta).unwrap();
        assert_eq!(column.collation_id, 45);
        assert_eq!(column.collation_name, "utf8mb4_general_ci");
        assert_eq!(column.charset_name, "utf8mb4");
        assert_eq!(decoder.native_type(), NativeType::String);
    }

    #[test]
    fn test_zero_collation_ignored() {
        let (column, decoder) = decode_column(&ColumnMetaData::new(7).collation(0)).unwrap();
        assert_eq!(column.collation_id, 0);
        assert!(column.collation_name.is_empty());
        assert_eq!(decoder.native_type(), NativeType::String);
    }

    #[test]
    fn test_bytes_without_collation_decodes_as_text() {
        let (_, decoder) = decode_column(&ColumnMetaData::new(7)).unwrap();
        assert_eq!(decoder.native_type(), NativeType::String);
        assert_eq!(decoder.decode(b"abc\0").unwrap(), Value::Text("abc".to_string()));
    }

    #[test]
    fn test_unknown_collation_falls_back_to_bytes() {
        let (column, decoder) = decode_column(&ColumnMetaData::new(7).collation(4000)).unwrap();
        assert_eq!(column.collation_id, 4000);
        assert!(column.collation_name.is_empty());
        assert_eq!(decoder.native_type(), NativeType::Bytes);
    }

    #[test]
    fn test_decode_row_nulls_and_mismatch() {
        let columns = decode_columns(&[ColumnMetaData::new(1), ColumnMetaData::new(2)]).unwrap();
        let values = decode_row(&columns, &[None, Some(&[0x05][..])]).unwrap();
        assert_eq!(values, vec![Value::Null, Value::UnsignedBigInt(5)]);

        let err = decode_row(&columns, &[None]).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_type_error_names_column() {
        let columns = decode_columns(&[ColumnMetaData::new(12).name("created").length(19)]).unwrap();
        let err = decode_row(&columns, &[Some(&[0x00, 0x00, 0x00][..])]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type error in column 'created': expected valid date, found 0000-00-00"
        );
    }
}
