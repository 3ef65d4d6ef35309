//! Outgoing parameter configuration.
//!
//! Sizes are rounded up to the mapping's bucket rather than the value's own
//! length so the server sees few distinct parameter shapes. A value that
//! does not fit its bucket is sent unbounded instead of being truncated.

use mysqlkit_core::{Result, Value};
use serde::{Deserialize, Serialize};

use crate::mapping::{DbType, MappingKind, TypeMapping};

/// Parameter size meaning "no bound".
pub const UNBOUNDED_SIZE: i32 = -1;

/// Default bucket for unicode strings without a size.
pub const UNICODE_STRING_BUCKET: u32 = 4000;

/// Default bucket for ansi strings without a size.
pub const ANSI_STRING_BUCKET: u32 = 8000;

/// Default bucket for byte arrays without a size.
pub const BINARY_BUCKET: u32 = 8000;

/// A value bound for a single outgoing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingParameter {
    pub value: Value,
    /// Bucket size, [`UNBOUNDED_SIZE`], or `None` for unsized types
    pub size: Option<i32>,
    pub db_type: DbType,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

/// Bucket a mapping sizes its parameters to, if it has one.
pub fn size_bucket(mapping: &TypeMapping) -> Option<u32> {
    match mapping.kind() {
        MappingKind::String => Some(mapping.size().unwrap_or(if mapping.is_unicode() {
            UNICODE_STRING_BUCKET
        } else {
            ANSI_STRING_BUCKET
        })),
        MappingKind::Bytes => Some(mapping.size().unwrap_or(BINARY_BUCKET)),
        _ => None,
    }
}

pub(crate) fn configure(mapping: &TypeMapping, value: &Value) -> Result<OutgoingParameter> {
    let value = mapping.to_store_value(value)?;
    let size = size_bucket(mapping).map(|bucket| {
        let fits = value.is_null()
            || value
                .measurable_len()
                .is_none_or(|len| len <= bucket as usize);
        if fits {
            i32::try_from(bucket).unwrap_or(UNBOUNDED_SIZE)
        } else {
            UNBOUNDED_SIZE
        }
    });
    tracing::trace!(
        store_type = %mapping.store_type(),
        size = ?size,
        "Configured parameter"
    );
    Ok(OutgoingParameter {
        value,
        size,
        db_type: mapping.db_type(),
        precision: mapping.precision(),
        scale: mapping.scale(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysqlkit_core::NativeType;

    fn text() -> TypeMapping {
        TypeMapping::string("text", false, false)
    }

    #[test]
    fn test_string_within_bucket_gets_bucket_size() {
        let param = configure(&text(), &Value::Text("x".repeat(10))).unwrap();
        assert_eq!(param.size, Some(4000));
        assert_eq!(param.db_type, DbType::String);
    }

    #[test]
    fn test_string_over_bucket_is_unbounded() {
        let param = configure(&text(), &Value::Text("x".repeat(5000))).unwrap();
        assert_eq!(param.size, Some(UNBOUNDED_SIZE));
    }

    #[test]
    fn test_null_gets_bucket_size() {
        let param = configure(&text(), &Value::Null).unwrap();
        assert_eq!(param.size, Some(4000));
    }

    #[test]
    fn test_sized_mapping_uses_its_size() {
        let varchar = TypeMapping::string("varchar", false, true).with_size(Some(50));
        assert_eq!(configure(&varchar, &Value::from("short")).unwrap().size, Some(50));
        assert_eq!(
            configure(&varchar, &Value::Text("y".repeat(51))).unwrap().size,
            Some(UNBOUNDED_SIZE)
        );
    }

    #[test]
    fn test_ansi_bucket() {
        let ansi = text().clone_with(&crate::MappingFacets::new().unicode(false));
        let param = configure(&ansi, &Value::Text("x".repeat(5000))).unwrap();
        assert_eq!(param.size, Some(8000));
        assert_eq!(param.db_type, DbType::AnsiString);
    }

    #[test]
    fn test_bytes_bucket() {
        let blob = TypeMapping::bytes(None, false);
        assert_eq!(configure(&blob, &Value::Bytes(vec![0; 100])).unwrap().size, Some(8000));
        assert_eq!(
            configure(&blob, &Value::Bytes(vec![0; 9000])).unwrap().size,
            Some(UNBOUNDED_SIZE)
        );
    }

    #[test]
    fn test_unsized_kinds() {
        let int = TypeMapping::integer("int", NativeType::I32, DbType::Int32);
        let param = configure(&int, &Value::Int(5)).unwrap();
        assert_eq!(param.size, None);
        assert_eq!(param.value, Value::Int(5));
    }
}
