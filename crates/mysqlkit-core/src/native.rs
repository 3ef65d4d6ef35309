//! Native value types that store types map to.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The Rust-side type a column or parameter maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeType {
    // Integer types
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,

    // Floating point
    F32,
    F64,

    // Fixed precision
    Decimal,

    // Text and binary
    String,
    Bytes,

    // Date/time types
    DateTime,
    DateTimeOffset,
    Date,
    TimeOfDay,
    Duration,

    // Structured values
    Guid,
    Json,
    Geometry,
}

impl NativeType {
    /// Get a display name for this native type.
    pub const fn name(self) -> &'static str {
        match self {
            NativeType::Bool => "bool",
            NativeType::I8 => "i8",
            NativeType::U8 => "u8",
            NativeType::I16 => "i16",
            NativeType::U16 => "u16",
            NativeType::I32 => "i32",
            NativeType::U32 => "u32",
            NativeType::I64 => "i64",
            NativeType::U64 => "u64",
            NativeType::F32 => "f32",
            NativeType::F64 => "f64",
            NativeType::Decimal => "Decimal",
            NativeType::String => "String",
            NativeType::Bytes => "Vec<u8>",
            NativeType::DateTime => "NaiveDateTime",
            NativeType::DateTimeOffset => "DateTime<FixedOffset>",
            NativeType::Date => "NaiveDate",
            NativeType::TimeOfDay => "NaiveTime",
            NativeType::Duration => "TimeDelta",
            NativeType::Guid => "Uuid",
            NativeType::Json => "serde_json::Value",
            NativeType::Geometry => "Geometry",
        }
    }

    /// Check if this is an integer type (booleans excluded).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            NativeType::I8
                | NativeType::U8
                | NativeType::I16
                | NativeType::U16
                | NativeType::I32
                | NativeType::U32
                | NativeType::I64
                | NativeType::U64
        )
    }

    /// Check if this is an unsigned integer type.
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            NativeType::U8 | NativeType::U16 | NativeType::U32 | NativeType::U64
        )
    }

    /// Types whose mappings accept a fractional-seconds precision facet.
    pub const fn takes_time_precision(self) -> bool {
        matches!(
            self,
            NativeType::DateTime | NativeType::DateTimeOffset | NativeType::Duration
        )
    }

    /// The native type a value carries, or `None` for NULL.
    pub const fn of_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(_) => NativeType::Bool,
            Value::TinyInt(_) => NativeType::I8,
            Value::SmallInt(_) => NativeType::I16,
            Value::Int(_) => NativeType::I32,
            Value::BigInt(_) => NativeType::I64,
            Value::UnsignedTinyInt(_) => NativeType::U8,
            Value::UnsignedSmallInt(_) => NativeType::U16,
            Value::UnsignedInt(_) => NativeType::U32,
            Value::UnsignedBigInt(_) => NativeType::U64,
            Value::Float(_) => NativeType::F32,
            Value::Double(_) => NativeType::F64,
            Value::Decimal(_) => NativeType::Decimal,
            Value::Text(_) => NativeType::String,
            Value::Bytes(_) => NativeType::Bytes,
            Value::Date(_) => NativeType::Date,
            Value::Time(_) => NativeType::TimeOfDay,
            Value::DateTime(_) => NativeType::DateTime,
            Value::DateTimeOffset(_) => NativeType::DateTimeOffset,
            Value::Duration(_) => NativeType::Duration,
            Value::Uuid(_) => NativeType::Guid,
            Value::Json(_) => NativeType::Json,
            Value::Geometry(_) => NativeType::Geometry,
        })
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
