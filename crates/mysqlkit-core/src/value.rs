//! Dynamic column values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, TypeError};

/// A dynamically-typed MySQL value.
///
/// Decoders produce these from row bytes and the type mapping layer renders
/// them as SQL literals or binds them as outgoing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,

    /// Boolean value
    Bool(bool),

    /// 8-bit signed integer
    TinyInt(i8),

    /// 16-bit signed integer
    SmallInt(i16),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 8-bit unsigned integer
    UnsignedTinyInt(u8),

    /// 16-bit unsigned integer
    UnsignedSmallInt(u16),

    /// 32-bit unsigned integer
    UnsignedInt(u32),

    /// 64-bit unsigned integer (also BIT columns)
    UnsignedBigInt(u64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// Fixed-point decimal
    Decimal(Decimal),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Date and time without zone
    DateTime(NaiveDateTime),

    /// Date and time with a UTC offset
    DateTimeOffset(DateTime<FixedOffset>),

    /// Signed duration (MySQL TIME columns may exceed 24 hours)
    Duration(#[serde(with = "duration_micros")] TimeDelta),

    /// GUID / unique identifier
    Uuid(Uuid),

    /// JSON document
    Json(serde_json::Value),

    /// Spatial value in the server's internal binary format
    Geometry(Vec<u8>),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INT",
            Value::BigInt(_) => "BIGINT",
            Value::UnsignedTinyInt(_) => "TINYINT UNSIGNED",
            Value::UnsignedSmallInt(_) => "SMALLINT UNSIGNED",
            Value::UnsignedInt(_) => "INT UNSIGNED",
            Value::UnsignedBigInt(_) => "BIGINT UNSIGNED",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME OF DAY",
            Value::DateTime(_) => "DATETIME",
            Value::DateTimeOffset(_) => "DATETIME WITH OFFSET",
            Value::Duration(_) => "TIME",
            Value::Uuid(_) => "GUID",
            Value::Json(_) => "JSON",
            Value::Geometry(_) => "GEOMETRY",
        }
    }

    /// Try to convert this value to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => self.as_i128().map(|v| v != 0),
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Try to convert this value to a u64.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Value::TinyInt(v) => Some(i128::from(*v)),
            Value::SmallInt(v) => Some(i128::from(*v)),
            Value::Int(v) => Some(i128::from(*v)),
            Value::BigInt(v) => Some(i128::from(*v)),
            Value::UnsignedTinyInt(v) => Some(i128::from(*v)),
            Value::UnsignedSmallInt(v) => Some(i128::from(*v)),
            Value::UnsignedInt(v) => Some(i128::from(*v)),
            Value::UnsignedBigInt(v) => Some(i128::from(*v)),
            Value::Bool(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Try to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => d.to_string().parse().ok(),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::Geometry(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Length of the value as seen by parameter size checks.
    ///
    /// Strings count characters and binary values count bytes; other values
    /// have no measurable length.
    pub fn measurable_len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Bytes(b) | Value::Geometry(b) => Some(b.len()),
            _ => None,
        }
    }
}

/// Serde adapter storing a [`TimeDelta`] as signed microseconds.
mod duration_micros {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        match value.num_microseconds() {
            Some(micros) => serializer.serialize_i64(micros),
            None => Err(serde::ser::Error::custom("duration out of range")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let micros = i64::deserialize(deserializer)?;
        Ok(TimeDelta::microseconds(micros))
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::TinyInt(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UnsignedTinyInt(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UnsignedSmallInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UnsignedInt(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UnsignedBigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTimeOffset(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// TryFrom implementations for extracting values

fn type_error(expected: &'static str, value: &Value) -> Error {
    Error::Type(TypeError {
        expected,
        actual: value.type_name().to_string(),
        column: None,
        rust_type: None,
    })
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_bool().ok_or_else(|| type_error("bool", &value))
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(_) | Value::Text(_) => Err(type_error("i64", &value)),
            other => other.as_i64().ok_or_else(|| type_error("i64", &other)),
        }
    }
}

impl TryFrom<Value> for u64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(_) | Value::Text(_) => Err(type_error("u64", &value)),
            other => other.as_u64().ok_or_else(|| type_error("u64", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(v) => Ok(f64::from(v)),
            Value::Double(v) => Ok(v),
            other => Err(type_error("f64", &other)),
        }
    }
}

impl TryFrom<Value> for Decimal {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Decimal(v) => Ok(v),
            other => other
                .as_i64()
                .map(Decimal::from)
                .ok_or_else(|| type_error("decimal", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(type_error("string", &other)),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bytes(v) | Value::Geometry(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(type_error("bytes", &other)),
        }
    }
}

impl TryFrom<Value> for Uuid {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(ref s) => Uuid::parse_str(s).map_err(|_| type_error("GUID", &value)),
            other => Err(type_error("GUID", &other)),
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(s) => serde_json::from_str(&s).map_err(Error::from),
            other => Err(type_error("json", &other)),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = Error>,
{
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => T::try_from(v).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(42i8), Value::TinyInt(42));
        assert_eq!(Value::from(42i16), Value::SmallInt(42));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(42i64), Value::BigInt(42));
    }

    #[test]
    fn test_from_unsigned_integers() {
        assert_eq!(Value::from(42u8), Value::UnsignedTinyInt(42));
        assert_eq!(Value::from(42u16), Value::UnsignedSmallInt(42));
        assert_eq!(Value::from(42u32), Value::UnsignedInt(42));
        assert_eq!(Value::from(u64::MAX), Value::UnsignedBigInt(u64::MAX));
    }

    #[test]
    fn test_from_option() {
        let some: Value = Some(42i32).into();
        assert_eq!(some, Value::Int(42));

        let none: Value = Option::<i32>::None.into();
        assert_eq!(none, Value::Null);
    }

    #[test]
    fn test_as_i64_and_u64() {
        assert_eq!(Value::UnsignedBigInt(7).as_i64(), Some(7));
        assert_eq!(Value::UnsignedBigInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::BigInt(-1).as_u64(), None);
        assert_eq!(Value::TinyInt(-3).as_i64(), Some(-3));
        assert_eq!(Value::Text("1".to_string()).as_i64(), None);
    }

    #[test]
    fn test_try_from_u64() {
        assert_eq!(u64::try_from(Value::UnsignedBigInt(u64::MAX)).unwrap(), u64::MAX);
        assert!(u64::try_from(Value::BigInt(-5)).is_err());
        assert!(u64::try_from(Value::Text("5".to_string())).is_err());
    }

    #[test]
    fn test_try_from_option() {
        let v: Option<String> = Value::Null.try_into().unwrap();
        assert!(v.is_none());
        let v: Option<String> = Value::Text("x".to_string()).try_into().unwrap();
        assert_eq!(v.as_deref(), Some("x"));
    }

    #[test]
    fn test_try_from_uuid() {
        let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(Uuid::try_from(Value::Uuid(id)).unwrap(), id);
        assert_eq!(
            Uuid::try_from(Value::Text("00112233-4455-6677-8899-aabbccddeeff".to_string())).unwrap(),
            id
        );
        assert!(Uuid::try_from(Value::Text("nope".to_string())).is_err());
    }

    #[test]
    fn test_measurable_len() {
        assert_eq!(Value::Text("héllo".to_string()).measurable_len(), Some(5));
        assert_eq!(Value::Bytes(vec![1, 2, 3]).measurable_len(), Some(3));
        assert_eq!(Value::Int(10).measurable_len(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::UnsignedInt(1).type_name(), "INT UNSIGNED");
        assert_eq!(Value::Duration(TimeDelta::hours(30)).type_name(), "TIME");
    }

    #[test]
    fn test_duration_serde() {
        let v = Value::Duration(TimeDelta::microseconds(-1_500_000));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"Duration":-1500000}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
