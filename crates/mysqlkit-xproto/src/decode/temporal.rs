//! DATETIME and TIME decoders.
//!
//! Both are a run of varints where trailing fields may be left off; a
//! missing field reads as zero.

use chrono::{NaiveDate, TimeDelta};
use mysqlkit_core::{Error, NativeType, Result, TypeError, Value};

use super::truncated;
use crate::column::ColumnDescriptor;
use crate::wire::WireReader;

/// Declared length of a DATE column.
const DATE_LENGTH: u32 = 10;

/// Decoder for DATETIME columns (DATE, DATETIME, TIMESTAMP).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeDecoder {
    date_only: bool,
}

impl DateTimeDecoder {
    pub(crate) fn set_metadata(&mut self, column: &ColumnDescriptor) {
        self.date_only = column.length == DATE_LENGTH;
    }

    pub fn native_type(&self) -> NativeType {
        if self.date_only {
            NativeType::Date
        } else {
            NativeType::DateTime
        }
    }

    /// Decode `year, month, day [, hour [, minute [, second [, usec]]]]`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = WireReader::new(bytes);
        let year = required(&mut reader, bytes)?;
        let month = required(&mut reader, bytes)?;
        let day = required(&mut reader, bytes)?;

        let date = i32::try_from(year)
            .ok()
            .zip(u32::try_from(month).ok())
            .zip(u32::try_from(day).ok())
            .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
            .ok_or_else(|| {
                invalid("valid date", format!("{year:04}-{month:02}-{day:02}"), "NaiveDate")
            })?;

        if self.date_only {
            return Ok(Value::Date(date));
        }

        let hour = optional(&mut reader, bytes)?;
        let minute = optional(&mut reader, bytes)?;
        let second = optional(&mut reader, bytes)?;
        let micros = optional(&mut reader, bytes)?;

        let datetime = to_u32(hour)
            .zip(to_u32(minute))
            .zip(to_u32(second))
            .zip(to_u32(micros))
            .and_then(|(((h, m), s), us)| date.and_hms_micro_opt(h, m, s, us))
            .ok_or_else(|| {
                invalid(
                    "valid time of day",
                    format!("{hour:02}:{minute:02}:{second:02}.{micros:06}"),
                    "NaiveDateTime",
                )
            })?;
        Ok(Value::DateTime(datetime))
    }
}

/// Decoder for TIME columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeDecoder;

impl TimeDecoder {
    /// Decode `negative_flag [, hour [, minute [, second [, usec]]]]`.
    ///
    /// TIME values may exceed 24 hours, so the result is a duration.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = WireReader::new(bytes);
        let negative = reader.read_u8().ok_or_else(|| truncated("time", bytes))? != 0;
        let hour = optional(&mut reader, bytes)?;
        let minute = optional(&mut reader, bytes)?;
        let second = optional(&mut reader, bytes)?;
        let micros = optional(&mut reader, bytes)?;

        let total = hour
            .checked_mul(3_600_000_000)
            .and_then(|t| t.checked_add(minute.checked_mul(60_000_000)?))
            .and_then(|t| t.checked_add(second.checked_mul(1_000_000)?))
            .and_then(|t| t.checked_add(micros))
            .and_then(|t| i64::try_from(t).ok())
            .ok_or_else(|| {
                invalid(
                    "time within range",
                    format!("{hour}:{minute:02}:{second:02}.{micros:06}"),
                    "TimeDelta",
                )
            })?;

        let duration = TimeDelta::microseconds(total);
        Ok(Value::Duration(if negative { -duration } else { duration }))
    }
}

fn required(reader: &mut WireReader<'_>, bytes: &[u8]) -> Result<u64> {
    reader.read_varint().ok_or_else(|| truncated("date", bytes))
}

fn optional(reader: &mut WireReader<'_>, bytes: &[u8]) -> Result<u64> {
    if reader.is_empty() {
        return Ok(0);
    }
    reader.read_varint().ok_or_else(|| truncated("time", bytes))
}

fn to_u32(v: u64) -> Option<u32> {
    u32::try_from(v).ok()
}

fn invalid(expected: &'static str, actual: String, rust_type: &'static str) -> Error {
    Error::Type(TypeError {
        expected,
        actual,
        column: None,
        rust_type: Some(rust_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::wire::write_varint;
    use chrono::NaiveDateTime;

    fn encode(fields: &[u64]) -> Vec<u8> {
        let mut buf = Vec::new();
        for &f in fields {
            write_varint(&mut buf, f);
        }
        buf
    }

    fn datetime(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    // ==================== Datetime ====================

    #[test]
    fn test_full_datetime() {
        let decoder = DateTimeDecoder::default();
        let value = decoder.decode(&encode(&[2024, 2, 29, 13, 45, 30, 123_456])).unwrap();
        assert_eq!(value, Value::DateTime(datetime("2024-02-29 13:45:30.123456")));
    }

    #[test]
    fn test_truncated_optional_fields() {
        let decoder = DateTimeDecoder::default();
        assert_eq!(
            decoder.decode(&encode(&[2020, 1, 2])).unwrap(),
            Value::DateTime(datetime("2020-01-02 00:00:00.0"))
        );
        assert_eq!(
            decoder.decode(&encode(&[2020, 1, 2, 7])).unwrap(),
            Value::DateTime(datetime("2020-01-02 07:00:00.0"))
        );
        assert_eq!(
            decoder.decode(&encode(&[2020, 1, 2, 7, 8, 9])).unwrap(),
            Value::DateTime(datetime("2020-01-02 07:08:09.0"))
        );
    }

    #[test]
    fn test_date_column() {
        let mut col = ColumnDescriptor::new(ColumnType::DateTime);
        col.length = 10;
        let mut decoder = DateTimeDecoder::default();
        decoder.set_metadata(&col);
        assert_eq!(decoder.native_type(), NativeType::Date);
        assert_eq!(
            decoder.decode(&encode(&[1999, 12, 31])).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_missing_day_is_protocol_error() {
        let decoder = DateTimeDecoder::default();
        assert!(decoder.decode(&encode(&[2020, 1])).unwrap_err().is_protocol_error());
    }

    #[test]
    fn test_zero_date_is_type_error() {
        let decoder = DateTimeDecoder::default();
        let err = decoder.decode(&encode(&[0, 0, 0])).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
        assert!(err.to_string().contains("0000-00-00"));
    }

    // ==================== Time ====================

    #[test]
    fn test_time_positive() {
        let mut bytes = vec![0x00];
        bytes.extend(encode(&[30, 15, 10, 500]));
        let value = TimeDecoder.decode(&bytes).unwrap();
        let expected = TimeDelta::hours(30)
            + TimeDelta::minutes(15)
            + TimeDelta::seconds(10)
            + TimeDelta::microseconds(500);
        assert_eq!(value, Value::Duration(expected));
    }

    #[test]
    fn test_time_negative() {
        let mut bytes = vec![0x01];
        bytes.extend(encode(&[1, 30]));
        let value = TimeDecoder.decode(&bytes).unwrap();
        assert_eq!(value, Value::Duration(-(TimeDelta::hours(1) + TimeDelta::minutes(30))));
    }

    #[test]
    fn test_time_only_flag() {
        assert_eq!(TimeDecoder.decode(&[0x00]).unwrap(), Value::Duration(TimeDelta::zero()));
        assert!(TimeDecoder.decode(&[]).unwrap_err().is_protocol_error());
    }
}
