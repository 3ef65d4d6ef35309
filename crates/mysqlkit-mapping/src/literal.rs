//! SQL literal rendering.
//!
//! Literals are what a mapping writes when a value is inlined into SQL text
//! (seed data, default values) instead of being bound as a parameter.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use mysqlkit_core::{Error, Result, TypeError, Value};

use crate::guid;
use crate::mapping::{MappingKind, TypeMapping};

/// Fractional digits written when the mapping carries no precision.
const DEFAULT_FRACTION_DIGITS: u32 = 6;

fn not_representable(expected: &'static str, actual: String) -> Error {
    Error::Type(TypeError {
        expected,
        actual,
        column: None,
        rust_type: None,
    })
}

fn push_quoted_fragment(parts: &mut Vec<String>, fragment: &mut String) {
    parts.push(format!("'{fragment}'"));
    fragment.clear();
}

/// Render a string as a quoted literal.
///
/// Quotes and backslashes are escaped. CR and LF cannot travel inside a
/// literal reliably, so a string containing them becomes
/// `CONCAT('..', CHAR(13), CHAR(10), '..')`.
pub fn string_literal(s: &str) -> String {
    let mut parts = Vec::new();
    let mut fragment = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\r' | '\n' => {
                if !fragment.is_empty() {
                    push_quoted_fragment(&mut parts, &mut fragment);
                }
                parts.push(format!("CHAR({})", u32::from(ch)));
            }
            '\'' => fragment.push_str("''"),
            '\\' => fragment.push_str("\\\\"),
            '\0' => fragment.push_str("\\0"),
            '\x1a' => fragment.push_str("\\Z"), // Ctrl+Z
            _ => fragment.push(ch),
        }
    }
    if !fragment.is_empty() || parts.is_empty() {
        push_quoted_fragment(&mut parts, &mut fragment);
    }

    if parts.len() == 1 {
        parts.swap_remove(0)
    } else {
        format!("CONCAT({})", parts.join(", "))
    }
}

/// Render bytes as a hex literal.
pub fn bytes_literal(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() * 2 + 3);
    result.push_str("X'");
    for byte in data {
        result.push_str(&format!("{byte:02X}"));
    }
    result.push('\'');
    result
}

/// Render a double so it always reads back as a floating point number.
pub fn double_literal(f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(not_representable("finite double", f.to_string()));
    }
    let abs = f.abs();
    if abs > 0.0 && !(1e-5..1e16).contains(&abs) {
        return Ok(format!("{f:E}"));
    }
    let s = f.to_string();
    Ok(if s.contains('.') { s } else { format!("{s}.0") })
}

fn float_literal(f: f32) -> Result<String> {
    if f.is_finite() {
        Ok(f.to_string())
    } else {
        Err(not_representable("finite float", f.to_string()))
    }
}

/// `.ffffff` cut to `digits` places, or nothing for zero digits.
fn fraction(nanos: u32, digits: u32) -> String {
    let digits = digits.min(6) as usize;
    if digits == 0 {
        return String::new();
    }
    // Leap seconds carry nanos past one second
    let micros = (nanos % 1_000_000_000) / 1_000;
    let all = format!("{micros:06}");
    format!(".{}", &all[..digits])
}

pub fn date_literal(date: NaiveDate) -> String {
    format!("DATE '{}'", date.format("%Y-%m-%d"))
}

pub fn timestamp_literal(dt: &NaiveDateTime, precision: Option<u32>) -> String {
    let digits = precision.unwrap_or(DEFAULT_FRACTION_DIGITS);
    format!(
        "TIMESTAMP '{}{}'",
        dt.format("%Y-%m-%d %H:%M:%S"),
        fraction(dt.nanosecond(), digits)
    )
}

pub fn timestamp_offset_literal(dt: &DateTime<FixedOffset>, precision: Option<u32>) -> String {
    let digits = precision.unwrap_or(DEFAULT_FRACTION_DIGITS);
    format!(
        "TIMESTAMP '{}{}{}'",
        dt.format("%Y-%m-%d %H:%M:%S"),
        fraction(dt.nanosecond(), digits),
        dt.format("%:z")
    )
}

pub fn time_literal(time: &NaiveTime, precision: Option<u32>) -> String {
    let digits = precision.unwrap_or(DEFAULT_FRACTION_DIGITS);
    format!(
        "TIME '{}{}'",
        time.format("%H:%M:%S"),
        fraction(time.nanosecond(), digits)
    )
}

/// `TIME '[-]HH:MM:SS[.ffffff]'`; hours may exceed 24.
pub fn duration_literal(duration: &TimeDelta, precision: Option<u32>) -> Result<String> {
    let micros = duration
        .num_microseconds()
        .ok_or_else(|| not_representable("duration within TIME range", duration.to_string()))?;
    let sign = if micros < 0 { "-" } else { "" };
    let micros = micros.unsigned_abs();
    let secs = micros / 1_000_000;
    let sub_micros = (micros % 1_000_000) as u32;
    let digits = precision.unwrap_or(DEFAULT_FRACTION_DIGITS);
    Ok(format!(
        "TIME '{sign}{:02}:{:02}:{:02}{}'",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        fraction(sub_micros * 1_000, digits)
    ))
}

/// Render a value by its own type, with no mapping in play.
pub fn value_literal(value: &Value) -> Result<String> {
    value_literal_with_precision(value, None)
}

fn value_literal_with_precision(value: &Value, precision: Option<u32>) -> Result<String> {
    Ok(match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::TinyInt(i) => i.to_string(),
        Value::SmallInt(i) => i.to_string(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::UnsignedTinyInt(i) => i.to_string(),
        Value::UnsignedSmallInt(i) => i.to_string(),
        Value::UnsignedInt(i) => i.to_string(),
        Value::UnsignedBigInt(i) => i.to_string(),
        Value::Float(f) => float_literal(*f)?,
        Value::Double(f) => double_literal(*f)?,
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => string_literal(s),
        Value::Bytes(b) | Value::Geometry(b) => bytes_literal(b),
        Value::Json(j) => string_literal(&j.to_string()),
        Value::Date(d) => date_literal(*d),
        Value::Time(t) => time_literal(t, precision),
        Value::DateTime(dt) => timestamp_literal(dt, precision),
        Value::DateTimeOffset(dt) => timestamp_offset_literal(dt, precision),
        Value::Duration(d) => duration_literal(d, precision)?,
        Value::Uuid(u) => format!("'{}'", u.hyphenated()),
    })
}

/// Render a non-NULL value through a mapping; NULL is always `NULL`.
pub(crate) fn render(mapping: &TypeMapping, value: &Value) -> Result<String> {
    let precision = mapping.precision();
    match (mapping.kind(), value) {
        (_, Value::Null) => Ok("NULL".to_string()),
        (MappingKind::Guid(format), Value::Uuid(guid)) => guid::literal(guid, format),
        (MappingKind::Bool | MappingKind::Bit | MappingKind::Integer, Value::Bool(b)) => {
            Ok(if *b { "1" } else { "0" }.to_string())
        }
        (MappingKind::Date, Value::DateTime(dt)) => Ok(date_literal(dt.date())),
        (MappingKind::Date, Value::DateTimeOffset(dt)) => Ok(date_literal(dt.date_naive())),
        (MappingKind::DateTime | MappingKind::DateTimeOffset, Value::Date(d)) => Ok(
            timestamp_literal(&d.and_time(NaiveTime::default()), precision),
        ),
        (MappingKind::Duration, Value::Time(t)) => Ok(time_literal(t, precision)),
        (MappingKind::Double, Value::Float(f)) => double_literal(f64::from(*f)),
        (_, v) => value_literal_with_precision(v, precision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evaluate the subset of SQL `string_literal` produces.
    fn eval_string_literal(sql: &str) -> String {
        let inner = sql
            .strip_prefix("CONCAT(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(sql);
        let mut out = String::new();
        let mut rest = inner;
        while !rest.is_empty() {
            rest = rest.trim_start_matches(", ");
            if let Some(after) = rest.strip_prefix("CHAR(") {
                let end = after.find(')').unwrap();
                let code: u32 = after[..end].parse().unwrap();
                out.push(char::from_u32(code).unwrap());
                rest = &after[end + 1..];
            } else {
                let chars: Vec<char> = rest.chars().collect();
                assert_eq!(chars[0], '\'');
                let mut i = 1;
                loop {
                    match chars[i] {
                        '\'' if chars.get(i + 1) == Some(&'\'') => {
                            out.push('\'');
                            i += 2;
                        }
                        '\'' => break,
                        '\\' => {
                            out.push(match chars[i + 1] {
                                '0' => '\0',
                                'Z' => '\x1a',
                                c => c,
                            });
                            i += 2;
                        }
                        c => {
                            out.push(c);
                            i += 1;
                        }
                    }
                }
                let consumed: usize = chars[..=i].iter().map(|c| c.len_utf8()).sum();
                rest = &rest[consumed..];
            }
        }
        out
    }

    // ==================== Strings ====================

    #[test]
    fn test_string_escaping() {
        assert_eq!(string_literal("hello"), "'hello'");
        assert_eq!(string_literal("it's"), "'it''s'");
        assert_eq!(string_literal("a\\b"), "'a\\\\b'");
        assert_eq!(string_literal(""), "''");
    }

    #[test]
    fn test_line_breaks_become_concat() {
        assert_eq!(
            string_literal("a\r\nb"),
            "CONCAT('a', CHAR(13), CHAR(10), 'b')"
        );
        assert_eq!(string_literal("\nx"), "CONCAT(CHAR(10), 'x')");
        assert_eq!(string_literal("x\n"), "CONCAT('x', CHAR(10))");
        assert_eq!(string_literal("\r"), "CHAR(13)");
    }

    #[test]
    fn test_line_break_literals_reconstruct_input() {
        for input in [
            "plain",
            "line1\nline2",
            "cr\ronly",
            "crlf\r\nend",
            "\n\n\r\n",
            "it's a\\path\r\n'quoted'\n",
            "nul\0and ctrl-z\x1a\n",
            "ünïcødé\r\nテキスト",
        ] {
            assert_eq!(eval_string_literal(&string_literal(input)), input, "{input:?}");
        }
    }

    // ==================== Numbers ====================

    #[test]
    fn test_double_literals() {
        assert_eq!(double_literal(1.0).unwrap(), "1.0");
        assert_eq!(double_literal(-2.5).unwrap(), "-2.5");
        assert_eq!(double_literal(0.0).unwrap(), "0.0");
        assert_eq!(double_literal(1e20).unwrap(), "1E20");
        assert_eq!(double_literal(1.5e-7).unwrap(), "1.5E-7");
        assert!(double_literal(f64::NAN).is_err());
        assert!(double_literal(f64::INFINITY).is_err());
    }

    #[test]
    fn test_bytes_literal() {
        assert_eq!(bytes_literal(&[0xDE, 0xAD, 0x01]), "X'DEAD01'");
        assert_eq!(bytes_literal(&[]), "X''");
    }

    // ==================== Temporal ====================

    #[test]
    fn test_temporal_literals() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 3, 123_456)
            .unwrap();
        assert_eq!(
            timestamp_literal(&dt, None),
            "TIMESTAMP '2024-03-09 07:05:03.123456'"
        );
        assert_eq!(
            timestamp_literal(&dt, Some(3)),
            "TIMESTAMP '2024-03-09 07:05:03.123'"
        );
        assert_eq!(timestamp_literal(&dt, Some(0)), "TIMESTAMP '2024-03-09 07:05:03'");
        assert_eq!(date_literal(dt.date()), "DATE '2024-03-09'");
        assert_eq!(time_literal(&dt.time(), Some(2)), "TIME '07:05:03.12'");

        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let with_offset = dt.and_local_timezone(offset).unwrap();
        assert_eq!(
            timestamp_offset_literal(&with_offset, Some(0)),
            "TIMESTAMP '2024-03-09 07:05:03+05:30'"
        );
    }

    #[test]
    fn test_duration_literals() {
        let d = TimeDelta::hours(30) + TimeDelta::minutes(2) + TimeDelta::microseconds(500);
        assert_eq!(
            duration_literal(&d, None).unwrap(),
            "TIME '30:02:00.000500'"
        );
        assert_eq!(duration_literal(&-d, Some(0)).unwrap(), "TIME '-30:02:00'");
    }

    #[test]
    fn test_value_literals() {
        assert_eq!(value_literal(&Value::Null).unwrap(), "NULL");
        assert_eq!(value_literal(&Value::Bool(true)).unwrap(), "TRUE");
        assert_eq!(value_literal(&Value::UnsignedBigInt(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(
            value_literal(&Value::Decimal(rust_decimal::Decimal::new(1050, 2))).unwrap(),
            "10.50"
        );
        assert_eq!(
            value_literal(&Value::Json(serde_json::json!({"k": "it's"}))).unwrap(),
            "'{\"k\":\"it''s\"}'"
        );
    }
}
