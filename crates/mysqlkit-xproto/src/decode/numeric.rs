//! Integer, floating point and decimal decoders.

#![allow(clippy::cast_possible_truncation)]

use mysqlkit_core::{Error, NativeType, ProtocolError, Result, TypeError, Value};
use rust_decimal::Decimal;

use super::truncated;
use crate::column::ColumnDescriptor;
use crate::wire::WireReader;

/// Integer storage width, chosen from the declared display length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    /// MEDIUMINT, held in 32 bits
    W24,
    W32,
    W64,
}

impl IntWidth {
    /// Select the width for a declared column length.
    ///
    /// A length of 0 means the server sent none and selects 64 bits rather
    /// than the 8-bit bucket its value would otherwise fall in.
    pub const fn from_length(length: u32) -> Self {
        match length {
            1..=4 => IntWidth::W8,
            5..=6 => IntWidth::W16,
            7..=8 => IntWidth::W24,
            9..=11 => IntWidth::W32,
            _ => IntWidth::W64,
        }
    }
}

/// Decoder for SINT and UINT columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntDecoder {
    signed: bool,
    width: IntWidth,
}

impl IntDecoder {
    pub fn new(signed: bool) -> Self {
        Self {
            signed,
            width: IntWidth::W64,
        }
    }

    /// Whether the column is signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The selected storage width.
    pub fn width(&self) -> IntWidth {
        self.width
    }

    pub(crate) fn set_metadata(&mut self, column: &ColumnDescriptor) {
        self.width = IntWidth::from_length(column.length);
    }

    pub fn native_type(&self) -> NativeType {
        match (self.signed, self.width) {
            (true, IntWidth::W8) => NativeType::I8,
            (true, IntWidth::W16) => NativeType::I16,
            (true, IntWidth::W24 | IntWidth::W32) => NativeType::I32,
            (true, IntWidth::W64) => NativeType::I64,
            (false, IntWidth::W8) => NativeType::U8,
            (false, IntWidth::W16) => NativeType::U16,
            (false, IntWidth::W24 | IntWidth::W32) => NativeType::U32,
            (false, IntWidth::W64) => NativeType::U64,
        }
    }

    /// Decode a varint and narrow it to the selected width.
    ///
    /// Narrowing truncates, matching the bucket picked from the column length.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = WireReader::new(bytes);
        let raw = if self.signed {
            reader.read_zigzag()
        } else {
            reader.read_varint_as_i64()
        }
        .ok_or_else(|| truncated("integer", bytes))?;

        Ok(match (self.signed, self.width) {
            (true, IntWidth::W8) => Value::TinyInt(raw as i8),
            (true, IntWidth::W16) => Value::SmallInt(raw as i16),
            (true, IntWidth::W24 | IntWidth::W32) => Value::Int(raw as i32),
            (true, IntWidth::W64) => Value::BigInt(raw),
            (false, IntWidth::W8) => Value::UnsignedTinyInt(raw as u8),
            (false, IntWidth::W16) => Value::UnsignedSmallInt(raw as u16),
            (false, IntWidth::W24 | IntWidth::W32) => Value::UnsignedInt(raw as u32),
            (false, IntWidth::W64) => Value::UnsignedBigInt(raw as u64),
        })
    }
}

/// Decoder for FLOAT and DOUBLE columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatDecoder {
    double: bool,
}

impl FloatDecoder {
    pub fn new(double: bool) -> Self {
        Self { double }
    }

    pub fn native_type(&self) -> NativeType {
        if self.double {
            NativeType::F64
        } else {
            NativeType::F32
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = WireReader::new(bytes);
        if self.double {
            reader
                .read_f64_le()
                .map(Value::Double)
                .ok_or_else(|| truncated("double", bytes))
        } else {
            reader
                .read_f32_le()
                .map(Value::Float)
                .ok_or_else(|| truncated("float", bytes))
        }
    }
}

/// Decoder for DECIMAL columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalDecoder;

impl DecimalDecoder {
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        decode_bcd_decimal(bytes).map(Value::Decimal)
    }
}

/// Decode the X protocol BCD decimal encoding.
///
/// Layout: one scale byte, then two BCD digits per byte, ending with a sign
/// nibble (`0xC` positive, `0xD` negative). When the digit count is odd the
/// last digit shares the final byte with the sign in its low nibble;
/// otherwise the final byte is `0xC0` or `0xD0`.
pub fn decode_bcd_decimal(bytes: &[u8]) -> Result<Decimal> {
    let Some((&sign_byte, head)) = bytes.split_last() else {
        return Err(truncated("decimal", bytes));
    };
    let Some((&scale, body)) = head.split_first() else {
        return Err(truncated("decimal", bytes));
    };
    let scale = usize::from(scale);

    let mut digits = String::with_capacity(body.len() * 2 + 1);
    for &byte in body {
        push_digit(&mut digits, byte >> 4, bytes)?;
        push_digit(&mut digits, byte & 0x0F, bytes)?;
    }

    let negative = match sign_byte {
        0xC0 => false,
        0xD0 => true,
        b if b & 0x0F == 0x0C => {
            push_digit(&mut digits, b >> 4, bytes)?;
            false
        }
        b if b & 0x0F == 0x0D => {
            push_digit(&mut digits, b >> 4, bytes)?;
            true
        }
        b => {
            return Err(Error::Protocol(
                ProtocolError::new(format!("invalid decimal sign byte 0x{b:02X}"))
                    .with_raw_data(bytes),
            ));
        }
    };

    if digits.len() <= scale {
        digits.insert_str(0, &"0".repeat(scale + 1 - digits.len()));
    }
    let split = digits.len() - scale;
    let mut text = String::with_capacity(digits.len() + 2);
    if negative {
        text.push('-');
    }
    text.push_str(&digits[..split]);
    if scale > 0 {
        text.push('.');
        text.push_str(&digits[split..]);
    }

    Decimal::from_str_exact(&text).map_err(|_| {
        Error::Type(TypeError {
            expected: "decimal within 28 significant digits",
            actual: text,
            column: None,
            rust_type: Some("Decimal"),
        })
    })
}

fn push_digit(digits: &mut String, nibble: u8, bytes: &[u8]) -> Result<()> {
    if nibble > 9 {
        return Err(Error::Protocol(
            ProtocolError::new(format!("invalid BCD digit 0x{nibble:X}")).with_raw_data(bytes),
        ));
    }
    digits.push(char::from(b'0' + nibble));
    Ok(())
}
