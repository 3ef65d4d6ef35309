//! Scalar value decoders.
//!
//! A decoder is chosen from the column's wire type, then refined with
//! [`ScalarDecoder::set_metadata`] once the column descriptor is populated.
//! After that, [`ScalarDecoder::decode`] is a pure function of the bytes.

mod numeric;
mod temporal;
mod text;

pub use numeric::{DecimalDecoder, FloatDecoder, IntDecoder, IntWidth, decode_bcd_decimal};
pub use temporal::{DateTimeDecoder, TimeDecoder};
pub use text::{BytesDecoder, BytesMode, SetDecoder};

use mysqlkit_core::{Error, NativeType, ProtocolError, Result, Value};

use crate::column::{ColumnDescriptor, ColumnType};
use crate::wire::WireReader;

/// Row value decoder for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarDecoder {
    /// SINT / UINT
    Int(IntDecoder),
    /// FLOAT / DOUBLE
    Float(FloatDecoder),
    /// DECIMAL
    Decimal(DecimalDecoder),
    /// BIT
    Bit,
    /// BYTES and ENUM
    Bytes(BytesDecoder),
    /// SET
    Set(SetDecoder),
    /// DATETIME (also DATE and TIMESTAMP)
    DateTime(DateTimeDecoder),
    /// TIME
    Time(TimeDecoder),
}

impl ScalarDecoder {
    /// Select the decoder for a wire column type.
    pub fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::SInt => ScalarDecoder::Int(IntDecoder::new(true)),
            ColumnType::UInt => ScalarDecoder::Int(IntDecoder::new(false)),
            ColumnType::Double => ScalarDecoder::Float(FloatDecoder::new(true)),
            ColumnType::Float => ScalarDecoder::Float(FloatDecoder::new(false)),
            ColumnType::Decimal => ScalarDecoder::Decimal(DecimalDecoder),
            ColumnType::Bit => ScalarDecoder::Bit,
            ColumnType::Bytes => ScalarDecoder::Bytes(BytesDecoder::new(false)),
            ColumnType::Enum => ScalarDecoder::Bytes(BytesDecoder::new(true)),
            ColumnType::Set => ScalarDecoder::Set(SetDecoder::default()),
            ColumnType::DateTime => ScalarDecoder::DateTime(DateTimeDecoder::default()),
            ColumnType::Time => ScalarDecoder::Time(TimeDecoder),
        }
    }

    /// Fix the native type and decoding function from column metadata.
    pub fn set_metadata(&mut self, column: &ColumnDescriptor) -> Result<NativeType> {
        match self {
            ScalarDecoder::Int(d) => d.set_metadata(column),
            ScalarDecoder::Bytes(d) => d.set_metadata(column)?,
            ScalarDecoder::Set(d) => d.set_metadata(column)?,
            ScalarDecoder::DateTime(d) => d.set_metadata(column),
            ScalarDecoder::Float(_)
            | ScalarDecoder::Decimal(_)
            | ScalarDecoder::Bit
            | ScalarDecoder::Time(_) => {}
        }
        Ok(self.native_type())
    }

    /// The native type values decode to.
    pub fn native_type(&self) -> NativeType {
        match self {
            ScalarDecoder::Int(d) => d.native_type(),
            ScalarDecoder::Float(d) => d.native_type(),
            ScalarDecoder::Decimal(_) => NativeType::Decimal,
            ScalarDecoder::Bit => NativeType::U64,
            ScalarDecoder::Bytes(d) => d.native_type(),
            ScalarDecoder::Set(_) => NativeType::String,
            ScalarDecoder::DateTime(d) => d.native_type(),
            ScalarDecoder::Time(_) => NativeType::Duration,
        }
    }

    /// Decode one non-NULL column value.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        match self {
            ScalarDecoder::Int(d) => d.decode(bytes),
            ScalarDecoder::Float(d) => d.decode(bytes),
            ScalarDecoder::Decimal(d) => d.decode(bytes),
            ScalarDecoder::Bit => WireReader::new(bytes)
                .read_varint()
                .map(Value::UnsignedBigInt)
                .ok_or_else(|| truncated("bit", bytes)),
            ScalarDecoder::Bytes(d) => d.decode(bytes),
            ScalarDecoder::Set(d) => d.decode(bytes),
            ScalarDecoder::DateTime(d) => d.decode(bytes),
            ScalarDecoder::Time(d) => d.decode(bytes),
        }
    }
}

/// Protocol error for a value that ends before it is complete.
pub(crate) fn truncated(what: &str, bytes: &[u8]) -> Error {
    Error::Protocol(
        ProtocolError::new(format!("unexpected end of {what} value")).with_raw_data(bytes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::write_varint;

    #[test]
    fn test_for_type_selection() {
        assert_eq!(
            ScalarDecoder::for_type(ColumnType::SInt),
            ScalarDecoder::Int(IntDecoder::new(true))
        );
        assert_eq!(
            ScalarDecoder::for_type(ColumnType::Enum),
            ScalarDecoder::Bytes(BytesDecoder::new(true))
        );
        assert_eq!(ScalarDecoder::for_type(ColumnType::Bit), ScalarDecoder::Bit);
        assert_eq!(
            ScalarDecoder::for_type(ColumnType::Float).native_type(),
            NativeType::F32
        );
        assert_eq!(
            ScalarDecoder::for_type(ColumnType::Double).native_type(),
            NativeType::F64
        );
    }

    #[test]
    fn test_bit_decode() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0b1010_1010_1010);
        let value = ScalarDecoder::Bit.decode(&buf).unwrap();
        assert_eq!(value, Value::UnsignedBigInt(0b1010_1010_1010));
        assert!(ScalarDecoder::Bit.decode(&[]).unwrap_err().is_protocol_error());
    }

    #[test]
    fn test_set_metadata_refines_int_width() {
        let mut col = ColumnDescriptor::new(ColumnType::UInt);
        col.length = 3;
        let mut decoder = ScalarDecoder::for_type(ColumnType::UInt);
        assert_eq!(decoder.native_type(), NativeType::U64);
        assert_eq!(decoder.set_metadata(&col).unwrap(), NativeType::U8);
    }
}
