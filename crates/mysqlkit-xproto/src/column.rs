//! X protocol column types, flags and the decoded column descriptor.

use serde::{Deserialize, Serialize};

/// X protocol column type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ColumnType {
    /// Signed integer (zig-zag varint)
    SInt = 1,
    /// Unsigned integer (plain varint)
    UInt = 2,
    /// 8-byte double
    Double = 5,
    /// 4-byte float
    Float = 6,
    /// Strings, binary strings, JSON, geometry
    Bytes = 7,
    /// TIME
    Time = 10,
    /// DATE, DATETIME and TIMESTAMP
    DateTime = 12,
    /// SET
    Set = 15,
    /// ENUM
    Enum = 16,
    /// BIT
    Bit = 17,
    /// DECIMAL (BCD)
    Decimal = 18,
}

impl ColumnType {
    /// Parse a column type from its wire code.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => ColumnType::SInt,
            2 => ColumnType::UInt,
            5 => ColumnType::Double,
            6 => ColumnType::Float,
            7 => ColumnType::Bytes,
            10 => ColumnType::Time,
            12 => ColumnType::DateTime,
            15 => ColumnType::Set,
            16 => ColumnType::Enum,
            17 => ColumnType::Bit,
            18 => ColumnType::Decimal,
            _ => return None,
        })
    }

    /// Get the wire code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Get the type name.
    pub const fn name(self) -> &'static str {
        match self {
            ColumnType::SInt => "SINT",
            ColumnType::UInt => "UINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Float => "FLOAT",
            ColumnType::Bytes => "BYTES",
            ColumnType::Time => "TIME",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Set => "SET",
            ColumnType::Enum => "ENUM",
            ColumnType::Bit => "BIT",
            ColumnType::Decimal => "DECIMAL",
        }
    }
}

/// Column flags.
///
/// Bit 0x0001 means something different for each column type.
pub mod column_flags {
    pub const UINT_ZEROFILL: u32 = 0x0001;
    pub const DOUBLE_UNSIGNED: u32 = 0x0001;
    pub const FLOAT_UNSIGNED: u32 = 0x0001;
    pub const DECIMAL_UNSIGNED: u32 = 0x0001;
    pub const BYTES_RIGHTPAD: u32 = 0x0001;
    pub const DATETIME_TIMESTAMP: u32 = 0x0001;
    pub const NOT_NULL: u32 = 0x0010;
    pub const PRIMARY_KEY: u32 = 0x0020;
    pub const UNIQUE_KEY: u32 = 0x0040;
    pub const MULTIPLE_KEY: u32 = 0x0080;
    pub const AUTO_INCREMENT: u32 = 0x0100;
}

/// Content type hint carried by BYTES columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    Plain,
    Geometry,
    Json,
    Xml,
}

impl ContentType {
    /// Parse a content type from its wire code; unknown codes are plain.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ContentType::Geometry,
            2 => ContentType::Json,
            3 => ContentType::Xml,
            _ => ContentType::Plain,
        }
    }
}

/// Decoded metadata for one result set column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name (or alias)
    pub name: String,
    /// Original column name
    pub original_name: String,
    /// Table name (or alias)
    pub table: String,
    /// Original table name
    pub original_table: String,
    /// Schema (database) name
    pub schema: String,
    /// Catalog name
    pub catalog: String,
    /// Wire type
    pub column_type: ColumnType,
    /// Collation id, 0 when absent
    pub collation_id: u64,
    /// Collation name, empty when absent or unknown
    pub collation_name: String,
    /// Character set name, empty when absent or unknown
    pub charset_name: String,
    /// Declared column length
    pub length: u32,
    /// Fractional digits (scale)
    pub fractional_digits: u32,
    /// Column flags
    pub flags: u32,
    /// Content type hint
    pub content_type: ContentType,
}

impl ColumnDescriptor {
    /// Create a descriptor with only the type set.
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            name: String::new(),
            original_name: String::new(),
            table: String::new(),
            original_table: String::new(),
            schema: String::new(),
            catalog: String::new(),
            column_type,
            collation_id: 0,
            collation_name: String::new(),
            charset_name: String::new(),
            length: 0,
            fractional_digits: 0,
            flags: 0,
            content_type: ContentType::Plain,
        }
    }

    /// Check if the column is NOT NULL.
    pub const fn is_not_null(&self) -> bool {
        self.flags & column_flags::NOT_NULL != 0
    }

    /// Check if the column is a primary key.
    pub const fn is_primary_key(&self) -> bool {
        self.flags & column_flags::PRIMARY_KEY != 0
    }

    /// Check if the column is part of a unique key.
    pub const fn is_unique_key(&self) -> bool {
        self.flags & column_flags::UNIQUE_KEY != 0
    }

    /// Check if the column is part of a non-unique key.
    pub const fn is_multiple_key(&self) -> bool {
        self.flags & column_flags::MULTIPLE_KEY != 0
    }

    /// Check if the column is auto-increment.
    pub const fn is_auto_increment(&self) -> bool {
        self.flags & column_flags::AUTO_INCREMENT != 0
    }

    /// Check if the column is unsigned.
    pub fn is_unsigned(&self) -> bool {
        match self.column_type {
            ColumnType::UInt => true,
            ColumnType::Double | ColumnType::Float | ColumnType::Decimal => {
                self.flags & column_flags::DECIMAL_UNSIGNED != 0
            }
            _ => false,
        }
    }

    /// Check if the column is zero-filled.
    pub fn is_zerofill(&self) -> bool {
        self.column_type == ColumnType::UInt && self.flags & column_flags::UINT_ZEROFILL != 0
    }

    /// Check if the column is right-padded (CHAR).
    pub fn is_padded(&self) -> bool {
        self.column_type == ColumnType::Bytes && self.flags & column_flags::BYTES_RIGHTPAD != 0
    }

    /// Check if the column is a TIMESTAMP.
    pub fn is_timestamp(&self) -> bool {
        self.column_type == ColumnType::DateTime
            && self.flags & column_flags::DATETIME_TIMESTAMP != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_codes() {
        for code in [1, 2, 5, 6, 7, 10, 12, 15, 16, 17, 18] {
            let ty = ColumnType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert_eq!(ColumnType::from_code(3), None);
        assert_eq!(ColumnType::from_code(0), None);
        assert_eq!(ColumnType::Decimal.name(), "DECIMAL");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(ContentType::from_code(1), ContentType::Geometry);
        assert_eq!(ContentType::from_code(2), ContentType::Json);
        assert_eq!(ContentType::from_code(3), ContentType::Xml);
        assert_eq!(ContentType::from_code(9), ContentType::Plain);
    }

    #[test]
    fn test_type_specific_flag() {
        let mut col = ColumnDescriptor::new(ColumnType::Bytes);
        col.flags = column_flags::BYTES_RIGHTPAD | column_flags::NOT_NULL;
        assert!(col.is_padded());
        assert!(col.is_not_null());
        assert!(!col.is_unsigned());
        assert!(!col.is_timestamp());

        let mut col = ColumnDescriptor::new(ColumnType::DateTime);
        col.flags = column_flags::DATETIME_TIMESTAMP;
        assert!(col.is_timestamp());
        assert!(!col.is_padded());

        let mut col = ColumnDescriptor::new(ColumnType::Double);
        col.flags = column_flags::DOUBLE_UNSIGNED;
        assert!(col.is_unsigned());
    }

    #[test]
    fn test_key_flags() {
        let mut col = ColumnDescriptor::new(ColumnType::SInt);
        col.flags = column_flags::PRIMARY_KEY | column_flags::AUTO_INCREMENT;
        assert!(col.is_primary_key());
        assert!(col.is_auto_increment());
        assert!(!col.is_unique_key());
        assert!(!col.is_multiple_key());
    }
}
