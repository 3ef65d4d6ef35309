//! X protocol row decoding for mysqlkit.
//!
//! - `wire`: varint and fixed-width readers over one column value
//! - `column`: column type codes, flags and the decoded descriptor
//! - `decode`: per-type scalar decoders
//! - `metadata`: column metadata to (descriptor, decoder) and row decoding

pub mod column;
pub mod decode;
pub mod metadata;
pub mod wire;

pub use column::{ColumnDescriptor, ColumnType, ContentType, column_flags};
pub use decode::{BytesMode, IntWidth, ScalarDecoder, decode_bcd_decimal};
pub use metadata::{ColumnMetaData, decode_column, decode_columns, decode_row};
pub use wire::WireReader;
