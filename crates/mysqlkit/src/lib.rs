//! mysqlkit - MySQL value codecs, type mapping and X protocol expressions.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`types`]: values, errors, codec settings, collations, identifier quoting
//! - [`expr`]: the X protocol expression parser and unparser
//! - [`mapping`]: store type to native type mappings and SQL literals
//! - [`xproto`]: column metadata and row value decoders
//!
//! # Quick Start
//!
//! ```
//! use mysqlkit::prelude::*;
//!
//! // Filter text to an expression tree and back
//! let expr = parse("age > 18").unwrap();
//! assert_eq!(expr_to_string(&expr), "(age > 18)");
//!
//! // Store type for a native type
//! let mapping = MappingRegistry::global()
//!     .find(None, Some(NativeType::I64), &MappingFacets::new())
//!     .unwrap();
//! assert_eq!(mapping.store_type_name(), "bigint");
//! ```

pub use mysqlkit_core as types;
pub use mysqlkit_expr as expr;
pub use mysqlkit_mapping as mapping;
pub use mysqlkit_xproto as xproto;

pub use mysqlkit_core::{
    CharSet, CodecConfig, ConfigError, Error, GuidFormat, NativeType, ParseError, ProtocolError,
    Result, TypeError, Value, quote_identifier,
};
pub use mysqlkit_expr::{
    ColumnIdentifier, Direction, DocumentPathItem, Expr, ExprParser, Identifier, OrderSpec,
    Projection, expr_to_string, parse, parse_document,
};
pub use mysqlkit_mapping::{
    DbType, MappingFacets, MappingKind, MappingRegistry, OutgoingParameter, StoreType,
    TypeMapping,
};
pub use mysqlkit_xproto::{
    ColumnDescriptor, ColumnMetaData, ColumnType, ScalarDecoder, decode_column, decode_columns,
    decode_row,
};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        // Core
        CodecConfig,
        Error,
        // Expressions
        Expr,
        ExprParser,
        GuidFormat,
        // Mapping
        MappingFacets,
        MappingRegistry,
        NativeType,
        Result,
        TypeMapping,
        Value,
        // Decoding
        ColumnMetaData,
        decode_columns,
        decode_row,
        expr_to_string,
        parse,
    };
}
