//! Core types for mysqlkit.
//!
//! This crate provides the pieces shared by the codec crates:
//!
//! - `Value` dynamic column values
//! - `Error` and `Result` used across the workspace
//! - `CodecConfig` connection-level codec settings
//! - the server collation table and character set widths
//! - identifier quoting for expression text and generated SQL

pub mod charset;
pub mod config;
pub mod error;
pub mod identifiers;
pub mod native;
pub mod value;

pub use charset::{CharSet, TextEncoding, charset_of, collation_name, is_binary_collation};
pub use config::{CodecConfig, GuidFormat, SchemaTranslation};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, TypeError};
pub use identifiers::{delimit_identifier, delimit_qualified_identifier, quote_identifier};
pub use native::NativeType;
pub use value::Value;
