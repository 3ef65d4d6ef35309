//! Relational type mappings for mysqlkit.
//!
//! A [`MappingRegistry`] resolves a store type name (`varchar(50)`,
//! `int unsigned`), a [`NativeType`](mysqlkit_core::NativeType), or both,
//! to a [`TypeMapping`]. Mappings render values as SQL literals and size
//! outgoing parameters.
//!
//! ```
//! use mysqlkit_core::NativeType;
//! use mysqlkit_mapping::{MappingFacets, MappingRegistry};
//!
//! let registry = MappingRegistry::global();
//! let mapping = registry
//!     .find(None, Some(NativeType::String), &MappingFacets::new().size(50))
//!     .unwrap();
//! assert_eq!(mapping.store_type_name(), "varchar(50)");
//! ```

pub mod guid;
pub mod literal;
pub mod mapping;
pub mod parameter;
pub mod registry;
pub mod store_type;

pub use literal::{
    bytes_literal, date_literal, double_literal, duration_literal, string_literal, time_literal,
    timestamp_literal, timestamp_offset_literal, value_literal,
};
pub use mapping::{DbType, MappingFacets, MappingKind, TypeMapping};
pub use parameter::{OutgoingParameter, UNBOUNDED_SIZE, size_bucket};
pub use registry::{MAX_KEY_LENGTH, MAX_ROW_STRING_BYTES, MappingRegistry};
pub use store_type::{StorePostfix, StoreType};
