//! Mapping registry: store type and native type lookup.
//!
//! The registry is built eagerly from a [`CodecConfig`] and is read-only
//! afterwards, so it can be shared freely between connections. A default
//! instance is available through [`MappingRegistry::global`].
//!
//! # Resolution
//!
//! [`MappingRegistry::find`] tries, in order:
//!
//! 1. the full store type name (`tinyint(1)`, `char(36)`, `varchar`)
//! 2. the base store type name, cloned with the requested facets
//! 3. the native type
//! 4. a mapping synthesized for strings and byte arrays
//!
//! A name match never falls through: if the requested native type is not
//! among the mappings for that name the lookup fails.

use std::collections::HashMap;
use std::sync::OnceLock;

use mysqlkit_core::{CodecConfig, Error, GuidFormat, NativeType, Result};

use crate::mapping::{DbType, MappingFacets, MappingKind, TypeMapping};
use crate::store_type::{StorePostfix, StoreType};

/// Longest index key prefix, in bytes.
pub const MAX_KEY_LENGTH: u32 = 3072;

/// Byte budget above which a sized string becomes `longtext`.
pub const MAX_ROW_STRING_BYTES: u32 = 65_553;

/// Largest inferred length for a string key column.
const MAX_INFERRED_KEY_CHARS: u32 = 255;

/// Store types that cannot be used without a length.
const LENGTH_REQUIRED: [&str; 6] = ["binary", "char", "nchar", "varbinary", "varchar", "nvarchar"];

/// Store type and native type lookup tables.
#[derive(Debug, Clone)]
pub struct MappingRegistry {
    store_mappings: HashMap<String, Vec<TypeMapping>>,
    native_mappings: HashMap<NativeType, TypeMapping>,
    guid_format: GuidFormat,
    charset_width: u32,
}

/// The fixed set of base mappings every registry starts from.
struct BaseMappings {
    int: TypeMapping,
    uint: TypeMapping,
    bigint: TypeMapping,
    ubigint: TypeMapping,
    smallint: TypeMapping,
    usmallint: TypeMapping,
    tinyint: TypeMapping,
    utinyint: TypeMapping,
    bit: TypeMapping,
    char: TypeMapping,
    varchar: TypeMapping,
    nchar: TypeMapping,
    nvarchar: TypeMapping,
    tinytext: TypeMapping,
    text: TypeMapping,
    mediumtext: TypeMapping,
    longtext: TypeMapping,
    enumeration: TypeMapping,
    set: TypeMapping,
    datetime: TypeMapping,
    timestamp: TypeMapping,
    datetime_offset: TypeMapping,
    timestamp_offset: TypeMapping,
    date: TypeMapping,
    date_only: TypeMapping,
    time: TypeMapping,
    time_only: TypeMapping,
    float: TypeMapping,
    double: TypeMapping,
    decimal: TypeMapping,
    binary: TypeMapping,
    varbinary: TypeMapping,
    geometry: TypeMapping,
    bit_bool: TypeMapping,
    tinyint_bool: TypeMapping,
}

fn temporal(kind: MappingKind, base: &str, native: NativeType, db_type: DbType) -> TypeMapping {
    let postfix = if kind == MappingKind::Date {
        StorePostfix::None
    } else {
        StorePostfix::Precision
    };
    TypeMapping::new(kind, StoreType::new(base).postfix(postfix), native, db_type)
}

fn boolean(name: &str) -> TypeMapping {
    TypeMapping::new(
        MappingKind::Bool,
        StoreType::parse(name),
        NativeType::Bool,
        DbType::Boolean,
    )
}

impl BaseMappings {
    fn new() -> Self {
        Self {
            int: TypeMapping::integer("int", NativeType::I32, DbType::Int32),
            uint: TypeMapping::integer("int", NativeType::U32, DbType::UInt32),
            bigint: TypeMapping::integer("bigint", NativeType::I64, DbType::Int64),
            ubigint: TypeMapping::integer("bigint", NativeType::U64, DbType::UInt64),
            smallint: TypeMapping::integer("smallint", NativeType::I16, DbType::Int16),
            usmallint: TypeMapping::integer("smallint", NativeType::U16, DbType::UInt16),
            tinyint: TypeMapping::integer("tinyint", NativeType::I8, DbType::SByte),
            utinyint: TypeMapping::integer("tinyint", NativeType::U8, DbType::Byte),
            bit: TypeMapping::new(
                MappingKind::Bit,
                StoreType::new("bit").postfix(StorePostfix::Size),
                NativeType::U64,
                DbType::UInt64,
            ),
            char: TypeMapping::string("char", true, true),
            varchar: TypeMapping::string("varchar", false, true),
            nchar: TypeMapping::string("nchar", true, true),
            nvarchar: TypeMapping::string("nvarchar", false, true),
            tinytext: TypeMapping::string("tinytext", false, false),
            text: TypeMapping::string("text", false, false),
            mediumtext: TypeMapping::string("mediumtext", false, false),
            longtext: TypeMapping::string("longtext", false, false),
            enumeration: TypeMapping::string("enum", false, false),
            set: TypeMapping::string("set", false, false),
            datetime: temporal(MappingKind::DateTime, "datetime", NativeType::DateTime, DbType::DateTime),
            timestamp: temporal(MappingKind::DateTime, "timestamp", NativeType::DateTime, DbType::DateTime),
            datetime_offset: temporal(
                MappingKind::DateTimeOffset,
                "datetime",
                NativeType::DateTimeOffset,
                DbType::DateTimeOffset,
            ),
            timestamp_offset: temporal(
                MappingKind::DateTimeOffset,
                "timestamp",
                NativeType::DateTimeOffset,
                DbType::DateTimeOffset,
            ),
            // Legacy date columns surface as date-times
            date: temporal(MappingKind::Date, "date", NativeType::DateTime, DbType::Date),
            date_only: temporal(MappingKind::Date, "date", NativeType::Date, DbType::Date),
            time: temporal(MappingKind::Duration, "time", NativeType::Duration, DbType::Time),
            time_only: temporal(MappingKind::TimeOfDay, "time", NativeType::TimeOfDay, DbType::Time),
            float: TypeMapping::new(
                MappingKind::Float,
                StoreType::new("float"),
                NativeType::F32,
                DbType::Single,
            ),
            double: TypeMapping::new(
                MappingKind::Double,
                StoreType::new("double"),
                NativeType::F64,
                DbType::Double,
            ),
            decimal: TypeMapping::new(
                MappingKind::Decimal,
                StoreType::new("decimal")
                    .postfix(StorePostfix::PrecisionAndScale)
                    .precision(18, Some(2)),
                NativeType::Decimal,
                DbType::Decimal,
            ),
            binary: TypeMapping::bytes(None, true),
            varbinary: TypeMapping::bytes(None, false),
            geometry: TypeMapping::new(
                MappingKind::Geometry,
                StoreType::new("geometry"),
                NativeType::Geometry,
                DbType::Binary,
            ),
            bit_bool: boolean("bit(1)"),
            tinyint_bool: boolean("tinyint(1)"),
        }
    }
}

impl MappingRegistry {
    /// Build the lookup tables for a connection's settings.
    #[tracing::instrument(level = "debug", skip(config), fields(guid_format = ?config.guid_format))]
    pub fn new(config: &CodecConfig) -> Self {
        let m = BaseMappings::new();
        let guid_format = config.effective_guid_format();
        let guid = TypeMapping::guid(guid_format);

        let store_entries: Vec<(&str, Vec<&TypeMapping>)> = vec![
            // integers
            ("bigint", vec![&m.bigint]),
            ("bigint unsigned", vec![&m.ubigint]),
            ("int", vec![&m.int]),
            ("int unsigned", vec![&m.uint]),
            ("integer", vec![&m.int]),
            ("integer unsigned", vec![&m.uint]),
            ("mediumint", vec![&m.int]),
            ("mediumint unsigned", vec![&m.uint]),
            ("smallint", vec![&m.smallint]),
            ("smallint unsigned", vec![&m.usmallint]),
            ("tinyint", vec![&m.tinyint]),
            ("tinyint unsigned", vec![&m.utinyint]),
            // decimals
            ("decimal", vec![&m.decimal]),
            ("numeric", vec![&m.decimal]),
            ("dec", vec![&m.decimal]),
            ("fixed", vec![&m.decimal]),
            ("double", vec![&m.double]),
            ("float", vec![&m.float]),
            ("real", vec![&m.double]),
            // binary
            ("binary", vec![&m.binary]),
            ("varbinary", vec![&m.varbinary]),
            ("tinyblob", vec![&m.varbinary]),
            ("blob", vec![&m.varbinary]),
            ("mediumblob", vec![&m.varbinary]),
            ("longblob", vec![&m.varbinary]),
            // strings
            ("char", vec![&m.char]),
            ("varchar", vec![&m.varchar]),
            ("nchar", vec![&m.nchar]),
            ("nvarchar", vec![&m.nvarchar]),
            ("tinytext", vec![&m.tinytext]),
            ("text", vec![&m.text]),
            ("mediumtext", vec![&m.mediumtext]),
            ("longtext", vec![&m.longtext]),
            ("enum", vec![&m.enumeration]),
            ("set", vec![&m.set]),
            // date and time
            ("year", vec![&m.int]),
            ("date", vec![&m.date, &m.date_only]),
            ("time", vec![&m.time, &m.time_only]),
            ("timestamp", vec![&m.timestamp, &m.timestamp_offset]),
            ("datetime", vec![&m.datetime, &m.datetime_offset]),
            // other
            ("bit", vec![&m.bit]),
            ("geometry", vec![&m.geometry]),
            ("json", vec![&m.longtext]),
        ];
        let mut store_mappings: HashMap<String, Vec<TypeMapping>> = store_entries
            .into_iter()
            .map(|(name, mappings)| (name.to_string(), mappings.into_iter().cloned().collect()))
            .collect();

        let mut native_mappings: HashMap<NativeType, TypeMapping> = [
            (NativeType::I16, m.smallint.clone()),
            (NativeType::U16, m.usmallint.clone()),
            (NativeType::I32, m.int.clone()),
            (NativeType::U32, m.uint.clone()),
            (NativeType::I64, m.bigint.clone()),
            (NativeType::U64, m.ubigint.clone()),
            (NativeType::U8, m.utinyint.clone()),
            (NativeType::I8, m.tinyint.clone()),
            (NativeType::DateTime, m.datetime.with_precision(Some(6), None)),
            (NativeType::Date, m.date_only.clone()),
            (NativeType::DateTimeOffset, m.datetime_offset.with_precision(Some(6), None)),
            (NativeType::Duration, m.time.with_precision(Some(6), None)),
            (NativeType::TimeOfDay, m.time_only.clone()),
            (NativeType::F32, m.float.clone()),
            (NativeType::F64, m.double.clone()),
            (NativeType::Decimal, m.decimal.clone()),
            (NativeType::Geometry, m.geometry.clone()),
        ]
        .into_iter()
        .collect();

        let bool_mapping = if config.treat_tiny_as_boolean {
            m.tinyint_bool
        } else {
            m.bit_bool
        };
        store_mappings.insert(bool_mapping.store_type_name(), vec![bool_mapping.clone()]);
        native_mappings.insert(NativeType::Bool, bool_mapping);

        if let Some(guid) = guid {
            store_mappings.insert(guid.store_type_name(), vec![guid.clone()]);
            native_mappings.insert(NativeType::Guid, guid);
        }

        tracing::debug!(
            store_types = store_mappings.len(),
            native_types = native_mappings.len(),
            guid_format = ?guid_format,
            charset = %config.charset.name,
            "Built type mapping registry"
        );

        Self {
            store_mappings,
            native_mappings,
            guid_format,
            charset_width: config.charset.max_byte_width.max(1),
        }
    }

    /// The registry for default settings, built on first use.
    pub fn global() -> &'static MappingRegistry {
        static GLOBAL: OnceLock<MappingRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| MappingRegistry::new(&CodecConfig::default()))
    }

    /// The GUID format the registry was built with, after resolution.
    pub fn guid_format(&self) -> GuidFormat {
        self.guid_format
    }

    /// Every mapping registered for a store type name.
    pub fn mappings_for_store_type(&self, name: &str) -> &[TypeMapping] {
        self.store_mappings
            .get(&name.trim().to_ascii_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// The mapping registered for a native type.
    pub fn mapping_for_native_type(&self, native: NativeType) -> Option<&TypeMapping> {
        self.native_mappings.get(&native)
    }

    /// Resolve a mapping from a store type name, a native type, or both.
    ///
    /// Returns `None` when nothing matches so the caller can fall back to a
    /// more generic strategy.
    pub fn find(
        &self,
        store_type_name: Option<&str>,
        native: Option<NativeType>,
        facets: &MappingFacets,
    ) -> Option<TypeMapping> {
        let parsed = store_type_name.map(StoreType::parse);
        let facets = match &parsed {
            Some(parsed) => facets.or_from(parsed),
            None => facets.clone(),
        };

        let found = self
            .find_raw(store_type_name, parsed.as_ref(), native, &facets)
            .map(|mapping| self.apply_facets(&mapping, &facets));

        if found.is_none() {
            tracing::debug!(
                store_type = ?store_type_name,
                native = ?native,
                "No type mapping found"
            );
        }
        found
    }

    /// Resolve a mapping, treating a miss as an error.
    pub fn require(
        &self,
        store_type_name: Option<&str>,
        native: Option<NativeType>,
        facets: &MappingFacets,
    ) -> Result<TypeMapping> {
        self.find(store_type_name, native, facets).ok_or_else(|| {
            Error::Custom(format!(
                "No mapping found for store type {:?} and native type {:?}",
                store_type_name,
                native.map(NativeType::name)
            ))
        })
    }

    fn select(mappings: &[TypeMapping], native: Option<NativeType>) -> Option<&TypeMapping> {
        match native {
            None => mappings.first(),
            Some(native) => mappings.iter().find(|m| m.native_type() == native),
        }
    }

    fn find_raw(
        &self,
        store_type_name: Option<&str>,
        parsed: Option<&StoreType>,
        native: Option<NativeType>,
        facets: &MappingFacets,
    ) -> Option<TypeMapping> {
        if let (Some(name), Some(parsed)) = (store_type_name, parsed) {
            let full_name = name.trim().to_ascii_lowercase();
            if let Some(mappings) = self.store_mappings.get(&full_name) {
                return Self::select(mappings, native).cloned();
            }
            if let Some(mappings) = self.store_mappings.get(&parsed.lookup_name()) {
                return Self::select(mappings, native).map(|m| m.clone_with(facets));
            }
        }

        let native = native?;
        if let Some(mapping) = self.native_mappings.get(&native) {
            if let Some(precision) = facets.precision {
                if native.takes_time_precision() {
                    return Some(mapping.with_precision(Some(precision), None));
                }
            }
            return Some(mapping.clone());
        }

        match native {
            NativeType::String => Some(self.synthesize_string(facets)),
            NativeType::Bytes => Some(Self::synthesize_bytes(facets)),
            _ => None,
        }
    }

    /// `min(3072 / (width * 2), 255)` for key columns without a size.
    fn inferred_key_size(&self, facets: &MappingFacets) -> Option<u32> {
        facets
            .key_or_index
            .then(|| (MAX_KEY_LENGTH / (self.charset_width * 2)).min(MAX_INFERRED_KEY_CHARS))
    }

    /// Largest string length that still fits the row byte budget.
    pub fn max_sized_string_length(&self) -> u32 {
        MAX_ROW_STRING_BYTES / self.charset_width
    }

    fn synthesize_string(&self, facets: &MappingFacets) -> TypeMapping {
        let mut fixed = facets.fixed_length == Some(true);
        let mut size = facets.size.or_else(|| self.inferred_key_size(facets));
        if size.is_some_and(|s| s > self.max_sized_string_length()) {
            size = None;
            fixed = false;
        }

        let base = if fixed {
            TypeMapping::string("char", true, true)
        } else if size.is_none() {
            TypeMapping::string("longtext", false, false)
        } else {
            TypeMapping::string("varchar", false, true)
        };
        base.with_size(size)
    }

    fn synthesize_bytes(facets: &MappingFacets) -> TypeMapping {
        let fixed = facets.fixed_length == Some(true);
        let size = facets
            .size
            .or(facets.key_or_index.then_some(MAX_KEY_LENGTH))
            .unwrap_or(if fixed { 255 } else { 4000 });
        TypeMapping::bytes(Some(size), fixed)
    }

    /// Clone with facets, sizing unsized string keys and degrading oversized
    /// strings to `longtext`.
    fn apply_facets(&self, mapping: &TypeMapping, facets: &MappingFacets) -> TypeMapping {
        let mut facets = facets.clone();
        if mapping.kind() == MappingKind::String && facets.size.is_none() {
            facets.size = self.inferred_key_size(&facets);
        }
        let clone = mapping.clone_with(&facets);
        let oversized = clone.kind() == MappingKind::String
            && clone.size().is_some_and(|s| s > self.max_sized_string_length());
        if oversized {
            tracing::debug!(
                store_type = %clone.store_type(),
                budget = self.max_sized_string_length(),
                "String size exceeds byte budget, using longtext"
            );
            let longtext = TypeMapping::string("longtext", false, false);
            return longtext.clone_with(&MappingFacets {
                unicode: facets.unicode,
                ..MappingFacets::default()
            });
        }
        clone
    }

    /// Check that a mapping can be used for a column.
    ///
    /// Length-bearing store types without a length need an owning column to
    /// take the length from.
    pub fn validate_mapping(&self, mapping: &TypeMapping, has_owning_column: bool) -> Result<()> {
        let base = mapping.store_type_name_base();
        if LENGTH_REQUIRED.contains(&base) && mapping.size().is_none() && !has_owning_column {
            return Err(Error::config(format!(
                "Data type '{base}' is not supported in this form. Either specify the length \
                 explicitly in the type name or remove the data type and use APIs such as \
                 max length to configure it"
            )));
        }
        Ok(())
    }
}
