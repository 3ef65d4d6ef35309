//! Type mappings between store types and native types.

use mysqlkit_core::{GuidFormat, NativeType, Result, Value};
use serde::{Deserialize, Serialize};

use crate::guid;
use crate::literal;
use crate::parameter::{self, OutgoingParameter};
use crate::store_type::{StorePostfix, StoreType};

/// How a mapping renders and binds values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Integer,
    /// `bit(n)` as an unsigned 64-bit integer
    Bit,
    Bool,
    Float,
    Double,
    Decimal,
    String,
    Bytes,
    Date,
    DateTime,
    DateTimeOffset,
    TimeOfDay,
    Duration,
    Guid(GuidFormat),
    Geometry,
}

/// Parameter type reported to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Boolean,
    String,
    StringFixedLength,
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Guid,
    Object,
}

/// Requested refinements for a mapping lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingFacets {
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    /// The column is part of a key or index
    pub key_or_index: bool,
}

impl MappingFacets {
    /// No facets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size facet.
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the precision facet.
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the scale facet.
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Request fixed or variable length storage.
    pub fn fixed_length(mut self, fixed: bool) -> Self {
        self.fixed_length = Some(fixed);
        self
    }

    /// Request unicode (or ansi) strings.
    pub fn unicode(mut self, unicode: bool) -> Self {
        self.unicode = Some(unicode);
        self
    }

    /// Mark the column as part of a key or index.
    pub fn key_or_index(mut self, key: bool) -> Self {
        self.key_or_index = key;
        self
    }

    /// Fill unset facets from a parsed store type name.
    pub(crate) fn or_from(&self, store_type: &StoreType) -> Self {
        Self {
            size: self.size.or(store_type.size),
            precision: self.precision.or(store_type.precision),
            scale: self.scale.or(store_type.scale),
            ..self.clone()
        }
    }
}

/// A store type bound to a native type.
///
/// Mappings are immutable; [`TypeMapping::clone_with`] produces a refined
/// copy and leaves the original untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    kind: MappingKind,
    store_type: StoreType,
    native: NativeType,
    db_type: DbType,
    unicode: bool,
}

impl TypeMapping {
    /// Create a mapping.
    pub fn new(kind: MappingKind, store_type: StoreType, native: NativeType, db_type: DbType) -> Self {
        Self {
            kind,
            store_type,
            native,
            db_type,
            unicode: true,
        }
    }

    /// A signed or unsigned integer mapping.
    pub fn integer(base: &str, native: NativeType, db_type: DbType) -> Self {
        let mut store_type = StoreType::new(base);
        store_type.unsigned = native.is_unsigned();
        Self::new(MappingKind::Integer, store_type, native, db_type)
    }

    /// A string mapping; `sized` types write their length in the name.
    pub fn string(base: &str, fixed_length: bool, sized: bool) -> Self {
        let mut store_type = StoreType::new(base);
        store_type.fixed_length = fixed_length;
        if sized {
            store_type.postfix = StorePostfix::Size;
        }
        let db_type = if fixed_length {
            DbType::StringFixedLength
        } else {
            DbType::String
        };
        Self::new(MappingKind::String, store_type, NativeType::String, db_type)
    }

    /// A byte array mapping: `binary`/`varbinary`, optionally sized.
    pub fn bytes(size: Option<u32>, fixed_length: bool) -> Self {
        let base = if fixed_length { "binary" } else { "varbinary" };
        let mut store_type = StoreType::new(base).postfix(StorePostfix::Size);
        store_type.fixed_length = fixed_length;
        store_type.size = size;
        Self::new(MappingKind::Bytes, store_type, NativeType::Bytes, DbType::Binary)
    }

    /// A GUID mapping for a resolved format.
    pub fn guid(format: GuidFormat) -> Option<Self> {
        let name = guid::store_type_name(format)?;
        let store_type = StoreType::parse(name);
        let db_type = if format.is_binary() {
            DbType::Binary
        } else {
            DbType::StringFixedLength
        };
        Some(Self::new(
            MappingKind::Guid(format),
            store_type,
            NativeType::Guid,
            db_type,
        ))
    }

    pub fn kind(&self) -> MappingKind {
        self.kind
    }

    pub fn native_type(&self) -> NativeType {
        self.native
    }

    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    pub fn store_type(&self) -> &StoreType {
        &self.store_type
    }

    /// The full store type name, e.g. `varchar(50)`.
    pub fn store_type_name(&self) -> String {
        self.store_type.name()
    }

    /// The base store type name without facets, e.g. `varchar`.
    pub fn store_type_name_base(&self) -> &str {
        &self.store_type.base
    }

    pub fn size(&self) -> Option<u32> {
        self.store_type.size
    }

    pub fn precision(&self) -> Option<u32> {
        self.store_type.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.store_type.scale
    }

    pub fn is_fixed_length(&self) -> bool {
        self.store_type.fixed_length
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    /// Copy with a different store base name, keeping every facet.
    pub fn with_store_base(&self, base: &str) -> Self {
        let mut clone = self.clone();
        clone.store_type.base = base.to_ascii_lowercase();
        clone
    }

    /// Copy with the size facet set, as `base(size)`.
    pub fn with_size(&self, size: Option<u32>) -> Self {
        let mut clone = self.clone();
        clone.store_type.size = size;
        if size.is_some() {
            clone.store_type.postfix = StorePostfix::Size;
        }
        clone
    }

    /// Copy with precision and scale set.
    pub fn with_precision(&self, precision: Option<u32>, scale: Option<u32>) -> Self {
        let mut clone = self.clone();
        clone.store_type.precision = precision;
        clone.store_type.scale = scale;
        clone
    }

    /// Copy refined by the requested facets.
    ///
    /// Only facets the store type writes in its name are applied; boolean
    /// and GUID mappings have a fixed store type and are returned as-is.
    pub fn clone_with(&self, facets: &MappingFacets) -> Self {
        if matches!(self.kind, MappingKind::Bool | MappingKind::Guid(_)) {
            return self.clone();
        }
        let mut clone = self.clone();
        match self.store_type.postfix {
            StorePostfix::Size => {
                if facets.size.is_some() {
                    clone.store_type.size = facets.size;
                }
            }
            StorePostfix::Precision => {
                if facets.precision.is_some() {
                    clone.store_type.precision = facets.precision;
                }
            }
            StorePostfix::PrecisionAndScale => {
                if facets.precision.is_some() {
                    clone.store_type.precision = facets.precision;
                    clone.store_type.scale = facets.scale;
                }
            }
            StorePostfix::None => {}
        }
        if self.kind == MappingKind::String {
            if let Some(unicode) = facets.unicode {
                clone.unicode = unicode;
                clone.db_type = match (unicode, clone.store_type.fixed_length) {
                    (true, true) => DbType::StringFixedLength,
                    (true, false) => DbType::String,
                    (false, true) => DbType::AnsiStringFixedLength,
                    (false, false) => DbType::AnsiString,
                };
            }
        }
        clone
    }

    /// Convert a native value to the value sent to the server.
    pub fn to_store_value(&self, value: &Value) -> Result<Value> {
        match (self.kind, value) {
            (MappingKind::Guid(format), Value::Uuid(guid)) => guid::to_store_value(guid, format),
            (MappingKind::Bool, Value::Bool(b)) if self.store_type.base == "bit" => {
                Ok(Value::UnsignedBigInt(u64::from(*b)))
            }
            (MappingKind::Bool, Value::Bool(b)) => Ok(Value::TinyInt(i8::from(*b))),
            _ => Ok(value.clone()),
        }
    }

    /// Render a value as a SQL literal.
    pub fn sql_literal(&self, value: &Value) -> Result<String> {
        literal::render(self, value)
    }

    /// Bind a value for one outgoing call.
    pub fn configure_parameter(&self, value: &Value) -> Result<OutgoingParameter> {
        parameter::configure(self, value)
    }
}
