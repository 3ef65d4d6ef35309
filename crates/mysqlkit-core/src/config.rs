//! Connection-level codec settings.
//!
//! These are the options a connection hands to the type mapping layer:
//! how GUIDs are stored, whether `tinyint(1)` means boolean, the active
//! character set and an optional schema translation hook.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::charset::CharSet;

/// Storage format for GUID values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuidFormat {
    /// Resolved from `old_guids` when the registry is built
    #[default]
    Default,
    /// `char(36)` with dashes
    Char36,
    /// `char(32)` without dashes
    Char32,
    /// `binary(16)` in RFC 4122 byte order
    Binary16,
    /// `binary(16)` with the time fields moved to the front
    TimeSwapBinary16,
    /// `binary(16)` with the first three groups little-endian
    LittleEndianBinary16,
    /// No GUID mapping
    None,
}

impl GuidFormat {
    /// Resolve `Default` to the concrete format for the connection.
    pub const fn resolve(self, old_guids: bool) -> Self {
        match self {
            GuidFormat::Default if old_guids => GuidFormat::LittleEndianBinary16,
            GuidFormat::Default => GuidFormat::Char36,
            other => other,
        }
    }

    /// Check if this format stores GUIDs as binary.
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            GuidFormat::Binary16 | GuidFormat::TimeSwapBinary16 | GuidFormat::LittleEndianBinary16
        )
    }
}

/// Hook translating `(name, schema)` to the name used in SQL text.
#[derive(Clone)]
pub struct SchemaTranslation(Arc<dyn Fn(&str, Option<&str>) -> String + Send + Sync>);

impl SchemaTranslation {
    pub fn new(f: impl Fn(&str, Option<&str>) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Apply the translation.
    pub fn apply(&self, name: &str, schema: Option<&str>) -> String {
        (self.0)(name, schema)
    }
}

impl fmt::Debug for SchemaTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SchemaTranslation(..)")
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// GUID storage format
    pub guid_format: GuidFormat,
    /// Legacy flag: `binary(16)` little-endian GUIDs when the format is `Default`
    pub old_guids: bool,
    /// Map `tinyint(1)` (rather than `bit(1)`) to booleans
    pub treat_tiny_as_boolean: bool,
    /// Connection character set
    pub charset: CharSet,
    /// Schema translation hook for delimited identifiers
    #[serde(skip)]
    pub schema_translation: Option<SchemaTranslation>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            guid_format: GuidFormat::Default,
            old_guids: false,
            treat_tiny_as_boolean: true,
            charset: CharSet::default(),
            schema_translation: None,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the GUID format.
    pub fn guid_format(mut self, format: GuidFormat) -> Self {
        self.guid_format = format;
        self
    }

    /// Enable or disable legacy GUID storage.
    pub fn old_guids(mut self, enabled: bool) -> Self {
        self.old_guids = enabled;
        self
    }

    /// Enable or disable `tinyint(1)` booleans.
    pub fn treat_tiny_as_boolean(mut self, enabled: bool) -> Self {
        self.treat_tiny_as_boolean = enabled;
        self
    }

    /// Set the character set.
    pub fn charset(mut self, charset: CharSet) -> Self {
        self.charset = charset;
        self
    }

    /// Set the schema translation hook.
    pub fn schema_translation(
        mut self,
        f: impl Fn(&str, Option<&str>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.schema_translation = Some(SchemaTranslation::new(f));
        self
    }

    /// The GUID format after resolving `Default`.
    pub fn effective_guid_format(&self) -> GuidFormat {
        self.guid_format.resolve(self.old_guids)
    }
}
