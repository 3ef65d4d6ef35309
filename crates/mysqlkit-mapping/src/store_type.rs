//! Store type names and their facets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How facets are written after the base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorePostfix {
    /// Facets are not part of the name (`int`, `text`)
    #[default]
    None,
    /// `base(size)`
    Size,
    /// `base(precision)`
    Precision,
    /// `base(precision,scale)`
    PrecisionAndScale,
}

/// A database-side type name with optional facets.
///
/// The base name never carries facets; `unsigned` is kept as a flag and
/// written back after them, so `int(11) unsigned` has base `int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreType {
    /// Lowercased base name
    pub base: String,
    /// Character or byte length
    pub size: Option<u32>,
    /// Numeric or fractional-seconds precision
    pub precision: Option<u32>,
    /// Numeric scale
    pub scale: Option<u32>,
    /// Fixed-length storage (`char`, `binary`)
    pub fixed_length: bool,
    /// `unsigned` suffix
    pub unsigned: bool,
    /// Which facets the rendered name carries
    pub postfix: StorePostfix,
}

impl StoreType {
    /// A store type with no facets.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim().to_ascii_lowercase(),
            size: None,
            precision: None,
            scale: None,
            fixed_length: false,
            unsigned: false,
            postfix: StorePostfix::None,
        }
    }

    /// Mark the type unsigned.
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Mark the type fixed-length.
    pub fn fixed_length(mut self) -> Self {
        self.fixed_length = true;
        self
    }

    /// Render facets with the given postfix.
    pub fn postfix(mut self, postfix: StorePostfix) -> Self {
        self.postfix = postfix;
        self
    }

    /// Set the size facet.
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set precision and optional scale.
    pub fn precision(mut self, precision: u32, scale: Option<u32>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    /// Parse a store type name such as `VARCHAR(50)`, `decimal(10, 2)` or
    /// `int(11) unsigned`.
    ///
    /// A single parameter is recorded as both size and precision; the
    /// mapping it resolves to decides which one it uses. Unparseable
    /// parameters are dropped.
    pub fn parse(type_str: &str) -> Self {
        let type_str = type_str.trim().to_ascii_lowercase();

        let unsigned = type_str.contains("unsigned");
        let type_str = type_str.replace("unsigned", "");
        let type_str = type_str.trim();

        let Some(paren_start) = type_str.find('(') else {
            let mut parsed = Self::new(type_str);
            parsed.unsigned = unsigned;
            return parsed;
        };

        let mut parsed = Self::new(&type_str[..paren_start]);
        parsed.unsigned = unsigned;
        let params = type_str[paren_start + 1..]
            .split(')')
            .next()
            .unwrap_or_default();

        if params.contains(',') {
            let mut parts = params.split(',').map(|s| s.trim().parse::<u32>().ok());
            parsed.precision = parts.next().flatten();
            parsed.scale = parts.next().flatten();
            parsed.postfix = StorePostfix::PrecisionAndScale;
        } else {
            let value = params.trim().parse::<u32>().ok();
            parsed.size = value;
            parsed.precision = value;
            parsed.postfix = StorePostfix::Size;
        }
        parsed
    }

    /// Name used for table lookups: the base plus ` unsigned` when set.
    pub fn lookup_name(&self) -> String {
        if self.unsigned {
            format!("{} unsigned", self.base)
        } else {
            self.base.clone()
        }
    }

    /// Check whether facets were given in the name.
    pub fn has_facets(&self) -> bool {
        self.size.is_some() || self.precision.is_some() || self.scale.is_some()
    }

    /// The full store type name.
    pub fn name(&self) -> String {
        let facets = match (self.postfix, self.size, self.precision, self.scale) {
            (StorePostfix::Size, Some(size), _, _) => format!("({size})"),
            (StorePostfix::Precision, _, Some(p), _) => format!("({p})"),
            (StorePostfix::PrecisionAndScale, _, Some(p), Some(s)) => format!("({p},{s})"),
            (StorePostfix::PrecisionAndScale, _, Some(p), None) => format!("({p})"),
            _ => String::new(),
        };
        let mut name = format!("{}{}", self.base, facets);
        if self.unsigned {
            name.push_str(" unsigned");
        }
        name
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
