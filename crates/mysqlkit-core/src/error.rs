//! Error types for codec, mapping and expression operations.

use std::fmt;

/// The primary error type for all mysqlkit operations.
#[derive(Debug)]
pub enum Error {
    /// Malformed wire data
    Protocol(ProtocolError),
    /// Value conversion errors
    Type(TypeError),
    /// Invalid or unsupported configuration
    Config(ConfigError),
    /// Expression syntax errors
    Parse(ParseError),
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct ProtocolError {
    pub message: String,
    pub raw_data: Option<Vec<u8>>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
    pub rust_type: Option<&'static str>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A syntax error raised while lexing or parsing an expression.
#[derive(Debug)]
pub struct ParseError {
    /// What went wrong
    pub message: String,
    /// Token index (or character index for lexing errors) of the failure
    pub position: Option<usize>,
    /// The full expression text, set for top-level parse failures
    pub source_text: Option<String>,
    /// The underlying failure when this error wraps another
    pub source: Option<Box<ParseError>>,
}

impl ProtocolError {
    /// Create a protocol error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw_data: None,
            source: None,
        }
    }

    /// Attach the offending bytes for diagnostics.
    pub fn with_raw_data(mut self, data: &[u8]) -> Self {
        self.raw_data = Some(data.to_vec());
        self
    }
}

impl ConfigError {
    /// Create a configuration error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl ParseError {
    /// Create a parse error at the given position.
    pub fn at(position: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
            source_text: None,
            source: None,
        }
    }

    /// Wrap this error as the cause of a failure to parse `text`.
    pub fn in_source(self, text: &str) -> Self {
        Self {
            message: format!("Unable to parse query '{text}'"),
            position: self.position,
            source_text: Some(text.to_string()),
            source: Some(Box::new(self)),
        }
    }

    /// The innermost error message.
    pub fn root_message(&self) -> &str {
        match &self.source {
            Some(inner) => inner.root_message(),
            None => &self.message,
        }
    }
}

impl Error {
    /// Shorthand for a protocol error with a message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(ProtocolError::new(message))
    }

    /// Shorthand for a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError::new(message))
    }

    /// Is this malformed wire data?
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Is this an invalid configuration?
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Get the token position of a parse error, if available.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Parse(p) => p.position,
            _ => None,
        }
    }

    /// Get the expression text that failed to parse, if available.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Error::Parse(p) => p.source_text.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "Protocol error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Parse(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(inner) => write!(f, "{}: {}", self.message, inner),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Result type alias for mysqlkit operations.
pub type Result<T> = std::result::Result<T, Error>;
