//! Error types and handling for the socket-endpoint binding

use thiserror::Error;

/// Main error type for binding operations
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Type or interface registration errors
    #[error("Registration error: {0}")]
    Registration(String),

    /// A native handle of the wrong runtime type was passed to a typed conversion
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Null or otherwise unusable native handles
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Endpoint string or URI parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Name resolution errors, surfaced when an enumerator is driven
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Helper trait for converting errors to ConnectError
pub trait IntoConnectError<T> {
    fn into_connect_error(self, context: &str) -> Result<T>;
}

impl<T, E> IntoConnectError<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn into_connect_error(self, context: &str) -> Result<T> {
        self.map_err(|e| ConnectError::Other(format!("{context}: {e}")))
    }
}

// Implement From for common error types
impl From<toml::de::Error> for ConnectError {
    fn from(err: toml::de::Error) -> Self {
        ConnectError::Config(format!("TOML parsing error: {err}"))
    }
}

impl From<url::ParseError> for ConnectError {
    fn from(err: url::ParseError) -> Self {
        ConnectError::Parse(format!("URI parsing error: {err}"))
    }
}
