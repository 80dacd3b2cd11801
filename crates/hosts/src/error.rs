//! Error types for `ghmcp-hosts`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration errors (invalid env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host string that cannot be turned into API endpoints
    #[error("Invalid host '{host}': {message}")]
    InvalidHost { host: String, message: String },

    /// URL construction errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
