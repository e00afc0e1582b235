//! Error types for are-rest-core

use thiserror::Error;

/// Result type alias for are-rest-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for are-rest-core
#[derive(Debug, Error)]
pub enum Error {
    /// A required path parameter or body was empty; nothing was sent
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Event category name not recognized
    #[error("Unknown event category: '{0}'")]
    UnknownCategory(String),

    /// The configured event transport cannot open streams
    #[error("Server-sent events are not supported by this transport")]
    StreamingUnsupported,

    /// Token is not a valid path-segment encoding
    #[error("Invalid path encoding: {0}")]
    InvalidEncoding(String),

    /// Transport failed to open or drive a connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
