//! HTTP transport error types

use thiserror::Error;

/// Outcome of a request that did not produce a 2xx response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// No response was received (DNS failure, refused connection, timeout)
    #[error("Request failed: {message}")]
    Transport { message: String },
}

impl DispatchError {
    /// Status code of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// Reason phrase of the response, or the transport failure message
    pub fn status_text(&self) -> &str {
        match self {
            Self::Status { status_text, .. } => status_text,
            Self::Transport { message } => message,
        }
    }
}

/// HTTP transport error types
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input or configuration detected before anything was sent
    #[error(transparent)]
    Core(#[from] are_rest_core::Error),

    /// The request was sent and failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl Error {
    /// Name of the missing parameter if the request was rejected before dispatch
    pub fn missing_parameter(&self) -> Option<&'static str> {
        match self {
            Self::Core(are_rest_core::Error::MissingParameter(name)) => Some(name),
            _ => None,
        }
    }
}

/// Result type for HTTP transport operations
pub type Result<T> = std::result::Result<T, Error>;
