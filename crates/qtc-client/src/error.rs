//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::request::Payload;

/// Client error type.
///
/// Every failure of an executor or resource client is one of these variants,
/// so callers can tell a missing object (`Remote` with status 404) from a
/// server fault (`Remote` with status >= 500) from an unreachable host
/// (`Transport`).
#[derive(Debug, Error)]
pub enum Error {
    /// The connection could not be established or was interrupted.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a failure status.
    #[error("remote error ({status}): {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when the server declared it.
        body: Payload,
    },

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP verb outside GET/POST/PUT/DELETE.
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// URL parsing failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Local file could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Response declared as JSON but did not parse, or a request body
    /// could not be serialized.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response was missing a field the call depends on.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a remote error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Check if the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
