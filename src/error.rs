//! Error taxonomy shared by the client and model layers.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by gist operations.
///
/// Nothing is retried or recovered internally; every error propagates to
/// the command layer, which presents it and sets the exit status.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied arguments or credentials violate a precondition.
    /// Raised before any request is sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-success HTTP status from the API, with the response body.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// A local file could not be read while building request content or
    /// resolving a token.
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or incomplete server response.
    #[error("could not parse API response: {0}")]
    Parse(String),

    /// Transport-level failure before any response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this is an API error for a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
