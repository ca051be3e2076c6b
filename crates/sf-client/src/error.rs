//! Error types for client operations

use std::path::PathBuf;

/// Errors from the request engine and the domain operations built on it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to get valid token: {0}")]
    Auth(#[from] sf_auth::Error),

    /// Bad caller input, detected before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("failed to marshal request data: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to create request: {0}")]
    InvalidRequest(String),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// Error status whose body could not be classified.
    #[error("request failed with status: {0}")]
    Status(String),

    /// Error status on an attachment upload.
    #[error("attachment upload failed with status: {0}")]
    UploadStatus(String),

    /// Business error reported by the API.
    #[error("API error: {message} (code: {code})")]
    Api { message: String, code: String },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any of the above, prefixed with the operation that failed.
    #[error("failed to {operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap the error with the name of the operation (and identifiers)
    /// that produced it.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Error::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping `Context` layers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Provider error code (e.g. `INVALID_SESSION_ID`) when the API reported one.
    pub fn api_code(&self) -> Option<&str> {
        match self.root() {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the failure happened while obtaining a token.
    pub fn is_auth(&self) -> bool {
        matches!(self.root(), Error::Auth(_))
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
