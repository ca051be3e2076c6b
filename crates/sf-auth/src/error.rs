//! Error types for OAuth authentication operations

/// Errors from the refresh-token exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The login endpoint could not be reached or the body could not be read.
    #[error("auth request failed: {0}")]
    Transport(String),

    /// The login endpoint answered with an OAuth error document.
    #[error("auth failed: {error} - {description}")]
    Rejected { error: String, description: String },

    /// Non-2xx answer without a usable OAuth error document.
    #[error("auth failed with status: {0}")]
    RejectedStatus(String),

    /// 2xx answer whose body is not a token response.
    #[error("failed to decode auth response: {0}")]
    Malformed(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl Error {
    /// Whether the provider refused the credentials themselves, as opposed
    /// to a network or decoding problem.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected { .. } | Error::RejectedStatus(_))
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
