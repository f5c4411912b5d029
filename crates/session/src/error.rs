//! Error types for session operations

/// Errors from credential bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential store error: {0}")]
    Store(#[from] credentials::Error),

    #[error("partial credentials: access and refresh tokens must be set together")]
    PartialCredentials,

    #[error("stored account snapshot is invalid: {0}")]
    Account(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for transport::Error {
    fn from(err: Error) -> Self {
        transport::Error::Credential(err.to_string())
    }
}
