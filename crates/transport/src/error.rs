//! Error types for transport operations

/// Errors that prevent a request from producing a response.
///
/// Application-level failures (GraphQL `errors`, non-2xx statuses) are not
/// represented here; they arrive as ordinary responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("credential store error: {0}")]
    Credential(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
