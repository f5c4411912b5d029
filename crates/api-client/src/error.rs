//! Error types for API client calls

use transport::{GraphqlError, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] transport::Error),

    /// The server answered with a populated `errors` array.
    #[error("API returned {status}: {}", join_messages(.errors))]
    Graphql {
        status: StatusCode,
        errors: Vec<GraphqlError>,
    },

    /// Non-success status whose body is not a GraphQL envelope.
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Session(#[from] session::Error),
}

impl ClientError {
    /// Error messages reported by the server, empty for non-GraphQL failures.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            ClientError::Graphql { errors, .. } => {
                errors.iter().map(|e| e.message.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ClientError>;
