//! Client for the show/episode GraphQL API
//!
//! Two layers:
//! - `StatelessClient`: one method per operation, caller supplies the
//!   selection set and any authentication
//! - `StatefulClient`: the same operations sent through a `session::Session`,
//!   so login results are persisted and expired access tokens are refreshed
//!   transparently

pub mod config;
pub mod error;
pub mod operation;
pub mod stateful;
pub mod stateless;
pub mod types;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use operation::{Operation, OperationKind, build_query, find_operation};
pub use stateful::{LOGIN_DATA_SELECTION, StatefulClient};
pub use stateless::StatelessClient;
pub use types::*;
