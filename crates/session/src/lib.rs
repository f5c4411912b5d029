//! Authenticated session layer for the GraphQL API
//!
//! `Session` decorates a stateless `Transport` so that every request carries
//! the current access token, expired tokens are refreshed transparently, and
//! credentials returned by login-style operations are persisted.
//!
//! Request lifecycle:
//! 1. Read the stored access token (unlocked snapshot) and attach it as a bearer header
//! 2. Send through the inner transport
//! 3. Response reports `Access token is expired` → refresh once (single-flight), resend once
//! 4. Response carries a login payload → replace the stored credentials
//! 5. Hand the response back unchanged
//!
//! Two locks exist: one around credential writes (`CredentialManager`), one
//! around the refresh exchange (`Session::refresh_tokens`).

pub mod capture;
pub mod error;
pub mod expiry;
pub mod refresh;
pub mod session;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use capture::{CaptureOutcome, CredentialManager};
pub use error::{Error, Result};
pub use expiry::{AUTH_OPERATIONS, EXPIRED_TOKEN_MESSAGE, find_login_data, is_access_token_expired};
pub use refresh::{RefreshFailurePolicy, RefreshOutcome, RefreshRequestBuilder};
pub use session::{Session, SessionConfig};
