//! Credential persistence for the API session
//!
//! Defines the pluggable key/value `CredentialStore` the session layer writes
//! tokens into, plus two implementations:
//! - `MemoryStore`: process-local, lost on exit (the default)
//! - `FileStore`: JSON file with atomic writes, survives restarts
//!
//! A logged-in session occupies three keys (access token, refresh token,
//! account snapshot). The store itself knows nothing about that invariant;
//! the session layer replaces or clears all three together.

pub mod error;
pub mod file;
pub mod keys;
pub mod login;
pub mod store;

pub use error::{Error, Result};
pub use file::FileStore;
pub use keys::{ACCESS_TOKEN_KEY, ACCOUNT_KEY, REFRESH_TOKEN_KEY};
pub use login::{Account, LoginData, Role};
pub use store::{CredentialStore, MemoryStore, StoreFuture};
