//! Common types shared by the API client crates and the CLI

mod config;
mod error;
mod secret;

pub use config::{load_toml, resolve_path};
pub use error::{Error, Result};
pub use secret::Secret;
