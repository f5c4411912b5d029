//! TOML config file helpers
//!
//! Path precedence: explicit CLI path > environment variable > default file name.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Read and deserialize a TOML file.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Resolve a config file path from a CLI argument, an environment variable,
/// or a fallback file name in the working directory.
pub fn resolve_path(cli_path: Option<&str>, env_var: &str, default: &str) -> PathBuf {
    if let Some(p) = cli_path {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var(env_var) {
        return PathBuf::from(p);
    }
    PathBuf::from(default)
}
