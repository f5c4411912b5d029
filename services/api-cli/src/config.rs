//! Configuration types and loading
//!
//! Precedence: env vars > config file > defaults. The config file itself is
//! located via `--config`, then `CONFIG_PATH`, then `api-cli.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use api_client::ClientConfig;
use serde::Deserialize;
use session::{RefreshFailurePolicy, SessionConfig};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API endpoint settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub client_id: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the persisted session
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionSection {
    /// Clear stored credentials when a token refresh fails
    #[serde(default)]
    pub logout_on_refresh_failure: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("api-cli-credentials.json")
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = common::load_toml(path)?;

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.api.base_url = url;
        }
        if let Ok(client_id) = std::env::var("API_CLIENT_ID") {
            config.api.client_id = client_id;
        }

        if !config.api.base_url.starts_with("http://")
            && !config.api.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                config.api.base_url
            )));
        }

        if config.api.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        common::resolve_path(cli_path, "CONFIG_PATH", "api-cli.toml")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api.base_url, &self.api.client_id)
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn session_config(&self) -> SessionConfig {
        let refresh_failure = if self.session.logout_on_refresh_failure {
            RefreshFailurePolicy::Logout
        } else {
            RefreshFailurePolicy::KeepCredentials
        };
        SessionConfig { refresh_failure }
    }
}
