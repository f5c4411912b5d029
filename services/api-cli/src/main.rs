//! api-cli
//!
//! Command-line front end for the GraphQL API:
//! 1. Loads configuration (TOML + env overrides)
//! 2. Opens the file-backed credential store
//! 3. Runs one command through a stateful client, printing JSON to stdout

mod commands;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use api_client::StatefulClient;
use credentials::FileStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::ReqwestTransport;

use crate::commands::{Command, USAGE};
use crate::config::Config;

/// Split `--config PATH` out of the argument list.
fn split_config_flag(mut args: Vec<String>) -> Result<(Option<String>, Vec<String>)> {
    match args.iter().position(|a| a == "--config") {
        Some(i) => {
            if i + 1 >= args.len() {
                anyhow::bail!("--config requires a path");
            }
            let path = args.remove(i + 1);
            args.remove(i);
            Ok((Some(path), args))
        }
        None => Ok((None, args)),
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (cli_config_path, args) = split_config_flag(std::env::args().skip(1).collect())?;
    let command = Command::parse(&args).with_context(|| USAGE.to_string())?;

    let config_path = Config::resolve_path(cli_config_path.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    init_logging(config.logging.json);
    info!(
        base_url = %config.api.base_url,
        credentials = %config.storage.credentials_path.display(),
        "configuration loaded"
    );

    let store = FileStore::load(config.storage.credentials_path.clone())
        .await
        .context("failed to open credential store")?;
    let transport = ReqwestTransport::new(Duration::from_secs(config.api.timeout_secs))
        .context("failed to build HTTP client")?;
    let client = StatefulClient::new(
        config.client_config(),
        Arc::new(transport),
        Arc::new(store),
        config.session_config(),
    )?;

    debug!(?command, "running command");
    let output = commands::run(&client, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
