//! Salesforce API command-line client
//!
//! Loads connected-app settings, builds a `SalesforceClient` and runs one
//! command against the org. Results are printed to stdout as JSON;
//! diagnostics go to stderr through tracing.

mod commands;
mod config;
mod error;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sf_client::SalesforceClient;

use crate::commands::Command;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr with LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let command = Command::parse(&args)?;

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        login_url = %config.salesforce.login_url,
        api_version = %config.salesforce.api_version,
        timeout_secs = config.salesforce.timeout_secs,
        "configuration loaded"
    );

    let client = SalesforceClient::new(config.credentials()?, config.client_options())
        .context("failed to create salesforce client")?;

    let output = commands::run(&client, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
