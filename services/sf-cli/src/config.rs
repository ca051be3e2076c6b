//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret and refresh token come from SF_CLIENT_SECRET /
//! SF_REFRESH_TOKEN or from files named in the config, never from the TOML
//! body itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sf_auth::{Credentials, DEFAULT_GRANT_TYPE, DEFAULT_LOGIN_URL, Secret};
use sf_client::{ClientOptions, DEFAULT_API_VERSION};

use crate::error::{Error, Result};

pub const CLIENT_SECRET_ENV: &str = "SF_CLIENT_SECRET";
pub const REFRESH_TOKEN_ENV: &str = "SF_REFRESH_TOKEN";
pub const CONFIG_PATH_ENV: &str = "SF_API_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "sf-api.toml";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub salesforce: SalesforceConfig,
}

/// Connected app and API settings
#[derive(Debug, Deserialize)]
pub struct SalesforceConfig {
    pub client_id: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_grant_type")]
    pub grant_type: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Default recipient for email messages
    #[serde(default)]
    pub to_email: Option<String>,

    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default)]
    pub refresh_token_file: Option<PathBuf>,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

fn default_grant_type() -> String {
    DEFAULT_GRANT_TYPE.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then resolve secrets.
    ///
    /// Each secret resolves in order:
    /// 1. its env var
    /// 2. its `*_file` path from config
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        let sf = &mut config.salesforce;

        if sf.client_id.trim().is_empty() {
            return Err(Error::Config("client_id must not be empty".into()));
        }
        if !sf.login_url.starts_with("http://") && !sf.login_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "login_url must start with http:// or https://, got: {}",
                sf.login_url
            )));
        }
        if sf.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }
        if sf.api_version.is_empty() {
            return Err(Error::Config("api_version must not be empty".into()));
        }

        sf.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            sf.client_secret_file.as_deref(),
            "client_secret_file",
        )?;
        sf.refresh_token = resolve_secret(
            REFRESH_TOKEN_ENV,
            sf.refresh_token_file.as_deref(),
            "refresh_token_file",
        )?;

        if sf.client_secret.is_none() {
            return Err(Error::Config(format!(
                "client secret missing: set {CLIENT_SECRET_ENV} or client_secret_file"
            )));
        }
        if sf.refresh_token.is_none() {
            return Err(Error::Config(format!(
                "refresh token missing: set {REFRESH_TOKEN_ENV} or refresh_token_file"
            )));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or SF_API_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let sf = &self.salesforce;
        let (Some(secret), Some(refresh)) = (&sf.client_secret, &sf.refresh_token) else {
            return Err(Error::Config("secrets were not resolved".into()));
        };
        Ok(
            Credentials::new(sf.client_id.clone(), secret.clone(), refresh.clone())
                .with_login_url(sf.login_url.clone())
                .with_grant_type(sf.grant_type.clone()),
        )
    }

    pub fn client_options(&self) -> ClientOptions {
        let sf = &self.salesforce;
        ClientOptions {
            api_version: sf.api_version.clone(),
            timeout: Duration::from_secs(sf.timeout_secs),
            default_to_address: sf.to_email.clone().filter(|to| !to.is_empty()),
        }
    }
}

fn resolve_secret(env: &str, file: Option<&Path>, field: &str) -> Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env) {
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    let Some(file) = file else {
        return Ok(None);
    };
    let value = std::fs::read_to_string(file).map_err(|e| {
        Error::Config(format!("failed to read {field} {}: {e}", file.display()))
    })?;
    let value = value.trim().to_owned();
    Ok((!value.is_empty()).then(|| Secret::new(value)))
}
