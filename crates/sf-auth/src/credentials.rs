//! Connected-app credentials for the refresh-token grant
//!
//! A `Credentials` value is built once from configuration and handed to the
//! client, which keeps it behind its token lock. The only runtime mutations
//! are refresh-token rotation and pointing the exchange at another login URL.

use crate::constants::{DEFAULT_GRANT_TYPE, DEFAULT_LOGIN_URL};
use crate::error::{Error, Result};
use crate::secret::Secret;

/// Everything needed to mint a new access token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,
    /// Full token endpoint URL, e.g. `https://login.salesforce.com/services/oauth2/token`
    pub login_url: String,
    pub grant_type: String,
}

impl Credentials {
    /// Credentials against the production login endpoint with the
    /// `refresh_token` grant.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret<String>>,
        refresh_token: impl Into<Secret<String>>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
        }
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = grant_type.into();
        self
    }

    /// Reject credentials that cannot possibly authenticate.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::InvalidCredentials("client_id is empty".into()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::InvalidCredentials("client_secret is empty".into()));
        }
        if self.refresh_token.is_empty() {
            return Err(Error::InvalidCredentials("refresh_token is empty".into()));
        }
        if !self.login_url.starts_with("http://") && !self.login_url.starts_with("https://") {
            return Err(Error::InvalidCredentials(format!(
                "login_url must start with http:// or https://, got: {}",
                self.login_url
            )));
        }
        Ok(())
    }
}
