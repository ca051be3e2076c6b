//! Token store and validity gate
//!
//! One `tokio::sync::Mutex` guards the credentials, the bearer token, its
//! expiry and the instance URL. Checking validity and refreshing both happen
//! while the lock is held, so when several callers find a stale token only
//! the first performs the exchange; the rest wait and then see its result.
//!
//! Dropping a caller's future while it waits or refreshes releases the lock
//! and leaves the stored token as it was.

use std::time::Instant;

use sf_auth::{Credentials, REFRESH_MARGIN, Secret, SessionToken};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

/// Token and instance URL to use for one request.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub access_token: Secret<String>,
    pub instance_url: String,
}

impl Authorization {
    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose())
    }
}

#[derive(Debug)]
struct TokenState {
    credentials: Credentials,
    access_token: Option<Secret<String>>,
    expires_at: Option<Instant>,
    instance_url: String,
}

impl TokenState {
    fn needs_refresh(&self) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) if !token.is_empty() => {
                expires_at.saturating_duration_since(Instant::now()) < REFRESH_MARGIN
            }
            _ => true,
        }
    }

    fn apply(&mut self, token: SessionToken) {
        self.access_token = Some(token.access_token);
        self.instance_url = token.instance_url;
        self.expires_at = Some(token.expires_at);
    }

    fn clear(&mut self) {
        self.access_token = None;
        self.expires_at = None;
    }

    fn authorization(&self) -> Option<Authorization> {
        self.access_token.as_ref().map(|token| Authorization {
            access_token: token.clone(),
            instance_url: self.instance_url.clone(),
        })
    }
}

/// Token store exclusively owned by a `SalesforceClient`.
#[derive(Debug)]
pub(crate) struct Session {
    state: Mutex<TokenState>,
}

impl Session {
    pub(crate) fn new(credentials: Credentials) -> Self {
        Self {
            state: Mutex::new(TokenState {
                credentials,
                access_token: None,
                expires_at: None,
                instance_url: String::new(),
            }),
        }
    }

    /// Return a usable token, refreshing first when it is missing or within
    /// `REFRESH_MARGIN` of expiry. A failed refresh leaves the store unchanged.
    pub(crate) async fn ensure_valid_token(&self, http: &reqwest::Client) -> Result<Authorization> {
        let mut state = self.state.lock().await;

        if state.needs_refresh() {
            debug!("access token missing or expiring, refreshing");
            let token = authenticate(http, &state.credentials).await?;
            state.apply(token);
        }

        // needs_refresh() is false or apply() just stored a token
        state
            .authorization()
            .ok_or_else(|| sf_auth::Error::Malformed("no access token after refresh".into()).into())
    }

    /// Authenticate unconditionally and replace the current token.
    ///
    /// On failure the token is cleared, so the next gate call retries the
    /// exchange. The store is only touched once the exchange has finished.
    pub(crate) async fn force_refresh(&self, http: &reqwest::Client) -> Result<()> {
        let mut state = self.state.lock().await;
        let result = authenticate(http, &state.credentials).await;
        match result {
            Ok(token) => {
                state.apply(token);
                Ok(())
            }
            Err(e) => {
                state.clear();
                warn!(error = %e, "forced token refresh failed, token cleared");
                Err(e.into())
            }
        }
    }

    pub(crate) async fn set_refresh_token(&self, refresh_token: Secret<String>) {
        self.state.lock().await.credentials.refresh_token = refresh_token;
    }

    pub(crate) async fn set_login_url(&self, login_url: String) {
        self.state.lock().await.credentials.login_url = login_url;
    }

    pub(crate) async fn set_instance_url(&self, instance_url: String) {
        self.state.lock().await.instance_url = instance_url;
    }

    pub(crate) async fn instance_url(&self) -> String {
        self.state.lock().await.instance_url.clone()
    }

    /// Install a token directly, bypassing the exchange.
    #[cfg(test)]
    pub(crate) async fn seed(&self, token: SessionToken) {
        self.state.lock().await.apply(token);
    }
}

async fn authenticate(http: &reqwest::Client, credentials: &Credentials) -> sf_auth::Result<SessionToken> {
    let result = sf_auth::authenticate(http, credentials).await;
    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::counter!("sf_token_refresh_total", "outcome" => outcome).increment(1);
    result
}
