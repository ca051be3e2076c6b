//! Authenticated request engine
//!
//! Two dispatch paths share token handling and header construction:
//!
//! - `request` is lenient: any HTTP status comes back as an `Envelope`, and a
//!   401 triggers a forced token refresh before the 401 envelope is returned.
//!   The call itself is never retried.
//! - `request_checked` is strict: statuses >= 400 become errors, classified
//!   from the body where possible. It does not refresh on 401.
//!
//! Case and query operations use the strict path, attachment upload the
//! lenient one.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sf_auth::{Credentials, Secret};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::classify::classify;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::session::{Authorization, Session};

/// REST API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v64.0";

/// Overall timeout applied to every HTTP call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client tuning that is not part of the OAuth credentials.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Version segment of `/services/data/{version}/...`
    pub api_version: String,
    pub timeout: Duration,
    /// Recipient used by `email_message` when the caller leaves `ToAddress` empty
    pub default_to_address: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_to_address: None,
        }
    }
}

/// Salesforce REST client.
///
/// Safe to share across tasks behind an `Arc`. Locking:
/// - token, expiry, instance URL and credentials: one `Mutex` inside `Session`
/// - session case ID: `RwLock`, last writer wins
/// - HTTP transport: `RwLock`, replaced only through `set_http_client`
pub struct SalesforceClient {
    http: RwLock<reqwest::Client>,
    session: Session,
    case_id: RwLock<Option<String>>,
    options: ClientOptions,
}

impl SalesforceClient {
    /// Build a client with its own HTTP transport using `options.timeout`.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        credentials
            .validate()
            .map_err(|e| Error::Validation(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(credentials, options, http))
    }

    /// Build a client on top of an existing transport.
    pub fn with_http_client(
        credentials: Credentials,
        options: ClientOptions,
        http: reqwest::Client,
    ) -> Self {
        info!(api_version = %options.api_version, login_url = %credentials.login_url, "salesforce client initialized");
        Self {
            http: RwLock::new(http),
            session: Session::new(credentials),
            case_id: RwLock::new(None),
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// `/services/data/{version}/{suffix}`
    pub fn data_path(&self, suffix: &str) -> String {
        format!("/services/data/{}/{suffix}", self.options.api_version)
    }

    /// Current token, refreshed first if missing or about to expire.
    pub async fn ensure_valid_token(&self) -> Result<Authorization> {
        let http = self.http().await;
        self.session.ensure_valid_token(&http).await
    }

    /// Discard the current token and authenticate again.
    pub async fn force_refresh(&self) -> Result<()> {
        let http = self.http().await;
        self.session.force_refresh(&http).await
    }

    /// Rotate the refresh token used by later exchanges.
    pub async fn set_refresh_token(&self, refresh_token: impl Into<Secret<String>>) {
        self.session.set_refresh_token(refresh_token.into()).await;
    }

    pub async fn set_login_url(&self, login_url: impl Into<String>) {
        self.session.set_login_url(login_url.into()).await;
    }

    /// Override the instance URL until the next token exchange replaces it.
    pub async fn set_instance_url(&self, instance_url: impl Into<String>) {
        self.session.set_instance_url(instance_url.into()).await;
    }

    pub async fn instance_url(&self) -> String {
        self.session.instance_url().await
    }

    pub async fn set_http_client(&self, http: reqwest::Client) {
        *self.http.write().await = http;
    }

    /// Most recently created or explicitly set case ID.
    pub async fn case_id(&self) -> Option<String> {
        self.case_id.read().await.clone()
    }

    /// Remember a case ID for later email and attachment calls. Empty IDs
    /// are ignored.
    pub async fn set_case_id(&self, case_id: impl Into<String>) {
        let case_id = case_id.into();
        if !case_id.is_empty() {
            *self.case_id.write().await = Some(case_id);
        }
    }

    /// Lenient dispatch: returns an `Envelope` for any HTTP status.
    ///
    /// The payload is only sent for POST, PUT and PATCH. Caller headers are
    /// applied after the defaults and replace them. On 401 the token is
    /// force-refreshed for the next call; a failed refresh is logged and
    /// the 401 envelope is still returned without error.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&T>,
        headers: &[(&str, &str)],
    ) -> Result<Envelope>
    where
        T: Serialize + ?Sized,
    {
        let auth = self.ensure_valid_token().await?;

        let body = match payload {
            Some(payload) if sends_body(&method) => Some(serde_json::to_vec(payload).map_err(|e| {
                error!(action = "api_request", success = false, error = %e, "failed to marshal request data");
                Error::Serialize(e)
            })?),
            _ => None,
        };

        let mut header_map = default_headers(&auth)?;
        if let Some(body) = &body {
            header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            header_map.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        overlay_headers(&mut header_map, headers)?;

        let http = self.http().await;
        let mut builder = http
            .request(method.clone(), format!("{}{path}", auth.instance_url))
            .headers(header_map);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(action = "api_request", success = false, error = %e, "request failed");
            Error::Transport(e)
        })?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let raw = response.bytes().await.map_err(|e| {
            error!(action = "api_request", success = false, status = %status, error = %e, "failed to read response body");
            Error::ReadBody(e)
        })?;
        record_request(&method, status);

        let envelope = Envelope::new(status, &response_headers, raw);

        if status == StatusCode::UNAUTHORIZED {
            warn!(action = "token_refresh", status_code = status.as_u16(), "authentication failed, attempting token refresh");
            if let Err(e) = self.force_refresh().await {
                warn!(action = "token_refresh", error = %e, "token refresh failed");
            }
        }

        Ok(envelope)
    }

    /// Strict dispatch: statuses >= 400 become `Error::Api` (classified body)
    /// or `Error::Status` (unclassifiable body). Returns the response body
    /// on success.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request_checked<T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&T>,
        headers: &[(&str, &str)],
    ) -> Result<Bytes>
    where
        T: Serialize + ?Sized,
    {
        let auth = self.ensure_valid_token().await?;

        let body = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::Serialize)?;

        let mut header_map = default_headers(&auth)?;
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        overlay_headers(&mut header_map, headers)?;

        let http = self.http().await;
        let mut builder = http
            .request(method.clone(), format!("{}{path}", auth.instance_url))
            .headers(header_map);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(action = "api_request", success = false, error = %e, "request failed");
            Error::Transport(e)
        })?;
        let status = response.status();
        record_request(&method, status);

        if status.as_u16() >= 400 {
            let body = response.bytes().await.unwrap_or_default();
            let err = match classify(&body) {
                Ok(api_error) => Error::Api {
                    message: api_error.message,
                    code: api_error.error_code,
                },
                Err(_) => Error::Status(status.to_string()),
            };
            warn!(status_code = status.as_u16(), error = %err, "API request rejected");
            return Err(err);
        }

        response.bytes().await.map_err(Error::ReadBody)
    }

    async fn http(&self) -> reqwest::Client {
        self.http.read().await.clone()
    }
}

/// Decode a strict-path body, naming what was being decoded on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| Error::Decode { context, source })
}

fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn default_headers(auth: &Authorization) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut bearer = HeaderValue::from_str(&auth.bearer())
        .map_err(|e| Error::InvalidRequest(format!("invalid access token value: {e}")))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn overlay_headers(headers: &mut HeaderMap, extra: &[(&str, &str)]) -> Result<()> {
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(())
}

fn record_request(method: &Method, status: StatusCode) {
    metrics::counter!(
        "sf_api_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}
