//! OAuth refresh-token exchange
//!
//! POSTs the connected-app credentials to the login URL and turns the answer
//! into a `SessionToken`. Salesforce does not report a lifetime for tokens
//! minted this way, so the expiry is computed locally from `TOKEN_LIFETIME`.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::constants::TOKEN_LIFETIME;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::secret::Secret;

/// Successful answer from the token endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Base URL of the org instance that issued the token
    pub instance_url: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub issued_at: String,
    #[serde(default)]
    pub signature: String,
}

/// OAuth error document returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Bearer token together with the instance it is valid for.
///
/// The two always come from the same token response and are replaced as a
/// pair.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: Secret<String>,
    pub instance_url: String,
    pub expires_at: Instant,
}

impl SessionToken {
    /// Time left before the token is considered expired.
    pub fn remaining(&self) -> std::time::Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Exchange the refresh token for a new access token.
pub async fn authenticate(client: &reqwest::Client, credentials: &Credentials) -> Result<SessionToken> {
    let response = client
        .post(&credentials.login_url)
        .form(&[
            ("grant_type", credentials.grant_type.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose().as_str()),
            ("refresh_token", credentials.refresh_token.expose().as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            error!(action = "authentication", success = false, url = %credentials.login_url, error = %e, "authentication request failed");
            Error::Transport(e.to_string())
        })?;

    let status = response.status();
    let body = response.bytes().await.map_err(|e| {
        error!(action = "authentication", success = false, status = %status, error = %e, "failed to read authentication response body");
        Error::Transport(format!("failed to read auth response: {e}"))
    })?;

    if !status.is_success() {
        if let Ok(auth_error) = serde_json::from_slice::<AuthErrorBody>(&body) {
            if !auth_error.error.is_empty() {
                error!(
                    action = "authentication",
                    success = false,
                    status_code = status.as_u16(),
                    error = %auth_error.error,
                    description = %auth_error.error_description,
                    "authentication rejected by provider"
                );
                return Err(Error::Rejected {
                    error: auth_error.error,
                    description: auth_error.error_description,
                });
            }
        }
        error!(
            action = "authentication",
            success = false,
            status_code = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "authentication failed with non-OAuth error body"
        );
        return Err(Error::RejectedStatus(status.to_string()));
    }

    let auth: AuthResponse = serde_json::from_slice(&body).map_err(|e| {
        error!(action = "authentication", success = false, status_code = status.as_u16(), error = %e, "failed to decode authentication response");
        Error::Malformed(e.to_string())
    })?;
    if auth.access_token.is_empty() {
        return Err(Error::Malformed("access_token is empty".into()));
    }

    let token = SessionToken {
        access_token: Secret::new(auth.access_token),
        instance_url: auth.instance_url,
        expires_at: Instant::now() + TOKEN_LIFETIME,
    };
    info!(
        instance_url = %token.instance_url,
        lifetime_secs = TOKEN_LIFETIME.as_secs(),
        "token refreshed successfully"
    );
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{REFRESH_MARGIN, TOKEN_PATH};
    use axum::Form;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    /// Serve a single token endpoint answering with `status` and `body`,
    /// returning its full URL.
    async fn start_token_server(status: StatusCode, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}{TOKEN_PATH}", listener.local_addr().unwrap());
        let app = axum::Router::new().route(
            TOKEN_PATH,
            post(move || async move {
                (status, [("content-type", "application/json")], body).into_response()
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        url
    }

    fn creds(login_url: &str) -> Credentials {
        Credentials::new("client-id", "client-secret", "refresh-123").with_login_url(login_url)
    }

    #[test]
    fn auth_response_tolerates_missing_optional_fields() {
        let json = r#"{"access_token":"00Dxx!AQ","instance_url":"https://acme.my.salesforce.com"}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.access_token, "00Dxx!AQ");
        assert_eq!(auth.instance_url, "https://acme.my.salesforce.com");
        assert!(auth.token_type.is_empty());
    }

    #[tokio::test]
    async fn sends_form_fields_and_returns_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}{TOKEN_PATH}", listener.local_addr().unwrap());
        let app = axum::Router::new().route(
            TOKEN_PATH,
            post(|Form(form): Form<HashMap<String, String>>| async move {
                // Echo the submitted grant back through the token so the test can see it
                let token = format!(
                    "{}|{}|{}|{}",
                    form["grant_type"], form["client_id"], form["client_secret"], form["refresh_token"]
                );
                axum::Json(serde_json::json!({
                    "access_token": token,
                    "instance_url": "https://acme.my.salesforce.com",
                    "token_type": "Bearer",
                    "issued_at": "1700000000000",
                }))
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let token = authenticate(&reqwest::Client::new(), &creds(&url))
            .await
            .unwrap();
        assert_eq!(
            token.access_token.expose(),
            "refresh_token|client-id|client-secret|refresh-123"
        );
        assert_eq!(token.instance_url, "https://acme.my.salesforce.com");
        assert!(token.remaining() > TOKEN_LIFETIME - REFRESH_MARGIN);
        assert!(token.remaining() <= TOKEN_LIFETIME);
    }

    #[tokio::test]
    async fn oauth_error_document_is_rejected_with_details() {
        let url = start_token_server(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"expired access/refresh token"}"#,
        )
        .await;

        let err = authenticate(&reqwest::Client::new(), &creds(&url))
            .await
            .unwrap_err();
        match err {
            Error::Rejected { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "expired access/refresh token");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_reports_status_line() {
        let url = start_token_server(StatusCode::SERVICE_UNAVAILABLE, "<html>maintenance</html>").await;

        let err = authenticate(&reqwest::Client::new(), &creds(&url))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RejectedStatus(_)));
        assert_eq!(
            err.to_string(),
            "auth failed with status: 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn empty_error_field_falls_back_to_status() {
        let url = start_token_server(StatusCode::UNAUTHORIZED, r#"{"error":""}"#).await;

        let err = authenticate(&reqwest::Client::new(), &creds(&url))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RejectedStatus(_)));
    }

    #[tokio::test]
    async fn success_with_unexpected_body_is_malformed() {
        let url = start_token_server(StatusCode::OK, r#"{"unexpected":"shape"}"#).await;

        let err = authenticate(&reqwest::Client::new(), &creds(&url))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Malformed(_)), "got {err:?}");
        assert!(err.to_string().contains("failed to decode auth response"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Bind then drop a listener so the port is very likely closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = authenticate(
            &reqwest::Client::new(),
            &creds(&format!("http://{addr}{TOKEN_PATH}")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }
}
