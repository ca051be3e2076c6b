//! In-process mock of the Salesforce login and REST endpoints

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Form;
use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, any, post};
use bytes::Bytes;
use sf_auth::{Credentials, TOKEN_PATH};
use tokio::net::TcpListener;

use crate::client::{ClientOptions, SalesforceClient};

/// Bind a local listener, build the app with its base URL and serve it in
/// the background. Returns the base URL (`http://127.0.0.1:port`).
pub(crate) async fn serve<F>(build: F) -> String
where
    F: FnOnce(String) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = build(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

pub(crate) fn test_credentials(base: &str) -> Credentials {
    Credentials::new("test-client-id", "test-client-secret", "test-refresh-token")
        .with_login_url(format!("{base}{TOKEN_PATH}"))
}

pub(crate) fn test_client(base: &str) -> SalesforceClient {
    SalesforceClient::new(test_credentials(base), ClientOptions::default()).unwrap()
}

/// Token endpoint that counts exchanges and hands out `token-1`, `token-2`, ...
///
/// The instance URL in each answer is the mock server's own base URL, so
/// REST calls land on the same server.
#[derive(Clone, Default)]
pub(crate) struct TokenEndpoint {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    /// Exchanges after this many successes answer `invalid_grant`
    succeed_limit: Option<usize>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
}

impl TokenEndpoint {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing_after(mut self, successes: usize) -> Self {
        self.succeed_limit = Some(successes);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }

    pub(crate) fn router(&self, base: String) -> Router {
        let endpoint = self.clone();
        Router::new().route(
            TOKEN_PATH,
            post(move |Form(form): Form<HashMap<String, String>>| {
                let endpoint = endpoint.clone();
                let base = base.clone();
                async move { endpoint.exchange(form, base).await }
            }),
        )
    }

    async fn exchange(&self, form: HashMap<String, String>, base: String) -> Response {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_refresh_token.lock().unwrap() = form.get("refresh_token").cloned();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.succeed_limit.is_some_and(|limit| n > limit) {
            return (
                StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({
                    "error": "invalid_grant",
                    "error_description": "expired access/refresh token",
                })),
            )
                .into_response();
        }

        axum::Json(serde_json::json!({
            "access_token": format!("token-{n}"),
            "instance_url": base,
            "id": "https://login.salesforce.com/id/00Dxx0000001gPL/005xx000001Sv6e",
            "token_type": "Bearer",
            "issued_at": "1700000000000",
            "signature": "c2lnbmF0dXJl",
        }))
        .into_response()
    }
}

/// A request captured by `Recorder`.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased names, first value only
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// REST route stub that records every request and answers with a canned
/// status and body.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn reply(&self, status: StatusCode, body: serde_json::Value) -> MethodRouter {
        self.reply_raw(status, body.to_string())
    }

    pub(crate) fn reply_raw(&self, status: StatusCode, body: impl Into<String>) -> MethodRouter {
        let recorder = self.clone();
        let body = body.into();
        any(move |request: Request| {
            let recorder = recorder.clone();
            let body = body.clone();
            async move {
                recorder.record(request).await;
                (status, [(CONTENT_TYPE, "application/json")], body)
            }
        })
    }

    async fn record(&self, request: Request) {
        let (parts, body) = request.into_parts();
        // Large enough for a base64-encoded 25 MiB attachment
        let body = axum::body::to_bytes(body, 64 * 1024 * 1024).await.unwrap();
        let mut headers = HashMap::new();
        for name in parts.headers.keys() {
            if let Some(value) = parts.headers.get(name).and_then(|v| v.to_str().ok()) {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers,
            body,
        });
    }
}
