//! Uniform result of a lenient dispatch call

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::{DeserializeOwned, IgnoredAny};

/// Status, body and headers of a completed HTTP exchange.
///
/// Built once per response and never mutated. `data` holds the same bytes
/// as `raw` but only when they are valid JSON, so callers must not assume
/// it is populated.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// True for 2xx statuses
    pub success: bool,
    pub code: u16,
    /// Status line, e.g. `401 Unauthorized`
    pub status: String,
    pub raw: Bytes,
    pub data: Option<Bytes>,
    /// First value per header name; later values are dropped
    pub headers: HashMap<String, String>,
}

impl Envelope {
    pub fn new(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let data = is_json(&body).then(|| body.clone());
        let headers = headers
            .keys()
            .filter_map(|name| {
                headers.get(name).map(|value| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
            })
            .collect();

        Self {
            success: status.is_success(),
            code: status.as_u16(),
            status: status.to_string(),
            raw: body,
            data,
            headers,
        }
    }

    /// Body as text, lossily decoded.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }

    /// Parsed JSON body, if the body was JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        self.data
            .as_ref()
            .and_then(|data| serde_json::from_slice(data).ok())
    }

    /// Decode the body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(self.data.as_ref().unwrap_or(&self.raw))
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn is_json(body: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(body).is_ok()
}
