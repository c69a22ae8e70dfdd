//! Single-request JSON fetcher.
//!
//! Uses the curl crate (libcurl) to POST to the registry endpoint and decode
//! the body as JSON. Every failure is returned as a typed `FetchError` so the
//! caller can tell transport, HTTP status, decode and empty-body failures apart.

mod classify;

pub use classify::{classify_curl_error, FailureKind};

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Error returned by a single fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// URL was empty or not parseable; no request was made.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Response body was empty or whitespace only.
    #[error("empty response body")]
    EmptyBody,
    /// Response body was not valid JSON.
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Coarse failure class for the run summary.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::InvalidUrl { .. } => FailureKind::Other,
            FetchError::Transport(e) => classify_curl_error(e),
            FetchError::Http(_) => FailureKind::Http,
            FetchError::EmptyBody => FailureKind::Empty,
            FetchError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Source of JSON documents. The lister, normalizer and pipeline only depend
/// on this trait; `CurlFetcher` is the network implementation.
pub trait JsonSource {
    fn fetch_json(&self, url: &str, headers: &HashMap<String, String>)
        -> Result<Value, FetchError>;
}

/// Per-request timeouts.
#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

impl CurlFetcher {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
        }
    }

    pub fn from_config(cfg: &crate::config::EngdirConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    /// POST with an empty body and return the raw response body.
    fn post(&self, url: &str, headers: &HashMap<String, String>) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.post(true)?;
        easy.post_fields_copy(b"")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.accept_encoding("")?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        // Build curl list for custom headers (e.g. "Name: value").
        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !headers.is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}

impl JsonSource for CurlFetcher {
    fn fetch_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Value, FetchError> {
        let res = validate_url(url)
            .and_then(|()| self.post(url, headers))
            .and_then(|body| decode_body(&body));
        if let Err(e) = &res {
            tracing::warn!(url, kind = ?e.kind(), "fetch failed: {}", e);
        }
        res
    }
}

fn validate_url(url: &str) -> Result<(), FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "empty".to_string(),
        });
    }
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// Decode a response body as JSON. A UTF-8 BOM is tolerated.
pub fn decode_body(body: &[u8]) -> Result<Value, FetchError> {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::EmptyBody);
    }
    Ok(serde_json::from_slice(body)?)
}
