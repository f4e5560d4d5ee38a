//! The 3Play Media client and its request executor.
//!
//! Every API call goes through [`ThreePlay::execute`], which builds the URL,
//! injects the API key, sends the request, and normalizes the service's
//! `{ "data": ... }` envelope. Transport failures (connection errors,
//! timeouts, non-2xx statuses) are reported before any body parsing happens,
//! so callers can always tell "the network broke" apart from "the service
//! sent something unexpected".

use std::path::PathBuf;

use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Production API server.
const DEFAULT_BASE_URL: &str = "https://api.3playmedia.com/v3";

/// Directory generated transcript files land in unless overridden.
const DEFAULT_CACHE_DIR: &str = ".cache";

/// The `{ "data": ... }` wrapper every successful response body uses.
///
/// The shape of `data` depends on the endpoint; call sites pick the `T` they
/// expect (a typed struct, a `Vec`, or a raw [`serde_json::Value`]).
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Endpoint-specific payload
    pub data: T,
    /// Pagination and bookkeeping the service sometimes attaches
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Async client for the 3Play Media v3 API.
///
/// Holds the API key for its whole lifetime; the key is injected into every
/// request and never logged. The client keeps no other state between calls,
/// so sharing one instance across tasks is as safe as sharing the underlying
/// `reqwest::Client`.
#[derive(Clone)]
pub struct ThreePlay {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) cache_dir: PathBuf,
}

impl ThreePlay {
    /// Creates a client talking to the production API server.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

    /// Points the client at a different API server (e.g. a staging host).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Changes where [`generate_transcript`](Self::generate_transcript)
    /// writes its output files.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Issues a GET request and parses the response envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.execute(Method::GET, endpoint, params, None).await
    }

    /// Issues a POST request, optionally carrying a multipart form body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        form: Option<Form>,
    ) -> Result<T> {
        self.execute(Method::POST, endpoint, params, form).await
    }

    /// Builds and sends one API request.
    ///
    /// The API key is always the first query parameter and its key is
    /// reserved: any caller-supplied `api_key` pair is dropped, so the
    /// credential can never be overridden per call.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        form: Option<Form>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        query.push(("api_key", self.api_key.as_str()));
        query.extend(
            params
                .iter()
                .filter(|(key, _)| *key != "api_key")
                .map(|(key, value)| (*key, value.as_str())),
        );

        tracing::debug!("3Play request: {method} {endpoint}");

        let mut request = self.http.request(method.clone(), &url).query(&query);
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_connect() {
                "Failed to connect to the 3Play Media API server. Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "Request to 3Play Media timed out. The API server is not responding.".to_string()
            } else {
                format!("3Play Media network error: {e}")
            };
            Error::Transport(message)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("3Play request failed: {method} {endpoint} -> {status}");
            return Err(Error::Transport(format_status_error(
                status.as_u16(),
                &error_body,
            )));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::debug!("3Play response from {endpoint} did not parse: {e}");
            Error::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl std::fmt::Debug for ThreePlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreePlay")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

/// Formats HTTP error statuses into human-readable messages.
fn format_status_error(status: u16, error_body: &str) -> String {
    match status {
        401 => "3Play Media API key is invalid or expired. Check the configured key.".to_string(),
        403 => "You don't have permission to use this 3Play Media project. Check your API key and account status.".to_string(),
        429 => "Too many requests to 3Play Media. You've hit the API rate limit. Please wait and try again.".to_string(),
        500 | 502 | 503 | 504 => "The 3Play Media API server is experiencing issues. Please try again later.".to_string(),
        _ => format!("3Play Media API error (status {status}): {error_body}"),
    }
}
