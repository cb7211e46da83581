//! Probe for the API's cross-origin configuration.
//!
//! Browsers reject responses carrying more than one
//! `Access-Control-Allow-Origin` value.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, ORIGIN};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, error_chain};

/// Outcome of a CORS probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsStatus {
    /// Exactly one origin is allowed.
    Configured(String),

    /// The header is absent or empty.
    Missing,

    /// A single header line lists several origins, e.g. `*, *`.
    DuplicateValues(String),

    /// The header appears on more than one line.
    DuplicateHeaders(Vec<String>),

    /// The probe request itself failed.
    RequestFailed(String),
}

impl CorsStatus {
    /// Whether browsers will accept responses from the API.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Classifies the `Access-Control-Allow-Origin` lines of a response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<String> = headers
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();

        match values.as_slice() {
            [] => Self::Missing,
            [value] if value.trim().is_empty() => Self::Missing,
            [value] if value.split(',').count() > 1 => Self::DuplicateValues(value.clone()),
            [value] => Self::Configured(value.clone()),
            _ => Self::DuplicateHeaders(values),
        }
    }
}

impl fmt::Display for CorsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(value) => write!(f, "CORS configured correctly: {value}"),
            Self::Missing => write!(f, "Missing Access-Control-Allow-Origin header"),
            Self::DuplicateValues(value) => write!(
                f,
                "Duplicate CORS header values: '{value}' (browsers only accept one value)"
            ),
            Self::DuplicateHeaders(values) => write!(
                f,
                "Duplicate CORS headers detected: {} (browsers only accept one value)",
                values.join(", ")
            ),
            Self::RequestFailed(message) => write!(f, "CORS check failed: {message}"),
        }
    }
}

/// Issues the CORS probe the way a browser would: a JSON-RPC POST carrying
/// an `Origin` header.
#[derive(Clone, Debug)]
pub struct CorsChecker {
    client: Client,
    origin: String,
}

impl CorsChecker {
    /// Creates a checker sending `origin` with every probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(origin: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self::with_client(client, origin))
    }

    /// Creates a checker reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into(),
        }
    }

    /// Probes `api_url` with a `network-status` call. Never fails; transport
    /// errors are reported as `CorsStatus::RequestFailed`.
    pub async fn check(&self, api_url: &Url) -> CorsStatus {
        let response = self
            .client
            .post(api_url.clone())
            .header(ORIGIN, self.origin.as_str())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "network-status",
                "params": {}
            }))
            .send()
            .await;

        let status = match response {
            Ok(response) => CorsStatus::from_headers(response.headers()),
            Err(error) => CorsStatus::RequestFailed(error_chain(&error)),
        };

        if status.is_ok() {
            debug!(%api_url, %status, "cors probe passed");
        } else {
            warn!(%api_url, %status, "cors probe failed");
        }

        status
    }
}
