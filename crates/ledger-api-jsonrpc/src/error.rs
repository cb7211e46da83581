use accumulate_ledger_api::LedgerApiError;
use reqwest::StatusCode;
use thiserror::Error;

/// Error type for the JSON-RPC ledger API.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to build the HTTP client.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The HTTP request failed (connection refused, timeout, TLS...).
    #[error("request to {method} failed: {source}")]
    Request {
        /// JSON-RPC method being called.
        method: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{method} returned status {status}: {body}")]
    Status {
        /// JSON-RPC method being called.
        method: &'static str,
        /// HTTP status code.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not a valid JSON-RPC response.
    #[error("failed to decode {method} response: {source}")]
    Decode {
        /// JSON-RPC method being called.
        method: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The server returned a JSON-RPC error object.
    #[error("{method} failed with rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC method being called.
        method: &'static str,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The response carried neither a result nor an error.
    #[error("{0} response is missing a result")]
    MissingResult(&'static str),
}

impl LedgerApiError for Error {}
