//! An implementation of the ledger API which talks JSON-RPC to an Accumulate
//! v3 endpoint.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use accumulate_ledger_api::{LedgerApi, LedgerRecord, NetworkStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

const ACC_SCHEME: &str = "acc://";

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// A JSON-RPC based implementation of the `LedgerApi` trait.
#[derive(Clone, Debug)]
pub struct JsonRpcLedgerApi {
    client: Client,
    endpoint: Url,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcLedgerApi {
    /// Creates a client for the v3 endpoint at `endpoint`, e.g.
    /// `https://mainnet.accumulatenetwork.io/v3`.
    ///
    /// `timeout` bounds every request made through this client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Creates a client for `endpoint` reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, Error>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(%method, id, endpoint = %self.endpoint, "sending rpc request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|source| Error::Request { method, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| Error::Request { method, source })?;

        if !status.is_success() {
            return Err(Error::Status {
                method,
                status,
                body,
            });
        }

        let rpc_response: RpcResponse<R> =
            serde_json::from_str(&body).map_err(|source| Error::Decode { method, source })?;

        if let Some(error) = rpc_response.error {
            return Err(Error::Rpc {
                method,
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or(Error::MissingResult(method))
    }
}

fn scope_url(scope: &str) -> String {
    if scope.starts_with(ACC_SCHEME) {
        scope.to_string()
    } else {
        format!("{ACC_SCHEME}{scope}")
    }
}

#[async_trait]
impl LedgerApi for JsonRpcLedgerApi {
    type Error = Error;

    async fn network_status(&self) -> Result<NetworkStatus, Self::Error> {
        self.call("network-status", json!({})).await
    }

    async fn query(&self, scope: &str) -> Result<LedgerRecord, Self::Error> {
        let params: Value = json!({ "scope": scope_url(scope) });
        self.call("query", params).await
    }
}
