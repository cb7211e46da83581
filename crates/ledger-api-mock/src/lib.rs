//! A mock implementation of the ledger API.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use accumulate_ledger_api::{
    LedgerApi, LedgerRecord, NetworkDefinition, NetworkStatus, PartitionInfo, PartitionType,
};
use async_trait::async_trait;
use parking_lot::Mutex;

mod error;
pub use error::Error;

#[derive(Debug, Default)]
struct MockState {
    network_status: NetworkStatus,
    network_status_error: Option<String>,
    records: HashMap<String, LedgerRecord>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    network_status_calls: usize,
    queried_scopes: Vec<String>,
}

/// A mock implementation of the `LedgerApi` trait. Used for testing.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing the mock to the code under test.
#[derive(Clone, Debug, Default)]
pub struct MockLedgerApi {
    state: Arc<Mutex<MockState>>,
}

impl MockLedgerApi {
    /// Creates a new instance of `MockLedgerApi` with no partitions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose `network-status` reports the given partitions.
    #[must_use]
    pub fn with_partitions(partitions: &[(&str, PartitionType)]) -> Self {
        let mock = Self::new();
        mock.set_network_status(NetworkStatus {
            network: Some(NetworkDefinition {
                network_name: Some("MockNet".to_string()),
                partitions: partitions
                    .iter()
                    .map(|(id, kind)| PartitionInfo {
                        id: (*id).to_string(),
                        kind: *kind,
                    })
                    .collect(),
            }),
        });
        mock
    }

    /// Replaces the `network-status` result.
    pub fn set_network_status(&self, network_status: NetworkStatus) {
        self.state.lock().network_status = network_status;
    }

    /// Makes `network-status` fail with `message`.
    pub fn fail_network_status(&self, message: impl Into<String>) {
        self.state.lock().network_status_error = Some(message.into());
    }

    /// Registers the record returned for `scope`.
    pub fn insert_record(&self, scope: &str, record: LedgerRecord) {
        self.state.lock().records.insert(key(scope), record);
    }

    /// Makes queries for `scope` fail with `message`.
    pub fn fail_scope(&self, scope: &str, message: impl Into<String>) {
        self.state.lock().failures.insert(key(scope), message.into());
    }

    /// Delays queries for `scope` by `delay` before answering.
    pub fn delay_scope(&self, scope: &str, delay: Duration) {
        self.state.lock().delays.insert(key(scope), delay);
    }

    /// Number of `network-status` calls made so far.
    #[must_use]
    pub fn network_status_calls(&self) -> usize {
        self.state.lock().network_status_calls
    }

    /// Number of `query` calls made so far.
    #[must_use]
    pub fn query_calls(&self) -> usize {
        self.state.lock().queried_scopes.len()
    }

    /// Scopes queried so far, in call order.
    #[must_use]
    pub fn queried_scopes(&self) -> Vec<String> {
        self.state.lock().queried_scopes.clone()
    }
}

fn key(scope: &str) -> String {
    scope.to_ascii_lowercase()
}

#[async_trait]
impl LedgerApi for MockLedgerApi {
    type Error = Error;

    async fn network_status(&self) -> Result<NetworkStatus, Self::Error> {
        let mut state = self.state.lock();
        state.network_status_calls += 1;

        match &state.network_status_error {
            Some(message) => Err(Error::Injected(message.clone())),
            None => Ok(state.network_status.clone()),
        }
    }

    async fn query(&self, scope: &str) -> Result<LedgerRecord, Self::Error> {
        let key = key(scope);

        let (delay, outcome) = {
            let mut state = self.state.lock();
            state.queried_scopes.push(scope.to_string());

            let outcome = state.failures.get(&key).map_or_else(
                || {
                    state
                        .records
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| Error::NotFound(scope.to_string()))
                },
                |message| Err(Error::Injected(message.clone())),
            );

            (state.delays.get(&key).copied(), outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        outcome
    }
}
