//! Abstract interface for querying Accumulate partition ledgers.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod types;

pub use types::*;

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;

/// Marker trait for ledger API errors.
pub trait LedgerApiError: Error + Send + Sync + 'static {}

/// A trait representing the subset of the Accumulate v3 query API needed to
/// inspect partition ledgers.
#[async_trait]
pub trait LedgerApi
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for the ledger API.
    type Error: LedgerApiError;

    /// Fetches the network status, including the partition list.
    async fn network_status(&self) -> Result<NetworkStatus, Self::Error>;

    /// Queries the account record at `scope`, e.g. `dn.acme/anchors`.
    async fn query(&self, scope: &str) -> Result<LedgerRecord, Self::Error>;
}
