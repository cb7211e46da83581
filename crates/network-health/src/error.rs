//! Error types for network health checks.

use std::time::Duration;

use thiserror::Error;

use crate::cors::CorsStatus;
use crate::partition::Partition;

/// Errors raised while setting up a health checker.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to build the HTTP client used for the CORS probe.
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why a single partition ledger query failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The API returned an error.
    #[error("{scope}: {message}")]
    Query {
        /// Scope that was queried.
        scope: String,
        /// Rendered error chain.
        message: String,
    },

    /// The query did not complete in time.
    #[error("{scope}: timed out after {timeout:?}")]
    Timeout {
        /// Scope that was queried.
        scope: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

/// The first condition that made a network unhealthy.
///
/// The `Display` output is the human readable verdict reason.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HealthFailure {
    /// The API is not usable from a browser.
    #[error("CORS configuration error: {0}")]
    Cors(CorsStatus),

    /// `network-status` reported no partitions.
    #[error("No partitions found in network")]
    NoPartitions,

    /// `network-status` did not report exactly one directory partition.
    #[error("Health check failed: expected exactly one directory partition, found {0}")]
    DirectoryCount(usize),

    /// One or more partitions could not be queried.
    #[error(
        "Failed to query {} partition(s): {}",
        .0.len(),
        .0.iter().map(Partition::normalized_url).collect::<Vec<_>>().join(", ")
    )]
    Query(Vec<Partition>),

    /// A partition has not produced a block within the freshness window.
    #[error("Partition {partition} data is stale ({age_secs}s old)")]
    Stale {
        /// The stale partition.
        partition: Partition,
        /// Age of its last block, rounded to seconds.
        age_secs: u64,
    },

    /// A partition reported no block time while one was required.
    #[error("Partition {0} reported no last block time")]
    MissingBlockTime(Partition),

    /// A partition has not recorded enough anchors from another.
    #[error("Anchor lag detected: {ahead} is {lag} blocks ahead of {behind}")]
    AnchorLag {
        /// Partition whose anchors are missing downstream.
        ahead: Partition,
        /// Partition that is behind.
        behind: Partition,
        /// Number of blocks not yet delivered.
        lag: u64,
    },

    /// Only one side of a partition pair recorded synthetic traffic.
    #[error("Synthetic message asymmetry between {a} and {b}")]
    SyntheticAsymmetry {
        /// First partition of the pair.
        a: Partition,
        /// Second partition of the pair.
        b: Partition,
    },

    /// Too many synthetic messages are produced but not delivered.
    #[error("Synthetic lag detected: {lag} messages from {from} to {to}")]
    SyntheticLag {
        /// Producing partition.
        from: Partition,
        /// Receiving partition.
        to: Partition,
        /// Number of messages not yet delivered.
        lag: u64,
    },

    /// Any other failure, such as an unreachable `network-status`.
    #[error("Health check failed: {0}")]
    Internal(String),
}

/// Renders an error together with its sources, skipping causes that are
/// already part of the message.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use accumulate_ledger_api::PartitionType;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("connection refused")]
    struct Inner;

    #[test]
    fn test_error_chain_includes_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: connection refused");
    }

    #[test]
    fn test_query_failure_lists_urls() {
        let failure = HealthFailure::Query(vec![
            Partition::new("BVN0", PartitionType::BlockValidator),
            Partition::new("BVN1", PartitionType::BlockValidator),
        ]);

        assert_eq!(
            failure.to_string(),
            "Failed to query 2 partition(s): bvn-bvn0.acme, bvn-bvn1.acme"
        );
    }
}
