//! Health check configuration.

use std::time::Duration;

use crate::partition::PartitionMatch;

/// Default number of blocks or messages a partition may lag behind.
pub const DEFAULT_OK_THRESHOLD: u64 = 10;

/// Default maximum age of a partition's last block.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60);

/// Default timeout for every remote call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `Origin` sent with the CORS probe.
pub const DEFAULT_ORIGIN: &str = "https://explorer.accumulatenetwork.io";

/// Configuration for the health checker
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// Largest anchor or synthetic lag still considered healthy
    pub ok_threshold: u64,

    /// Maximum age of a partition's last block
    pub freshness_window: Duration,

    /// Timeout for the CORS probe, `network-status` and each ledger query
    pub request_timeout: Duration,

    /// Treat a partition without a last block time as stale
    pub require_block_time: bool,

    /// How sequence entries are correlated with partitions
    pub partition_match: PartitionMatch,

    /// `Origin` header sent with the CORS probe
    pub origin: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            ok_threshold: DEFAULT_OK_THRESHOLD,
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            require_block_time: false,
            partition_match: PartitionMatch::default(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}
