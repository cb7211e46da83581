//! The result of a health check.

use accumulate_ledger_api::PartitionType;
use serde::Serialize;

use crate::error::HealthFailure;
use crate::ledger::LedgerSnapshot;
use crate::partition::Partition;

const HEALTHY_REASON: &str = "All partitions are synchronized and healthy";

/// Outcome of one health check run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthVerdict {
    /// Whether the network is live.
    pub healthy: bool,

    /// The first failing condition, or a success message.
    pub reason: String,

    /// Per-partition summary, filled as far as the run got.
    pub partitions: Vec<PartitionSummary>,
}

impl HealthVerdict {
    /// A healthy verdict.
    #[must_use]
    pub fn healthy(partitions: Vec<PartitionSummary>) -> Self {
        Self {
            healthy: true,
            reason: HEALTHY_REASON.to_string(),
            partitions,
        }
    }

    /// An unhealthy verdict explained by `failure`.
    #[must_use]
    pub fn unhealthy(failure: &HealthFailure, partitions: Vec<PartitionSummary>) -> Self {
        Self {
            healthy: false,
            reason: failure.to_string(),
            partitions,
        }
    }
}

/// Display summary of one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSummary {
    /// Partition ID.
    pub id: String,

    /// Partition type.
    pub kind: PartitionType,

    /// Anchor ledger minor block height, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_known_height: Option<u64>,

    /// Why the partition could not be queried, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Partition> for PartitionSummary {
    fn from(partition: &Partition) -> Self {
        Self {
            id: partition.id().to_string(),
            kind: partition.kind(),
            last_known_height: None,
            error: None,
        }
    }
}

impl From<&LedgerSnapshot> for PartitionSummary {
    fn from(snapshot: &LedgerSnapshot) -> Self {
        Self {
            last_known_height: snapshot.anchor_ledger().map(|ledger| ledger.height()),
            error: snapshot.fetch_error().map(ToString::to_string),
            ..Self::from(snapshot.partition())
        }
    }
}
