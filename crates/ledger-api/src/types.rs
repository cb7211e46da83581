//! Wire types returned by the ledger API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of the `network-status` call.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// The network definition, if the node reported one.
    #[serde(default)]
    pub network: Option<NetworkDefinition>,
}

impl NetworkStatus {
    /// Returns the reported partitions, or an empty slice if no network
    /// definition was present.
    #[must_use]
    pub fn partitions(&self) -> &[PartitionInfo] {
        self.network
            .as_ref()
            .map_or(&[], |network| network.partitions.as_slice())
    }
}

/// Definition of the network and its partitions.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDefinition {
    /// Human readable network name.
    #[serde(default)]
    pub network_name: Option<String>,

    /// Partitions making up the network.
    #[serde(default)]
    pub partitions: Vec<PartitionInfo>,
}

/// A partition as reported by `network-status`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Partition ID, e.g. `Directory` or `BVN0`.
    pub id: String,

    /// Partition type.
    #[serde(rename = "type")]
    pub kind: PartitionType,
}

/// Type of a partition.
///
/// Only the directory is singled out; every other reported type is treated
/// as a block validator.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum PartitionType {
    /// The directory network.
    Directory,

    /// A block validator network.
    BlockValidator,
}

impl From<String> for PartitionType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("directory") {
            Self::Directory
        } else {
            Self::BlockValidator
        }
    }
}

/// An account record returned by `query`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    /// The ledger account.
    #[serde(default)]
    pub account: Option<LedgerAccount>,

    /// Time of the most recent block that touched the ledger.
    #[serde(default)]
    pub last_block_time: Option<DateTime<Utc>>,
}

/// Anchor or synthetic ledger account state.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAccount {
    /// Account URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Number of minor blocks anchored. Only present on anchor ledgers.
    #[serde(default)]
    pub minor_block_sequence_number: Option<u64>,

    /// Per-counterpart delivery state.
    #[serde(default)]
    pub sequence: Option<Vec<SequenceEntry>>,
}

/// One row of a ledger's sequence list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SequenceEntry {
    /// URL of the counterpart partition this entry tracks.
    #[serde(rename = "url", default)]
    pub counterpart_url: String,

    /// Items sent to the counterpart.
    #[serde(default)]
    pub produced: u64,

    /// Items received from the counterpart.
    #[serde(default)]
    pub received: u64,

    /// Items received from the counterpart and executed.
    #[serde(default)]
    pub delivered: u64,
}

impl SequenceEntry {
    /// Creates an entry for `counterpart_url` with all counters at zero.
    pub fn new(counterpart_url: impl Into<String>) -> Self {
        Self {
            counterpart_url: counterpart_url.into(),
            ..Self::default()
        }
    }

    /// Sets the produced counter.
    #[must_use]
    pub const fn with_produced(mut self, produced: u64) -> Self {
        self.produced = produced;
        self
    }

    /// Sets the delivered counter.
    #[must_use]
    pub const fn with_delivered(mut self, delivered: u64) -> Self {
        self.delivered = delivered;
        self
    }
}
