//! Per-partition ledger snapshots and the concurrent fetcher that builds them.

use std::time::Duration;

use accumulate_ledger_api::{LedgerApi, LedgerRecord, SequenceEntry};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{FetchError, error_chain};
use crate::partition::Partition;

/// Anchor ledger state of a partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnchorLedger {
    /// Number of minor blocks anchored.
    pub minor_block_sequence_number: Option<u64>,

    /// Anchor delivery state per counterpart.
    pub sequence: Option<Vec<SequenceEntry>>,
}

impl AnchorLedger {
    /// Minor block height, or 0 if the ledger did not report one.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.minor_block_sequence_number.unwrap_or(0)
    }
}

/// Synthetic ledger state of a partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyntheticLedger {
    /// Synthetic message production and delivery per counterpart.
    pub sequence: Option<Vec<SequenceEntry>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SnapshotState {
    Fetched {
        anchor_ledger: Option<AnchorLedger>,
        synthetic_ledger: Option<SyntheticLedger>,
        last_block_time: Option<DateTime<Utc>>,
    },
    Failed(FetchError),
}

/// Ledger state of one partition at the time of the check.
///
/// A snapshot either holds ledgers or a fetch error, never both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    partition: Partition,
    state: SnapshotState,
}

impl LedgerSnapshot {
    /// Creates a snapshot of a partition whose ledgers were fetched.
    #[must_use]
    pub const fn new(
        partition: Partition,
        anchor_ledger: Option<AnchorLedger>,
        synthetic_ledger: Option<SyntheticLedger>,
        last_block_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            partition,
            state: SnapshotState::Fetched {
                anchor_ledger,
                synthetic_ledger,
                last_block_time,
            },
        }
    }

    /// Creates a snapshot from the anchor and synthetic query results.
    ///
    /// The last block time is the anchor record's if present, else the
    /// synthetic record's.
    #[must_use]
    pub fn from_records(partition: Partition, anchors: LedgerRecord, synthetic: LedgerRecord) -> Self {
        let last_block_time = anchors.last_block_time.or(synthetic.last_block_time);

        let anchor_ledger = anchors.account.map(|account| AnchorLedger {
            minor_block_sequence_number: account.minor_block_sequence_number,
            sequence: account.sequence,
        });

        let synthetic_ledger = synthetic.account.map(|account| SyntheticLedger {
            sequence: account.sequence,
        });

        Self::new(partition, anchor_ledger, synthetic_ledger, last_block_time)
    }

    /// Creates a snapshot of a partition that could not be queried.
    #[must_use]
    pub const fn failed(partition: Partition, error: FetchError) -> Self {
        Self {
            partition,
            state: SnapshotState::Failed(error),
        }
    }

    /// The partition this snapshot belongs to.
    #[must_use]
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Anchor ledger, if fetched and present.
    #[must_use]
    pub const fn anchor_ledger(&self) -> Option<&AnchorLedger> {
        match &self.state {
            SnapshotState::Fetched { anchor_ledger, .. } => anchor_ledger.as_ref(),
            SnapshotState::Failed(_) => None,
        }
    }

    /// Synthetic ledger, if fetched and present.
    #[must_use]
    pub const fn synthetic_ledger(&self) -> Option<&SyntheticLedger> {
        match &self.state {
            SnapshotState::Fetched {
                synthetic_ledger, ..
            } => synthetic_ledger.as_ref(),
            SnapshotState::Failed(_) => None,
        }
    }

    /// Most recent block time reported by either ledger.
    #[must_use]
    pub const fn last_block_time(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            SnapshotState::Fetched {
                last_block_time, ..
            } => *last_block_time,
            SnapshotState::Failed(_) => None,
        }
    }

    /// The fetch error, if the partition could not be queried.
    #[must_use]
    pub const fn fetch_error(&self) -> Option<&FetchError> {
        match &self.state {
            SnapshotState::Fetched { .. } => None,
            SnapshotState::Failed(error) => Some(error),
        }
    }

    /// Anchor sequence entries, empty if absent.
    pub(crate) fn anchor_sequence(&self) -> &[SequenceEntry] {
        self.anchor_ledger()
            .and_then(|ledger| ledger.sequence.as_deref())
            .unwrap_or_default()
    }

    /// Synthetic sequence entries, `None` if the ledger or its sequence is
    /// absent.
    pub(crate) fn synthetic_sequence(&self) -> Option<&[SequenceEntry]> {
        self.synthetic_ledger()
            .and_then(|ledger| ledger.sequence.as_deref())
    }
}

/// Fetches the anchor and synthetic ledgers of every partition.
///
/// All partitions are queried concurrently, and both ledgers of a partition
/// are queried concurrently. Each query is bounded by `timeout`. A failing
/// partition is recorded on its snapshot without affecting the others.
/// Snapshots are returned in partition order.
pub async fn fetch_ledgers<A>(
    api: &A,
    partitions: &[Partition],
    timeout: Duration,
) -> Vec<LedgerSnapshot>
where
    A: LedgerApi,
{
    join_all(
        partitions
            .iter()
            .map(|partition| fetch_partition(api, partition, timeout)),
    )
    .await
}

async fn fetch_partition<A>(api: &A, partition: &Partition, timeout: Duration) -> LedgerSnapshot
where
    A: LedgerApi,
{
    let anchors = query(api, partition.anchors_scope(), timeout);
    let synthetic = query(api, partition.synthetic_scope(), timeout);

    match tokio::try_join!(anchors, synthetic) {
        Ok((anchors, synthetic)) => {
            debug!(
                partition = %partition,
                anchor_account = account_url(&anchors),
                synthetic_account = account_url(&synthetic),
                "fetched ledgers"
            );
            LedgerSnapshot::from_records(partition.clone(), anchors, synthetic)
        }
        Err(error) => {
            warn!(partition = %partition, %error, "failed to fetch ledgers");
            LedgerSnapshot::failed(partition.clone(), error)
        }
    }
}

fn account_url(record: &LedgerRecord) -> &str {
    record
        .account
        .as_ref()
        .and_then(|account| account.url.as_deref())
        .unwrap_or("-")
}

async fn query<A>(api: &A, scope: String, timeout: Duration) -> Result<LedgerRecord, FetchError>
where
    A: LedgerApi,
{
    match tokio::time::timeout(timeout, api.query(&scope)).await {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(error)) => Err(FetchError::Query {
            message: error_chain(&error),
            scope,
        }),
        Err(_) => Err(FetchError::Timeout { scope, timeout }),
    }
}
