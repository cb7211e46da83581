//! Anchor synchronization between the directory and block validators.

use tracing::debug;

use crate::error::HealthFailure;
use crate::ledger::LedgerSnapshot;
use crate::partition::PartitionMatch;

/// Checks that every partition has recorded the other side's anchors within
/// `ok_threshold` blocks.
///
/// Every ordered pair `(a, b)` involving the directory is checked: `a`'s
/// minor block height is compared with what `b`'s anchor ledger records as
/// delivered from `a`. Pairs where `b` has no sequence, or no entry for `a`,
/// are skipped. Block validators are not compared with each other since
/// anchors only flow through the directory.
///
/// # Errors
///
/// Returns the first pair whose lag exceeds `ok_threshold`.
pub fn check_anchor_sync(
    snapshots: &[LedgerSnapshot],
    ok_threshold: u64,
    partition_match: PartitionMatch,
) -> Result<(), HealthFailure> {
    for a in snapshots {
        for b in snapshots {
            if !a.partition().is_directory() && !b.partition().is_directory() {
                continue;
            }

            let Some(entry) = partition_match.find(b.anchor_sequence(), a.partition()) else {
                continue;
            };

            let height = a.anchor_ledger().map_or(0, |ledger| ledger.height());
            let lag = height.saturating_sub(entry.delivered);

            debug!(
                from = %a.partition(),
                to = %b.partition(),
                height,
                delivered = entry.delivered,
                lag,
                "anchor lag"
            );

            if lag > ok_threshold {
                return Err(HealthFailure::AnchorLag {
                    ahead: a.partition().clone(),
                    behind: b.partition().clone(),
                    lag,
                });
            }
        }
    }

    Ok(())
}
