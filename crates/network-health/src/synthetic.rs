//! Synthetic message synchronization between partitions.

use tracing::debug;

use crate::error::HealthFailure;
use crate::ledger::LedgerSnapshot;
use crate::partition::PartitionMatch;

/// Checks that synthetic messages between every pair of partitions are
/// recorded on both sides and delivered within `ok_threshold` messages.
///
/// For each ordered pair `(a, b)`, `a`'s entry for `b` and `b`'s entry for
/// `a` are looked up. Neither present means the pair has not exchanged
/// messages yet. Only one present is an asymmetry. Both present compares
/// what `a` produced for `b` with what `b` delivered from `a`.
///
/// # Errors
///
/// Returns the first asymmetric pair or the first pair whose lag exceeds
/// `ok_threshold`.
pub fn check_synthetic_sync(
    snapshots: &[LedgerSnapshot],
    ok_threshold: u64,
    partition_match: PartitionMatch,
) -> Result<(), HealthFailure> {
    for a in snapshots {
        for b in snapshots {
            let (Some(a_sequence), Some(b_sequence)) = (a.synthetic_sequence(), b.synthetic_sequence())
            else {
                continue;
            };

            let ab = partition_match.find(a_sequence, b.partition());
            let ba = partition_match.find(b_sequence, a.partition());

            let (ab, ba) = match (ab, ba) {
                (None, None) => continue,
                (Some(ab), Some(ba)) => (ab, ba),
                _ => {
                    return Err(HealthFailure::SyntheticAsymmetry {
                        a: a.partition().clone(),
                        b: b.partition().clone(),
                    });
                }
            };

            let lag = ab.produced.saturating_sub(ba.delivered);

            debug!(
                from = %a.partition(),
                to = %b.partition(),
                produced = ab.produced,
                received = ba.received,
                delivered = ba.delivered,
                lag,
                "synthetic lag"
            );

            if lag > ok_threshold {
                return Err(HealthFailure::SyntheticLag {
                    from: a.partition().clone(),
                    to: b.partition().clone(),
                    lag,
                });
            }
        }
    }

    Ok(())
}
