//! Verifies every partition produced a block recently.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::HealthFailure;
use crate::ledger::LedgerSnapshot;

/// Checks that every partition's last block is at most `window` old.
///
/// A partition without a last block time passes unless
/// `require_block_time` is set. Block times in the future count as fresh.
///
/// # Errors
///
/// Returns the first stale partition, in snapshot order.
pub fn check_freshness(
    snapshots: &[LedgerSnapshot],
    now: DateTime<Utc>,
    window: Duration,
    require_block_time: bool,
) -> Result<(), HealthFailure> {
    for snapshot in snapshots {
        let Some(last_block_time) = snapshot.last_block_time() else {
            if require_block_time {
                return Err(HealthFailure::MissingBlockTime(
                    snapshot.partition().clone(),
                ));
            }
            continue;
        };

        // Negative ages fail the conversion.
        let Ok(age) = (now - last_block_time).to_std() else {
            continue;
        };

        if age > window {
            return Err(HealthFailure::Stale {
                partition: snapshot.partition().clone(),
                age_secs: rounded_secs(age),
            });
        }
    }

    Ok(())
}

fn rounded_secs(age: Duration) -> u64 {
    u64::try_from((age.as_millis() + 500) / 1000).unwrap_or(u64::MAX)
}
