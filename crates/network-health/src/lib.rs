//! Liveness checks for a multi-partition Accumulate network.
//!
//! A run verifies, in order:
//! - the API answers browser requests with a single CORS origin
//! - every partition's anchor and synthetic ledgers can be queried
//! - every partition produced a block recently
//! - anchors flow between the directory and each block validator
//! - synthetic messages between partitions are delivered and symmetric
//!
//! The first failing check determines the verdict.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod anchor;
pub mod checker;
pub mod config;
pub mod cors;
pub mod error;
pub mod freshness;
pub mod ledger;
pub mod partition;
pub mod synthetic;
pub mod verdict;

pub use checker::{HealthChecker, HealthStage};
pub use config::HealthConfig;
pub use cors::{CorsChecker, CorsStatus};
pub use error::{Error, FetchError, HealthFailure};
pub use ledger::{AnchorLedger, LedgerSnapshot, SyntheticLedger};
pub use partition::{Partition, PartitionMatch};
pub use verdict::{HealthVerdict, PartitionSummary};
