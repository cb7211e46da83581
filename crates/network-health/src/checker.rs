//! Orchestrates the individual checks into a single verdict.

use accumulate_ledger_api::LedgerApi;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::anchor::check_anchor_sync;
use crate::config::HealthConfig;
use crate::cors::CorsChecker;
use crate::error::{Error, HealthFailure, error_chain};
use crate::freshness::check_freshness;
use crate::ledger::fetch_ledgers;
use crate::partition::{Partition, resolve_partitions};
use crate::synthetic::check_synthetic_sync;
use crate::verdict::{HealthVerdict, PartitionSummary};

/// Progress of a health check run.
///
/// Stages advance strictly in declaration order; a failure ends the run at
/// the stage it was reached in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStage {
    /// Nothing checked yet.
    #[default]
    Init,
    /// The CORS probe passed.
    CorsChecked,
    /// The partition list was resolved.
    PartitionsResolved,
    /// Every partition's ledgers were fetched.
    LedgersFetched,
    /// Every partition produced a recent block.
    FreshnessChecked,
    /// Anchors are synchronized.
    AnchorsChecked,
    /// Synthetic messages are synchronized.
    SyntheticChecked,
    /// The verdict is final.
    Done,
}

#[derive(Default)]
struct Progress {
    stage: HealthStage,
    partitions: Vec<PartitionSummary>,
}

impl Progress {
    fn advance(&mut self, stage: HealthStage) {
        debug!(from = ?self.stage, to = ?stage, "health check advanced");
        self.stage = stage;
    }
}

/// Checks whether a network is live.
///
/// Holds no state between runs; concurrent runs on clones or on the same
/// checker are independent.
#[derive(Clone, Debug)]
pub struct HealthChecker<A>
where
    A: LedgerApi,
{
    api: A,
    cors: CorsChecker,
    config: HealthConfig,
}

impl<A> HealthChecker<A>
where
    A: LedgerApi,
{
    /// Creates a checker querying ledgers through `api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the CORS probe cannot be built.
    pub fn new(api: A, config: HealthConfig) -> Result<Self, Error> {
        let cors = CorsChecker::new(config.origin.clone(), config.request_timeout)?;

        Ok(Self::with_cors_checker(api, cors, config))
    }

    /// Creates a checker with a preconfigured CORS checker.
    #[must_use]
    pub const fn with_cors_checker(api: A, cors: CorsChecker, config: HealthConfig) -> Self {
        Self { api, cors, config }
    }

    /// The ledger API queries are sent through.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Checks the network behind `api_url` against the current time.
    ///
    /// `api_url` is only used for the CORS probe; ledgers are queried
    /// through the `LedgerApi` this checker was built with. Both must point
    /// at the same network, e.g. the endpoint passed to
    /// `JsonRpcLedgerApi::new`.
    pub async fn check(&self, api_url: &Url) -> HealthVerdict {
        self.check_at(api_url, Utc::now()).await
    }

    /// Checks the network behind `api_url`, judging freshness against `now`.
    ///
    /// See [`Self::check`] for how `api_url` relates to the ledger API.
    ///
    /// Every failure, including unreachable endpoints and malformed
    /// responses, is reported as an unhealthy verdict.
    pub async fn check_at(&self, api_url: &Url, now: DateTime<Utc>) -> HealthVerdict {
        info!(%api_url, "checking network health");

        let mut progress = Progress::default();
        let result = self.run(api_url, now, &mut progress).await;
        let stage = progress.stage;
        progress.advance(HealthStage::Done);

        match result {
            Ok(()) => {
                info!(%api_url, "network healthy");
                HealthVerdict::healthy(progress.partitions)
            }
            Err(failure) => {
                warn!(%api_url, ?stage, reason = %failure, "network unhealthy");
                HealthVerdict::unhealthy(&failure, progress.partitions)
            }
        }
    }

    async fn run(
        &self,
        api_url: &Url,
        now: DateTime<Utc>,
        progress: &mut Progress,
    ) -> Result<(), HealthFailure> {
        let cors = self.cors.check(api_url).await;
        if !cors.is_ok() {
            return Err(HealthFailure::Cors(cors));
        }
        progress.advance(HealthStage::CorsChecked);

        let partitions = self.partitions().await?;
        progress.partitions = partitions.iter().map(PartitionSummary::from).collect();
        progress.advance(HealthStage::PartitionsResolved);

        let snapshots = fetch_ledgers(&self.api, &partitions, self.config.request_timeout).await;
        progress.partitions = snapshots.iter().map(PartitionSummary::from).collect();

        let failed: Vec<Partition> = snapshots
            .iter()
            .filter(|snapshot| snapshot.fetch_error().is_some())
            .map(|snapshot| snapshot.partition().clone())
            .collect();
        if !failed.is_empty() {
            return Err(HealthFailure::Query(failed));
        }
        progress.advance(HealthStage::LedgersFetched);

        check_freshness(
            &snapshots,
            now,
            self.config.freshness_window,
            self.config.require_block_time,
        )?;
        progress.advance(HealthStage::FreshnessChecked);

        check_anchor_sync(
            &snapshots,
            self.config.ok_threshold,
            self.config.partition_match,
        )?;
        progress.advance(HealthStage::AnchorsChecked);

        check_synthetic_sync(
            &snapshots,
            self.config.ok_threshold,
            self.config.partition_match,
        )?;
        progress.advance(HealthStage::SyntheticChecked);

        Ok(())
    }

    async fn partitions(&self) -> Result<Vec<Partition>, HealthFailure> {
        let status = tokio::time::timeout(self.config.request_timeout, self.api.network_status())
            .await
            .map_err(|_| {
                HealthFailure::Internal(format!(
                    "network-status timed out after {:?}",
                    self.config.request_timeout
                ))
            })?
            .map_err(|error| HealthFailure::Internal(error_chain(&error)))?;

        resolve_partitions(&status)
    }
}
