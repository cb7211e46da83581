//! CLI binary to check whether an Accumulate network is live.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod network;

use std::process::ExitCode;
use std::time::Duration;

use accumulate_ledger_api_jsonrpc::JsonRpcLedgerApi;
use accumulate_network_health::{HealthChecker, HealthConfig, HealthVerdict, PartitionMatch};
use accumulate_network_health::{PartitionSummary, config};
use clap::Parser;
use network::Network;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Health checker setup error
    #[error(transparent)]
    Health(#[from] accumulate_network_health::Error),

    /// JSON-RPC client setup error
    #[error(transparent)]
    JsonRpc(#[from] accumulate_ledger_api_jsonrpc::Error),

    /// Network selection error
    #[error("network error: {0}")]
    Network(String),

    /// Report serialization error
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Network preset (local-devnet, mainnet, kermit, fozzie) or API base URL
    #[arg(long, default_value = "local-devnet", env = "ACCUMULATE_HEALTH_NETWORK")]
    network: Network,

    /// Maximum tolerated lag, in blocks or messages
    #[arg(
        long,
        default_value_t = config::DEFAULT_OK_THRESHOLD,
        env = "ACCUMULATE_HEALTH_OK_THRESHOLD"
    )]
    ok_threshold: u64,

    /// Maximum age of a partition's last block, in seconds
    #[arg(
        long,
        default_value_t = config::DEFAULT_FRESHNESS_WINDOW.as_secs(),
        env = "ACCUMULATE_HEALTH_FRESHNESS_WINDOW_SECS"
    )]
    freshness_window_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(
        long,
        default_value_t = config::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        env = "ACCUMULATE_HEALTH_REQUEST_TIMEOUT_SECS"
    )]
    request_timeout_secs: u64,

    /// Fail partitions that report no last block time
    #[arg(long, env = "ACCUMULATE_HEALTH_REQUIRE_BLOCK_TIME")]
    require_block_time: bool,

    /// Match sequence entries by URL authority instead of substring
    #[arg(long, env = "ACCUMULATE_HEALTH_STRICT_PARTITION_MATCH")]
    strict_partition_match: bool,

    /// Origin sent with the CORS probe
    #[arg(
        long,
        default_value = config::DEFAULT_ORIGIN,
        env = "ACCUMULATE_HEALTH_ORIGIN"
    )]
    origin: String,

    /// Re-run the check every N seconds until interrupted
    #[arg(long, env = "ACCUMULATE_HEALTH_INTERVAL_SECS")]
    interval_secs: Option<u64>,
}

impl Args {
    fn health_config(&self) -> HealthConfig {
        HealthConfig {
            ok_threshold: self.ok_threshold,
            freshness_window: Duration::from_secs(self.freshness_window_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            require_block_time: self.require_block_time,
            partition_match: if self.strict_partition_match {
                PartitionMatch::Authority
            } else {
                PartitionMatch::Contains
            },
            origin: self.origin.clone(),
        }
    }
}

/// What gets printed for each run.
#[derive(Debug, Serialize)]
struct Report<'a> {
    network: String,
    healthy: bool,
    status: &'static str,
    details: &'a str,
    partitions: &'a [PartitionSummary],
}

impl<'a> Report<'a> {
    fn new(network: &Network, verdict: &'a HealthVerdict) -> Self {
        Self {
            network: network.to_string(),
            healthy: verdict.healthy,
            status: if verdict.healthy {
                "🟢 Live"
            } else {
                "🔴 Unhealthy"
            },
            details: &verdict.reason,
            partitions: &verdict.partitions,
        }
    }
}

async fn wait_for_shutdown(shutdown_token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => info!("Received interrupt signal"),
                }
            }
            Err(e) => {
                error!("SIGTERM handler failed: {e}");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received interrupt signal");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received interrupt signal");
    }

    info!("Shutting down");
    shutdown_token.cancel();
}

fn print_report(network: &Network, verdict: &HealthVerdict) -> Result<(), Error> {
    let report = serde_json::to_string_pretty(&Report::new(network, verdict))?;
    println!("{report}");

    Ok(())
}

const fn exit_code(healthy: bool) -> ExitCode {
    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_checker(args: &Args) -> Result<HealthChecker<JsonRpcLedgerApi>, Error> {
    let config = args.health_config();
    let api = JsonRpcLedgerApi::new(args.network.api_url()?, config.request_timeout)?;

    Ok(HealthChecker::new(api, config)?)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    // Logs go to stderr; stdout carries only reports
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let checker = build_checker(&args)?;
    // The CORS probe and the ledger queries hit the same endpoint
    let api_url = checker.api().endpoint().clone();

    info!(network = %args.network, endpoint = %api_url, "using network");

    let Some(interval_secs) = args.interval_secs else {
        let verdict = checker.check(&api_url).await;
        print_report(&args.network, &verdict)?;
        return Ok(exit_code(verdict.healthy));
    };

    let shutdown_token = CancellationToken::new();
    tokio::spawn(wait_for_shutdown(shutdown_token.clone()));

    let interval = Duration::from_secs(interval_secs);
    let mut healthy = false;
    loop {
        tokio::select! {
            () = shutdown_token.cancelled() => break,
            verdict = checker.check(&api_url) => {
                print_report(&args.network, &verdict)?;
                healthy = verdict.healthy;
            }
        }

        tokio::select! {
            () = shutdown_token.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    Ok(exit_code(healthy))
}
