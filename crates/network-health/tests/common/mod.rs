//! Shared fixtures for network health integration tests.
#![allow(dead_code)]

use std::time::Duration;

use accumulate_ledger_api::{LedgerAccount, LedgerRecord, PartitionType, SequenceEntry};
use accumulate_ledger_api_mock::MockLedgerApi;
use accumulate_network_health::{HealthChecker, HealthConfig};
use axum::Json;
use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue};
use axum::routing::post;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::json;
use url::Url;

pub const DN: &str = "dn.acme";
pub const BVN0: &str = "bvn-bvn0.acme";
pub const BVN1: &str = "bvn-bvn1.acme";

/// Fixed wall clock used by every test.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A block time `secs` seconds before `now()`.
pub fn secs_ago(secs: i64) -> Option<DateTime<Utc>> {
    Some(now() - TimeDelta::seconds(secs))
}

pub fn anchors_scope(url: &str) -> String {
    format!("{url}/anchors")
}

pub fn synthetic_scope(url: &str) -> String {
    format!("{url}/synthetic")
}

pub fn anchor_record(
    height: u64,
    sequence: Vec<SequenceEntry>,
    last_block_time: Option<DateTime<Utc>>,
) -> LedgerRecord {
    LedgerRecord {
        account: Some(LedgerAccount {
            url: None,
            minor_block_sequence_number: Some(height),
            sequence: Some(sequence),
        }),
        last_block_time,
    }
}

pub fn synthetic_record(
    sequence: Vec<SequenceEntry>,
    last_block_time: Option<DateTime<Utc>>,
) -> LedgerRecord {
    LedgerRecord {
        account: Some(LedgerAccount {
            url: None,
            minor_block_sequence_number: None,
            sequence: Some(sequence),
        }),
        last_block_time,
    }
}

/// A healthy three partition network (Directory, BVN0, BVN1).
///
/// The directory is at height 100 and BVN0 has delivered 95 of its anchors.
pub fn healthy_network() -> MockLedgerApi {
    let api = MockLedgerApi::with_partitions(&[
        ("Directory", PartitionType::Directory),
        ("BVN0", PartitionType::BlockValidator),
        ("BVN1", PartitionType::BlockValidator),
    ]);

    api.insert_record(
        &anchors_scope(DN),
        anchor_record(
            100,
            vec![
                SequenceEntry::new("acc://bvn-BVN0.acme").with_delivered(50),
                SequenceEntry::new("acc://bvn-BVN1.acme").with_delivered(50),
            ],
            secs_ago(5),
        ),
    );
    api.insert_record(
        &anchors_scope(BVN0),
        anchor_record(
            52,
            vec![SequenceEntry::new("acc://dn.acme").with_delivered(95)],
            secs_ago(3),
        ),
    );
    api.insert_record(
        &anchors_scope(BVN1),
        anchor_record(
            52,
            vec![SequenceEntry::new("acc://dn.acme").with_delivered(100)],
            secs_ago(4),
        ),
    );

    api.insert_record(
        &synthetic_scope(DN),
        synthetic_record(
            vec![
                SequenceEntry::new("acc://bvn-BVN0.acme")
                    .with_produced(20)
                    .with_delivered(20),
                SequenceEntry::new("acc://bvn-BVN1.acme")
                    .with_produced(10)
                    .with_delivered(10),
            ],
            secs_ago(5),
        ),
    );
    api.insert_record(
        &synthetic_scope(BVN0),
        synthetic_record(
            vec![
                SequenceEntry::new("acc://dn.acme")
                    .with_produced(20)
                    .with_delivered(18),
                SequenceEntry::new("acc://bvn-BVN1.acme")
                    .with_produced(5)
                    .with_delivered(5),
            ],
            secs_ago(3),
        ),
    );
    api.insert_record(
        &synthetic_scope(BVN1),
        synthetic_record(
            vec![
                SequenceEntry::new("acc://dn.acme")
                    .with_produced(10)
                    .with_delivered(10),
                SequenceEntry::new("acc://bvn-BVN0.acme")
                    .with_produced(5)
                    .with_delivered(5),
            ],
            secs_ago(4),
        ),
    );

    api
}

pub fn test_config() -> HealthConfig {
    HealthConfig {
        request_timeout: Duration::from_secs(2),
        ..HealthConfig::default()
    }
}

pub fn checker(api: &MockLedgerApi) -> HealthChecker<MockLedgerApi> {
    HealthChecker::new(api.clone(), test_config()).unwrap()
}

/// Starts an endpoint answering POST `/v3` with one
/// `Access-Control-Allow-Origin` line per entry of `origins`.
pub async fn spawn_cors_server(origins: &[&'static str]) -> Url {
    let origins = origins.to_vec();
    let router = Router::new().route(
        "/v3",
        post(move || {
            let origins = origins.clone();
            async move {
                let mut headers = HeaderMap::new();
                for origin in origins {
                    headers.append(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(origin));
                }
                (headers, Json(json!({ "jsonrpc": "2.0", "id": 1, "result": {} })))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind to port");
    let addr = listener.local_addr().expect("Should have local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("HTTP server should run");
    });

    Url::parse(&format!("http://{addr}/v3")).unwrap()
}

/// A URL nothing is listening on.
pub fn refused_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    Url::parse(&format!("http://{addr}/v3")).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
