//! Exercises the JSON-RPC client against an in-process v3 endpoint.

use std::time::Duration;

use accumulate_ledger_api::{LedgerApi, PartitionType};
use accumulate_ledger_api_jsonrpc::{Error, JsonRpcLedgerApi};
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};
use url::Url;

async fn rpc_handler(Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();

    let result = match method {
        "network-status" => json!({
            "network": {
                "networkName": "DevNet",
                "partitions": [
                    { "id": "Directory", "type": "directory" },
                    { "id": "BVN0", "type": "blockValidator" }
                ]
            }
        }),
        "query" => match request["params"]["scope"].as_str() {
            Some("acc://dn.acme/anchors") => json!({
                "recordType": "account",
                "account": {
                    "type": "anchorLedger",
                    "url": "acc://dn.acme/anchors",
                    "minorBlockSequenceNumber": 42,
                    "sequence": [{ "url": "acc://bvn-BVN0.acme", "delivered": 40 }]
                },
                "lastBlockTime": "2024-05-01T12:00:00Z"
            }),
            scope => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -33404, "message": format!("{} not found", scope.unwrap_or("?")) }
                }));
            }
        },
        _ => Value::Null,
    };

    if result.is_null() {
        return Json(json!({ "jsonrpc": "2.0", "id": id }));
    }

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

async fn spawn_server(router: Router) -> Url {
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

fn api(endpoint: Url) -> JsonRpcLedgerApi {
    JsonRpcLedgerApi::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_network_status() {
    let endpoint = spawn_server(Router::new().route("/v3", post(rpc_handler))).await;

    let status = api(endpoint).network_status().await.unwrap();
    let partitions = status.partitions();

    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions[0].id, "Directory");
    assert_eq!(partitions[0].kind, PartitionType::Directory);
    assert_eq!(partitions[1].kind, PartitionType::BlockValidator);
}

#[tokio::test]
async fn test_query_anchor_ledger() {
    let endpoint = spawn_server(Router::new().route("/v3", post(rpc_handler))).await;

    let record = api(endpoint).query("dn.acme/anchors").await.unwrap();
    let account = record.account.unwrap();

    assert_eq!(account.minor_block_sequence_number, Some(42));
    assert_eq!(account.sequence.unwrap()[0].delivered, 40);
    assert!(record.last_block_time.is_some());
}

#[tokio::test]
async fn test_rpc_error_is_surfaced() {
    let endpoint = spawn_server(Router::new().route("/v3", post(rpc_handler))).await;

    let err = api(endpoint)
        .query("bvn-bvn9.acme/anchors")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rpc { code: -33404, .. }));
    assert!(err.to_string().contains("acc://bvn-bvn9.acme/anchors not found"));
}

#[tokio::test]
async fn test_missing_result() {
    let router = Router::new().route(
        "/v3",
        post(|| async { Json(json!({ "jsonrpc": "2.0", "id": 1 })) }),
    );
    let endpoint = spawn_server(router).await;

    let err = api(endpoint).network_status().await.unwrap_err();

    assert!(matches!(err, Error::MissingResult("network-status")));
}

#[tokio::test]
async fn test_non_success_status() {
    let router = Router::new().route(
        "/v3",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
    );
    let endpoint = spawn_server(router).await;

    let err = api(endpoint).network_status().await.unwrap_err();

    match err {
        Error::Status { status, body, .. } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Url::parse(&format!("http://{addr}/v3")).unwrap();
    let err = api(endpoint).network_status().await.unwrap_err();

    assert!(matches!(err, Error::Request { method: "network-status", .. }));
}
