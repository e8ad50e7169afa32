//! `EthClient` against a fake JSON-RPC node served over real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing_test::traced_test;

use eth_rest_gateway::node::{CallParams, EthClient, NodeClient, NodeError};
use eth_rest_gateway::params::Quantity;
use eth_rest_gateway::server::{build_router, AppState};

type Reply = dyn Fn(&Value) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct FakeNode {
    requests: Arc<Mutex<Vec<Value>>>,
    reply: Arc<Reply>,
}

async fn rpc(State(node): State<FakeNode>, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    node.requests.lock().unwrap().push(request.clone());
    let (status, body) = (node.reply)(&request);
    (status, Json(body))
}

/// Serve a fake node on an ephemeral port; returns its URL and the request log.
async fn spawn_node<F>(reply: F) -> (String, Arc<Mutex<Vec<Value>>>)
where
    F: Fn(&Value) -> (StatusCode, Value) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let node = FakeNode {
        requests: requests.clone(),
        reply: Arc::new(reply),
    };
    let app = Router::new().route("/", post(rpc)).with_state(node);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/", addr), requests)
}

fn result(request: &Value, result: Value) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
    )
}

async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_block_number_request_framing() {
    let (url, requests) = spawn_node(|req| result(req, json!("0x8c79d5"))).await;
    let client = EthClient::new(&url);

    let head = client.block_number().await.unwrap();
    assert_eq!(head, Quantity(9_206_229));

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["jsonrpc"], "2.0");
    assert_eq!(sent["method"], "eth_blockNumber");
    assert_eq!(sent["params"], json!([]));
    assert!(sent["id"].is_u64());
}

#[tokio::test]
async fn test_null_block_is_none() {
    let (url, requests) = spawn_node(|req| result(req, Value::Null)).await;
    let client = EthClient::new(&url);

    let block = client.block_by_number(Quantity(5_681_044), true).await.unwrap();
    assert!(block.is_none());

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["method"], "eth_getBlockByNumber");
    assert_eq!(sent["params"], json!(["0x56af94", true]));
}

#[tokio::test]
async fn test_null_required_result_is_missing() {
    let (url, _) = spawn_node(|req| result(req, Value::Null)).await;
    let client = EthClient::new(&url);

    let err = client.gas_price().await.unwrap_err();
    assert!(matches!(err, NodeError::MissingResult("eth_gasPrice")), "{:?}", err);
}

#[tokio::test]
async fn test_balance_is_evaluated_at_latest() {
    let (url, requests) = spawn_node(|req| result(req, json!("0x210bc0c7b4c27c77"))).await;
    let client = EthClient::new(&url);
    let address: Address = "0x5cf2cbfd110e7ce39fb353d123776ab683ef9feb".parse().unwrap();

    let balance = client.get_balance(address).await.unwrap();
    assert_eq!(balance, U256::from(0x210bc0c7b4c27c77u64));

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["method"], "eth_getBalance");
    assert_eq!(
        sent["params"][0].as_str().unwrap().to_lowercase(),
        "0x5cf2cbfd110e7ce39fb353d123776ab683ef9feb"
    );
    assert_eq!(sent["params"][1], "latest");
}

#[tokio::test]
async fn test_call_sends_call_object() {
    let output = "0x000000000000000000000000000000000000000000000000000000000016bc50";
    let (url, requests) = spawn_node(move |req| result(req, json!(output))).await;
    let client = EthClient::new(&url);

    let params = CallParams {
        from: Address::repeat_byte(0x11),
        to: Address::repeat_byte(0x22),
        gas: Quantity(30400),
        gas_price: Quantity(4_000_000_000),
        value: Quantity(0),
        data: Bytes::from(vec![0x70, 0xa0, 0x82, 0x31]),
    };
    let bytes = client.call(&params).await.unwrap();
    assert_eq!(bytes.len(), 32);
    assert_eq!(bytes[31], 0x50);

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["method"], "eth_call");
    let call = &sent["params"][0];
    assert_eq!(call["gas"], "0x76c0");
    assert_eq!(call["gasPrice"], "0xee6b2800");
    assert_eq!(call["value"], "0x0");
    assert_eq!(call["data"], "0x70a08231");
    assert_eq!(sent["params"][1], "latest");
}

#[tokio::test]
async fn test_transaction_lookup_decodes() {
    let hash = "0x37e458fcff2a79f32257776aa67f929187d2ff1f8868092bead0b788d248b9b4";
    let (url, requests) = spawn_node(move |req| {
        result(
            req,
            json!({
                "blockHash": null,
                "blockNumber": null,
                "from": "0x5cf2cbfd110e7ce39fb353d123776ab683ef9feb",
                "gas": "0x5208",
                "gasPrice": "0x3b9aca00",
                "hash": hash,
                "input": "0x",
                "nonce": "0x1",
                "to": null,
                "transactionIndex": null,
                "value": "0x0"
            }),
        )
    })
    .await;
    let client = EthClient::new(&url);

    let tx = client
        .transaction_by_hash(hash.parse::<B256>().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(tx.block_hash.is_none());
    assert!(tx.to.is_none());

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["params"], json!([hash]));
}

#[tokio::test]
async fn test_rpc_error_is_mapped() {
    let (url, _) = spawn_node(|req| {
        (
            StatusCode::OK,
            json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": { "code": -32000, "message": "header not found" }
            }),
        )
    })
    .await;
    let client = EthClient::new(&url);

    match client.block_number().await.unwrap_err() {
        NodeError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "header not found");
        }
        other => panic!("expected rpc error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_status_is_mapped() {
    let (url, _) = spawn_node(|_| (StatusCode::BAD_GATEWAY, json!("upstream down"))).await;
    let client = EthClient::new(&url);

    let err = client.gas_price().await.unwrap_err();
    assert!(matches!(err, NodeError::Status { status: 502, .. }), "{:?}", err);
}

#[tokio::test]
async fn test_malformed_result_is_decode_error() {
    let (url, _) = spawn_node(|req| result(req, json!({ "unexpected": true }))).await;
    let client = EthClient::new(&url);

    let err = client.block_number().await.unwrap_err();
    assert!(
        matches!(err, NodeError::Decode { method: "eth_blockNumber", .. }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_mismatched_id_is_rejected() {
    let (url, _) = spawn_node(|req| {
        let id = req["id"].as_u64().unwrap() + 1000;
        (
            StatusCode::OK,
            json!({ "jsonrpc": "2.0", "id": id, "result": "0x1" }),
        )
    })
    .await;
    let client = EthClient::new(&url);

    let err = client.block_number().await.unwrap_err();
    assert!(matches!(err, NodeError::IdMismatch { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_ids() {
    let (url, requests) = spawn_node(|req| result(req, json!("0x1"))).await;
    let client = Arc::new(EthClient::new(&url));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.block_number().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Quantity(1));
    }

    let mut ids: Vec<u64> = requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let client = EthClient::new(&closed_port_url().await);

    let err = client.block_number().await.unwrap_err();
    assert!(matches!(err, NodeError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_gateway_end_to_end() {
    let (url, _) = spawn_node(|req| match req["method"].as_str() {
        Some("eth_blockNumber") => result(req, json!("0x8c79d5")),
        _ => result(req, Value::Null),
    })
    .await;
    let client: Arc<dyn NodeClient> = Arc::new(EthClient::new(&url));
    let app = build_router(
        Arc::new(AppState::new(client).unwrap()),
        Duration::from_secs(5),
    );

    let response = app
        .clone()
        .oneshot(Request::get("/block/last/height").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], br#"{"lastBlockHeight":9206229}"#);

    let response = app
        .oneshot(Request::get("/block/123").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[traced_test]
async fn test_gateway_with_unreachable_node() {
    let client: Arc<dyn NodeClient> = Arc::new(EthClient::new(&closed_port_url().await));
    let app = build_router(
        Arc::new(AppState::new(client).unwrap()),
        Duration::from_secs(5),
    );

    let response = app
        .oneshot(Request::get("/gasprice").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FAILED_DEPENDENCY);

    assert!(logs_contain("Node request failed"));
    logs_assert(|lines: &[&str]| {
        match lines.iter().find(|line| line.contains(" ERROR ")) {
            Some(line) => Err(format!("transport failure logged above warn: {}", line)),
            None => Ok(()),
        }
    });
}
