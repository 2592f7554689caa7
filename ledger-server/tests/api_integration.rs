//! Integration tests for the REST API
//!
//! Tests the full HTTP stack over the in-memory store:
//! - Balance and holdings queries
//! - Order placement and cancellation
//! - Request validation and error mapping

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ledger_server::{
    AppState, InMemoryLedgerStore, InMemoryTradingEngine, LedgerConfig, LedgerServer, SeedConfig,
    create_router,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Router over a store seeded with the default demo account (id 1)
fn create_test_app() -> Router {
    let store = Arc::new(InMemoryLedgerStore::new());
    store.apply_seed(&SeedConfig::default()).unwrap();
    let engine = InMemoryTradingEngine::in_memory(store);
    create_router(Arc::new(AppState::new(Arc::new(engine))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn buy_request(quantity: i64, price: Value) -> Value {
    json!({
        "account_id": 1,
        "stock_code": "STOCK01",
        "type": "LIMIT",
        "direction": "BUY",
        "quantity": quantity,
        "price": price,
    })
}

fn decimal(value: &Value) -> rust_decimal::Decimal {
    value.as_str().unwrap().parse().unwrap()
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_get_balance() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/api/v1/accounts/1/balance")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["account_number"], "AC001");
    assert_eq!(decimal(&json["balance"]), rust_decimal_macros::dec!(1000000));
}

#[tokio::test]
async fn test_get_holdings() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/api/v1/accounts/1/holdings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([{"stock_code": "STOCK01", "quantity": 100}]));
}

#[tokio::test]
async fn test_unknown_account_is_404() {
    let app = create_test_app();

    let (status, json) = send(&app, get("/api/v1/accounts/42/balance")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("account not found"));

    let (status, _) = send(&app, get("/api/v1/accounts/42/holdings")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_account_id_is_400() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/api/v1/accounts/abc/balance")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "invalid account ID"}));
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_create_buy_order() {
    let app = create_test_app();
    let (status, json) = send(&app, post_json("/api/v1/orders", buy_request(100, json!(50)))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["account_id"], 1);
    assert_eq!(json["stock_code"], "STOCK01");
    assert_eq!(json["type"], "LIMIT");
    assert_eq!(json["direction"], "BUY");
    assert_eq!(json["quantity"], 100);
    assert_eq!(json["filled_quantity"], 0);
    assert_eq!(json["status"], "PENDING");
    assert!(json["id"].as_i64().unwrap() > 0);

    let (_, balance) = send(&app, get("/api/v1/accounts/1/balance")).await;
    assert_eq!(decimal(&balance["balance"]), rust_decimal_macros::dec!(995000));
}

#[tokio::test]
async fn test_create_order_normalizes_input() {
    let app = create_test_app();
    let body = json!({
        "account_id": 1,
        "stock_code": "stock01",
        "type": "market",
        "direction": "sell",
        "quantity": 30,
        "price": "12.50",
    });
    let (status, json) = send(&app, post_json("/api/v1/orders", body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["stock_code"], "STOCK01");
    assert_eq!(json["type"], "MARKET");
    assert_eq!(json["direction"], "SELL");

    let (_, holdings) = send(&app, get("/api/v1/accounts/1/holdings")).await;
    assert_eq!(holdings, json!([{"stock_code": "STOCK01", "quantity": 70}]));
}

#[tokio::test]
async fn test_cancel_order_round_trip() {
    let app = create_test_app();
    let (_, created) = send(&app, post_json("/api/v1/orders", buy_request(10, json!(99.99)))).await;
    let id = created["id"].as_i64().unwrap();

    let (status, json) = send(&app, delete(&format!("/api/v1/orders/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "CANCELED");

    let (_, balance) = send(&app, get("/api/v1/accounts/1/balance")).await;
    assert_eq!(decimal(&balance["balance"]), rust_decimal_macros::dec!(1000000));

    // Second cancel is a precondition failure
    let (status, json) = send(&app, delete(&format!("/api/v1/orders/{}", id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not in a cancelable state"));
}

#[tokio::test]
async fn test_cancel_unknown_order_is_404() {
    let app = create_test_app();
    let (status, _) = send(&app, delete("/api/v1/orders/777")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, delete("/api/v1/orders/x1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "invalid order ID"}));
}

#[tokio::test]
async fn test_precondition_failures_are_400() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        post_json("/api/v1/orders", buy_request(1_000_000, json!(10))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("insufficient funds"));

    let mut oversell = buy_request(1000, json!(1));
    oversell["direction"] = json!("SELL");
    let (status, json) = send(&app, post_json("/api/v1/orders", oversell)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("insufficient holding quantity")
    );

    let mut unknown = buy_request(1, json!(1));
    unknown["account_id"] = json!(99);
    let (status, _) = send(&app, post_json("/api/v1/orders", unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_validation() {
    let app = create_test_app();

    let cases = [
        (json!({"quantity": 0}), "quantity"),
        (json!({"quantity": -5}), "quantity"),
        (json!({"price": 0}), "price"),
        (json!({"price": "-1"}), "price"),
        (json!({"price": "10.001"}), "price"),
        (json!({"direction": "HOLD"}), "direction"),
        (json!({"type": "STOP"}), "type"),
        (json!({"stock_code": ""}), "stock_code"),
        (json!({"stock_code": "BAD CODE"}), "stock_code"),
    ];

    for (patch, field) in cases {
        let mut body = buy_request(1, json!(1));
        for (key, value) in patch.as_object().unwrap() {
            body[key] = value.clone();
        }

        let (status, json) = send(&app, post_json("/api/v1/orders", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {}", field);
        let message = json["error"].as_str().unwrap();
        assert!(message.contains(field), "{} should mention {}", message, field);
    }

    // Nothing was reserved by any rejected request
    let (_, balance) = send(&app, get("/api/v1/accounts/1/balance")).await;
    assert_eq!(decimal(&balance["balance"]), rust_decimal_macros::dec!(1000000));
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "invalid request body"}));

    let (status, _) = send(&app, post_json("/api/v1/orders", json!({"account_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Server Bootstrap
// ============================================================================

#[tokio::test]
async fn test_server_from_default_config() {
    let server = LedgerServer::from_config(LedgerConfig::default())
        .await
        .unwrap();
    let app = server.router();

    let (status, json) = send(&app, get("/api/v1/accounts/1/holdings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([{"stock_code": "STOCK01", "quantity": 100}]));
}

#[tokio::test]
async fn test_server_rejects_invalid_seed() {
    let config = LedgerConfig::from_json(
        r#"{"seed": {"accounts": [{"account_number": "AC001", "balance": "-5"}]}}"#,
    )
    .unwrap();

    assert!(LedgerServer::from_config(config).await.is_err());
}
