//! Purchase flow integration tests.

mod common;

use common::TestHarness;
use axum::http::StatusCode;
use serde_json::json;

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn purchase_debits_wallet_and_decrements_stock() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 3 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Your purchase is done");
    assert_eq!(body["total_cents"], 3000);

    assert_eq!(harness.wallet(), 7000);
    assert_eq!(harness.stock(&good_id), 2);
}

#[tokio::test]
async fn account_shows_purchase_with_price_snapshot() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 2 }))
        .await
        .assert_status_ok();

    // Admin edits the price afterwards; the snapshot must not move.
    let edit = harness
        .server
        .put(&format!("/v1/admin/goods/{good_id}"))
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "Lamp",
            "description": "A desk lamp",
            "price_cents": 9999,
            "in_stock": 3,
            "image": "lamp.png"
        }))
        .await;
    edit.assert_status_ok();

    let response = harness
        .server
        .get("/v1/account")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance_cents"], 8000);
    let purchases = body["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["price_cents"], 1000);
    assert_eq!(purchases[0]["total_cents"], 2000);
    assert_eq!(purchases[0]["refund_eligible"], true);
    assert_eq!(purchases[0]["in_refund"], false);
}

#[tokio::test]
async fn sell_out_replenishes_to_the_constant() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    for quantity in [3, 2] {
        harness
            .server
            .post("/v1/purchases")
            .add_header("authorization", harness.user_auth_header())
            .json(&json!({ "good_id": good_id.to_string(), "quantity": quantity }))
            .await
            .assert_status_ok();
    }

    // 5 units sold; the second purchase emptied the shelf.
    assert_eq!(harness.wallet(), 5000);
    assert_eq!(harness.stock(&good_id), 12);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn anonymous_purchase_is_unauthorized() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    let response = harness
        .server
        .post("/v1/purchases")
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 1 }))
        .await;

    response.assert_status_unauthorized();
    assert_eq!(harness.stock(&good_id), 5);
}

#[tokio::test]
async fn insufficient_funds_changes_nothing() {
    let harness = TestHarness::new();
    // 11 x 10.00 > the 100.00 starting wallet.
    let good_id = harness.seed_good(1000, 50);

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 11 }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_funds");

    assert_eq!(harness.wallet(), 10_000);
    assert_eq!(harness.stock(&good_id), 50);
}

#[tokio::test]
async fn insufficient_stock_changes_nothing() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 2);

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 3 }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_stock");

    assert_eq!(harness.wallet(), 10_000);
    assert_eq!(harness.stock(&good_id), 2);
}

#[tokio::test]
async fn unknown_good_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "good_id": shop_core::GoodId::generate().to_string(),
            "quantity": 1
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn oversized_total_is_a_bad_request() {
    let harness = TestHarness::new();
    // An extreme admin-set price must not wrap the total negative and
    // slip past the funds check.
    let good_id = harness.seed_good(1 << 33, u32::MAX);

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 1_u32 << 30 }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(harness.wallet(), 10_000);
}

#[tokio::test]
async fn zero_quantity_is_a_bad_request() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    let response = harness
        .server
        .post("/v1/purchases")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "good_id": good_id.to_string(), "quantity": 0 }))
        .await;

    response.assert_status_bad_request();
}
