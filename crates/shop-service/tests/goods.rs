//! Catalog and admin good-management integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

use shop_store::Store;

#[tokio::test]
async fn storefront_hides_sold_out_goods() {
    let harness = TestHarness::new();
    let in_stock = harness.seed_good(1000, 5);
    let sold_out = harness.seed_good(2000, 0);

    let response = harness.server.get("/v1/goods").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let goods = body["goods"].as_array().unwrap();
    assert_eq!(goods.len(), 1);
    assert_eq!(goods[0]["id"], in_stock.to_string());
    assert!(goods.iter().all(|g| g["id"] != sold_out.to_string()));
}

#[tokio::test]
async fn admin_catalog_includes_sold_out_goods() {
    let harness = TestHarness::new();
    harness.seed_good(1000, 5);
    harness.seed_good(2000, 0);

    let response = harness
        .server
        .get("/v1/admin/goods")
        .add_header("authorization", harness.admin_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["goods"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_adds_a_good() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/goods")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "Mechanical keyboard",
            "description": "Tenkeyless, brown switches",
            "price_cents": 7999,
            "in_stock": 4,
            "image": "keyboard.png"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let id: shop_core::GoodId = body["id"].as_str().unwrap().parse().unwrap();

    let stored = harness.store.get_good(&id).unwrap().unwrap();
    assert_eq!(stored.title, "Mechanical keyboard");
    assert_eq!(stored.price_cents, 7999);
    assert_eq!(stored.in_stock, 4);
}

#[tokio::test]
async fn admin_edits_a_good() {
    let harness = TestHarness::new();
    let good_id = harness.seed_good(1000, 5);

    let response = harness
        .server
        .put(&format!("/v1/admin/goods/{good_id}"))
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "Renamed good",
            "description": "New copy",
            "price_cents": 2500,
            "in_stock": 8,
            "image": ""
        }))
        .await;

    response.assert_status_ok();
    let stored = harness.store.get_good(&good_id).unwrap().unwrap();
    assert_eq!(stored.title, "Renamed good");
    assert_eq!(stored.price_cents, 2500);
    assert_eq!(stored.in_stock, 8);
}

#[tokio::test]
async fn editing_a_missing_good_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .put(&format!("/v1/admin/goods/{}", shop_core::GoodId::generate()))
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "Ghost",
            "description": "",
            "price_cents": 100,
            "in_stock": 1,
            "image": ""
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn non_admin_cannot_manage_goods() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/goods")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({
            "title": "Contraband",
            "description": "",
            "price_cents": 100,
            "in_stock": 1,
            "image": ""
        }))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn stranger_cannot_reach_admin_routes() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/admin/goods")
        .add_header("authorization", TestHarness::stranger_auth_header())
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn negative_price_is_a_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/goods")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "Underpriced",
            "description": "",
            "price_cents": -1,
            "in_stock": 1,
            "image": ""
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn blank_title_is_a_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/admin/goods")
        .add_header("authorization", harness.admin_auth_header())
        .json(&json!({
            "title": "  ",
            "description": "",
            "price_cents": 100,
            "in_stock": 1,
            "image": ""
        }))
        .await;

    response.assert_status_bad_request();
}
