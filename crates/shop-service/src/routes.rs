//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{goods, health, purchases, refunds, users};
use crate::state::AppState;

/// Maximum concurrent in-flight requests across the API.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/goods` - Goods available for purchase
///
/// ## Shoppers (bearer auth)
/// - `POST /v1/users` - Register
/// - `GET /v1/account` - Balance and purchase history
/// - `POST /v1/purchases` - Buy a good
/// - `POST /v1/refunds` - Request a refund
///
/// ## Admin (bearer auth + admin capability)
/// - `GET /v1/admin/refunds` - Pending refund queue
/// - `POST /v1/admin/refunds/{id}/resolve` - Approve or decline one refund
/// - `POST /v1/admin/refunds/resolve-all` - Bulk approve or decline
/// - `GET /v1/admin/goods` - Full catalog
/// - `POST /v1/admin/goods` - Add a good
/// - `PUT /v1/admin/goods/{id}` - Edit a good
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Shoppers
        .route("/v1/users", post(users::register))
        .route("/v1/account", get(users::account))
        .route("/v1/goods", get(goods::list_goods))
        .route("/v1/purchases", post(purchases::purchase))
        .route("/v1/refunds", post(refunds::request_refund))
        // Admin
        .route("/v1/admin/refunds", get(refunds::admin_list_refunds))
        .route(
            "/v1/admin/refunds/resolve-all",
            post(refunds::admin_resolve_all),
        )
        .route(
            "/v1/admin/refunds/:id/resolve",
            post(refunds::admin_resolve_refund),
        )
        .route("/v1/admin/goods", get(goods::admin_list_goods))
        .route("/v1/admin/goods", post(goods::admin_add_good))
        .route("/v1/admin/goods/:id", put(goods::admin_edit_good))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
