//! Purchase handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use shop_core::GoodId;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Purchase request.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// The good to buy.
    pub good_id: GoodId,
    /// Units to buy. Must be positive.
    pub quantity: u32,
}

/// Purchase response.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// User-facing confirmation.
    pub message: String,
    /// The created purchase ID.
    pub purchase_id: String,
    /// Total settled amount in cents.
    pub total_cents: i64,
}

/// Execute a purchase.
///
/// Anonymous callers are rejected before any lookup; business-rule
/// failures (funds, stock) leave no state behind.
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    auth: Option<AuthUser>,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let actor = auth.map(|a| a.user_id);
    let now = chrono::Utc::now();

    let purchase = state
        .engine
        .purchase(actor, &body.good_id, body.quantity, now)?;

    Ok(Json(PurchaseResponse {
        message: "Your purchase is done".into(),
        purchase_id: purchase.id.to_string(),
        total_cents: purchase.total_cents(),
    }))
}
