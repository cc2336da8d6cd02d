//! Registration and account handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use shop_core::{Purchase, User};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Registered user response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID.
    pub id: String,
    /// Wallet balance in cents.
    pub wallet_cents: i64,
    /// Whether the user holds the admin capability.
    pub is_admin: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            wallet_cents: user.wallet_cents,
            is_admin: user.is_admin,
        }
    }
}

/// Register the authenticated user.
///
/// New users start with the configured wallet balance. Registering twice is
/// idempotent and returns the existing record.
pub async fn register(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(existing) = state.store.get_user(&auth.user_id)? {
        return Ok(Json(UserResponse::from(&existing)));
    }

    let user = User::new(auth.user_id, state.config.starting_wallet_cents);
    state.store.put_user(&user)?;

    tracing::info!(user_id = %user.id, wallet_cents = %user.wallet_cents, "User registered");
    Ok(Json(UserResponse::from(&user)))
}

/// One purchase row on the account page.
#[derive(Debug, Serialize)]
pub struct AccountPurchase {
    /// Purchase ID.
    pub id: String,
    /// The purchased good.
    pub good_id: String,
    /// Units bought.
    pub quantity: u32,
    /// Unit price snapshot in cents.
    pub price_cents: i64,
    /// Total settled amount in cents.
    pub total_cents: i64,
    /// When the purchase was made.
    pub created_at: String,
    /// Whether a refund may still be requested.
    pub refund_eligible: bool,
    /// Whether a refund request is already pending.
    pub in_refund: bool,
}

/// Account response: balance plus purchase history.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Wallet balance in cents.
    pub balance_cents: i64,
    /// Purchases, newest first.
    pub purchases: Vec<AccountPurchase>,
}

/// Get the authenticated user's account: balance and purchases, each
/// flagged with refund eligibility computed against one shared `now`.
pub async fn account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("user not registered".into()))?;

    // One timestamp for the whole listing, so eligibility does not flicker
    // across rows within a single response.
    let now = chrono::Utc::now();

    let purchases = state.store.list_purchases_by_user(&auth.user_id)?;
    let mut rows = Vec::with_capacity(purchases.len());
    for purchase in &purchases {
        rows.push(account_row(&state, purchase, now)?);
    }

    Ok(Json(AccountResponse {
        balance_cents: user.wallet_cents,
        purchases: rows,
    }))
}

fn account_row(
    state: &AppState,
    purchase: &Purchase,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<AccountPurchase, ApiError> {
    let in_refund = state.store.get_refund_by_purchase(&purchase.id)?.is_some();
    Ok(AccountPurchase {
        id: purchase.id.to_string(),
        good_id: purchase.good.to_string(),
        quantity: purchase.quantity,
        price_cents: purchase.price_cents,
        total_cents: purchase.total_cents(),
        created_at: purchase.created_at.to_rfc3339(),
        refund_eligible: state.engine.refund_eligible(purchase, now),
        in_refund,
    })
}
