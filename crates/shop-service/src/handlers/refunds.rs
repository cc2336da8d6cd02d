//! Refund request and admin resolution handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shop_core::{PurchaseId, Refund, RefundDecision, RefundId};
use shop_engine::BulkReport;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::worker::WorkerError;

/// Refund request body.
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    /// The purchase to refund.
    pub purchase_id: PurchaseId,
}

/// Refund request response.
#[derive(Debug, Serialize)]
pub struct RefundRequestResponse {
    /// User-facing confirmation.
    pub message: String,
    /// The refund ID (existing one if the request was repeated).
    pub refund_id: String,
}

/// Request a refund for one of the caller's purchases.
///
/// Idempotent per purchase; only valid inside the refund window.
pub async fn request_refund(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RefundRequest>,
) -> Result<Json<RefundRequestResponse>, ApiError> {
    // Ownership check: a purchase you do not own is indistinguishable
    // from a missing one.
    let purchase = state
        .store
        .get_purchase(&body.purchase_id)?
        .filter(|p| p.customer == auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("purchase: {}", body.purchase_id)))?;

    let now = chrono::Utc::now();
    let refund = state.engine.request_refund(&purchase.id, now)?;

    Ok(Json(RefundRequestResponse {
        message: "Your refund request has been sent. Wait for approving.".into(),
        refund_id: refund.id.to_string(),
    }))
}

/// One entry in the admin refund queue.
#[derive(Debug, Serialize)]
pub struct RefundQueueEntry {
    /// Refund ID.
    pub id: String,
    /// The purchase under refund.
    pub purchase_id: String,
    /// When the refund was requested.
    pub requested_at: String,
}

impl From<&Refund> for RefundQueueEntry {
    fn from(refund: &Refund) -> Self {
        Self {
            id: refund.id.to_string(),
            purchase_id: refund.purchase.to_string(),
            requested_at: refund.requested_at.to_rfc3339(),
        }
    }
}

/// Pending refund queue response.
#[derive(Debug, Serialize)]
pub struct RefundQueueResponse {
    /// Pending refunds, oldest first.
    pub refunds: Vec<RefundQueueEntry>,
}

/// List pending refunds. Admin only.
pub async fn admin_list_refunds(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<RefundQueueResponse>, ApiError> {
    let refunds = state
        .store
        .list_refunds()?
        .iter()
        .map(RefundQueueEntry::from)
        .collect();
    Ok(Json(RefundQueueResponse { refunds }))
}

/// Single-refund resolution body. `decline` declines; anything else
/// approves, matching the admin form semantics.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// The approval value.
    pub approval: String,
}

/// Resolution response.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// User-facing confirmation.
    pub message: String,
}

/// Resolve one refund. Admin only.
pub async fn admin_resolve_refund(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(refund_id): Path<RefundId>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let decision = RefundDecision::from_approval(&body.approval);
    state.engine.resolve_refund(&refund_id, decision)?;

    tracing::info!(admin = %admin.user.id, %refund_id, %decision, "Refund resolved by admin");
    Ok(Json(ResolveResponse {
        message: match decision {
            RefundDecision::Approve => "Refund approved".into(),
            RefundDecision::Decline => "Refund declined".into(),
        },
    }))
}

/// Bulk resolution body: `approve-all` or `decline-all`.
#[derive(Debug, Deserialize)]
pub struct ResolveAllRequest {
    /// The bulk decision flag.
    pub decision: String,
}

/// Bulk resolution response.
#[derive(Debug, Serialize)]
pub struct ResolveAllResponse {
    /// User-facing confirmation.
    pub message: String,
    /// Per-item outcome counts.
    pub report: BulkReport,
}

/// Resolve every pending refund. Admin only.
///
/// The batch runs on the background refund worker; this request waits for
/// the report under the configured timeout.
pub async fn admin_resolve_all(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(body): Json<ResolveAllRequest>,
) -> Result<Json<ResolveAllResponse>, ApiError> {
    let decision: RefundDecision = body
        .decision
        .parse()
        .map_err(|_| ApiError::BadRequest("expected approve-all or decline-all".into()))?;

    let timeout = Duration::from_secs(state.config.bulk_timeout_seconds);
    let report = state
        .worker
        .resolve_all(decision, timeout)
        .await
        .map_err(|err: WorkerError| ApiError::Internal(err.to_string()))?;

    tracing::info!(
        admin = %admin.user.id,
        %decision,
        resolved = %report.resolved,
        failed = %report.failed,
        "Bulk refund resolution requested by admin"
    );

    Ok(Json(ResolveAllResponse {
        message: match decision {
            RefundDecision::Approve => "All refunds have been approved".into(),
            RefundDecision::Decline => "All refunds have been declined".into(),
        },
        report,
    }))
}
