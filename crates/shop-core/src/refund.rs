//! Refund requests and resolution decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{PurchaseId, RefundId};

/// A pending refund request.
///
/// At most one refund exists per purchase; requesting twice is idempotent.
/// The row is deleted on decline (purchase retained) and on approval (the
/// purchase row goes with it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Unique refund ID (ULID for time-ordering).
    pub id: RefundId,

    /// The purchase under refund. Unique across all refunds.
    pub purchase: PurchaseId,

    /// When the refund was requested.
    pub requested_at: DateTime<Utc>,
}

impl Refund {
    /// Create a refund request for a purchase.
    #[must_use]
    pub fn new(purchase: PurchaseId, now: DateTime<Utc>) -> Self {
        Self {
            id: RefundId::generate(),
            purchase,
            requested_at: now,
        }
    }
}

/// Administrator decision on a refund request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundDecision {
    /// Reverse the purchase: credit the wallet, restock the good, delete
    /// both the purchase and the refund rows.
    Approve,

    /// Drop the request: delete the refund row only.
    Decline,
}

impl RefundDecision {
    /// Map a single-refund `approval` form value: `decline` declines,
    /// anything else approves.
    #[must_use]
    pub fn from_approval(value: &str) -> Self {
        if value == "decline" {
            Self::Decline
        } else {
            Self::Approve
        }
    }
}

impl fmt::Display for RefundDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Decline => f.write_str("decline"),
        }
    }
}

impl FromStr for RefundDecision {
    type Err = DecisionParseError;

    /// Anything other than `decline` approves, matching the admin form
    /// semantics; unknown strings are still rejected at the API layer via
    /// the typed variants below.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" | "approve-all" => Ok(Self::Approve),
            "decline" | "decline-all" => Ok(Self::Decline),
            _ => Err(DecisionParseError(s.to_string())),
        }
    }
}

/// Error parsing a refund decision string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown refund decision: {0}")]
pub struct DecisionParseError(pub String);
