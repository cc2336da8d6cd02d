//! Purchase records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Good, GoodId, PurchaseId, UserId};

/// A completed purchase.
///
/// The `price_cents` and `quantity` fields are frozen at the moment of
/// purchase; later edits to the good never retroactively change an existing
/// record. A purchase row is deleted only when its refund is approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique purchase ID (ULID for time-ordering).
    pub id: PurchaseId,

    /// The buying user.
    pub customer: UserId,

    /// The purchased good.
    pub good: GoodId,

    /// Units bought. Always positive.
    pub quantity: u32,

    /// Unit price in cents at the moment of purchase. Immutable snapshot.
    pub price_cents: i64,

    /// When the purchase was made. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Snapshot a purchase of `quantity` units of `good` by `customer`.
    #[must_use]
    pub fn snapshot(customer: UserId, good: &Good, quantity: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: PurchaseId::generate(),
            customer,
            good: good.id,
            quantity,
            price_cents: good.price_cents,
            created_at: now,
        }
    }

    /// Total settled amount in cents.
    ///
    /// The product fit in cents when the purchase settled; saturation here
    /// only guards records tampered with out of band.
    #[must_use]
    pub fn total_cents(&self) -> i64 {
        self.price_cents.saturating_mul(i64::from(self.quantity))
    }

    /// Whether a refund may still be requested for this purchase.
    ///
    /// Callers must compute `now` once per request and reuse it across a
    /// whole listing, so eligibility does not flicker at the window boundary
    /// within one response.
    #[must_use]
    pub fn refund_eligible(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at <= window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good() -> Good {
        Good::new("Lamp", "A desk lamp", 1000, 5, "lamp.png")
    }

    #[test]
    fn snapshot_freezes_price() {
        let mut g = good();
        let p = Purchase::snapshot(UserId::generate(), &g, 3, Utc::now());
        g.price_cents = 9999;
        assert_eq!(p.price_cents, 1000);
        assert_eq!(p.total_cents(), 3000);
    }

    #[test]
    fn eligible_inside_window() {
        let now = Utc::now();
        let mut p = Purchase::snapshot(UserId::generate(), &good(), 1, now);
        p.created_at = now - Duration::minutes(29);
        assert!(p.refund_eligible(now, Duration::minutes(30)));
    }

    #[test]
    fn eligible_exactly_at_window_edge() {
        let now = Utc::now();
        let mut p = Purchase::snapshot(UserId::generate(), &good(), 1, now);
        p.created_at = now - Duration::minutes(30);
        assert!(p.refund_eligible(now, Duration::minutes(30)));
    }

    #[test]
    fn expired_after_window() {
        let now = Utc::now();
        let mut p = Purchase::snapshot(UserId::generate(), &good(), 1, now);
        p.created_at = now - Duration::minutes(31);
        assert!(!p.refund_eligible(now, Duration::minutes(30)));
    }
}
