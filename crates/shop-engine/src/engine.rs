//! The settlement engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use shop_core::{
    GoodId, Purchase, PurchaseId, Refund, RefundDecision, RefundId, SettlementConfig, User, UserId,
};
use shop_store::{Settlement, Store};

use crate::error::{EngineError, Result};

/// Executes purchases and the refund lifecycle against a [`Store`].
///
/// Precondition checks run first to produce ordered, user-facing errors;
/// the same guards are re-evaluated atomically inside [`Store::apply`], so a
/// concurrent purchase racing for the last unit fails cleanly instead of
/// overselling.
pub struct SettlementEngine {
    store: Arc<dyn Store>,
    config: SettlementConfig,
}

/// Outcome of a bulk refund resolution.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BulkReport {
    /// Refunds resolved with the requested decision.
    pub resolved: usize,
    /// Refunds that failed and were skipped.
    pub failed: usize,
}

impl SettlementEngine {
    /// Create an engine over a store with the given settlement constants.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: SettlementConfig) -> Self {
        Self { store, config }
    }

    /// The settlement configuration in force.
    #[must_use]
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Require the admin capability on a user.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Forbidden` for non-admin users.
    pub fn ensure_admin(user: &User) -> Result<()> {
        if user.is_admin {
            Ok(())
        } else {
            Err(EngineError::Forbidden)
        }
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Execute a purchase: debit the wallet, decrement stock, and record a
    /// price/quantity snapshot, all in one atomic settlement.
    ///
    /// `actor` is `None` for anonymous callers. Preconditions are checked in
    /// order: authentication, positive quantity, sufficient funds, then
    /// sufficient stock.
    ///
    /// After the settlement commits, the replenishment hook restocks the
    /// good if the sale emptied it. Hook failure is logged and does not
    /// fail the purchase.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `InvalidQuantity`, `AmountOverflow`, `NotFound`,
    /// `InsufficientFunds`, or `InsufficientStock`; `Store` on backend
    /// failure. On any error no state has changed.
    pub fn purchase(
        &self,
        actor: Option<UserId>,
        good_id: &GoodId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Purchase> {
        let user_id = actor.ok_or(EngineError::Unauthenticated)?;
        if quantity == 0 {
            return Err(EngineError::InvalidQuantity);
        }

        let user = self
            .store
            .get_user(&user_id)?
            .ok_or_else(|| EngineError::not_found("user", user_id))?;
        let good = self
            .store
            .get_good(good_id)?
            .ok_or_else(|| EngineError::not_found("good", good_id))?;

        let amount_cents = good
            .total_cents(quantity)
            .ok_or(EngineError::AmountOverflow)?;
        if !user.can_afford(amount_cents) {
            return Err(EngineError::InsufficientFunds {
                balance: user.wallet_cents,
                required: amount_cents,
            });
        }
        if !good.has_stock(quantity) {
            return Err(EngineError::InsufficientStock {
                in_stock: good.in_stock,
                requested: quantity,
            });
        }

        let purchase = Purchase::snapshot(user_id, &good, quantity, now);
        self.store.apply(
            &Settlement::new()
                .debit_wallet(user_id, amount_cents)
                .adjust_stock(good.id, -i64::from(quantity))
                .insert_purchase(purchase.clone()),
        )?;

        tracing::info!(
            user_id = %user_id,
            good_id = %good.id,
            quantity = %quantity,
            amount_cents = %amount_cents,
            purchase_id = %purchase.id,
            "Purchase settled"
        );

        self.replenish_if_empty(good_id);

        Ok(purchase)
    }

    /// Post-commit hook: reset stock to the configured restock quantity
    /// when a sale has emptied the shelf. Runs outside the purchase
    /// settlement, so its failure never rolls back the purchase.
    fn replenish_if_empty(&self, good_id: &GoodId) {
        match self.store.get_good(good_id) {
            Ok(Some(mut good)) if good.in_stock < 1 => {
                good.in_stock = self.config.restock_quantity;
                good.updated_at = Utc::now();
                match self.store.put_good(&good) {
                    Ok(()) => tracing::info!(
                        good_id = %good.id,
                        restock_quantity = %self.config.restock_quantity,
                        "Good sold out, stock replenished"
                    ),
                    Err(error) => tracing::warn!(
                        good_id = %good.id,
                        %error,
                        "Replenishment after sell-out failed"
                    ),
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%good_id, %error, "Replenishment check failed");
            }
        }
    }

    // =========================================================================
    // Refund Lifecycle
    // =========================================================================

    /// Whether a purchase is still inside the refund window at `now`.
    ///
    /// Callers listing many purchases must pass the same `now` for each, so
    /// eligibility cannot flicker within one response.
    #[must_use]
    pub fn refund_eligible(&self, purchase: &Purchase, now: DateTime<Utc>) -> bool {
        purchase.refund_eligible(now, self.config.refund_window())
    }

    /// Request a refund for a purchase.
    ///
    /// Idempotent: a second request for the same purchase returns the
    /// existing refund rather than duplicating it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the purchase does not exist, `RefundWindowExpired`
    /// outside the window.
    pub fn request_refund(&self, purchase_id: &PurchaseId, now: DateTime<Utc>) -> Result<Refund> {
        let purchase = self
            .store
            .get_purchase(purchase_id)?
            .ok_or_else(|| EngineError::not_found("purchase", purchase_id))?;

        if !self.refund_eligible(&purchase, now) {
            return Err(EngineError::RefundWindowExpired);
        }

        if let Some(existing) = self.store.get_refund_by_purchase(purchase_id)? {
            return Ok(existing);
        }

        let refund = Refund::new(purchase.id, now);
        match self
            .store
            .apply(&Settlement::new().insert_refund(refund.clone()))
        {
            Ok(()) => {
                tracing::info!(
                    purchase_id = %purchase.id,
                    refund_id = %refund.id,
                    "Refund requested"
                );
                Ok(refund)
            }
            // Lost a race with a concurrent request for the same purchase:
            // return the winner's row.
            Err(shop_store::StoreError::RefundExists { .. }) => self
                .store
                .get_refund_by_purchase(purchase_id)?
                .ok_or_else(|| EngineError::not_found("refund", purchase_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve a single refund.
    ///
    /// Decline deletes the refund row only. Approve credits the wallet,
    /// restores stock, and deletes both the purchase and the refund rows,
    /// all in one atomic settlement.
    ///
    /// # Errors
    ///
    /// `NotFound` if the refund (or its purchase) is missing; `Store` on
    /// backend failure, in which case nothing has changed.
    pub fn resolve_refund(&self, refund_id: &RefundId, decision: RefundDecision) -> Result<()> {
        let refund = self
            .store
            .get_refund(refund_id)?
            .ok_or_else(|| EngineError::not_found("refund", refund_id))?;

        match decision {
            RefundDecision::Decline => {
                self.store
                    .apply(&Settlement::new().delete_refund(refund.id))?;
            }
            RefundDecision::Approve => {
                let purchase = self
                    .store
                    .get_purchase(&refund.purchase)?
                    .ok_or_else(|| EngineError::not_found("purchase", refund.purchase))?;

                self.store.apply(
                    &Settlement::new()
                        .credit_wallet(purchase.customer, purchase.total_cents())
                        .adjust_stock(purchase.good, i64::from(purchase.quantity))
                        .delete_purchase(purchase.id)
                        .delete_refund(refund.id),
                )?;
            }
        }

        tracing::info!(
            refund_id = %refund.id,
            purchase_id = %refund.purchase,
            decision = %decision,
            "Refund resolved"
        );
        Ok(())
    }

    /// Resolve every pending refund with one decision.
    ///
    /// The pending queue is snapshotted once, so no row is processed twice.
    /// Each item is its own atomic settlement; a failing item is logged,
    /// counted in the report, and skipped, never aborting the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pending queue cannot be listed.
    pub fn resolve_all(&self, decision: RefundDecision) -> Result<BulkReport> {
        let pending = self.store.list_refunds()?;
        let total = pending.len();
        let mut report = BulkReport::default();

        for refund in pending {
            match self.resolve_refund(&refund.id, decision) {
                Ok(()) => report.resolved += 1,
                Err(error) => {
                    tracing::warn!(
                        refund_id = %refund.id,
                        %error,
                        "Bulk refund item failed, skipping"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            decision = %decision,
            total = %total,
            resolved = %report.resolved,
            failed = %report.failed,
            "Bulk refund resolution finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shop_core::Good;
    use shop_store::MemoryStore;

    struct Fixture {
        engine: SettlementEngine,
        store: Arc<MemoryStore>,
        user: User,
        good: Good,
    }

    /// wallet=100.00, price=10.00, in_stock=5 — the canonical scenario.
    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = User::new(UserId::generate(), 10_000);
        let good = Good::new("Lamp", "A desk lamp", 1000, 5, "lamp.png");
        store.put_user(&user).unwrap();
        store.put_good(&good).unwrap();

        let engine = SettlementEngine::new(
            Arc::clone(&store) as Arc<dyn Store>,
            SettlementConfig::default(),
        );
        Fixture { engine, store, user, good }
    }

    impl Fixture {
        fn wallet(&self) -> i64 {
            self.store.get_user(&self.user.id).unwrap().unwrap().wallet_cents
        }

        fn stock(&self) -> u32 {
            self.store.get_good(&self.good.id).unwrap().unwrap().in_stock
        }
    }

    #[test]
    fn purchase_debits_wallet_and_decrements_stock() {
        let f = fixture();
        let purchase = f
            .engine
            .purchase(Some(f.user.id), &f.good.id, 3, Utc::now())
            .unwrap();

        assert_eq!(f.wallet(), 7000);
        assert_eq!(f.stock(), 2);
        assert_eq!(purchase.price_cents, 1000);
        assert_eq!(purchase.quantity, 3);
        assert_eq!(purchase.total_cents(), 3000);
    }

    #[test]
    fn purchase_snapshot_survives_price_change() {
        let f = fixture();
        let purchase = f
            .engine
            .purchase(Some(f.user.id), &f.good.id, 1, Utc::now())
            .unwrap();

        let mut good = f.store.get_good(&f.good.id).unwrap().unwrap();
        good.price_cents = 5000;
        f.store.put_good(&good).unwrap();

        let stored = f.store.get_purchase(&purchase.id).unwrap().unwrap();
        assert_eq!(stored.price_cents, 1000);
    }

    #[test]
    fn anonymous_purchase_rejected() {
        let f = fixture();
        let err = f.engine.purchase(None, &f.good.id, 1, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Unauthenticated));
        assert_eq!(f.wallet(), 10_000);
        assert_eq!(f.stock(), 5);
    }

    #[test]
    fn zero_quantity_rejected() {
        let f = fixture();
        let err = f.engine.purchase(Some(f.user.id), &f.good.id, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity));
    }

    #[test]
    fn insufficient_funds_leaves_state_untouched() {
        let f = fixture();
        // 11 x 10.00 = 110.00 > 100.00 wallet; funds are checked before stock.
        let err = f
            .engine
            .purchase(Some(f.user.id), &f.good.id, 11, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientFunds { balance: 10_000, required: 11_000 }
        ));
        assert_eq!(f.wallet(), 10_000);
        assert_eq!(f.stock(), 5);
    }

    #[test]
    fn insufficient_stock_leaves_state_untouched() {
        let f = fixture();
        let err = f
            .engine
            .purchase(Some(f.user.id), &f.good.id, 6, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientStock { in_stock: 5, requested: 6 }
        ));
        assert_eq!(f.wallet(), 10_000);
        assert_eq!(f.stock(), 5);
    }

    #[test]
    fn oversized_total_is_rejected_not_wrapped() {
        let f = fixture();
        // price * quantity would exceed i64; a wrapped product would turn
        // the debit into a credit, so the purchase must fail up front.
        let mut good = f.store.get_good(&f.good.id).unwrap().unwrap();
        good.price_cents = 1 << 33;
        good.in_stock = u32::MAX;
        f.store.put_good(&good).unwrap();

        let err = f
            .engine
            .purchase(Some(f.user.id), &f.good.id, 1 << 30, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::AmountOverflow));
        assert_eq!(f.wallet(), 10_000);
        assert!(f.store.list_purchases_by_user(&f.user.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_good_is_not_found() {
        let f = fixture();
        let err = f
            .engine
            .purchase(Some(f.user.id), &GoodId::generate(), 1, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "good", .. }));
    }

    #[test]
    fn sell_out_triggers_replenishment() {
        let f = fixture();
        // 3 then 2: the second purchase empties the shelf and the hook
        // resets stock to the configured constant.
        f.engine.purchase(Some(f.user.id), &f.good.id, 3, Utc::now()).unwrap();
        assert_eq!(f.wallet(), 7000);
        assert_eq!(f.stock(), 2);

        f.engine.purchase(Some(f.user.id), &f.good.id, 2, Utc::now()).unwrap();
        assert_eq!(f.wallet(), 5000);
        assert_eq!(f.stock(), 12);
    }

    #[test]
    fn repeated_sell_outs_reset_not_compound() {
        let f = fixture();
        f.engine.purchase(Some(f.user.id), &f.good.id, 5, Utc::now()).unwrap();
        assert_eq!(f.stock(), 12);

        // Wallet is 5000 now; 5 more units cost exactly that.
        f.engine.purchase(Some(f.user.id), &f.good.id, 5, Utc::now()).unwrap();
        assert_eq!(f.stock(), 7);
    }

    #[test]
    fn refund_request_inside_window() {
        let f = fixture();
        let now = Utc::now();
        let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();

        let refund = f.engine.request_refund(&purchase.id, now).unwrap();
        assert_eq!(refund.purchase, purchase.id);
    }

    #[test]
    fn refund_request_is_idempotent() {
        let f = fixture();
        let now = Utc::now();
        let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();

        let first = f.engine.request_refund(&purchase.id, now).unwrap();
        let second = f.engine.request_refund(&purchase.id, now).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(f.store.list_refunds().unwrap().len(), 1);
    }

    #[test]
    fn refund_request_after_window_expires() {
        let f = fixture();
        let now = Utc::now();
        let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();

        // Purchase made 31 minutes ago against a 30-minute window.
        let later = now + Duration::minutes(31);
        let err = f.engine.request_refund(&purchase.id, later).unwrap_err();
        assert!(matches!(err, EngineError::RefundWindowExpired));
        assert!(f.store.list_refunds().unwrap().is_empty());
    }

    #[test]
    fn approve_reverses_purchase() {
        let f = fixture();
        let now = Utc::now();
        let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 3, now).unwrap();
        let refund = f.engine.request_refund(&purchase.id, now).unwrap();
        assert_eq!(f.wallet(), 7000);
        assert_eq!(f.stock(), 2);

        f.engine.resolve_refund(&refund.id, RefundDecision::Approve).unwrap();

        assert_eq!(f.wallet(), 10_000);
        assert_eq!(f.stock(), 5);
        assert!(f.store.get_purchase(&purchase.id).unwrap().is_none());
        assert!(f.store.get_refund(&refund.id).unwrap().is_none());
    }

    #[test]
    fn decline_deletes_only_the_refund() {
        let f = fixture();
        let now = Utc::now();
        let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 3, now).unwrap();
        let refund = f.engine.request_refund(&purchase.id, now).unwrap();

        f.engine.resolve_refund(&refund.id, RefundDecision::Decline).unwrap();

        assert_eq!(f.wallet(), 7000);
        assert_eq!(f.stock(), 2);
        assert!(f.store.get_purchase(&purchase.id).unwrap().is_some());
        assert!(f.store.get_refund(&refund.id).unwrap().is_none());
    }

    #[test]
    fn resolve_missing_refund_is_not_found() {
        let f = fixture();
        let err = f
            .engine
            .resolve_refund(&RefundId::generate(), RefundDecision::Approve)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "refund", .. }));
    }

    #[test]
    fn resolve_all_approves_every_pending_refund() {
        let f = fixture();
        let now = Utc::now();
        for _ in 0..3 {
            let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();
            f.engine.request_refund(&purchase.id, now).unwrap();
        }

        let report = f.engine.resolve_all(RefundDecision::Approve).unwrap();
        assert_eq!(report.resolved, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(f.wallet(), 10_000);
        assert!(f.store.list_refunds().unwrap().is_empty());
    }

    #[test]
    fn resolve_all_declines_every_pending_refund() {
        let f = fixture();
        let now = Utc::now();
        let mut purchases = Vec::new();
        for _ in 0..2 {
            let purchase = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();
            f.engine.request_refund(&purchase.id, now).unwrap();
            purchases.push(purchase);
        }

        let report = f.engine.resolve_all(RefundDecision::Decline).unwrap();
        assert_eq!(report.resolved, 2);
        assert!(f.store.list_refunds().unwrap().is_empty());
        for purchase in &purchases {
            assert!(f.store.get_purchase(&purchase.id).unwrap().is_some());
        }
    }

    #[test]
    fn resolve_all_isolates_a_failing_item() {
        let f = fixture();
        let now = Utc::now();
        let healthy = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();
        f.engine.request_refund(&healthy.id, now).unwrap();

        let broken = f.engine.purchase(Some(f.user.id), &f.good.id, 1, now).unwrap();
        let broken_refund = f.engine.request_refund(&broken.id, now).unwrap();
        // Orphan the second refund by removing its purchase out-of-band.
        f.store
            .apply(&Settlement::new().delete_purchase(broken.id))
            .unwrap();

        let report = f.engine.resolve_all(RefundDecision::Approve).unwrap();
        assert_eq!(report.resolved, 1);
        assert_eq!(report.failed, 1);

        // The healthy item was fully approved despite the broken one.
        assert!(f.store.get_purchase(&healthy.id).unwrap().is_none());
        assert!(f.store.get_refund(&broken_refund.id).unwrap().is_some());
    }

    #[test]
    fn ensure_admin_gates_on_capability() {
        let admin = User::new_admin(UserId::generate());
        let user = User::new(UserId::generate(), 0);
        assert!(SettlementEngine::ensure_admin(&admin).is_ok());
        assert!(matches!(
            SettlementEngine::ensure_admin(&user),
            Err(EngineError::Forbidden)
        ));
    }
}
