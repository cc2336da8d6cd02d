//! Atomic settlement batches.
//!
//! A [`Settlement`] is the unit of atomicity for every state transition that
//! touches money, stock, or settlement rows. A backend applies all of its
//! operations or none of them, serialized against concurrent settlements, so
//! two purchases racing for the last unit of stock can never both succeed.

use shop_core::{GoodId, Purchase, PurchaseId, Refund, RefundId, UserId};

/// A single guarded mutation inside a settlement.
#[derive(Debug, Clone)]
pub enum SettlementOp {
    /// Debit a user's wallet. Guard: the balance must cover the amount.
    DebitWallet {
        /// The user to debit.
        user: UserId,
        /// Amount in cents, positive.
        amount_cents: i64,
    },

    /// Credit a user's wallet.
    CreditWallet {
        /// The user to credit.
        user: UserId,
        /// Amount in cents, positive.
        amount_cents: i64,
    },

    /// Adjust a good's stock by a signed delta. Guard: the resulting count
    /// must not be negative.
    AdjustStock {
        /// The good to adjust.
        good: GoodId,
        /// Signed unit delta.
        delta: i64,
    },

    /// Insert a purchase record.
    InsertPurchase(Purchase),

    /// Delete a purchase record.
    DeletePurchase(PurchaseId),

    /// Insert a refund request. Guard: no refund may already exist for the
    /// same purchase.
    InsertRefund(Refund),

    /// Delete a refund request.
    DeleteRefund(RefundId),
}

/// An ordered, all-or-nothing batch of settlement operations.
#[derive(Debug, Clone, Default)]
pub struct Settlement {
    ops: Vec<SettlementOp>,
}

impl Settlement {
    /// Create an empty settlement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a wallet debit.
    #[must_use]
    pub fn debit_wallet(mut self, user: UserId, amount_cents: i64) -> Self {
        self.ops.push(SettlementOp::DebitWallet { user, amount_cents });
        self
    }

    /// Append a wallet credit.
    #[must_use]
    pub fn credit_wallet(mut self, user: UserId, amount_cents: i64) -> Self {
        self.ops.push(SettlementOp::CreditWallet { user, amount_cents });
        self
    }

    /// Append a stock adjustment.
    #[must_use]
    pub fn adjust_stock(mut self, good: GoodId, delta: i64) -> Self {
        self.ops.push(SettlementOp::AdjustStock { good, delta });
        self
    }

    /// Append a purchase insert.
    #[must_use]
    pub fn insert_purchase(mut self, purchase: Purchase) -> Self {
        self.ops.push(SettlementOp::InsertPurchase(purchase));
        self
    }

    /// Append a purchase delete.
    #[must_use]
    pub fn delete_purchase(mut self, purchase: PurchaseId) -> Self {
        self.ops.push(SettlementOp::DeletePurchase(purchase));
        self
    }

    /// Append a refund insert.
    #[must_use]
    pub fn insert_refund(mut self, refund: Refund) -> Self {
        self.ops.push(SettlementOp::InsertRefund(refund));
        self
    }

    /// Append a refund delete.
    #[must_use]
    pub fn delete_refund(mut self, refund: RefundId) -> Self {
        self.ops.push(SettlementOp::DeleteRefund(refund));
        self
    }

    /// The operations in application order.
    #[must_use]
    pub fn ops(&self) -> &[SettlementOp] {
        &self.ops
    }

    /// Whether the settlement contains no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
