//! In-memory storage implementation.
//!
//! The default backend: a `RwLock` over plain maps. [`MemoryStore::apply`]
//! holds the write lock for the whole validate-then-mutate sequence, which
//! makes every settlement serializable with respect to every other.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use shop_core::{Good, GoodId, Purchase, PurchaseId, Refund, RefundId, User, UserId};

use crate::error::{Result, StoreError};
use crate::settlement::{Settlement, SettlementOp};
use crate::Store;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    // BTreeMaps keyed by ULID iterate in chronological order.
    goods: BTreeMap<GoodId, Good>,
    purchases: BTreeMap<PurchaseId, Purchase>,
    refunds: BTreeMap<RefundId, Refund>,
    refunds_by_purchase: HashMap<PurchaseId, RefundId>,
}

/// Settlement staging area, holding only the records the batch touches.
///
/// Reads go through the staged maps first so ops within one settlement see
/// each other's effects; on full success everything is flushed into the
/// live maps under the same write lock.
#[derive(Default)]
struct Staged {
    users: HashMap<UserId, User>,
    goods: HashMap<GoodId, Good>,
    inserted_purchases: Vec<Purchase>,
    deleted_purchases: Vec<PurchaseId>,
    inserted_refunds: Vec<Refund>,
    deleted_refunds: Vec<Refund>,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        // Lock poisoning only happens if another thread panicked while
        // writing; the data is plain maps, so continue with it.
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Inner {
    fn staged_user(&self, staged: &Staged, user_id: &UserId) -> Result<User> {
        if let Some(user) = staged.users.get(user_id) {
            return Ok(user.clone());
        }
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    fn staged_good(&self, staged: &Staged, good_id: &GoodId) -> Result<Good> {
        if let Some(good) = staged.goods.get(good_id) {
            return Ok(good.clone());
        }
        self.goods
            .get(good_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("good", good_id))
    }

    /// Validate one operation against the live state plus earlier staged
    /// ops, recording its effect in `staged`. Nothing is applied yet.
    fn stage_op(&self, staged: &mut Staged, op: &SettlementOp) -> Result<()> {
        match op {
            SettlementOp::DebitWallet { user, amount_cents } => {
                let mut record = self.staged_user(staged, user)?;
                if record.wallet_cents < *amount_cents {
                    return Err(StoreError::InsufficientFunds {
                        balance: record.wallet_cents,
                        required: *amount_cents,
                    });
                }
                record.wallet_cents -= amount_cents;
                record.updated_at = chrono::Utc::now();
                staged.users.insert(*user, record);
            }
            SettlementOp::CreditWallet { user, amount_cents } => {
                let mut record = self.staged_user(staged, user)?;
                record.wallet_cents += amount_cents;
                record.updated_at = chrono::Utc::now();
                staged.users.insert(*user, record);
            }
            SettlementOp::AdjustStock { good, delta } => {
                let mut record = self.staged_good(staged, good)?;
                let next = i64::from(record.in_stock) + delta;
                let Ok(next) = u32::try_from(next) else {
                    return Err(StoreError::InsufficientStock {
                        in_stock: record.in_stock,
                        requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
                    });
                };
                record.in_stock = next;
                record.updated_at = chrono::Utc::now();
                staged.goods.insert(*good, record);
            }
            SettlementOp::InsertPurchase(purchase) => {
                staged.inserted_purchases.push(purchase.clone());
            }
            SettlementOp::DeletePurchase(id) => {
                if !self.purchases.contains_key(id) {
                    return Err(StoreError::not_found("purchase", id));
                }
                staged.deleted_purchases.push(*id);
            }
            SettlementOp::InsertRefund(refund) => {
                let already_staged = staged
                    .inserted_refunds
                    .iter()
                    .any(|r| r.purchase == refund.purchase);
                if already_staged || self.refunds_by_purchase.contains_key(&refund.purchase) {
                    return Err(StoreError::RefundExists {
                        purchase_id: refund.purchase.to_string(),
                    });
                }
                staged.inserted_refunds.push(refund.clone());
            }
            SettlementOp::DeleteRefund(id) => {
                let refund = self
                    .refunds
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::not_found("refund", id))?;
                staged.deleted_refunds.push(refund);
            }
        }
        Ok(())
    }

    /// Flush a fully validated staging area into the live maps.
    fn commit(&mut self, staged: Staged) {
        for (id, user) in staged.users {
            self.users.insert(id, user);
        }
        for (id, good) in staged.goods {
            self.goods.insert(id, good);
        }
        for purchase in staged.inserted_purchases {
            self.purchases.insert(purchase.id, purchase);
        }
        for id in staged.deleted_purchases {
            self.purchases.remove(&id);
        }
        for refund in staged.inserted_refunds {
            self.refunds_by_purchase.insert(refund.purchase, refund.id);
            self.refunds.insert(refund.id, refund);
        }
        for refund in staged.deleted_refunds {
            self.refunds.remove(&refund.id);
            self.refunds_by_purchase.remove(&refund.purchase);
        }
    }
}

impl Store for MemoryStore {
    fn put_user(&self, user: &User) -> Result<()> {
        self.write().users.insert(user.id, user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.read().users.get(user_id).cloned())
    }

    fn put_good(&self, good: &Good) -> Result<()> {
        self.write().goods.insert(good.id, good.clone());
        Ok(())
    }

    fn get_good(&self, good_id: &GoodId) -> Result<Option<Good>> {
        Ok(self.read().goods.get(good_id).cloned())
    }

    fn list_goods(&self) -> Result<Vec<Good>> {
        Ok(self.read().goods.values().cloned().collect())
    }

    fn get_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Purchase>> {
        Ok(self.read().purchases.get(purchase_id).cloned())
    }

    fn list_purchases_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>> {
        Ok(self
            .read()
            .purchases
            .values()
            .rev()
            .filter(|p| p.customer == *user_id)
            .cloned()
            .collect())
    }

    fn get_refund(&self, refund_id: &RefundId) -> Result<Option<Refund>> {
        Ok(self.read().refunds.get(refund_id).cloned())
    }

    fn get_refund_by_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Refund>> {
        let inner = self.read();
        Ok(inner
            .refunds_by_purchase
            .get(purchase_id)
            .and_then(|id| inner.refunds.get(id))
            .cloned())
    }

    fn list_refunds(&self) -> Result<Vec<Refund>> {
        Ok(self.read().refunds.values().cloned().collect())
    }

    fn apply(&self, settlement: &Settlement) -> Result<()> {
        let mut inner = self.write();

        // Stage every op first so a guard failure midway leaves nothing
        // applied; only the touched records are copied.
        let mut staged = Staged::default();
        for op in settlement.ops() {
            inner.stage_op(&mut staged, op)?;
        }

        inner.commit(staged);
        tracing::debug!(ops = settlement.ops().len(), "Settlement applied");
        Ok(())
    }
}
