//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store`
//! trait. Values are CBOR-encoded; settlements are staged in memory under a
//! store-level write lock and committed as a single `WriteBatch`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use shop_core::{Good, GoodId, Purchase, PurchaseId, Refund, RefundId, User, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::settlement::{Settlement, SettlementOp};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // RocksDB WriteBatch gives atomicity but not isolation; this lock
    // serializes the read-validate-write sequence of `apply`.
    settle_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            settle_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Settlement staging area.
///
/// Reads go through the staged maps first so ops within one settlement see
/// each other's effects; everything is flushed to one `WriteBatch` at the
/// end.
#[derive(Default)]
struct Staged {
    users: HashMap<UserId, User>,
    goods: HashMap<GoodId, Good>,
    inserted_purchases: Vec<Purchase>,
    deleted_purchases: Vec<Purchase>,
    inserted_refunds: Vec<Refund>,
    deleted_refunds: Vec<Refund>,
}

impl RocksStore {
    fn staged_user(&self, staged: &mut Staged, user_id: &UserId) -> Result<User> {
        if let Some(user) = staged.users.get(user_id) {
            return Ok(user.clone());
        }
        self.get_user(user_id)?
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    fn staged_good(&self, staged: &mut Staged, good_id: &GoodId) -> Result<Good> {
        if let Some(good) = staged.goods.get(good_id) {
            return Ok(good.clone());
        }
        self.get_good(good_id)?
            .ok_or_else(|| StoreError::not_found("good", good_id))
    }

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
                let purchase = self
                    .get_purchase(id)?
                    .ok_or_else(|| StoreError::not_found("purchase", id))?;
                staged.deleted_purchases.push(purchase);
            }
            SettlementOp::InsertRefund(refund) => {
                let already_staged = staged
                    .inserted_refunds
                    .iter()
                    .any(|r| r.purchase == refund.purchase);
                if already_staged || self.get_refund_by_purchase(&refund.purchase)?.is_some() {
                    return Err(StoreError::RefundExists {
                        purchase_id: refund.purchase.to_string(),
                    });
                }
                staged.inserted_refunds.push(refund.clone());
            }
            SettlementOp::DeleteRefund(id) => {
                let refund = self
                    .get_refund(id)?
                    .ok_or_else(|| StoreError::not_found("refund", id))?;
                staged.deleted_refunds.push(refund);
            }
        }
        Ok(())
    }

    fn commit(&self, staged: Staged) -> Result<()> {
        let cf_users = self.cf(cf::USERS)?;
        let cf_goods = self.cf(cf::GOODS)?;
        let cf_purchases = self.cf(cf::PURCHASES)?;
        let cf_by_user = self.cf(cf::PURCHASES_BY_USER)?;
        let cf_refunds = self.cf(cf::REFUNDS)?;
        let cf_by_purchase = self.cf(cf::REFUNDS_BY_PURCHASE)?;

        let mut batch = WriteBatch::default();

        for user in staged.users.values() {
            batch.put_cf(&cf_users, keys::user_key(&user.id), Self::serialize(user)?);
        }
        for good in staged.goods.values() {
            batch.put_cf(&cf_goods, keys::good_key(&good.id), Self::serialize(good)?);
        }
        for purchase in &staged.inserted_purchases {
            batch.put_cf(
                &cf_purchases,
                keys::purchase_key(&purchase.id),
                Self::serialize(purchase)?,
            );
            batch.put_cf(
                &cf_by_user,
                keys::user_purchase_key(&purchase.customer, &purchase.id),
                [],
            );
        }
        for purchase in &staged.deleted_purchases {
            batch.delete_cf(&cf_purchases, keys::purchase_key(&purchase.id));
            batch.delete_cf(
                &cf_by_user,
                keys::user_purchase_key(&purchase.customer, &purchase.id),
            );
        }
        for refund in &staged.inserted_refunds {
            batch.put_cf(
                &cf_refunds,
                keys::refund_key(&refund.id),
                Self::serialize(refund)?,
            );
            batch.put_cf(
                &cf_by_purchase,
                keys::refund_by_purchase_key(&refund.purchase),
                refund.id.to_bytes(),
            );
        }
        for refund in &staged.deleted_refunds {
            batch.delete_cf(&cf_refunds, keys::refund_key(&refund.id));
            batch.delete_cf(
                &cf_by_purchase,
                keys::refund_by_purchase_key(&refund.purchase),
            );
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    fn put_user(&self, user: &User) -> Result<()> {
        let cf = self.cf(cf::USERS)?;
        self.db
            .put_cf(&cf, keys::user_key(&user.id), Self::serialize(user)?)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let cf = self.cf(cf::USERS)?;
        self.db
            .get_cf(&cf, keys::user_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_good(&self, good: &Good) -> Result<()> {
        let cf = self.cf(cf::GOODS)?;
        self.db
            .put_cf(&cf, keys::good_key(&good.id), Self::serialize(good)?)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_good(&self, good_id: &GoodId) -> Result<Option<Good>> {
        let cf = self.cf(cf::GOODS)?;
        self.db
            .get_cf(&cf, keys::good_key(good_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_goods(&self) -> Result<Vec<Good>> {
        let cf = self.cf(cf::GOODS)?;
        let mut goods = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            goods.push(Self::deserialize(&value)?);
        }
        Ok(goods)
    }

    fn get_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Purchase>> {
        let cf = self.cf(cf::PURCHASES)?;
        self.db
            .get_cf(&cf, keys::purchase_key(purchase_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_purchases_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>> {
        let cf_by_user = self.cf(cf::PURCHASES_BY_USER)?;
        let prefix = keys::user_purchases_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect matching index keys, then reverse for newest-first.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut purchases = Vec::new();
        for key in all_keys {
            let purchase_id = keys::extract_purchase_id_from_user_key(&key);
            if let Some(purchase) = self.get_purchase(&purchase_id)? {
                purchases.push(purchase);
            }
        }
        Ok(purchases)
    }

    fn get_refund(&self, refund_id: &RefundId) -> Result<Option<Refund>> {
        let cf = self.cf(cf::REFUNDS)?;
        self.db
            .get_cf(&cf, keys::refund_key(refund_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_refund_by_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Refund>> {
        let cf = self.cf(cf::REFUNDS_BY_PURCHASE)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf, keys::refund_by_purchase_key(purchase_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut bytes = [0u8; 16];
        if id_bytes.len() != 16 {
            return Err(StoreError::Serialization(
                "malformed refund index entry".into(),
            ));
        }
        bytes.copy_from_slice(&id_bytes);
        self.get_refund(&RefundId::from_bytes(bytes))
    }

    fn list_refunds(&self) -> Result<Vec<Refund>> {
        let cf = self.cf(cf::REFUNDS)?;
        let mut refunds = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            refunds.push(Self::deserialize(&value)?);
        }
        Ok(refunds)
    }

    fn apply(&self, settlement: &Settlement) -> Result<()> {
        let _guard = self
            .settle_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut staged = Staged::default();
        for op in settlement.ops() {
            self.stage_op(&mut staged, op)?;
        }
        self.commit(staged)
    }
}
