//! Storage layer for the shop settlement service.
//!
//! This crate provides persistent storage for users, goods, purchases, and
//! refunds, behind a backend-agnostic [`Store`] trait.
//!
//! # Atomicity
//!
//! All money/stock state transitions go through [`Store::apply`] with a
//! [`Settlement`] batch. A backend must apply the batch all-or-nothing and
//! serialize concurrent batches, so invariants like "wallet never negative"
//! and "no oversell of the last unit" hold under concurrent requests.
//!
//! # Backends
//!
//! - [`MemoryStore`]: `RwLock`-guarded maps. The default backend and the one
//!   used by tests.
//! - `RocksStore` (feature `rocksdb-backend`): `RocksDB` with column
//!   families and CBOR-encoded values.
//!
//! # Example
//!
//! ```
//! use shop_store::{MemoryStore, Settlement, Store};
//! use shop_core::{Good, User, UserId};
//!
//! let store = MemoryStore::new();
//!
//! let user = User::new(UserId::generate(), 10_000);
//! store.put_user(&user).unwrap();
//!
//! let good = Good::new("Lamp", "A desk lamp", 1000, 5, "lamp.png");
//! store.put_good(&good).unwrap();
//!
//! let settlement = Settlement::new()
//!     .debit_wallet(user.id, 3000)
//!     .adjust_stock(good.id, -3);
//! store.apply(&settlement).unwrap();
//!
//! assert_eq!(store.get_user(&user.id).unwrap().unwrap().wallet_cents, 7000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;
pub mod settlement;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;
pub use settlement::{Settlement, SettlementOp};

use shop_core::{Good, GoodId, Purchase, PurchaseId, Refund, RefundId, User, UserId};

/// The storage trait defining all database operations.
///
/// Reads are point lookups and listings; every write that must be atomic
/// goes through [`Store::apply`].
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or update a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    // =========================================================================
    // Good Operations
    // =========================================================================

    /// Insert or update a good record (direct overwrite, used by admin edits
    /// and the replenishment hook).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_good(&self, good: &Good) -> Result<()>;

    /// Get a good by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_good(&self, good_id: &GoodId) -> Result<Option<Good>>;

    /// List all goods, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_goods(&self) -> Result<Vec<Good>>;

    // =========================================================================
    // Purchase Operations
    // =========================================================================

    /// Get a purchase by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Purchase>>;

    /// List a user's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_purchases_by_user(&self, user_id: &UserId) -> Result<Vec<Purchase>>;

    // =========================================================================
    // Refund Operations
    // =========================================================================

    /// Get a refund by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_refund(&self, refund_id: &RefundId) -> Result<Option<Refund>>;

    /// Get the refund for a purchase, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_refund_by_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Refund>>;

    /// List all pending refunds, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_refunds(&self) -> Result<Vec<Refund>>;

    // =========================================================================
    // Settlement
    // =========================================================================

    /// Apply a settlement batch atomically.
    ///
    /// All guards are re-evaluated inside the backend's write lock; if any
    /// guard or lookup fails, no operation in the batch is applied.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InsufficientFunds`, `InsufficientStock`, or
    /// `RefundExists` when a guard fails, `NotFound` when a referenced
    /// record is missing, or a database error.
    fn apply(&self, settlement: &Settlement) -> Result<()>;
}
