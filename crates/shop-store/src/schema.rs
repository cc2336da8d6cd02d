//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by `user_id` (UUID bytes).
    pub const USERS: &str = "users";

    /// Good records, keyed by `good_id` (ULID bytes).
    pub const GOODS: &str = "goods";

    /// Purchase records, keyed by `purchase_id` (ULID bytes).
    pub const PURCHASES: &str = "purchases";

    /// Index: purchases by customer, keyed by `user_id || purchase_id`.
    /// Value is empty (index only).
    pub const PURCHASES_BY_USER: &str = "purchases_by_user";

    /// Refund records, keyed by `refund_id` (ULID bytes).
    pub const REFUNDS: &str = "refunds";

    /// Index: refund by purchase, keyed by `purchase_id`, value is the
    /// refund id. Enforces the one-refund-per-purchase invariant.
    pub const REFUNDS_BY_PURCHASE: &str = "refunds_by_purchase";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::GOODS,
        cf::PURCHASES,
        cf::PURCHASES_BY_USER,
        cf::REFUNDS,
        cf::REFUNDS_BY_PURCHASE,
    ]
}
