//! Key encoding utilities for `RocksDB`.
//!
//! Primary records are keyed by their raw id bytes; index keys concatenate
//! the owning id with the record's ULID so scans come back time-ordered.

use shop_core::{GoodId, PurchaseId, RefundId, UserId};

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a good key from a good ID.
#[must_use]
pub fn good_key(good_id: &GoodId) -> Vec<u8> {
    good_id.to_bytes().to_vec()
}

/// Create a purchase key from a purchase ID.
#[must_use]
pub fn purchase_key(purchase_id: &PurchaseId) -> Vec<u8> {
    purchase_id.to_bytes().to_vec()
}

/// Create a refund key from a refund ID.
#[must_use]
pub fn refund_key(refund_id: &RefundId) -> Vec<u8> {
    refund_id.to_bytes().to_vec()
}

/// Create a user-purchase index key.
///
/// Format: `user_id (16 bytes) || purchase_id (16 bytes)`
///
/// Since ULIDs are time-ordered, a user's purchases scan chronologically.
#[must_use]
pub fn user_purchase_key(user_id: &UserId, purchase_id: &PurchaseId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&purchase_id.to_bytes());
    key
}

/// Create a prefix for iterating all purchases for a user.
#[must_use]
pub fn user_purchases_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the purchase ID from a user-purchase index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_purchase_id_from_user_key(key: &[u8]) -> PurchaseId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    PurchaseId::from_bytes(bytes)
}

/// Create a refund-by-purchase index key.
#[must_use]
pub fn refund_by_purchase_key(purchase_id: &PurchaseId) -> Vec<u8> {
    purchase_id.to_bytes().to_vec()
}
