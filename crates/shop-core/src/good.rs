//! Catalog goods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GoodId;

/// A purchasable catalog item.
///
/// Prices are integer cents; stock is a plain count. The `in_stock` field is
/// mutated by purchases (decrement), refund approvals (increment), admin
/// edits (overwrite), and the replenishment hook (reset to a constant when a
/// sale empties the shelf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Good {
    /// Unique good ID.
    pub id: GoodId,

    /// Display title.
    pub title: String,

    /// Longer description shown on the listing.
    pub description: String,

    /// Unit price in cents. Never negative.
    pub price_cents: i64,

    /// Units currently in stock. May be zero.
    pub in_stock: u32,

    /// Image URL or path.
    pub image: String,

    /// When the good was created.
    pub created_at: DateTime<Utc>,

    /// When the good was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Good {
    /// Create a new good.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
        in_stock: u32,
        image: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GoodId::generate(),
            title: title.into(),
            description: description.into(),
            price_cents,
            in_stock,
            image: image.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the good appears on the public listing.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock > 0
    }

    /// Whether the current stock covers a requested quantity.
    #[must_use]
    pub const fn has_stock(&self, quantity: u32) -> bool {
        self.in_stock >= quantity
    }

    /// Total price in cents for a quantity of this good, or `None` when the
    /// amount does not fit in cents.
    #[must_use]
    pub fn total_cents(&self, quantity: u32) -> Option<i64> {
        self.price_cents.checked_mul(i64::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_follows_stock() {
        let mut good = Good::new("Lamp", "A desk lamp", 1000, 3, "lamp.png");
        assert!(good.is_available());
        good.in_stock = 0;
        assert!(!good.is_available());
    }

    #[test]
    fn has_stock_boundary() {
        let good = Good::new("Lamp", "A desk lamp", 1000, 3, "lamp.png");
        assert!(good.has_stock(3));
        assert!(!good.has_stock(4));
    }

    #[test]
    fn total_is_price_times_quantity() {
        let good = Good::new("Lamp", "A desk lamp", 1000, 3, "lamp.png");
        assert_eq!(good.total_cents(3), Some(3000));
    }

    #[test]
    fn total_refuses_to_overflow() {
        let good = Good::new("Gold bar", "Solid", 1 << 33, u32::MAX, "bar.png");
        assert_eq!(good.total_cents(1 << 30), None);
    }
}
