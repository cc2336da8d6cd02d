//! Settlement configuration constants.

use chrono::Duration;

/// Constants governing purchase and refund settlement.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// How long after a purchase a refund may still be requested, in
    /// minutes.
    pub refund_window_minutes: i64,

    /// Stock quantity a good is reset to when a sale empties the shelf.
    pub restock_quantity: u32,

    /// Wallet balance granted to newly registered users, in cents.
    pub starting_wallet_cents: i64,
}

impl SettlementConfig {
    /// The refund window as a `chrono::Duration`.
    #[must_use]
    pub fn refund_window(&self) -> Duration {
        Duration::minutes(self.refund_window_minutes)
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            refund_window_minutes: 30,
            restock_quantity: 12,
            starting_wallet_cents: 10_000,
        }
    }
}
