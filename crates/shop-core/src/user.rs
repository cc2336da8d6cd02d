//! Shop users and their wallets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A shop user with an internal spendable balance.
///
/// The wallet is debited by purchases and credited by refund approvals; it
/// must never go negative. `is_admin` is the capability bit checked before
/// every administrative operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// Wallet balance in cents. Never negative.
    pub wallet_cents: i64,

    /// Whether this user may perform admin operations.
    pub is_admin: bool,

    /// When the user was created.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given starting wallet.
    #[must_use]
    pub fn new(id: UserId, wallet_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            wallet_cents,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new admin user.
    #[must_use]
    pub fn new_admin(id: UserId) -> Self {
        let mut user = Self::new(id, 0);
        user.is_admin = true;
        user
    }

    /// Check the wallet covers a required amount.
    #[must_use]
    pub const fn can_afford(&self, amount_cents: i64) -> bool {
        self.wallet_cents >= amount_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_not_admin() {
        let user = User::new(UserId::generate(), 10_000);
        assert!(!user.is_admin);
        assert_eq!(user.wallet_cents, 10_000);
    }

    #[test]
    fn can_afford_boundary() {
        let user = User::new(UserId::generate(), 1000);
        assert!(user.can_afford(999));
        assert!(user.can_afford(1000));
        assert!(!user.can_afford(1001));
    }
}
