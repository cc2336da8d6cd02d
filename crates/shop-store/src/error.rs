//! Error types for shop storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("user", "good", "purchase", "refund").
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A wallet debit would take the balance below zero.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in cents.
        balance: i64,
        /// Required amount in cents.
        required: i64,
    },

    /// A stock decrement would take the count below zero.
    #[error("insufficient stock: in_stock={in_stock}, requested={requested}")]
    InsufficientStock {
        /// Units currently in stock.
        in_stock: u32,
        /// Units requested.
        requested: u32,
    },

    /// A refund already exists for the purchase.
    #[error("refund already exists for purchase {purchase_id}")]
    RefundExists {
        /// The purchase that already has a refund.
        purchase_id: String,
    },
}

impl StoreError {
    /// Build a `NotFound` error for an entity kind and id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
