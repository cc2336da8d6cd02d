//! Settlement engine errors.

use shop_store::StoreError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by settlement operations.
///
/// Business-rule failures (funds, stock, refund window) are recoverable and
/// map to user-facing messages at the request boundary; `Store` wraps
/// everything that should be treated as an internal error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The caller is not logged in.
    #[error("only logged users can buy")]
    Unauthenticated,

    /// The caller lacks the admin capability.
    #[error("administrator access required")]
    Forbidden,

    /// Quantity must be a positive integer.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The purchase total does not fit in cents.
    #[error("purchase total is too large")]
    AmountOverflow,

    /// The wallet does not cover the purchase amount.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current wallet balance in cents.
        balance: i64,
        /// Purchase amount in cents.
        required: i64,
    },

    /// Not enough units in stock.
    #[error("insufficient stock: in_stock={in_stock}, requested={requested}")]
    InsufficientStock {
        /// Units currently in stock.
        in_stock: u32,
        /// Units requested.
        requested: u32,
    },

    /// The refund window for the purchase has passed.
    #[error("refund window expired")]
    RefundWindowExpired,

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// Storage failure (internal).
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl EngineError {
    /// Build a `NotFound` error for an entity kind and id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for EngineError {
    /// Guard failures raced inside the store map back to the same
    /// business-rule variants the engine pre-checks produce.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            StoreError::InsufficientStock { in_stock, requested } => {
                Self::InsufficientStock { in_stock, requested }
            }
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Store(other),
        }
    }
}
