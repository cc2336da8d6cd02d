//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use shop_engine::EngineError;
use shop_store::StoreError;

/// API error type.
///
/// Business-rule failures carry the user-facing message; internal errors
/// are logged and surfaced as a generic body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid credentials.
    #[error("only logged users can buy")]
    Unauthorized,

    /// Valid credentials but no admin capability.
    #[error("administrator access required")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The wallet does not cover the purchase.
    #[error("you don't have enough money for this purchase")]
    InsufficientFunds {
        /// Current balance in cents.
        balance: i64,
        /// Required amount in cents.
        required: i64,
    },

    /// Not enough goods in stock.
    #[error("we don't have enough goods in stock")]
    InsufficientStock {
        /// Units in stock.
        in_stock: u32,
        /// Units requested.
        requested: u32,
    },

    /// The refund window has passed.
    #[error("your refund time has been expired")]
    RefundWindowExpired,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InsufficientFunds { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_funds",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::InsufficientStock { in_stock, requested } => (
                StatusCode::CONFLICT,
                "insufficient_stock",
                self.to_string(),
                Some(serde_json::json!({
                    "in_stock": in_stock,
                    "requested": requested
                })),
            ),
            Self::RefundWindowExpired => (
                StatusCode::GONE,
                "refund_window_expired",
                self.to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unauthenticated => Self::Unauthorized,
            EngineError::Forbidden => Self::Forbidden,
            EngineError::InvalidQuantity => Self::BadRequest("quantity must be positive".into()),
            EngineError::AmountOverflow => {
                Self::BadRequest("purchase total is too large".into())
            }
            EngineError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            EngineError::InsufficientStock { in_stock, requested } => {
                Self::InsufficientStock { in_stock, requested }
            }
            EngineError::RefundWindowExpired => Self::RefundWindowExpired,
            EngineError::NotFound { entity, id } => Self::NotFound(format!("{entity}: {id}")),
            EngineError::Store(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::from(EngineError::from(err))
    }
}
