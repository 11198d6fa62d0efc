//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Caller                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  add_to_cart(42, 1)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Cart Error? ─────── CoreError::InvalidQuantity ── ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Product not found." }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout does not use this type for its outcome: a rejected checkout is a
//! normal response carrying the form errors (see `commands::checkout`).

use serde::Serialize;
use storefront_core::{CoreError, FieldErrors};
use storefront_db::{CheckoutError, DbError};

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found."
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Caller must sign in first (401)
    Unauthenticated,

    /// Internal server error (500)
    Internal,

    /// Cart operation failed
    CartError,

    /// Wishlist operation failed
    WishlistError,

    /// Checkout did not produce an order
    CheckoutFailed,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn wishlist(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::WishlistError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid value")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Domain(e) => ApiError::from(e),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CartRowNotFound(_) => ApiError::cart("Unable to remove item."),
            CoreError::CartTooLarge { .. }
            | CoreError::InvalidQuantity { .. }
            | CoreError::PriceOutOfRange { .. } => ApiError::cart(err.to_string()),
            CoreError::MalformedOrderNumber { .. }
            | CoreError::InvalidOrderPrefix(_)
            | CoreError::InvalidPaymentMethod(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// The underlying cause is logged where the checkout failed; only the
/// customer-facing message travels on.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let code = match err {
            CheckoutError::EmptyCart => ErrorCode::CartError,
            CheckoutError::ShippingNotFound(_) => ErrorCode::ValidationError,
            CheckoutError::OrderNumberConflict(_) | CheckoutError::Storage(_) => {
                ErrorCode::CheckoutFailed
            }
        };
        ApiError::new(code, err.user_message())
    }
}

/// All field messages, one per line.
impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation(errors.messages().join("\n"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Product not found.");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found.");
    }

    #[test]
    fn test_checkout_storage_failure_is_generic() {
        let err = ApiError::from(CheckoutError::Storage(DbError::Internal(
            "disk I/O error".to_string(),
        )));
        assert_eq!(err.code, ErrorCode::CheckoutFailed);
        assert_eq!(err.message, "We could not place your order. Please try again.");
    }

    #[test]
    fn test_missing_cart_row() {
        let err = ApiError::from(CoreError::CartRowNotFound("abc".to_string()));
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.message, "Unable to remove item.");
    }

    #[test]
    fn test_price_and_payment_method_errors() {
        let err = ApiError::from(CoreError::PriceOutOfRange {
            cents: -5,
            max: storefront_core::MAX_UNIT_PRICE_CENTS,
        });
        assert_eq!(err.code, ErrorCode::CartError);

        let err = ApiError::from(CoreError::InvalidPaymentMethod("cheque".to_string()));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Unknown payment method 'cheque'");
    }
}
