//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                     │
//! │  ├── CoreError        - Cart and order-number rule violations           │
//! │  ├── ValidationError  - One field-scoped checkout message               │
//! │  └── FieldErrors      - Ordered list of ValidationErrors                │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── CheckoutError    - Checkout transaction outcome                    │
//! │                                                                         │
//! │  app errors                                                             │
//! │  └── ApiError         - What the caller sees (serialized)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the cart and order-number code.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The row id is not in the cart.
    #[error("Cart row not found: {0}")]
    CartRowNotFound(String),

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity outside 1..=max.
    #[error("Quantity {requested} must be between 1 and {max}")]
    InvalidQuantity { requested: i64, max: i64 },

    /// An order number does not belong to the expected prefix/period.
    #[error("Order number '{code}' does not match '{stem}<N>'")]
    MalformedOrderNumber { code: String, stem: String },

    /// Order prefix is empty or contains characters that would break parsing.
    #[error("Invalid order prefix '{0}': must be non-empty ASCII letters or digits")]
    InvalidOrderPrefix(String),

    /// Payment method is not one of the accepted wire values.
    #[error("Unknown payment method '{0}'")]
    InvalidPaymentMethod(String),

    /// Unit price is negative or above the ceiling that keeps totals in range.
    #[error("Price of {cents} cents is outside 0..={max}")]
    PriceOutOfRange { cents: i64, max: i64 },
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-scoped validation failure.
///
/// `Display` yields the human-readable message shown next to the form field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Form field name (`billing_email`, `total_amount`, ...).
    pub field: String,
    /// Message for the end user.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every validation failure for one form, in field declaration order.
///
/// `Display` joins the messages with a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("{}", self.messages().join(" "))]
#[serde(transparent)]
pub struct FieldErrors(Vec<ValidationError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.message.clone()).collect()
    }

    /// Messages for one field, in order.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}


impl IntoIterator for FieldErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
