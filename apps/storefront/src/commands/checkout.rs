//! # Checkout Commands
//!
//! Validates the checkout form and runs the checkout transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout_store                                  │
//! │                                                                         │
//! │  CheckoutInput ──► validate_checkout ──► Err(FieldErrors) ──► Rejected  │
//! │                          │                (every message, input kept)   │
//! │                          ▼                                              │
//! │                  CheckoutRequest { form, user_id }                      │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                  CheckoutService::checkout(cart)                        │
//! │                          │                                              │
//! │              ┌───────────┴────────────┐                                 │
//! │              ▼                        ▼                                 │
//! │     Ok(PlacedOrder)           Err(CheckoutError)                        │
//! │     cart cleared              cart untouched, nothing written          │
//! │              │                        │                                 │
//! │              ▼                        ▼                                 │
//! │         Confirmed             Rejected (one message, input kept)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use storefront_core::validation::validate_checkout;
use storefront_core::{CheckoutInput, CheckoutRequest, Order, OrderLineItem};

use crate::error::ApiError;
use crate::state::{CartState, DbState, Session, StoreConfig};

/// Outcome of a checkout submission.
///
/// A rejection is a normal response: the caller re-renders the form from
/// `input` and shows `errors`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutResponse {
    Confirmed {
        order_number: String,
        /// Confirmation page for the new order.
        redirect: String,
        message: String,
    },
    Rejected {
        errors: Vec<String>,
        input: CheckoutInput,
    },
}

impl CheckoutResponse {
    fn confirmed(order_number: String) -> Self {
        CheckoutResponse::Confirmed {
            redirect: format!("/checkout/success/{}", order_number),
            order_number,
            message: "Order placed successfully!".to_string(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, CheckoutResponse::Confirmed { .. })
    }
}

/// Places an order from the session cart.
///
/// ## Outcomes
/// - Invalid form → `Rejected` with every field message
/// - Empty cart, unknown shipping method, storage failure → `Rejected`
///   with exactly one message; nothing is written and the cart is kept
/// - Success → `Confirmed`; the cart is cleared
pub async fn checkout_store(
    db: &DbState,
    cart: &CartState,
    config: &StoreConfig,
    session: &Session,
    input: CheckoutInput,
) -> CheckoutResponse {
    debug!(user_id = ?session.user_id, "checkout_store command");

    let form = match validate_checkout(&input, &config.default_billing_country) {
        Ok(form) => form,
        Err(errors) => {
            warn!(user_id = ?session.user_id, errors = errors.len(), "Checkout form rejected");
            return CheckoutResponse::Rejected {
                errors: errors.messages(),
                input,
            };
        }
    };

    let request = CheckoutRequest {
        form,
        user_id: session.user_id,
    };

    match db.checkout().checkout(&request, cart).await {
        Ok(placed) => CheckoutResponse::confirmed(placed.order_number),
        Err(err) => {
            warn!(user_id = ?session.user_id, error = %err, "Checkout failed");
            CheckoutResponse::Rejected {
                errors: vec![err.user_message()],
                input,
            }
        }
    }
}

/// An order with its line items, for the confirmation page.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

pub async fn get_order(db: &DbState, order_number: &str) -> Result<OrderDetails, ApiError> {
    debug!(order_number = %order_number, "get_order command");

    let orders = db.inner().orders();
    let order = orders
        .get_by_number(order_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", order_number)))?;
    let items = orders.get_items(order.id).await?;

    Ok(OrderDetails { order, items })
}
