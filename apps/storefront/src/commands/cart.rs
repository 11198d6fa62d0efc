//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │   Form   │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                 │              │
//! │       │           add_to_cart                            │              │
//! │       │           remove_from_cart                       │              │
//! │       │                                                  │              │
//! │       └──────────── cleared after commit ◄───────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::CoreError;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{CartState, CartView, DbState};

const ADD_FAILED: &str = "Failed to add to your cart. Please try again later.";
const REMOVE_FAILED: &str = "Unable to remove item.";

/// Acknowledgement returned by the cart mutations.
#[derive(Debug, Clone, Serialize)]
pub struct CartActionResponse {
    pub success: String,
    /// Total quantity now in the cart.
    pub cart_count: i64,
    pub cart: CartView,
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartView {
    debug!("get_cart command");
    cart.with_cart(|c| CartView::from(c))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line
/// - Price, color and sku are frozen at time of adding
///
/// ## Arguments
/// * `product_id` - Product to add
/// * `quantity` - Quantity to add (default: 1)
///
/// ## Errors
/// `NOT_FOUND` for an unknown or inactive product. Anything else is
/// logged and reported as a generic cart failure.
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    product_id: i64,
    quantity: Option<i64>,
) -> Result<CartActionResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id, quantity, "add_to_cart command");

    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await
        .map_err(|e| {
            warn!(product_id, error = %e, "Product lookup failed");
            ApiError::cart(ADD_FAILED)
        })?
        .ok_or_else(|| ApiError::not_found("Product not found."))?;

    cart.with_cart_mut(|c| {
        c.add(&product, quantity)?;
        Ok::<_, CoreError>(CartActionResponse {
            success: "Successfully added to your cart.".to_string(),
            cart_count: c.count(),
            cart: CartView::from(&*c),
        })
    })
    .map_err(|e| {
        warn!(product_id, quantity, error = %e, "Add to cart rejected");
        ApiError::cart(ADD_FAILED)
    })
}

/// Removes a row from the cart.
///
/// ## Arguments
/// * `row_id` - Row identifier from the cart view
pub fn remove_from_cart(cart: &CartState, row_id: &str) -> Result<CartActionResponse, ApiError> {
    debug!(row_id = %row_id, "remove_from_cart command");

    if row_id.trim().is_empty() {
        return Err(ApiError::cart(REMOVE_FAILED));
    }

    cart.with_cart_mut(|c| {
        c.remove(row_id)?;
        Ok::<_, CoreError>(CartActionResponse {
            success: "Cart Item removed Successfully.".to_string(),
            cart_count: c.count(),
            cart: CartView::from(&*c),
        })
    })
    .map_err(|e| {
        debug!(row_id = %row_id, error = %e, "Remove from cart rejected");
        ApiError::cart(REMOVE_FAILED)
    })
}
