//! # Cart State
//!
//! The session cart shared by the cart and checkout commands.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Action                   Command                 Cart State Change     │
//! │  ──────                   ───────                 ─────────────────     │
//! │                                                                         │
//! │  Add product ────────────► add_to_cart() ───────► add / qty += n       │
//! │                                                                         │
//! │  Remove row ─────────────► remove_from_cart() ──► remove(row_id)       │
//! │                                                                         │
//! │  View cart ──────────────► get_cart() ──────────► (read only)          │
//! │                                                                         │
//! │  Place order ────────────► checkout() ──────────► snapshot, then       │
//! │                                                   clear after commit   │
//! │                                                                         │
//! │  NOTE: All write operations acquire the Mutex lock exclusively.         │
//! │        The lock is never held across an await.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use storefront_core::{Cart, CartLine, CartSnapshot, CartStore};

/// Cart contents and totals as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    /// Total quantity across lines.
    pub count: i64,
    pub subtotal_cents: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            lines: cart.lines().to_vec(),
            count: cart.count(),
            subtotal_cents: cart.subtotal().cents(),
            total_cents: cart.total().cents(),
        }
    }
}

/// Session cart state.
///
/// Cloning shares the same cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let view = cart_state.with_cart(|c| CartView::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

impl CartStore for CartState {
    fn snapshot(&self) -> CartSnapshot {
        self.with_cart(Cart::snapshot)
    }

    fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::Product;

    fn product(id: i64, price_cents: i64) -> Product {
        Product {
            id,
            name: format!("Tile {}", id),
            sku: Some(format!("TL-{}", id)),
            color: Some("Grey".to_string()),
            box_price_cents: price_cents,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_reflects_cart() {
        let state = CartState::new();
        state
            .with_cart_mut(|c| c.add(&product(1, 1250), 2))
            .unwrap();
        state
            .with_cart_mut(|c| c.add(&product(2, 500), 1))
            .unwrap();

        let view = state.with_cart(|c| CartView::from(c));
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.count, 3);
        assert_eq!(view.subtotal_cents, 3000);
        assert_eq!(view.total_cents, 3000);
    }

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new();
        let other = state.clone();
        state
            .with_cart_mut(|c| c.add(&product(1, 1250), 1))
            .unwrap();

        assert_eq!(other.snapshot().len(), 1);
        other.clear();
        assert!(state.with_cart(Cart::is_empty));
    }
}
