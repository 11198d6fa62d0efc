//! # Cart
//!
//! The per-session cart and the read-only snapshot checkout consumes.
//!
//! ## Cart → Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add(product, qty) ──► CartLine { row_id, product_id, qty, price }      │
//! │  remove(row_id)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  snapshot() ──► CartSnapshot (owned copy, read-only)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout transaction ──► commit ──► CartStore::clear()                 │
//! │                              │                                          │
//! │                              └─ failure: cart untouched                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `row_id`; adding the same product again increases quantity
//! - Quantity per line is within `1..=MAX_ITEM_QUANTITY`
//! - At most `MAX_CART_ITEMS` distinct lines
//! - Unit price is within `0..=MAX_UNIT_PRICE_CENTS`

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Product attributes carried with a cart line for the purchase snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineModel {
    pub color: Option<String>,
    pub sku: Option<String>,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stable row identifier, derived from the product id.
    pub row_id: String,
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Per-line tax if the cart carried any. Tax computation is not done here.
    pub tax_cents: Option<i64>,
    /// `None` when the product model was not associated with the line.
    pub model: Option<CartLineModel>,
}

impl CartLine {
    /// Builds a line from a product, freezing its name, box price, color and sku.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            row_id: row_id_for(product.id),
            product_id: product.id,
            name: product.name.clone(),
            quantity,
            unit_price_cents: product.box_price_cents,
            tax_cents: None,
            model: Some(CartLineModel {
                color: product.color.clone(),
                sku: product.sku.clone(),
            }),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// quantity × unit price
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents.unwrap_or(0))
    }
}

/// Deterministic row id for a product: the same product always lands on the same row.
pub fn row_id_for(product_id: i64) -> String {
    let name = format!("product:{}", product_id);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
        .simple()
        .to_string()
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::InvalidQuantity {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

fn check_price(cents: i64) -> CoreResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(CoreError::PriceOutOfRange {
            cents,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product or increases the quantity of its existing row.
    ///
    /// Returns the row id.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<String> {
        check_quantity(quantity)?;
        check_price(product.box_price_cents)?;
        let row_id = row_id_for(product.id);

        if let Some(line) = self.lines.iter_mut().find(|l| l.row_id == row_id) {
            let new_qty = line.quantity + quantity;
            check_quantity(new_qty)?;
            line.quantity = new_qty;
            return Ok(row_id);
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(row_id)
    }

    /// Appends a line as-is, merging into an existing row with the same id.
    ///
    /// Quantity is not range-checked here; callers restoring a cart from
    /// storage own that.
    pub fn push_line(&mut self, line: CartLine) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.row_id == line.row_id) {
            existing.quantity += line.quantity;
            return;
        }
        self.lines.push(line);
    }

    /// Removes a row.
    pub fn remove(&mut self, row_id: &str) -> CoreResult<CartLine> {
        let position = self
            .lines
            .iter()
            .position(|l| l.row_id == row_id)
            .ok_or_else(|| CoreError::CartRowNotFound(row_id.to_string()))?;
        Ok(self.lines.remove(position))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, row_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.row_id == row_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across lines (the cart badge count).
    pub fn count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Subtotal plus whatever per-line tax the lines carry.
    pub fn total(&self) -> Money {
        self.subtotal() + self.lines.iter().map(CartLine::tax).sum::<Money>()
    }

    /// Owned, read-only copy of the current contents.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            taken_at: Utc::now(),
        }
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// The cart as it was when checkout began.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    pub taken_at: DateTime<Utc>,
}

impl CartSnapshot {
    pub fn new(lines: Vec<CartLine>) -> Self {
        CartSnapshot {
            lines,
            taken_at: Utc::now(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn total(&self) -> Money {
        self.subtotal() + self.lines.iter().map(CartLine::tax).sum::<Money>()
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// The two cart operations checkout needs.
///
/// `clear` is only ever called after the order transaction has committed.
pub trait CartStore: Send + Sync {
    fn snapshot(&self) -> CartSnapshot;
    fn clear(&self);
}

impl CartStore for Mutex<Cart> {
    fn snapshot(&self) -> CartSnapshot {
        self.lock().unwrap_or_else(PoisonError::into_inner).snapshot()
    }

    fn clear(&self) {
        self.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
