//! # storefront-core: Pure Checkout Logic for the Storefront
//!
//! Domain types and every checkout rule that needs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/storefront                              │   │
//! │  │    add_to_cart, remove_from_cart, add_to_wishlist, checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │validation│ │  order  │  │   │
//! │  │   │  Order  │ │  Money  │ │  Cart   │ │ checkout │ │ number  │  │   │
//! │  │   │ Product │ │         │ │Snapshot │ │  form    │ │ shaping │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │     migrations, repositories, order numbers, checkout tx        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderLineItem, ...)
//! - [`money`] - Integer money
//! - [`cart`] - Session cart, snapshots, the `CartStore` seam
//! - [`checkout`] - Raw and validated checkout forms
//! - [`validation`] - Checkout form validation
//! - [`order`] - Order number format and aggregate shaping
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::order::OrderNumberScope;
//!
//! let scope = OrderNumberScope::new("PQ", "2024").unwrap();
//! assert_eq!(scope.format(1), "PQ-20241");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartSnapshot, CartStore};
pub use checkout::{CheckoutForm, CheckoutInput, CheckoutRequest};
pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use money::Money;
pub use order::{NewOrder, NewOrderLine, OrderNumberScope};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Order number prefix when none is configured.
pub const DEFAULT_ORDER_PREFIX: &str = "PQ";

/// Billing country when the form leaves it blank.
pub const DEFAULT_BILLING_COUNTRY: &str = "UK";

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted, in cents (100 million in major units).
///
/// With `MAX_ITEM_QUANTITY` and `MAX_CART_ITEMS` this keeps every line and
/// cart total far inside `i64`. The products and order_items tables carry
/// the same bound as a CHECK.
pub const MAX_UNIT_PRICE_CENTS: i64 = 10_000_000_000;
