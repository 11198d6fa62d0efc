//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command / CheckoutService                                              │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(42)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository            ShippingMethodRepository                  │
//! │  OrderRepository              WishlistRepository                        │
//! │  OrderNumberGenerator (connection-scoped, runs inside the checkout tx)  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold a pool clone. Writes that must join a caller's
//! transaction take `&mut SqliteConnection` instead.

pub mod order;
pub mod order_number;
pub mod product;
pub mod shipping;
pub mod wishlist;
