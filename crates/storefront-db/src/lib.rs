//! # storefront-db: Database Layer for the Storefront
//!
//! SQLite access through sqlx, and the checkout transaction built on it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  checkout command                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌─────────────────┐  ┌──────────────────┐  │   │
//! │  │   │   Database    │  │ CheckoutService │  │   Repositories   │  │   │
//! │  │   │   (pool.rs)   │─►│  (checkout.rs)  │─►│ order, products, │  │   │
//! │  │   │  SqlitePool   │  │  BEGIN…COMMIT   │  │ shipping, wish-  │  │   │
//! │  │   │  migrations   │  │                 │  │ list, numbers    │  │   │
//! │  │   └───────────────┘  └─────────────────┘  └──────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations and the order number generator
//! - [`checkout`] - The checkout transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let placed = db.checkout("PQ")?.checkout(&request, &cart).await?;
//! println!("{}", placed.order_number); // PQ-20241
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutResult, CheckoutService, PlacedOrder};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::order_number::OrderNumberGenerator;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::shipping::ShippingMethodRepository;
pub use repository::wishlist::WishlistRepository;
