//! # State Module
//!
//! Application state, one focused type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   DbState    │  │  CartState   │  │   StoreConfig    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Database    │  │  Arc<Mutex<  │  │  order_prefix    │              │
//! │  │  Checkout-   │  │    Cart      │  │  billing country │              │
//! │  │  Service     │  │  >>          │  │  database_path   │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartState: Protected by Arc<Mutex<T>> for exclusive access          │
//! │  • StoreConfig: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;

pub use cart::{CartState, CartView};
pub use config::{ConfigError, ConfigResult, StoreConfig};
pub use db::DbState;

/// The signed-in customer, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<i64>,
}

impl Session {
    pub fn guest() -> Self {
        Session { user_id: None }
    }

    pub fn user(user_id: i64) -> Self {
        Session {
            user_id: Some(user_id),
        }
    }
}
