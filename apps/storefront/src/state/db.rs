//! # Database State
//!
//! Wraps the `Database` handle and the checkout service built on it.
//!
//! ## Thread Safety
//! The `Database` struct from `storefront-db` contains a `SqlitePool` which
//! is inherently thread-safe. Multiple commands can execute queries
//! concurrently without explicit locking.

use storefront_db::{CheckoutService, Database, DbResult};

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
    checkout: CheckoutService,
}

impl DbState {
    /// Fails when `order_prefix` is not a usable order number prefix.
    pub fn new(db: Database, order_prefix: &str) -> DbResult<Self> {
        let checkout = db.checkout(order_prefix)?;
        Ok(DbState { db, checkout })
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let product = db_state.inner().products().get_by_id(42).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }
}
