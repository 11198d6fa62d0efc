//! # Shipping Method Repository
//!
//! The checkout reads a method's price; the seed binary creates methods.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{Money, ShippingMethod};

#[derive(Debug, Clone)]
pub struct ShippingMethodRepository {
    pool: SqlitePool,
}

impl ShippingMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShippingMethodRepository { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ShippingMethod>> {
        let method = sqlx::query_as::<_, ShippingMethod>(
            "SELECT id, name, price_cents, created_at FROM shipping_methods WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    /// All methods, cheapest first.
    pub async fn list(&self) -> DbResult<Vec<ShippingMethod>> {
        let methods = sqlx::query_as::<_, ShippingMethod>(
            "SELECT id, name, price_cents, created_at FROM shipping_methods ORDER BY price_cents, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    pub async fn insert(&self, name: &str, price: Money) -> DbResult<ShippingMethod> {
        let now = Utc::now();

        debug!(name = %name, price = %price, "Inserting shipping method");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO shipping_methods (name, price_cents, created_at) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(name)
        .bind(price.cents())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(ShippingMethod {
            id,
            name: name.to_string(),
            price_cents: price.cents(),
            created_at: now,
        })
    }
}
