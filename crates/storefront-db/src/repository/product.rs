//! # Product Repository
//!
//! Product lookups for the cart and wishlist, and inserts for seeding.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{Money, Product};

/// Fields for a product about to be inserted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub color: Option<String>,
    pub box_price: Money,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets an active product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, color, box_price_cents, is_active, created_at
            FROM products
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product and returns it with its row id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();

        debug!(name = %product.name, sku = ?product.sku, "Inserting product");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, sku, color, box_price_cents, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.color)
        .bind(product.box_price.cents())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            color: product.color.clone(),
            box_price_cents: product.box_price.cents(),
            is_active: true,
            created_at: now,
        })
    }

    /// Soft delete: the product stops resolving but its rows stay.
    pub async fn deactivate(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    fn tile() -> NewProduct {
        NewProduct {
            name: "Slate Floor Tile".to_string(),
            sku: Some("TL-001".to_string()),
            color: Some("slate".to_string()),
            box_price: Money::from_cents(3499),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let inserted = repo.insert(&tile()).await.unwrap();
        let fetched = repo.get_by_id(inserted.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Slate Floor Tile");
        assert_eq!(fetched.sku.as_deref(), Some("TL-001"));
        assert_eq!(fetched.box_price().cents(), 3499);
        assert!(fetched.is_active);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_inactive_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        assert!(repo.get_by_id(404).await.unwrap().is_none());

        let product = repo.insert(&tile()).await.unwrap();
        assert!(repo.deactivate(product.id).await.unwrap());
        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&tile()).await.unwrap();
        let err = repo.insert(&tile()).await.unwrap_err();
        assert!(err.is_unique_violation_on("products.sku"));
    }

    #[tokio::test]
    async fn test_price_above_ceiling_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut priciest = tile();
        priciest.box_price = Money::from_cents(storefront_core::MAX_UNIT_PRICE_CENTS);
        repo.insert(&priciest).await.unwrap();

        let mut too_pricey = tile();
        too_pricey.sku = Some("TL-002".to_string());
        too_pricey.box_price = Money::from_cents(storefront_core::MAX_UNIT_PRICE_CENTS + 1);
        let err = repo.insert(&too_pricey).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
