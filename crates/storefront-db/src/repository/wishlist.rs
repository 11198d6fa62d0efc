//! # Wishlist Repository
//!
//! One row per user + product; the UNIQUE pair is the duplicate guard.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::WishlistEntry;

#[derive(Debug, Clone)]
pub struct WishlistRepository {
    pool: SqlitePool,
}

impl WishlistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WishlistRepository { pool }
    }

    pub async fn contains(&self, user_id: i64, product_id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM wishlists WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Adds a product. A second add of the same pair fails with
    /// `DbError::UniqueViolation`.
    pub async fn add(&self, user_id: i64, product_id: i64) -> DbResult<WishlistEntry> {
        let now = Utc::now();

        debug!(user_id, product_id, "Adding wishlist entry");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO wishlists (user_id, product_id, created_at) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(WishlistEntry {
            id,
            user_id,
            product_id,
            created_at: now,
        })
    }

    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<WishlistEntry>> {
        let entries = sqlx::query_as::<_, WishlistEntry>(
            "SELECT id, user_id, product_id, created_at FROM wishlists WHERE user_id = ?1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Badge count for the header.
    pub async fn count_for_user(&self, user_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishlists WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use storefront_core::Money;

    #[tokio::test]
    async fn test_add_contains_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Oak Plank".to_string(),
                sku: None,
                color: None,
                box_price: Money::from_cents(5999),
            })
            .await
            .unwrap();
        let wishlist = db.wishlist();

        assert!(!wishlist.contains(7, product.id).await.unwrap());
        wishlist.add(7, product.id).await.unwrap();
        assert!(wishlist.contains(7, product.id).await.unwrap());
        assert_eq!(wishlist.count_for_user(7).await.unwrap(), 1);
        assert_eq!(wishlist.count_for_user(8).await.unwrap(), 0);

        let err = wishlist.add(7, product.id).await.unwrap_err();
        assert!(err.is_unique_violation_on("wishlists.user_id"));

        let entries = wishlist.list_for_user(7).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_id, product.id);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.wishlist().add(7, 404).await.unwrap_err();
        assert!(matches!(err, crate::DbError::ForeignKeyViolation { .. }));
    }
}
