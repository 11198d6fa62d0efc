//! # Wishlist Commands
//!
//! Signed-in customers only. A product appears at most once per customer.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{DbState, Session};

#[derive(Debug, Clone, Serialize)]
pub struct WishlistResponse {
    pub success: String,
    pub wishlist_count: i64,
}

/// Adds a product to the signed-in customer's wishlist.
///
/// ## Errors
/// - Guest session → `UNAUTHENTICATED`
/// - Unknown product → `NOT_FOUND`
/// - Already on the wishlist → `WISHLIST_ERROR`
pub async fn add_to_wishlist(
    db: &DbState,
    session: &Session,
    product_id: i64,
) -> Result<WishlistResponse, ApiError> {
    debug!(product_id, user_id = ?session.user_id, "add_to_wishlist command");

    let user_id = session
        .user_id
        .ok_or_else(|| ApiError::unauthenticated("Log in first to add product to your wishlist."))?;

    let db = db.inner();
    if db.products().get_by_id(product_id).await?.is_none() {
        return Err(ApiError::not_found("Product not found."));
    }

    let wishlist = db.wishlist();
    if wishlist.contains(user_id, product_id).await? {
        return Err(ApiError::wishlist("The Product is already in your wishlist."));
    }

    if let Err(e) = wishlist.add(user_id, product_id).await {
        // Lost a race with a concurrent add of the same product.
        if e.is_unique_violation_on("wishlists.user_id") {
            return Err(ApiError::wishlist("The Product is already in your wishlist."));
        }
        warn!(user_id, product_id, error = %e, "Wishlist insert failed");
        return Err(e.into());
    }

    Ok(WishlistResponse {
        success: "Successfully added to your wishlist.".to_string(),
        wishlist_count: wishlist.count_for_user(user_id).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use storefront_core::Money;
    use storefront_db::{Database, DbConfig, NewProduct};

    async fn setup() -> (DbState, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Metro Wall Tile".to_string(),
                sku: None,
                color: None,
                box_price: Money::from_cents(1899),
            })
            .await
            .unwrap();
        (DbState::new(db, "PQ").unwrap(), product.id)
    }

    #[tokio::test]
    async fn test_guest_must_log_in() {
        let (db, product_id) = setup().await;
        let err = add_to_wishlist(&db, &Session::guest(), product_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert_eq!(err.message, "Log in first to add product to your wishlist.");
    }

    #[tokio::test]
    async fn test_add_then_duplicate() {
        let (db, product_id) = setup().await;
        let session = Session::user(7);

        let response = add_to_wishlist(&db, &session, product_id).await.unwrap();
        assert_eq!(response.success, "Successfully added to your wishlist.");
        assert_eq!(response.wishlist_count, 1);

        let err = add_to_wishlist(&db, &session, product_id).await.unwrap_err();
        assert_eq!(err.message, "The Product is already in your wishlist.");
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (db, _) = setup().await;
        let err = add_to_wishlist(&db, &Session::user(7), 404).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found.");
    }
}
