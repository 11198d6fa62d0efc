//! # CLI Request Files
//!
//! `storefront checkout <request.json>` reads one of these:
//!
//! ```json
//! {
//!   "user_id": 7,
//!   "cart": [{ "product_id": 1, "quantity": 2 }],
//!   "form": { "billing_email": "ada@example.com", "payment_method": "cod", ... }
//! }
//! ```

use serde::Deserialize;
use tracing::info;

use storefront_core::CheckoutInput;

use crate::commands::cart::add_to_cart;
use crate::commands::checkout::{checkout_store, CheckoutResponse};
use crate::error::ApiError;
use crate::state::{CartState, DbState, Session, StoreConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRequest {
    pub product_id: i64,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutFile {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub cart: Vec<CartItemRequest>,
    #[serde(default)]
    pub form: CheckoutInput,
}

/// Fills a fresh session cart from `file` and submits the form.
///
/// A cart line that cannot be added stops the run before checkout.
pub async fn run_checkout_file(
    db: &DbState,
    config: &StoreConfig,
    file: CheckoutFile,
) -> Result<CheckoutResponse, ApiError> {
    let cart = CartState::new();
    let session = Session {
        user_id: file.user_id,
    };

    for item in &file.cart {
        add_to_cart(db, &cart, item.product_id, item.quantity).await?;
    }
    info!(lines = file.cart.len(), "Session cart filled");

    Ok(checkout_store(db, &cart, config, &session, file.form).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Money;
    use storefront_db::{Database, DbConfig, NewProduct};

    async fn setup() -> (DbState, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shipping = db
            .shipping_methods()
            .insert("Collect in store", Money::zero())
            .await
            .unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Oak Laminate Plank".to_string(),
                sku: Some("OAK-SAND".to_string()),
                color: Some("Sand".to_string()),
                box_price: Money::from_cents(2999),
            })
            .await
            .unwrap();
        (DbState::new(db, "PQ").unwrap(), shipping.id, product.id)
    }

    fn request_json(shipping_id: i64, product_id: i64) -> String {
        format!(
            r#"{{
                "user_id": 3,
                "cart": [{{ "product_id": {product_id}, "quantity": 2 }}],
                "form": {{
                    "billing_email": "grace@example.com",
                    "billing_first_name": "Grace",
                    "billing_last_name": "Hopper",
                    "billing_address_1": "1 Navy Yard",
                    "billing_state": "Kent",
                    "billing_postcode": "CT1 1AA",
                    "billing_phone": "01227000000",
                    "payment_method": "paypal",
                    "sub_total": "59.98",
                    "total_amount": "59.98",
                    "shipping_id": "{shipping_id}",
                    "ship-address": true,
                    "shipping_first_name": "Amazing",
                    "shipping_address_1": "2 Dock Road"
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn test_checkout_file_places_order() {
        let (db, shipping_id, product_id) = setup().await;
        let file: CheckoutFile =
            serde_json::from_str(&request_json(shipping_id, product_id)).unwrap();

        let response = run_checkout_file(&db, &StoreConfig::default(), file)
            .await
            .unwrap();
        assert!(response.is_confirmed());

        let orders = db.inner().orders().list_for_user(3).await.unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert!(order.shipped_to_different_address);
        assert_eq!(order.shipping.first_name, "Amazing");
        assert_eq!(order.shipping.last_name, "Hopper");
        assert_eq!(order.shipping.address, "2 Dock Road");
        assert_eq!(order.quantity, 2);
    }

    #[tokio::test]
    async fn test_unknown_cart_product_stops_run() {
        let (db, shipping_id, _) = setup().await;
        let file: CheckoutFile = serde_json::from_str(&request_json(shipping_id, 404)).unwrap();

        let err = run_checkout_file(&db, &StoreConfig::default(), file)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Product not found.");
        assert_eq!(db.inner().orders().count().await.unwrap(), 0);
    }
}
