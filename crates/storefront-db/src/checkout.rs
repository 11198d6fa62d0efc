//! # Checkout Transaction
//!
//! Turns a validated checkout request and a cart snapshot into one committed
//! order aggregate, or into nothing at all.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(request, cart)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.snapshot() ── empty? ──────────────────────► EmptyCart            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shipping method lookup ── missing? ─────────────► ShippingNotFound     │
//! │       │                    (pool, before any write)                     │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────┐       │
//! │  │ OrderNumberGenerator::next   (counter advance, first write)  │       │
//! │  │ insert_order                 (payment unpaid, status pending)│       │
//! │  │ insert_items × N             (price frozen, tax default 0)   │       │
//! │  └──────────────── any error ──► ROLLBACK ──► Storage /          │       │
//! │       │                                       OrderNumberConflict       │
//! │       ▼                                                                 │
//! │  COMMIT ──────────────────────────────────────────────────────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.clear()  (only after COMMIT returned Ok)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancellation
//! If the future is dropped before COMMIT, the `sqlx::Transaction` is dropped
//! with it and rolls back: no order row, no item rows, counter unchanged,
//! cart untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::DbError;
use crate::repository::order::OrderRepository;
use crate::repository::order_number::OrderNumberGenerator;
use crate::repository::shipping::ShippingMethodRepository;
use storefront_core::order::build_line_items;
use storefront_core::{CartSnapshot, CartStore, CheckoutRequest, Money, NewOrder};

// =============================================================================
// Errors
// =============================================================================

/// Why a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart had no lines when checkout began.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// The requested shipping method does not exist.
    #[error("Shipping method {0} not found")]
    ShippingNotFound(i64),

    /// The generated order number already existed. Logged; shown to the
    /// customer only as the generic failure.
    #[error("Order number collision on {0}")]
    OrderNumberConflict(String),

    /// Any other storage failure while writing the order.
    #[error(transparent)]
    Storage(DbError),
}

impl CheckoutError {
    /// The single message a customer sees.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutError::ShippingNotFound(_) => {
                "The selected shipping method does not exist.".to_string()
            }
            CheckoutError::OrderNumberConflict(_) | CheckoutError::Storage(_) => {
                "We could not place your order. Please try again.".to_string()
            }
        }
    }
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { field, .. } if field.contains("order_number") => {
                CheckoutError::OrderNumberConflict(field)
            }
            other => CheckoutError::Storage(other),
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::from(DbError::from(err))
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Result
// =============================================================================

/// What a committed checkout hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub order_number: String,
    /// Number of line items written.
    pub line_count: usize,
    /// Total item quantity recorded on the order.
    pub quantity: i64,
    pub placed_at: DateTime<Utc>,
}

// =============================================================================
// Service
// =============================================================================

/// Runs checkouts against one database with one order number prefix.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    numbers: OrderNumberGenerator,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, numbers: OrderNumberGenerator) -> Self {
        CheckoutService { pool, numbers }
    }

    pub fn order_prefix(&self) -> &str {
        self.numbers.prefix()
    }

    /// Snapshots the cart, places the order and clears the cart once the
    /// order has committed.
    pub async fn checkout<C>(&self, request: &CheckoutRequest, cart: &C) -> CheckoutResult<PlacedOrder>
    where
        C: CartStore + ?Sized,
    {
        self.checkout_at(request, cart, Utc::now()).await
    }

    /// [`checkout`](Self::checkout) with an explicit placement time.
    pub async fn checkout_at<C>(
        &self,
        request: &CheckoutRequest,
        cart: &C,
        now: DateTime<Utc>,
    ) -> CheckoutResult<PlacedOrder>
    where
        C: CartStore + ?Sized,
    {
        let snapshot = cart.snapshot();
        let placed = self.place_order_at(request, &snapshot, now).await?;

        cart.clear();
        debug!(order_number = %placed.order_number, "Cart cleared after commit");

        Ok(placed)
    }

    /// Writes the order aggregate for `snapshot`. Leaves any cart alone.
    pub async fn place_order(
        &self,
        request: &CheckoutRequest,
        snapshot: &CartSnapshot,
    ) -> CheckoutResult<PlacedOrder> {
        self.place_order_at(request, snapshot, Utc::now()).await
    }

    /// [`place_order`](Self::place_order) with an explicit placement time.
    ///
    /// The period token of the order number is the calendar year of `now`.
    pub async fn place_order_at(
        &self,
        request: &CheckoutRequest,
        snapshot: &CartSnapshot,
        now: DateTime<Utc>,
    ) -> CheckoutResult<PlacedOrder> {
        if snapshot.is_empty() {
            warn!(user_id = ?request.user_id, "Checkout attempted with an empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_method_id = request.form.shipping_method_id;
        let shipping = ShippingMethodRepository::new(self.pool.clone())
            .get_by_id(shipping_method_id)
            .await?
            .ok_or_else(|| {
                warn!(shipping_method_id, "Checkout with unknown shipping method");
                CheckoutError::ShippingNotFound(shipping_method_id)
            })?;

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let written = self
            .write_aggregate(&mut tx, request, snapshot, shipping.price(), now)
            .await;

        let placed = match written {
            Ok(placed) => placed,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    // The connection drops the transaction anyway.
                    warn!(error = %rollback_err, "Rollback failed");
                }
                error!(error = %err, user_id = ?request.user_id, "Checkout rolled back");
                return Err(err);
            }
        };

        if let Err(err) = tx.commit().await {
            let err = CheckoutError::from(DbError::transaction(err));
            error!(error = %err, order_number = %placed.order_number, "Commit failed");
            return Err(err);
        }

        info!(
            order_number = %placed.order_number,
            order_id = placed.order_id,
            lines = placed.line_count,
            quantity = placed.quantity,
            "Order placed"
        );

        Ok(placed)
    }

    /// Everything between BEGIN and COMMIT. The counter advance is the first
    /// statement so the write lock is taken before anything is read.
    async fn write_aggregate(
        &self,
        conn: &mut SqliteConnection,
        request: &CheckoutRequest,
        snapshot: &CartSnapshot,
        shipping_charge: Money,
        now: DateTime<Utc>,
    ) -> CheckoutResult<PlacedOrder> {
        let order_number = self.numbers.next(&mut *conn, now).await?;

        let order = NewOrder::build(request, order_number, shipping_charge, snapshot, now);
        let order_id = OrderRepository::insert_order(&mut *conn, &order, now).await?;

        let lines = build_line_items(snapshot, request.user_id);
        OrderRepository::insert_items(&mut *conn, order_id, &lines, now).await?;

        Ok(PlacedOrder {
            order_id,
            order_number: order.order_number,
            line_count: lines.len(),
            quantity: order.quantity,
            placed_at: now,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::order_number::current_value;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};
    use storefront_core::cart::CartLine;
    use storefront_core::checkout::{BillingDetails, CheckoutForm, ShippingDetails};
    use storefront_core::{Cart, CoreError, PaymentMethod, Product, ShippingMethod};

    struct Fixture {
        db: Database,
        shipping: ShippingMethod,
        tile: Product,
        grout: Product,
    }

    async fn fixture(config: DbConfig) -> Fixture {
        let db = Database::new(config).await.unwrap();
        let shipping = db
            .shipping_methods()
            .insert("Standard", Money::from_cents(499))
            .await
            .unwrap();
        let tile = db
            .products()
            .insert(&NewProduct {
                name: "Slate Floor Tile".to_string(),
                sku: Some("TL-001".to_string()),
                color: Some("slate".to_string()),
                box_price: Money::from_cents(1399),
            })
            .await
            .unwrap();
        let grout = db
            .products()
            .insert(&NewProduct {
                name: "Grout".to_string(),
                sku: None,
                color: None,
                box_price: Money::from_cents(650),
            })
            .await
            .unwrap();

        Fixture {
            db,
            shipping,
            tile,
            grout,
        }
    }

    fn at_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    fn request(shipping_method_id: i64, user_id: Option<i64>) -> CheckoutRequest {
        CheckoutRequest {
            form: CheckoutForm {
                billing: BillingDetails {
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    phone: "02079460000".to_string(),
                    address_1: "12 St James's Square".to_string(),
                    address_2: Some("Flat 2".to_string()),
                    postcode: "SW1Y 4JH".to_string(),
                    state: "London".to_string(),
                    country: "UK".to_string(),
                },
                shipping: ShippingDetails::default(),
                ship_to_different_address: false,
                payment_method: PaymentMethod::CashOnDelivery,
                shipping_method_id,
                sub_total: Money::from_cents(4847),
                total_amount: Money::from_cents(5346),
                coupon: None,
                discount: Money::zero(),
                order_note: None,
            },
            user_id,
        }
    }

    fn cart_with(fx: &Fixture) -> Mutex<Cart> {
        let mut cart = Cart::new();
        cart.add(&fx.tile, 3).unwrap();
        cart.add(&fx.grout, 1).unwrap();
        Mutex::new(cart)
    }

    #[tokio::test]
    async fn test_checkout_writes_aggregate_and_clears_cart() {
        let fx = fixture(DbConfig::in_memory()).await;
        let cart = cart_with(&fx);

        let placed = fx
            .db
            .checkout("PQ")
            .unwrap()
            .checkout_at(&request(fx.shipping.id, Some(42)), &cart, at_2024())
            .await
            .unwrap();

        assert_eq!(placed.order_number, "PQ-20241");
        assert_eq!(placed.line_count, 2);
        assert_eq!(placed.quantity, 4);
        assert!(CartStore::snapshot(&cart).is_empty());

        let orders = fx.db.orders();
        let order = orders.get_by_number("PQ-20241").await.unwrap().unwrap();
        assert_eq!(order.shipping_charge().cents(), 499);
        assert_eq!(order.sub_total().cents(), 4847);
        assert_eq!(order.total_amount().cents(), 5346);
        assert_eq!(order.quantity, 4);
        assert_eq!(order.user_id, Some(42));
        assert_eq!(order.billing.address, "12 St James's Square, Flat 2");
        assert_eq!(order.shipping, order.billing);
        assert_eq!(order.payment_status, storefront_core::PaymentStatus::Unpaid);
        assert_eq!(order.status, storefront_core::OrderStatus::Pending);

        let items = orders.get_items(order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Slate Floor Tile");
        assert_eq!(items[0].product_sku.as_deref(), Some("TL-001"));
        assert_eq!(items[0].subtotal_cents, 4197);
        assert_eq!(items[1].product_color, None);
        assert!(items.iter().all(|i| i.tax_cents == 0 && i.user_id == Some(42)));
    }

    #[tokio::test]
    async fn test_sequential_numbers_have_no_gaps() {
        let fx = fixture(DbConfig::in_memory()).await;
        let service = fx.db.checkout("PQ").unwrap();

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let cart = cart_with(&fx);
            let placed = service
                .checkout_at(&request(fx.shipping.id, None), &cart, at_2024())
                .await
                .unwrap();
            numbers.push(placed.order_number);
        }

        assert_eq!(numbers, vec!["PQ-20241", "PQ-20242", "PQ-20243"]);
    }

    #[tokio::test]
    async fn test_line_subtotals_sum_to_cart_subtotal() {
        let fx = fixture(DbConfig::in_memory()).await;
        let cart = cart_with(&fx);
        let expected = CartStore::snapshot(&cart).subtotal();

        let placed = fx
            .db
            .checkout("PQ")
            .unwrap()
            .checkout(&request(fx.shipping.id, None), &cart)
            .await
            .unwrap();

        let items = fx.db.orders().get_items(placed.order_id).await.unwrap();
        let persisted: i64 = items.iter().map(|i| i.subtotal_cents).sum();
        assert_eq!(persisted, expected.cents());
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let fx = fixture(DbConfig::in_memory()).await;
        let cart = Mutex::new(Cart::new());

        let err = fx
            .db
            .checkout("PQ")
            .unwrap()
            .checkout_at(&request(fx.shipping.id, None), &cart, at_2024())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(fx.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_shipping_method_writes_nothing() {
        let fx = fixture(DbConfig::in_memory()).await;
        let cart = cart_with(&fx);
        let service = fx.db.checkout("PQ").unwrap();

        let err = service
            .checkout_at(&request(999, None), &cart, at_2024())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::ShippingNotFound(999)));
        assert_eq!(err.user_message(), "The selected shipping method does not exist.");
        assert_eq!(fx.db.orders().count().await.unwrap(), 0);
        assert_eq!(fx.db.orders().count_items().await.unwrap(), 0);
        assert_eq!(CartStore::snapshot(&cart).count(), 4);

        let scope = service.numbers.scope_for(at_2024()).unwrap();
        assert_eq!(current_value(fx.db.pool(), &scope).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failure_after_order_row_rolls_everything_back() {
        let fx = fixture(DbConfig::in_memory()).await;
        let service = fx.db.checkout("PQ").unwrap();

        // The second line violates CHECK (quantity > 0) after the order row
        // and the first item are already written.
        let mut cart = Cart::new();
        cart.add(&fx.tile, 2).unwrap();
        cart.push_line(CartLine::from_product(&fx.grout, 0));
        let cart = Mutex::new(cart);

        let err = service
            .checkout_at(&request(fx.shipping.id, None), &cart, at_2024())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Storage(DbError::CheckViolation { .. })
        ));
        assert_eq!(err.user_message(), "We could not place your order. Please try again.");
        assert_eq!(fx.db.orders().count().await.unwrap(), 0);
        assert_eq!(fx.db.orders().count_items().await.unwrap(), 0);
        assert_eq!(CartStore::snapshot(&cart).len(), 2);

        // The counter advance was rolled back with the order.
        let scope = service.numbers.scope_for(at_2024()).unwrap();
        assert_eq!(current_value(fx.db.pool(), &scope).await.unwrap(), None);

        let placed = service
            .checkout_at(&request(fx.shipping.id, None), &cart_with(&fx), at_2024())
            .await
            .unwrap();
        assert_eq!(placed.order_number, "PQ-20241");
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let fx = fixture(DbConfig::in_memory()).await;
        let service = fx.db.checkout("PQ").unwrap();
        let snapshot = CartStore::snapshot(&cart_with(&fx));
        let req = request(fx.shipping.id, None);

        let mut tx = fx.db.pool().begin().await.unwrap();
        service
            .write_aggregate(&mut tx, &req, &snapshot, Money::from_cents(499), at_2024())
            .await
            .unwrap();
        // Cancelled before COMMIT.
        drop(tx);

        assert_eq!(fx.db.orders().count().await.unwrap(), 0);
        assert_eq!(fx.db.orders().count_items().await.unwrap(), 0);

        let placed = service.place_order_at(&req, &snapshot, at_2024()).await.unwrap();
        assert_eq!(placed.order_number, "PQ-20241");
    }

    #[tokio::test]
    async fn test_counter_seeds_from_latest_existing_order() {
        let fx = fixture(DbConfig::in_memory()).await;
        let service = fx.db.checkout("PQ").unwrap();

        // Orders numbered before the counter table existed: the most recent
        // row wins, not the largest string.
        let mut conn = fx.db.pool().acquire().await.unwrap();
        for number in ["PQ-20249", "PQ-202412"] {
            let order = NewOrder::build(
                &request(fx.shipping.id, None),
                number.to_string(),
                Money::from_cents(499),
                &CartStore::snapshot(&cart_with(&fx)),
                at_2024(),
            );
            OrderRepository::insert_order(&mut conn, &order, at_2024())
                .await
                .unwrap();
        }
        drop(conn);

        let placed = service
            .checkout_at(&request(fx.shipping.id, None), &cart_with(&fx), at_2024())
            .await
            .unwrap();
        assert_eq!(placed.order_number, "PQ-202413");
    }

    #[tokio::test]
    async fn test_malformed_latest_order_fails_checkout() {
        for legacy in ["PQ-2024abc", "PQ-20241x"] {
            let fx = fixture(DbConfig::in_memory()).await;
            let service = fx.db.checkout("PQ").unwrap();

            let mut conn = fx.db.pool().acquire().await.unwrap();
            let order = NewOrder::build(
                &request(fx.shipping.id, None),
                legacy.to_string(),
                Money::from_cents(499),
                &CartStore::snapshot(&cart_with(&fx)),
                at_2024(),
            );
            OrderRepository::insert_order(&mut conn, &order, at_2024())
                .await
                .unwrap();
            drop(conn);

            let cart = cart_with(&fx);
            let err = service
                .checkout_at(&request(fx.shipping.id, None), &cart, at_2024())
                .await
                .unwrap_err();

            assert!(
                matches!(
                    &err,
                    CheckoutError::Storage(DbError::Domain(CoreError::MalformedOrderNumber { code, .. }))
                        if code == legacy
                ),
                "{legacy}: {err:?}"
            );
            assert_eq!(err.user_message(), "We could not place your order. Please try again.");
            assert_eq!(fx.db.orders().count().await.unwrap(), 1);
            assert_eq!(CartStore::snapshot(&cart).count(), 4);

            let scope = service.numbers.scope_for(at_2024()).unwrap();
            assert_eq!(current_value(fx.db.pool(), &scope).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_get_distinct_numbers() {
        let path = std::env::temp_dir().join(format!("storefront-{}.db", uuid::Uuid::new_v4()));
        let fx = fixture(DbConfig::new(&path).max_connections(4)).await;
        let service = fx.db.checkout("PQ").unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let cart = Arc::new(cart_with(&fx));
            let req = request(fx.shipping.id, Some(i));
            handles.push(tokio::spawn(async move {
                service.checkout_at(&req, cart.as_ref(), at_2024()).await
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().order_number);
        }
        numbers.sort_by_key(|n| n["PQ-2024".len()..].parse::<i64>().unwrap());

        let expected: Vec<String> = (1..=8).map(|n| format!("PQ-2024{}", n)).collect();
        assert_eq!(numbers, expected);
        assert_eq!(fx.db.orders().count().await.unwrap(), 8);
        assert_eq!(fx.db.orders().count_items().await.unwrap(), 16);

        fx.db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unique_violation_on_order_number_maps_to_conflict() {
        let err = CheckoutError::from(DbError::duplicate("orders.order_number", "PQ-20241"));
        assert!(matches!(err, CheckoutError::OrderNumberConflict(_)));
        assert_eq!(err.user_message(), "We could not place your order. Please try again.");

        let err = CheckoutError::from(DbError::duplicate("products.sku", "TL-001"));
        assert!(matches!(err, CheckoutError::Storage(_)));
    }
}
