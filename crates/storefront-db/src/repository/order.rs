//! # Order Repository
//!
//! Writes and reads of the order aggregate: one `orders` row plus its
//! `order_items` rows.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutService (inside its transaction)                               │
//! │       │                                                                 │
//! │       ├── insert_order(conn, &NewOrder)       ──► orders.id             │
//! │       └── insert_items(conn, id, &[lines])    ──► order_items × N       │
//! │                                                                         │
//! │  Both take the transaction's connection: nothing here commits.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads (`get_by_number`, `get_items`, counts) go through the pool and back
//! the confirmation view.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{
    ContactBlock, NewOrder, NewOrderLine, Order, OrderLineItem, OrderStatus, PaymentMethod,
    PaymentStatus,
};

const ORDER_COLUMNS: &str = r#"
    id, order_number, user_id, shipping_method_id,
    sub_total_cents, coupon, discount_cents, shipping_charge_cents, total_amount_cents, quantity,
    payment_method, payment_status, status, shipped_to_different_address,
    billing_first_name, billing_last_name, billing_email, billing_phone,
    billing_address, billing_zipcode, billing_state, billing_country,
    shipping_first_name, shipping_last_name, shipping_email, shipping_phone,
    shipping_address, shipping_zipcode, shipping_state, shipping_country,
    order_note, created_by, order_created_at, created_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, order_id, product_id, user_id, product_name, product_color, product_sku,
    price_cents, tax_cents, quantity, subtotal_cents, created_at
"#;

/// Flat `orders` row as stored.
#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: Option<i64>,
    shipping_method_id: i64,
    sub_total_cents: i64,
    coupon: Option<String>,
    discount_cents: i64,
    shipping_charge_cents: i64,
    total_amount_cents: i64,
    quantity: i64,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    status: OrderStatus,
    shipped_to_different_address: bool,
    billing_first_name: String,
    billing_last_name: String,
    billing_email: String,
    billing_phone: String,
    billing_address: String,
    billing_zipcode: String,
    billing_state: String,
    billing_country: String,
    shipping_first_name: String,
    shipping_last_name: String,
    shipping_email: String,
    shipping_phone: String,
    shipping_address: String,
    shipping_zipcode: String,
    shipping_state: String,
    shipping_country: String,
    order_note: Option<String>,
    created_by: Option<i64>,
    order_created_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            shipping_method_id: row.shipping_method_id,
            sub_total_cents: row.sub_total_cents,
            coupon: row.coupon,
            discount_cents: row.discount_cents,
            shipping_charge_cents: row.shipping_charge_cents,
            total_amount_cents: row.total_amount_cents,
            quantity: row.quantity,
            payment_method: row.payment_method,
            payment_status: row.payment_status,
            status: row.status,
            shipped_to_different_address: row.shipped_to_different_address,
            billing: ContactBlock {
                first_name: row.billing_first_name,
                last_name: row.billing_last_name,
                email: row.billing_email,
                phone: row.billing_phone,
                address: row.billing_address,
                zipcode: row.billing_zipcode,
                state: row.billing_state,
                country: row.billing_country,
            },
            shipping: ContactBlock {
                first_name: row.shipping_first_name,
                last_name: row.shipping_last_name,
                email: row.shipping_email,
                phone: row.shipping_phone,
                address: row.shipping_address,
                zipcode: row.shipping_zipcode,
                state: row.shipping_state,
                country: row.shipping_country,
            },
            order_note: row.order_note,
            created_by: row.created_by,
            order_created_at: row.order_created_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for order reads. Writes are associated functions taking the
/// caller's connection.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Writes (transaction-scoped)
    // =========================================================================

    /// Inserts the order header. Returns the new row id.
    pub async fn insert_order(
        conn: &mut SqliteConnection,
        order: &NewOrder,
        now: DateTime<Utc>,
    ) -> DbResult<i64> {
        debug!(order_number = %order.order_number, quantity = order.quantity, "Inserting order");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                order_number, user_id, shipping_method_id,
                sub_total_cents, coupon, discount_cents, shipping_charge_cents,
                total_amount_cents, quantity,
                payment_method, payment_status, status, shipped_to_different_address,
                billing_first_name, billing_last_name, billing_email, billing_phone,
                billing_address, billing_zipcode, billing_state, billing_country,
                shipping_first_name, shipping_last_name, shipping_email, shipping_phone,
                shipping_address, shipping_zipcode, shipping_state, shipping_country,
                order_note, created_by, order_created_at, created_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21,
                ?22, ?23, ?24, ?25,
                ?26, ?27, ?28, ?29,
                ?30, ?31, ?32, ?33
            )
            RETURNING id
            "#,
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.shipping_method_id)
        .bind(order.sub_total.cents())
        .bind(&order.coupon)
        .bind(order.discount.cents())
        .bind(order.shipping_charge.cents())
        .bind(order.total_amount.cents())
        .bind(order.quantity)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(order.status)
        .bind(order.shipped_to_different_address)
        .bind(&order.billing.first_name)
        .bind(&order.billing.last_name)
        .bind(&order.billing.email)
        .bind(&order.billing.phone)
        .bind(&order.billing.address)
        .bind(&order.billing.zipcode)
        .bind(&order.billing.state)
        .bind(&order.billing.country)
        .bind(&order.shipping.first_name)
        .bind(&order.shipping.last_name)
        .bind(&order.shipping.email)
        .bind(&order.shipping.phone)
        .bind(&order.shipping.address)
        .bind(&order.shipping.zipcode)
        .bind(&order.shipping.state)
        .bind(&order.shipping.country)
        .bind(&order.order_note)
        .bind(order.created_by)
        .bind(order.order_created_at)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Inserts line items under `order_id`, in order. Stops at the first failure.
    pub async fn insert_items(
        conn: &mut SqliteConnection,
        order_id: i64,
        lines: &[NewOrderLine],
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        for line in lines {
            debug!(order_id, product_id = line.product_id, quantity = line.quantity, "Inserting order item");

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, user_id,
                    product_name, product_color, product_sku,
                    price_cents, tax_cents, quantity, subtotal_cents,
                    created_at
                ) VALUES (
                    ?1, ?2, ?3,
                    ?4, ?5, ?6,
                    ?7, ?8, ?9, ?10,
                    ?11
                )
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.user_id)
            .bind(&line.product_name)
            .bind(&line.product_color)
            .bind(&line.product_sku)
            .bind(line.price.cents())
            .bind(line.tax.cents())
            .bind(line.quantity)
            .bind(line.subtotal.cents())
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE order_number = ?1", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY id DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Line items of an order, in insertion order.
    pub async fn get_items(&self, order_id: i64) -> DbResult<Vec<OrderLineItem>> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderLineItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
