//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │ OrderLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (row id)    │   │  id (row id)    │   │  order_id (FK)  │       │
//! │  │  sku, color     │   │  order_number   │   │  name/sku/color │       │
//! │  │  box_price      │   │  billing block  │   │  price × qty    │       │
//! │  └─────────────────┘   │  shipping block │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │ PaymentStatus   │   │  OrderStatus    │       │
//! │  │  Cod            │   │  Unpaid         │   │  Pending        │       │
//! │  │  Stripe         │   │  Paid           │   │  Processing ... │       │
//! │  │  Paypal         │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have:
//! - `id`: autoincrement row id - monotonic creation order, used for relations
//! - `order_number`: business identifier shown to the customer (`PQ-20241`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer intends to pay. Closed set.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[serde(rename = "cod")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cod"))]
    CashOnDelivery,
    /// Card payment through the Stripe gateway.
    #[serde(rename = "stripe")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "stripe"))]
    Stripe,
    /// Card payment through the PayPal gateway.
    #[serde(rename = "paypal")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "paypal"))]
    Paypal,
}

impl PaymentMethod {
    /// Accepted wire values, in display order.
    pub const ALLOWED: [&'static str; 3] = ["cod", "stripe", "paypal"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::CashOnDelivery),
            "stripe" => Ok(PaymentMethod::Stripe),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(CoreError::InvalidPaymentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Every order starts unpaid; gateways flip it later.
    #[default]
    Unpaid,
    Paid,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status. Checkout only ever writes `Pending`; the other
/// transitions belong to post-checkout workflows.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

// =============================================================================
// Contact Block
// =============================================================================

/// A contact/address block as stored on the order (billing or shipping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactBlock {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Address lines joined with ", ".
    pub address: String,
    pub zipcode: String,
    pub state: String,
    pub country: String,
}

// =============================================================================
// Shipping Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingMethod {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ShippingMethod {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as seen by the cart and the line-item snapshot.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub color: Option<String>,
    /// Price charged per box, the unit the cart sells in.
    pub box_price_cents: i64,
    /// Soft delete flag.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn box_price(&self) -> Money {
        Money::from_cents(self.box_price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// Immutable once assigned, unique for the lifetime of the system.
    pub order_number: String,
    /// `None` for guest checkout.
    pub user_id: Option<i64>,
    pub shipping_method_id: i64,
    /// Caller-supplied, persisted as given.
    pub sub_total_cents: i64,
    pub coupon: Option<String>,
    pub discount_cents: i64,
    /// Resolved from the shipping method at checkout time.
    pub shipping_charge_cents: i64,
    /// Caller-supplied, persisted as given.
    pub total_amount_cents: i64,
    /// Total item count of the cart at checkout.
    pub quantity: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub shipped_to_different_address: bool,
    pub billing: ContactBlock,
    pub shipping: ContactBlock,
    pub order_note: Option<String>,
    pub created_by: Option<i64>,
    #[ts(as = "String")]
    pub order_created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }

    #[inline]
    pub fn shipping_charge(&self) -> Money {
        Money::from_cents(self.shipping_charge_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// A purchased line. Snapshot pattern: product name/color/sku and the unit
/// price are frozen at the time of purchase.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub product_name: String,
    pub product_color: Option<String>,
    pub product_sku: Option<String>,
    pub price_cents: i64,
    pub tax_cents: i64,
    pub quantity: i64,
    /// quantity × price_cents
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLineItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Wishlist
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WishlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
