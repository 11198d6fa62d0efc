//! # Order Aggregate Shaping
//!
//! Pure construction of the rows the checkout transaction writes.
//!
//! ## Order Number Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   PQ - 2024 17                                                          │
//! │   ──   ──── ──                                                          │
//! │   │    │    └── sequence within prefix + period (no zero padding)       │
//! │   │    └─────── period token: calendar year of placement               │
//! │   └──────────── prefix (configurable, default "PQ")                     │
//! │                                                                         │
//! │   stem = "PQ-2024"     code = stem + N                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numbers are allocated by the database (`order_number_sequences`); this
//! module only formats, parses and shapes.
//!
//! ## Aggregate
//! ```text
//! CheckoutRequest + order number + shipping charge + CartSnapshot
//!        │
//!        ▼
//!   NewOrder ──────────── one header row
//!   Vec<NewOrderLine> ─── one row per cart line, price frozen
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, CartSnapshot};
use crate::checkout::CheckoutRequest;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ContactBlock, OrderStatus, PaymentMethod, PaymentStatus};

// =============================================================================
// Order Number
// =============================================================================

/// The partition an order number sequence runs in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumberScope {
    prefix: String,
    period: String,
}

impl OrderNumberScope {
    /// Builds a scope after checking the prefix.
    ///
    /// The prefix must be ASCII alphanumeric so the `-` separator stays
    /// unambiguous.
    pub fn new(prefix: impl Into<String>, period: impl Into<String>) -> CoreResult<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(OrderNumberScope {
            prefix,
            period: period.into(),
        })
    }

    /// Scope for an order placed at `at`: the period is its calendar year.
    pub fn for_time(prefix: &str, at: DateTime<Utc>) -> CoreResult<Self> {
        Self::new(prefix, at.format("%Y").to_string())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    /// `PREFIX-PERIOD`, the part every code in this scope starts with.
    pub fn stem(&self) -> String {
        format!("{}-{}", self.prefix, self.period)
    }

    /// `PREFIX-PERIOD<N>`.
    pub fn format(&self, sequence: i64) -> String {
        format!("{}{}", self.stem(), sequence)
    }

    /// Extracts `N` from a code in this scope.
    pub fn parse_sequence(&self, code: &str) -> CoreResult<i64> {
        let stem = self.stem();
        code.strip_prefix(&stem)
            .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
            .and_then(|rest| rest.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| CoreError::MalformedOrderNumber {
                code: code.to_string(),
                stem,
            })
    }
}

/// Prefix must be non-empty ASCII letters or digits.
pub fn validate_prefix(prefix: &str) -> CoreResult<()> {
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::InvalidOrderPrefix(prefix.to_string()));
    }
    Ok(())
}

// =============================================================================
// Order Header
// =============================================================================

/// An order header ready to insert. Everything but the row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<i64>,
    pub shipping_method_id: i64,
    pub sub_total: Money,
    pub coupon: Option<String>,
    pub discount: Money,
    pub shipping_charge: Money,
    pub total_amount: Money,
    pub quantity: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub shipped_to_different_address: bool,
    pub billing: ContactBlock,
    pub shipping: ContactBlock,
    pub order_note: Option<String>,
    pub created_by: Option<i64>,
    pub order_created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Shapes the header from the request, the allocated number, the resolved
    /// shipping charge and the cart as it was when checkout began.
    ///
    /// Subtotal and total are taken from the request as given; quantity is
    /// the cart's total item count.
    pub fn build(
        request: &CheckoutRequest,
        order_number: String,
        shipping_charge: Money,
        cart: &CartSnapshot,
        placed_at: DateTime<Utc>,
    ) -> Self {
        let form = &request.form;
        NewOrder {
            order_number,
            user_id: request.user_id,
            shipping_method_id: form.shipping_method_id,
            sub_total: form.sub_total,
            coupon: form.coupon.clone(),
            discount: form.discount,
            shipping_charge,
            total_amount: form.total_amount,
            quantity: cart.count(),
            payment_method: form.payment_method,
            payment_status: PaymentStatus::Unpaid,
            status: OrderStatus::Pending,
            shipped_to_different_address: form.ship_to_different_address,
            billing: form.billing_block(),
            shipping: form.shipping_block(),
            order_note: form.order_note.clone(),
            created_by: request.user_id,
            order_created_at: placed_at,
        }
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A line item ready to insert under an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub product_name: String,
    pub product_color: Option<String>,
    pub product_sku: Option<String>,
    pub price: Money,
    pub tax: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

impl NewOrderLine {
    /// Freezes a cart line. Tax defaults to zero; subtotal is quantity × price.
    pub fn from_cart_line(line: &CartLine, user_id: Option<i64>) -> Self {
        let model = line.model.as_ref();
        NewOrderLine {
            product_id: line.product_id,
            user_id,
            product_name: line.name.clone(),
            product_color: model.and_then(|m| m.color.clone()),
            product_sku: model.and_then(|m| m.sku.clone()),
            price: line.unit_price(),
            tax: line.tax(),
            quantity: line.quantity,
            subtotal: line.subtotal(),
        }
    }
}

/// One line per cart line, in cart order.
pub fn build_line_items(cart: &CartSnapshot, user_id: Option<i64>) -> Vec<NewOrderLine> {
    cart.lines()
        .iter()
        .map(|line| NewOrderLine::from_cart_line(line, user_id))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLineModel;
    use crate::checkout::{BillingDetails, CheckoutForm, ShippingDetails};
    use chrono::TimeZone;

    fn placed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
    }

    fn line(product_id: i64, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            row_id: crate::cart::row_id_for(product_id),
            product_id,
            name: format!("Tile {}", product_id),
            quantity,
            unit_price_cents: price_cents,
            tax_cents: None,
            model: Some(CartLineModel {
                color: Some("slate".to_string()),
                sku: Some(format!("TL-{}", product_id)),
            }),
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            form: CheckoutForm {
                billing: BillingDetails {
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    phone: "02079460000".to_string(),
                    address_1: "12 St James's Square".to_string(),
                    address_2: None,
                    postcode: "SW1Y 4JH".to_string(),
                    state: "London".to_string(),
                    country: "UK".to_string(),
                },
                shipping: ShippingDetails::default(),
                ship_to_different_address: false,
                payment_method: PaymentMethod::Paypal,
                shipping_method_id: 3,
                sub_total: Money::from_cents(9999),
                total_amount: Money::from_cents(12345),
                coupon: Some("SPRING".to_string()),
                discount: Money::from_cents(500),
                order_note: None,
            },
            user_id: Some(42),
        }
    }

    #[test]
    fn test_scope_formats_without_padding() {
        let scope = OrderNumberScope::for_time("PQ", placed_at()).unwrap();
        assert_eq!(scope.period(), "2024");
        assert_eq!(scope.stem(), "PQ-2024");
        assert_eq!(scope.format(1), "PQ-20241");
        assert_eq!(scope.format(2), "PQ-20242");
        assert_eq!(scope.format(105), "PQ-2024105");
    }

    #[test]
    fn test_parse_sequence() {
        let scope = OrderNumberScope::new("PQ", "2024").unwrap();
        assert_eq!(scope.parse_sequence("PQ-20241").unwrap(), 1);
        assert_eq!(scope.parse_sequence("PQ-202412").unwrap(), 12);
        assert!(scope.parse_sequence("PQ-2024").is_err());
        assert!(scope.parse_sequence("PQ-2023").is_err());
        assert!(scope.parse_sequence("XX-20241").is_err());
        assert!(scope.parse_sequence("PQ-2024A").is_err());
    }

    #[test]
    fn test_prefix_rules() {
        assert!(OrderNumberScope::new("PQ", "2024").is_ok());
        assert!(OrderNumberScope::new("SHOP2", "2024").is_ok());
        assert!(matches!(
            OrderNumberScope::new("", "2024"),
            Err(CoreError::InvalidOrderPrefix(_))
        ));
        assert!(OrderNumberScope::new("P-Q", "2024").is_err());
        assert!(OrderNumberScope::new("P Q", "2024").is_err());
    }

    #[test]
    fn test_line_items_freeze_cart_lines() {
        let mut taxed = line(2, 250, 4);
        taxed.tax_cents = Some(40);
        let bare = CartLine {
            model: None,
            ..line(3, 100, 1)
        };
        let snapshot = CartSnapshot::new(vec![line(1, 1399, 3), taxed, bare]);

        let items = build_line_items(&snapshot, Some(42));

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].subtotal.cents(), 4197);
        assert_eq!(items[0].tax.cents(), 0);
        assert_eq!(items[0].product_sku.as_deref(), Some("TL-1"));
        assert_eq!(items[1].tax.cents(), 40);
        assert_eq!(items[1].subtotal.cents(), 1000);
        assert_eq!(items[2].product_color, None);
        assert!(items.iter().all(|i| i.user_id == Some(42)));

        let persisted: Money = items.iter().map(|i| i.subtotal).sum();
        assert_eq!(persisted, snapshot.subtotal());
    }

    #[test]
    fn test_order_header_takes_amounts_as_given() {
        let snapshot = CartSnapshot::new(vec![line(1, 1000, 2), line(2, 500, 1)]);
        let order = NewOrder::build(
            &request(),
            "PQ-20241".to_string(),
            Money::from_cents(499),
            &snapshot,
            placed_at(),
        );

        assert_eq!(order.order_number, "PQ-20241");
        assert_eq!(order.sub_total.cents(), 9999);
        assert_eq!(order.total_amount.cents(), 12345);
        assert_eq!(order.shipping_charge.cents(), 499);
        assert_eq!(order.quantity, 3);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shipping, order.billing);
        assert_eq!(order.created_by, Some(42));
        assert_eq!(order.coupon.as_deref(), Some("SPRING"));
    }
}
