//! # Checkout Form Types
//!
//! The raw checkout input as posted, and the typed form validation produces.
//!
//! ```text
//! CheckoutInput (strings, all optional)
//!      │
//!      ▼  validation::validate_checkout
//!      │
//!      ├── Err(FieldErrors) ──► back to the form with input preserved
//!      │
//!      ▼
//! CheckoutForm (typed, billing complete, shipping overrides optional)
//!      │
//!      ▼
//! CheckoutRequest { form, user_id } ──► checkout transaction
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{ContactBlock, PaymentMethod};

// =============================================================================
// Raw Input
// =============================================================================

/// The checkout form exactly as posted. Kept intact so it can be handed
/// back to the caller when checkout is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInput {
    pub billing_email: Option<String>,
    pub billing_first_name: Option<String>,
    pub billing_last_name: Option<String>,
    pub billing_address_1: Option<String>,
    pub billing_address_2: Option<String>,
    pub billing_state: Option<String>,
    pub billing_postcode: Option<String>,
    pub billing_phone: Option<String>,
    pub billing_country: Option<String>,

    pub shipping_first_name: Option<String>,
    pub shipping_last_name: Option<String>,
    pub shipping_email: Option<String>,
    pub shipping_address_1: Option<String>,
    pub shipping_address_2: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postcode: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_country: Option<String>,

    /// Set when the "ship to a different address" box is ticked.
    #[serde(alias = "ship-address")]
    pub ship_to_different_address: bool,

    pub order_note: Option<String>,
    pub payment_method: Option<String>,
    pub sub_total: Option<String>,
    pub total_amount: Option<String>,
    pub shipping_id: Option<String>,
    pub coupon: Option<String>,
    pub discount: Option<String>,
}

// =============================================================================
// Validated Form
// =============================================================================

/// Billing block, every required field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub postcode: String,
    pub state: String,
    pub country: String,
}

/// Shipping block. Every field falls back to its billing counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub postcode: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// A fully validated checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub billing: BillingDetails,
    pub shipping: ShippingDetails,
    pub ship_to_different_address: bool,
    pub payment_method: PaymentMethod,
    pub shipping_method_id: i64,
    /// Caller-supplied; persisted as given.
    pub sub_total: Money,
    /// Caller-supplied; persisted as given.
    pub total_amount: Money,
    pub coupon: Option<String>,
    pub discount: Money,
    pub order_note: Option<String>,
}

impl CheckoutForm {
    pub fn billing_block(&self) -> ContactBlock {
        let b = &self.billing;
        ContactBlock {
            first_name: b.first_name.clone(),
            last_name: b.last_name.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            address: join_address(&b.address_1, b.address_2.as_deref()),
            zipcode: b.postcode.clone(),
            state: b.state.clone(),
            country: b.country.clone(),
        }
    }

    /// Shipping block with field-by-field fallback to billing.
    ///
    /// The address lines fall back independently: a shipping line 1 with no
    /// shipping line 2 still picks up billing line 2.
    pub fn shipping_block(&self) -> ContactBlock {
        let b = &self.billing;
        let s = &self.shipping;
        let pick = |over: &Option<String>, base: &str| over.clone().unwrap_or_else(|| base.to_string());

        let address_1 = s.address_1.as_deref().unwrap_or(&b.address_1);
        let address_2 = s.address_2.as_deref().or(b.address_2.as_deref());

        ContactBlock {
            first_name: pick(&s.first_name, &b.first_name),
            last_name: pick(&s.last_name, &b.last_name),
            email: pick(&s.email, &b.email),
            phone: pick(&s.phone, &b.phone),
            address: join_address(address_1, address_2),
            zipcode: pick(&s.postcode, &b.postcode),
            state: pick(&s.state, &b.state),
            country: pick(&s.country, &b.country),
        }
    }
}

fn join_address(line_1: &str, line_2: Option<&str>) -> String {
    match line_2 {
        Some(line_2) if !line_2.is_empty() => format!("{}, {}", line_1, line_2),
        _ => line_1.to_string(),
    }
}

/// What the checkout transaction consumes: a validated form and who placed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub form: CheckoutForm,
    /// `None` for guest checkout.
    pub user_id: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================
