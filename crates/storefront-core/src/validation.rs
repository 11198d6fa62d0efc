//! # Validation Module
//!
//! Checkout form validation for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE                                                   │
//! │  ├── required / max length / email / numeric / allowed values          │
//! │  └── every failing field reported, in declaration order                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout transaction (storefront-db)                          │
//! │  ├── empty cart                                                         │
//! │  └── shipping method exists                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE order_number                                                │
//! │  ├── CHECK non-negative money, positive quantity                       │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank strings count as missing, so `"   "` fails a required check and an
//! optional field left blank falls back to its default.
//!
//! ## Usage
//! ```rust
//! use storefront_core::checkout::CheckoutInput;
//! use storefront_core::validation::validate_checkout;
//!
//! let errors = validate_checkout(&CheckoutInput::default(), "UK").unwrap_err();
//! assert_eq!(errors.messages()[0], "The billing email is required.");
//! ```

use crate::checkout::{BillingDetails, CheckoutForm, CheckoutInput, ShippingDetails};
use crate::error::{FieldErrors, ValidationError};
use crate::money::{Money, ParseMoneyError};
use crate::types::PaymentMethod;

/// Limit for names, address lines, state and country.
pub const MAX_TEXT_LEN: usize = 255;

/// Limit for postcodes and phone numbers.
pub const MAX_SHORT_LEN: usize = 20;

// =============================================================================
// Checkout Form
// =============================================================================

/// Validates a posted checkout form.
///
/// Returns the typed form, or every field message in declaration order.
/// `default_country` fills `billing_country` when it is not supplied.
///
/// ## Example
/// ```rust
/// use storefront_core::checkout::CheckoutInput;
/// use storefront_core::validation::validate_checkout;
///
/// let input = CheckoutInput {
///     billing_email: Some("ada@example.com".into()),
///     billing_first_name: Some("Ada".into()),
///     billing_last_name: Some("Lovelace".into()),
///     billing_address_1: Some("12 St James's Square".into()),
///     billing_state: Some("London".into()),
///     billing_postcode: Some("SW1Y 4JH".into()),
///     billing_phone: Some("02079460000".into()),
///     payment_method: Some("cod".into()),
///     sub_total: Some("41.97".into()),
///     total_amount: Some("46.97".into()),
///     shipping_id: Some("1".into()),
///     ..Default::default()
/// };
///
/// let form = validate_checkout(&input, "UK").unwrap();
/// assert_eq!(form.billing.country, "UK");
/// assert_eq!(form.total_amount.cents(), 4697);
/// ```
pub fn validate_checkout(
    input: &CheckoutInput,
    default_country: &str,
) -> Result<CheckoutForm, FieldErrors> {
    let mut v = Checker::default();

    let billing_email = v.required_email("billing_email", "billing email", &input.billing_email);
    let billing_first_name = v.required_text(
        "billing_first_name",
        "billing first name",
        &input.billing_first_name,
        MAX_TEXT_LEN,
    );
    let billing_last_name = v.required_text(
        "billing_last_name",
        "billing last name",
        &input.billing_last_name,
        MAX_TEXT_LEN,
    );
    let billing_address_1 = v.required_text(
        "billing_address_1",
        "billing address",
        &input.billing_address_1,
        MAX_TEXT_LEN,
    );
    let billing_address_2 = v.optional_text(
        "billing_address_2",
        "billing address line 2",
        &input.billing_address_2,
        MAX_TEXT_LEN,
    );
    let billing_state = v.required_text(
        "billing_state",
        "billing state",
        &input.billing_state,
        MAX_TEXT_LEN,
    );
    let billing_postcode = v.required_text(
        "billing_postcode",
        "billing postcode",
        &input.billing_postcode,
        MAX_SHORT_LEN,
    );
    let billing_phone = v.required_text(
        "billing_phone",
        "billing phone number",
        &input.billing_phone,
        MAX_SHORT_LEN,
    );
    let billing_country = v.optional_text(
        "billing_country",
        "billing country",
        &input.billing_country,
        MAX_TEXT_LEN,
    );

    let shipping = ShippingDetails {
        first_name: v.optional_text(
            "shipping_first_name",
            "shipping first name",
            &input.shipping_first_name,
            MAX_TEXT_LEN,
        ),
        last_name: v.optional_text(
            "shipping_last_name",
            "shipping last name",
            &input.shipping_last_name,
            MAX_TEXT_LEN,
        ),
        email: v.optional_email("shipping_email", "shipping email", &input.shipping_email),
        address_1: v.optional_text(
            "shipping_address_1",
            "shipping address",
            &input.shipping_address_1,
            MAX_TEXT_LEN,
        ),
        address_2: v.optional_text(
            "shipping_address_2",
            "shipping address line 2",
            &input.shipping_address_2,
            MAX_TEXT_LEN,
        ),
        state: v.optional_text(
            "shipping_state",
            "shipping state",
            &input.shipping_state,
            MAX_TEXT_LEN,
        ),
        postcode: v.optional_text(
            "shipping_postcode",
            "shipping postcode",
            &input.shipping_postcode,
            MAX_SHORT_LEN,
        ),
        phone: v.optional_text(
            "shipping_phone",
            "shipping phone number",
            &input.shipping_phone,
            MAX_SHORT_LEN,
        ),
        country: v.optional_text(
            "shipping_country",
            "shipping country",
            &input.shipping_country,
            MAX_TEXT_LEN,
        ),
    };

    let order_note = present(&input.order_note);
    let payment_method = v.payment_method(&input.payment_method);
    let sub_total = v.required_amount("sub_total", "sub total", &input.sub_total);
    let total_amount = v.required_amount("total_amount", "total amount", &input.total_amount);
    let shipping_method_id = v.shipping_id(&input.shipping_id);
    let coupon = v.optional_text("coupon", "coupon", &input.coupon, MAX_TEXT_LEN);
    let discount = v.optional_amount("discount", "discount", &input.discount);

    if !v.errors.is_empty() {
        return Err(v.errors);
    }

    // Every required value is Some once no error was recorded.
    match (
        billing_email,
        billing_first_name,
        billing_last_name,
        billing_address_1,
        billing_state,
        billing_postcode,
        billing_phone,
        payment_method,
        sub_total,
        total_amount,
        shipping_method_id,
    ) {
        (
            Some(email),
            Some(first_name),
            Some(last_name),
            Some(address_1),
            Some(state),
            Some(postcode),
            Some(phone),
            Some(payment_method),
            Some(sub_total),
            Some(total_amount),
            Some(shipping_method_id),
        ) => Ok(CheckoutForm {
            billing: BillingDetails {
                first_name,
                last_name,
                email,
                phone,
                address_1,
                address_2: billing_address_2,
                postcode,
                state,
                country: billing_country.unwrap_or_else(|| default_country.to_string()),
            },
            shipping,
            ship_to_different_address: input.ship_to_different_address,
            payment_method,
            shipping_method_id,
            sub_total,
            total_amount,
            coupon,
            discount: discount.unwrap_or_default(),
            order_note,
        }),
        _ => {
            let mut errors = FieldErrors::new();
            errors.push(ValidationError::new("form", "The checkout form is incomplete."));
            Err(errors)
        }
    }
}

// =============================================================================
// Field Checks
// =============================================================================

/// Trimmed value, `None` when missing or blank.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Structural email check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    domain.contains('.')
}

#[derive(Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    fn fail(&mut self, field: &str, message: String) {
        self.errors.push(ValidationError::new(field, message));
    }

    fn check_len(&mut self, field: &str, label: &str, value: String, max: usize) -> Option<String> {
        if value.chars().count() > max {
            self.fail(
                field,
                format!("The {} may not be greater than {} characters.", label, max),
            );
            return None;
        }
        Some(value)
    }

    fn required_text(
        &mut self,
        field: &str,
        label: &str,
        value: &Option<String>,
        max: usize,
    ) -> Option<String> {
        match present(value) {
            Some(value) => self.check_len(field, label, value, max),
            None => {
                self.fail(field, format!("The {} is required.", label));
                None
            }
        }
    }

    fn optional_text(
        &mut self,
        field: &str,
        label: &str,
        value: &Option<String>,
        max: usize,
    ) -> Option<String> {
        present(value).and_then(|value| self.check_len(field, label, value, max))
    }

    fn email(&mut self, field: &str, label: &str, value: String) -> Option<String> {
        if !is_valid_email(&value) {
            self.fail(field, format!("The {} must be a valid email address.", label));
            return None;
        }
        self.check_len(field, label, value, MAX_TEXT_LEN)
    }

    fn required_email(&mut self, field: &str, label: &str, value: &Option<String>) -> Option<String> {
        match present(value) {
            Some(value) => self.email(field, label, value),
            None => {
                self.fail(field, format!("The {} is required.", label));
                None
            }
        }
    }

    fn optional_email(&mut self, field: &str, label: &str, value: &Option<String>) -> Option<String> {
        present(value).and_then(|value| self.email(field, label, value))
    }

    fn amount(&mut self, field: &str, label: &str, value: String) -> Option<Money> {
        match value.parse::<Money>() {
            Ok(amount) if amount.is_negative() => {
                self.fail(field, format!("The {} must be at least 0.", label));
                None
            }
            Ok(amount) => Some(amount),
            Err(ParseMoneyError::TooManyDecimals) => {
                self.fail(
                    field,
                    format!("The {} may not have more than 2 decimal places.", label),
                );
                None
            }
            Err(_) => {
                self.fail(field, format!("The {} must be a number.", label));
                None
            }
        }
    }

    fn required_amount(&mut self, field: &str, label: &str, value: &Option<String>) -> Option<Money> {
        match present(value) {
            Some(value) => self.amount(field, label, value),
            None => {
                self.fail(field, format!("The {} is required.", label));
                None
            }
        }
    }

    fn optional_amount(&mut self, field: &str, label: &str, value: &Option<String>) -> Option<Money> {
        present(value).and_then(|value| self.amount(field, label, value))
    }

    fn payment_method(&mut self, value: &Option<String>) -> Option<PaymentMethod> {
        let Some(value) = present(value) else {
            self.fail("payment_method", "The payment method is required.".to_string());
            return None;
        };
        match value.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                self.fail(
                    "payment_method",
                    "The selected payment method is invalid.".to_string(),
                );
                None
            }
        }
    }

    /// Shipping method reference. Existence is checked by the checkout
    /// transaction; a value that is not a positive id cannot exist.
    fn shipping_id(&mut self, value: &Option<String>) -> Option<i64> {
        let Some(value) = present(value) else {
            self.fail("shipping_id", "The shipping method is required.".to_string());
            return None;
        };
        match value.parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.fail(
                    "shipping_id",
                    "The selected shipping method does not exist.".to_string(),
                );
                None
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CheckoutInput {
        CheckoutInput {
            billing_email: Some("ada@example.com".to_string()),
            billing_first_name: Some("Ada".to_string()),
            billing_last_name: Some("Lovelace".to_string()),
            billing_address_1: Some("12 St James's Square".to_string()),
            billing_state: Some("London".to_string()),
            billing_postcode: Some("SW1Y 4JH".to_string()),
            billing_phone: Some("02079460000".to_string()),
            payment_method: Some("stripe".to_string()),
            sub_total: Some("41.97".to_string()),
            total_amount: Some("46.97".to_string()),
            shipping_id: Some("2".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form() {
        let form = validate_checkout(&valid_input(), "UK").unwrap();

        assert_eq!(form.billing.email, "ada@example.com");
        assert_eq!(form.billing.country, "UK");
        assert_eq!(form.billing.address_2, None);
        assert_eq!(form.payment_method, PaymentMethod::Stripe);
        assert_eq!(form.shipping_method_id, 2);
        assert_eq!(form.sub_total.cents(), 4197);
        assert_eq!(form.total_amount.cents(), 4697);
        assert!(form.discount.is_zero());
        assert_eq!(form.shipping, ShippingDetails::default());
    }

    #[test]
    fn test_empty_form_lists_required_fields_in_order() {
        let errors = validate_checkout(&CheckoutInput::default(), "UK").unwrap_err();

        assert_eq!(
            errors.messages(),
            vec![
                "The billing email is required.",
                "The billing first name is required.",
                "The billing last name is required.",
                "The billing address is required.",
                "The billing state is required.",
                "The billing postcode is required.",
                "The billing phone number is required.",
                "The payment method is required.",
                "The sub total is required.",
                "The total amount is required.",
                "The shipping method is required.",
            ]
        );
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let mut input = valid_input();
        input.billing_state = Some("   ".to_string());
        input.billing_country = Some("".to_string());

        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(errors.for_field("billing_state"), vec!["The billing state is required."]);

        input.billing_state = Some("London".to_string());
        let form = validate_checkout(&input, "UK").unwrap();
        assert_eq!(form.billing.country, "UK");
    }

    #[test]
    fn test_max_lengths() {
        let mut input = valid_input();
        input.billing_first_name = Some("A".repeat(256));
        input.billing_phone = Some("0".repeat(21));
        input.shipping_postcode = Some("9".repeat(21));

        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "The billing first name may not be greater than 255 characters.",
                "The billing phone number may not be greater than 20 characters.",
                "The shipping postcode may not be greater than 20 characters.",
            ]
        );

        input.billing_first_name = Some("A".repeat(255));
        input.billing_phone = Some("0".repeat(20));
        input.shipping_postcode = Some("9".repeat(20));
        assert!(validate_checkout(&input, "UK").is_ok());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email("ada@example..com"));

        let mut input = valid_input();
        input.billing_email = Some("not-an-email".to_string());
        input.shipping_email = Some("also bad".to_string());
        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "The billing email must be a valid email address.",
                "The shipping email must be a valid email address.",
            ]
        );
    }

    #[test]
    fn test_payment_method_closed_set() {
        let mut input = valid_input();
        input.payment_method = Some("bitcoin".to_string());

        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(errors.messages(), vec!["The selected payment method is invalid."]);
    }

    #[test]
    fn test_amounts() {
        let mut input = valid_input();
        input.total_amount = Some("abc".to_string());
        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(errors.messages(), vec!["The total amount must be a number."]);

        input.total_amount = Some("-1".to_string());
        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(errors.messages(), vec!["The total amount must be at least 0."]);

        input.total_amount = Some("0".to_string());
        input.discount = Some("2.50".to_string());
        let form = validate_checkout(&input, "UK").unwrap();
        assert!(form.total_amount.is_zero());
        assert_eq!(form.discount.cents(), 250);
    }

    #[test]
    fn test_shipping_id_must_be_an_id() {
        let mut input = valid_input();
        input.shipping_id = Some("express".to_string());
        let errors = validate_checkout(&input, "UK").unwrap_err();
        assert_eq!(
            errors.for_field("shipping_id"),
            vec!["The selected shipping method does not exist."]
        );

        input.shipping_id = Some("0".to_string());
        assert!(validate_checkout(&input, "UK").is_err());
    }

    #[test]
    fn test_shipping_overrides_and_country() {
        let mut input = valid_input();
        input.billing_country = Some("Ireland".to_string());
        input.shipping_first_name = Some("  Charles ".to_string());
        input.ship_to_different_address = true;
        input.order_note = Some("Leave with porter".to_string());

        let form = validate_checkout(&input, "UK").unwrap();
        assert_eq!(form.billing.country, "Ireland");
        assert_eq!(form.shipping.first_name.as_deref(), Some("Charles"));
        assert!(form.ship_to_different_address);
        assert_eq!(form.order_note.as_deref(), Some("Leave with porter"));
        assert_eq!(form.shipping_block().last_name, "Lovelace");
        assert_eq!(form.shipping_block().country, "Ireland");
    }
}
