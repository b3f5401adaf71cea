//! Minimum order value for business customers.
//!
//! ```text
//! B2B cart total 50.00, minimum 100.00
//!      │
//!      ▼
//! CartError "b2b-minimum-order-value" { currentValue: 50.00,
//!                                       minimumValue: 100.00,
//!                                       missing: 50.00 }  ← blocks order
//! ```

use tracing::{debug, trace};

use crate::cart::Cart;
use crate::config::MinimumOrderConfig;
use crate::money::Money;
use crate::pipeline::CartValidator;
use crate::rules::is_b2b_customer;
use crate::types::CheckoutContext;
use crate::validation::{CartError, ErrorCollection};

/// Error id and message key of the shortfall error.
pub const MESSAGE_KEY: &str = "b2b-minimum-order-value";

/// Builds the blocking shortfall error for a cart total below `minimum`.
pub fn minimum_order_error(current: Money, minimum: Money) -> CartError {
    CartError::blocking(MESSAGE_KEY, MESSAGE_KEY)
        .with_parameter("currentValue", current)
        .with_parameter("minimumValue", minimum)
        .with_parameter("missing", minimum - current)
}

#[derive(Debug, Clone)]
pub struct MinimumOrderValueValidator {
    minimum: Money,
}

impl MinimumOrderValueValidator {
    pub fn new(config: &MinimumOrderConfig) -> Self {
        MinimumOrderValueValidator {
            minimum: config.minimum_value,
        }
    }

    pub fn minimum(&self) -> Money {
        self.minimum
    }
}

impl Default for MinimumOrderValueValidator {
    fn default() -> Self {
        Self::new(&MinimumOrderConfig::default())
    }
}

impl CartValidator for MinimumOrderValueValidator {
    fn name(&self) -> &'static str {
        "minimum-order-value"
    }

    fn validate(&self, cart: &Cart, errors: &mut ErrorCollection, context: &CheckoutContext) {
        if !is_b2b_customer(context) {
            trace!("Not a business customer, skipping minimum order check");
            return;
        }

        let total = cart.price.total_price;
        if total < self.minimum {
            debug!(%total, minimum = %self.minimum, "Cart below minimum order value");
            errors.add(minimum_order_error(total, self.minimum));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::*;
    use crate::validation::ErrorLevel;

    fn validate(cents: i64, context: &CheckoutContext) -> ErrorCollection {
        let mut errors = ErrorCollection::new();
        MinimumOrderValueValidator::default().validate(&cart_with_total(cents), &mut errors, context);
        errors
    }

    #[test]
    fn test_b2b_below_minimum_blocks_order() {
        let errors = validate(5000, &b2b_context());

        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.id, "b2b-minimum-order-value");
        assert_eq!(error.message_key, "b2b-minimum-order-value");
        assert_eq!(error.level, ErrorLevel::Error);
        assert!(error.block_order);

        let amount = |name: &str| error.parameter(name).and_then(|p| p.as_amount());
        assert_eq!(amount("currentValue"), Some(Money::from_cents(5000)));
        assert_eq!(amount("minimumValue"), Some(Money::from_cents(10000)));
        assert_eq!(amount("missing"), Some(Money::from_cents(5000)));
    }

    #[test]
    fn test_missing_is_exact_near_boundary() {
        let errors = validate(9999, &b2b_context());
        let missing = errors.first().unwrap().parameter("missing").and_then(|p| p.as_amount());
        assert_eq!(missing, Some(Money::from_cents(1)));

        let errors = validate(0, &b2b_context());
        let missing = errors.first().unwrap().parameter("missing").and_then(|p| p.as_amount());
        assert_eq!(missing, Some(Money::from_cents(10000)));
    }

    #[test]
    fn test_b2b_at_or_above_minimum_passes() {
        assert!(validate(10000, &b2b_context()).is_empty());
        assert!(validate(15000, &b2b_context()).is_empty());
    }

    #[test]
    fn test_ignores_regular_customers_and_guests() {
        assert!(validate(5000, &regular_context()).is_empty());
        assert!(validate(5000, &CheckoutContext::guest()).is_empty());
    }

    #[test]
    fn test_message() {
        let error = minimum_order_error(Money::from_cents(5000), Money::from_cents(10000));
        assert_eq!(
            error.message(),
            "The minimum order value for business customers is 100.00. Add 50.00 more to place the order (current: 50.00)."
        );
    }
}
