//! Blocks checkout for products that can no longer be ordered.
//!
//! The unavailable products are a fixed list here; a deployment backed by a
//! live inventory replaces this validator rather than the list.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::cart::{Cart, LineItem};
use crate::config::AvailabilityConfig;
use crate::pipeline::CartValidator;
use crate::rules::is_b2b_customer;
use crate::types::CheckoutContext;
use crate::validation::{CartError, ErrorCollection};

/// Message key shared by all unavailability errors.
pub const MESSAGE_KEY: &str = "product-unavailable";

/// Builds the blocking error for `product_id`. The id embeds the product so
/// several unavailable products each keep their own error.
pub fn product_unavailable_error(product_id: &str) -> CartError {
    CartError::blocking(format!("{}-{}", MESSAGE_KEY, product_id), MESSAGE_KEY)
        .with_parameter("productId", product_id)
}

#[derive(Debug, Clone)]
pub struct ProductAvailabilityValidator {
    unavailable: HashSet<String>,
}

impl ProductAvailabilityValidator {
    pub fn new(config: &AvailabilityConfig) -> Self {
        ProductAvailabilityValidator {
            unavailable: config.unavailable_products.iter().cloned().collect(),
        }
    }

    pub fn is_available(&self, product_id: &str) -> bool {
        !self.unavailable.contains(product_id)
    }

    fn validate_line_item(&self, item: &LineItem, errors: &mut ErrorCollection) {
        let product_id = item.product_id();
        if !self.is_available(product_id) {
            debug!(product_id, "Product is no longer available");
            errors.add(product_unavailable_error(product_id));
        }
    }
}

impl Default for ProductAvailabilityValidator {
    fn default() -> Self {
        Self::new(&AvailabilityConfig::default())
    }
}

impl CartValidator for ProductAvailabilityValidator {
    fn name(&self) -> &'static str {
        "product-availability"
    }

    fn validate(&self, cart: &Cart, errors: &mut ErrorCollection, context: &CheckoutContext) {
        if !is_b2b_customer(context) {
            trace!("Not a business customer, skipping availability check");
            return;
        }

        for item in cart.line_items.products() {
            self.validate_line_item(item, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::LineItemType;
    use crate::money::Money;
    use crate::rules::fixtures::*;
    use crate::validation::ErrorLevel;

    fn cart_with_products(ids: &[&str]) -> Cart {
        let mut cart = Cart::with_token("test-cart");
        for id in ids {
            cart.add(LineItem::product(*id, Money::from_cents(1000), 1));
        }
        cart
    }

    fn validate(cart: &Cart, context: &CheckoutContext) -> ErrorCollection {
        let mut errors = ErrorCollection::new();
        ProductAvailabilityValidator::default().validate(cart, &mut errors, context);
        errors
    }

    #[test]
    fn test_available_products_pass() {
        let cart = cart_with_products(&["product-a", "product-b"]);
        assert!(validate(&cart, &b2b_context()).is_empty());
    }

    #[test]
    fn test_unavailable_product_blocks_order() {
        let cart = cart_with_products(&["product-a", "unavailable-product-1"]);
        let errors = validate(&cart, &b2b_context());

        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.message_key, "product-unavailable");
        assert_eq!(error.level, ErrorLevel::Error);
        assert!(error.block_order);
        assert!(!error.persistent);
        assert_eq!(
            error.parameter("productId").and_then(|p| p.as_text()),
            Some("unavailable-product-1")
        );
        assert_eq!(error.message(), "Product unavailable-product-1 is no longer available.");
    }

    #[test]
    fn test_continues_after_first_hit() {
        let cart = cart_with_products(&["unavailable-product-1", "product-a", "discontinued-product-2"]);
        let errors = validate(&cart, &b2b_context());

        assert_eq!(errors.len(), 2);
        let ids: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.parameter("productId").and_then(|p| p.as_text()))
            .collect();
        assert_eq!(ids, ["unavailable-product-1", "discontinued-product-2"]);
    }

    #[test]
    fn test_uses_referenced_id() {
        let mut cart = Cart::with_token("test-cart");
        let mut item = LineItem::product("line-1", Money::from_cents(1000), 1);
        item.referenced_id = Some("discontinued-product-2".into());
        cart.add(item);

        assert_eq!(validate(&cart, &b2b_context()).len(), 1);
    }

    #[test]
    fn test_non_product_items_are_not_checked() {
        let mut cart = Cart::with_token("test-cart");
        cart.add(LineItem::new("unavailable-product-1", LineItemType::Promotion));
        assert!(validate(&cart, &b2b_context()).is_empty());
    }

    #[test]
    fn test_ignores_regular_customers() {
        let cart = cart_with_products(&["unavailable-product-1"]);
        assert!(validate(&cart, &regular_context()).is_empty());
    }

    #[test]
    fn test_empty_cart() {
        assert!(validate(&Cart::with_token("empty"), &b2b_context()).is_empty());
    }
}
