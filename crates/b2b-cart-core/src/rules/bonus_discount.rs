//! Flat bonus discount for large business carts.
//!
//! ## Lifecycle of the bonus line item
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product value (Σ product totals, after bulk discount)                  │
//! │       │                                                                 │
//! │       ├── B2B and value > 500.00 ──► add/replace "b2b-bonus-discount"   │
//! │       │                              unit = total = −5% of value        │
//! │       │                                                                 │
//! │       └── otherwise ───────────────► remove "b2b-bonus-discount"        │
//! │                                                                         │
//! │  At most one bonus line item exists after every pass.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::json;
use tracing::{debug, trace};

use crate::cart::{Cart, LineItem, LineItemType};
use crate::config::BonusDiscountConfig;
use crate::money::Money;
use crate::pipeline::{CartBehavior, CartData, CartProcessor};
use crate::rules::is_b2b_customer;
use crate::types::{CalculatedPrice, CheckoutContext};

/// Line item id of the bonus discount.
pub const BONUS_DISCOUNT_ID: &str = "b2b-bonus-discount";

pub const BONUS_DISCOUNT_LABEL: &str = "B2B Bonus Discount";

/// Builds the bonus line item for a discount of `amount` (positive).
///
/// The item is not a physical good and can be neither stacked nor removed by
/// the customer.
pub fn bonus_line_item(amount: Money, rate_bps: u32) -> LineItem {
    let mut item = LineItem::new(BONUS_DISCOUNT_ID, LineItemType::Promotion)
        .with_label(BONUS_DISCOUNT_LABEL)
        .with_payload_value("discountType", "percentage")
        .with_payload_value("rateBps", json!(rate_bps));
    item.good = false;
    item.stackable = false;
    item.removable = false;
    item.price = Some(CalculatedPrice::flat(-amount));
    item
}

#[derive(Debug, Clone)]
pub struct BonusDiscountProcessor {
    threshold: Money,
    rate_bps: u32,
}

impl BonusDiscountProcessor {
    pub fn new(config: &BonusDiscountConfig) -> Self {
        BonusDiscountProcessor {
            threshold: config.threshold,
            rate_bps: config.rate_bps,
        }
    }

    /// Discount earned by `value`, or `None` at or below the threshold.
    pub fn discount_for(&self, value: Money) -> Option<Money> {
        (value > self.threshold).then(|| value.percentage_of(self.rate_bps))
    }
}

impl Default for BonusDiscountProcessor {
    fn default() -> Self {
        Self::new(&BonusDiscountConfig::default())
    }
}

fn remove_bonus(cart: &mut Cart) {
    if cart.remove(BONUS_DISCOUNT_ID).is_some() {
        debug!("Removed bonus discount line item");
    }
}

impl CartProcessor for BonusDiscountProcessor {
    fn name(&self) -> &'static str {
        "bonus-discount"
    }

    fn process(
        &self,
        _data: &CartData,
        _original: &Cart,
        to_calculate: &mut Cart,
        context: &CheckoutContext,
        _behavior: &CartBehavior,
    ) {
        if !is_b2b_customer(context) {
            trace!("Not a business customer, no bonus discount");
            remove_bonus(to_calculate);
            return;
        }

        let value = to_calculate.product_value();
        match self.discount_for(value) {
            Some(amount) => {
                debug!(%value, %amount, "Applying bonus discount");
                to_calculate.add(bonus_line_item(amount, self.rate_bps));
            }
            None => {
                trace!(%value, threshold = %self.threshold, "Product value at or below bonus threshold");
                remove_bonus(to_calculate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::*;

    fn cart_with_value(cents: i64) -> Cart {
        let mut cart = Cart::with_token("test-cart");
        cart.add(LineItem::product("test-product", Money::from_cents(cents), 1));
        cart
    }

    fn run(cart: &mut Cart, context: &CheckoutContext) {
        let original = cart.clone();
        BonusDiscountProcessor::default().process(
            &CartData::new(),
            &original,
            cart,
            context,
            &CartBehavior::default(),
        );
    }

    fn bonus_price(cart: &Cart) -> Option<Money> {
        cart.line_items
            .get(BONUS_DISCOUNT_ID)
            .and_then(|item| item.price.as_ref())
            .map(|price| price.unit_price)
    }

    #[test]
    fn test_no_discount_at_threshold() {
        let mut cart = cart_with_value(50000);
        run(&mut cart, &b2b_context());
        assert!(!cart.has(BONUS_DISCOUNT_ID));
    }

    #[test]
    fn test_discount_just_above_threshold() {
        let mut cart = cart_with_value(50001);
        run(&mut cart, &b2b_context());

        let item = cart.line_items.get(BONUS_DISCOUNT_ID).unwrap();
        let price = item.price.as_ref().unwrap();
        // −0.05 × 500.01 = −25.0005 → −25.00
        assert_eq!(price.unit_price, Money::from_cents(-2500));
        assert_eq!(price.total_price, Money::from_cents(-2500));
        assert_eq!(item.line_item_type, LineItemType::Promotion);
        assert_eq!(item.label.as_deref(), Some(BONUS_DISCOUNT_LABEL));
        assert!(!item.good);
        assert!(!item.stackable);
        assert!(!item.removable);
    }

    #[test]
    fn test_discount_on_large_cart() {
        let mut cart = cart_with_value(100000);
        run(&mut cart, &b2b_context());
        assert_eq!(bonus_price(&cart), Some(Money::from_cents(-5000)));
    }

    #[test]
    fn test_rerun_keeps_single_line_item() {
        let mut cart = cart_with_value(80000);
        run(&mut cart, &b2b_context());
        let once = cart.clone();
        run(&mut cart, &b2b_context());

        assert_eq!(cart, once);
        assert_eq!(cart.line_items.iter().filter(|i| i.id == BONUS_DISCOUNT_ID).count(), 1);
    }

    #[test]
    fn test_existing_bonus_is_recalculated() {
        let mut cart = cart_with_value(80000);
        run(&mut cart, &b2b_context());

        cart.line_items.get_mut("test-product").unwrap().price =
            Some(CalculatedPrice::flat(Money::from_cents(60000)));
        run(&mut cart, &b2b_context());

        assert_eq!(bonus_price(&cart), Some(Money::from_cents(-3000)));
        assert_eq!(cart.line_items.len(), 2);
    }

    #[test]
    fn test_bonus_removed_when_value_drops() {
        let mut cart = cart_with_value(80000);
        run(&mut cart, &b2b_context());
        assert!(cart.has(BONUS_DISCOUNT_ID));

        cart.line_items.get_mut("test-product").unwrap().price =
            Some(CalculatedPrice::flat(Money::from_cents(40000)));
        run(&mut cart, &b2b_context());
        assert!(!cart.has(BONUS_DISCOUNT_ID));
    }

    #[test]
    fn test_bonus_removed_for_regular_customers() {
        let mut cart = cart_with_value(80000);
        cart.add(bonus_line_item(Money::from_cents(4000), 500));

        run(&mut cart, &regular_context());

        assert!(!cart.has(BONUS_DISCOUNT_ID));
        assert_eq!(cart.line_items.len(), 1);
    }

    #[test]
    fn test_regular_customer_without_bonus_is_untouched() {
        let mut cart = cart_with_value(80000);
        let before = cart.clone();
        run(&mut cart, &regular_context());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_bonus_does_not_count_towards_value() {
        let processor = BonusDiscountProcessor::default();
        let mut cart = cart_with_value(50001);
        run(&mut cart, &b2b_context());
        assert_eq!(cart.product_value(), Money::from_cents(50001));
        assert_eq!(processor.discount_for(cart.product_value()), Some(Money::from_cents(2500)));
    }
}
