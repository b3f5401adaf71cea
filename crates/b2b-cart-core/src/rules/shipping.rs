//! Weight-based shipping costs with free shipping for large business carts.
//!
//! ## Tiers (inclusive upper bounds)
//! ```text
//!   total weight (kg)      cost
//!   ─────────────────      ─────
//!        ≤ 1.0              5.99
//!        ≤ 5.0              9.99
//!        ≤ 10.0            14.99
//!        heavier           19.99
//!
//!   B2B and cart total > 200.00  ──►  0.00, whatever the weight
//! ```

use tracing::{debug, trace};

use crate::cart::Cart;
use crate::config::{ShippingConfig, WeightTier};
use crate::money::Money;
use crate::pipeline::{CartBehavior, CartData, CartProcessor};
use crate::rules::is_b2b_customer;
use crate::types::{CalculatedPrice, CheckoutContext};

#[derive(Debug, Clone)]
pub struct ShippingCostProcessor {
    tiers: Vec<WeightTier>,
    default_cost: Money,
    free_shipping_threshold: Money,
}

impl ShippingCostProcessor {
    pub fn new(config: &ShippingConfig) -> Self {
        ShippingCostProcessor {
            tiers: config.tiers.clone(),
            default_cost: config.default_cost,
            free_shipping_threshold: config.free_shipping_threshold,
        }
    }

    /// Cost of shipping `weight_kg`: the first tier whose bound is not
    /// exceeded, or the default cost.
    pub fn cost_for_weight(&self, weight_kg: f64) -> Money {
        self.tiers
            .iter()
            .find(|tier| weight_kg <= tier.max_weight_kg)
            .map_or(self.default_cost, |tier| tier.cost)
    }

    /// Shipping cost for `cart` in `context`.
    pub fn shipping_cost(&self, cart: &Cart, context: &CheckoutContext) -> Money {
        if is_b2b_customer(context) && cart.price.total_price > self.free_shipping_threshold {
            trace!(total = %cart.price.total_price, "Free shipping for business cart");
            return Money::zero();
        }
        self.cost_for_weight(cart.product_weight())
    }
}

impl Default for ShippingCostProcessor {
    fn default() -> Self {
        Self::new(&ShippingConfig::default())
    }
}

impl CartProcessor for ShippingCostProcessor {
    fn name(&self) -> &'static str {
        "shipping-cost"
    }

    fn process(
        &self,
        _data: &CartData,
        _original: &Cart,
        to_calculate: &mut Cart,
        context: &CheckoutContext,
        _behavior: &CartBehavior,
    ) {
        if to_calculate.deliveries.is_empty() {
            trace!("Cart has no deliveries");
            return;
        }

        let cost = self.shipping_cost(to_calculate, context);
        debug!(
            weight_kg = to_calculate.product_weight(),
            %cost,
            deliveries = to_calculate.deliveries.len(),
            "Setting shipping costs"
        );

        for delivery in &mut to_calculate.deliveries {
            delivery.shipping_costs = CalculatedPrice::flat(cost);
        }
    }
}
