//! Quantity-tiered discount on product unit prices.
//!
//! ## Tiers (highest matching tier wins, no stacking)
//! ```text
//!   total product quantity     discount
//!   ──────────────────────     ────────
//!          ≥ 100                 15%
//!          ≥ 50                  10%
//!          ≥ 20                   5%
//!          otherwise              0%
//! ```
//!
//! The discounted unit price is always derived from the list price, so a
//! second pass over an already discounted cart lands on the same prices. Once
//! the quantity falls below the first tier, discounted items go back to their
//! list price.

use tracing::{debug, trace};

use crate::cart::{Cart, LineItem};
use crate::config::{BulkDiscountConfig, BulkTier};
use crate::pipeline::{CartBehavior, CartData, CartProcessor};
use crate::rules::is_b2b_customer;
use crate::types::{CalculatedPrice, CheckoutContext};

/// Returns the discount in basis points earned by `quantity`.
pub fn discount_for_quantity(tiers: &[BulkTier], quantity: i64) -> u32 {
    tiers
        .iter()
        .filter(|tier| quantity >= tier.min_quantity)
        .max_by_key(|tier| tier.min_quantity)
        .map_or(0, |tier| tier.discount_bps)
}

/// Replaces the price of `item` with its list price less `discount_bps`.
/// Unpriced items are left alone.
pub fn apply_discount(item: &mut LineItem, discount_bps: u32) {
    let Some(price) = item.price.as_ref() else {
        return;
    };

    let list_price = price.base_unit_price();
    let unit_price = list_price.apply_percentage_discount(discount_bps);

    let mut discounted = CalculatedPrice::untaxed(
        unit_price,
        unit_price.multiply_quantity(item.quantity),
        item.quantity,
    );
    discounted.list_price = Some(list_price);
    item.price = Some(discounted);
}

/// Puts a previously discounted `item` back on its list price. Returns whether
/// the price changed.
pub fn restore_list_price(item: &mut LineItem) -> bool {
    let Some(list_price) = item.price.as_ref().and_then(|price| price.list_price) else {
        return false;
    };

    item.price = Some(CalculatedPrice::untaxed(
        list_price,
        list_price.multiply_quantity(item.quantity),
        item.quantity,
    ));
    true
}

#[derive(Debug, Clone)]
pub struct BulkDiscountProcessor {
    tiers: Vec<BulkTier>,
}

impl BulkDiscountProcessor {
    pub fn new(config: &BulkDiscountConfig) -> Self {
        BulkDiscountProcessor {
            tiers: config.tiers.clone(),
        }
    }

    pub fn discount_bps(&self, quantity: i64) -> u32 {
        discount_for_quantity(&self.tiers, quantity)
    }
}

impl Default for BulkDiscountProcessor {
    fn default() -> Self {
        Self::new(&BulkDiscountConfig::default())
    }
}

impl CartProcessor for BulkDiscountProcessor {
    fn name(&self) -> &'static str {
        "bulk-discount"
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
            trace!("Not a business customer, skipping bulk discount");
            return;
        }

        let quantity = to_calculate.product_quantity();
        let discount_bps = self.discount_bps(quantity);
        if discount_bps == 0 {
            let mut restored = 0usize;
            for item in to_calculate.line_items.products_mut() {
                if restore_list_price(item) {
                    restored += 1;
                }
            }
            if restored > 0 {
                debug!(quantity, restored, "Quantity below the first bulk tier, list prices restored");
            } else {
                trace!(quantity, "Quantity below the first bulk tier");
            }
            return;
        }

        debug!(quantity, discount_bps, "Applying bulk discount");
        for item in to_calculate.line_items.products_mut() {
            apply_discount(item, discount_bps);
        }
    }
}
