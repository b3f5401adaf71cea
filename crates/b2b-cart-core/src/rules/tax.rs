//! Reduced tax for business customers.
//!
//! Every entry of the cart's tax breakdown is rebuilt with rate and amount
//! multiplied by the reduction factor (0.8); the taxed base price is kept.
//! Rebuilt entries remember the host-calculated values, so a second pass
//! derives from those rather than reducing twice.

use tracing::{debug, trace};

use crate::cart::Cart;
use crate::config::TaxConfig;
use crate::pipeline::{CartBehavior, CartData, CartProcessor};
use crate::rules::is_b2b_customer;
use crate::types::{CalculatedTax, CheckoutContext};

#[derive(Debug, Clone)]
pub struct TaxAdjustmentProcessor {
    factor_bps: u32,
}

impl TaxAdjustmentProcessor {
    pub fn new(config: &TaxConfig) -> Self {
        TaxAdjustmentProcessor {
            factor_bps: config.factor_bps,
        }
    }

    /// Returns the reduced entry for `tax`.
    pub fn adjust(&self, tax: &CalculatedTax) -> CalculatedTax {
        let origin = tax.origin();
        CalculatedTax {
            tax: origin.tax.scale_bps(self.factor_bps),
            tax_rate: origin.tax_rate.scale_bps(self.factor_bps),
            price: tax.price,
            origin: Some(origin),
        }
    }
}

impl Default for TaxAdjustmentProcessor {
    fn default() -> Self {
        Self::new(&TaxConfig::default())
    }
}

impl CartProcessor for TaxAdjustmentProcessor {
    fn name(&self) -> &'static str {
        "tax-adjustment"
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
            trace!("Not a business customer, taxes unchanged");
            return;
        }

        let adjusted: Vec<CalculatedTax> = to_calculate
            .price
            .calculated_taxes
            .iter()
            .map(|tax| self.adjust(tax))
            .collect();

        debug!(entries = adjusted.len(), factor_bps = self.factor_bps, "Reducing business taxes");
        to_calculate.price.calculated_taxes = adjusted;
    }
}
