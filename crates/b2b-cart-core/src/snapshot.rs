//! JSON exchange format for running a pass outside the host.
//!
//! ```json
//! {
//!   "cart": { "token": "...", "lineItems": [...], "price": {...}, "deliveries": [...] },
//!   "context": { "customer": { "id": "c-1", "company": "ACME" } },
//!   "behavior": { "isRecalculation": false }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::CoreResult;
use crate::pipeline::{CalculationResult, CartBehavior, CartPipeline};
use crate::types::CheckoutContext;

/// A cart together with the context of the pass it is calculated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart: Cart,
    #[serde(default)]
    pub context: CheckoutContext,
    #[serde(default)]
    pub behavior: CartBehavior,
}

impl CartSnapshot {
    pub fn new(cart: Cart, context: CheckoutContext) -> Self {
        CartSnapshot {
            cart,
            context,
            behavior: CartBehavior::default(),
        }
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Runs `pipeline` over the snapshot.
    pub fn calculate(&self, pipeline: &CartPipeline) -> CalculationResult {
        pipeline.calculate(&self.cart, &self.context, &self.behavior)
    }
}
