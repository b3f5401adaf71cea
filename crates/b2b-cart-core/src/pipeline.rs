//! # Pipeline
//!
//! The two extension points the host cart engine calls, plus a small runner
//! that plays the host's part for tests and the CLI.
//!
//! ## One Calculation Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Recalculation Pass                              │
//! │                                                                         │
//! │  original (&Cart) ──clone──► working (&mut Cart)                        │
//! │                                   │                                     │
//! │           processors, in the order they were registered                 │
//! │           ├── BulkDiscountProcessor                                     │
//! │           ├── BonusDiscountProcessor                                    │
//! │           ├── ShippingCostProcessor                                     │
//! │           └── TaxAdjustmentProcessor                                    │
//! │                                   │                                     │
//! │           validators, in the order they were registered                 │
//! │           ├── ProductAvailabilityValidator ──► ErrorCollection          │
//! │           └── MinimumOrderValueValidator ────► ErrorCollection          │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                    CalculationResult { cart, errors }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A real host interleaves these calls with its own price and tax
//! calculation; this runner does not recompute cart totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, debug_span};

use crate::cart::Cart;
use crate::config::RuleConfig;
use crate::rules::{
    BonusDiscountProcessor, BulkDiscountProcessor, MinimumOrderValueValidator,
    ProductAvailabilityValidator, ShippingCostProcessor, TaxAdjustmentProcessor,
};
use crate::types::CheckoutContext;
use crate::validation::ErrorCollection;

// =============================================================================
// Extension Points
// =============================================================================

/// Checks a cart and reports problems. Must not change the cart.
pub trait CartValidator: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn validate(&self, cart: &Cart, errors: &mut ErrorCollection, context: &CheckoutContext);
}

/// Rewrites the working cart of a pass. `original` is the cart as it was
/// before the pass started and is read only.
pub trait CartProcessor: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    fn process(
        &self,
        data: &CartData,
        original: &Cart,
        to_calculate: &mut Cart,
        context: &CheckoutContext,
        behavior: &CartBehavior,
    );
}

/// Data the host collected for this pass (product lookups and the like),
/// shared by all processors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartData(BTreeMap<String, Value>);

impl CartData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Flags describing why the host runs this pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBehavior {
    /// The pass recalculates an existing order rather than a live cart.
    #[serde(default)]
    pub is_recalculation: bool,
}

// =============================================================================
// Runner
// =============================================================================

/// Output of one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub cart: Cart,
    pub errors: ErrorCollection,
}

/// An ordered list of processors and validators.
///
/// The order is whatever the caller registers; [`CartPipeline::b2b`] only
/// provides the order the rules were written against.
#[derive(Default)]
pub struct CartPipeline {
    processors: Vec<Box<dyn CartProcessor>>,
    validators: Vec<Box<dyn CartValidator>>,
}

impl CartPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six B2B rules configured from `config`.
    pub fn b2b(config: &RuleConfig) -> Self {
        CartPipeline::new()
            .with_processor(BulkDiscountProcessor::new(&config.bulk_discount))
            .with_processor(BonusDiscountProcessor::new(&config.bonus_discount))
            .with_processor(ShippingCostProcessor::new(&config.shipping))
            .with_processor(TaxAdjustmentProcessor::new(&config.tax))
            .with_validator(ProductAvailabilityValidator::new(&config.availability))
            .with_validator(MinimumOrderValueValidator::new(&config.minimum_order))
    }

    pub fn with_processor(mut self, processor: impl CartProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn with_validator(mut self, validator: impl CartValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Runs every processor on a copy of `original`, then every validator on
    /// the result.
    pub fn calculate(
        &self,
        original: &Cart,
        context: &CheckoutContext,
        behavior: &CartBehavior,
    ) -> CalculationResult {
        self.calculate_with_data(&CartData::new(), original, context, behavior)
    }

    pub fn calculate_with_data(
        &self,
        data: &CartData,
        original: &Cart,
        context: &CheckoutContext,
        behavior: &CartBehavior,
    ) -> CalculationResult {
        let span = debug_span!("cart_pass", token = %original.token);
        let _guard = span.enter();

        let mut working = original.clone();
        for processor in &self.processors {
            debug!(processor = processor.name(), "Running processor");
            processor.process(data, original, &mut working, context, behavior);
        }

        let mut errors = ErrorCollection::new();
        for validator in &self.validators {
            debug!(validator = validator.name(), "Running validator");
            validator.validate(&working, &mut errors, context);
        }

        debug!(
            line_items = working.line_items.len(),
            errors = errors.len(),
            blocks_order = errors.blocks_order(),
            "Cart pass finished"
        );

        CalculationResult {
            cart: working,
            errors,
        }
    }
}
