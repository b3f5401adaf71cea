//! # b2b-cart-core: B2B Cart Rules
//!
//! Validators and processors a host cart engine calls while it recalculates
//! a cart. Every rule only acts for business customers, i.e. customers with
//! a company.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Host Cart Engine                                 │
//! │                                                                         │
//! │   add to cart ──► recalculation pass ──► checkout (blocked on errors)   │
//! │                         │                                               │
//! │  ┌──────────────────────▼──────────────────────────────────────────┐   │
//! │  │               ★ b2b-cart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │ pipeline  │  │   rules   │  │   │
//! │  │   │   Money   │  │   Cart    │  │ Processor │  │ discounts │  │   │
//! │  │   │  TaxRate  │  │ LineItem  │  │ Validator │  │ shipping  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O DURING A PASS • NO SHARED STATE • INTEGER MONEY        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Prices, taxes, deliveries and the checkout context
//! - [`cart`] - Cart and line items
//! - [`validation`] - Cart errors reported by validators
//! - [`pipeline`] - The validator and processor extension points
//! - [`rules`] - The six B2B rules
//! - [`config`] - Rule constants, optionally loaded from TOML and env
//! - [`snapshot`] - JSON carts for running a pass outside the host
//! - [`error`] - Crate error types
//!
//! ## Example Usage
//!
//! ```rust
//! use b2b_cart_core::cart::{Cart, LineItem};
//! use b2b_cart_core::config::RuleConfig;
//! use b2b_cart_core::money::Money;
//! use b2b_cart_core::pipeline::{CartBehavior, CartPipeline};
//! use b2b_cart_core::types::{CheckoutContext, Customer};
//!
//! let mut cart = Cart::new();
//! cart.add(LineItem::product("sku-1", Money::from_cents(1000), 25));
//!
//! let context = CheckoutContext::for_customer(Customer::new("c-1").with_company("ACME"));
//! let result = CartPipeline::b2b(&RuleConfig::default())
//!     .calculate(&cart, &context, &CartBehavior::default());
//!
//! // 25 units earn 5% off: 10.00 → 9.50
//! let price = result.cart.line_items.get("sku-1").unwrap().price.as_ref().unwrap();
//! assert_eq!(price.unit_price.cents(), 950);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod config;
pub mod error;
pub mod money;
pub mod pipeline;
pub mod rules;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, LineItem, LineItemCollection, LineItemType};
pub use config::RuleConfig;
pub use error::{ConfigError, CoreError, CoreResult};
pub use money::Money;
pub use pipeline::{CalculationResult, CartBehavior, CartData, CartPipeline, CartProcessor, CartValidator};
pub use snapshot::CartSnapshot;
pub use types::*;
pub use validation::{CartError, ErrorCollection, ErrorLevel, ErrorParameter};

// =============================================================================
// Crate-Level Constants
// =============================================================================
// Built-in defaults of `RuleConfig`.

/// Business carts below this total cannot be ordered.
pub const MINIMUM_ORDER_VALUE: Money = Money::from_cents(10_000);

/// `(minimum quantity, discount in bps)`, ascending. The highest tier whose
/// minimum is reached applies.
pub const BULK_DISCOUNT_TIERS: &[(i64, u32)] = &[(20, 500), (50, 1_000), (100, 1_500)];

/// Product value must be strictly greater than this to earn the bonus.
pub const BONUS_DISCOUNT_THRESHOLD: Money = Money::from_cents(50_000);

/// 5% of the product value.
pub const BONUS_DISCOUNT_RATE_BPS: u32 = 500;

/// Business carts with a total strictly greater than this ship free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(20_000);

/// `(maximum weight in kg, cost)`, ascending, bounds inclusive.
pub const SHIPPING_WEIGHT_TIERS: &[(f64, Money)] = &[
    (1.0, Money::from_cents(599)),
    (5.0, Money::from_cents(999)),
    (10.0, Money::from_cents(1_499)),
];

/// Shipping cost above the heaviest tier.
pub const SHIPPING_COST_DEFAULT: Money = Money::from_cents(1_999);

/// Business tax rates and amounts are multiplied by 0.8.
pub const TAX_REDUCTION_FACTOR_BPS: u32 = 8_000;

/// Product ids that can no longer be ordered.
pub const UNAVAILABLE_PRODUCTS: &[&str] = &["unavailable-product-1", "discontinued-product-2"];
