//! # Rule Configuration
//!
//! The constants every rule works with, gathered into one typed value.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     B2B_CART_MINIMUM_ORDER_CENTS=10000                                  │
//! │     B2B_CART_UNAVAILABLE_PRODUCTS=sku-1,sku-2                           │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/b2b-cart/rules.toml (Linux)                               │
//! │     ~/Library/Application Support/com.b2b.cart/rules.toml (macOS)      │
//! │                                                                         │
//! │  3. Built-in constants (lowest priority, see crate root)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only constants can be changed. The rules themselves, their order and
//! their tier semantics are fixed in code.
//!
//! ## Configuration File Format
//! ```toml
//! [minimum_order]
//! minimum_value = 10000        # cents
//!
//! [bulk_discount]
//! tiers = [
//!     { min_quantity = 20, discount_bps = 500 },
//!     { min_quantity = 50, discount_bps = 1000 },
//!     { min_quantity = 100, discount_bps = 1500 },
//! ]
//!
//! [bonus_discount]
//! threshold = 50000            # cents, strictly greater than
//! rate_bps = 500
//!
//! [shipping]
//! free_shipping_threshold = 20000
//! default_cost = 1999
//! tiers = [
//!     { max_weight_kg = 1.0, cost = 599 },
//!     { max_weight_kg = 5.0, cost = 999 },
//!     { max_weight_kg = 10.0, cost = 1499 },
//! ]
//!
//! [tax]
//! factor_bps = 8000
//!
//! [availability]
//! unavailable_products = ["unavailable-product-1", "discontinued-product-2"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::money::{Money, BPS_SCALE};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "B2B_CART_";

// =============================================================================
// Minimum Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumOrderConfig {
    /// Smallest cart total a business customer may order.
    #[serde(default = "default_minimum_value")]
    pub minimum_value: Money,
}

fn default_minimum_value() -> Money {
    crate::MINIMUM_ORDER_VALUE
}

impl Default for MinimumOrderConfig {
    fn default() -> Self {
        MinimumOrderConfig {
            minimum_value: default_minimum_value(),
        }
    }
}

// =============================================================================
// Bulk Discount
// =============================================================================

/// Quantities of at least `min_quantity` earn `discount_bps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkTier {
    pub min_quantity: i64,
    pub discount_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDiscountConfig {
    /// Ascending by `min_quantity`.
    #[serde(default = "default_bulk_tiers")]
    pub tiers: Vec<BulkTier>,
}

fn default_bulk_tiers() -> Vec<BulkTier> {
    crate::BULK_DISCOUNT_TIERS
        .iter()
        .map(|&(min_quantity, discount_bps)| BulkTier {
            min_quantity,
            discount_bps,
        })
        .collect()
}

impl Default for BulkDiscountConfig {
    fn default() -> Self {
        BulkDiscountConfig {
            tiers: default_bulk_tiers(),
        }
    }
}

// =============================================================================
// Bonus Discount
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusDiscountConfig {
    /// Product value must exceed this amount.
    #[serde(default = "default_bonus_threshold")]
    pub threshold: Money,

    #[serde(default = "default_bonus_rate")]
    pub rate_bps: u32,
}

fn default_bonus_threshold() -> Money {
    crate::BONUS_DISCOUNT_THRESHOLD
}

fn default_bonus_rate() -> u32 {
    crate::BONUS_DISCOUNT_RATE_BPS
}

impl Default for BonusDiscountConfig {
    fn default() -> Self {
        BonusDiscountConfig {
            threshold: default_bonus_threshold(),
            rate_bps: default_bonus_rate(),
        }
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Weights up to and including `max_weight_kg` ship for `cost`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTier {
    pub max_weight_kg: f64,
    pub cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingConfig {
    /// Ascending by `max_weight_kg`.
    #[serde(default = "default_weight_tiers")]
    pub tiers: Vec<WeightTier>,

    /// Cost above the heaviest tier.
    #[serde(default = "default_shipping_cost")]
    pub default_cost: Money,

    /// Business carts with a total above this amount ship free.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Money,
}

fn default_weight_tiers() -> Vec<WeightTier> {
    crate::SHIPPING_WEIGHT_TIERS
        .iter()
        .map(|&(max_weight_kg, cost)| WeightTier { max_weight_kg, cost })
        .collect()
}

fn default_shipping_cost() -> Money {
    crate::SHIPPING_COST_DEFAULT
}

fn default_free_shipping_threshold() -> Money {
    crate::FREE_SHIPPING_THRESHOLD
}

impl Default for ShippingConfig {
    fn default() -> Self {
        ShippingConfig {
            tiers: default_weight_tiers(),
            default_cost: default_shipping_cost(),
            free_shipping_threshold: default_free_shipping_threshold(),
        }
    }
}

// =============================================================================
// Tax
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Multiplier applied to business tax rates and amounts (8000 = ×0.8).
    #[serde(default = "default_tax_factor")]
    pub factor_bps: u32,
}

fn default_tax_factor() -> u32 {
    crate::TAX_REDUCTION_FACTOR_BPS
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            factor_bps: default_tax_factor(),
        }
    }
}

// =============================================================================
// Availability
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    #[serde(default = "default_unavailable_products")]
    pub unavailable_products: Vec<String>,
}

fn default_unavailable_products() -> Vec<String> {
    crate::UNAVAILABLE_PRODUCTS
        .iter()
        .map(|id| id.to_string())
        .collect()
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        AvailabilityConfig {
            unavailable_products: default_unavailable_products(),
        }
    }
}

// =============================================================================
// Rule Configuration
// =============================================================================

/// Complete rule configuration. `RuleConfig::default()` is exactly the
/// built-in constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub minimum_order: MinimumOrderConfig,
    #[serde(default)]
    pub bulk_discount: BulkDiscountConfig,
    #[serde(default)]
    pub bonus_discount: BonusDiscountConfig,
    #[serde(default)]
    pub shipping: ShippingConfig,
    #[serde(default)]
    pub tax: TaxConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
}

impl RuleConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Built-in constants
    /// 2. Config file (`rules.toml`), if it exists
    /// 3. Environment variables (`B2B_CART_*`)
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading rule config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Rule config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file without applying environment overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(write_err)?;

        info!(?path, "Rule config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.minimum_order.minimum_value.is_negative() {
            return Err(ConfigError::invalid(
                "minimum_order.minimum_value",
                "must not be negative",
            ));
        }

        let mut previous: Option<i64> = None;
        for tier in &self.bulk_discount.tiers {
            if tier.min_quantity <= 0 {
                return Err(ConfigError::invalid(
                    "bulk_discount.tiers",
                    format!("min_quantity must be positive, got {}", tier.min_quantity),
                ));
            }
            if tier.discount_bps > BPS_SCALE {
                return Err(ConfigError::invalid(
                    "bulk_discount.tiers",
                    format!("discount_bps must be at most {}, got {}", BPS_SCALE, tier.discount_bps),
                ));
            }
            if previous.is_some_and(|p| tier.min_quantity <= p) {
                return Err(ConfigError::invalid(
                    "bulk_discount.tiers",
                    "tiers must be strictly ascending by min_quantity",
                ));
            }
            previous = Some(tier.min_quantity);
        }

        if self.bonus_discount.threshold.is_negative() {
            return Err(ConfigError::invalid(
                "bonus_discount.threshold",
                "must not be negative",
            ));
        }
        if self.bonus_discount.rate_bps > BPS_SCALE {
            return Err(ConfigError::invalid(
                "bonus_discount.rate_bps",
                format!("must be at most {}", BPS_SCALE),
            ));
        }

        let mut previous: Option<f64> = None;
        for tier in &self.shipping.tiers {
            if !tier.max_weight_kg.is_finite() || tier.max_weight_kg < 0.0 {
                return Err(ConfigError::invalid(
                    "shipping.tiers",
                    format!("max_weight_kg must be a finite, non-negative number, got {}", tier.max_weight_kg),
                ));
            }
            if tier.cost.is_negative() {
                return Err(ConfigError::invalid("shipping.tiers", "cost must not be negative"));
            }
            if previous.is_some_and(|p| tier.max_weight_kg <= p) {
                return Err(ConfigError::invalid(
                    "shipping.tiers",
                    "tiers must be strictly ascending by max_weight_kg",
                ));
            }
            previous = Some(tier.max_weight_kg);
        }
        if self.shipping.default_cost.is_negative() {
            return Err(ConfigError::invalid("shipping.default_cost", "must not be negative"));
        }
        if self.shipping.free_shipping_threshold.is_negative() {
            return Err(ConfigError::invalid(
                "shipping.free_shipping_threshold",
                "must not be negative",
            ));
        }

        if self.tax.factor_bps > BPS_SCALE {
            return Err(ConfigError::invalid(
                "tax.factor_bps",
                format!("a reduction factor must be at most {}", BPS_SCALE),
            ));
        }

        Ok(())
    }

    /// Applies `B2B_CART_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(format!("{}{}", ENV_PREFIX, name)).ok());
    }

    /// Applies overrides from `lookup`, which receives variable names without
    /// the prefix. Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cents) = parse_override::<i64>(&lookup, "MINIMUM_ORDER_CENTS") {
            debug!(cents, "Overriding minimum order value from environment");
            self.minimum_order.minimum_value = Money::from_cents(cents);
        }

        if let Some(cents) = parse_override::<i64>(&lookup, "BONUS_THRESHOLD_CENTS") {
            self.bonus_discount.threshold = Money::from_cents(cents);
        }

        if let Some(bps) = parse_override::<u32>(&lookup, "BONUS_RATE_BPS") {
            self.bonus_discount.rate_bps = bps;
        }

        if let Some(cents) = parse_override::<i64>(&lookup, "FREE_SHIPPING_CENTS") {
            self.shipping.free_shipping_threshold = Money::from_cents(cents);
        }

        if let Some(bps) = parse_override::<u32>(&lookup, "TAX_FACTOR_BPS") {
            self.tax.factor_bps = bps;
        }

        if let Some(list) = lookup("UNAVAILABLE_PRODUCTS") {
            let products: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            debug!(count = products.len(), "Overriding unavailable products from environment");
            self.availability.unavailable_products = products;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "b2b", "cart")
            .map(|dirs| dirs.config_dir().join("rules.toml"))
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = %format!("{}{}", ENV_PREFIX, name), value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
