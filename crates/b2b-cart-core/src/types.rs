//! # Domain Types
//!
//! Value types the host hands to the cart rules: prices, taxes, deliveries
//! and the checkout context.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │ CalculatedPrice  │   │    CartPrice     │   │    Delivery     │      │
//! │  │  ──────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  unit_price      │   │  net_price       │   │  shipping_      │      │
//! │  │  total_price     │   │  total_price     │   │  method_id      │      │
//! │  │  quantity        │   │  position_price  │   │  shipping_costs │      │
//! │  │  taxes / rules   │   │  taxes / rules   │   │  (Calculated-   │      │
//! │  │  list_price      │   │  tax_status      │   │   Price)        │      │
//! │  └──────────────────┘   └──────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    TaxRate       │   │  CalculatedTax   │   │ CheckoutContext │      │
//! │  │  bps (u32)       │   │  tax, rate,      │   │  customer       │      │
//! │  │  2000 = 20%      │   │  price, origin   │   │  └─ company     │      │
//! │  └──────────────────┘   └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All price types are replaced wholesale by the rules, never patched field
//! by field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{Money, BPS_SCALE};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20% (a typical VAT rate), 1600 bps after the B2B reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        TaxRate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Scales the rate by a factor in basis points, rounding half up.
    ///
    /// ```rust
    /// use b2b_cart_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::from_percent(20).scale_bps(8000), TaxRate::from_percent(16));
    /// ```
    pub fn scale_bps(&self, factor_bps: u32) -> TaxRate {
        let scaled = (self.0 as u64 * factor_bps as u64 + BPS_SCALE as u64 / 2) / BPS_SCALE as u64;
        TaxRate(scaled as u32)
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = (self.0 / 100, self.0 % 100);
        if fraction == 0 {
            write!(f, "{}%", whole)
        } else if fraction % 10 == 0 {
            write!(f, "{}.{}%", whole, fraction / 10)
        } else {
            write!(f, "{}.{:02}%", whole, fraction)
        }
    }
}

// =============================================================================
// Taxes
// =============================================================================

/// Host-calculated values a rewritten [`CalculatedTax`] was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOrigin {
    pub tax: Money,
    pub tax_rate: TaxRate,
}

/// One entry of a tax breakdown: `tax` owed at `tax_rate` on `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedTax {
    pub tax: Money,
    pub tax_rate: TaxRate,
    pub price: Money,
    /// Set when a rule rewrote this entry; rules always derive from the origin,
    /// never from an already-rewritten amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<TaxOrigin>,
}

impl CalculatedTax {
    pub fn new(tax: Money, tax_rate: TaxRate, price: Money) -> Self {
        CalculatedTax {
            tax,
            tax_rate,
            price,
            origin: None,
        }
    }

    /// Returns the host-calculated values of this entry.
    pub fn origin(&self) -> TaxOrigin {
        self.origin.unwrap_or(TaxOrigin {
            tax: self.tax,
            tax_rate: self.tax_rate,
        })
    }
}

/// Tax breakdown of a price or cart.
pub type CalculatedTaxCollection = Vec<CalculatedTax>;

/// A tax rule: `percentage` (in bps) of the price is taxed at `tax_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    pub tax_rate: TaxRate,
    #[serde(default = "full_share")]
    pub percentage_bps: u32,
}

fn full_share() -> u32 {
    BPS_SCALE
}

pub type TaxRuleCollection = Vec<TaxRule>;

// =============================================================================
// Calculated Price
// =============================================================================

/// Price of a line item or delivery as calculated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedPrice {
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default = "one")]
    pub quantity: i64,
    #[serde(default)]
    pub calculated_taxes: CalculatedTaxCollection,
    #[serde(default)]
    pub tax_rules: TaxRuleCollection,
    /// Undiscounted unit price, kept once a rule has rewritten `unit_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Money>,
}

fn one() -> i64 {
    1
}

impl CalculatedPrice {
    /// A price with empty tax breakdown and rules; the host recalculates them
    /// downstream.
    pub fn untaxed(unit_price: Money, total_price: Money, quantity: i64) -> Self {
        CalculatedPrice {
            unit_price,
            total_price,
            quantity,
            calculated_taxes: Vec::new(),
            tax_rules: Vec::new(),
            list_price: None,
        }
    }

    /// A flat amount for a single unit (shipping costs, discount lines).
    pub fn flat(amount: Money) -> Self {
        Self::untaxed(amount, amount, 1)
    }

    /// Returns the unit price before any rule rewrote it.
    pub fn base_unit_price(&self) -> Money {
        self.list_price.unwrap_or(self.unit_price)
    }
}

// =============================================================================
// Cart Price
// =============================================================================

/// Whether prices are shown with or without tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Gross,
    Net,
    TaxFree,
}

/// Aggregate price of the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPrice {
    pub net_price: Money,
    pub total_price: Money,
    pub position_price: Money,
    #[serde(default)]
    pub calculated_taxes: CalculatedTaxCollection,
    #[serde(default)]
    pub tax_rules: TaxRuleCollection,
    #[serde(default)]
    pub tax_status: TaxStatus,
}

impl CartPrice {
    /// A tax-less price where net, total and position price are all `total`.
    pub fn with_total(total: Money) -> Self {
        CartPrice {
            net_price: total,
            total_price: total,
            position_price: total,
            ..CartPrice::default()
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// One shipment of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub shipping_method_id: String,
    pub shipping_costs: CalculatedPrice,
}

impl Delivery {
    pub fn new(shipping_method_id: impl Into<String>) -> Self {
        Delivery {
            shipping_method_id: shipping_method_id.into(),
            shipping_costs: CalculatedPrice::flat(Money::zero()),
        }
    }
}

// =============================================================================
// Customer & Context
// =============================================================================

/// The customer resolved by the host. Only `company` is consulted by the rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl Customer {
    pub fn new(id: impl Into<String>) -> Self {
        Customer {
            id: id.into(),
            company: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

/// Per-request context supplied by the host with every callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl CheckoutContext {
    /// A context with no logged-in customer.
    pub fn guest() -> Self {
        CheckoutContext {
            customer: None,
            currency: default_currency(),
        }
    }

    pub fn for_customer(customer: Customer) -> Self {
        CheckoutContext {
            customer: Some(customer),
            currency: default_currency(),
        }
    }
}

impl Default for CheckoutContext {
    fn default() -> Self {
        Self::guest()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_scaling() {
        let rate = TaxRate::from_percent(20);
        assert_eq!(rate.bps(), 2000);
        assert_eq!(rate.scale_bps(8000).bps(), 1600);
        assert_eq!(TaxRate::from_bps(1900).scale_bps(8000).bps(), 1520);
        assert_eq!(TaxRate::from_bps(825).scale_bps(8000).bps(), 660);
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_bps(1600).to_string(), "16%");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(TaxRate::from_bps(1520).to_string(), "15.2%");
        assert_eq!(TaxRate::from_bps(705).to_string(), "7.05%");
    }

    #[test]
    fn test_calculated_tax_origin_defaults_to_self() {
        let tax = CalculatedTax::new(Money::from_cents(2000), TaxRate::from_percent(20), Money::from_cents(10000));
        let origin = tax.origin();
        assert_eq!(origin.tax, Money::from_cents(2000));
        assert_eq!(origin.tax_rate, TaxRate::from_percent(20));
    }

    #[test]
    fn test_base_unit_price_prefers_list_price() {
        let mut price = CalculatedPrice::untaxed(Money::from_cents(850), Money::from_cents(850), 1);
        assert_eq!(price.base_unit_price(), Money::from_cents(850));

        price.list_price = Some(Money::from_cents(1000));
        assert_eq!(price.base_unit_price(), Money::from_cents(1000));
    }

    #[test]
    fn test_context_deserializes_without_customer() {
        let context: CheckoutContext = serde_json::from_str("{}").unwrap();
        assert!(context.customer.is_none());
        assert_eq!(context.currency, "EUR");
    }

    #[test]
    fn test_price_json_shape() {
        let price = CalculatedPrice::flat(Money::from_cents(599));
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["unitPrice"], 599);
        assert_eq!(json["totalPrice"], 599);
        assert!(json.get("listPrice").is_none());
    }
}
