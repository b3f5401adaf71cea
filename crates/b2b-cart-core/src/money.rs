//! # Money Module
//!
//! Provides the `Money` type for every price, total and threshold the cart
//! rules touch.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    10.00 × 0.85 = 8.499999999999998  ❌ bulk discount drifts            │
//! │    500.01 × 0.05 = 25.000500000000002                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    1000 cents × (10000 − 1500) bps / 10000 = 850 cents                  │
//! │    Every rounding step is explicit and half-away-from-zero              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use b2b_cart_core::money::Money;
//!
//! let unit = Money::from_cents(1000);               // 10.00
//! let discounted = unit.apply_percentage_discount(1500); // 15% off
//! assert_eq!(discounted.cents(), 850);
//!
//! let bonus = Money::from_cents(50001).percentage_of(500); // 5% of 500.01
//! assert_eq!(bonus.cents(), 2500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// One hundred percent expressed in basis points.
pub const BPS_SCALE: u32 = 10_000;

/// Divides `numerator` by `denominator`, rounding half away from zero.
///
/// Plain `(n + d/2) / d` is only correct for non-negative `n`; discounts and
/// refunds produce negative amounts, so the sign is handled explicitly.
pub(crate) fn round_div(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discount line items carry negative prices
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: snapshots exchanged with the host are exact
///
/// ## Where Money Flows
/// ```text
/// LineItem.price.unit_price ──► bulk discount ──► LineItem.price.total_price
///                                                        │
///                         bonus discount (5% of Σ) ◄─────┘
///
/// Cart.price.total_price ──► minimum order / free shipping thresholds
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use b2b_cart_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// Quantities come from host snapshots; an absurd quantity pins the total
    /// at the bound instead of wrapping around.
    ///
    /// ```rust
    /// use b2b_cart_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(850);
    /// assert_eq!(unit_price.multiply_quantity(20).cents(), 17000);
    /// assert_eq!(unit_price.multiply_quantity(i64::MAX).cents(), i64::MAX);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `bps` basis points of this amount, rounded to the cent.
    ///
    /// ```rust
    /// use b2b_cart_core::money::Money;
    ///
    /// // 5% of 500.01 = 25.0005 → 25.00
    /// assert_eq!(Money::from_cents(50001).percentage_of(500).cents(), 2500);
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        let cents = round_div(self.0 as i128 * bps as i128, BPS_SCALE as i128);
        Money::from_cents(cents as i64)
    }

    /// Scales the amount by a factor given in basis points (8000 = ×0.8).
    ///
    /// Same arithmetic as [`Money::percentage_of`]; the separate name keeps
    /// call sites that rewrite an amount distinct from ones that take a share.
    #[inline]
    pub fn scale_bps(&self, factor_bps: u32) -> Money {
        self.percentage_of(factor_bps)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    ///
    /// ```rust
    /// use b2b_cart_core::money::Money;
    ///
    /// let unit = Money::from_cents(1000);
    /// assert_eq!(unit.apply_percentage_discount(500).cents(), 950);
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        let remaining = BPS_SCALE.saturating_sub(discount_bps);
        self.percentage_of(remaining)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates at the `i64` bounds.

/// Shows the amount with two decimals and no currency symbol; the currency is
/// a property of the checkout context, not of the amount.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
