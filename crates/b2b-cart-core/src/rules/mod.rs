//! # Cart Rules
//!
//! One module per rule. Every rule is gated by [`is_b2b_customer`]; for
//! anyone else each rule leaves the prices and the error collection
//! untouched (the bonus discount only removes a stale bonus line item).
//!
//! ```text
//! ┌──────────────────────┬────────────┬──────────────────────────────────────┐
//! │ Rule                 │ Kind       │ Effect for business customers        │
//! ├──────────────────────┼────────────┼──────────────────────────────────────┤
//! │ availability         │ validator  │ error per unavailable product        │
//! │ minimum_order        │ validator  │ error when total < 100.00            │
//! │ bulk_discount        │ processor  │ 5/10/15% off unit prices by quantity │
//! │ bonus_discount       │ processor  │ −5% line item above 500.00           │
//! │ shipping             │ processor  │ weight tier cost, free above 200.00  │
//! │ tax                  │ processor  │ tax rate and amount × 0.8            │
//! └──────────────────────┴────────────┴──────────────────────────────────────┘
//! ```

pub mod availability;
pub mod bonus_discount;
pub mod bulk_discount;
pub mod minimum_order;
pub mod shipping;
pub mod tax;

use crate::types::CheckoutContext;

pub use availability::ProductAvailabilityValidator;
pub use bonus_discount::BonusDiscountProcessor;
pub use bulk_discount::BulkDiscountProcessor;
pub use minimum_order::MinimumOrderValueValidator;
pub use shipping::ShippingCostProcessor;
pub use tax::TaxAdjustmentProcessor;

/// Returns true when the context belongs to a business customer: a customer
/// is logged in and has a non-blank company.
pub fn is_b2b_customer(context: &CheckoutContext) -> bool {
    context
        .customer
        .as_ref()
        .and_then(|customer| customer.company.as_deref())
        .is_some_and(|company| !company.trim().is_empty())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::types::Customer;

    #[test]
    fn test_company_makes_b2b() {
        assert!(is_b2b_customer(&b2b_context()));
    }

    #[test]
    fn test_missing_company_or_customer_is_not_b2b() {
        assert!(!is_b2b_customer(&regular_context()));
        assert!(!is_b2b_customer(&CheckoutContext::guest()));
    }

    #[test]
    fn test_blank_company_is_not_b2b() {
        let empty = CheckoutContext::for_customer(Customer::new("c").with_company(""));
        let blank = CheckoutContext::for_customer(Customer::new("c").with_company("   "));
        assert!(!is_b2b_customer(&empty));
        assert!(!is_b2b_customer(&blank));
    }
}
