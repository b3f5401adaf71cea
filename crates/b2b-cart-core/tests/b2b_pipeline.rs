//! End-to-end passes over the full B2B pipeline.

use b2b_cart_core::cart::{Cart, LineItem, LineItemType};
use b2b_cart_core::config::RuleConfig;
use b2b_cart_core::money::Money;
use b2b_cart_core::pipeline::{CartBehavior, CartPipeline};
use b2b_cart_core::rules::bonus_discount::BONUS_DISCOUNT_ID;
use b2b_cart_core::rules::minimum_order;
use b2b_cart_core::types::{CalculatedTax, CartPrice, CheckoutContext, Customer, Delivery, TaxRate};

fn b2b_context() -> CheckoutContext {
    CheckoutContext::for_customer(Customer::new("c-1").with_company("ACME GmbH"))
}

fn regular_context() -> CheckoutContext {
    CheckoutContext::for_customer(Customer::new("c-2"))
}

fn pipeline() -> CartPipeline {
    CartPipeline::b2b(&RuleConfig::default())
}

/// A cart of one weighed product with a host-calculated total and a single
/// taxed delivery.
fn cart(quantity: i64, unit_cents: i64, weight_kg: f64, total_cents: i64) -> Cart {
    let mut cart = Cart::with_token("it-cart");
    cart.add(
        LineItem::product("sku-1", Money::from_cents(unit_cents), quantity)
            .with_payload_value("weight", weight_kg),
    );
    cart.price = CartPrice::with_total(Money::from_cents(total_cents));
    cart.price.calculated_taxes = vec![CalculatedTax::new(
        Money::from_cents(total_cents / 5),
        TaxRate::from_percent(20),
        Money::from_cents(total_cents),
    )];
    cart.deliveries.push(Delivery::new("standard"));
    cart
}

#[test]
fn large_business_order() {
    // 120 × 10.00, 0.1 kg each
    let original = cart(120, 1000, 0.1, 102_000);
    let result = pipeline().calculate(&original, &b2b_context(), &CartBehavior::default());
    let cart = &result.cart;

    // 15% bulk discount
    let product = cart.line_items.get("sku-1").unwrap().price.clone().unwrap();
    assert_eq!(product.unit_price, Money::from_cents(850));
    assert_eq!(product.total_price, Money::from_cents(102_000));
    assert_eq!(product.list_price, Some(Money::from_cents(1000)));

    // 5% of 1020.00
    let bonus = cart.line_items.get(BONUS_DISCOUNT_ID).unwrap();
    assert_eq!(bonus.line_item_type, LineItemType::Promotion);
    assert_eq!(bonus.price.as_ref().unwrap().total_price, Money::from_cents(-5_100));

    // total above 200.00
    assert_eq!(cart.deliveries[0].shipping_costs.total_price, Money::zero());

    let tax = &cart.price.calculated_taxes[0];
    assert_eq!(tax.tax_rate, TaxRate::from_percent(16));
    assert_eq!(tax.tax, Money::from_cents(16_320));

    assert!(result.errors.is_empty());
    assert!(!result.errors.blocks_order());
}

#[test]
fn small_business_order_is_blocked() {
    let original = cart(5, 1000, 2.0, 5_000);
    let result = pipeline().calculate(&original, &b2b_context(), &CartBehavior::default());

    // no bulk tier reached
    let product = result.cart.line_items.get("sku-1").unwrap().price.clone().unwrap();
    assert_eq!(product.unit_price, Money::from_cents(1000));
    assert!(!result.cart.has(BONUS_DISCOUNT_ID));

    // 10 kg
    assert_eq!(result.cart.deliveries[0].shipping_costs.unit_price, Money::from_cents(1_499));

    assert!(result.errors.blocks_order());
    let error = result.errors.get(minimum_order::MESSAGE_KEY).unwrap();
    assert_eq!(
        error.parameter("missing").and_then(|p| p.as_amount()),
        Some(Money::from_cents(5_000))
    );
}

#[test]
fn unavailable_products_and_minimum_are_both_reported() {
    let mut original = cart(1, 3000, 0.5, 3_000);
    original.add(LineItem::product("unavailable-product-1", Money::from_cents(1000), 1));

    let result = pipeline().calculate(&original, &b2b_context(), &CartBehavior::default());

    let keys: Vec<&str> = result.errors.iter().map(|e| e.message_key.as_str()).collect();
    assert_eq!(keys, ["product-unavailable", "b2b-minimum-order-value"]);
}

#[test]
fn regular_customer_only_gets_weight_shipping() {
    let original = cart(120, 1000, 0.1, 120_000);
    let result = pipeline().calculate(&original, &regular_context(), &CartBehavior::default());

    assert_eq!(result.cart.line_items, original.line_items);
    assert_eq!(result.cart.price, original.price);
    assert!(result.errors.is_empty());

    // 12 kg, no free shipping for consumers
    assert_eq!(result.cart.deliveries[0].shipping_costs.unit_price, Money::from_cents(1_999));
}

#[test]
fn guest_with_unavailable_product_is_not_blocked() {
    let mut original = cart(1, 1000, 0.5, 1_000);
    original.add(LineItem::product("discontinued-product-2", Money::from_cents(1000), 1));

    let result = pipeline().calculate(&original, &CheckoutContext::guest(), &CartBehavior::default());
    assert!(result.errors.is_empty());
}

#[test]
fn repeated_passes_are_stable() {
    let original = cart(60, 1000, 0.1, 54_000);
    let behavior = CartBehavior::default();

    let first = pipeline().calculate(&original, &b2b_context(), &behavior);
    let second = pipeline().calculate(&first.cart, &b2b_context(), &behavior);
    let third = pipeline().calculate(&second.cart, &b2b_context(), &behavior);

    assert_eq!(second, first);
    assert_eq!(third, first);
    assert_eq!(
        first.cart.line_items.iter().filter(|i| i.id == BONUS_DISCOUNT_ID).count(),
        1
    );
}

#[test]
fn configured_minimum_is_used() {
    let config = RuleConfig::from_toml("[minimum_order]\nminimum_value = 2000\n").unwrap();
    let original = cart(1, 3000, 0.5, 3_000);

    let result = CartPipeline::b2b(&config).calculate(&original, &b2b_context(), &CartBehavior::default());
    assert!(result.errors.is_empty());
}

#[test]
fn reduced_quantity_drops_the_bulk_discount() {
    let behavior = CartBehavior::default();
    let first = pipeline().calculate(&cart(120, 1000, 0.1, 102_000), &b2b_context(), &behavior);

    let mut reduced = first.cart.clone();
    reduced.line_items.get_mut("sku-1").unwrap().quantity = 10;
    let second = pipeline().calculate(&reduced, &b2b_context(), &behavior);

    let product = second.cart.line_items.get("sku-1").unwrap().price.clone().unwrap();
    assert_eq!(product.unit_price, Money::from_cents(1000));
    assert_eq!(product.total_price, Money::from_cents(10_000));
    assert_eq!(product.list_price, None);
}

#[test]
fn huge_quantities_do_not_overflow() {
    let original = cart(i64::MAX, 1000, 0.0, 100_000);
    let result = pipeline().calculate(&original, &b2b_context(), &CartBehavior::default());

    let product = result.cart.line_items.get("sku-1").unwrap().price.clone().unwrap();
    assert_eq!(product.unit_price, Money::from_cents(850));
    assert_eq!(product.total_price, Money::from_cents(i64::MAX));
}
