//! # Cart
//!
//! The host-owned cart as seen by the rules: line items, aggregate price and
//! deliveries.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Access per Extension Point                      │
//! │                                                                         │
//! │  Extension Point        Access               Typical Change             │
//! │  ───────────────        ──────               ──────────────             │
//! │                                                                         │
//! │  CartValidator ────────► &Cart ────────────► (read only)                │
//! │                                                                         │
//! │  CartProcessor ────────► &Cart original ───► (read only)                │
//! │                   └────► &mut Cart working ► line_items[i].price = ..   │
//! │                                              line_items.add(discount)   │
//! │                                              line_items.remove(id)      │
//! │                                              deliveries[i].costs = ..   │
//! │                                              price.calculated_taxes = ..│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::money::Money;
use crate::types::{CalculatedPrice, CartPrice, Delivery};

// =============================================================================
// Line Item Type
// =============================================================================

/// Kind of cart entry. Only `Product` entries are aggregated by the rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemType {
    Product,
    Promotion,
    Discount,
    Credit,
    /// Any type introduced by another extension of the host.
    #[serde(untagged)]
    Custom(String),
}

// =============================================================================
// Line Item
// =============================================================================

/// One entry of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    #[serde(rename = "type")]
    pub line_item_type: LineItemType,
    /// Product (or promotion) the entry points at.
    #[serde(default)]
    pub referenced_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "one")]
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<CalculatedPrice>,
    /// Free-form attributes (e.g. `weight` in kilograms).
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Physical good that ships.
    #[serde(default = "yes")]
    pub good: bool,
    #[serde(default = "yes")]
    pub stackable: bool,
    #[serde(default = "yes")]
    pub removable: bool,
}

fn one() -> i64 {
    1
}

fn yes() -> bool {
    true
}

impl LineItem {
    /// Creates a line item with quantity 1 and no price.
    pub fn new(id: impl Into<String>, line_item_type: LineItemType) -> Self {
        LineItem {
            id: id.into(),
            line_item_type,
            referenced_id: None,
            label: None,
            quantity: 1,
            price: None,
            payload: Map::new(),
            good: true,
            stackable: true,
            removable: true,
        }
    }

    /// Creates a product line item referencing `product_id` (the id doubles as
    /// the line item id) priced at `unit_price × quantity`.
    pub fn product(product_id: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        let product_id = product_id.into();
        let mut item = LineItem::new(product_id.clone(), LineItemType::Product);
        item.referenced_id = Some(product_id);
        item.quantity = quantity;
        item.price = Some(CalculatedPrice::untaxed(
            unit_price,
            unit_price.multiply_quantity(quantity),
            quantity,
        ));
        item
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_payload_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Returns true for product entries.
    #[inline]
    pub fn is_product(&self) -> bool {
        self.line_item_type == LineItemType::Product
    }

    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Numeric payload value; missing or non-numeric values yield `None`.
    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    /// Product id checked by availability rules: the referenced id, or the
    /// line item id when the host did not set one.
    pub fn product_id(&self) -> &str {
        self.referenced_id.as_deref().unwrap_or(&self.id)
    }
}

// =============================================================================
// Line Item Collection
// =============================================================================

/// Ordered line items, unique by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemCollection(Vec<LineItem>);

impl LineItemCollection {
    pub fn new() -> Self {
        LineItemCollection(Vec::new())
    }

    /// Adds a line item. An item with the same id is replaced in place so its
    /// position in the cart is kept.
    pub fn add(&mut self, item: LineItem) {
        match self.0.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.0.push(item),
        }
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.0.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.0.iter_mut().find(|item| item.id == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes the item with `id`, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let index = self.0.iter().position(|item| item.id == id)?;
        Some(self.0.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LineItem> {
        self.0.iter_mut()
    }

    /// Product line items only.
    pub fn products(&self) -> impl Iterator<Item = &LineItem> {
        self.0.iter().filter(|item| item.is_product())
    }

    pub fn products_mut(&mut self) -> impl Iterator<Item = &mut LineItem> {
        self.0.iter_mut().filter(|item| item.is_product())
    }

    pub fn filter_type<'a>(&'a self, line_item_type: &'a LineItemType) -> impl Iterator<Item = &'a LineItem> + 'a {
        self.0
            .iter()
            .filter(move |item| &item.line_item_type == line_item_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<LineItem>> for LineItemCollection {
    fn from(items: Vec<LineItem>) -> Self {
        let mut collection = LineItemCollection::new();
        for item in items {
            collection.add(item);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a LineItemCollection {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart for one calculation pass.
///
/// ## Ownership
/// The host owns the cart for the duration of a pass. Processors receive the
/// working copy mutably; validators and the original snapshot are read only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub token: String,
    #[serde(default)]
    pub line_items: LineItemCollection,
    #[serde(default)]
    pub price: CartPrice,
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
}

impl Cart {
    /// Creates an empty cart with a fresh token.
    pub fn new() -> Self {
        Cart::with_token(Uuid::new_v4().to_string())
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Cart {
            token: token.into(),
            line_items: LineItemCollection::new(),
            price: CartPrice::default(),
            deliveries: Vec::new(),
        }
    }

    /// Adds (or replaces) a line item.
    pub fn add(&mut self, item: LineItem) {
        self.line_items.add(item);
    }

    pub fn has(&self, id: &str) -> bool {
        self.line_items.has(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        self.line_items.remove(id)
    }

    /// Total quantity across product line items, saturating at `i64::MAX`.
    pub fn product_quantity(&self) -> i64 {
        self.line_items
            .products()
            .fold(0i64, |total, item| total.saturating_add(item.quantity))
    }

    /// Sum of total prices across product line items; unpriced items count as
    /// zero.
    pub fn product_value(&self) -> Money {
        self.line_items
            .products()
            .filter_map(|item| item.price.as_ref())
            .map(|price| price.total_price)
            .sum()
    }

    /// Total weight in kilograms across product line items
    /// (`payload.weight × quantity`, missing weight = 0).
    pub fn product_weight(&self) -> f64 {
        self.line_items
            .products()
            .map(|item| item.payload_f64("weight").unwrap_or(0.0) * item.quantity as f64)
            .sum()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}
