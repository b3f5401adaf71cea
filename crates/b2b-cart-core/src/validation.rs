//! # Validation Module
//!
//! Cart errors: what validators append when a cart must not (or should not)
//! be ordered as it is.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Error Flow                                    │
//! │                                                                         │
//! │  Host cart engine                                                       │
//! │  ├── creates an empty ErrorCollection per pass                          │
//! │  │        │                                                             │
//! │  │        ▼                                                             │
//! │  ├── validator.validate(&cart, &mut errors, &context)                   │
//! │  │        │   (zero or more CartErrors, keyed by id)                    │
//! │  │        ▼                                                             │
//! │  └── errors.blocks_order()? ──► storefront disables "place order"       │
//! │                                                                         │
//! │  Each CartError carries a message key + parameters; the storefront      │
//! │  renders the localized text, message() is only the English fallback.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Error Level
// =============================================================================

/// Severity of a cart error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorLevel {
    Notice,
    Warning,
    Error,
}

// =============================================================================
// Error Parameters
// =============================================================================

/// A scalar used when rendering an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorParameter {
    Amount(Money),
    Text(String),
}

impl ErrorParameter {
    pub fn as_amount(&self) -> Option<Money> {
        match self {
            ErrorParameter::Amount(amount) => Some(*amount),
            ErrorParameter::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ErrorParameter::Text(text) => Some(text),
            ErrorParameter::Amount(_) => None,
        }
    }
}

impl fmt::Display for ErrorParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorParameter::Amount(amount) => write!(f, "{}", amount),
            ErrorParameter::Text(text) => f.write_str(text),
        }
    }
}

impl From<Money> for ErrorParameter {
    fn from(amount: Money) -> Self {
        ErrorParameter::Amount(amount)
    }
}

impl From<String> for ErrorParameter {
    fn from(text: String) -> Self {
        ErrorParameter::Text(text)
    }
}

impl From<&str> for ErrorParameter {
    fn from(text: &str) -> Self {
        ErrorParameter::Text(text.to_string())
    }
}

// =============================================================================
// Cart Error
// =============================================================================

/// A structured validation failure attached to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartError {
    /// Unique within one collection; adding an error with the same id
    /// replaces the earlier one.
    pub id: String,
    /// Translation key for the storefront.
    pub message_key: String,
    pub level: ErrorLevel,
    /// Prevents order placement while present.
    pub block_order: bool,
    /// Kept by the host across recalculation passes.
    pub persistent: bool,
    pub parameters: BTreeMap<String, ErrorParameter>,
}

impl CartError {
    /// A blocking, non-persistent ERROR-level error.
    pub fn blocking(id: impl Into<String>, message_key: impl Into<String>) -> Self {
        CartError {
            id: id.into(),
            message_key: message_key.into(),
            level: ErrorLevel::Error,
            block_order: true,
            persistent: false,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ErrorParameter>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ErrorParameter> {
        self.parameters.get(name)
    }

    /// Renders an English fallback message from the message key and
    /// parameters.
    pub fn message(&self) -> String {
        let param = |name: &str| {
            self.parameter(name)
                .map(ToString::to_string)
                .unwrap_or_default()
        };

        match self.message_key.as_str() {
            crate::rules::minimum_order::MESSAGE_KEY => format!(
                "The minimum order value for business customers is {}. Add {} more to place the order (current: {}).",
                param("minimumValue"),
                param("missing"),
                param("currentValue"),
            ),
            crate::rules::availability::MESSAGE_KEY => {
                format!("Product {} is no longer available.", param("productId"))
            }
            _ => {
                let rendered: Vec<String> = self
                    .parameters
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                if rendered.is_empty() {
                    self.message_key.clone()
                } else {
                    format!("{} ({})", self.message_key, rendered.join(", "))
                }
            }
        }
    }
}

impl fmt::Display for CartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

// =============================================================================
// Error Collection
// =============================================================================

/// Errors found during one pass, in insertion order, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCollection(Vec<CartError>);

impl ErrorCollection {
    pub fn new() -> Self {
        ErrorCollection(Vec::new())
    }

    /// Adds an error, replacing any earlier error with the same id.
    pub fn add(&mut self, error: CartError) {
        match self.0.iter_mut().find(|existing| existing.id == error.id) {
            Some(existing) => *existing = error,
            None => self.0.push(error),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CartError> {
        self.0.iter().find(|error| error.id == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// True if any error prevents order placement.
    pub fn blocks_order(&self) -> bool {
        self.0.iter().any(|error| error.block_order)
    }

    pub fn first(&self) -> Option<&CartError> {
        self.0.first()
    }

    /// Errors at exactly `level`.
    pub fn filter_level(&self, level: ErrorLevel) -> impl Iterator<Item = &CartError> {
        self.0.iter().filter(move |error| error.level == level)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a CartError;
    type IntoIter = std::slice::Iter<'a, CartError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_replaces_same_id() {
        let mut errors = ErrorCollection::new();
        errors.add(CartError::blocking("a", "key").with_parameter("n", "1"));
        errors.add(CartError::blocking("b", "key"));
        errors.add(CartError::blocking("a", "key").with_parameter("n", "2"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().unwrap().id, "a");
        assert_eq!(
            errors.get("a").unwrap().parameter("n").and_then(|p| p.as_text()),
            Some("2")
        );
    }

    #[test]
    fn test_blocks_order() {
        let mut errors = ErrorCollection::new();
        assert!(!errors.blocks_order());

        let mut notice = CartError::blocking("notice", "info");
        notice.level = ErrorLevel::Notice;
        notice.block_order = false;
        errors.add(notice);
        assert!(!errors.blocks_order());
        assert_eq!(errors.filter_level(ErrorLevel::Notice).count(), 1);

        errors.add(CartError::blocking("stop", "stop"));
        assert!(errors.blocks_order());
    }

    #[test]
    fn test_generic_message_lists_parameters() {
        let error = CartError::blocking("x", "custom-key")
            .with_parameter("amount", Money::from_cents(1250))
            .with_parameter("code", "ABC");
        assert_eq!(error.message(), "custom-key (amount=12.50, code=ABC)");
        assert_eq!(CartError::blocking("y", "bare").message(), "bare");
    }

    #[test]
    fn test_error_json_shape() {
        let error = CartError::blocking("x", "key").with_parameter("missing", Money::from_cents(5000));
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["messageKey"], "key");
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["blockOrder"], true);
        assert_eq!(json["persistent"], false);
        assert_eq!(json["parameters"]["missing"], 5000);
    }
}
