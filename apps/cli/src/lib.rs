//! # b2b-cart CLI
//!
//! Plays the host's part for local runs: loads the rule configuration, runs
//! one pass of the B2B pipeline over a cart snapshot and reports the result.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  b2b-cart [--config rules.toml] calculate cart.json                     │
//! │                                                                         │
//! │  1. RuleConfig::load ──► defaults ◄── rules.toml ◄── B2B_CART_* env     │
//! │  2. CartSnapshot::from_json(cart.json)                                  │
//! │  3. CartPipeline::b2b(&config).calculate(...)                           │
//! │  4. CalculationReport ──► stdout (JSON)                                 │
//! │                                                                         │
//! │  Logs go to stderr, so stdout stays machine readable.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use b2b_cart_core::{Cart, CartPipeline, CartSnapshot, ErrorCollection, RuleConfig};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one calculation pass over a cart snapshot.
    Calculate(CalculateArgs),
    /// Print the effective rule configuration as TOML.
    Config,
}

#[derive(Args, Debug)]
pub struct CalculateArgs {
    /// Snapshot file: `{ "cart": ..., "context": ..., "behavior": ... }`.
    pub snapshot: PathBuf,

    /// Print compact instead of pretty JSON.
    #[arg(long)]
    pub compact: bool,
}

// =============================================================================
// Report
// =============================================================================

/// What `calculate` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub calculated_at: DateTime<Utc>,
    pub cart: Cart,
    pub errors: ErrorCollection,
    pub messages: Vec<String>,
    pub blocks_order: bool,
}

// =============================================================================
// Commands
// =============================================================================

/// Loads the configuration from `config_path` (or the default location)
/// with environment overrides applied.
pub fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<RuleConfig> {
    let config = RuleConfig::load(config_path).context("Failed to load rule configuration")?;
    debug!(?config, "Rule configuration loaded");
    Ok(config)
}

/// Runs the B2B pipeline over the snapshot stored at `path`.
pub fn calculate(path: &Path, config: &RuleConfig) -> anyhow::Result<CalculationReport> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = CartSnapshot::from_json(&json)
        .with_context(|| format!("Failed to decode snapshot {}", path.display()))?;

    let result = snapshot.calculate(&CartPipeline::b2b(config));
    let blocks_order = result.errors.blocks_order();
    info!(
        token = %result.cart.token,
        errors = result.errors.len(),
        blocks_order,
        "Cart calculated"
    );

    Ok(CalculationReport {
        calculated_at: Utc::now(),
        messages: result.errors.iter().map(|e| e.message()).collect(),
        cart: result.cart,
        errors: result.errors,
        blocks_order,
    })
}

/// Executes `command` and returns what should be printed.
pub fn run(command: Commands, config_path: Option<PathBuf>) -> anyhow::Result<String> {
    let config = load_config(config_path)?;

    match command {
        Commands::Calculate(args) => {
            let report = calculate(&args.snapshot, &config)?;
            let output = if args.compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            Ok(output)
        }
        Commands::Config => Ok(config.to_toml()?),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use b2b_cart_core::money::Money;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "cart": {
            "token": "cli-cart",
            "lineItems": [
                {
                    "id": "sku-1",
                    "type": "product",
                    "quantity": 3,
                    "price": { "unitPrice": 1000, "totalPrice": 3000 },
                    "payload": { "weight": 2.0 }
                },
                {
                    "id": "unavailable-product-1",
                    "type": "product",
                    "quantity": 1,
                    "price": { "unitPrice": 500, "totalPrice": 500 }
                }
            ],
            "price": { "netPrice": 3500, "totalPrice": 3500, "positionPrice": 3500 },
            "deliveries": [
                { "shippingMethodId": "standard", "shippingCosts": { "unitPrice": 0, "totalPrice": 0 } }
            ]
        },
        "context": { "customer": { "id": "c-1", "company": "ACME GmbH" } }
    }"#;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_calculate_reports_errors() {
        let file = write_file(SNAPSHOT);
        let report = calculate(file.path(), &RuleConfig::default()).unwrap();

        assert!(report.blocks_order);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.messages[0], "Product unavailable-product-1 is no longer available.");
        // 6 kg
        assert_eq!(report.cart.deliveries[0].shipping_costs.unit_price, Money::from_cents(1499));
    }

    #[test]
    fn test_calculate_output_is_json() {
        let file = write_file(SNAPSHOT);
        let command = Commands::Calculate(CalculateArgs {
            snapshot: file.path().to_path_buf(),
            compact: true,
        });
        let config = write_file("");

        let output = run(command, Some(config.path().to_path_buf())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["blocksOrder"], true);
        assert_eq!(value["cart"]["token"], "cli-cart");
        assert!(value["calculatedAt"].is_string());
    }

    #[test]
    fn test_missing_snapshot_fails() {
        let err = calculate(Path::new("/nonexistent/cart.json"), &RuleConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }

    #[test]
    fn test_malformed_snapshot_fails() {
        let file = write_file("{ not json");
        let err = calculate(file.path(), &RuleConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to decode snapshot"));
    }

    #[test]
    fn test_config_command_prints_toml() {
        let config = write_file("[tax]\nfactor_bps = 9000\n");
        let output = run(Commands::Config, Some(config.path().to_path_buf())).unwrap();

        let parsed = RuleConfig::from_toml(&output).unwrap();
        assert_eq!(parsed.tax.factor_bps, 9000);
    }
}
