//! # Error Types
//!
//! Typed failures of the crate itself.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Crate errors (this file) - something went wrong around a pass          │
//! │  ├── CoreError        - snapshot decoding, wraps ConfigError            │
//! │  └── ConfigError      - rule configuration could not be loaded          │
//! │                                                                         │
//! │  Cart errors (validation.rs) - a pass found a problem with the cart     │
//! │  └── CartError        - data appended to an ErrorCollection             │
//! │                                                                         │
//! │  A rule never returns Err: rule findings are CartErrors, never these.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart snapshot or context could not be decoded.
    #[error("Invalid cart snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Config Error
// =============================================================================

/// Failures while loading or validating a [`crate::config::RuleConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside the range the rule can work with.
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
