//! # Configuration State
//!
//! Session defaults loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_CURRENCY=USD                                                 │
//! │     TALLY_TAX_TYPE=gst  TALLY_GST_MODE=igst                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $TALLY_CONFIG, or                                                  │
//! │     ~/.config/tally/config.toml (Linux)                                │
//! │     ~/Library/Application Support/com.tally.tally/config.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     INR, invoice, GST with CGST/SGST, percentage discount              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! business_name = "Acme Studio"
//! default_currency = "USD"
//! default_kind = "quotation"
//! tax_type = "tax"        # none | tax | gst
//! gst_mode = "cgst_sgst"  # igst | cgst_sgst (only read for gst)
//! discount_type = "fixed" # percentage | fixed
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tally_core::validation::validate_currency_code;
use tally_core::{DiscountType, Document, DocumentKind, TaxConfig, DEFAULT_CURRENCY};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not acceptable.
    #[error("Invalid config value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Session configuration.
///
/// Field names are snake_case in the TOML file and camelCase when sent
/// to the frontend through `get_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigState {
    /// Printed in the document header by the frontend.
    #[serde(alias = "business_name")]
    pub business_name: String,

    /// Currency of new documents (ISO 4217).
    #[serde(alias = "default_currency")]
    pub default_currency: String,

    /// Kind of document `new_document` creates when none is given.
    #[serde(alias = "default_kind")]
    pub default_kind: DocumentKind,

    /// Tax type tag of new documents: `none`, `tax` or `gst`.
    #[serde(alias = "tax_type")]
    pub tax_type: String,

    /// GST split of new documents: `igst` or `cgst_sgst`.
    #[serde(alias = "gst_mode")]
    pub gst_mode: String,

    /// Discount type of new documents.
    #[serde(alias = "discount_type")]
    pub discount_type: DiscountType,
}

impl Default for ConfigState {
    /// Mirrors a blank document: INR, invoice, GST (CGST/SGST), percentage
    /// discount.
    fn default() -> Self {
        let tax = TaxConfig::default();
        ConfigState {
            business_name: String::new(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_kind: DocumentKind::default(),
            tax_type: tax.tax_type_tag().to_string(),
            gst_mode: tax.gst_mode().unwrap_or_default().as_str().to_string(),
            discount_type: DiscountType::default(),
        }
    }
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$TALLY_CONFIG`, else the
    ///    platform config directory)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("TALLY_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_currency_code(&self.default_currency).map_err(|e| {
            ConfigError::InvalidValue {
                key: "default_currency".to_string(),
                reason: e.to_string(),
            }
        })?;

        TaxConfig::parse_tags(&self.tax_type, Some(self.gst_mode.as_str())).map_err(|e| {
            ConfigError::InvalidValue {
                key: "tax_type".to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in
    /// production, a map in tests).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("TALLY_BUSINESS_NAME") {
            self.business_name = name;
        }

        if let Some(currency) = lookup("TALLY_CURRENCY") {
            debug!(currency = %currency, "Overriding currency from environment");
            self.default_currency = currency.trim().to_ascii_uppercase();
        }

        if let Some(kind) = lookup("TALLY_DOCUMENT_KIND") {
            match kind.parse() {
                Ok(parsed) => self.default_kind = parsed,
                Err(_) => warn!(kind = %kind, "Unknown document kind in environment"),
            }
        }

        if let Some(tax_type) = lookup("TALLY_TAX_TYPE") {
            debug!(tax_type = %tax_type, "Overriding tax type from environment");
            self.tax_type = tax_type.trim().to_lowercase();
        }

        if let Some(mode) = lookup("TALLY_GST_MODE") {
            self.gst_mode = mode.trim().to_lowercase();
        }

        if let Some(discount_type) = lookup("TALLY_DISCOUNT_TYPE") {
            match discount_type.parse() {
                Ok(parsed) => self.discount_type = parsed,
                Err(_) => {
                    warn!(discount_type = %discount_type, "Unknown discount type in environment")
                }
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Tax configuration new documents start with.
    pub fn tax_config(&self) -> TaxConfig {
        TaxConfig::parse_tags(&self.tax_type, Some(self.gst_mode.as_str())).unwrap_or_default()
    }

    /// A blank document carrying these defaults.
    pub fn new_document(&self, kind: Option<DocumentKind>) -> Document {
        let mut doc = Document::new(kind.unwrap_or(self.default_kind));
        doc.set_currency(&self.default_currency);
        doc.set_tax_config(self.tax_config());
        doc.set_discount_type(self.discount_type);
        doc
    }
}
