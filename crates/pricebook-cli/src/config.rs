//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRICEBOOK_LOG=debug                                                │
//! │     PRICEBOOK_PRETTY=false                                             │
//! │     PRICEBOOK_RATE_EUR=0.92                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, otherwise                                         │
//! │     ~/.config/pricebook/pricebook.toml (Linux)                         │
//! │     ~/Library/Application Support/com.pricebook.pricebook/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RUST_LOG`, when set, still wins over every logging filter above.
//!
//! ## Configuration File Format
//! ```toml
//! [logging]
//! filter = "info,pricebook=debug"
//!
//! [output]
//! pretty = true
//!
//! # Units of each currency per 1 USD, as fixed digit strings
//! [exchange]
//! eur = "0.920000000000000"
//! jpy = "151.300000000000000"
//! brl = "5.050000000000000"
//! btc = "0.000015500000000"
//! ```

use pricebook_core::exchange::ExchangeRate;
use pricebook_core::{parse_precise_number, CurrencyCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,pricebook=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Output Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings { pretty: true }
    }
}

// =============================================================================
// Exchange Settings
// =============================================================================

/// Exchange rates from USD, as fixed digit strings. USD itself is always 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSettings {
    #[serde(default)]
    pub eur: Option<String>,
    #[serde(default)]
    pub jpy: Option<String>,
    #[serde(default)]
    pub brl: Option<String>,
    #[serde(default)]
    pub btc: Option<String>,
}

impl ExchangeSettings {
    fn quote(&self, code: CurrencyCode) -> Option<&str> {
        match code {
            CurrencyCode::Usd => Some("1.00"),
            CurrencyCode::Eur => self.eur.as_deref(),
            CurrencyCode::Jpy => self.jpy.as_deref(),
            CurrencyCode::Brl => self.brl.as_deref(),
            CurrencyCode::Btc => self.btc.as_deref(),
        }
    }

    fn quote_mut(&mut self, code: CurrencyCode) -> Option<&mut Option<String>> {
        match code {
            CurrencyCode::Usd => None,
            CurrencyCode::Eur => Some(&mut self.eur),
            CurrencyCode::Jpy => Some(&mut self.jpy),
            CurrencyCode::Brl => Some(&mut self.brl),
            CurrencyCode::Btc => Some(&mut self.btc),
        }
    }
}

// =============================================================================
// CLI Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub exchange: ExchangeSettings,
}

impl CliConfig {
    /// Loads configuration: defaults, then the TOML file, then environment
    /// overrides, then validation.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|err| {
                    CliError::ConfigLoadFailed(format!("{}: {err}", path.display()))
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> CliResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(CliError::InvalidConfig("logging.filter must not be empty".into()));
        }

        for code in CurrencyCode::ALL {
            if let Some(quote) = self.exchange.quote(code) {
                let rate = parse_precise_number(quote).map_err(|_| {
                    CliError::InvalidConfig(format!(
                        "exchange.{} must be a fixed digit, got '{quote}'",
                        code.as_str().to_lowercase()
                    ))
                })?;
                if rate.amount.sign() != num_bigint::Sign::Plus {
                    return Err(CliError::InvalidConfig(format!(
                        "exchange.{} must be positive, got '{quote}'",
                        code.as_str().to_lowercase()
                    )));
                }
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `PRICEBOOK_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup("PRICEBOOK_LOG") {
            self.logging.filter = filter;
        }

        if let Some(pretty) = lookup("PRICEBOOK_PRETTY") {
            match pretty.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.output.pretty = true,
                "0" | "false" | "no" => self.output.pretty = false,
                _ => warn!(value = %pretty, "Unknown PRICEBOOK_PRETTY value in environment"),
            }
        }

        for code in CurrencyCode::ALL {
            let key = format!("PRICEBOOK_RATE_{}", code.as_str());
            if let (Some(rate), Some(slot)) = (lookup(&key), self.exchange.quote_mut(code)) {
                debug!(%code, rate = %rate, "Overriding exchange rate from environment");
                *slot = Some(rate);
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pricebook", "pricebook")
            .map(|dirs| dirs.config_dir().join("pricebook.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Builds the rate table.
    ///
    /// ## Errors
    /// [`CliError::MissingRate`] for the first currency without a quote.
    pub fn exchange_rate(&self) -> CliResult<ExchangeRate> {
        let quote = |code| self.exchange.quote(code).ok_or(CliError::MissingRate(code));
        let rate = ExchangeRate::from_fixed_digits(
            quote(CurrencyCode::Eur)?,
            quote(CurrencyCode::Jpy)?,
            quote(CurrencyCode::Brl)?,
            quote(CurrencyCode::Btc)?,
        )?;
        Ok(rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
