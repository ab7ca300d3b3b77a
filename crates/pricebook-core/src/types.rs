//! # Domain Types
//!
//! Core domain types used throughout Pricebook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ProductPrice   │   │  CurrencyType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  usd  eur  jpy  │──►│  code           │       │
//! │  │  batch_id       │   │  brl  btc       │   │  amount (BigInt)│       │
//! │  │  name           │   └─────────────────┘   └─────────────────┘       │
//! │  │  expiration     │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │  ProductBatch   │   │ ImportStrategy  │       │
//! │  ┌─────────────────┐   │  ─────────────  │   │  ─────────────  │       │
//! │  │   ProductRow    │   │  id (UUID)      │   │  Atomic         │       │
//! │  │  (storage form) │   │  filename       │   │  Partial        │       │
//! │  │  price_usd ...  │   │  strategy       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are always stored unscaled, in the smallest unit of their currency.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::currency::{CurrencyCode, CurrencyType};
use crate::error::ValidationError;

// =============================================================================
// Product Price
// =============================================================================

/// Prices of a product in every supported currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPrice {
    pub usd: CurrencyType,
    pub eur: CurrencyType,
    pub jpy: CurrencyType,
    pub brl: CurrencyType,
    pub btc: CurrencyType,
}

impl ProductPrice {
    /// Builds prices from raw amounts, one per currency.
    pub fn from_amounts(
        usd: impl Into<BigInt>,
        eur: impl Into<BigInt>,
        jpy: impl Into<BigInt>,
        brl: impl Into<BigInt>,
        btc: impl Into<BigInt>,
    ) -> Self {
        ProductPrice {
            usd: CurrencyType::new(CurrencyCode::Usd, usd),
            eur: CurrencyType::new(CurrencyCode::Eur, eur),
            jpy: CurrencyType::new(CurrencyCode::Jpy, jpy),
            brl: CurrencyType::new(CurrencyCode::Brl, brl),
            btc: CurrencyType::new(CurrencyCode::Btc, btc),
        }
    }

    /// Price in the given currency.
    pub fn get(&self, code: CurrencyCode) -> &CurrencyType {
        match code {
            CurrencyCode::Usd => &self.usd,
            CurrencyCode::Eur => &self.eur,
            CurrencyCode::Jpy => &self.jpy,
            CurrencyCode::Brl => &self.brl,
            CurrencyCode::Btc => &self.btc,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// When the product was created.
    pub created: DateTime<Utc>,

    /// Import batch that created this product, if any.
    pub batch_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Prices in every supported currency.
    pub prices: ProductPrice,

    /// Expiration date.
    pub expiration: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id, created now.
    pub fn new(
        name: impl Into<String>,
        prices: ProductPrice,
        expiration: DateTime<Utc>,
        batch_id: Option<String>,
    ) -> Self {
        Product {
            id: Uuid::new_v4().to_string(),
            created: Utc::now(),
            batch_id,
            name: name.into(),
            prices,
            expiration,
        }
    }

    /// Returns the price in the given currency.
    #[inline]
    pub fn price(&self, code: CurrencyCode) -> &CurrencyType {
        self.prices.get(code)
    }
}

// =============================================================================
// Product Row
// =============================================================================

/// A product as the storage layer hands it over: one unscaled integer
/// column per currency.
///
/// The persisted representation is bit-exact with [`CurrencyType::amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub created: DateTime<Utc>,
    pub batch_id: Option<String>,
    pub name: String,
    pub expiration: DateTime<Utc>,
    pub price_usd: BigInt,
    pub price_eur: BigInt,
    pub price_jpy: BigInt,
    pub price_brl: BigInt,
    pub price_btc: BigInt,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            created: row.created,
            batch_id: row.batch_id,
            name: row.name,
            expiration: row.expiration,
            prices: ProductPrice::from_amounts(
                row.price_usd,
                row.price_eur,
                row.price_jpy,
                row.price_brl,
                row.price_btc,
            ),
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        ProductRow {
            id: product.id.clone(),
            created: product.created,
            batch_id: product.batch_id.clone(),
            name: product.name.clone(),
            expiration: product.expiration,
            price_usd: product.prices.usd.amount.clone(),
            price_eur: product.prices.eur.amount.clone(),
            price_jpy: product.prices.jpy.amount.clone(),
            price_brl: product.prices.brl.amount.clone(),
            price_btc: product.prices.btc.amount.clone(),
        }
    }
}

// =============================================================================
// Import Strategy
// =============================================================================

/// How an import batch treats invalid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// Any invalid row rejects the whole batch.
    Atomic,
    /// Invalid rows are skipped and reported.
    Partial,
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStrategy::Atomic => write!(f, "atomic"),
            ImportStrategy::Partial => write!(f, "partial"),
        }
    }
}

impl FromStr for ImportStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atomic" => Ok(ImportStrategy::Atomic),
            "partial" => Ok(ImportStrategy::Partial),
            _ => Err(ValidationError::NotAllowed {
                field: "strategy".to_string(),
                allowed: vec!["atomic".to_string(), "partial".to_string()],
            }),
        }
    }
}

// =============================================================================
// Product Batch
// =============================================================================

/// A file of products imported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProductBatch {
    pub id: String,
    #[ts(as = "String")]
    pub created: DateTime<Utc>,
    pub strategy: ImportStrategy,
    pub filename: String,
}

impl ProductBatch {
    /// Starts a new batch with a fresh id.
    pub fn new(filename: impl Into<String>, strategy: ImportStrategy) -> Self {
        ProductBatch {
            id: Uuid::new_v4().to_string(),
            created: Utc::now(),
            strategy,
            filename: filename.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_price_lookup_by_code() {
        let prices = ProductPrice::from_amounts(1090, 999, 1500, 5490, 23405000);
        assert_eq!(prices.get(CurrencyCode::Usd).amount, BigInt::from(1090));
        assert_eq!(prices.get(CurrencyCode::Jpy).amount, BigInt::from(1500));
        assert_eq!(prices.get(CurrencyCode::Btc).code, CurrencyCode::Btc);
    }

    #[test]
    fn test_row_round_trip() {
        let product = Product::new(
            "Cheese",
            ProductPrice::from_amounts(16388, 15000, 2400000, 80000, 170000),
            Utc.with_ymd_and_hms(2023, 1, 14, 0, 0, 0).unwrap(),
            None,
        );
        let row = ProductRow::from(&product);
        assert_eq!(row.price_jpy, BigInt::from(2400000));
        assert_eq!(Product::from(row), product);
    }

    #[test]
    fn test_import_strategy_parsing() {
        assert_eq!("atomic".parse::<ImportStrategy>().unwrap(), ImportStrategy::Atomic);
        assert_eq!("partial".parse::<ImportStrategy>().unwrap(), ImportStrategy::Partial);
        assert!("ATOMIC".parse::<ImportStrategy>().is_err());
        assert_eq!(ImportStrategy::Partial.to_string(), "partial");
    }

    #[test]
    fn test_batch_serialization() {
        let batch = ProductBatch::new("products.csv", ImportStrategy::Atomic);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["strategy"], "atomic");
        assert_eq!(json["filename"], "products.csv");
        assert!(Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    }
}
