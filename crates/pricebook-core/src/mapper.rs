//! # Resource Mapper
//!
//! Turns domain values into the wire resources placed in API response bodies.
//!
//! ## Data Flow
//! ```text
//! ProductRow (storage)                   ProductResource (JSON)
//! ─────────────────────                  ───────────────────────────────
//! price_usd: 1090        ─┐              "usd": { "code": "USD",
//!                         │                       "amount": "10.90" }
//!                         ▼
//!            get_currency_descriptor(USD)   → unit 2
//!                         │
//!                         ▼
//!            encode(1090, 2)                → "10.90"
//! ```
//!
//! Amounts leave the system as strings, never as JSON numbers, so no client
//! can round them through a float.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::Serialize;
use ts_rs::TS;

use crate::currency::{get_currency_descriptor, CurrencyCode, CurrencyType};
use crate::fixed::{encode, FixedDigit};
use crate::types::{Product, ProductPrice, ProductRow};

// =============================================================================
// Resources
// =============================================================================

/// A currency amount as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SerializableCurrency {
    pub code: CurrencyCode,
    pub amount: FixedDigit,
}

/// Prices of a product in every currency, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProductPriceResource {
    pub usd: SerializableCurrency,
    pub eur: SerializableCurrency,
    pub jpy: SerializableCurrency,
    pub brl: SerializableCurrency,
    pub btc: SerializableCurrency,
}

/// A product as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProductResource {
    pub id: String,
    #[ts(as = "String")]
    pub created: DateTime<Utc>,
    pub batch_id: Option<String>,
    pub name: String,
    #[ts(as = "String")]
    pub expiration: DateTime<Utc>,
    pub prices: ProductPriceResource,
}

// =============================================================================
// Mapping
// =============================================================================

/// Renders an amount at the scale of its currency.
///
/// ## Example
/// ```rust
/// use pricebook_core::currency::{CurrencyCode, CurrencyType};
/// use pricebook_core::mapper::serialize_currency;
///
/// let btc = CurrencyType::new(CurrencyCode::Btc, 23405000);
/// assert_eq!(serialize_currency(&btc).amount, "0.23405000");
/// ```
pub fn serialize_currency(currency: &CurrencyType) -> SerializableCurrency {
    let descriptor = get_currency_descriptor(currency.code);
    SerializableCurrency {
        code: currency.code,
        amount: encode(&currency.amount, descriptor.unit),
    }
}

pub fn map_product_price_resource(prices: &ProductPrice) -> ProductPriceResource {
    ProductPriceResource {
        usd: serialize_currency(&prices.usd),
        eur: serialize_currency(&prices.eur),
        jpy: serialize_currency(&prices.jpy),
        brl: serialize_currency(&prices.brl),
        btc: serialize_currency(&prices.btc),
    }
}

pub fn map_product_resource(product: &Product) -> ProductResource {
    ProductResource {
        id: product.id.clone(),
        created: product.created,
        batch_id: product.batch_id.clone(),
        name: product.name.clone(),
        expiration: product.expiration,
        prices: map_product_price_resource(&product.prices),
    }
}

impl ProductRow {
    /// Read path: renders a storage row straight into a resource.
    pub fn to_resource(&self) -> ProductResource {
        let currency = |code: CurrencyCode, amount: &BigInt| SerializableCurrency {
            code,
            amount: encode(amount, code.unit()),
        };

        ProductResource {
            id: self.id.clone(),
            created: self.created,
            batch_id: self.batch_id.clone(),
            name: self.name.clone(),
            expiration: self.expiration,
            prices: ProductPriceResource {
                usd: currency(CurrencyCode::Usd, &self.price_usd),
                eur: currency(CurrencyCode::Eur, &self.price_eur),
                jpy: currency(CurrencyCode::Jpy, &self.price_jpy),
                brl: currency(CurrencyCode::Brl, &self.price_brl),
                btc: currency(CurrencyCode::Btc, &self.price_btc),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::parse_precise_number;
    use chrono::TimeZone;

    fn sample_product() -> Product {
        Product {
            id: "0c8a4a38-3f51-4d1e-9a55-2f7e8f0e4a11".to_string(),
            created: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            batch_id: None,
            name: "Cheese - Grana Padano".to_string(),
            prices: ProductPrice::from_amounts(1090, -250, 1500, 5490, 23405000),
            expiration: Utc.with_ymd_and_hms(2025, 1, 14, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_usd_scenario_round_trips() {
        let usd = CurrencyType::new(CurrencyCode::Usd, 1090);
        let serialized = serialize_currency(&usd);
        assert_eq!(serialized.amount, "10.90");

        let precise = parse_precise_number(serialized.amount.as_str()).unwrap();
        assert_eq!(precise.amount, BigInt::from(1090));
        assert_eq!(precise.unit, CurrencyCode::Usd.unit());
    }

    #[test]
    fn test_every_currency_uses_its_scale() {
        let resource = map_product_price_resource(&sample_product().prices);
        assert_eq!(resource.usd.amount, "10.90");
        assert_eq!(resource.eur.amount, "-2.50");
        assert_eq!(resource.jpy.amount, "1500");
        assert_eq!(resource.brl.amount, "54.90");
        assert_eq!(resource.btc.amount, "0.23405000");
    }

    #[test]
    fn test_product_resource_json_shape() {
        let json = serde_json::to_value(map_product_resource(&sample_product())).unwrap();
        assert_eq!(json["id"], "0c8a4a38-3f51-4d1e-9a55-2f7e8f0e4a11");
        assert_eq!(json["batch_id"], serde_json::Value::Null);
        assert_eq!(json["created"], "2024-03-01T12:00:00Z");
        assert_eq!(
            json["prices"]["btc"],
            serde_json::json!({"code": "BTC", "amount": "0.23405000"})
        );
        assert_eq!(
            json["prices"]["jpy"],
            serde_json::json!({"code": "JPY", "amount": "1500"})
        );
    }

    #[test]
    fn test_row_and_product_render_identically() {
        let product = sample_product();
        let row = ProductRow::from(&product);
        assert_eq!(row.to_resource(), map_product_resource(&product));
    }
}
