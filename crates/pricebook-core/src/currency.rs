//! # Currency Descriptor Table
//!
//! The closed set of supported currencies and the scale of each one.
//!
//! ## Descriptor Table
//! ```text
//! ┌──────┬──────┬────────────────┬──────────────────────────────────────────┐
//! │ Code │ Unit │ Description    │ Example (raw → fixed digit)              │
//! ├──────┼──────┼────────────────┼──────────────────────────────────────────┤
//! │ USD  │  2   │ US Dollar      │ 1090        → "10.90"                    │
//! │ EUR  │  2   │ Euro           │ 999         → "9.99"                     │
//! │ JPY  │  0   │ Japanese Yen   │ 1500        → "1500"                     │
//! │ BRL  │  2   │ Brazilian Real │ 5490        → "54.90"                    │
//! │ BTC  │  8   │ Bitcoin        │ 23405000    → "0.23405000"               │
//! └──────┴──────┴────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! JPY exercises the zero-scale path of the codec, BTC the high-scale path.
//!
//! Adding a currency means adding a [`CurrencyCode`] variant; every `match`
//! over it then fails to compile until the new code is handled.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::fixed::Unit;

// =============================================================================
// Currency Code
// =============================================================================

/// Supported currency codes (ISO 4217, except BTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum CurrencyCode {
    Usd,
    Eur,
    Jpy,
    Brl,
    Btc,
}

impl CurrencyCode {
    /// Every code, in table order.
    pub const ALL: [CurrencyCode; 5] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Jpy,
        CurrencyCode::Brl,
        CurrencyCode::Btc,
    ];

    /// Upper-case code (`"USD"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Brl => "BRL",
            CurrencyCode::Btc => "BTC",
        }
    }

    /// Descriptor of this code.
    #[inline]
    pub const fn descriptor(&self) -> &'static CurrencyDescriptor {
        get_currency_descriptor(*self)
    }

    /// Scale of this code.
    #[inline]
    pub const fn unit(&self) -> Unit {
        self.descriptor().unit
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    /// Parses a code case-insensitively (`"usd"`, `"USD"`, `"Usd"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: CurrencyCode::ALL
                    .iter()
                    .map(|code| code.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Currency Descriptor
// =============================================================================

/// Static per-currency metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyDescriptor {
    pub code: CurrencyCode,
    /// Number of fractional digits of the smallest unit.
    pub unit: Unit,
    /// Human-readable currency name.
    pub description: &'static str,
}

pub const USD: CurrencyDescriptor = CurrencyDescriptor {
    code: CurrencyCode::Usd,
    unit: Unit::new(2),
    description: "US Dollar",
};

pub const EUR: CurrencyDescriptor = CurrencyDescriptor {
    code: CurrencyCode::Eur,
    unit: Unit::new(2),
    description: "Euro",
};

pub const JPY: CurrencyDescriptor = CurrencyDescriptor {
    code: CurrencyCode::Jpy,
    unit: Unit::new(0),
    description: "Japanese Yen",
};

pub const BRL: CurrencyDescriptor = CurrencyDescriptor {
    code: CurrencyCode::Brl,
    unit: Unit::new(2),
    description: "Brazilian Real",
};

pub const BTC: CurrencyDescriptor = CurrencyDescriptor {
    code: CurrencyCode::Btc,
    unit: Unit::new(8),
    description: "Bitcoin",
};

/// All descriptors, in table order.
pub const CURRENCIES: [CurrencyDescriptor; 5] = [USD, EUR, JPY, BRL, BTC];

/// Looks up the descriptor of a code. Total: cannot fail.
pub const fn get_currency_descriptor(code: CurrencyCode) -> &'static CurrencyDescriptor {
    match code {
        CurrencyCode::Usd => &USD,
        CurrencyCode::Eur => &EUR,
        CurrencyCode::Jpy => &JPY,
        CurrencyCode::Brl => &BRL,
        CurrencyCode::Btc => &BTC,
    }
}

// =============================================================================
// Currency Type
// =============================================================================

/// An amount in the smallest unit of `code`.
///
/// The scale is not stored: it is implied by the code's descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyType {
    pub code: CurrencyCode,
    pub amount: BigInt,
}

impl CurrencyType {
    pub fn new(code: CurrencyCode, amount: impl Into<BigInt>) -> Self {
        CurrencyType {
            code,
            amount: amount.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_units() {
        assert_eq!(get_currency_descriptor(CurrencyCode::Usd).unit, Unit::new(2));
        assert_eq!(get_currency_descriptor(CurrencyCode::Eur).unit, Unit::new(2));
        assert_eq!(get_currency_descriptor(CurrencyCode::Jpy).unit, Unit::new(0));
        assert_eq!(get_currency_descriptor(CurrencyCode::Brl).unit, Unit::new(2));
        assert_eq!(get_currency_descriptor(CurrencyCode::Btc).unit, Unit::new(8));
    }

    #[test]
    fn test_lookup_is_consistent_with_table() {
        for (code, descriptor) in CurrencyCode::ALL.iter().zip(CURRENCIES.iter()) {
            assert_eq!(code.descriptor(), descriptor);
            assert_eq!(descriptor.code, *code);
        }
    }

    #[test]
    fn test_code_parsing() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert_eq!("BTC".parse::<CurrencyCode>().unwrap(), CurrencyCode::Btc);
        assert_eq!("Jpy".parse::<CurrencyCode>().unwrap(), CurrencyCode::Jpy);

        let err = "GBP".parse::<CurrencyCode>().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotAllowed { ref allowed, .. } if allowed.len() == 5
        ));
    }

    #[test]
    fn test_code_serialization() {
        assert_eq!(serde_json::to_string(&CurrencyCode::Brl).unwrap(), "\"BRL\"");
        let code: CurrencyCode = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(code, CurrencyCode::Eur);
    }

    #[test]
    fn test_descriptor_serialization() {
        let json = serde_json::to_value(JPY).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "JPY", "unit": 0, "description": "Japanese Yen"})
        );
    }
}
