//! # Exchange Conversion
//!
//! Derives prices in every supported currency from a USD price.
//!
//! ## Conversion
//! ```text
//! usd price (unit 2)      163.88
//!        ×
//! rate (any unit)         0.920000000000000
//!        =
//! exact product           150.769600000000000000   (unit 2 + 15)
//!        │
//!        │ normalize(descriptor unit, Truncate)
//!        ▼
//! EUR amount              15076   (150.76)
//! ```
//!
//! Rates are quoted as "units of X per 1 USD", so the USD rate is always
//! exactly `1.00`.

use tracing::{debug, info};

use crate::currency::{CurrencyCode, CurrencyType};
use crate::error::CoreResult;
use crate::fixed::{parse_precise_number, PreciseNumber, Unit};
use crate::precise::RoundingMode;
use crate::types::ProductPrice;

/// Rates from USD to every supported currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRate {
    pub usd: PreciseNumber,
    pub eur: PreciseNumber,
    pub jpy: PreciseNumber,
    pub brl: PreciseNumber,
    pub btc: PreciseNumber,
}

impl ExchangeRate {
    /// Builds a rate table from fixed digit quotes (`"0.92"`, `"151.3"`, ...).
    ///
    /// ## Errors
    /// [`crate::error::CoreError::MalformedFixedDigit`] when any quote is not a
    /// valid fixed digit.
    ///
    /// ## Example
    /// ```rust
    /// use pricebook_core::exchange::ExchangeRate;
    ///
    /// let rate = ExchangeRate::from_fixed_digits("0.92", "151.30", "5.05", "0.0000155").unwrap();
    /// assert_eq!(rate.usd.to_string(), "1.00");
    /// ```
    pub fn from_fixed_digits(eur: &str, jpy: &str, brl: &str, btc: &str) -> CoreResult<Self> {
        let rate = ExchangeRate {
            usd: PreciseNumber::new(100, Unit::new(2)),
            eur: parse_precise_number(eur)?,
            jpy: parse_precise_number(jpy)?,
            brl: parse_precise_number(brl)?,
            btc: parse_precise_number(btc)?,
        };

        info!(
            eur = %rate.eur,
            jpy = %rate.jpy,
            brl = %rate.brl,
            btc = %rate.btc,
            "Loaded exchange rate"
        );

        Ok(rate)
    }

    /// Rate from USD to `code`.
    pub fn rate(&self, code: CurrencyCode) -> &PreciseNumber {
        match code {
            CurrencyCode::Usd => &self.usd,
            CurrencyCode::Eur => &self.eur,
            CurrencyCode::Jpy => &self.jpy,
            CurrencyCode::Brl => &self.brl,
            CurrencyCode::Btc => &self.btc,
        }
    }

    /// Converts a USD price into `code`, truncated to that currency's unit.
    ///
    /// ## Example
    /// ```rust
    /// use num_bigint::BigInt;
    /// use pricebook_core::currency::CurrencyCode;
    /// use pricebook_core::exchange::ExchangeRate;
    ///
    /// let rate = ExchangeRate::from_fixed_digits("0.92", "151.30", "5.05", "0.0000155").unwrap();
    /// let usd = "163.88".parse().unwrap();
    ///
    /// let jpy = rate.convert(&usd, CurrencyCode::Jpy);
    /// assert_eq!(jpy.amount, BigInt::from(24795));
    /// ```
    pub fn convert(&self, usd: &PreciseNumber, code: CurrencyCode) -> CurrencyType {
        let converted = usd
            .multiply(self.rate(code))
            .normalize(code.unit(), RoundingMode::Truncate);

        debug!(%usd, %code, converted = %converted, "Converted price");
        CurrencyType::new(code, converted.amount)
    }
}

impl ProductPrice {
    /// Prices in every currency, derived from a USD price.
    pub fn from_usd(usd: &PreciseNumber, rate: &ExchangeRate) -> Self {
        ProductPrice {
            usd: rate.convert(usd, CurrencyCode::Usd),
            eur: rate.convert(usd, CurrencyCode::Eur),
            jpy: rate.convert(usd, CurrencyCode::Jpy),
            brl: rate.convert(usd, CurrencyCode::Brl),
            btc: rate.convert(usd, CurrencyCode::Btc),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use num_bigint::BigInt;

    fn sample_rate() -> ExchangeRate {
        ExchangeRate::from_fixed_digits(
            "0.920000000000000",
            "151.300000000000000",
            "5.050000000000000",
            "0.000015500000000",
        )
        .unwrap()
    }

    #[test]
    fn test_usd_rate_is_identity() {
        let rate = sample_rate();
        let usd: PreciseNumber = "10.90".parse().unwrap();
        assert_eq!(rate.convert(&usd, CurrencyCode::Usd).amount, BigInt::from(1090));
    }

    #[test]
    fn test_conversion_truncates_to_descriptor_unit() {
        let rate = sample_rate();
        let usd: PreciseNumber = "163.88".parse().unwrap();

        // 163.88 * 0.92 = 150.7696
        assert_eq!(rate.convert(&usd, CurrencyCode::Eur).amount, BigInt::from(15076));
        // 163.88 * 151.3 = 24795.044
        assert_eq!(rate.convert(&usd, CurrencyCode::Jpy).amount, BigInt::from(24795));
        // 163.88 * 5.05 = 827.594
        assert_eq!(rate.convert(&usd, CurrencyCode::Brl).amount, BigInt::from(82759));
        // 163.88 * 0.0000155 = 0.00254014
        assert_eq!(rate.convert(&usd, CurrencyCode::Btc).amount, BigInt::from(254014));
    }

    #[test]
    fn test_product_price_from_usd() {
        let usd: PreciseNumber = "1.00".parse().unwrap();
        let prices = ProductPrice::from_usd(&usd, &sample_rate());
        assert_eq!(prices.usd.amount, BigInt::from(100));
        assert_eq!(prices.eur.amount, BigInt::from(92));
        assert_eq!(prices.jpy.amount, BigInt::from(151));
        assert_eq!(prices.brl.amount, BigInt::from(505));
        assert_eq!(prices.btc.amount, BigInt::from(1550));
    }

    #[test]
    fn test_malformed_quote_is_rejected() {
        let err = ExchangeRate::from_fixed_digits("0.92", "1.5.1", "5.05", "0.1").unwrap_err();
        assert!(matches!(err, CoreError::MalformedFixedDigit(_)));
    }
}
