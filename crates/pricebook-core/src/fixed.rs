//! # Fixed Digit Codec
//!
//! Lossless conversion between a big integer amount in the smallest currency
//! unit and its canonical fixed-point decimal string.
//!
//! ## The Two Directions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   PreciseNumber { amount: 1090, unit: 2 }                               │
//! │          │                                   ▲                          │
//! │          │ encode / to_fixed_digit           │ parse_precise_number     │
//! │          ▼                                   │                          │
//! │   FixedDigit("10.90") ───────────────────────┘                          │
//! │                                                                         │
//! │   encode is canonical:  never emits "010.90"                            │
//! │   decode is lenient:    accepts "010.90" as (1090, 2)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strict vs Permissive Encoding
//! - [`to_fixed_digit`] validates a raw scale and fails with
//!   [`CoreError::InvalidScale`].
//! - [`to_fixed_digit_permissive`] clamps a raw scale instead of failing. Use
//!   it only where the scale comes from trusted internal configuration.
//! - [`encode`] takes an already validated [`Unit`] and cannot fail.
//!
//! ## Usage
//! ```rust
//! use num_bigint::BigInt;
//! use pricebook_core::fixed::{parse_precise_number, to_fixed_digit};
//!
//! let fixed = to_fixed_digit(&BigInt::from(1090), 2).unwrap();
//! assert_eq!(fixed.as_str(), "10.90");
//!
//! let precise = parse_precise_number("10.90").unwrap();
//! assert_eq!(precise.amount, BigInt::from(1090));
//! assert_eq!(precise.unit.get(), 2);
//! ```

use num_bigint::BigInt;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::number::{abs_digits, is_negative, parse_signed_digits};

/// Decimal separator of a fixed digit string.
pub const DECIMAL_SEPARATOR: char = '.';

// =============================================================================
// Unit
// =============================================================================

/// Number of digits, counted from the right, that form the fractional part.
///
/// A `Unit` is valid by construction. Raw scales (`i32`, `i64`, `usize`,
/// `f64`) convert through `TryFrom`, which rejects negative and fractional
/// values with [`CoreError::InvalidScale`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Unit(u32);

impl Unit {
    /// No fractional digits.
    pub const ZERO: Unit = Unit(0);

    #[inline]
    pub const fn new(digits: u32) -> Self {
        Unit(digits)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Clamps a raw scale into a valid unit: NaN and negatives become zero,
    /// fractions are truncated toward zero.
    pub fn clamped(raw: f64) -> Self {
        if raw.is_nan() || raw <= 0.0 {
            return Unit::ZERO;
        }
        // `as` saturates at u32::MAX
        Unit(raw.trunc() as u32)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Unit {
    type Error = CoreError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .map(Unit)
            .map_err(|_| CoreError::invalid_scale())
    }
}

impl TryFrom<i32> for Unit {
    type Error = CoreError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Unit::try_from(i64::from(raw))
    }
}

impl TryFrom<usize> for Unit {
    type Error = CoreError;

    fn try_from(raw: usize) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .map(Unit)
            .map_err(|_| CoreError::invalid_scale())
    }
}

impl TryFrom<f64> for Unit {
    type Error = CoreError;

    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        if !raw.is_finite() || raw.fract() != 0.0 || raw < 0.0 || raw > f64::from(u32::MAX) {
            return Err(CoreError::invalid_scale());
        }
        Ok(Unit(raw as u32))
    }
}

// =============================================================================
// Fixed Digit
// =============================================================================

/// Canonical fixed-point decimal string, e.g. `"10.90"` or `"0.03405000"`.
///
/// Only [`encode`] and friends construct it, so every `FixedDigit` is
/// canonical: optional `-`, integer digits without superfluous leading zeros,
/// and exactly `unit` fractional digits when `unit > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export, type = "string")]
pub struct FixedDigit(String);

impl FixedDigit {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FixedDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FixedDigit {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FixedDigit {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FixedDigit {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<FixedDigit> for String {
    fn from(fixed: FixedDigit) -> Self {
        fixed.0
    }
}

// =============================================================================
// Precise Number
// =============================================================================

/// An amount together with its scale: the parsed form of a fixed digit.
///
/// `PreciseNumber { amount: 1090, unit: 2 }` is `10.90`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreciseNumber {
    pub amount: BigInt,
    pub unit: Unit,
}

impl PreciseNumber {
    pub fn new(amount: impl Into<BigInt>, unit: Unit) -> Self {
        PreciseNumber {
            amount: amount.into(),
            unit,
        }
    }

    /// Renders the number in canonical form.
    pub fn to_fixed_digit(&self) -> FixedDigit {
        encode(&self.amount, self.unit)
    }
}

impl fmt::Display for PreciseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_fixed_digit().as_str())
    }
}

impl FromStr for PreciseNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_precise_number(s)
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Renders `amount` with `unit` fractional digits.
///
/// ## Algorithm
/// ```text
/// amount = -7238, unit = 8
///
/// digits of |amount|     "7238"
/// shorter than unit?     yes → integer "0", fraction "00007238"
/// negative?              yes → "-"
///
/// result                 "-0.00007238"
/// ```
///
/// Zero is never rendered with a sign.
pub fn encode(amount: &BigInt, unit: Unit) -> FixedDigit {
    let digits = abs_digits(amount);
    let sign = if is_negative(amount) { "-" } else { "" };
    let width = unit.get() as usize;

    if width == 0 {
        return FixedDigit(format!("{sign}{digits}"));
    }

    if digits.len() > width {
        let (integral, fraction) = digits.split_at(digits.len() - width);
        FixedDigit(format!("{sign}{integral}{DECIMAL_SEPARATOR}{fraction}"))
    } else {
        FixedDigit(format!("{sign}0{DECIMAL_SEPARATOR}{digits:0>width$}"))
    }
}

/// Strict encode: validates a raw scale, then renders.
///
/// ## Errors
/// [`CoreError::InvalidScale`] when `scale` is negative or not an integer.
///
/// ## Example
/// ```rust
/// use num_bigint::BigInt;
/// use pricebook_core::fixed::to_fixed_digit;
///
/// let amount = BigInt::from(34723891);
/// assert_eq!(to_fixed_digit(&amount, 8).unwrap(), "0.34723891");
///
/// assert!(to_fixed_digit(&amount, -1).is_err());
/// assert!(to_fixed_digit(&amount, 3.14).is_err());
/// ```
pub fn to_fixed_digit<S>(amount: &BigInt, scale: S) -> CoreResult<FixedDigit>
where
    S: TryInto<Unit, Error = CoreError>,
{
    let unit = scale.try_into()?;
    Ok(encode(amount, unit))
}

/// Permissive encode: clamps the scale (truncate toward zero, floor at zero)
/// instead of failing.
///
/// Read path only, where the scale comes from trusted configuration. Never
/// feed it user input.
pub fn to_fixed_digit_permissive(amount: &BigInt, scale: f64) -> FixedDigit {
    let unit = Unit::clamped(scale);
    if f64::from(unit.get()) != scale {
        warn!(scale, clamped = unit.get(), "Clamped invalid fixed digit scale");
    }
    encode(amount, unit)
}

// =============================================================================
// Decode
// =============================================================================

/// Parses a fixed digit string into a [`PreciseNumber`].
///
/// ## Rules
/// - At most one `.` separator
/// - Non-empty integer part (`"-"` alone counts as non-empty, so `"-.5"` is -0.5)
/// - Integer and fraction digits together form an optional `-` plus digits
/// - The unit is the length of the fraction (0 when absent)
///
/// Leading zeros are accepted: `"007.50"` parses as `(750, 2)`.
///
/// ## Errors
/// [`CoreError::MalformedFixedDigit`] for anything else.
///
/// ## Example
/// ```rust
/// use num_bigint::BigInt;
/// use pricebook_core::fixed::parse_precise_number;
///
/// let precise = parse_precise_number("-0.01").unwrap();
/// assert_eq!(precise.amount, BigInt::from(-1));
/// assert_eq!(precise.unit.get(), 2);
///
/// assert!(parse_precise_number("9123.131.0").is_err());
/// assert!(parse_precise_number("").is_err());
/// ```
pub fn parse_precise_number(fixed: &str) -> CoreResult<PreciseNumber> {
    let mut parts = fixed.split(DECIMAL_SEPARATOR);
    let integral = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    if integral.is_empty() || parts.next().is_some() {
        return Err(CoreError::malformed_fixed_digit());
    }

    let amount = parse_signed_digits(&format!("{integral}{fraction}"))
        .ok_or_else(CoreError::malformed_fixed_digit)?;
    let unit = Unit::try_from(fraction.len()).map_err(|_| CoreError::malformed_fixed_digit())?;

    Ok(PreciseNumber { amount, unit })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainEntity;
    use proptest::prelude::*;

    fn big(digits: &str) -> BigInt {
        digits.parse().unwrap()
    }

    fn fixed(amount: &BigInt, unit: u32) -> String {
        encode(amount, Unit::new(unit)).into_string()
    }

    fn precise(amount: &str, unit: u32) -> PreciseNumber {
        PreciseNumber::new(big(amount), Unit::new(unit))
    }

    fn assert_invalid_scale(result: CoreResult<FixedDigit>) {
        match result {
            Err(CoreError::InvalidScale(domain)) => {
                assert_eq!(domain.entity, DomainEntity::FixedDigit);
                assert_eq!(domain.operation, "fixed_digit_from_invalid_precise_number");
                assert_eq!(domain.id, None);
            }
            other => panic!("expected InvalidScale, got {other:?}"),
        }
    }

    fn assert_malformed(text: &str) {
        match parse_precise_number(text) {
            Err(CoreError::MalformedFixedDigit(domain)) => {
                assert_eq!(domain.entity, DomainEntity::PreciseNumber);
                assert_eq!(domain.message, "expected valid fixed digit");
            }
            other => panic!("expected MalformedFixedDigit for {text:?}, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Encode
    // -------------------------------------------------------------------------

    #[test]
    fn test_fixed_digit_is_a_plain_string() {
        let fixed = to_fixed_digit(&big("-5"), 2).unwrap();
        assert_eq!(serde_json::to_value(&fixed).unwrap(), serde_json::json!("-0.05"));
        assert_eq!(FixedDigit::inline(), "string");
    }

    #[test]
    fn test_negative_scale_is_rejected() {
        assert_invalid_scale(to_fixed_digit(&BigInt::from(987654321), -1));
        assert_invalid_scale(to_fixed_digit(&BigInt::from(987654321), -1i64));
        assert_invalid_scale(to_fixed_digit(&BigInt::from(987654321), -1.0));
    }

    #[test]
    fn test_non_integral_scale_is_rejected() {
        assert_invalid_scale(to_fixed_digit(&BigInt::from(-987654321), 3.14));
        assert_invalid_scale(to_fixed_digit(&BigInt::from(0), f64::NAN));
        assert_invalid_scale(to_fixed_digit(&BigInt::from(0), f64::INFINITY));
    }

    #[test]
    fn test_integral_float_scale_is_accepted() {
        let fixed = to_fixed_digit(&BigInt::from(1090), 2.0).unwrap();
        assert_eq!(fixed, "10.90");
    }

    #[test]
    fn test_encode_preserves_precision() {
        let amount = big("923412810198765432891084235201273938423711");
        assert_eq!(
            fixed(&amount, 18),
            "923412810198765432891084.235201273938423711"
        );
        assert_eq!(
            fixed(&-amount, 18),
            "-923412810198765432891084.235201273938423711"
        );
    }

    #[test]
    fn test_encode_zero_scale() {
        let amount = big("18231042834237489237953475284912038491");
        assert_eq!(fixed(&amount, 0), "18231042834237489237953475284912038491");
        assert_eq!(fixed(&-amount, 0), "-18231042834237489237953475284912038491");
    }

    #[test]
    fn test_encode_with_decimal_digits() {
        let amount = big("92013492342190342735273904820000");
        assert_eq!(fixed(&amount, 1), "9201349234219034273527390482000.0");
        assert_eq!(fixed(&amount, 2), "920134923421903427352739048200.00");
        assert_eq!(fixed(&amount, 3), "92013492342190342735273904820.000");
        assert_eq!(fixed(&-amount.clone(), 1), "-9201349234219034273527390482000.0");
        assert_eq!(fixed(&-amount.clone(), 2), "-920134923421903427352739048200.00");
        assert_eq!(fixed(&-amount, 3), "-92013492342190342735273904820.000");
    }

    #[test]
    fn test_encode_digit_count_equal_to_unit() {
        assert_eq!(fixed(&BigInt::from(34723891), 8), "0.34723891");
        assert_eq!(fixed(&BigInt::from(-34723891), 8), "-0.34723891");
        assert_eq!(fixed(&BigInt::from(19), 2), "0.19");
        assert_eq!(fixed(&BigInt::from(-19), 2), "-0.19");
    }

    #[test]
    fn test_encode_digit_count_smaller_than_unit() {
        assert_eq!(fixed(&BigInt::from(7238), 8), "0.00007238");
        assert_eq!(fixed(&BigInt::from(-7238), 8), "-0.00007238");
        assert_eq!(fixed(&BigInt::from(1), 2), "0.01");
        assert_eq!(fixed(&BigInt::from(-1), 2), "-0.01");
    }

    #[test]
    fn test_encode_zero() {
        assert_eq!(fixed(&BigInt::from(0), 8), "0.00000000");
        assert_eq!(fixed(&BigInt::from(0), 0), "0");
        assert_eq!(fixed(&BigInt::from(0), 2), "0.00");
    }

    #[test]
    fn test_permissive_encode_clamps() {
        let amount = BigInt::from(1090);
        assert_eq!(to_fixed_digit_permissive(&amount, 2.0), "10.90");
        assert_eq!(to_fixed_digit_permissive(&amount, 2.9), "10.90");
        assert_eq!(to_fixed_digit_permissive(&amount, -3.0), "1090");
        assert_eq!(to_fixed_digit_permissive(&amount, f64::NAN), "1090");
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(Unit::try_from(8i32).unwrap(), Unit::new(8));
        assert_eq!(Unit::try_from(8usize).unwrap(), Unit::new(8));
        assert!(Unit::try_from(i64::from(u32::MAX) + 1).is_err());
        assert_eq!(Unit::clamped(-0.5), Unit::ZERO);
        assert_eq!(Unit::clamped(7.99), Unit::new(7));
    }

    // -------------------------------------------------------------------------
    // Decode
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_rejects_malformed() {
        assert_malformed("");
        assert_malformed("9123.131.0");
        assert_malformed(".50");
        assert_malformed("-");
        assert_malformed("-.");
        assert_malformed("1,000.00");
        assert_malformed("10.-5");
        assert_malformed("+10.00");
        assert_malformed(" 10.00");
        assert_malformed("1e5");
    }

    #[test]
    fn test_decode_preserves_precision() {
        let text = "8937123901423754893412903845.789345929831";
        assert_eq!(
            parse_precise_number(text).unwrap(),
            precise("8937123901423754893412903845789345929831", 12)
        );
        assert_eq!(
            parse_precise_number(&format!("-{text}")).unwrap(),
            precise("-8937123901423754893412903845789345929831", 12)
        );
    }

    #[test]
    fn test_decode_no_decimal_part() {
        let text = "82930472398203478923412989572100";
        assert_eq!(parse_precise_number(text).unwrap(), precise(text, 0));
        assert_eq!(
            parse_precise_number(&format!("-{text}")).unwrap(),
            precise(&format!("-{text}"), 0)
        );
        assert_eq!(parse_precise_number("5.").unwrap(), precise("5", 0));
    }

    #[test]
    fn test_decode_with_decimal_digits() {
        assert_eq!(
            parse_precise_number("123971234923849023810.0").unwrap(),
            precise("1239712349238490238100", 1)
        );
        assert_eq!(
            parse_precise_number("12932034702311.78").unwrap(),
            precise("1293203470231178", 2)
        );
        assert_eq!(
            parse_precise_number("-3941237.98").unwrap(),
            precise("-394123798", 2)
        );
        assert_eq!(
            parse_precise_number("-2389432485128127423891924.358").unwrap(),
            precise("-2389432485128127423891924358", 3)
        );
    }

    #[test]
    fn test_decode_small_amounts() {
        assert_eq!(parse_precise_number("0.91023371").unwrap(), precise("91023371", 8));
        assert_eq!(parse_precise_number("-0.91").unwrap(), precise("-91", 2));
        assert_eq!(parse_precise_number("0.00000912").unwrap(), precise("912", 8));
        assert_eq!(parse_precise_number("-0.09").unwrap(), precise("-9", 2));
    }

    #[test]
    fn test_decode_zero() {
        assert_eq!(parse_precise_number("0.00000000").unwrap(), precise("0", 8));
        assert_eq!(parse_precise_number("0").unwrap(), precise("0", 0));
        assert_eq!(parse_precise_number("-0.00").unwrap(), precise("0", 2));
    }

    #[test]
    fn test_decode_is_lenient_encode_is_canonical() {
        let parsed = parse_precise_number("007.50").unwrap();
        assert_eq!(parsed, precise("750", 2));
        assert_eq!(parsed.to_fixed_digit(), "7.50");

        let parsed: PreciseNumber = "-.5".parse().unwrap();
        assert_eq!(parsed.to_string(), "-0.5");
    }

    #[test]
    fn test_usd_and_btc_scenarios() {
        let usd = encode(&BigInt::from(1090), Unit::new(2));
        assert_eq!(usd, "10.90");
        assert_eq!(parse_precise_number(usd.as_str()).unwrap(), precise("1090", 2));

        assert_eq!(encode(&BigInt::from(23405000), Unit::new(8)), "0.23405000");
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(digits in "-?[0-9]{1,60}", unit in 0u32..40) {
            let amount = big(&digits);
            let unit = Unit::new(unit);
            let fixed = encode(&amount, unit);
            let parsed = parse_precise_number(fixed.as_str()).unwrap();
            prop_assert_eq!(parsed, PreciseNumber::new(amount, unit));
        }

        #[test]
        fn prop_encode_is_canonical(digits in "-?[0-9]{1,60}", unit in 0u32..40) {
            let fixed = encode(&big(&digits), Unit::new(unit));
            let text = fixed.as_str();
            let unsigned = text.strip_prefix('-').unwrap_or(text);
            let integral = unsigned.split('.').next().unwrap();

            prop_assert!(integral == "0" || !integral.starts_with('0'));
            if unit > 0 {
                let fraction = unsigned.split('.').nth(1).unwrap();
                prop_assert_eq!(fraction.len() as u32, unit);
            } else {
                prop_assert!(!text.contains('.'));
            }
        }

        #[test]
        fn prop_zero_is_never_signed(zeros in "-?0{1,20}", unit in 0u32..40) {
            let fixed = encode(&big(&zeros), Unit::new(unit));
            prop_assert!(!fixed.as_str().starts_with('-'));
        }
    }
}
