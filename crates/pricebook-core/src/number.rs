//! # Big Integer Helpers
//!
//! Sign-aware helpers over [`BigInt`] shared by the fixed digit codec and the
//! precise number arithmetic.
//!
//! ## Why BigInt?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  i64 cents:      9,223,372,036,854,775,807  (~92 quadrillion dollars)   │
//! │  i64 satoshis:   92,233,720,368 BTC         fine... until you multiply │
//! │                                             by an exchange rate with    │
//! │                                             15 fractional digits       │
//! │                                                                         │
//! │  BigInt: no ceiling, no silent wrap-around, no truncation              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Returns the absolute value of an amount.
#[inline]
pub fn bigint_abs(amount: &BigInt) -> BigInt {
    amount.abs()
}

/// Returns the decimal digits of `|amount|` (no sign, no leading zeros).
///
/// ## Example
/// ```rust
/// use num_bigint::BigInt;
/// use pricebook_core::number::abs_digits;
///
/// assert_eq!(abs_digits(&BigInt::from(-1090)), "1090");
/// assert_eq!(abs_digits(&BigInt::from(0)), "0");
/// ```
pub fn abs_digits(amount: &BigInt) -> String {
    amount.magnitude().to_str_radix(10)
}

/// True iff `amount` is strictly below zero. Zero is never negative.
#[inline]
pub fn is_negative(amount: &BigInt) -> bool {
    amount.is_negative()
}

/// Checks that `text` is an optional leading `-` followed by one or more
/// ASCII digits.
///
/// ## Example
/// ```rust
/// use pricebook_core::number::is_all_number;
///
/// assert!(is_all_number("-000123"));
/// assert!(!is_all_number("-"));
/// assert!(!is_all_number("12a"));
/// assert!(!is_all_number("+12"));
/// ```
pub fn is_all_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a signed digit string (see [`is_all_number`]) into a [`BigInt`].
pub fn parse_signed_digits(text: &str) -> Option<BigInt> {
    if !is_all_number(text) {
        return None;
    }
    text.parse::<BigInt>().ok()
}

/// `10^exp` as a [`BigInt`].
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// True iff `amount` is a multiple of `10^exp`.
pub fn is_multiple_of_pow10(amount: &BigInt, exp: u32) -> bool {
    (amount % pow10(exp)).is_zero()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_and_sign() {
        assert_eq!(bigint_abs(&BigInt::from(-42)), BigInt::from(42));
        assert_eq!(bigint_abs(&BigInt::from(42)), BigInt::from(42));
        assert!(is_negative(&BigInt::from(-1)));
        assert!(!is_negative(&BigInt::from(0)));
        assert!(!is_negative(&-BigInt::from(0)));
    }

    #[test]
    fn test_abs_digits_large() {
        let big: BigInt = "-923412810198765432891084235201273938423711".parse().unwrap();
        assert_eq!(abs_digits(&big), "923412810198765432891084235201273938423711");
    }

    #[test]
    fn test_is_all_number() {
        assert!(is_all_number("0"));
        assert!(is_all_number("1234567890"));
        assert!(is_all_number("-1"));

        assert!(!is_all_number(""));
        assert!(!is_all_number("-"));
        assert!(!is_all_number("--1"));
        assert!(!is_all_number("1-"));
        assert!(!is_all_number("1_000"));
        assert!(!is_all_number(" 1"));
        assert!(!is_all_number("١٢"));
    }

    #[test]
    fn test_parse_signed_digits() {
        assert_eq!(parse_signed_digits("-0012"), Some(BigInt::from(-12)));
        assert_eq!(parse_signed_digits("-0"), Some(BigInt::from(0)));
        assert_eq!(parse_signed_digits("1_0"), None);
        assert_eq!(parse_signed_digits("+1"), None);
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), BigInt::from(1));
        assert_eq!(pow10(8), BigInt::from(100_000_000));
        assert!(is_multiple_of_pow10(&BigInt::from(-1200), 2));
        assert!(!is_multiple_of_pow10(&BigInt::from(1201), 2));
    }
}
