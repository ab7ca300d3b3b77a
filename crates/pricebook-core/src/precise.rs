//! # Precise Number Arithmetic
//!
//! Exact arithmetic over [`PreciseNumber`]. Nothing here rounds unless a
//! [`RoundingMode`] is asked for explicitly.
//!
//! ## Unit Alignment
//! ```text
//! 10.90 + 0.00012345          (1090, 2) + (12345, 8)
//!                                   │
//!                     align to max unit = 8
//!                                   ▼
//!                       (1090000000, 8) + (12345, 8)
//!                                   │
//!                                   ▼
//!                       (1090012345, 8)  = 10.90012345
//! ```

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::ops::{Add, Mul, Sub};

use crate::fixed::{PreciseNumber, Unit};
use crate::number::{is_multiple_of_pow10, pow10};

/// How to drop fractional digits when lowering a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Drop the extra digits (round toward zero).
    #[default]
    Truncate,
    /// Round to nearest, ties away from zero.
    HalfUp,
}

impl PreciseNumber {
    /// Zero at the given unit.
    pub fn zero(unit: Unit) -> Self {
        PreciseNumber::new(BigInt::zero(), unit)
    }

    /// Amount scaled up to `unit` (which must be >= `self.unit`).
    fn aligned(&self, unit: Unit) -> BigInt {
        &self.amount * pow10(unit.get() - self.unit.get())
    }

    /// Exact sum, at the larger of the two units.
    pub fn add(&self, other: &PreciseNumber) -> PreciseNumber {
        let unit = self.unit.max(other.unit);
        PreciseNumber::new(self.aligned(unit) + other.aligned(unit), unit)
    }

    /// Exact difference, at the larger of the two units.
    pub fn subtract(&self, other: &PreciseNumber) -> PreciseNumber {
        let unit = self.unit.max(other.unit);
        PreciseNumber::new(self.aligned(unit) - other.aligned(unit), unit)
    }

    /// Exact product: amounts multiply, units add.
    ///
    /// ## Example
    /// ```rust
    /// use pricebook_core::fixed::PreciseNumber;
    ///
    /// let price: PreciseNumber = "163.88".parse().unwrap();
    /// let rate: PreciseNumber = "0.92".parse().unwrap();
    /// assert_eq!(price.multiply(&rate).to_string(), "150.7696");
    /// ```
    pub fn multiply(&self, other: &PreciseNumber) -> PreciseNumber {
        PreciseNumber::new(
            &self.amount * &other.amount,
            Unit::new(self.unit.get() + other.unit.get()),
        )
    }

    /// Quotient truncated toward zero at `target_unit` (defaults to the larger
    /// of the two units). Returns `None` when dividing by zero.
    pub fn checked_div(
        &self,
        other: &PreciseNumber,
        target_unit: Option<Unit>,
    ) -> Option<PreciseNumber> {
        if other.amount.is_zero() {
            return None;
        }

        let target = target_unit.unwrap_or_else(|| self.unit.max(other.unit));
        // self/other = (a / 10^ua) / (b / 10^ub); scale numerator so the
        // quotient lands at 10^target
        let shift =
            i64::from(target.get()) + i64::from(other.unit.get()) - i64::from(self.unit.get());
        let quotient = if shift >= 0 {
            let numerator = &self.amount * pow10(shift as u32);
            numerator / &other.amount
        } else {
            let denominator = &other.amount * pow10(shift.unsigned_abs() as u32);
            &self.amount / denominator
        };

        Some(PreciseNumber::new(quotient, target))
    }

    /// Moves the number to `target_unit`.
    ///
    /// Raising the unit is exact. Lowering it drops digits according to
    /// `rounding`.
    ///
    /// ## Example
    /// ```rust
    /// use pricebook_core::fixed::{PreciseNumber, Unit};
    /// use pricebook_core::precise::RoundingMode;
    ///
    /// let eur: PreciseNumber = "150.7696".parse().unwrap();
    /// assert_eq!(eur.normalize(Unit::new(2), RoundingMode::Truncate).to_string(), "150.76");
    /// assert_eq!(eur.normalize(Unit::new(2), RoundingMode::HalfUp).to_string(), "150.77");
    /// assert_eq!(eur.normalize(Unit::new(6), RoundingMode::Truncate).to_string(), "150.769600");
    /// ```
    pub fn normalize(&self, target_unit: Unit, rounding: RoundingMode) -> PreciseNumber {
        if target_unit >= self.unit {
            return PreciseNumber::new(self.aligned(target_unit), target_unit);
        }

        let factor = pow10(self.unit.get() - target_unit.get());
        let amount = match rounding {
            RoundingMode::Truncate => &self.amount / factor,
            RoundingMode::HalfUp => {
                let half: BigInt = &factor / 2;
                let adjusted = if self.amount.is_negative() {
                    &self.amount - half
                } else {
                    &self.amount + half
                };
                adjusted / factor
            }
        };

        PreciseNumber::new(amount, target_unit)
    }

    /// Moves the number to `target_unit` only if no non-zero digit is lost.
    ///
    /// `"10.50"` rescales to unit 1 (`"10.5"`) or unit 8, but not to unit 0.
    pub fn rescale_exact(&self, target_unit: Unit) -> Option<PreciseNumber> {
        if target_unit < self.unit
            && !is_multiple_of_pow10(&self.amount, self.unit.get() - target_unit.get())
        {
            return None;
        }
        Some(self.normalize(target_unit, RoundingMode::Truncate))
    }
}

impl Add for &PreciseNumber {
    type Output = PreciseNumber;

    fn add(self, other: Self) -> PreciseNumber {
        PreciseNumber::add(self, other)
    }
}

impl Sub for &PreciseNumber {
    type Output = PreciseNumber;

    fn sub(self, other: Self) -> PreciseNumber {
        self.subtract(other)
    }
}

impl Mul for &PreciseNumber {
    type Output = PreciseNumber;

    fn mul(self, other: Self) -> PreciseNumber {
        self.multiply(other)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> PreciseNumber {
        text.parse().unwrap()
    }

    #[test]
    fn test_add_aligns_units() {
        assert_eq!((&p("10.90") + &p("0.00012345")).to_string(), "10.90012345");
        assert_eq!((&p("1") + &p("-0.5")).to_string(), "0.5");
    }

    #[test]
    fn test_subtract() {
        assert_eq!((&p("10.90") - &p("10.9")).to_string(), "0.00");
        assert_eq!((&p("0.01") - &p("0.02")).to_string(), "-0.01");
    }

    #[test]
    fn test_multiply_adds_units() {
        let product = &p("163.88") * &p("1.00");
        assert_eq!(product.unit, Unit::new(4));
        assert_eq!(product.to_string(), "163.8800");
    }

    #[test]
    fn test_checked_div() {
        assert_eq!(p("10.00").checked_div(&p("3"), None).unwrap().to_string(), "3.33");
        assert_eq!(
            p("10").checked_div(&p("3"), Some(Unit::new(8))).unwrap().to_string(),
            "3.33333333"
        );
        assert_eq!(p("-10.00").checked_div(&p("3"), None).unwrap().to_string(), "-3.33");
        assert_eq!(
            p("1.000000").checked_div(&p("4"), Some(Unit::new(0))).unwrap().to_string(),
            "0"
        );
        assert!(p("1").checked_div(&p("0.00"), None).is_none());
    }

    #[test]
    fn test_normalize_half_up_handles_sign() {
        assert_eq!(p("-1.5").normalize(Unit::ZERO, RoundingMode::HalfUp).to_string(), "-2");
        assert_eq!(p("-1.4").normalize(Unit::ZERO, RoundingMode::HalfUp).to_string(), "-1");
        assert_eq!(p("1.5").normalize(Unit::ZERO, RoundingMode::HalfUp).to_string(), "2");
        assert_eq!(p("-1.9").normalize(Unit::ZERO, RoundingMode::Truncate).to_string(), "-1");
    }

    #[test]
    fn test_rescale_exact() {
        assert_eq!(p("10.50").rescale_exact(Unit::new(1)).unwrap().to_string(), "10.5");
        assert_eq!(p("10.50").rescale_exact(Unit::new(8)).unwrap().to_string(), "10.50000000");
        assert!(p("10.50").rescale_exact(Unit::ZERO).is_none());
        assert_eq!(p("-7.000").rescale_exact(Unit::ZERO).unwrap().to_string(), "-7");
    }

    #[test]
    fn test_zero() {
        assert_eq!(PreciseNumber::zero(Unit::new(2)).to_string(), "0.00");
    }
}
