//! # Money
//!
//! Whole cents, signed. Every amount in the ledger goes through [`Money`].
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE SPLITTING PROBLEM                                                  │
//! │                                                                         │
//! │  With floating point dollars:                                           │
//! │    $10.00 / 3 = 3.3333... each, rounded to $3.33 (×3 = $9.99)          │
//! │    One cent silently disappears from the ledger.                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents, remainder 1                              │
//! │    The remainder cent is handed to a participant explicitly, so the    │
//! │    shares always add back up to exactly 1000.                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tripsplit_core::money::Money;
//!
//! let dinner = Money::from_cents(12_450); // $124.50
//! let tip = Money::from_dollars_str("18.75").unwrap();
//! assert_eq!((dinner + tip).cents(), 14_325);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Sign Convention
/// A single share is never negative. A *balance* is signed:
/// positive means the person is owed money, negative means they owe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// let lodging = Money::from_cents(90_000); // $900.00
    /// assert_eq!(lodging.cents(), 90_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a user-entered dollar amount into cents, exactly.
    ///
    /// Accepts an optional leading `$`, thousands separators and up to two
    /// decimal places: `"12"`, `"12.5"`, `"$1,234.56"`, `".99"`.
    /// Negative amounts are rejected, expenses are never negative.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars_str("$1,234.5").unwrap().cents(), 123_450);
    /// assert!(Money::from_dollars_str("12.345").is_err());
    /// assert!(Money::from_dollars_str("-4").is_err());
    /// ```
    pub fn from_dollars_str(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must contain at least one digit"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a positive dollar amount like 12.34"));
        }
        if fraction.len() > 2 {
            return Err(invalid("must have at most two decimal places"));
        }

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("is not a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("is not a number"))?,
        };

        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Money)
            .ok_or_else(|| invalid("is too large"))
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Strictly greater than zero; a person with a positive balance is owed.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as US dollars, e.g. `$12.34` or `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(-5)), "-$0.05");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(300);

        assert_eq!((a + b).cents(), 1300);
        assert_eq!((a - b).cents(), 700);
        assert_eq!((-a).cents(), -1000);

        let mut running = Money::zero();
        running += a;
        running -= b;
        assert_eq!(running.cents(), 700);
    }

    #[test]
    fn test_sum() {
        let shares = [
            Money::from_cents(334),
            Money::from_cents(333),
            Money::from_cents(333),
        ];
        let total: Money = shares.iter().sum();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-250).abs().cents(), 250);
    }

    #[test]
    fn test_from_dollars_str_accepts_common_inputs() {
        assert_eq!(Money::from_dollars_str("12").unwrap().cents(), 1200);
        assert_eq!(Money::from_dollars_str("12.5").unwrap().cents(), 1250);
        assert_eq!(Money::from_dollars_str("12.05").unwrap().cents(), 1205);
        assert_eq!(Money::from_dollars_str(".99").unwrap().cents(), 99);
        assert_eq!(Money::from_dollars_str("  $1,234.56 ").unwrap().cents(), 123_456);
        assert_eq!(Money::from_dollars_str("7.").unwrap().cents(), 700);
    }

    #[test]
    fn test_from_dollars_str_rejects_bad_inputs() {
        assert!(matches!(
            Money::from_dollars_str("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(Money::from_dollars_str(".").is_err());
        assert!(Money::from_dollars_str("-3.00").is_err());
        assert!(Money::from_dollars_str("3.001").is_err());
        assert!(Money::from_dollars_str("abc").is_err());
        assert!(Money::from_dollars_str("1.2.3").is_err());
        assert!(Money::from_dollars_str("99999999999999999999").is_err());
    }
}
