//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as JSON numbers (`120`, `499.99`). They are parsed
//! straight into [`rust_decimal::Decimal`] so cart arithmetic never goes
//! through binary floating point.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative amount in the store currency.
///
/// The store trades in a single currency, so no currency code is carried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from hundredths of a currency unit (`49999` is `499.99`).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl fmt::Display for Price {
    /// Format for display, e.g. `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(49_999).amount(), Decimal::new(49_999, 2));
        assert_eq!(Price::from_cents(50_000), Price::from_units(500));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_units(60).to_string(), "$60.00");
        assert_eq!(Price::from_cents(1_999).to_string(), "$19.99");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(250).times(4), Price::from_units(3)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_units(13));
    }

    #[test]
    fn test_saturating_sub() {
        let a = Price::from_units(100);
        let b = Price::from_units(150);
        assert_eq!(a.saturating_sub(b), Price::ZERO);
        assert_eq!(b.saturating_sub(a), Price::from_units(50));
    }

    #[test]
    fn test_deserialize_from_json() {
        let price: Price = serde_json::from_str(r#""499.99""#).unwrap();
        assert_eq!(price, Price::from_cents(49_999));

        let price: Price = serde_json::from_str("120").unwrap();
        assert_eq!(price, Price::from_units(120));
    }
}
