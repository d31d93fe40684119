//! Type-safe price representation using decimal arithmetic.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency (rupees).
///
/// Wraps [`Decimal`] so cart and order totals never go through floating
/// point. Upstream services send plain JSON numbers; route handlers convert
/// at the wire boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
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

    /// Create a price from a whole-rupee amount.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from_i128_with_scale(rupees as i128, 0))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Unit price times a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Price {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl core::fmt::Display for Price {
    /// Formats as the storefront shows prices, e.g. `₹1250`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_exact() {
        let unit = Price::from_rupees(100);
        assert_eq!(unit.times(3), Price::from_rupees(300));
        assert_eq!(unit + unit, Price::from_rupees(200));
        assert_eq!(Price::from_rupees(300) - unit, Price::from_rupees(200));
    }

    #[test]
    fn sum_over_lines() {
        let total: Price = [Price::from_rupees(10), Price::from_rupees(32)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupees(42));
    }

    #[test]
    fn display_uses_rupee_sign() {
        assert_eq!(Price::from_rupees(1250).to_string(), "₹1250");
        assert_eq!(Price::ZERO.to_string(), "₹0");
    }
}
