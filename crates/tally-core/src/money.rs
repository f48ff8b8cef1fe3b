//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    1.005.toFixed(2) = "1.00"        ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents do not fit either:                                       │
//! │    2.5 kg × ₹19.99 needs fractional quantities                          │
//! │    CGST = amount × rate / 200 needs half-rate precision                 │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal (28 significant digits)                  │
//! │    Intermediate math is exact; rounding happens once, for display      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::Money;
//! use tally_core::types::Percent;
//!
//! let rate = Money::new(Decimal::new(1999, 2)); // 19.99
//! let amount = rate.times(Decimal::new(25, 1)); // × 2.5
//! assert_eq!(amount.to_string(), "49.98");
//!
//! let tax = amount.percent_of(Percent::new(Decimal::from(18)));
//! assert_eq!(tax.display_with("₹"), "₹9.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;
use crate::DISPLAY_DECIMALS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the document currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values appear when a fixed discount
///   exceeds the subtotal
/// - **Single field tuple struct**: zero-cost abstraction over `Decimal`
/// - **Saturating arithmetic**: the engine never panics, even on absurd input
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.rate × quantity ──► LineItem.amount ──┬──► item tax / total   │
/// │                                                 │                       │
/// │                                                 └──► Σ subtotal         │
/// │                                                          │              │
/// │                                   subtotal - discount ──► total         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies a unit rate by a (possibly fractional) quantity.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    ///
    /// let unit = Money::new(Decimal::from(150));
    /// assert_eq!(unit.times(Decimal::from(3)), Money::new(Decimal::from(450)));
    /// ```
    #[inline]
    pub fn times(&self, quantity: Decimal) -> Money {
        Money(self.0.saturating_mul(quantity))
    }

    /// Returns `rate` percent of this amount: `amount × rate / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    /// use tally_core::types::Percent;
    ///
    /// let amount = Money::new(Decimal::from(500));
    /// let tax = amount.percent_of(Percent::new(Decimal::from(5)));
    /// assert_eq!(tax, Money::new(Decimal::from(25)));
    /// ```
    pub fn percent_of(&self, rate: Percent) -> Money {
        self.scaled_by(rate, Decimal::ONE_HUNDRED)
    }

    /// Returns half of `rate` percent of this amount: `amount × rate / 200`.
    ///
    /// This is one of the two equal CGST/SGST components of a GST rate.
    pub fn half_percent_of(&self, rate: Percent) -> Money {
        self.scaled_by(rate, Decimal::from(200))
    }

    fn scaled_by(&self, rate: Percent, divisor: Decimal) -> Money {
        let product = self.0.saturating_mul(rate.value());
        Money(product.checked_div(divisor).unwrap_or(Decimal::ZERO))
    }

    /// Rounds to two decimal places, half away from zero.
    ///
    /// ## Why Half Away From Zero?
    /// This is what the invoice UI has always shown (`toFixed(2)` on exact
    /// values): 0.125 → 0.13, -0.125 → -0.13. Banker's rounding would print
    /// 0.12 and disagree with every document generated so far.
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Formats the rounded amount with a currency symbol prefix.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::new(Decimal::new(10995, 3)).display_with("$"), "$11.00");
    /// assert_eq!(Money::new(Decimal::from(-5)).display_with("€"), "-€5.00");
    /// ```
    pub fn display_with(&self, symbol: &str) -> String {
        let rounded = self.rounded();
        let sign = if rounded.is_negative() { "-" } else { "" };
        format!(
            "{}{}{:.prec$}",
            sign,
            symbol,
            rounded.0.abs(),
            prec = DISPLAY_DECIMALS as usize
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering without a symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.rounded().0, prec = DISPLAY_DECIMALS as usize)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
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
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
