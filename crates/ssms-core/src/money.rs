//! # Money Module
//!
//! Integer-cent money and basis-point tax rates.
//!
//! Prices, totals, discounts and taxes are stored as `*_cents` integer
//! columns and carried as [`Money`] in Rust. Decimal text such as `"65000.00"`
//! is only parsed at the edges (seed data, form input) and only formatted for
//! display.
//!
//! ## Usage
//! ```rust
//! use ssms_core::money::{Money, TaxRate};
//!
//! let unit = Money::parse("450.00").unwrap();
//! let line = unit * 2;                        // 900.00
//! let tax = line.calculate_tax(TaxRate::from_bps(500)); // 5%
//! assert_eq!(tax.cents(), 4500);
//! assert_eq!((line + tax).format_with("$"), "$945.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::value::Value;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points: 1 bps = 0.01%, so 1800 = 18%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// From a fraction such as the `0.18` used in configuration files.
    pub fn from_fraction(fraction: f64) -> Self {
        TaxRate((fraction * 10_000.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in cents (the smallest currency unit).
///
/// Signed so refunds and discounts can go negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses decimal text: `"65000"`, `"65000.5"`, `"65000.00"`, `"-12.30"`.
    ///
    /// More than two fractional digits is rejected rather than rounded.
    ///
    /// ## Example
    /// ```rust
    /// use ssms_core::Money;
    ///
    /// assert_eq!(Money::parse("50000.00").unwrap().cents(), 5_000_000);
    /// assert_eq!(Money::parse("0.5").unwrap().cents(), 50);
    /// assert!(Money::parse("1.005").is_none());
    /// assert!(Money::parse("abc").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Money> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > 2 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };
        let cents = whole.checked_mul(100)?.checked_add(frac)?;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Tax on this amount, rounded half away from zero to the cent.
    ///
    /// ```rust
    /// use ssms_core::money::{Money, TaxRate};
    ///
    /// // 10.00 at 8.25% = 0.825 → 0.83
    /// assert_eq!(Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825)).cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(scale_bps(self.0, rate.bps()))
    }

    /// Amount after taking `discount_bps` off.
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        Money(self.0 - scale_bps(self.0, discount_bps))
    }

    /// Gross margin of selling at `self` against `cost`, in basis points of
    /// the selling price. `None` when the selling price is zero.
    pub fn margin_bps(&self, cost: Money) -> Option<i64> {
        if self.0 == 0 {
            return None;
        }
        let profit = (self.0 - cost.0) as i128 * 10_000;
        Some((profit / self.0 as i128) as i64)
    }

    /// Formats with a currency symbol: `₹65000.00`, `-$12.30`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }
}

/// amount × bps / 10000, rounded half away from zero.
fn scale_bps(amount: i64, bps: u32) -> i64 {
    let product = amount as i128 * bps as i128;
    let rounded = if product >= 0 {
        (product + 5_000) / 10_000
    } else {
        (product - 5_000) / 10_000
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal, no symbol: `65000.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(""))
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

/// Quantity multiplication.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Money binds as its cent count.
impl From<Money> for Value {
    fn from(m: Money) -> Self {
        Value::Int(m.cents())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("65000.00"), Some(Money::from_cents(6_500_000)));
        assert_eq!(Money::parse(" 450 "), Some(Money::from_cents(45_000)));
        assert_eq!(Money::parse("-12.3"), Some(Money::from_cents(-1_230)));
        assert_eq!(Money::parse(".75"), Some(Money::from_cents(75)));
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("."), None);
        assert_eq!(Money::parse("1.234"), None);
        assert_eq!(Money::parse("1,000.00"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::from_cents(6_500_000).format_with("₹"), "₹65000.00");
        assert_eq!(Money::from_cents(-1_230).format_with("$"), "-$12.30");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_tax_rounding() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(Money::from_cents(1000).calculate_tax(rate).cents(), 83);
        assert_eq!(Money::from_cents(-1000).calculate_tax(rate).cents(), -83);
        assert_eq!(Money::from_cents(1000).calculate_tax(TaxRate::zero()).cents(), 0);
        assert_eq!(TaxRate::from_fraction(0.18).bps(), 1800);
    }

    #[test]
    fn test_discount_and_margin() {
        let price = Money::from_cents(10_000);
        assert_eq!(price.apply_percentage_discount(1000).cents(), 9_000);

        // Laptop: cost 50000.00, sells 65000.00 → 23.07% margin
        let selling = Money::from_cents(6_500_000);
        let cost = Money::from_cents(5_000_000);
        assert_eq!(selling.margin_bps(cost), Some(2307));
        assert_eq!(Money::zero().margin_bps(cost), None);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let total: Money = [500, 250, 1]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 751);
        assert_eq!((Money::from_cents(45_000) * 2).cents(), 90_000);

        let mut running = Money::from_cents(100);
        running -= Money::from_cents(150);
        assert!(running.is_negative());
        assert_eq!(Value::from(running), Value::Int(-50));
    }
}
