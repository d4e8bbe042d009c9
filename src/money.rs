//! Fixed-point euro amounts.
//!
//! Every amount in the ledger is held as whole cents so that sums over the
//! transaction list and the cash log reconcile exactly. On the wire (the JSON
//! snapshot and config files) amounts are plain decimal euro numbers, which
//! keeps exported config files readable and compatible with older exports.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PosError, PosResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Round a floating euro value to the nearest cent (half away from zero).
    /// Non-finite input maps to zero.
    pub fn from_euros(euros: f64) -> Self {
        if !euros.is_finite() {
            return Money::ZERO;
        }
        Money((euros * 100.0).round() as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn to_euros(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Saturates at the `i64` bounds. Cart lines are bounded by
    /// [`Money::checked_times`] before they are booked.
    pub fn times(self, count: u32) -> Self {
        Money(self.0.saturating_mul(i64::from(count)))
    }

    pub fn checked_times(self, count: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(count)).map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Parse a user-entered amount: `4,50`, `4.50`, `4`, `-3,5`, `12,00 €`.
    /// At most two fractional digits are accepted.
    pub fn parse(input: &str) -> PosResult<Self> {
        let invalid = || PosError::InvalidAmount(input.trim().to_string());

        let trimmed = input.trim().trim_end_matches('€').trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        if digits.is_empty() {
            return Err(invalid());
        }

        let normalized = digits.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
            || frac.len() > 2
        {
            return Err(invalid());
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(invalid)?
        };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid())?,
        };

        let cents = whole_cents + frac_cents;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Render as `45,00 €`, the format printed on tabs and reports.
pub fn format_price(amount: Money) -> String {
    amount.to_string()
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{},{:02} €", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_euros())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let euros = Option::<f64>::deserialize(deserializer)?;
        Ok(euros.map(Money::from_euros).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_comma_and_euro_suffix() {
        assert_eq!(Money::from_cents(4500).to_string(), "45,00 €");
        assert_eq!(Money::from_cents(250).to_string(), "2,50 €");
        assert_eq!(Money::from_cents(5).to_string(), "0,05 €");
        assert_eq!(Money::from_cents(-350).to_string(), "-3,50 €");
        assert_eq!(format_price(Money::ZERO), "0,00 €");
    }

    #[test]
    fn test_from_euros_rounds_float_artifacts() {
        assert_eq!(Money::from_euros(4.35).cents(), 435);
        assert_eq!(Money::from_euros(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_euros(4.999999999).cents(), 500);
        assert_eq!(Money::from_euros(f64::NAN), Money::ZERO);
    }

    #[test]
    fn test_parse_accepts_comma_and_dot() {
        assert_eq!(Money::parse("4,50").unwrap().cents(), 450);
        assert_eq!(Money::parse("4.5").unwrap().cents(), 450);
        assert_eq!(Money::parse(" 12 ").unwrap().cents(), 1200);
        assert_eq!(Money::parse("12,00 €").unwrap().cents(), 1200);
        assert_eq!(Money::parse(",75").unwrap().cents(), 75);
        assert_eq!(Money::parse("-3,5").unwrap().cents(), -350);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "1,234", "1.2.3", "-", "4,5x", ","] {
            assert!(
                matches!(Money::parse(bad), Err(PosError::InvalidAmount(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_sum_and_times() {
        let items = [Money::from_cents(250), Money::from_cents(100)];
        let total: Money = items.iter().sum();
        assert_eq!(total.cents(), 350);
        assert_eq!(Money::from_cents(4500).times(3).cents(), 13_500);
        assert_eq!(Money::from_cents(i64::MAX).times(2).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MAX / 2).checked_times(3), None);
        assert_eq!(
            Money::from_cents(250).checked_times(4),
            Some(Money::from_cents(1000))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_json_is_decimal_euros() {
        let v = serde_json::to_value(Money::from_cents(250)).unwrap();
        assert_eq!(v, serde_json::json!(2.5));
        let back: Money = serde_json::from_value(serde_json::json!(45)).unwrap();
        assert_eq!(back.cents(), 4500);
        let null: Money = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert_eq!(null, Money::ZERO);
    }
}
