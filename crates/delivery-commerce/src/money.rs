//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. The store keeps
//! prices as decimal numbers with two places; conversion happens at the
//! serde boundary.

use crate::CommerceError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    BRL,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "BRL").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol (e.g., "R$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Currency::BRL | Currency::EUR => ',',
            Currency::USD => '.',
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "BRL" => Some(Currency::BRL),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }

    /// Format an amount, e.g. `R$ 12,50`.
    pub fn format(&self, money: Money) -> String {
        let sign = if money.is_negative() { "-" } else { "" };
        let cents = money.amount_cents.unsigned_abs();
        format!(
            "{}{} {}{}{:02}",
            sign,
            self.symbol(),
            cents / 100,
            self.decimal_separator(),
            cents % 100
        )
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents.
    pub amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a Money value from a decimal amount, rounding to the cent.
    ///
    /// ```
    /// use delivery_commerce::money::Money;
    /// let price = Money::from_decimal(49.99);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::new((amount * 100.0).round() as i64)
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Try to add another Money value.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    /// Try to subtract another Money value.
    pub fn try_sub(&self, other: &Money) -> Result<Money, CommerceError> {
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    /// Try to multiply by a quantity.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        self.amount_cents
            .checked_mul(factor)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    /// Sum an iterator of Money values, failing on overflow.
    pub fn try_sum(iter: impl IntoIterator<Item = Money>) -> Result<Money, CommerceError> {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, m| acc.try_add(&m))
    }

    /// Format as a display string in the given currency.
    pub fn display(&self, currency: Currency) -> String {
        currency.format(*self)
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturating; use [`Money::try_add`] where overflow must surface.
    fn add(self, other: Money) -> Money {
        Money::new(self.amount_cents.saturating_add(other.amount_cents))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Currency::default().format(*self))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Money::from_decimal(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Money::from_decimal)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).amount_cents, 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents, 30);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(1250).to_string(), "R$ 12,50");
        assert_eq!(Money::new(5).display(Currency::USD), "$ 0.05");
        assert_eq!(Money::new(-300).to_string(), "-R$ 3,00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::new(1000);
        assert_eq!(a.try_add(&Money::new(500)).unwrap(), Money::new(1500));
        assert_eq!(a.try_multiply(3).unwrap(), Money::new(3000));
        assert_eq!(a.try_sub(&Money::new(1500)).unwrap(), Money::new(-500));
        assert!(matches!(
            Money::new(i64::MAX).try_add(&Money::new(1)),
            Err(CommerceError::Overflow)
        ));
        assert!(Money::new(i64::MAX).try_multiply(2).is_err());
    }

    #[test]
    fn test_try_sum() {
        let total = Money::try_sum([Money::new(100), Money::new(250), Money::new(50)]).unwrap();
        assert_eq!(total, Money::new(400));
        assert_eq!(Money::try_sum(Vec::new()).unwrap(), Money::zero());
    }

    #[test]
    fn test_serde_as_decimal() {
        assert_eq!(serde_json::to_string(&Money::new(2990)).unwrap(), "29.9");
        let m: Money = serde_json::from_str("29.9").unwrap();
        assert_eq!(m, Money::new(2990));
        let m: Money = serde_json::from_str("12").unwrap();
        assert_eq!(m, Money::new(1200));
        let m: Money = serde_json::from_str(r#""7.35""#).unwrap();
        assert_eq!(m, Money::new(735));
        assert!(serde_json::from_str::<Money>(r#""abc""#).is_err());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("brl"), Some(Currency::BRL));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
