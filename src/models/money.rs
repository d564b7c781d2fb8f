//! Money value type for representing currency amounts
//!
//! Amounts are fixed-point decimals (never binary floats) paired with a
//! three-letter currency code. Arithmetic is only defined between values of
//! the same currency and is exposed as named, fallible functions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FinanceError, FinanceResult};

/// Currency used when none is given
pub const DEFAULT_CURRENCY: &str = "USD";

/// An ISO-4217-style currency code (three upper-case letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code, accepting any letter case
    pub fn parse(code: &str) -> FinanceResult<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(FinanceError::invalid(
                "currency",
                format!("'{}' is not a three-letter currency code", code),
            ));
        }
        Ok(Self(code))
    }

    /// US dollars, the default currency
    pub fn usd() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }

    /// Get the currency code
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An immutable amount of money in a single currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a money value
    ///
    /// # Examples
    /// ```
    /// use finance_tracker::models::{Currency, Money};
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Money::new(Decimal::new(1050, 2), Currency::usd()); // 10.50 USD
    /// assert!(amount.is_positive());
    /// ```
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a money value in US dollars
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, Currency::usd())
    }

    /// Zero in the default currency
    pub fn zero() -> Self {
        Self::zero_in(Currency::usd())
    }

    /// Zero in the given currency
    pub fn zero_in(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Get the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the currency
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Check whether both values share a currency
    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    /// Add two amounts of the same currency
    pub fn add(&self, other: &Money) -> FinanceResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| overflow("addition"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Subtract an amount of the same currency
    pub fn subtract(&self, other: &Money) -> FinanceResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| overflow("subtraction"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Check if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Check if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Parse an amount in the given currency
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "10"
    pub fn parse(s: &str, currency: Currency) -> FinanceResult<Self> {
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };
        let s = s.strip_prefix('$').unwrap_or(s);

        let amount = Decimal::from_str(s)
            .map_err(|_| FinanceError::invalid("amount", format!("invalid money format: {}", s)))?;

        Ok(Self::new(if negative { -amount } else { amount }, currency))
    }

    pub(crate) fn ensure_same_currency(&self, other: &Money) -> FinanceResult<()> {
        if !self.same_currency(other) {
            return Err(FinanceError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

fn overflow(operation: &str) -> FinanceError {
    FinanceError::invalid("amount", format!("{} overflowed", operation))
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.amount;
        if shown.scale() < 2 {
            shown.rescale(2);
        }
        write!(f, "{} {}", shown, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::parse("EUR").unwrap())
    }

    #[test]
    fn test_add_same_currency() {
        let a = Money::usd(dec!(10.25));
        let b = Money::usd(dec!(4.75));

        let sum = a.add(&b).unwrap();
        assert_eq!(sum, Money::usd(dec!(15.00)));
        assert_eq!(sum.currency().code(), "USD");
    }

    #[test]
    fn test_add_currency_mismatch() {
        let err = Money::usd(dec!(1)).add(&eur(dec!(1))).unwrap_err();
        assert!(err.is_currency_mismatch());
    }

    #[test]
    fn test_subtract() {
        let a = Money::usd(dec!(10.00));
        let b = Money::usd(dec!(12.50));

        let diff = a.subtract(&b).unwrap();
        assert_eq!(diff.amount(), dec!(-2.50));
        assert!(diff.is_negative());
        assert!(a.subtract(&eur(dec!(1))).unwrap_err().is_currency_mismatch());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let max = Money::usd(Decimal::MAX);
        let err = max.add(&Money::usd(Decimal::ONE)).unwrap_err();
        assert!(err.is_invalid_argument());

        let min = Money::usd(Decimal::MIN);
        assert!(min.subtract(&Money::usd(Decimal::ONE)).is_err());

        // Mismatch is still reported before overflow
        assert!(max.add(&eur(Decimal::ONE)).unwrap_err().is_currency_mismatch());
    }

    #[test]
    fn test_decimal_precision_is_preserved() {
        let total = Money::usd(dec!(0.1))
            .add(&Money::usd(dec!(0.2)))
            .unwrap();
        assert_eq!(total.amount(), dec!(0.3));
    }

    #[test]
    fn test_is_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::usd(dec!(0.01)).is_positive());
        assert!(Money::usd(dec!(-0.01)).is_negative());
        assert_eq!(Money::zero().currency(), &Currency::usd());
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("eur").unwrap().code(), "EUR");
        assert!(Currency::parse("EURO").unwrap_err().is_invalid_argument());
        assert!(Currency::parse("U5D").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Money::parse("10.50", Currency::usd()).unwrap().amount(),
            dec!(10.50)
        );
        assert_eq!(
            Money::parse("$10.50", Currency::usd()).unwrap().amount(),
            dec!(10.50)
        );
        assert_eq!(
            Money::parse("-3", Currency::usd()).unwrap().amount(),
            dec!(-3)
        );
        assert!(Money::parse("ten", Currency::usd()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::usd(dec!(10.5)).to_string(), "10.50 USD");
        assert_eq!(Money::usd(dec!(7)).to_string(), "7.00 USD");
        assert_eq!(eur(dec!(0.125)).to_string(), "0.125 EUR");
    }

    #[test]
    fn test_serialization() {
        let m = Money::usd(dec!(10.50));
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"USD\""));

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
