//! Type-safe money representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
///
/// Amounts use `rust_decimal` to avoid floating-point drift in totals the
/// client displays. The backend remains authoritative for every total it
/// stores; these values are for client-side display math only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., rupees, not paisa).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a PKR amount (the marketplace's only trading currency).
    #[must_use]
    pub const fn pkr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::Pkr)
    }

    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Zero PKR, the usual accumulator seed.
    #[must_use]
    pub fn zero_pkr() -> Self {
        Self::zero(CurrencyCode::Pkr)
    }

    /// Line total for a quantity of this unit amount.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Sum of two amounts. Keeps this value's currency; the marketplace
    /// trades in a single currency so mixed sums do not arise.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self::new(self.amount + other.amount, self.currency_code)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:.2}", self.currency_code.code(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Pkr,
    Usd,
    Eur,
}

impl CurrencyCode {
    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Pkr => "PKR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}
