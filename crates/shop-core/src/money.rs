//! # Money Types
//!
//! Currency handling for the storefront.
//! Amounts are `rust_decimal::Decimal` everywhere inside the core and are
//! converted to integer minor units (cents) only at the payment-processor
//! boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Currency symbol for display
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.),
    /// rounding half away from zero. Exact for amounts that are multiples of
    /// the smallest unit; sub-unit fractions round.
    pub fn minor_units(&self, amount: Decimal) -> i64 {
        let scale = Decimal::from(10_i64.pow(self.decimal_places()));
        (amount * scale)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Convert from smallest unit back to a decimal amount
    pub fn from_minor_units(&self, amount: i64) -> Decimal {
        Decimal::new(amount, self.decimal_places())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Format a decimal amount for display (e.g. "$24.98")
pub fn display_amount(currency: Currency, amount: Decimal) -> String {
    if currency.decimal_places() == 0 {
        format!("{}{:.0}", currency.symbol(), amount)
    } else {
        format!("{}{:.2}", currency.symbol(), amount)
    }
}
