//! Money helpers with decimal precision.
//!
//! Never use floating-point for money calculations. Every amount is a
//! `rust_decimal::Decimal` rounded to [`MONEY_SCALE`] places at the edges
//! where a value is fixed (invoice totals, rates shown to users).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for monetary amounts and percentages.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a stored amount: `DECIMAL(16, 2)` leaves 14
/// integer digits.
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(276_447_232, 23_283, 0, false, 0);

/// Returns true if `amount` has at most [`MONEY_SCALE`] significant decimal
/// places. Trailing zeros do not count, so `10.500` qualifies.
#[must_use]
pub fn has_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Returns true if `amount` fits a `DECIMAL(16, 2)` column without rounding.
#[must_use]
pub fn fits_money_column(amount: Decimal) -> bool {
    has_money_scale(amount) && amount.abs() < MONEY_LIMIT
}

/// Rounds an amount to [`MONEY_SCALE`] places using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns `part / whole * 100` rounded to [`MONEY_SCALE`] places, or zero
/// when `whole` is zero.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part * Decimal::ONE_HUNDRED / whole)
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
    /// Saudi Riyal
    Sar,
    /// UAE Dirham
    Aed,
}

impl Currency {
    /// Returns the ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Sar => "SAR",
            Self::Aed => "AED",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "SAR" => Ok(Self::Sar),
            "AED" => Ok(Self::Aed),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
