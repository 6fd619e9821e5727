//! Budget

use std::{fmt, ops::Deref, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Spendable amount for a single optimisation, in whole currency units.
///
/// Fractional amounts are allowed. Negative amounts can be represented so the
/// optimizer can reject them as invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Budget {
    value: Decimal,
}

impl Budget {
    /// Creates a new budget
    pub fn new(value: Decimal) -> Self {
        Budget { value }
    }

    /// Whether the amount is below zero
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    /// Whole currency units that can actually be spent.
    ///
    /// Prices are whole units, so any fractional remainder can never be used.
    /// Returns `None` for negative budgets or amounts beyond `u64`.
    pub fn spendable_units(&self) -> Option<u64> {
        if self.is_negative() {
            return None;
        }

        self.value.floor().to_u64()
    }
}

impl Deref for Budget {
    type Target = Decimal;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl From<Decimal> for Budget {
    fn from(value: Decimal) -> Self {
        Budget::new(value)
    }
}

impl From<i64> for Budget {
    fn from(value: i64) -> Self {
        Budget::new(Decimal::from(value))
    }
}

impl From<u64> for Budget {
    fn from(value: u64) -> Self {
        Budget::new(Decimal::from(value))
    }
}

impl FromStr for Budget {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Budget::new)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
