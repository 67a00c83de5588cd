//! Money amounts.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Non-negative amount of money in the smallest currency unit (hellers, cents).
///
/// Arithmetic is checked: subtraction below zero and overflow return `None`
/// so callers can turn them into domain errors instead of wrapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(u64);

impl MoneyAmount {
    pub const ZERO: MoneyAmount = MoneyAmount(0);

    pub const fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Amount in whole currency units (`of(100)` is 100.00).
    pub const fn of(units: u64) -> Self {
        Self(units * 100)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_lower_than(&self, other: MoneyAmount) -> bool {
        self.0 < other.0
    }

    pub fn checked_add(self, other: MoneyAmount) -> Option<MoneyAmount> {
        self.0.checked_add(other.0).map(MoneyAmount)
    }

    pub fn checked_sub(self, other: MoneyAmount) -> Option<MoneyAmount> {
        self.0.checked_sub(other.0).map(MoneyAmount)
    }
}

impl ValueObject for MoneyAmount {}

impl core::fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<u64> for MoneyAmount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl core::iter::Sum for MoneyAmount {
    /// Saturates at `u64::MAX`; balances never get close.
    fn sum<I: Iterator<Item = MoneyAmount>>(iter: I) -> Self {
        iter.fold(MoneyAmount::ZERO, |acc, m| MoneyAmount(acc.0.saturating_add(m.0)))
    }
}
