use crate::error::{LoanError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A monetary value in the loan's currency.
///
/// Thin wrapper around `rust_decimal::Decimal` so amounts and rates cannot be
/// mixed up in the schedule arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

/// Rounding applied to every amount the engine produces.
///
/// Amounts are rounded half-to-even ("banker's rounding") to `scale` decimal
/// places, i.e. to the currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingPolicy {
    scale: u32,
}

impl RoundingPolicy {
    pub const MAX_SCALE: u32 = 6;

    pub fn new(scale: u32) -> Result<Self> {
        if scale > Self::MAX_SCALE {
            return Err(LoanError::invalid(
                "scale",
                format!("must be at most {}", Self::MAX_SCALE),
            ));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Rounds `value` to the minor unit and pads it to exactly `scale` places.
    pub fn round(&self, value: Decimal) -> Money {
        let mut rounded =
            value.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(self.scale);
        Money(rounded)
    }

    /// True when `value` has no digits below the minor unit.
    pub fn is_representable(&self, value: Decimal) -> bool {
        value.round_dp(self.scale) == value
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self { scale: 2 }
    }
}
