//! Monetary amounts in integer minor units.
//!
//! All pricing arithmetic that produces a customer-facing or report-facing
//! figure ends in a [`Money`] value: signed cents internally, decimal dollars
//! at the serialization boundary. Intermediate rate math (area x rate, linear
//! footage x rate) stays in [`Decimal`] and is rounded exactly once.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A monetary amount stored as signed cents.
///
/// Negative values are representable on purpose: a reconciled payout can go
/// negative when costs exceed the gross charge. Call sites that must stay
/// non-negative (order totals, discounts) use [`Money::clamp_non_negative`].
///
/// Serialization exposes decimal dollars (`"12.30"`); deserialization accepts
/// decimal dollars as a JSON number or string, with an optional `$` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(0);

    /// Create a `Money` from a cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The underlying cent count.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Convert a decimal dollar amount, rounding half-away-from-zero to the
    /// nearest cent. Amounts beyond the representable range saturate.
    #[must_use]
    pub fn from_dollars(dollars: Decimal) -> Self {
        let cents = (dollars * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(cents.to_i64().unwrap_or(if cents.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// The amount as decimal dollars (always two fractional digits).
    #[must_use]
    pub fn to_dollars(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Scale by a decimal factor, rounding the result to the nearest cent.
    ///
    /// Used for percentage math (discounts, tax, platform fees) so that the
    /// rounding discipline lives in one place.
    #[must_use]
    pub fn scale(self, factor: Decimal) -> Self {
        Self::from_dollars(self.to_dollars() * factor)
    }

    /// Round to the nearest multiple of `step`.
    ///
    /// Marketing estimates round to the nearest $50; `step` is expressed as
    /// `Money` so the constant stays in configuration, not the formula.
    #[must_use]
    pub fn round_to_step(self, step: Self) -> Self {
        if step.0 <= 0 {
            return self;
        }
        let halves = Decimal::from(self.0) / Decimal::from(step.0);
        let rounded = halves.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(rounded.to_i64().unwrap_or(0).saturating_mul(step.0))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", Self(self.0.saturating_neg()).to_dollars())
        } else {
            write!(f, "${}", self.to_dollars())
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.to_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DollarsVisitor)
    }
}

struct DollarsVisitor;

impl Visitor<'_> for DollarsVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a dollar amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from_dollars(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money::from_dollars(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        let dollars = Decimal::from_f64(v)
            .ok_or_else(|| E::custom(format!("dollar amount {v} is not representable")))?;
        Ok(Money::from_dollars(dollars))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        parse_dollars(v).map_err(E::custom)
    }
}

/// Parse a dollar string such as `"12.30"`, `"$1,250"`, or `"-4.10"`.
///
/// # Errors
///
/// Returns a message describing the unparseable input.
pub fn parse_dollars(input: &str) -> Result<Money, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<Decimal>()
        .map(Money::from_dollars)
        .map_err(|_| format!("invalid dollar amount: {input:?}"))
}
