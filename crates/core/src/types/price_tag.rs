//! Typed unit prices parsed from loosely formatted catalog fields.
//!
//! The catalog store encodes some prices as strings (`"2.50/ft"`, `"$12"`).
//! Those are parsed exactly once, at the catalog-load boundary, into a
//! [`PriceTag`] carrying the amount and its quantity unit. Nothing downstream
//! re-parses price strings.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::money::Money;

/// How a unit price is quantified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    /// Price per item.
    #[default]
    Each,
    /// Price per linear foot; the effective unit price is the per-foot rate
    /// times the foot count parsed from the chosen option string.
    PerFoot,
}

/// A unit price with its quantity unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceTag {
    /// Price amount in decimal dollars.
    pub amount: Decimal,
    /// Quantity unit the amount applies to.
    pub unit: PriceUnit,
}

/// Error parsing a price string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid price: {input:?}")]
pub struct PriceTagError {
    /// The offending input.
    pub input: String,
}

impl PriceTag {
    /// A per-item price.
    #[must_use]
    pub const fn each(amount: Decimal) -> Self {
        Self {
            amount,
            unit: PriceUnit::Each,
        }
    }

    /// A per-linear-foot price.
    #[must_use]
    pub const fn per_foot(amount: Decimal) -> Self {
        Self {
            amount,
            unit: PriceUnit::PerFoot,
        }
    }

    /// The amount rounded to cents.
    #[must_use]
    pub fn unit_money(&self) -> Money {
        Money::from_dollars(self.amount)
    }

    /// Parse a catalog price string.
    ///
    /// Accepted forms: `"2.50"`, `"$2.50"`, `"$1,250"`, `"2.50/ft"`,
    /// `"2.50/foot"`, `"2.50 per ft"`, `"2.50 per foot"`. Matching is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`PriceTagError`] if no decimal amount can be extracted.
    pub fn parse(input: &str) -> Result<Self, PriceTagError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        let (numeric, unit) = ["/ft.", "/ft", "/foot", "per ft", "per foot"]
            .iter()
            .find_map(|suffix| {
                lower
                    .strip_suffix(suffix)
                    .map(|rest| (rest.to_owned(), PriceUnit::PerFoot))
            })
            .unwrap_or_else(|| (lower.clone(), PriceUnit::Each));

        let cleaned: String = numeric
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        cleaned
            .trim()
            .parse::<Decimal>()
            .map(|amount| Self { amount, unit })
            .map_err(|_| PriceTagError {
                input: input.to_owned(),
            })
    }
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            PriceUnit::Each => write!(f, "${}", self.amount),
            PriceUnit::PerFoot => write!(f, "${}/ft", self.amount),
        }
    }
}

/// Loose representation accepted for catalog price fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Number(Decimal),
    Text(String),
}

impl TagRepr {
    fn into_tag(self) -> Option<PriceTag> {
        match self {
            Self::Number(amount) => Some(PriceTag::each(amount)),
            Self::Text(text) => match PriceTag::parse(&text) {
                Ok(tag) => Some(tag),
                Err(err) => {
                    // Data quality: a single bad price field must not sink the
                    // whole record; the resolver falls through its chain.
                    tracing::warn!(input = %err.input, "dropping unparseable catalog price");
                    None
                }
            },
        }
    }
}

/// Tolerant deserializer for optional catalog price fields.
///
/// Accepts a number, a string in any [`PriceTag::parse`] form, or null.
/// Unparseable strings become `None` with a warning instead of failing the
/// record.
///
/// # Errors
///
/// Only fails on structurally invalid input (e.g. an object where a scalar
/// was expected).
pub fn de_option_tolerant<'de, D>(deserializer: D) -> Result<Option<PriceTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TagRepr>::deserialize(deserializer)?;
    Ok(raw.and_then(TagRepr::into_tag))
}
