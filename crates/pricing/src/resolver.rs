//! Variation price resolution.
//!
//! Storefront UIs concatenate sizes and colors into one free-text option
//! field, merchandisers relabel variations without normalizing, and wholesale
//! numbers are entered sporadically. Resolution is therefore an ordered
//! fallback chain, not a single lookup:
//!
//! 1. exact case-insensitive label match
//! 2. case-insensitive contains match, either direction
//! 3. the only variation, when exactly one exists
//! 4. a variation literally labeled `Standard`
//! 5. the first variation in list order
//! 6. the entry's own flat price
//! 7. a caller-supplied fallback price (retail only; logged as a
//!    data-quality warning)
//!
//! The chain is an explicit list of matcher functions ([`VARIATION_CHAIN`])
//! so the order itself is testable and reorderable. Every result is tagged
//! with the [`MatchSource`] that produced it.
//!
//! Wholesale resolution follows the identical chain but terminates in
//! [`Wholesale::Unknown`] rather than a defaulted zero - downstream margin
//! reports must see partial data as partial, not as free inventory.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use tidewater_core::types::{CatalogEntry, Money, PriceUnit, Sku, Variation};

/// How the requested quantity is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityUnit {
    /// Whole items.
    #[default]
    Each,
    /// Linear feet; the unit price is multiplied by the foot count parsed
    /// from the option string.
    PerFoot,
}

/// Which rule in the fallback chain produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Exact case-insensitive label match.
    ExactLabel,
    /// Substring match between request and label, either direction.
    LabelContains,
    /// The entry has exactly one variation.
    OnlyVariation,
    /// A variation labeled `Standard`.
    StandardLabel,
    /// First variation in list order.
    FirstVariation,
    /// The entry's top-level flat price.
    EntryPrice,
    /// The caller-supplied fallback price.
    CallerFallback,
}

/// A resolved retail price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPrice {
    /// Effective unit price (per-foot rates already multiplied out).
    pub unit_price: Money,
    /// Unit weight in pounds, when the catalog records one.
    pub weight: Option<Decimal>,
    /// Shipping override carried by the matched variation or entry.
    pub shipping: Option<Money>,
    /// The chain rule that won.
    pub source: MatchSource,
    /// Label of the matched variation, when one matched.
    pub matched_label: Option<String>,
}

/// A resolved wholesale cost.
///
/// Unknown is a first-class state: it propagates into payout reports as a
/// partial-data annotation instead of silently understating cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Wholesale {
    /// Wholesale cost resolved through the chain.
    Known {
        /// Effective unit cost (per-foot rates already multiplied out).
        unit_cost: Money,
        /// The chain rule that won.
        source: MatchSource,
    },
    /// No wholesale figure anywhere in the chain.
    Unknown,
}

impl Wholesale {
    /// The unit cost, when known.
    #[must_use]
    pub const fn known(&self) -> Option<Money> {
        match self {
            Self::Known { unit_cost, .. } => Some(*unit_cost),
            Self::Unknown => None,
        }
    }
}

/// No price anywhere in the chain, including the caller fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no price could be resolved for {sku}")]
pub struct ResolveError {
    /// The entry that could not be priced.
    pub sku: Sku,
}

/// A variation-selection rule: given the variations and the requested option
/// string, optionally pick an index.
type Strategy = fn(&[Variation], &str) -> Option<usize>;

/// The ordered fallback chain, steps 1-5. Steps 6 (entry price) and 7
/// (caller fallback) operate on the entry rather than a variation and live
/// in the resolve functions.
pub const VARIATION_CHAIN: &[(MatchSource, Strategy)] = &[
    (MatchSource::ExactLabel, |variations, requested| {
        let requested = requested.trim();
        if requested.is_empty() {
            return None;
        }
        variations
            .iter()
            .position(|v| v.label.trim().eq_ignore_ascii_case(requested))
    }),
    (MatchSource::LabelContains, |variations, requested| {
        let requested = requested.trim().to_ascii_lowercase();
        if requested.is_empty() {
            return None;
        }
        variations.iter().position(|v| {
            let label = v.label.trim().to_ascii_lowercase();
            !label.is_empty() && (label.contains(&requested) || requested.contains(&label))
        })
    }),
    (MatchSource::OnlyVariation, |variations, _| {
        (variations.len() == 1).then_some(0)
    }),
    (MatchSource::StandardLabel, |variations, _| {
        variations
            .iter()
            .position(|v| v.label.trim().eq_ignore_ascii_case("Standard"))
    }),
    (MatchSource::FirstVariation, |variations, _| {
        (!variations.is_empty()).then_some(0)
    }),
];

/// Run the chain, keeping only matches for which `priced` holds (a matched
/// variation without the field being resolved is skipped so later rules can
/// still find one that has it).
fn select_variation<'a>(
    variations: &'a [Variation],
    requested: &str,
    priced: impl Fn(&Variation) -> bool,
) -> Option<(&'a Variation, MatchSource)> {
    VARIATION_CHAIN.iter().find_map(|(source, strategy)| {
        strategy(variations, requested)
            .and_then(|idx| variations.get(idx))
            .filter(|variation| priced(variation))
            .map(|variation| (variation, *source))
    })
}

static FOOT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    // The pattern is a literal; the tests exercise it.
    #[allow(clippy::unwrap_used)]
    let pattern = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:'|ft\b|foot\b|feet\b)").unwrap();
    pattern
});

/// Extract a linear foot count from an option string.
///
/// Recognizes forms like `By the Foot: 8'`, `8 ft`, `8.5 feet`.
#[must_use]
pub fn foot_count(option: &str) -> Option<Decimal> {
    FOOT_COUNT
        .captures(option)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// The per-foot multiplier for a resolved price, defaulting to 1 when no
/// foot count can be parsed.
fn foot_multiplier(requested: &str, sku: &Sku) -> Decimal {
    foot_count(requested).unwrap_or_else(|| {
        warn!(%sku, option = requested, "no foot count in by-the-foot option, using 1");
        Decimal::ONE
    })
}

fn effective_price(
    amount: Decimal,
    tag_unit: PriceUnit,
    unit: QuantityUnit,
    requested: &str,
    sku: &Sku,
) -> Money {
    let by_the_foot = unit == QuantityUnit::PerFoot || tag_unit == PriceUnit::PerFoot;
    if by_the_foot {
        Money::from_dollars(amount * foot_multiplier(requested, sku))
    } else {
        Money::from_dollars(amount)
    }
}

/// Resolve the retail unit price for `requested` against `entry`.
///
/// `fallback` is the client-echoed price (step 7); resolving through it is
/// logged as a data-quality warning because it means the catalog had no
/// usable price at all.
///
/// # Errors
///
/// Returns [`ResolveError`] only when every step of the chain, including the
/// fallback, comes up empty.
pub fn resolve_retail(
    entry: &CatalogEntry,
    requested: &str,
    unit: QuantityUnit,
    fallback: Option<Money>,
) -> Result<ResolvedPrice, ResolveError> {
    // Steps 1-5: variation with a retail price.
    if let Some((variation, source)) =
        select_variation(&entry.variations, requested, |v| v.price.is_some())
        && let Some(tag) = variation.price
    {
        return Ok(ResolvedPrice {
            unit_price: effective_price(tag.amount, tag.unit, unit, requested, &entry.sku),
            weight: variation.weight.or(entry.weight),
            shipping: variation.shipping.or(entry.shipping),
            source,
            matched_label: Some(variation.label.clone()),
        });
    }

    // Step 6: the entry's own flat price.
    if let Some(tag) = entry.map_price {
        return Ok(ResolvedPrice {
            unit_price: effective_price(tag.amount, tag.unit, unit, requested, &entry.sku),
            weight: entry.weight,
            shipping: entry.shipping,
            source: MatchSource::EntryPrice,
            matched_label: None,
        });
    }

    // Step 7: whatever the client echoed back.
    if let Some(price) = fallback {
        warn!(
            sku = %entry.sku,
            option = requested,
            "catalog has no price, falling back to client-declared unit price"
        );
        let unit_price = if unit == QuantityUnit::PerFoot {
            price.scale(foot_multiplier(requested, &entry.sku))
        } else {
            price
        };
        return Ok(ResolvedPrice {
            unit_price,
            weight: entry.weight,
            shipping: entry.shipping,
            source: MatchSource::CallerFallback,
            matched_label: None,
        });
    }

    Err(ResolveError {
        sku: entry.sku.clone(),
    })
}

/// Resolve the wholesale unit cost for `requested` against `entry`.
///
/// Identical chain to [`resolve_retail`], minus the caller fallback: a chain
/// that comes up empty yields [`Wholesale::Unknown`], never zero.
#[must_use]
pub fn resolve_wholesale(entry: &CatalogEntry, requested: &str, unit: QuantityUnit) -> Wholesale {
    if let Some((variation, source)) =
        select_variation(&entry.variations, requested, |v| v.wholesale.is_some())
        && let Some(tag) = variation.wholesale
    {
        return Wholesale::Known {
            unit_cost: effective_price(tag.amount, tag.unit, unit, requested, &entry.sku),
            source,
        };
    }

    if let Some(tag) = entry.wholesale {
        return Wholesale::Known {
            unit_cost: effective_price(tag.amount, tag.unit, unit, requested, &entry.sku),
            source: MatchSource::EntryPrice,
        };
    }

    Wholesale::Unknown
}
