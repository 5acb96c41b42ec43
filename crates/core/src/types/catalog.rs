//! Catalog records as supplied by the external catalog store.
//!
//! The catalog store is loosely structured: prices may be numbers or strings
//! (`"2.50/ft"`), keys arrive in inconsistent casing, and `wholesale` is
//! frequently absent. Deserialization here is deliberately tolerant - a
//! malformed price field degrades to `None` with a warning instead of
//! rejecting the record (the price resolver has a fallback chain for exactly
//! this reason).

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::money::{self, Money};
use super::price_tag::{self, PriceTag};
use super::sku::Sku;

/// A purchasable variation of a catalog entry (size, color, length...).
///
/// Option labels are free text entered by merchandisers: they are not unique,
/// not normalized, and often concatenate several choices into one string.
/// Matching against them lives in the price resolver and tolerates partial
/// matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    /// Option label, matched case-insensitively.
    #[serde(alias = "option", alias = "name", alias = "size")]
    pub label: String,
    /// Retail (MAP) unit price.
    #[serde(
        default,
        alias = "map",
        alias = "MAP",
        deserialize_with = "price_tag::de_option_tolerant"
    )]
    pub price: Option<PriceTag>,
    /// Wholesale unit cost.
    #[serde(
        default,
        alias = "Wholesale",
        deserialize_with = "price_tag::de_option_tolerant"
    )]
    pub wholesale: Option<PriceTag>,
    /// Per-item shipping dollar override.
    #[serde(
        default,
        alias = "dsr",
        alias = "DSR",
        deserialize_with = "de_option_dollars"
    )]
    pub shipping: Option<Money>,
    /// Unit weight in pounds, when the merchandiser recorded one.
    #[serde(default)]
    pub weight: Option<Decimal>,
    /// Image reference for the storefront UI.
    #[serde(default)]
    pub image: Option<String>,
}

/// A catalog entry.
///
/// When `variations` is non-empty the flat price fields here are advisory
/// only; per-variation prices take precedence in the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog identifier.
    #[serde(alias = "id")]
    pub sku: Sku,
    /// Display name.
    #[serde(alias = "title")]
    pub name: String,
    /// Merchandising category.
    #[serde(default)]
    pub category: Option<String>,
    /// Flat retail (MAP) price.
    #[serde(
        default,
        alias = "map",
        alias = "MAP",
        alias = "price",
        deserialize_with = "price_tag::de_option_tolerant"
    )]
    pub map_price: Option<PriceTag>,
    /// Flat wholesale cost.
    #[serde(
        default,
        alias = "Wholesale",
        deserialize_with = "price_tag::de_option_tolerant"
    )]
    pub wholesale: Option<PriceTag>,
    /// Per-item shipping dollar override (the catalog's `dsr` field).
    #[serde(
        default,
        alias = "dsr",
        alias = "DSR",
        deserialize_with = "de_option_dollars"
    )]
    pub shipping: Option<Money>,
    /// Explicit free-shipping flag.
    ///
    /// Populated by a one-time migration from the old name-pattern override
    /// list. Checkout waives shipping only when this is set; a zero shipping
    /// override does not.
    #[serde(default)]
    pub free_shipping: bool,
    /// Unit weight in pounds.
    #[serde(default)]
    pub weight: Option<Decimal>,
    /// Purchasable variations, in merchandiser order.
    #[serde(default, alias = "options")]
    pub variations: Vec<Variation>,
}

impl CatalogEntry {
    /// Whether this entry carries per-variation pricing.
    #[must_use]
    pub fn has_variations(&self) -> bool {
        !self.variations.is_empty()
    }
}

/// Loose representation accepted for dollar fields (`dsr`).
#[derive(Deserialize)]
#[serde(untagged)]
enum DollarsRepr {
    Number(Decimal),
    Text(String),
}

fn de_option_dollars<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<DollarsRepr>::deserialize(deserializer)?;
    Ok(raw.and_then(|repr| match repr {
        DollarsRepr::Number(amount) => Some(Money::from_dollars(amount)),
        DollarsRepr::Text(text) => match money::parse_dollars(&text) {
            Ok(amount) => Some(amount),
            Err(err) => {
                tracing::warn!(%err, "dropping unparseable shipping override");
                None
            }
        },
    }))
}
