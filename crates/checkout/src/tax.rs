//! Sales tax by shipping-address state.
//!
//! One flat rate per jurisdiction where the merchant has nexus, zero
//! everywhere else. Address forms deliver anything from `FL` to
//! `" florida "`; normalization maps full state names to two-letter codes
//! before lookup.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Full-name to two-letter-code table, lowercase keys.
const STATE_NAMES: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("district of columbia", "DC"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

/// Normalize a state field to its two-letter code.
///
/// Two-letter inputs are uppercased and accepted as-is; full names are
/// looked up case-insensitively. Anything unrecognized returns `None` (and
/// therefore taxes at zero).
#[must_use]
pub fn normalize_state(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(trimmed.to_ascii_uppercase());
    }
    let lower = trimmed.to_ascii_lowercase();
    STATE_NAMES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, code)| (*code).to_owned())
}

/// Flat tax rates keyed by two-letter state code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxTable {
    rates: HashMap<String, Decimal>,
}

impl TaxTable {
    /// An empty table: every state taxes at zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Build from explicit `(code, rate)` pairs.
    #[must_use]
    pub fn from_rates(rates: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
                .collect(),
        }
    }

    /// The rate for a raw state field, zero for anything not in the table.
    #[must_use]
    pub fn rate_for(&self, raw_state: &str) -> Decimal {
        normalize_state(raw_state)
            .and_then(|code| self.rates.get(&code).copied())
            .unwrap_or(Decimal::ZERO)
    }
}

impl Default for TaxTable {
    /// The merchant's single nexus jurisdiction: Florida at 7%.
    fn default() -> Self {
        Self::from_rates([("FL".to_owned(), Decimal::new(7, 2))])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_codes_and_names() {
        assert_eq!(normalize_state("FL").as_deref(), Some("FL"));
        assert_eq!(normalize_state(" fl ").as_deref(), Some("FL"));
        assert_eq!(normalize_state("Florida").as_deref(), Some("FL"));
        assert_eq!(normalize_state("new hampshire").as_deref(), Some("NH"));
        assert_eq!(normalize_state("Puerto Vallarta"), None);
    }

    #[test]
    fn test_rate_zero_for_unlisted_state() {
        let table = TaxTable::default();
        assert_eq!(table.rate_for("GA"), Decimal::ZERO);
        assert_eq!(table.rate_for("nowhere"), Decimal::ZERO);
    }

    #[test]
    fn test_rate_for_full_name() {
        let table = TaxTable::default();
        assert_eq!(table.rate_for("Florida"), Decimal::new(7, 2));
        assert_eq!(table.rate_for("FL"), Decimal::new(7, 2));
    }
}
