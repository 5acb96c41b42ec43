//! Tidewater Pricing - catalog-derived pricing for custom netting.
//!
//! Three pieces, leaf-first:
//!
//! - [`rates`] - parses the two tabular rate sources (netting material rates
//!   and weights, border cost multipliers) into a typed [`rates::RateTable`],
//!   cached behind an explicit snapshot keyed on source freshness.
//! - [`resolver`] - turns a catalog entry plus a requested option string into
//!   a unit price and weight via an ordered fallback chain; wholesale
//!   resolution may end in an explicit unknown, never a silent zero.
//! - [`dimensions`] - converts panel and cage dimensions into marketing
//!   estimate ranges and exact commerce totals.
//!
//! [`catalog_cache`] additionally provides the time-boxed read-through cache
//! this crate holds over the external catalog store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog_cache;
pub mod dimensions;
pub mod rates;
pub mod resolver;

pub use catalog_cache::CachedCatalog;
pub use dimensions::{
    Coverage, EstimateRange, ExactQuote, PricingConfig, PricingError, PricingRequest, Shape,
    estimate, price_exact,
};
pub use rates::{BorderOption, NetMaterialRate, RateError, RateLoader, RateTable};
pub use resolver::{
    MatchSource, QuantityUnit, ResolveError, ResolvedPrice, Wholesale, foot_count, resolve_retail,
    resolve_wholesale,
};
