//! Integration tests for Tidewater Netting.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tidewater-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pricing_flow` - Rate sources through the loader into dimensional quotes
//! - `checkout_flow` - Cart totals end to end over in-memory stores
//! - `payout_flow` - Checkout through reconciliation over in-memory stores
//!
//! This crate's library is the shared harness: in-memory implementations of
//! every store trait plus fixture builders. No network, no database; the
//! engine's collaborators are all behind traits, so the whole flow runs in
//! memory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use tidewater_core::stores::{
    CatalogStore, CouponStore, GatewayError, OrderStore, PaymentGateway, StoreError,
};
use tidewater_core::types::{
    CartLineItem, CatalogEntry, ChargeRecord, Coupon, Order, PriceTag, Sku,
};

/// In-memory catalog store.
#[derive(Default)]
pub struct MemoryCatalog {
    entries: HashMap<Sku, CatalogEntry>,
}

impl MemoryCatalog {
    /// Build from a list of entries.
    #[must_use]
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.sku.clone(), entry))
                .collect(),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError> {
        Ok(self.entries.get(sku).cloned())
    }
}

/// In-memory coupon store tracking usage increments.
#[derive(Default)]
pub struct MemoryCoupons {
    coupons: Mutex<HashMap<String, Coupon>>,
}

impl MemoryCoupons {
    /// Build from a list of coupons.
    #[must_use]
    pub fn with_coupons(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: Mutex::new(
                coupons
                    .into_iter()
                    .map(|coupon| (coupon.code.to_ascii_uppercase(), coupon))
                    .collect(),
            ),
        }
    }

    /// Current usage count for a code.
    #[must_use]
    pub fn used(&self, code: &str) -> u32 {
        let guard = match self.coupons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .get(&code.to_ascii_uppercase())
            .map_or(0, |coupon| coupon.used)
    }
}

#[async_trait]
impl CouponStore for MemoryCoupons {
    async fn find(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let guard = match self.coupons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.get(&code.to_ascii_uppercase()).cloned())
    }

    async fn record_use(&self, code: &str) -> Result<(), StoreError> {
        let mut guard = match self.coupons.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let coupon = guard
            .get_mut(&code.to_ascii_uppercase())
            .ok_or_else(|| StoreError::Malformed(format!("no coupon {code}")))?;
        coupon.used += 1;
        Ok(())
    }
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryOrders {
    orders: Vec<Order>,
}

impl MemoryOrders {
    /// Build from a list of orders.
    #[must_use]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.paid && o.placed_at >= start && o.placed_at < end)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory payment gateway keyed by charge id.
#[derive(Default)]
pub struct MemoryGateway {
    charges: HashMap<String, ChargeRecord>,
}

impl MemoryGateway {
    /// Build from `(charge_id, record)` pairs.
    #[must_use]
    pub fn with_charges(charges: Vec<(String, ChargeRecord)>) -> Self {
        Self {
            charges: charges.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MemoryGateway {
    async fn charge(&self, charge_id: &str) -> Result<Option<ChargeRecord>, GatewayError> {
        Ok(self.charges.get(charge_id).copied())
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

/// A flat-priced catalog entry.
#[must_use]
pub fn flat_entry(sku: &str, map: &str, wholesale: Option<&str>) -> CatalogEntry {
    CatalogEntry {
        sku: Sku::new(sku),
        name: sku.to_owned(),
        category: None,
        map_price: Some(PriceTag::each(dec(map))),
        wholesale: wholesale.map(|w| PriceTag::each(dec(w))),
        shipping: None,
        free_shipping: false,
        weight: None,
        variations: Vec::new(),
    }
}

/// A bare cart line.
#[must_use]
pub fn cart_line(sku: &str, quantity: u32, option: &str) -> CartLineItem {
    CartLineItem {
        sku: Sku::new(sku),
        quantity,
        option: option.to_owned(),
        declared_unit_price: None,
        shipping_override: None,
        weight: None,
    }
}

/// A fixed "now" for deterministic coupon validation.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Parse a decimal literal.
///
/// # Panics
///
/// Panics on an invalid literal; fixtures are hard-coded.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    #[allow(clippy::unwrap_used)]
    let value = s.parse().unwrap();
    value
}
