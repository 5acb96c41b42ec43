//! Async traits for the external collaborators.
//!
//! Persistence, the admin UI, and the payment gateway's own ledger all live
//! outside this engine. These traits are the seams: the engine reads catalog
//! entries, confirmed orders, coupons, and gateway charge figures through
//! them, and writes nothing except the coupon usage counter.
//!
//! Every method is a suspension point; the computation between calls is pure
//! and synchronous.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{CatalogEntry, ChargeRecord, Coupon, Order, Sku};

/// Error from a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or read.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A record was present but could not be decoded.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Error from the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached.
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),
}

/// Read-only access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch one entry by SKU. `Ok(None)` means the SKU is unknown.
    async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError>;
}

/// Read-only access to confirmed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Paid orders placed in `[start, end)`, at most `limit` of them.
    ///
    /// Implementations must return no more than `limit` records; the caller
    /// treats a full batch as a signal that the window exceeded its bound.
    async fn paid_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Order>, StoreError>;
}

/// Coupon lookup and the single post-payment counter increment.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Find a coupon by code (case-insensitive).
    async fn find(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    /// Increment the usage counter after a successful payment.
    ///
    /// Called exactly once per payment; the engine performs no other coupon
    /// mutation.
    async fn record_use(&self, code: &str) -> Result<(), StoreError>;
}

/// Opaque view of the payment gateway's ledger for one charge.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// The gateway's reported figures for `charge_id`, if it knows the charge.
    async fn charge(&self, charge_id: &str) -> Result<Option<ChargeRecord>, GatewayError>;
}
