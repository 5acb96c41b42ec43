//! Core types for Tidewater Netting.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the pricing, checkout, and settlement engines.

pub mod catalog;
pub mod coupon;
pub mod money;
pub mod order;
pub mod price_tag;
pub mod sku;

pub use catalog::{CatalogEntry, Variation};
pub use coupon::{Coupon, DiscountKind};
pub use money::Money;
pub use order::{
    CartLineItem, ChargeRecord, Order, OrderId, OrderTotals, ShippingAddress,
};
pub use price_tag::{PriceTag, PriceTagError, PriceUnit};
pub use sku::Sku;
