//! Tidewater Core - Shared types library.
//!
//! This crate provides the domain types used across all Tidewater Netting
//! components:
//!
//! - `pricing` - Rate loading, variation price resolution, dimensional quotes
//! - `checkout` - Cart totals (subtotal, shipping, discount, tax)
//! - `settlement` - Post-payment payout reconciliation
//! - `cli` - Operational command-line tools
//!
//! # Architecture
//!
//! The core crate contains only types and store traits - no I/O, no file
//! access, no HTTP clients. Store traits describe the external collaborators
//! (catalog store, order store, coupon store, payment gateway); concrete
//! adapters live with the callers that own the I/O.
//!
//! # Modules
//!
//! - [`types`] - Money, catalog entries, cart/order types, coupons
//! - [`stores`] - Async traits for the external record stores and the gateway

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stores;
pub mod types;

pub use stores::*;
pub use types::*;
