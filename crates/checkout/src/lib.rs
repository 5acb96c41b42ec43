//! Tidewater Checkout - the cart totals pipeline.
//!
//! Given confirmed line items, a shipping address, and an optional coupon
//! code, [`CheckoutPipeline::compute_totals`] produces the authoritative
//! [`tidewater_core::OrderTotals`] charged to the payment gateway:
//!
//! ```text
//! subtotal -> per-item shipping -> coupon discount -> tax -> total
//! ```
//!
//! Shipping is computed per item, never per order; tax is computed on the
//! post-discount base, never on the raw subtotal; the grand total is clamped
//! to zero. Charge creation uses the stable idempotency key from
//! [`idempotency`] so client retries cannot double-charge.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod coupon;
pub mod idempotency;
pub mod tax;
pub mod totals;

pub use coupon::CouponError;
pub use idempotency::charge_idempotency_key;
pub use tax::TaxTable;
pub use totals::{CheckoutConfig, CheckoutError, CheckoutPipeline};
