//! Coupon validation and discount math.
//!
//! Validation rejects with a specific reason the storefront can surface
//! verbatim; the pricing here never mutates the coupon (the single usage
//! increment happens through the coupon store after payment succeeds).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use tidewater_core::types::{Coupon, DiscountKind, Money};

/// Why a coupon cannot be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon with that code.
    #[error("coupon code not recognized")]
    NotFound,
    /// Past its expiry.
    #[error("coupon has expired")]
    Expired,
    /// Redeemed up to its cap already.
    #[error("coupon has reached its usage limit")]
    UsageCapReached,
    /// Restricted to other customers.
    #[error("coupon is not valid for this customer")]
    NotEligible,
}

/// Validate a coupon for this checkout.
///
/// # Errors
///
/// Returns the first failing check: expiry, usage cap, then customer
/// restriction.
pub fn validate(
    coupon: &Coupon,
    now: DateTime<Utc>,
    customer_email: Option<&str>,
) -> Result<(), CouponError> {
    if coupon.is_expired(now) {
        return Err(CouponError::Expired);
    }
    if coupon.is_exhausted() {
        return Err(CouponError::UsageCapReached);
    }
    if !coupon.allows(customer_email) {
        return Err(CouponError::NotEligible);
    }
    Ok(())
}

/// The discount a coupon takes off `base` (subtotal plus shipping).
///
/// Percent coupons take `base * value / 100`; fixed coupons take a flat
/// amount. The result never exceeds `base` and never goes negative, so the
/// discounted amount is floored at zero.
#[must_use]
pub fn discount_amount(coupon: &Coupon, base: Money) -> Money {
    let raw = match coupon.kind {
        DiscountKind::Percent => base.scale(coupon.value / Decimal::ONE_HUNDRED),
        DiscountKind::Fixed => Money::from_dollars(coupon.value),
    };
    raw.clamp_non_negative().min(base)
}
