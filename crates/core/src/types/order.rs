//! Cart, order, and totals types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use super::sku::Sku;

/// Order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

/// One line of a cart, as confirmed at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Catalog id of the purchased entry.
    pub sku: Sku,
    /// Unit count, at least 1.
    pub quantity: u32,
    /// Chosen option/size string, often free text concatenated by the UI.
    #[serde(default, alias = "size")]
    pub option: String,
    /// Unit price the client echoed back. Last-resort fallback only; using
    /// it is logged as a data-quality warning.
    #[serde(default)]
    pub declared_unit_price: Option<Money>,
    /// Per-item shipping override supplied with the line.
    #[serde(default)]
    pub shipping_override: Option<Money>,
    /// Per-item weight override in pounds.
    #[serde(default)]
    pub weight: Option<Decimal>,
}

/// Destination address; only `state` participates in pricing (tax lookup).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    #[serde(default)]
    pub name: Option<String>,
    /// Street line.
    #[serde(default)]
    pub street: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State, as a two-letter code or full name; normalized at tax lookup.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
}

/// The authoritative totals for an order.
///
/// Invariant: `total = subtotal + shipping - discount + tax`, clamped to
/// zero. Construct via [`OrderTotals::assemble`] to keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of resolved unit prices times quantities.
    pub subtotal: Money,
    /// Per-item shipping, summed.
    pub shipping: Money,
    /// Coupon discount applied.
    pub discount: Money,
    /// Tax on the post-discount base.
    pub tax: Money,
    /// Amount charged to the payment gateway.
    pub total: Money,
}

impl OrderTotals {
    /// Assemble totals from the pipeline's components, enforcing the total
    /// identity and the non-negative clamp.
    #[must_use]
    pub fn assemble(subtotal: Money, shipping: Money, discount: Money, tax: Money) -> Self {
        let total = (subtotal + shipping - discount + tax).clamp_non_negative();
        Self {
            subtotal,
            shipping,
            discount,
            tax,
            total,
        }
    }

    /// Whether the stored fields still satisfy the total identity.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.subtotal + self.shipping - self.discount + self.tax).clamp_non_negative()
            == self.total
    }
}

/// A confirmed order, as read back from the order store for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Placement timestamp (UTC).
    pub placed_at: DateTime<Utc>,
    /// Customer email, when captured.
    #[serde(default)]
    pub email: Option<String>,
    /// Shipping destination.
    #[serde(default)]
    pub address: Option<ShippingAddress>,
    /// Confirmed line items.
    pub lines: Vec<CartLineItem>,
    /// Totals as charged.
    pub totals: OrderTotals,
    /// Gateway charge reference, when payment succeeded.
    #[serde(default)]
    pub charge_id: Option<String>,
    /// Whether payment completed.
    #[serde(default)]
    pub paid: bool,
}

/// The payment gateway's figures for one charge, consumed opaquely.
///
/// This engine never recomputes gateway fee logic; these numbers are inputs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChargeRecord {
    /// Gross amount the gateway reports having captured.
    #[serde(default)]
    pub gross: Option<Money>,
    /// Processing fee the gateway reports having taken.
    #[serde(default)]
    pub fee: Money,
    /// Net the gateway reports paying out.
    #[serde(default)]
    pub net: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_identity() {
        let totals = OrderTotals::assemble(
            Money::from_cents(2000),
            Money::from_cents(10000),
            Money::from_cents(1200),
            Money::from_cents(756),
        );
        assert_eq!(totals.total, Money::from_cents(11556));
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_totals_clamped_at_zero() {
        // A fixed coupon larger than the order never drives the total negative.
        let totals = OrderTotals::assemble(
            Money::from_cents(500),
            Money::ZERO,
            Money::from_cents(10_000),
            Money::ZERO,
        );
        assert_eq!(totals.total, Money::ZERO);
        assert!(totals.is_consistent());
    }
}
