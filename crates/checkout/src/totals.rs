//! The checkout totals pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use tidewater_core::stores::{CatalogStore, CouponStore, StoreError};
use tidewater_core::types::{CartLineItem, Coupon, Money, OrderTotals, ShippingAddress};
use tidewater_pricing::resolver::{self, QuantityUnit};

use crate::coupon::{self, CouponError};
use crate::idempotency;
use crate::tax::TaxTable;

/// Business configuration for the totals pipeline.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Per-unit shipping charged when no positive override applies.
    pub default_shipping: Money,
    /// Flat tax rates by state.
    pub tax: TaxTable,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            default_shipping: Money::from_cents(100_00),
            tax: TaxTable::default(),
        }
    }
}

/// Failures that abort the totals computation.
///
/// Data-quality problems (an unpriceable line) do *not* abort; they
/// contribute zero and are logged. Only invalid coupons and unreachable
/// stores stop the pipeline.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The supplied coupon code failed validation.
    #[error("invalid coupon: {0}")]
    Coupon(#[from] CouponError),
    /// A backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes authoritative order totals from confirmed cart lines.
#[derive(Clone)]
pub struct CheckoutPipeline {
    catalog: Arc<dyn CatalogStore>,
    coupons: Arc<dyn CouponStore>,
    config: CheckoutConfig,
}

impl CheckoutPipeline {
    /// Create a pipeline over the given stores.
    ///
    /// Pass the catalog through
    /// [`tidewater_pricing::CachedCatalog`] in production so checkout bursts
    /// don't hammer the catalog store.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        coupons: Arc<dyn CouponStore>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            catalog,
            coupons,
            config,
        }
    }

    /// Compute subtotal, shipping, discount, tax, and total for a cart.
    ///
    /// - Subtotal: resolved unit price x quantity per line; an unresolvable
    ///   line contributes zero (logged) rather than aborting checkout.
    /// - Shipping: per item. A `free_shipping` catalog flag waives it
    ///   entirely; otherwise a *positive* override (line first, then matched
    ///   variation/entry) is charged per unit; absent or zero overrides fall
    ///   through to the default. Zero is not free - only the flag is.
    /// - Discount: the coupon is validated first and applied to
    ///   subtotal + shipping, floored at zero.
    /// - Tax: on `subtotal + shipping - discount`, never the pre-discount
    ///   base.
    /// - Total: `subtotal + shipping - discount + tax`, clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Coupon`] for an invalid coupon and
    /// [`CheckoutError::Store`] when a backing store fails outright.
    pub async fn compute_totals(
        &self,
        items: &[CartLineItem],
        address: &ShippingAddress,
        coupon_code: Option<&str>,
        customer_email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<OrderTotals, CheckoutError> {
        let mut subtotal = Money::ZERO;
        let mut shipping = Money::ZERO;

        for item in items {
            let quantity = item.quantity.max(1);
            let entry = self.catalog.entry(&item.sku).await?;

            let Some(entry) = entry else {
                warn!(sku = %item.sku, "cart line references unknown SKU, pricing at 0");
                shipping += self.item_shipping(item.shipping_override) * quantity;
                continue;
            };

            let resolved = resolver::resolve_retail(
                &entry,
                &item.option,
                QuantityUnit::Each,
                item.declared_unit_price,
            );

            let variation_shipping = match resolved {
                Ok(price) => {
                    subtotal += price.unit_price * quantity;
                    price.shipping
                }
                Err(err) => {
                    warn!(%err, option = %item.option, "unpriceable cart line contributes 0");
                    entry.shipping
                }
            };

            if entry.free_shipping {
                // Explicit flag only; a zero override never waives shipping.
                continue;
            }
            shipping +=
                self.item_shipping(item.shipping_override.or(variation_shipping)) * quantity;
        }

        let discount = match coupon_code {
            Some(code) => {
                let coupon = self.lookup_coupon(code).await?;
                coupon::validate(&coupon, now, customer_email)?;
                coupon::discount_amount(&coupon, subtotal + shipping)
            }
            None => Money::ZERO,
        };

        let tax_base = (subtotal + shipping - discount).clamp_non_negative();
        let tax = tax_base.scale(self.config.tax.rate_for(&address.state));

        Ok(OrderTotals::assemble(subtotal, shipping, discount, tax))
    }

    /// Per-unit shipping for one line: a positive override wins, anything
    /// else falls through to the configured default.
    fn item_shipping(&self, override_value: Option<Money>) -> Money {
        match override_value {
            Some(value) if value.is_positive() => value,
            _ => self.config.default_shipping,
        }
    }

    /// Record one redemption of `code` after a successful payment.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] if the coupon store rejects the
    /// increment.
    pub async fn consume_coupon(&self, code: &str) -> Result<(), CheckoutError> {
        self.coupons.record_use(code.trim()).await?;
        Ok(())
    }

    /// The stable idempotency key for charging this cart.
    #[must_use]
    pub fn idempotency_key(
        &self,
        items: &[CartLineItem],
        customer_email: Option<&str>,
    ) -> String {
        idempotency::charge_idempotency_key(items, customer_email)
    }

    async fn lookup_coupon(&self, code: &str) -> Result<Coupon, CheckoutError> {
        self.coupons
            .find(code.trim())
            .await?
            .ok_or(CheckoutError::Coupon(CouponError::NotFound))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use tidewater_core::types::{CatalogEntry, DiscountKind, PriceTag, Sku};

    struct MapCatalog(HashMap<Sku, CatalogEntry>);

    #[async_trait]
    impl CatalogStore for MapCatalog {
        async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError> {
            Ok(self.0.get(sku).cloned())
        }
    }

    struct MapCoupons(HashMap<String, Coupon>);

    #[async_trait]
    impl CouponStore for MapCoupons {
        async fn find(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
            Ok(self
                .0
                .values()
                .find(|c| c.code.eq_ignore_ascii_case(code))
                .cloned())
        }

        async fn record_use(&self, _code: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn entry(sku: &str, price: i64) -> CatalogEntry {
        CatalogEntry {
            sku: Sku::new(sku),
            name: sku.to_owned(),
            category: None,
            map_price: Some(PriceTag::each(Decimal::new(price, 2))),
            wholesale: None,
            shipping: None,
            free_shipping: false,
            weight: None,
            variations: Vec::new(),
        }
    }

    fn line(sku: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            sku: Sku::new(sku),
            quantity,
            option: String::new(),
            declared_unit_price: None,
            shipping_override: None,
            weight: None,
        }
    }

    fn pipeline(entries: Vec<CatalogEntry>, coupons: Vec<Coupon>) -> CheckoutPipeline {
        let catalog = MapCatalog(
            entries
                .into_iter()
                .map(|e| (e.sku.clone(), e))
                .collect(),
        );
        let coupons = MapCoupons(
            coupons
                .into_iter()
                .map(|c| (c.code.clone(), c))
                .collect(),
        );
        CheckoutPipeline::new(
            Arc::new(catalog),
            Arc::new(coupons),
            CheckoutConfig::default(),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
    }

    fn florida() -> ShippingAddress {
        ShippingAddress {
            state: "Florida".to_owned(),
            ..ShippingAddress::default()
        }
    }

    fn elsewhere() -> ShippingAddress {
        ShippingAddress {
            state: "MT".to_owned(),
            ..ShippingAddress::default()
        }
    }

    #[tokio::test]
    async fn test_free_ship_flag_vs_zero_override() {
        let mut bulky = entry("CART-1", 450_00);
        bulky.free_shipping = true;

        // Zero override, no flag: still charged the default.
        let mut zero_override = entry("NET-1", 20_00);
        zero_override.shipping = Some(Money::ZERO);

        let pipeline = pipeline(vec![bulky, zero_override], Vec::new());
        let totals = pipeline
            .compute_totals(
                &[line("CART-1", 2), line("NET-1", 1)],
                &elsewhere(),
                None,
                None,
                now(),
            )
            .await
            .unwrap();

        // Free-ship SKU ships at exactly 0 for both units; the zero-override
        // SKU falls through to $100/unit.
        assert_eq!(totals.shipping, Money::from_cents(100_00));
        assert_eq!(totals.subtotal, Money::from_cents(920_00));
    }

    #[tokio::test]
    async fn test_positive_override_charged_per_unit() {
        let mut net = entry("NET-2", 35_00);
        net.shipping = Some(Money::from_cents(14_00));

        let pipeline = pipeline(vec![net], Vec::new());
        let totals = pipeline
            .compute_totals(&[line("NET-2", 3)], &elsewhere(), None, None, now())
            .await
            .unwrap();

        assert_eq!(totals.shipping, Money::from_cents(42_00));
    }

    #[tokio::test]
    async fn test_unknown_sku_contributes_zero_subtotal() {
        let pipeline = pipeline(vec![entry("KNOWN", 20_00)], Vec::new());
        let totals = pipeline
            .compute_totals(
                &[line("KNOWN", 1), line("GHOST", 1)],
                &elsewhere(),
                None,
                None,
                now(),
            )
            .await
            .unwrap();

        assert_eq!(totals.subtotal, Money::from_cents(20_00));
        // The ghost line still ships at the default; the order will contain
        // whatever the merchant reconciles it to.
        assert_eq!(totals.shipping, Money::from_cents(200_00));
    }

    #[tokio::test]
    async fn test_coupon_applies_before_tax() {
        let coupon = Coupon {
            code: "SAVE10".to_owned(),
            kind: DiscountKind::Percent,
            value: Decimal::from(10),
            expires_at: None,
            usage_cap: None,
            used: 0,
            allowed_emails: Vec::new(),
        };
        let pipeline = pipeline(vec![entry("NET-3", 20_00)], vec![coupon]);

        // subtotal 20 + shipping 100 = 120; 10% -> discount 12; tax 7% of 108.
        let totals = pipeline
            .compute_totals(&[line("NET-3", 1)], &florida(), Some("save10"), None, now())
            .await
            .unwrap();

        assert_eq!(totals.discount, Money::from_cents(12_00));
        assert_eq!(totals.tax, Money::from_cents(7_56));
        assert_eq!(totals.total, Money::from_cents(115_56));
    }

    #[tokio::test]
    async fn test_tax_zero_for_unlisted_state() {
        let pipeline = pipeline(vec![entry("NET-3", 20_00)], Vec::new());
        let totals = pipeline
            .compute_totals(&[line("NET-3", 1)], &elsewhere(), None, None, now())
            .await
            .unwrap();
        assert_eq!(totals.tax, Money::ZERO);
    }

    #[tokio::test]
    async fn test_invalid_coupon_aborts_with_reason() {
        let pipeline = pipeline(vec![entry("NET-3", 20_00)], Vec::new());
        let err = pipeline
            .compute_totals(
                &[line("NET-3", 1)],
                &elsewhere(),
                Some("NOPE"),
                None,
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Coupon(CouponError::NotFound)));
    }

    #[tokio::test]
    async fn test_total_identity_holds() {
        let pipeline = pipeline(vec![entry("NET-3", 20_00)], Vec::new());
        let totals = pipeline
            .compute_totals(&[line("NET-3", 2)], &florida(), None, None, now())
            .await
            .unwrap();
        assert!(totals.is_consistent());
        assert_eq!(
            totals.total,
            totals.subtotal + totals.shipping - totals.discount + totals.tax
        );
    }
}
