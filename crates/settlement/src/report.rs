//! Payout report construction.
//!
//! For each paid order in the window:
//!
//! ```text
//! gross          = gateway-reported charge amount, else the stored total
//! cart_before_tax = gross - tax
//! platform_fee   = platform_fee_pct * cart_before_tax
//! net_payout     = gross - wholesale_known - shipping - platform_fee - gateway_fee
//! ```
//!
//! Wholesale recovery runs through the resolver's wholesale chain; a line
//! whose chain ends in `Unknown` is excluded from the wholesale sum and
//! counted instead. Whenever that count is nonzero the report says so - a
//! financial report must never claim precision it doesn't have.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use tidewater_core::stores::{CatalogStore, GatewayError, OrderStore, PaymentGateway, StoreError};
use tidewater_core::types::{Money, Order, OrderId, Sku};
use tidewater_pricing::resolver::{self, QuantityUnit, Wholesale};

/// Business configuration for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Platform fee as a fraction of the pre-tax cart value.
    pub platform_fee_pct: Decimal,
    /// Maximum orders fetched per report window. A window that fills the cap
    /// fails fast instead of emitting a silently truncated report.
    pub fetch_cap: usize,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            platform_fee_pct: Decimal::new(3, 2),
            fetch_cap: 5_000,
        }
    }
}

/// One reconciled order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutLine {
    /// Catalog id.
    pub sku: Sku,
    /// The option string the customer bought.
    pub option: String,
    /// Units.
    pub quantity: u32,
    /// Matched wholesale unit cost; `None` means unknown, not zero.
    pub unit_cost: Option<Money>,
    /// `unit_cost * quantity`, when known.
    pub line_total: Option<Money>,
}

/// One reconciled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPayout {
    /// Order id.
    pub order_id: OrderId,
    /// What the customer actually paid, per the gateway when available.
    pub gross: Money,
    /// Tax collected (from the stored totals).
    pub tax: Money,
    /// Shipping collected (from the stored totals).
    pub shipping: Money,
    /// `gross - tax`.
    pub cart_before_tax: Money,
    /// Sum of known wholesale line totals.
    pub wholesale_known: Money,
    /// Lines whose wholesale chain came up empty.
    pub unknown_wholesale_lines: u32,
    /// Platform fee on the pre-tax cart.
    pub platform_fee: Money,
    /// The gateway's reported processing fee.
    pub gateway_fee: Money,
    /// What the merchant clears on this order.
    pub net_payout: Money,
    /// Per-line breakdown.
    pub lines: Vec<PayoutLine>,
}

/// Per-SKU aggregation across the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuRow {
    /// Catalog id.
    pub sku: Sku,
    /// Units sold.
    pub units: u32,
    /// Linear feet sold, for by-the-foot lines.
    pub linear_ft: Decimal,
    /// Retail (MAP) revenue.
    pub map_revenue: Money,
    /// Known wholesale cost.
    pub wholesale_cost: Money,
    /// Lines with unknown wholesale.
    pub unknown_wholesale_lines: u32,
}

/// Window-level aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutSummary {
    /// Orders reconciled.
    pub orders: usize,
    /// Total gross paid.
    pub gross: Money,
    /// Total known wholesale cost.
    pub wholesale_known: Money,
    /// Total shipping collected.
    pub shipping: Money,
    /// Total platform fees.
    pub platform_fees: Money,
    /// Total gateway fees.
    pub gateway_fees: Money,
    /// Total net payout.
    pub net: Money,
    /// Lines with unknown wholesale across all orders.
    pub unknown_wholesale_lines: u32,
    /// Whether any wholesale input was missing.
    pub partial: bool,
}

impl PayoutSummary {
    /// The wholesale total, annotated `(partial)` when inputs were
    /// incomplete.
    #[must_use]
    pub fn annotated_wholesale(&self) -> String {
        if self.partial {
            format!("{} (partial)", self.wholesale_known)
        } else {
            self.wholesale_known.to_string()
        }
    }
}

/// The full report handed to the report consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutReport {
    /// Subject line for downstream delivery; carries the `(partial)`
    /// annotation when wholesale data was incomplete.
    pub subject: String,
    /// First day of the window (inclusive, UTC).
    pub start: NaiveDate,
    /// Last day of the window (inclusive, UTC).
    pub end: NaiveDate,
    /// Per-order reconciliation, in placement order.
    pub per_order: Vec<OrderPayout>,
    /// Per-SKU totals, sorted descending by MAP revenue.
    pub per_sku: Vec<SkuRow>,
    /// Window aggregates.
    pub summary: PayoutSummary,
}

/// Failures that abort report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The payment gateway could not be consulted.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The window filled the fetch cap; the report would be truncated.
    #[error("window returned {cap}+ orders; narrow the date range")]
    WindowTooLarge {
        /// The configured cap that was hit.
        cap: usize,
    },
}

/// Builds payout reports over a closed date window.
#[derive(Clone)]
pub struct ReconciliationEngine {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: SettlementConfig,
}

impl ReconciliationEngine {
    /// Create an engine over the given stores.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            orders,
            catalog,
            gateway,
            config,
        }
    }

    /// Build the payout report for `[start, end]`, both inclusive, with day
    /// boundaries normalized to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when a store or the gateway fails, or when
    /// the window exceeds the configured fetch cap. Missing wholesale data
    /// is not an error; it surfaces as the `partial` annotation.
    pub async fn build_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PayoutReport, ReportError> {
        let window_start = start.and_time(NaiveTime::MIN).and_utc();
        let window_end = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let orders = self
            .orders
            .paid_between(window_start, window_end, self.config.fetch_cap)
            .await?;
        if orders.len() >= self.config.fetch_cap {
            return Err(ReportError::WindowTooLarge {
                cap: self.config.fetch_cap,
            });
        }

        let mut per_order = Vec::with_capacity(orders.len());
        let mut sku_rows: HashMap<Sku, SkuRow> = HashMap::new();

        for order in &orders {
            let payout = self.reconcile_order(order, &mut sku_rows).await?;
            per_order.push(payout);
        }

        let mut per_sku: Vec<SkuRow> = sku_rows.into_values().collect();
        per_sku.sort_by(|a, b| b.map_revenue.cmp(&a.map_revenue));

        let summary = summarize(&per_order);
        let subject = if summary.partial {
            format!("Payout report {start} to {end} (partial)")
        } else {
            format!("Payout report {start} to {end}")
        };
        info!(
            orders = summary.orders,
            net = %summary.net,
            partial = summary.partial,
            "payout report built"
        );

        Ok(PayoutReport {
            subject,
            start,
            end,
            per_order,
            per_sku,
            summary,
        })
    }

    async fn reconcile_order(
        &self,
        order: &Order,
        sku_rows: &mut HashMap<Sku, SkuRow>,
    ) -> Result<OrderPayout, ReportError> {
        // The gateway's figure is authoritative; the stored total is the
        // fallback when the charge is missing on their side.
        let charge = match order.charge_id.as_deref() {
            Some(charge_id) => self.gateway.charge(charge_id).await?,
            None => None,
        };
        let gross = charge
            .and_then(|c| c.gross)
            .unwrap_or(order.totals.total);
        if charge.is_none() {
            warn!(order = %order.id, "no gateway record, using stored order total");
        }
        let gateway_fee = charge.map_or(Money::ZERO, |c| c.fee);

        let tax = order.totals.tax;
        let shipping = order.totals.shipping;
        let cart_before_tax = gross - tax;

        let mut wholesale_known = Money::ZERO;
        let mut unknown_wholesale_lines = 0_u32;
        let mut lines = Vec::with_capacity(order.lines.len());

        for line in &order.lines {
            let quantity = line.quantity.max(1);
            let entry = self.catalog.entry(&line.sku).await?;

            let (unit_cost, map_unit_price) = entry.as_ref().map_or_else(
                || {
                    warn!(sku = %line.sku, "order line references unknown SKU");
                    (Wholesale::Unknown, line.declared_unit_price)
                },
                |entry| {
                    let wholesale =
                        resolver::resolve_wholesale(entry, &line.option, QuantityUnit::Each);
                    let retail = resolver::resolve_retail(
                        entry,
                        &line.option,
                        QuantityUnit::Each,
                        line.declared_unit_price,
                    )
                    .map(|r| r.unit_price)
                    .ok();
                    (wholesale, retail)
                },
            );

            let line_total = unit_cost.known().map(|cost| cost * quantity);
            match line_total {
                Some(total) => wholesale_known += total,
                None => unknown_wholesale_lines += 1,
            }

            let row = sku_rows.entry(line.sku.clone()).or_insert_with(|| SkuRow {
                sku: line.sku.clone(),
                units: 0,
                linear_ft: Decimal::ZERO,
                map_revenue: Money::ZERO,
                wholesale_cost: Money::ZERO,
                unknown_wholesale_lines: 0,
            });
            row.units += quantity;
            if let Some(feet) = resolver::foot_count(&line.option) {
                row.linear_ft += feet * Decimal::from(quantity);
            }
            if let Some(unit_price) = map_unit_price {
                row.map_revenue += unit_price * quantity;
            }
            match line_total {
                Some(total) => row.wholesale_cost += total,
                None => row.unknown_wholesale_lines += 1,
            }

            lines.push(PayoutLine {
                sku: line.sku.clone(),
                option: line.option.clone(),
                quantity,
                unit_cost: unit_cost.known(),
                line_total,
            });
        }

        let platform_fee = cart_before_tax
            .clamp_non_negative()
            .scale(self.config.platform_fee_pct);
        let net_payout = gross - wholesale_known - shipping - platform_fee - gateway_fee;

        Ok(OrderPayout {
            order_id: order.id,
            gross,
            tax,
            shipping,
            cart_before_tax,
            wholesale_known,
            unknown_wholesale_lines,
            platform_fee,
            gateway_fee,
            net_payout,
            lines,
        })
    }
}

fn summarize(per_order: &[OrderPayout]) -> PayoutSummary {
    let unknown_wholesale_lines = per_order.iter().map(|o| o.unknown_wholesale_lines).sum();
    PayoutSummary {
        orders: per_order.len(),
        gross: per_order.iter().map(|o| o.gross).sum(),
        wholesale_known: per_order.iter().map(|o| o.wholesale_known).sum(),
        shipping: per_order.iter().map(|o| o.shipping).sum(),
        platform_fees: per_order.iter().map(|o| o.platform_fee).sum(),
        gateway_fees: per_order.iter().map(|o| o.gateway_fee).sum(),
        net: per_order.iter().map(|o| o.net_payout).sum(),
        unknown_wholesale_lines,
        partial: unknown_wholesale_lines > 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use tidewater_core::types::{
        CartLineItem, CatalogEntry, ChargeRecord, OrderTotals, PriceTag,
    };
    use uuid::Uuid;

    struct FixedOrders(Vec<Order>);

    #[async_trait]
    impl OrderStore for FixedOrders {
        async fn paid_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<Order>, StoreError> {
            Ok(self
                .0
                .iter()
                .filter(|o| o.paid && o.placed_at >= start && o.placed_at < end)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    struct FixedCatalog(Vec<CatalogEntry>);

    #[async_trait]
    impl CatalogStore for FixedCatalog {
        async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError> {
            Ok(self.0.iter().find(|e| &e.sku == sku).cloned())
        }
    }

    struct FixedGateway(HashMap<String, ChargeRecord>);

    #[async_trait]
    impl PaymentGateway for FixedGateway {
        async fn charge(&self, charge_id: &str) -> Result<Option<ChargeRecord>, GatewayError> {
            Ok(self.0.get(charge_id).copied())
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn entry(sku: &str, map: &str, wholesale: Option<&str>) -> CatalogEntry {
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

    fn order(day: u32, lines: Vec<CartLineItem>, totals: OrderTotals, charge: &str) -> Order {
        Order {
            id: OrderId::from_uuid(Uuid::from_u128(u128::from(day))),
            placed_at: Utc.with_ymd_and_hms(2026, 7, day, 15, 30, 0).unwrap(),
            email: None,
            address: None,
            lines,
            totals,
            charge_id: Some(charge.to_owned()),
            paid: true,
        }
    }

    fn line(sku: &str, quantity: u32, option: &str) -> CartLineItem {
        CartLineItem {
            sku: Sku::new(sku),
            quantity,
            option: option.to_owned(),
            declared_unit_price: None,
            shipping_override: None,
            weight: None,
        }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
        )
    }

    fn engine(
        orders: Vec<Order>,
        catalog: Vec<CatalogEntry>,
        charges: HashMap<String, ChargeRecord>,
    ) -> ReconciliationEngine {
        ReconciliationEngine::new(
            Arc::new(FixedOrders(orders)),
            Arc::new(FixedCatalog(catalog)),
            Arc::new(FixedGateway(charges)),
            SettlementConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_net_payout_identity() {
        // One order: 2 units at $20 MAP / $8 wholesale, $100 shipping,
        // no tax. Gateway reports gross $140.00 and a $4.36 fee.
        let totals = OrderTotals::assemble(
            Money::from_cents(40_00),
            Money::from_cents(100_00),
            Money::ZERO,
            Money::ZERO,
        );
        let charges = HashMap::from([(
            "ch_1".to_owned(),
            ChargeRecord {
                gross: Some(Money::from_cents(140_00)),
                fee: Money::from_cents(4_36),
                net: Some(Money::from_cents(135_64)),
            },
        )]);
        let engine = engine(
            vec![order(5, vec![line("NET-1", 2, "")], totals, "ch_1")],
            vec![entry("NET-1", "20", Some("8"))],
            charges,
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();
        let payout = report.per_order.first().unwrap();

        assert_eq!(payout.gross, Money::from_cents(140_00));
        assert_eq!(payout.wholesale_known, Money::from_cents(16_00));
        // platform fee: 3% of (140 - 0) = 4.20
        assert_eq!(payout.platform_fee, Money::from_cents(4_20));
        assert_eq!(
            payout.net_payout,
            payout.gross
                - payout.wholesale_known
                - payout.shipping
                - payout.platform_fee
                - payout.gateway_fee
        );
        assert_eq!(payout.net_payout, Money::from_cents(15_44));
        assert!(!report.summary.partial);
    }

    #[tokio::test]
    async fn test_unknown_wholesale_marks_report_partial() {
        let totals = OrderTotals::assemble(
            Money::from_cents(20_00),
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        );
        let engine = engine(
            vec![order(6, vec![line("NET-2", 1, "")], totals, "ch_2")],
            vec![entry("NET-2", "20", None)],
            HashMap::new(),
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();

        assert_eq!(report.summary.unknown_wholesale_lines, 1);
        assert!(report.summary.partial);
        assert!(report.subject.ends_with("(partial)"));
        assert!(report.summary.annotated_wholesale().contains("(partial)"));
        // Unknown is excluded from the sum, not zeroed into it.
        assert_eq!(report.summary.wholesale_known, Money::ZERO);
    }

    #[tokio::test]
    async fn test_gateway_fallback_to_stored_total() {
        let totals = OrderTotals::assemble(
            Money::from_cents(20_00),
            Money::from_cents(100_00),
            Money::ZERO,
            Money::from_cents(1_40),
        );
        let engine = engine(
            vec![order(7, vec![line("NET-1", 1, "")], totals, "ch_missing")],
            vec![entry("NET-1", "20", Some("8"))],
            HashMap::new(),
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();
        let payout = report.per_order.first().unwrap();

        assert_eq!(payout.gross, totals.total);
        assert_eq!(payout.gateway_fee, Money::ZERO);
        assert_eq!(payout.cart_before_tax, totals.total - totals.tax);
    }

    #[tokio::test]
    async fn test_by_the_foot_wholesale_and_linear_feet() {
        let mut by_foot = entry("ROPE-1", "2.50", None);
        by_foot.map_price = Some(PriceTag::per_foot(dec("2.50")));
        by_foot.wholesale = Some(PriceTag::per_foot(dec("1.10")));

        let totals = OrderTotals::assemble(
            Money::from_cents(50_00),
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        );
        let engine = engine(
            vec![order(
                8,
                vec![line("ROPE-1", 2, "By the Foot: 10'")],
                totals,
                "ch_3",
            )],
            vec![by_foot],
            HashMap::new(),
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();

        // wholesale: 1.10 * 10 ft * 2 units
        assert_eq!(
            report.summary.wholesale_known,
            Money::from_cents(22_00)
        );
        let row = report.per_sku.first().unwrap();
        assert_eq!(row.linear_ft, dec("20"));
        assert_eq!(row.units, 2);
    }

    #[tokio::test]
    async fn test_per_sku_sorted_by_map_revenue() {
        let totals = OrderTotals::assemble(
            Money::from_cents(100_00),
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        );
        let engine = engine(
            vec![order(
                9,
                vec![line("SMALL", 1, ""), line("BIG", 1, "")],
                totals,
                "ch_4",
            )],
            vec![entry("SMALL", "20", Some("8")), entry("BIG", "80", Some("30"))],
            HashMap::new(),
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();
        let names: Vec<&str> = report.per_sku.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(names, vec!["BIG", "SMALL"]);
    }

    #[tokio::test]
    async fn test_window_cap_fails_fast() {
        let totals = OrderTotals::assemble(
            Money::from_cents(20_00),
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        );
        let orders: Vec<Order> = (1..=28)
            .map(|day| order(day, vec![line("NET-1", 1, "")], totals, "ch"))
            .collect();
        let engine = ReconciliationEngine::new(
            Arc::new(FixedOrders(orders)),
            Arc::new(FixedCatalog(vec![entry("NET-1", "20", Some("8"))])),
            Arc::new(FixedGateway(HashMap::new())),
            SettlementConfig {
                fetch_cap: 10,
                ..SettlementConfig::default()
            },
        );

        let (start, end) = window();
        assert!(matches!(
            engine.build_report(start, end).await,
            Err(ReportError::WindowTooLarge { cap: 10 })
        ));
    }

    #[tokio::test]
    async fn test_orders_outside_window_excluded() {
        let totals = OrderTotals::assemble(
            Money::from_cents(20_00),
            Money::ZERO,
            Money::ZERO,
            Money::ZERO,
        );
        let mut inside = order(15, vec![line("NET-1", 1, "")], totals, "ch");
        inside.placed_at = Utc.with_ymd_and_hms(2026, 7, 15, 0, 0, 0).unwrap();
        let mut outside = order(16, vec![line("NET-1", 1, "")], totals, "ch");
        outside.placed_at = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();

        let engine = engine(
            vec![inside, outside],
            vec![entry("NET-1", "20", Some("8"))],
            HashMap::new(),
        );

        let (start, end) = window();
        let report = engine.build_report(start, end).await.unwrap();
        assert_eq!(report.summary.orders, 1);
    }
}
