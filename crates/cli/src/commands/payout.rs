//! The scheduled payout reconciliation job.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use tidewater_pricing::CachedCatalog;
use tidewater_settlement::ReconciliationEngine;

use crate::config::CliConfig;
use crate::store::{JsonCatalog, JsonCharges, JsonOrders};

/// Reconcile paid orders for `[start, end]` and write the structured report.
///
/// The written JSON is the hand-off to the report consumer; rendering and
/// delivery happen downstream.
///
/// # Errors
///
/// Returns adapter, store, or report errors unchanged; a window that
/// exceeds the fetch cap fails rather than truncating.
pub async fn run(
    config: &CliConfig,
    start: NaiveDate,
    end: NaiveDate,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(JsonCatalog::load(&config.catalog)?);
    let orders = Arc::new(JsonOrders::load(&config.orders)?);
    let gateway = Arc::new(JsonCharges::load(&config.charges)?);

    let engine = ReconciliationEngine::new(
        orders,
        Arc::new(CachedCatalog::new(catalog)),
        gateway,
        config.settlement(),
    );

    let report = engine.build_report(start, end).await?;

    fs::write(out, serde_json::to_vec_pretty(&report)?)?;

    info!(subject = %report.subject, "report written");
    info!(
        orders = report.summary.orders,
        gross = %report.summary.gross,
        wholesale = %report.summary.annotated_wholesale(),
        net = %report.summary.net,
        out = %out.display(),
        "payout summary"
    );
    for row in report.per_sku.iter().take(10) {
        info!(
            sku = %row.sku,
            units = row.units,
            linear_ft = %row.linear_ft,
            revenue = %row.map_revenue,
            wholesale = %row.wholesale_cost,
            "top item"
        );
    }

    Ok(())
}
