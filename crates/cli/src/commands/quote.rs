//! Dimensional quoting from the command line.

use clap::Args;
use rust_decimal::Decimal;
use tracing::info;

use tidewater_pricing::{
    Coverage, PricingConfig, PricingRequest, RateLoader, Shape, estimate, price_exact,
};

use crate::config::CliConfig;

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Height in feet
    #[arg(long)]
    pub height: Decimal,

    /// Width in feet
    #[arg(long)]
    pub width: Decimal,

    /// Length in feet; omit (or 0) for a flat panel
    #[arg(long, default_value = "0")]
    pub length: Decimal,

    /// Explicit shape; inferred from length when omitted
    #[arg(long, value_parser = parse_shape)]
    pub shape: Option<Shape>,

    /// Netting material name, e.g. "#36 Nylon"
    #[arg(long)]
    pub material: String,

    /// Border type name, e.g. "Sewn Rope"
    #[arg(long, default_value = "No Border")]
    pub border: String,

    /// Access doors
    #[arg(long, default_value_t = 0)]
    pub doors: u32,

    /// Expedited freight
    #[arg(long)]
    pub freight: bool,

    /// Include the ceiling in an enclosure estimate
    #[arg(long)]
    pub full_coverage: bool,

    /// Interior divider panels (estimate only)
    #[arg(long, default_value_t = 0)]
    pub dividers: u32,

    /// Produce the marketing estimate range instead of the exact price
    #[arg(long)]
    pub estimate: bool,
}

fn parse_shape(raw: &str) -> Result<Shape, String> {
    match raw.to_ascii_lowercase().as_str() {
        "panel" => Ok(Shape::Panel),
        "cage" => Ok(Shape::Cage),
        other => Err(format!("unknown shape {other:?}, expected panel or cage")),
    }
}

/// Price the requested dimensions.
///
/// # Errors
///
/// Returns the loader's or pricing engine's error unchanged.
pub fn run(config: &CliConfig, args: &QuoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = RateLoader::new(&config.material_rates, &config.border_rates);
    let rates = loader.snapshot()?;
    let pricing = PricingConfig::default();

    let request = PricingRequest {
        shape: args.shape,
        height: args.height,
        width: args.width,
        length: args.length,
        material: args.material.clone(),
        border: args.border.clone(),
        doors: args.doors,
        freight: args.freight,
        coverage: if args.full_coverage {
            Coverage::Full
        } else {
            Coverage::WallsOnly
        },
        divider_count: args.dividers,
        impact_pct: Decimal::ZERO,
    };

    if args.estimate {
        let range = estimate(&rates, &pricing, &request)?;
        info!(
            area_sqft = %range.area,
            perimeter_ft = %range.perimeter,
            materials = %range.materials,
            low = %range.price_low,
            high = %range.price_high,
            weight_lb = %range.weight,
            "marketing estimate"
        );
    } else {
        let quote = price_exact(&rates, &pricing, &request)?;
        info!(
            area_sqft = %quote.area,
            perimeter_ft = %quote.perimeter,
            unit_total = %quote.unit_total,
            weight_lb = %quote.weight,
            "exact quote"
        );
    }

    Ok(())
}
