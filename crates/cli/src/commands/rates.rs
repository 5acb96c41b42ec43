//! Rate source inspection.

use tidewater_pricing::RateLoader;
use tracing::info;

use crate::config::CliConfig;

/// Load both rate sources and report what was parsed.
///
/// # Errors
///
/// Returns the loader's error when a source is unreadable or malformed.
pub fn check(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let loader = RateLoader::new(&config.material_rates, &config.border_rates);
    let table = loader.snapshot()?;

    info!(
        source = %config.material_rates.display(),
        rows = table.materials().len(),
        "materials sheet parsed"
    );
    for material in table.materials() {
        info!(
            name = %material.name,
            retail = %material.retail_per_sqft,
            wholesale = %material.wholesale_per_sqft,
            weight = %material.weight_per_sqft,
            "material"
        );
    }

    info!(
        source = %config.border_rates.display(),
        rows = table.borders().len(),
        "borders sheet parsed"
    );
    for border in table.borders() {
        info!(
            name = %border.name,
            cost_per_ft = %border.cost_per_ft,
            weight_per_ft = %border.weight_per_ft,
            "border"
        );
    }

    Ok(())
}
