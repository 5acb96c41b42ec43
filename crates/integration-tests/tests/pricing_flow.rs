//! Rate sources through the loader into dimensional quotes.
//!
//! These tests exercise the real CSV loader against files on disk, then
//! price through the same path the storefront calculator uses.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tidewater_core::types::Money;
use tidewater_integration_tests::dec;
use tidewater_pricing::{
    Coverage, PricingConfig, PricingRequest, RateLoader, Shape, estimate, price_exact,
};

fn write_rate_sources(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
    let materials = dir.path().join("material-rates.csv");
    let borders = dir.path().join("border-rates.csv");

    let mut f = fs::File::create(&materials).unwrap();
    writeln!(f, "Material,Retail,Wholesale,Weight").unwrap();
    writeln!(f, "#36 Nylon,0.35,0.10,0.011").unwrap();
    writeln!(f, "#21 Poly,0.28,0.08,0.008").unwrap();
    writeln!(f, "Sewn Rope,0,0,0.05").unwrap();
    writeln!(f, "Lead Rope (Bottom),0,0,0.24").unwrap();
    writeln!(f, "No Border,0,0,0").unwrap();

    let mut f = fs::File::create(&borders).unwrap();
    writeln!(f, "Border,Cost").unwrap();
    writeln!(f, "Sewn Rope,0.50").unwrap();
    writeln!(f, "Lead Rope,1.25").unwrap();

    (materials, borders)
}

fn request(height: &str, width: &str, length: &str, border: &str) -> PricingRequest {
    PricingRequest {
        shape: None,
        height: dec(height),
        width: dec(width),
        length: dec(length),
        material: "#36 Nylon".to_owned(),
        border: border.to_owned(),
        doors: 0,
        freight: false,
        coverage: Coverage::WallsOnly,
        divider_count: 0,
        impact_pct: dec("0"),
    }
}

#[test]
fn panel_quote_through_real_loader() {
    let dir = tempfile::tempdir().unwrap();
    let (materials, borders) = write_rate_sources(&dir);
    let loader = RateLoader::new(materials, borders);
    let rates = loader.snapshot().unwrap();

    // 10x10 panel, #36 Nylon, Sewn Rope: 100*0.35 + 40*0.50 = 55.00
    let quote = price_exact(
        &rates,
        &PricingConfig::default(),
        &request("10", "10", "0", "Sewn Rope"),
    )
    .unwrap();

    assert_eq!(quote.area, dec("100"));
    assert_eq!(quote.perimeter, dec("40"));
    assert_eq!(quote.unit_total, Money::from_cents(55_00));
}

#[test]
fn cage_quote_with_synthesized_no_border() {
    let dir = tempfile::tempdir().unwrap();
    let (materials, borders) = write_rate_sources(&dir);
    let loader = RateLoader::new(materials, borders);
    let rates = loader.snapshot().unwrap();

    // 3w x 2h x 4l cage: cross perimeter 10, area 40, border free:
    // 40 * 0.35 = 14.00. "No Border" only exists in the weight sheet.
    let req = request("2", "3", "4", "No Border");
    assert_eq!(req.shape(), Shape::Cage);

    let quote = price_exact(&rates, &PricingConfig::default(), &req).unwrap();
    assert_eq!(quote.area, dec("40"));
    assert_eq!(quote.perimeter, dec("10"));
    assert_eq!(quote.unit_total, Money::from_cents(14_00));
}

#[test]
fn estimate_range_brackets_the_exact_price() {
    let dir = tempfile::tempdir().unwrap();
    let (materials, borders) = write_rate_sources(&dir);
    let loader = RateLoader::new(materials, borders);
    let rates = loader.snapshot().unwrap();
    let config = PricingConfig::default();

    let req = request("10", "10", "0", "Sewn Rope");
    let exact = price_exact(&rates, &config, &req).unwrap();
    let range = estimate(&rates, &config, &req).unwrap();

    // The marketing window sits strictly above the raw commerce price and
    // lands on $50 steps.
    assert!(range.price_low > exact.unit_total);
    assert!(range.price_high >= range.price_low);
    assert_eq!(range.price_low.cents() % 50_00, 0);
    assert_eq!(range.price_high.cents() % 50_00, 0);
}

#[test]
fn rate_edit_takes_effect_after_invalidate() {
    let dir = tempfile::tempdir().unwrap();
    let (materials, borders) = write_rate_sources(&dir);
    let loader = RateLoader::new(materials.clone(), borders);

    let before = price_exact(
        &loader.snapshot().unwrap(),
        &PricingConfig::default(),
        &request("10", "10", "0", "Sewn Rope"),
    )
    .unwrap();

    // Reprice the material and force a reload (mtime granularity makes the
    // timestamp signal flaky inside a single test process).
    let mut f = fs::File::create(&materials).unwrap();
    writeln!(f, "Material,Retail,Wholesale,Weight").unwrap();
    writeln!(f, "#36 Nylon,0.70,0.10,0.011").unwrap();
    loader.invalidate();

    let after = price_exact(
        &loader.snapshot().unwrap(),
        &PricingConfig::default(),
        &request("10", "10", "0", "Sewn Rope"),
    )
    .unwrap();

    assert_eq!(before.unit_total, Money::from_cents(55_00));
    assert_eq!(after.unit_total, Money::from_cents(90_00));
}
