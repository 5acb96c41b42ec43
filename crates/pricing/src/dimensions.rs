//! Dimensional pricing for panel and cage netting.
//!
//! Two entry points with deliberately different behavior:
//!
//! - [`estimate`] powers the marketing estimator. It applies a configurable
//!   multiplier window on top of the raw material figure (allowance for
//!   rigging and installation that the per-square-foot rates don't capture)
//!   and rounds to the nearest $50, producing a conservative range.
//! - [`price_exact`] powers the commerce calculator. It prices the exact
//!   purchasable item - `area x retail rate + border footage x border rate +
//!   flat fees` - with no multiplier, rounded to the cent.
//!
//! The asymmetry is intentional; collapsing the two would either overquote
//! the calculator or underquote the estimator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tidewater_core::types::Money;

use crate::rates::RateTable;

/// Product geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A flat rectangular net (walls, baffles, barriers).
    Panel,
    /// An open-ended enclosure with a rectangular cross-section; netting
    /// wraps the cross-section along the length, no end caps.
    Cage,
}

/// How much of an enclosure the estimator covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Walls only.
    #[default]
    WallsOnly,
    /// Walls plus ceiling.
    Full,
}

/// A dimensional pricing request.
///
/// `height` and `width` must be positive; `length` must be non-negative.
/// When `shape` is not given explicitly it is inferred: a positive `length`
/// means a cage, otherwise a flat panel.
///
/// `coverage`, `divider_count`, and `impact_pct` only affect the marketing
/// estimator's panel math; the exact calculator ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRequest {
    /// Explicit shape override; inferred from `length` when absent.
    #[serde(default)]
    pub shape: Option<Shape>,
    /// Height in feet.
    pub height: Decimal,
    /// Width in feet.
    pub width: Decimal,
    /// Length in feet; zero for a flat panel.
    #[serde(default)]
    pub length: Decimal,
    /// Netting material name, resolved against the rate table.
    pub material: String,
    /// Border type name, resolved against the rate table.
    pub border: String,
    /// Access doors, charged flat per door.
    #[serde(default)]
    pub doors: u32,
    /// Expedited freight, charged as one flat fee.
    #[serde(default)]
    pub freight: bool,
    /// Estimator only: walls or walls plus ceiling.
    #[serde(default)]
    pub coverage: Coverage,
    /// Estimator only: interior divider panels.
    #[serde(default)]
    pub divider_count: u32,
    /// Estimator only: extra impact-panel coverage as a fraction of wall
    /// area (`0.25` = quarter of the walls doubled up).
    #[serde(default)]
    pub impact_pct: Decimal,
}

impl PricingRequest {
    /// The effective shape: explicit when set, otherwise inferred from
    /// `length` (positive length means cage).
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape.unwrap_or(if self.length > Decimal::ZERO {
            Shape::Cage
        } else {
            Shape::Panel
        })
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.height <= Decimal::ZERO || self.width <= Decimal::ZERO {
            return Err(PricingError::NonPositiveDimension);
        }
        if self.length < Decimal::ZERO {
            return Err(PricingError::NegativeLength);
        }
        if self.shape() == Shape::Cage && self.length <= Decimal::ZERO {
            return Err(PricingError::CageWithoutLength);
        }
        Ok(())
    }
}

/// Business constants for dimensional pricing.
///
/// The estimate multipliers are long-standing rule-of-thumb install
/// allowances carried over from the sales team; they are configuration, not
/// formula, so they can be tuned without touching the math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat fee per access door.
    pub door_fee: Money,
    /// Flat fee for expedited freight.
    pub freight_fee: Money,
    /// Lower bound of the marketing estimate multiplier window.
    pub estimate_multiplier_low: Decimal,
    /// Upper bound of the marketing estimate multiplier window.
    pub estimate_multiplier_high: Decimal,
    /// Estimates round to the nearest multiple of this.
    pub estimate_rounding: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            door_fee: Money::from_cents(95_00),
            freight_fee: Money::from_cents(175_00),
            estimate_multiplier_low: Decimal::new(240, 2),
            estimate_multiplier_high: Decimal::new(340, 2),
            estimate_rounding: Money::from_cents(50_00),
        }
    }
}

/// A marketing estimate: a price window, not a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateRange {
    /// Net area in square feet.
    pub area: Decimal,
    /// Border perimeter in linear feet.
    pub perimeter: Decimal,
    /// Raw materials figure before the install-allowance window, rounded to
    /// the cent ("materials from ..." storefront copy).
    pub materials: Money,
    /// Low end of the window, rounded per config.
    pub price_low: Money,
    /// High end of the window, rounded per config.
    pub price_high: Money,
    /// Estimated weight in pounds.
    pub weight: Decimal,
}

/// An exact, purchasable price from the commerce calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactQuote {
    /// Net area in square feet.
    pub area: Decimal,
    /// Border perimeter in linear feet.
    pub perimeter: Decimal,
    /// Total for one unit, rounded to the cent.
    pub unit_total: Money,
    /// Unit weight in pounds.
    pub weight: Decimal,
}

/// Validation failures for dimensional pricing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Height or width was zero or negative.
    #[error("height and width must be greater than zero")]
    NonPositiveDimension,
    /// Length was negative.
    #[error("length cannot be negative")]
    NegativeLength,
    /// Shape was cage but length was zero.
    #[error("a cage requires a positive length")]
    CageWithoutLength,
    /// Material name not present in the rate table.
    #[error("unknown netting material {0:?}")]
    UnknownMaterial(String),
    /// Border name not present in the rate table.
    #[error("unknown border type {0:?}")]
    UnknownBorder(String),
}

/// Area and border footage for one request.
struct Geometry {
    area: Decimal,
    perimeter: Decimal,
    border_ft: Decimal,
}

/// Geometry for the exact calculator: a flat panel or an open-ended tube.
///
/// Cage border runs around *both open ends*, i.e. twice the cross-section
/// perimeter - never the along-length travel perimeter.
fn exact_geometry(request: &PricingRequest) -> Geometry {
    let two = Decimal::TWO;
    match request.shape() {
        Shape::Panel => {
            let perimeter = two * (request.width + request.height);
            Geometry {
                area: request.width * request.height,
                perimeter,
                border_ft: perimeter,
            }
        }
        Shape::Cage => {
            let cross_perimeter = two * (request.width + request.height);
            Geometry {
                area: cross_perimeter * request.length,
                perimeter: cross_perimeter,
                border_ft: two * cross_perimeter,
            }
        }
    }
}

/// Geometry for the marketing estimator.
///
/// Panels estimate a full enclosure: wall area around the footprint, an
/// optional ceiling, plus dividers and impact-panel overlays. Cages reuse
/// the exact tube math.
fn estimate_geometry(request: &PricingRequest) -> Geometry {
    match request.shape() {
        Shape::Cage => exact_geometry(request),
        Shape::Panel => {
            let two = Decimal::TWO;
            let wall_area = two * (request.length + request.width) * request.height;
            let ceiling_area = request.length * request.width;
            let base_area = match request.coverage {
                Coverage::Full => wall_area + ceiling_area,
                Coverage::WallsOnly => wall_area,
            };
            let divider_area =
                Decimal::from(request.divider_count) * request.width * request.height;
            let impact_area = wall_area * request.impact_pct;
            let perimeter = two * (request.length + request.width);
            Geometry {
                area: base_area + divider_area + impact_area,
                perimeter,
                border_ft: perimeter,
            }
        }
    }
}

/// Resolve rates and compute the raw (unrounded) materials figure.
fn raw_materials(
    rates: &RateTable,
    request: &PricingRequest,
    geometry: &Geometry,
) -> Result<(Decimal, Decimal), PricingError> {
    let material = rates
        .material(&request.material)
        .ok_or_else(|| PricingError::UnknownMaterial(request.material.clone()))?;
    let border = rates
        .border(&request.border)
        .ok_or_else(|| PricingError::UnknownBorder(request.border.clone()))?;

    let raw = geometry.area * material.retail_per_sqft + geometry.border_ft * border.cost_per_ft;
    let weight =
        geometry.area * material.weight_per_sqft + geometry.border_ft * border.weight_per_ft;
    Ok((raw, weight))
}

fn flat_fees(config: &PricingConfig, request: &PricingRequest) -> Money {
    let mut fees = config.door_fee * request.doors;
    if request.freight {
        fees += config.freight_fee;
    }
    fees
}

/// Marketing estimate: raw materials scaled through the install-allowance
/// window, flat fees added, rounded to the configured step.
///
/// # Errors
///
/// Returns [`PricingError`] for invalid dimensions or unknown
/// material/border references.
pub fn estimate(
    rates: &RateTable,
    config: &PricingConfig,
    request: &PricingRequest,
) -> Result<EstimateRange, PricingError> {
    request.validate()?;
    let geometry = estimate_geometry(request);
    let (raw, weight) = raw_materials(rates, request, &geometry)?;
    let fees = flat_fees(config, request);

    let bound = |multiplier: Decimal| {
        (Money::from_dollars(raw * multiplier) + fees).round_to_step(config.estimate_rounding)
    };

    Ok(EstimateRange {
        area: geometry.area,
        perimeter: geometry.perimeter,
        materials: Money::from_dollars(raw),
        price_low: bound(config.estimate_multiplier_low),
        price_high: bound(config.estimate_multiplier_high),
        weight,
    })
}

/// Exact commerce price: `area x rate + border footage x rate + flat fees`,
/// no multiplier, rounded to the cent.
///
/// # Errors
///
/// Returns [`PricingError`] for invalid dimensions or unknown
/// material/border references.
pub fn price_exact(
    rates: &RateTable,
    config: &PricingConfig,
    request: &PricingRequest,
) -> Result<ExactQuote, PricingError> {
    request.validate()?;
    let geometry = exact_geometry(request);
    let (raw, weight) = raw_materials(rates, request, &geometry)?;

    Ok(ExactQuote {
        area: geometry.area,
        perimeter: geometry.perimeter,
        unit_total: Money::from_dollars(raw) + flat_fees(config, request),
        weight,
    })
}
