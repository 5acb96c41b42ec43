//! Catalog rate loader.
//!
//! Two delimited tabular sources drive dimensional pricing:
//!
//! - the *materials* sheet: one row per netting material with retail and
//!   wholesale price per square foot and weight per square foot. Border
//!   hardware (ropes, cables) also appears here, weight-only.
//! - the *borders* sheet: one row per border type with cost per linear foot.
//!
//! Column lookup is header-driven, not positional, and the CSV dialect is the
//! standard quoted-field one (doubled-quote escaping). A numeric cell that
//! fails to parse becomes zero with a warning - one malformed row must not
//! break pricing site-wide. An unreadable source, by contrast, fails the
//! whole load: these tables power real checkout totals, and silently pricing
//! everything at zero is worse than an error.
//!
//! Loads are cached behind [`RateLoader::snapshot`]; the cache key is the
//! pair of source modification timestamps, so editing either sheet takes
//! effect on the next read without a restart.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Weight-table alias: border rows are keyed slightly differently between
/// the two sheets.
const LEAD_ROPE: &str = "Lead Rope";
const LEAD_ROPE_BOTTOM: &str = "Lead Rope (Bottom)";

/// The zero-cost border; synthesized when the weight table knows it but the
/// borders sheet omits it.
const NO_BORDER: &str = "No Border";

/// Per-square-foot rates for one netting material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetMaterialRate {
    /// Material name, e.g. `#36 Nylon`.
    pub name: String,
    /// Retail (MAP) price per square foot.
    pub retail_per_sqft: Decimal,
    /// Wholesale cost per square foot.
    pub wholesale_per_sqft: Decimal,
    /// Weight in pounds per square foot.
    pub weight_per_sqft: Decimal,
}

/// Per-linear-foot pricing for one border type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorderOption {
    /// Border type name, e.g. `Sewn Rope`. `No Border` is a valid zero-cost
    /// member.
    pub name: String,
    /// Cost per linear foot.
    pub cost_per_ft: Decimal,
    /// Weight in pounds per linear foot.
    pub weight_per_ft: Decimal,
}

/// The two rate tables, immutable once loaded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RateTable {
    materials: Vec<NetMaterialRate>,
    borders: Vec<BorderOption>,
}

impl RateTable {
    /// Build a table directly from rows.
    ///
    /// Production tables come from [`RateLoader::snapshot`]; this constructor
    /// exists for tests and for callers with a non-file rate source.
    #[must_use]
    pub const fn from_rows(materials: Vec<NetMaterialRate>, borders: Vec<BorderOption>) -> Self {
        Self { materials, borders }
    }

    /// All material rows, in sheet order.
    #[must_use]
    pub fn materials(&self) -> &[NetMaterialRate] {
        &self.materials
    }

    /// All border rows, in sheet order.
    #[must_use]
    pub fn borders(&self) -> &[BorderOption] {
        &self.borders
    }

    /// Look up a material by name: case-insensitive exact match first, then
    /// contains (option strings often embed the material name in longer
    /// free text).
    #[must_use]
    pub fn material(&self, name: &str) -> Option<&NetMaterialRate> {
        lookup(&self.materials, name, |m| &m.name)
    }

    /// Look up a border by name, with the same match rules as
    /// [`RateTable::material`].
    #[must_use]
    pub fn border(&self, name: &str) -> Option<&BorderOption> {
        lookup(&self.borders, name, |b| &b.name)
    }
}

fn lookup<'a, T>(rows: &'a [T], name: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    let wanted = name.trim();
    rows.iter()
        .find(|row| key(row).eq_ignore_ascii_case(wanted))
        .or_else(|| {
            let wanted = wanted.to_ascii_lowercase();
            rows.iter().find(|row| {
                let have = key(row).to_ascii_lowercase();
                have.contains(&wanted) || wanted.contains(&have)
            })
        })
}

/// Error loading the rate sources.
#[derive(Debug, Error)]
pub enum RateError {
    /// A source file could not be read at all.
    #[error("rate source {} unreadable: {source}", path.display())]
    Unreadable {
        /// The offending source file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// A source file could not be parsed as CSV.
    #[error("rate source {}: {source}", path.display())]
    Csv {
        /// The offending source file.
        path: PathBuf,
        /// Underlying CSV failure.
        source: csv::Error,
    },
    /// A required header is missing from a source file.
    #[error("rate source {} is missing required column {column:?}", path.display())]
    MissingColumn {
        /// The offending source file.
        path: PathBuf,
        /// The column that could not be found.
        column: &'static str,
    },
}

/// Loads and caches the rate tables.
///
/// The cache is an explicit snapshot object: [`RateLoader::snapshot`] returns
/// the cached `Arc<RateTable>` while both source files keep their recorded
/// modification timestamps, and reloads when either changes.
/// [`RateLoader::invalidate`] drops the snapshot unconditionally. There is no
/// module-level state; construct one loader per rate-source pair and share it.
///
/// Reads swap in a new immutable snapshot behind a mutex, so concurrent
/// readers on a multi-threaded runtime are safe.
#[derive(Debug)]
pub struct RateLoader {
    materials_path: PathBuf,
    borders_path: PathBuf,
    cache: Mutex<Option<CachedRates>>,
}

#[derive(Debug)]
struct CachedRates {
    stamp: (SystemTime, SystemTime),
    table: Arc<RateTable>,
}

impl RateLoader {
    /// Create a loader over the two source files.
    pub fn new(materials_path: impl Into<PathBuf>, borders_path: impl Into<PathBuf>) -> Self {
        Self {
            materials_path: materials_path.into(),
            borders_path: borders_path.into(),
            cache: Mutex::new(None),
        }
    }

    /// The current rate table, reloading if either source changed.
    ///
    /// # Errors
    ///
    /// Returns [`RateError`] if a source is unreadable, unparseable as CSV,
    /// or missing a required header. Individual malformed cells do not error;
    /// they become zero with a warning.
    pub fn snapshot(&self) -> Result<Arc<RateTable>, RateError> {
        let stamp = (
            modified(&self.materials_path)?,
            modified(&self.borders_path)?,
        );

        let mut guard = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(cached) = guard.as_ref()
            && cached.stamp == stamp
        {
            return Ok(Arc::clone(&cached.table));
        }

        let table = Arc::new(self.load()?);
        debug!(
            materials = table.materials.len(),
            borders = table.borders.len(),
            "rate table reloaded"
        );
        *guard = Some(CachedRates {
            stamp,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// Drop the cached snapshot; the next [`RateLoader::snapshot`] reloads.
    pub fn invalidate(&self) {
        let mut guard = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    fn load(&self) -> Result<RateTable, RateError> {
        let materials = load_materials(&self.materials_path)?;
        let borders = load_borders(&self.borders_path, &materials)?;
        Ok(RateTable { materials, borders })
    }
}

fn modified(path: &Path) -> Result<SystemTime, RateError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| RateError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

fn open(path: &Path) -> Result<csv::Reader<fs::File>, RateError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| RateError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Find a column index by any of its accepted header spellings.
fn column(
    headers: &csv::StringRecord,
    candidates: &[&str],
    path: &Path,
    column: &'static str,
) -> Result<usize, RateError> {
    headers
        .iter()
        .position(|header| {
            let header = header.trim().to_ascii_lowercase();
            candidates.iter().any(|c| header == *c)
        })
        .ok_or_else(|| RateError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
}

/// Parse a numeric rate cell; malformed cells become zero with a warning.
fn rate_cell(record: &csv::StringRecord, idx: usize, context: &str) -> Decimal {
    let raw = record.get(idx).unwrap_or_default();
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    cleaned.parse().unwrap_or_else(|_| {
        warn!(cell = raw, row = context, "malformed rate cell, defaulting to 0");
        Decimal::ZERO
    })
}

fn load_materials(path: &Path) -> Result<Vec<NetMaterialRate>, RateError> {
    let mut reader = open(path)?;
    let headers = reader
        .headers()
        .map_err(|source| RateError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let name_idx = column(&headers, &["material", "name", "component", "item"], path, "material")?;
    let retail_idx = column(&headers, &["retail", "retail price", "price"], path, "retail")?;
    let wholesale_idx = column(&headers, &["wholesale", "wholesale price"], path, "wholesale")?;
    let weight_idx = column(&headers, &["weight", "lbs", "weight per sq ft"], path, "weight")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| RateError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let name = record.get(name_idx).unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }
        rows.push(NetMaterialRate {
            name: name.to_owned(),
            retail_per_sqft: rate_cell(&record, retail_idx, name),
            wholesale_per_sqft: rate_cell(&record, wholesale_idx, name),
            weight_per_sqft: rate_cell(&record, weight_idx, name),
        });
    }
    Ok(rows)
}

fn load_borders(
    path: &Path,
    weight_table: &[NetMaterialRate],
) -> Result<Vec<BorderOption>, RateError> {
    let mut reader = open(path)?;
    let headers = reader
        .headers()
        .map_err(|source| RateError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let name_idx = column(&headers, &["border", "border type", "type", "name"], path, "border")?;
    let cost_idx = column(&headers, &["cost", "cost per ft", "price", "multiplier"], path, "cost")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| RateError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let name = record.get(name_idx).unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }
        rows.push(BorderOption {
            name: name.to_owned(),
            cost_per_ft: rate_cell(&record, cost_idx, name),
            weight_per_ft: border_weight(name, weight_table),
        });
    }

    // The weight table may know "No Border" even when the borders sheet
    // doesn't list it; customers can always decline edge reinforcement.
    let has_no_border = rows.iter().any(|b| b.name.eq_ignore_ascii_case(NO_BORDER));
    if !has_no_border
        && let Some(row) = weight_row(weight_table, NO_BORDER)
    {
        rows.push(BorderOption {
            name: row.name.clone(),
            cost_per_ft: Decimal::ZERO,
            weight_per_ft: row.weight_per_sqft,
        });
    }

    Ok(rows)
}

/// Border weight per linear foot, resolved by name from the materials sheet.
///
/// `Lead Rope` falls back to the `Lead Rope (Bottom)` row when no direct
/// match exists; anything else unknown weighs zero.
fn border_weight(name: &str, weight_table: &[NetMaterialRate]) -> Decimal {
    if let Some(row) = weight_row(weight_table, name) {
        return row.weight_per_sqft;
    }
    if name.eq_ignore_ascii_case(LEAD_ROPE)
        && let Some(row) = weight_row(weight_table, LEAD_ROPE_BOTTOM)
    {
        return row.weight_per_sqft;
    }
    Decimal::ZERO
}

fn weight_row<'a>(table: &'a [NetMaterialRate], name: &str) -> Option<&'a NetMaterialRate> {
    table
        .iter()
        .find(|row| row.name.eq_ignore_ascii_case(name.trim()))
}
