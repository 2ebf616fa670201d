//! CSV catalog loader.
//!
//! One file per category. Failures are recorded per category on the
//! returned [`Catalog`] instead of aborting the whole load, so a missing
//! cooler file only disables the assemblers that need coolers.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

use rigsmith_core::domain::normalize_key;
use rigsmith_core::{Catalog, Category, Feature, MissingCategoryError, PartRecord, RngHierarchy};

/// Columns every category file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "price", "image"];

/// Synthesized mainboard port ranges (half-open).
const SATA_PORTS: std::ops::Range<u32> = 4..8;
const PCIE_SLOTS: std::ops::Range<u32> = 2..5;
const USB_PORTS: std::ops::Range<u32> = 6..12;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory not found: {0}")]
    DataDirNotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// File name per category, relative to the data directory.
    pub part_files: BTreeMap<Category, String>,
    /// Seed for synthesized mainboard port counts.
    pub synth_seed: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            part_files: default_part_files(),
            synth_seed: 42,
        }
    }
}

pub fn default_part_files() -> BTreeMap<Category, String> {
    [
        (Category::Cpu, "CPU.csv"),
        (Category::Gpu, "GPU.csv"),
        (Category::Mainboard, "Motherboard.csv"),
        (Category::Memory, "Memory.csv"),
        (Category::Storage, "Storage.csv"),
        (Category::PowerSupply, "PSU.csv"),
        (Category::Case, "Case.csv"),
        (Category::Cooler, "Cooler.csv"),
    ]
    .into_iter()
    .map(|(c, f)| (c, f.to_string()))
    .collect()
}

/// Load every category listed in `options.part_files` from `dir`.
pub fn load_catalog(dir: &Path, options: &LoadOptions) -> Result<Catalog, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DataDirNotFound(dir.to_path_buf()));
    }

    let rng_hierarchy = RngHierarchy::new(options.synth_seed);
    let mut catalog = Catalog::new();

    for category in Category::ALL {
        let Some(file) = options.part_files.get(&category) else {
            catalog.record_missing(
                category,
                MissingCategoryError::NotFound {
                    path: format!("<no file configured for {category}>"),
                },
            );
            continue;
        };
        let path = dir.join(file);

        let result = std::fs::File::open(&path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MissingCategoryError::NotFound {
                        path: path.display().to_string(),
                    }
                } else {
                    MissingCategoryError::Unreadable {
                        reason: format!("{}: {e}", path.display()),
                    }
                }
            })
            .and_then(|f| read_category(category, f));

        match result {
            Ok((mut records, present)) => {
                if category == Category::Mainboard {
                    let mut rng = rng_hierarchy.rng_for("mainboard-ports", 0);
                    for record in &mut records {
                        synthesize_ports(record, &present, &mut rng);
                    }
                }
                let total = records.len();
                let dropped = catalog.insert_category(category, records);
                match catalog.require(category) {
                    Ok(kept) => tracing::info!(%category, records = kept.len(), "category loaded"),
                    Err(reason) => tracing::warn!(%category, total, dropped, %reason, "category unusable"),
                }
            }
            Err(reason) => {
                tracing::warn!(%category, %reason, "category not loaded");
                catalog.record_missing(category, reason);
            }
        }
    }

    Ok(catalog)
}

/// What a header column feeds.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    Name,
    Price,
    Image,
    Socket,
    FormFactor,
    Feature(Feature),
    Extra,
}

fn classify(category: Category, header: &str) -> Column {
    match normalize_key(header).as_str() {
        "name" => Column::Name,
        "price" => Column::Price,
        "image" => Column::Image,
        "socket" => Column::Socket,
        "formfactor" => Column::FormFactor,
        "size" if category == Category::Mainboard => Column::FormFactor,
        _ => Feature::from_str(header)
            .map(Column::Feature)
            .unwrap_or(Column::Extra),
    }
}

/// Parse one category file.
///
/// Rows without a usable price (non-numeric, NaN, infinite, negative) are
/// dropped here; a file where every row is dropped is `Empty`.
pub fn parse_category<R: Read>(category: Category, reader: R) -> Result<Vec<PartRecord>, MissingCategoryError> {
    read_category(category, reader).map(|(records, _)| records)
}

/// Parsed records plus the typed features the file has a column for.
fn read_category<R: Read>(
    category: Category,
    reader: R,
) -> Result<(Vec<PartRecord>, Vec<Feature>), MissingCategoryError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| MissingCategoryError::Unreadable { reason: e.to_string() })?
        .iter()
        .map(str::to_string)
        .collect();
    let columns: Vec<Column> = headers.iter().map(|h| classify(category, h)).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .zip([Column::Name, Column::Price, Column::Image])
        .filter(|(_, col)| !columns.contains(col))
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MissingCategoryError::MissingColumns { columns: missing });
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (row, result) in rdr.records().enumerate() {
        let row_data = result.map_err(|e| MissingCategoryError::Unreadable { reason: e.to_string() })?;

        let mut record = PartRecord::new(category, String::new(), f64::NAN);
        for ((header, column), cell) in headers.iter().zip(&columns).zip(row_data.iter()) {
            match column {
                Column::Name => record.name = cell.to_string(),
                Column::Price => record.price = parse_price(cell).unwrap_or(f64::NAN),
                Column::Image => record.image = cell.to_string(),
                Column::Socket => record.socket = non_empty(cell),
                Column::FormFactor => record.form_factor = non_empty(cell),
                Column::Feature(Feature::Price) => {}
                Column::Feature(feature) => match parse_number(cell) {
                    Some(value) => record.set_feature(*feature, Some(value)),
                    None => {
                        if !cell.is_empty() {
                            record.extra.insert(header.clone(), cell.to_string());
                        }
                    }
                },
                Column::Extra => {
                    record.extra.insert(header.clone(), cell.to_string());
                }
            }
        }

        if record.has_valid_price() {
            records.push(record);
        } else {
            tracing::debug!(%category, row, name = %record.name, "row dropped: unusable price");
            dropped += 1;
        }
    }

    if records.is_empty() {
        return Err(MissingCategoryError::Empty);
    }
    if dropped > 0 {
        tracing::warn!(%category, dropped, "rows dropped for unusable price");
    }

    let present = columns
        .iter()
        .filter_map(|c| match c {
            Column::Feature(feature) => Some(*feature),
            _ => None,
        })
        .collect();
    Ok((records, present))
}

/// `$1,299.99` → `1299.99`.
fn parse_price(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| !matches!(c, '$' | ',')).collect();
    cleaned.parse::<f64>().ok()
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(cell: &str) -> Option<String> {
    (!cell.is_empty()).then(|| cell.to_string())
}

/// Draw mainboard port counts for the port columns the file lacks.
///
/// A column that exists keeps whatever its cell held, even when that cell
/// was empty or non-numeric.
fn synthesize_ports(record: &mut PartRecord, present: &[Feature], rng: &mut impl Rng) {
    for (feature, range) in [
        (Feature::SataPorts, SATA_PORTS),
        (Feature::PcieSlots, PCIE_SLOTS),
        (Feature::UsbPorts, USB_PORTS),
    ] {
        if !present.contains(&feature) {
            record.set_feature(feature, Some(rng.gen_range(range) as f64));
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
