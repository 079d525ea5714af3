//! Sources of raw bars.
//!
//! Fetching from a market-data provider happens outside this crate. A
//! [`BarSource`] is the seam where already downloaded bars enter the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use super::object::PriceBar;
use super::series::PriceSeries;
use crate::error::{FeatureError, Result};

/// Keys accepted for the bar date, first is canonical
const DATE_FIELDS: [&str; 2] = ["timestamp", "date"];

/// Price and volume keys every bar object must carry
const PRICE_FIELDS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Anything able to hand over a series of daily bars.
pub trait BarSource {
    /// Load the bars; order is not required, the pipeline normalizes it
    fn load(&self) -> Result<PriceSeries>;
}

/// Bars stored as a JSON array of objects.
#[derive(Debug, Clone)]
pub struct JsonBarSource {
    path: PathBuf,
}

impl JsonBarSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BarSource for JsonBarSource {
    fn load(&self) -> Result<PriceSeries> {
        let content = fs::read_to_string(&self.path)?;
        let records: Vec<Map<String, Value>> = serde_json::from_str(&content)?;
        let bars = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| bar_from_record(row, record))
            .collect::<Result<Vec<_>>>()?;
        info!(path = %self.path.display(), rows = bars.len(), "loaded bars");
        Ok(PriceSeries::new(bars))
    }
}

/// Check a JSON object for the bar fields before handing it to serde
fn bar_from_record(row: usize, record: Map<String, Value>) -> Result<PriceBar> {
    if !DATE_FIELDS.iter().any(|key| record.contains_key(*key)) {
        return Err(FeatureError::MissingColumn(DATE_FIELDS[0].to_string()));
    }
    for field in PRICE_FIELDS {
        match record.get(field) {
            None => return Err(FeatureError::MissingColumn(field.to_string())),
            Some(value) if !value.is_number() => {
                return Err(FeatureError::NonNumeric {
                    column: field.to_string(),
                    row,
                })
            }
            Some(_) => {}
        }
    }
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Bars already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBarSource {
    bars: Vec<PriceBar>,
}

impl MemoryBarSource {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }
}

impl BarSource for MemoryBarSource {
    fn load(&self) -> Result<PriceSeries> {
        Ok(PriceSeries::new(self.bars.clone()))
    }
}

/// Write bars as a JSON array, the format read by [`JsonBarSource`]
pub fn save_bars_json(path: impl AsRef<Path>, series: &PriceSeries) -> Result<()> {
    let json = serde_json::to_string_pretty(series)?;
    fs::write(path, json)?;
    Ok(())
}
