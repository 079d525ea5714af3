//! Feature table and the contract every feature stage follows.
//!
//! Stages never touch a table. They borrow the price series, return a fresh
//! [`FeatureBlock`], and the table is extended by value with
//! [`FeatureTable::with_block`]. A table handed to a caller is never mutated
//! behind its back, and stages can run side by side on one series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::window::{count_missing, is_missing};
use crate::data::PriceSeries;
use crate::error::{FeatureError, Result};

/// One named feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn missing_count(&self) -> usize {
        count_missing(&self.values)
    }
}

/// Ordered columns produced by one stage
pub type FeatureBlock = Vec<FeatureColumn>;

/// A pure transformation from bars to feature columns.
pub trait FeatureStage: Send + Sync {
    /// Stage name used in logs
    fn name(&self) -> &'static str;

    /// Names of the columns [`FeatureStage::compute`] returns, in order
    fn column_names(&self) -> Vec<String>;

    /// Compute the stage's columns; the value at row `i` reads rows `..=i` only
    fn compute(&self, series: &PriceSeries) -> FeatureBlock;
}

/// A price series together with the feature columns derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    series: PriceSeries,
    columns: Vec<FeatureColumn>,
}

/// One row of a [`FeatureTable`], missing features serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub features: BTreeMap<String, Option<f64>>,
}

impl FeatureTable {
    /// A table with base columns only
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            columns: Vec::new(),
        }
    }

    /// Append a stage's columns, returning the extended table
    pub fn with_block(mut self, block: FeatureBlock) -> Result<Self> {
        for column in block {
            self.push_column(column)?;
        }
        Ok(self)
    }

    fn push_column(&mut self, column: FeatureColumn) -> Result<()> {
        if column.values.len() != self.series.len() {
            return Err(FeatureError::LengthMismatch {
                column: column.name,
                expected: self.series.len(),
                actual: column.values.len(),
            });
        }
        if self.column(&column.name).is_some() {
            return Err(FeatureError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Feature column by name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Missing values in a feature column, `None` for an unknown name
    pub fn missing_count(&self, name: &str) -> Option<usize> {
        self.column(name).map(count_missing)
    }

    /// Whether any feature holds a positive or negative infinity
    pub fn has_infinite(&self) -> bool {
        self.columns
            .iter()
            .any(|column| column.values.iter().any(|v| v.is_infinite()))
    }

    /// Row `index` with base prices and every feature
    pub fn row(&self, index: usize) -> Option<FeatureRow> {
        let bar = self.series.get(index)?;
        let features = self
            .columns
            .iter()
            .map(|column| {
                let value = column.values[index];
                let value = if is_missing(value) { None } else { Some(value) };
                (column.name.clone(), value)
            })
            .collect();

        Some(FeatureRow {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            features,
        })
    }

    pub fn rows(&self) -> Vec<FeatureRow> {
        (0..self.len()).filter_map(|index| self.row(index)).collect()
    }

    /// Keep only rows where every feature is present.
    ///
    /// The warm-up rows at the head of the series are the usual casualties.
    pub fn drop_missing(&self) -> FeatureTable {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.columns.iter().all(|column| !is_missing(column.values[i])))
            .collect();

        let series = keep
            .iter()
            .filter_map(|&i| self.series.get(i).cloned())
            .collect::<PriceSeries>();
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = keep.iter().map(|&i| column.values[i]).collect();
                FeatureColumn::new(column.name.clone(), values)
            })
            .collect();

        FeatureTable { series, columns }
    }
}
