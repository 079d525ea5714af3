//! Ordered container of daily bars.
//!
//! Every feature stage reads its inputs through [`PriceSeries`]. Windows are
//! positional: a window of `W` rows is the `W` most recent rows, whatever
//! their calendar spacing, so the series must be sorted and free of duplicate
//! timestamps before any feature is computed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::object::PriceBar;
use crate::error::{FeatureError, Result};

/// An ordered sequence of daily price bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series from bars in the given order
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceBar> {
        self.bars.iter()
    }

    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    /// The first `len` rows, used to recompute features as of an earlier row
    pub fn prefix(&self, len: usize) -> PriceSeries {
        let end = len.min(self.bars.len());
        Self::new(self.bars[..end].to_vec())
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.timestamp).collect()
    }

    pub fn open(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.open).collect()
    }

    pub fn high(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.high).collect()
    }

    pub fn low(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.low).collect()
    }

    pub fn close(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn volume(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.volume).collect()
    }

    /// Check the input contract that every feature stage relies on.
    ///
    /// Fails on non-finite prices or volume and on timestamps that are not
    /// strictly increasing. Bars outside their own OHLC envelope and
    /// non-positive prices are not repaired; they are only reported.
    pub fn validate(&self) -> Result<()> {
        let mut inconsistent = 0usize;
        let mut non_positive = 0usize;

        for (row, bar) in self.bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            for (column, value) in fields {
                if !value.is_finite() {
                    return Err(FeatureError::NonNumeric {
                        column: column.to_string(),
                        row,
                    });
                }
            }

            if !bar.is_consistent() {
                inconsistent += 1;
            }
            if bar.close <= 0.0 || bar.low <= 0.0 {
                non_positive += 1;
            }

            if row > 0 {
                let previous = self.bars[row - 1].timestamp;
                if bar.timestamp == previous {
                    return Err(FeatureError::DuplicateTimestamp {
                        timestamp: bar.timestamp,
                        row,
                    });
                }
                if bar.timestamp < previous {
                    return Err(FeatureError::NonMonotonic { row });
                }
            }
        }

        if inconsistent > 0 {
            warn!(rows = inconsistent, "bars with open/close outside the high-low range");
        }
        if non_positive > 0 {
            warn!(rows = non_positive, "bars with non-positive prices");
        }
        Ok(())
    }
}

impl From<Vec<PriceBar>> for PriceSeries {
    fn from(bars: Vec<PriceBar>) -> Self {
        Self::new(bars)
    }
}

impl FromIterator<PriceBar> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceBar>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
        PriceBar::new(date, close, close + 1.0, close - 1.0, close, 1_000.0)
    }

    #[test]
    fn test_columns_follow_row_order() {
        let series = PriceSeries::new(vec![bar(2, 10.0), bar(3, 11.0)]);
        assert_eq!(series.close(), vec![10.0, 11.0]);
        assert_eq!(series.high(), vec![11.0, 12.0]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_prefix_is_clamped() {
        let series = PriceSeries::new(vec![bar(2, 10.0), bar(3, 11.0)]);
        assert_eq!(series.prefix(1).len(), 1);
        assert_eq!(series.prefix(10).len(), 2);
    }

    #[test]
    fn test_validate_accepts_clean_series() {
        let series = PriceSeries::new(vec![bar(2, 10.0), bar(3, 11.0), bar(6, 12.0)]);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let series = PriceSeries::new(vec![bar(2, 10.0), bar(2, 11.0)]);
        assert!(matches!(
            series.validate(),
            Err(FeatureError::DuplicateTimestamp { row: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_descending() {
        let series = PriceSeries::new(vec![bar(3, 10.0), bar(2, 11.0)]);
        assert!(matches!(
            series.validate(),
            Err(FeatureError::NonMonotonic { row: 1 })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_price() {
        let mut broken = bar(3, 11.0);
        broken.close = f64::NAN;
        let series = PriceSeries::new(vec![bar(2, 10.0), broken]);
        match series.validate() {
            Err(FeatureError::NonNumeric { column, row }) => {
                assert_eq!(column, "close");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
