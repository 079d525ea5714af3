//! Volatility features: rolling deviation of the close and the Average True
//! Range.

use ta::indicators::TrueRange;
use ta::Next;

use super::table::{FeatureBlock, FeatureColumn, FeatureStage};
use super::window::{rolling_mean, rolling_std, scrub_infinite};
use crate::data::PriceSeries;

pub const DEFAULT_VOL_WINDOW: usize = 10;

/// ATR lookback, Wilder's 14 periods
pub const ATR_WINDOW: usize = 14;

/// Volatility stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilityFeatures {
    pub vol_window: usize,
}

impl VolatilityFeatures {
    pub fn new(vol_window: usize) -> Self {
        Self { vol_window }
    }
}

impl Default for VolatilityFeatures {
    fn default() -> Self {
        Self::new(DEFAULT_VOL_WINDOW)
    }
}

/// True Range per bar: the largest of high-low, |high - previous close| and
/// |low - previous close|.
///
/// The first bar has no previous close, its True Range is its high-low range.
pub fn true_range(series: &PriceSeries) -> Vec<f64> {
    let mut indicator = TrueRange::new();
    series.iter().map(|bar| indicator.next(bar)).collect()
}

impl FeatureStage for VolatilityFeatures {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn column_names(&self) -> Vec<String> {
        vec![
            format!("volatility_{}", self.vol_window),
            "tr".to_string(),
            format!("atr_{ATR_WINDOW}"),
            format!("atr_{ATR_WINDOW}_norm"),
        ]
    }

    fn compute(&self, series: &PriceSeries) -> FeatureBlock {
        let close = series.close();

        let volatility = rolling_std(&close, self.vol_window);
        let tr = true_range(series);
        // tr is defined from row 0, so atr is present from row ATR_WINDOW - 1
        let atr = rolling_mean(&tr, ATR_WINDOW);
        let atr_norm: Vec<f64> = atr.iter().zip(&close).map(|(a, c)| a / c).collect();

        let mut block = vec![
            FeatureColumn::new(format!("volatility_{}", self.vol_window), volatility),
            FeatureColumn::new("tr", tr),
            FeatureColumn::new(format!("atr_{ATR_WINDOW}"), atr),
            FeatureColumn::new(format!("atr_{ATR_WINDOW}_norm"), atr_norm),
        ];
        for column in &mut block {
            scrub_infinite(&mut column.values);
        }
        block
    }
}
