//! Return features from the close price.
//!
//! - `ret1`, `ret5`, `ret10`: fractional change over 1, 5 and 10 rows
//! - `ret_z20`: how extreme today's `ret1` is against the 20 most recent
//!   `ret1` values, today included. Above 2 flags an unusually strong up day,
//!   below -2 a strong down day.

use super::table::{FeatureBlock, FeatureColumn, FeatureStage};
use super::window::{pct_change, rolling_zscore, scrub_infinite};
use crate::data::PriceSeries;

/// Horizons of the plain return columns
pub const RETURN_HORIZONS: [usize; 3] = [1, 5, 10];

/// Number of one-row returns in the z-score window
pub const ZSCORE_WINDOW: usize = 20;

/// Momentum stage: percentage returns and the normalized one-row return.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnFeatures;

impl ReturnFeatures {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureStage for ReturnFeatures {
    fn name(&self) -> &'static str {
        "returns"
    }

    fn column_names(&self) -> Vec<String> {
        RETURN_HORIZONS
            .iter()
            .map(|k| format!("ret{k}"))
            .chain(std::iter::once(format!("ret_z{ZSCORE_WINDOW}")))
            .collect()
    }

    fn compute(&self, series: &PriceSeries) -> FeatureBlock {
        let close = series.close();

        let mut block: FeatureBlock = RETURN_HORIZONS
            .iter()
            .map(|&k| FeatureColumn::new(format!("ret{k}"), pct_change(&close, k)))
            .collect();

        // ret1 at row 0 is missing, so the first full window ends at row 20
        let zscore = rolling_zscore(&block[0].values, ZSCORE_WINDOW);
        block.push(FeatureColumn::new(format!("ret_z{ZSCORE_WINDOW}"), zscore));
        for column in &mut block {
            scrub_infinite(&mut column.values);
        }
        block
    }
}
