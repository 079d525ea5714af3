//! Trend features: simple moving averages, their slopes and the distance of
//! the close from the mid average.

use super::table::{FeatureBlock, FeatureColumn, FeatureStage};
use super::window::{diff, is_missing, rolling_mean, scrub_infinite, MISSING};
use crate::data::PriceSeries;

pub const DEFAULT_SMA_FAST: usize = 5;
pub const DEFAULT_SMA_MID: usize = 20;
pub const DEFAULT_SMA_SLOW: usize = 50;

/// Trend stage over three SMA windows.
///
/// The windows are only labels: nothing checks `fast < mid < slow`, so
/// swapping them swaps which columns react fastest. The pipeline can be told
/// to reject unordered windows. Equal windows share one set of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendFeatures {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
}

impl TrendFeatures {
    pub fn new(fast: usize, mid: usize, slow: usize) -> Self {
        Self { fast, mid, slow }
    }

    /// Distinct windows in fast, mid, slow order
    fn windows(&self) -> Vec<usize> {
        let mut windows = Vec::with_capacity(3);
        for w in [self.fast, self.mid, self.slow] {
            if !windows.contains(&w) {
                windows.push(w);
            }
        }
        windows
    }

    /// Whether the windows are strictly increasing
    pub fn is_ordered(&self) -> bool {
        self.fast < self.mid && self.mid < self.slow
    }
}

impl Default for TrendFeatures {
    fn default() -> Self {
        Self::new(DEFAULT_SMA_FAST, DEFAULT_SMA_MID, DEFAULT_SMA_SLOW)
    }
}

/// Relative distance of the close from an average, missing where the
/// average is missing or zero
fn distance(close: &[f64], average: &[f64]) -> Vec<f64> {
    close
        .iter()
        .zip(average)
        .map(|(&c, &avg)| {
            if is_missing(avg) || avg == 0.0 {
                MISSING
            } else {
                (c - avg) / avg
            }
        })
        .collect()
}

impl FeatureStage for TrendFeatures {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn column_names(&self) -> Vec<String> {
        let windows = self.windows();
        windows
            .iter()
            .map(|w| format!("sma_{w}"))
            .chain(windows.iter().map(|w| format!("sma_{w}_slope")))
            .chain(std::iter::once(format!("sma_{}_distance", self.mid)))
            .collect()
    }

    fn compute(&self, series: &PriceSeries) -> FeatureBlock {
        let close = series.close();

        // sums of huge finite prices can overflow before the division
        let averages: Vec<(usize, Vec<f64>)> = self
            .windows()
            .into_iter()
            .map(|w| {
                let mut sma = rolling_mean(&close, w);
                scrub_infinite(&mut sma);
                (w, sma)
            })
            .collect();

        let slopes: Vec<FeatureColumn> = averages
            .iter()
            .map(|(w, sma)| FeatureColumn::new(format!("sma_{w}_slope"), diff(sma, 1)))
            .collect();

        let mid_average = averages
            .iter()
            .find(|(w, _)| *w == self.mid)
            .map(|(_, sma)| sma.as_slice())
            .unwrap_or_default();
        let mid_distance = FeatureColumn::new(
            format!("sma_{}_distance", self.mid),
            distance(&close, mid_average),
        );

        let mut block: FeatureBlock = averages
            .into_iter()
            .map(|(w, sma)| FeatureColumn::new(format!("sma_{w}"), sma))
            .chain(slopes)
            .chain(std::iter::once(mid_distance))
            .collect();
        for column in &mut block {
            scrub_infinite(&mut column.values);
        }
        block
    }
}
