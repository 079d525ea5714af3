//! The feature pipeline: normalize, validate, then run the three stages.
//!
//! The return, trend and volatility stages read base prices only and write
//! disjoint columns, so they can run in any order. With
//! [`FeatureSettings::parallel`] they are spread over the rayon pool and
//! joined before the table is assembled.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::returns::ReturnFeatures;
use super::table::{FeatureBlock, FeatureStage, FeatureTable};
use super::trend::TrendFeatures;
use super::volatility::VolatilityFeatures;
use crate::data::{normalize, PriceSeries};
use crate::error::{FeatureError, Result};
use crate::setting::FeatureSettings;

/// Runs every feature stage over a price series.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    settings: FeatureSettings,
    returns: ReturnFeatures,
    trend: TrendFeatures,
    volatility: VolatilityFeatures,
}

impl FeaturePipeline {
    /// Build a pipeline, checking the window parameters
    pub fn new(settings: FeatureSettings) -> Result<Self> {
        let windows = [
            ("sma_fast", settings.sma_fast),
            ("sma_mid", settings.sma_mid),
            ("sma_slow", settings.sma_slow),
            ("vol_window", settings.vol_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(FeatureError::InvalidWindow {
                    name: name.to_string(),
                    value,
                });
            }
        }

        let trend = TrendFeatures::new(settings.sma_fast, settings.sma_mid, settings.sma_slow);
        if !trend.is_ordered() {
            if settings.strict_window_order {
                return Err(FeatureError::WindowOrder {
                    fast: trend.fast,
                    mid: trend.mid,
                    slow: trend.slow,
                });
            }
            warn!(
                fast = trend.fast,
                mid = trend.mid,
                slow = trend.slow,
                "trend windows are not ordered fast < mid < slow"
            );
        }

        Ok(Self {
            returns: ReturnFeatures::new(),
            trend,
            volatility: VolatilityFeatures::new(settings.vol_window),
            settings,
        })
    }

    pub fn settings(&self) -> &FeatureSettings {
        &self.settings
    }

    fn stages(&self) -> [&dyn FeatureStage; 3] {
        [&self.returns, &self.trend, &self.volatility]
    }

    /// Output columns in table order
    pub fn column_names(&self) -> Vec<String> {
        self.stages()
            .iter()
            .flat_map(|stage| stage.column_names())
            .collect()
    }

    /// Sort, validate and compute every feature.
    ///
    /// The returned table owns a normalized copy of the bars; the feature at
    /// row `i` depends only on rows `..=i`.
    pub fn run(&self, series: PriceSeries) -> Result<FeatureTable> {
        let start = Instant::now();
        let series = normalize(series);
        series.validate()?;

        let (returns, (trend, volatility)) = if self.settings.parallel {
            rayon::join(
                || timed(&self.returns, &series),
                || {
                    rayon::join(
                        || timed(&self.trend, &series),
                        || timed(&self.volatility, &series),
                    )
                },
            )
        } else {
            (
                timed(&self.returns, &series),
                (timed(&self.trend, &series), timed(&self.volatility, &series)),
            )
        };

        let rows = series.len();
        let table = FeatureTable::new(series)
            .with_block(returns)?
            .with_block(trend)?
            .with_block(volatility)?;

        info!(
            rows,
            columns = table.columns().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "features computed"
        );
        Ok(table)
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        let settings = FeatureSettings::default();
        Self {
            returns: ReturnFeatures::new(),
            trend: TrendFeatures::new(settings.sma_fast, settings.sma_mid, settings.sma_slow),
            volatility: VolatilityFeatures::new(settings.vol_window),
            settings,
        }
    }
}

fn timed(stage: &dyn FeatureStage, series: &PriceSeries) -> FeatureBlock {
    let start = Instant::now();
    let block = stage.compute(series);
    debug!(
        stage = stage.name(),
        columns = block.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "stage finished"
    );
    block
}
