//! Signal Features - point-in-time safe features from daily OHLCV bars
//!
//! This crate turns a table of daily price bars into the numeric inputs of a
//! signal classifier:
//!
//! - Momentum: 1/5/10-row returns and a rolling z-score of the daily return
//! - Trend: fast/mid/slow simple moving averages, slopes and distance from the mid SMA
//! - Volatility: rolling standard deviation, True Range and ATR(14)
//! - Polars interchange (with the `frame` feature)
//!
//! Every feature at row `i` reads rows `..=i` only. Values that cannot be
//! computed (short history, zero variance, division by zero) are `NaN`, never
//! an infinity and never an error. Broken input (missing columns, non-numeric
//! prices, duplicate dates) is an error.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use signal_features::{FeaturePipeline, FeatureSettings, JsonBarSource, BarSource};
//!
//! fn main() -> signal_features::Result<()> {
//!     let bars = JsonBarSource::new("bars.json").load()?;
//!     let pipeline = FeaturePipeline::new(FeatureSettings::default())?;
//!     let table = pipeline.run(bars)?;
//!     println!("{:?}", table.column("ret_z20"));
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod features;
pub mod logger;
pub mod setting;

#[cfg(feature = "frame")]
pub mod frame;

// Re-export commonly used types
pub use data::{normalize, BarSource, JsonBarSource, MemoryBarSource, PriceBar, PriceSeries};
pub use error::{FeatureError, Result};
pub use features::{
    is_missing, FeatureColumn, FeaturePipeline, FeatureRow, FeatureStage, FeatureTable,
    ReturnFeatures, TrendFeatures, VolatilityFeatures, ATR_WINDOW, MISSING,
};
pub use logger::init_logger;
pub use setting::{project_path, FeatureSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
