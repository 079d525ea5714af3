//! Data module - daily bars and their normalization.
//!
//! - **object**: the [`PriceBar`] record
//! - **series**: the ordered [`PriceSeries`] container and its contract check
//! - **clean**: chronological normalization
//! - **datafeed**: sources handing bars to the pipeline

pub mod clean;
pub mod datafeed;
pub mod object;
pub mod series;

pub use clean::normalize;
pub use datafeed::{save_bars_json, BarSource, JsonBarSource, MemoryBarSource};
pub use object::PriceBar;
pub use series::PriceSeries;
