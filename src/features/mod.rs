//! Feature module - engineered columns for the signal classifier.
//!
//! - **window**: positional rolling statistics and the missing sentinel
//! - **table**: the [`FeatureTable`] and the [`FeatureStage`] contract
//! - **returns**: `ret1`, `ret5`, `ret10`, `ret_z20`
//! - **trend**: SMAs, their slopes and the distance from the mid SMA
//! - **volatility**: rolling deviation, True Range and ATR
//! - **pipeline**: the [`FeaturePipeline`] running all of the above

pub mod pipeline;
pub mod returns;
pub mod table;
pub mod trend;
pub mod volatility;
pub mod window;

pub use pipeline::FeaturePipeline;
pub use returns::{ReturnFeatures, RETURN_HORIZONS, ZSCORE_WINDOW};
pub use table::{FeatureBlock, FeatureColumn, FeatureRow, FeatureStage, FeatureTable};
pub use trend::TrendFeatures;
pub use volatility::{true_range, VolatilityFeatures, ATR_WINDOW};
pub use window::{is_missing, MISSING};
