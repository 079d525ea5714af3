//! Pipeline parameters and their JSON file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::features::trend::{DEFAULT_SMA_FAST, DEFAULT_SMA_MID, DEFAULT_SMA_SLOW};
use crate::features::volatility::DEFAULT_VOL_WINDOW;

/// Setting filename looked up under the project root
pub const DEFAULT_SETTING_FILENAME: &str = "params.json";

/// Environment variable overriding the project root
pub const HOME_ENV: &str = "SIGNAL_FEATURES_HOME";

/// Window sizes and execution flags for [`crate::FeaturePipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    pub sma_fast: usize,
    pub sma_mid: usize,
    pub sma_slow: usize,
    pub vol_window: usize,

    /// Reject trend windows that are not strictly increasing
    pub strict_window_order: bool,

    /// Run the three feature stages on the rayon pool
    pub parallel: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            sma_fast: DEFAULT_SMA_FAST,
            sma_mid: DEFAULT_SMA_MID,
            sma_slow: DEFAULT_SMA_SLOW,
            vol_window: DEFAULT_VOL_WINDOW,
            strict_window_order: false,
            parallel: true,
        }
    }
}

impl FeatureSettings {
    /// Read settings from a JSON file; absent keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Like [`FeatureSettings::load`], falling back to defaults when the
    /// file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "setting file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Project root: `$SIGNAL_FEATURES_HOME` when set, else the working directory
pub fn project_root() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Join path components onto the project root
pub fn project_path<I, P>(parts: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    parts
        .into_iter()
        .fold(project_root(), |path, part| path.join(part))
}
