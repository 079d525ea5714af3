//! Basic data structures for daily price bars.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::{Close, High, Low, Open, Volume};

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(alias = "date")]
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    /// Carried along for callers, never read by the feature stages
    #[serde(default, alias = "adj close", skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
}

impl PriceBar {
    /// Create a new PriceBar
    pub fn new(
        timestamp: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        }
    }

    /// Set the adjusted close
    pub fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    /// Intraday range, the floor of the True Range
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Whether open and close sit inside the [low, high] envelope
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

impl Open for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }
}

impl High for PriceBar {
    fn high(&self) -> f64 {
        self.high
    }
}

impl Low for PriceBar {
    fn low(&self) -> f64 {
        self.low
    }
}

impl Close for PriceBar {
    fn close(&self) -> f64 {
        self.close
    }
}

impl Volume for PriceBar {
    fn volume(&self) -> f64 {
        self.volume
    }
}
