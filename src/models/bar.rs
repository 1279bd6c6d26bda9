//! Price bar model and return-series derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV price bar.
///
/// Bars arrive from the data provider in ascending time order with no
/// duplicate timestamps and are immutable for the cycle that fetched
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Traded volume over the bar
    pub volume: f64,
}

impl Bar {
    /// High-low range of the bar itself.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Derive fractional close-to-close returns: `r_t = close_t / close_{t-1} - 1`.
///
/// The result has `bars.len() - 1` entries (empty for fewer than two
/// bars). Callers needing variance-based statistics must check length
/// themselves; this function only derives the series.
pub fn close_returns(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect()
}
