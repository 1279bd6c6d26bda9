//! Average True Range volatility estimation.

use crate::error::EngineError;
use crate::models::Bar;

/// Compute the Average True Range over the most recent `period` bars.
///
/// True range for bar i is `max(high - low, |high - prev_close|,
/// |low - prev_close|)`; the first bar has no prior close and uses its
/// own high-low range. The ATR is the arithmetic mean of the last
/// `period` true ranges.
///
/// Requires `bars.len() >= period + 1` so every averaged true range has
/// a prior close available.
pub fn compute_atr(bars: &[Bar], period: usize) -> Result<f64, EngineError> {
    if period == 0 {
        return Err(EngineError::InvalidConfiguration(
            "ATR period must be positive".to_string(),
        ));
    }
    if bars.len() < period + 1 {
        return Err(EngineError::InsufficientData {
            needed: period + 1,
            got: bars.len(),
        });
    }

    let true_ranges: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                let prev_close = bars[i - 1].close;
                bar.range()
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            }
        })
        .collect();

    let recent = &true_ranges[true_ranges.len() - period..];
    Ok(recent.iter().sum::<f64>() / period as f64)
}
