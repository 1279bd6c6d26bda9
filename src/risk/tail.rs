//! Tail-risk estimation: parametric VaR and empirical CVaR.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::EngineError;

/// Value at Risk at the given confidence level.
///
/// Fits a Normal distribution to the sample mean and population
/// standard deviation and returns its `(1 - confidence_level)`
/// quantile. Parametric rather than historical-quantile VaR, chosen for
/// stability with short return windows.
///
/// A typical result is negative (a loss quantile).
pub fn compute_var(returns: &[f64], confidence_level: f64) -> Result<f64, EngineError> {
    if returns.len() < 2 {
        return Err(EngineError::InsufficientData {
            needed: 2,
            got: returns.len(),
        });
    }
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return Err(EngineError::InvalidConfiguration(format!(
            "confidence level {confidence_level} outside (0, 1)"
        )));
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    // Normal::new rejects a zero (or non-finite) standard deviation.
    let dist = Normal::new(mean, std_dev).map_err(|_| EngineError::DegenerateSample)?;

    Ok(dist.inverse_cdf(1.0 - confidence_level))
}

/// Conditional VaR: the mean of all returns strictly below the VaR
/// threshold.
///
/// When no return falls below VaR (small or tightly clustered samples),
/// the VaR value itself is returned as the documented fallback, so the
/// result is always defined and never NaN.
pub fn compute_cvar(returns: &[f64], confidence_level: f64) -> Result<f64, EngineError> {
    let var = compute_var(returns, confidence_level)?;

    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r < var).collect();
    if tail.is_empty() {
        return Ok(var);
    }

    Ok(tail.iter().sum::<f64>() / tail.len() as f64)
}
