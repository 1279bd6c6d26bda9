//! Typed errors for the decision core.
//!
//! The numeric components fail fast with one of these variants; the
//! driver layer wraps external failures in `anyhow` instead, so a
//! failed cycle can always be told apart from a bad data/config input.

use thiserror::Error;

/// Errors produced by the risk estimators, the position sizer, and the
/// decision policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Too few bars or returns for the requested window.
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Zero variance in the return series; VaR and turbulence are
    /// undefined. Never silently becomes infinity or NaN.
    #[error("degenerate sample: return series has zero variance")]
    DegenerateSample,

    /// Non-positive risk per share in position sizing.
    #[error("invalid risk geometry: risk per share {0} is not positive")]
    InvalidRiskGeometry(f64),

    /// Out-of-range risk parameter rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
