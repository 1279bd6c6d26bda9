//! Risk configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Immutable risk parameters, set once at engine construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Nominal fraction of cash eligible for risk, in (0, 1].
    /// Halved in conservative mode (descriptive; the enforced clamp is
    /// `max_loss_per_trade`).
    pub risk_cap: f64,

    /// Take-profit distance as a multiple of ATR, > 0
    pub atr_multiple_tp: f64,

    /// Order stop-loss distance as a multiple of ATR, > 0
    pub atr_multiple_sl: f64,

    /// Hard cap on loss per trade as a fraction of cash, in (0, 1]
    pub max_loss_per_trade: f64,

    /// Sentiment confidence a signal must strictly exceed to enter
    pub probability_threshold: f64,

    /// Fraction of initial cash below which conservative mode engages,
    /// in (0, 1]
    pub conservative_threshold: f64,

    /// Turbulence level above which trading halts and positions are
    /// liquidated, > 0
    pub turbulence_threshold: f64,

    /// Assumed reward/risk ratio `b` in the Kelly fraction, > 0
    pub kelly_reward_risk: f64,

    /// Confidence level for VaR/CVaR, in (0, 1)
    pub confidence_level: f64,

    /// ATR lookback window in bars
    pub atr_period: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_cap: 0.8,
            atr_multiple_tp: 6.0,
            atr_multiple_sl: 3.0,
            max_loss_per_trade: 0.02, // 2% max loss per trade
            probability_threshold: 0.95,
            conservative_threshold: 0.5,
            turbulence_threshold: 3.0,
            kelly_reward_risk: 2.0,
            confidence_level: 0.95,
            atr_period: 14,
        }
    }
}

impl RiskConfig {
    /// Reject out-of-range parameters before the engine is built.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn check(ok: bool, msg: &str) -> Result<(), EngineError> {
            if ok {
                Ok(())
            } else {
                Err(EngineError::InvalidConfiguration(msg.to_string()))
            }
        }

        check(
            self.risk_cap > 0.0 && self.risk_cap <= 1.0,
            "risk_cap must be in (0, 1]",
        )?;
        check(self.atr_multiple_tp > 0.0, "atr_multiple_tp must be > 0")?;
        check(self.atr_multiple_sl > 0.0, "atr_multiple_sl must be > 0")?;
        check(
            self.max_loss_per_trade > 0.0 && self.max_loss_per_trade <= 1.0,
            "max_loss_per_trade must be in (0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.probability_threshold),
            "probability_threshold must be in [0, 1]",
        )?;
        check(
            self.conservative_threshold > 0.0 && self.conservative_threshold <= 1.0,
            "conservative_threshold must be in (0, 1]",
        )?;
        check(
            self.turbulence_threshold > 0.0,
            "turbulence_threshold must be > 0",
        )?;
        check(self.kelly_reward_risk > 0.0, "kelly_reward_risk must be > 0")?;
        check(
            self.confidence_level > 0.0 && self.confidence_level < 1.0,
            "confidence_level must be in (0, 1)",
        )?;
        check(self.atr_period > 0, "atr_period must be > 0")?;

        Ok(())
    }
}
