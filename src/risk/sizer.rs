//! Position sizing: Kelly criterion bounded by hard and tail-risk caps.

use tracing::debug;

use crate::error::EngineError;
use crate::models::OrderSide;
use crate::risk::tail::{compute_cvar, compute_var};
use crate::trading::RiskConfig;

/// Fixed price buffer added to the ATR distance for the sizing stop.
const SIZING_STOP_BUFFER: f64 = 0.02;

/// Output of one sizing run.
///
/// Carries two distinct stop distances on purpose: `sizing_stop` is the
/// ATR-plus-2%-buffer level used only to derive the share count, while
/// `stop_loss` is the `atr_multiple_sl` level the bracket order is
/// actually protected at. The two are intentionally not reconciled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingResult {
    /// Whole shares, rounded half-away-from-zero, never negative
    pub quantity: u64,

    /// Order-level take-profit price
    pub take_profit: f64,

    /// Order-level protective stop price
    pub stop_loss: f64,

    /// Internal stop level the risk-per-share was measured against
    pub sizing_stop: f64,
}

/// Calculator for Kelly-bounded bracket order sizes.
pub struct PositionSizer {
    config: RiskConfig,
}

impl PositionSizer {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Size a bracket entry for the given side.
    ///
    /// `loss_cap` is the effective max-loss fraction of cash for this
    /// cycle (the policy halves the configured value in conservative
    /// mode). The clamps apply in a fixed order: Kelly fraction, then
    /// the hard loss cap, then the VaR/CVaR tail caps, and finally the
    /// stop geometry converts risk dollars into shares.
    ///
    /// A Kelly fraction at or below zero means no edge: the result
    /// short-circuits to quantity 0 without running the tail-risk
    /// clamps, but still reports the bracket prices.
    pub fn size(
        &self,
        returns: &[f64],
        cash: f64,
        last_price: f64,
        atr: f64,
        win_probability: f64,
        side: OrderSide,
        loss_cap: f64,
    ) -> Result<SizingResult, EngineError> {
        let cfg = &self.config;

        // Bracket geometry is pure price arithmetic, mirrored for shorts.
        let (take_profit, stop_loss, sizing_stop) = match side {
            OrderSide::Buy => (
                last_price + cfg.atr_multiple_tp * atr,
                last_price - cfg.atr_multiple_sl * atr,
                last_price - atr - last_price * SIZING_STOP_BUFFER,
            ),
            OrderSide::Sell => (
                last_price - cfg.atr_multiple_tp * atr,
                last_price + cfg.atr_multiple_sl * atr,
                last_price + atr + last_price * SIZING_STOP_BUFFER,
            ),
        };

        // Kelly fraction: f* = (b*p - q) / b
        let b = cfg.kelly_reward_risk;
        let p = win_probability;
        let q = 1.0 - p;
        let kelly = (b * p - q) / b;

        if kelly <= 0.0 {
            debug!(kelly, win_probability, "no edge, sizing to zero");
            return Ok(SizingResult {
                quantity: 0,
                take_profit,
                stop_loss,
                sizing_stop,
            });
        }

        // Kelly risk in dollars, hard-capped at the loss-cap fraction.
        let risk_kelly = (cash * kelly).min(loss_cap * cash);

        // Tail-risk caps from the return distribution.
        let var = compute_var(returns, cfg.confidence_level)?;
        let cvar = compute_cvar(returns, cfg.confidence_level)?;
        let adjusted_risk = risk_kelly.min(var.abs() * cash).min(cvar.abs() * cash);

        let risk_per_share = (last_price - sizing_stop).abs();
        if risk_per_share <= 0.0 || !risk_per_share.is_finite() {
            return Err(EngineError::InvalidRiskGeometry(risk_per_share));
        }

        let quantity = (adjusted_risk / risk_per_share).round().max(0.0) as u64;

        debug!(
            kelly,
            risk_kelly,
            var,
            cvar,
            adjusted_risk,
            risk_per_share,
            quantity,
            "position sized"
        );

        Ok(SizingResult {
            quantity,
            take_profit,
            stop_loss,
            sizing_stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sizer() -> PositionSizer {
        PositionSizer::new(RiskConfig::default())
    }

    fn returns() -> Vec<f64> {
        vec![0.01, -0.02, 0.015, -0.03, 0.005, 0.02, -0.01, 0.0, 0.012, -0.025]
    }

    #[test]
    fn test_no_edge_sizes_to_zero() {
        let s = sizer();

        // b = 2 → break-even at p = 1/3; anything at or below it has no
        // edge, regardless of cash or volatility.
        for p in [0.0, 0.2, 1.0 / 3.0] {
            let result = s
                .size(&returns(), 1_000_000.0, 100.0, 2.0, p, OrderSide::Buy, 0.02)
                .unwrap();
            assert_eq!(result.quantity, 0);
        }
    }

    #[test]
    fn test_zero_size_still_reports_bracket() {
        let s = sizer();
        let result = s
            .size(&returns(), 50_000.0, 100.0, 2.0, 0.1, OrderSide::Buy, 0.02)
            .unwrap();

        assert_eq!(result.quantity, 0);
        assert_relative_eq!(result.take_profit, 112.0);
        assert_relative_eq!(result.stop_loss, 94.0);
    }

    #[test]
    fn test_risk_never_exceeds_loss_cap() {
        let s = sizer();
        let cash = 100_000.0;

        // Near-certain win drives the raw Kelly risk far above 2% of
        // cash; the hard cap must still bound quantity * risk_per_share.
        let result = s
            .size(&returns(), cash, 100.0, 2.0, 0.99, OrderSide::Buy, 0.02)
            .unwrap();

        let risk_per_share = 100.0 - result.sizing_stop;
        let dollars_at_risk = result.quantity as f64 * risk_per_share;
        // Rounding half-away-from-zero can add at most half a share.
        assert!(dollars_at_risk <= 0.02 * cash + risk_per_share / 2.0);
        assert!(result.quantity > 0);
    }

    #[test]
    fn test_tail_caps_bind_below_kelly() {
        let config = RiskConfig {
            max_loss_per_trade: 0.5,
            ..RiskConfig::default()
        };
        let s = PositionSizer::new(config);
        let cash = 100_000.0;

        let result = s
            .size(&returns(), cash, 100.0, 2.0, 0.99, OrderSide::Buy, 0.5)
            .unwrap();

        // With the hard cap loosened to 50%, the VaR/CVaR caps take
        // over; |CVaR| for this sample is a few percent, so risked
        // dollars stay well below the Kelly-implied amount.
        let var = compute_var(&returns(), 0.95).unwrap();
        let cvar = compute_cvar(&returns(), 0.95).unwrap();
        let tail_cap = var.abs().min(cvar.abs()) * cash;

        let risk_per_share = 100.0 - result.sizing_stop;
        let dollars_at_risk = result.quantity as f64 * risk_per_share;
        assert!(dollars_at_risk <= tail_cap + risk_per_share / 2.0);
    }

    #[test]
    fn test_short_geometry_mirrors_long() {
        let s = sizer();
        let long = s
            .size(&returns(), 50_000.0, 100.0, 2.0, 0.97, OrderSide::Buy, 0.02)
            .unwrap();
        let short = s
            .size(&returns(), 50_000.0, 100.0, 2.0, 0.97, OrderSide::Sell, 0.02)
            .unwrap();

        assert_relative_eq!(long.take_profit, 112.0);
        assert_relative_eq!(long.stop_loss, 94.0);
        assert_relative_eq!(short.take_profit, 88.0);
        assert_relative_eq!(short.stop_loss, 106.0);
        assert_eq!(long.quantity, short.quantity);
    }

    #[test]
    fn test_dual_stops_stay_distinct() {
        let s = sizer();
        let result = s
            .size(&returns(), 50_000.0, 100.0, 2.0, 0.97, OrderSide::Buy, 0.02)
            .unwrap();

        // Sizing stop: 100 - 2 - 100*0.02 = 96; order stop: 100 - 3*2 = 94.
        assert_relative_eq!(result.sizing_stop, 96.0);
        assert_relative_eq!(result.stop_loss, 94.0);
    }

    #[test]
    fn test_pathological_geometry_rejected() {
        let s = sizer();
        // A NaN ATR poisons the stop distance; the sizer must refuse
        // rather than emit a garbage share count.
        let err = s
            .size(&returns(), 50_000.0, 100.0, f64::NAN, 0.97, OrderSide::Buy, 0.02)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRiskGeometry(_)));
    }

    #[test]
    fn test_insufficient_returns_propagates() {
        let s = sizer();
        let err = s
            .size(&[0.01], 50_000.0, 100.0, 2.0, 0.97, OrderSide::Buy, 0.02)
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { needed: 2, got: 1 });
    }
}
