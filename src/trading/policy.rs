//! Decision policy: the top-level per-cycle state transition.
//!
//! One call to [`DecisionEngine::decide`] turns a fresh (bars, signal,
//! account) triple into exactly one of hold, halt-and-liquidate, or a
//! bracketed entry intent. The engine keeps no cross-cycle state beyond
//! the initial cash fixed at construction.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::models::{close_returns, AccountSnapshot, Bar, OrderIntent, OrderSide, SentimentLabel, Signal};
use crate::risk::{compute_atr, compute_turbulence, PositionSizer};
use crate::trading::RiskConfig;

/// Why a cycle produced no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// Signal carried no direction
    NeutralSignal,
    /// Cash does not cover a single share
    InsufficientCash,
    /// Signal confidence did not strictly exceed the threshold
    BelowProbabilityThreshold,
    /// Sizing clamped the position to zero shares
    ZeroQuantity,
}

/// Outcome of one decision cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No action this cycle
    Hold { reason: HoldReason },
    /// Turbulence gate tripped: close everything in the symbol
    Liquidate { turbulence: f64 },
    /// Submit this bracket order
    Enter(OrderIntent),
}

/// Periodic trading decision engine for a single symbol.
pub struct DecisionEngine {
    symbol: String,
    config: RiskConfig,
    sizer: PositionSizer,
    initial_cash: Decimal,
}

impl DecisionEngine {
    /// Build an engine, rejecting out-of-range risk parameters.
    ///
    /// `initial_cash` anchors the drawdown check for the whole run.
    pub fn new(
        symbol: impl Into<String>,
        config: RiskConfig,
        initial_cash: Decimal,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            symbol: symbol.into(),
            sizer: PositionSizer::new(config.clone()),
            config,
            initial_cash,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Evaluate one trading cycle.
    ///
    /// Any estimator error is a hard stop for the cycle: no order is
    /// emitted and the error surfaces to the caller, which decides
    /// whether to retry next cycle.
    pub fn decide(
        &self,
        bars: &[Bar],
        signal: &Signal,
        account: &AccountSnapshot,
    ) -> Result<Decision, EngineError> {
        let cash = account.cash.to_f64().unwrap_or(0.0);
        let last_price = account.last_price.to_f64().unwrap_or(0.0);
        let initial_cash = self.initial_cash.to_f64().unwrap_or(0.0);

        // Drawdown below the conservative threshold halves the
        // per-trade loss cap handed to the sizer.
        let conservative = cash < initial_cash * self.config.conservative_threshold;
        let loss_cap = if conservative {
            info!(
                cash,
                initial_cash, "conservative mode: halving per-trade loss cap"
            );
            self.config.max_loss_per_trade / 2.0
        } else {
            self.config.max_loss_per_trade
        };

        let atr = compute_atr(bars, self.config.atr_period)?;
        let returns = close_returns(bars);

        let turbulence = compute_turbulence(&returns)?;
        if turbulence > self.config.turbulence_threshold {
            warn!(
                turbulence,
                threshold = self.config.turbulence_threshold,
                "turbulence gate tripped, halting and liquidating"
            );
            return Ok(Decision::Liquidate { turbulence });
        }

        let side = match signal.label {
            SentimentLabel::Positive => OrderSide::Buy,
            SentimentLabel::Negative => OrderSide::Sell,
            SentimentLabel::Neutral => {
                return Ok(Decision::Hold {
                    reason: HoldReason::NeutralSignal,
                })
            }
        };

        let sized = self.sizer.size(
            &returns,
            cash,
            last_price,
            atr,
            signal.probability,
            side,
            loss_cap,
        )?;

        if cash <= last_price {
            return Ok(Decision::Hold {
                reason: HoldReason::InsufficientCash,
            });
        }

        // Strict inequality: a probability exactly at the threshold
        // never triggers an entry.
        if signal.probability <= self.config.probability_threshold {
            return Ok(Decision::Hold {
                reason: HoldReason::BelowProbabilityThreshold,
            });
        }

        if sized.quantity == 0 {
            debug!(?side, "entry conditions met but sizing clamped to zero");
            return Ok(Decision::Hold {
                reason: HoldReason::ZeroQuantity,
            });
        }

        let take_profit = to_price(sized.take_profit)?;
        let stop_loss = to_price(sized.stop_loss)?;

        info!(
            symbol = %self.symbol,
            side = side.as_str(),
            quantity = sized.quantity,
            %take_profit,
            %stop_loss,
            turbulence,
            conservative,
            "entry decided"
        );

        Ok(Decision::Enter(OrderIntent {
            symbol: self.symbol.clone(),
            side,
            quantity: sized.quantity,
            take_profit,
            stop_loss,
        }))
    }
}

/// Convert a computed price level to a broker-ready decimal.
fn to_price(value: f64) -> Result<Decimal, EngineError> {
    Decimal::try_from(value)
        .map(|d| d.round_dp(2))
        .map_err(|_| EngineError::InvalidRiskGeometry(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    /// Bars with a true range pinned at exactly 2.0 (high = close + 1,
    /// low = close - 1, close steps under 1.0) and non-constant
    /// returns, so ATR = 2.0 and turbulence = 1.0.
    fn fixture_bars(n: usize) -> Vec<Bar> {
        let start = Utc::now() - Duration::days(n as i64);
        let steps = [0.5, -0.7, 0.3, -0.2, 0.6, -0.4];
        let mut close = 100.0;

        (0..n)
            .map(|i| {
                close += steps[i % steps.len()];
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new("SPY", RiskConfig::default(), dec!(50000)).unwrap()
    }

    fn account() -> AccountSnapshot {
        AccountSnapshot {
            cash: dec!(50000),
            last_price: dec!(100),
        }
    }

    fn signal(probability: f64, label: SentimentLabel) -> Signal {
        Signal { probability, label }
    }

    #[test]
    fn test_buy_entry_end_to_end() {
        let decision = engine()
            .decide(
                &fixture_bars(30),
                &signal(0.97, SentimentLabel::Positive),
                &account(),
            )
            .unwrap();

        // ATR = 2: take-profit 100 + 6*2, order stop 100 - 3*2.
        match decision {
            Decision::Enter(intent) => {
                assert_eq!(intent.side, OrderSide::Buy);
                assert_eq!(intent.symbol, "SPY");
                assert_eq!(intent.take_profit, dec!(112));
                assert_eq!(intent.stop_loss, dec!(94));
                assert!(intent.quantity > 0);
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn test_sell_entry_mirrors_bracket() {
        let decision = engine()
            .decide(
                &fixture_bars(30),
                &signal(0.97, SentimentLabel::Negative),
                &account(),
            )
            .unwrap();

        match decision {
            Decision::Enter(intent) => {
                assert_eq!(intent.side, OrderSide::Sell);
                assert_eq!(intent.take_profit, dec!(88));
                assert_eq!(intent.stop_loss, dec!(106));
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn test_turbulence_gate_overrides_perfect_signal() {
        // The self-normalized turbulence of the full window is 1.0;
        // a threshold below that trips the gate every cycle.
        let config = RiskConfig {
            turbulence_threshold: 0.5,
            ..RiskConfig::default()
        };
        let engine = DecisionEngine::new("SPY", config, dec!(50000)).unwrap();

        let decision = engine
            .decide(
                &fixture_bars(30),
                &signal(1.0, SentimentLabel::Positive),
                &account(),
            )
            .unwrap();

        assert!(matches!(decision, Decision::Liquidate { turbulence } if turbulence > 0.5));
    }

    #[test]
    fn test_probability_at_threshold_holds() {
        let decision = engine()
            .decide(
                &fixture_bars(30),
                &signal(0.95, SentimentLabel::Positive),
                &account(),
            )
            .unwrap();

        assert_eq!(
            decision,
            Decision::Hold {
                reason: HoldReason::BelowProbabilityThreshold
            }
        );
    }

    #[test]
    fn test_neutral_signal_holds() {
        let decision = engine()
            .decide(
                &fixture_bars(30),
                &signal(0.99, SentimentLabel::Neutral),
                &account(),
            )
            .unwrap();

        assert_eq!(
            decision,
            Decision::Hold {
                reason: HoldReason::NeutralSignal
            }
        );
    }

    #[test]
    fn test_cash_below_price_holds() {
        let poor = AccountSnapshot {
            cash: dec!(50),
            last_price: dec!(100),
        };

        let decision = engine()
            .decide(&fixture_bars(30), &signal(0.97, SentimentLabel::Positive), &poor)
            .unwrap();

        assert_eq!(
            decision,
            Decision::Hold {
                reason: HoldReason::InsufficientCash
            }
        );
    }

    #[test]
    fn test_probability_just_above_threshold_enters() {
        let decision = engine()
            .decide(
                &fixture_bars(30),
                &signal(0.96, SentimentLabel::Positive),
                &account(),
            )
            .unwrap();

        assert!(matches!(decision, Decision::Enter(_)));
    }

    #[test]
    fn test_tiny_risk_budget_rounds_to_zero_and_holds() {
        // Cash barely above the share price: the 2% loss cap is a few
        // dollars against a ~4$ risk per share, rounding to zero shares.
        let engine = DecisionEngine::new("SPY", RiskConfig::default(), dec!(102)).unwrap();
        let near_broke = AccountSnapshot {
            cash: dec!(102),
            last_price: dec!(100),
        };

        let decision = engine
            .decide(
                &fixture_bars(30),
                &signal(0.97, SentimentLabel::Positive),
                &near_broke,
            )
            .unwrap();

        assert_eq!(
            decision,
            Decision::Hold {
                reason: HoldReason::ZeroQuantity
            }
        );
    }

    /// Swingier closes than `fixture_bars`, so the 2% hard loss cap
    /// binds below the VaR/CVaR caps and halving it becomes visible.
    fn volatile_bars(n: usize) -> Vec<Bar> {
        let start = Utc::now() - Duration::days(n as i64);
        let steps = [2.5, -3.0, 2.0, -1.5, 3.0, -2.4];
        let mut close = 100.0;

        (0..n)
            .map(|i| {
                close += steps[i % steps.len()];
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_conservative_mode_tightens_sizing() {
        // Same account, two engines: one where 50k cash is healthy and
        // one where it is a >50% drawdown from 200k initial.
        let healthy = DecisionEngine::new("SPY", RiskConfig::default(), dec!(50000)).unwrap();
        let drawn_down = DecisionEngine::new("SPY", RiskConfig::default(), dec!(200000)).unwrap();

        let bars = volatile_bars(30);
        let sig = signal(0.97, SentimentLabel::Positive);

        let qty = |d: Decision| match d {
            Decision::Enter(intent) => intent.quantity,
            other => panic!("expected entry, got {other:?}"),
        };

        let normal_qty = qty(healthy.decide(&bars, &sig, &account()).unwrap());
        let conservative_qty = qty(drawn_down.decide(&bars, &sig, &account()).unwrap());

        assert!(conservative_qty < normal_qty);
        assert!(conservative_qty > 0);
    }

    #[test]
    fn test_too_few_bars_is_hard_stop() {
        let err = engine()
            .decide(
                &fixture_bars(5),
                &signal(0.97, SentimentLabel::Positive),
                &account(),
            )
            .unwrap_err();

        assert_eq!(err, EngineError::InsufficientData { needed: 15, got: 5 });
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = RiskConfig {
            confidence_level: 0.0,
            ..RiskConfig::default()
        };
        assert!(matches!(
            DecisionEngine::new("SPY", config, dec!(1000)),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }
}
